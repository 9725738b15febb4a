//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::api::types::MealFilter;
use crate::filters;
use crate::routes::meals::MealCardView;
use crate::routes::providers::ProviderCardView;
use crate::state::AppState;

const FEATURED_COUNT: u32 = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<MealCardView>,
    pub providers: Vec<ProviderCardView>,
}

/// Display the home page.
///
/// Both sections degrade to empty on backend failure; the home page always
/// renders.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let filter = MealFilter {
        limit: Some(FEATURED_COUNT),
        ..MealFilter::default()
    };

    let featured = match state.backend().list_meals(&filter).await {
        Ok(page) => page.meals.iter().map(MealCardView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch featured meals: {e}");
            Vec::new()
        }
    };

    let providers = match state.backend().list_providers().await {
        Ok(providers) => providers.iter().map(ProviderCardView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch providers: {e}");
            Vec::new()
        }
    };

    HomeTemplate {
        featured,
        providers,
    }
}
