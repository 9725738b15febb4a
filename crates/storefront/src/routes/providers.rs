//! Provider directory route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use tiffinbox_core::ProviderId;

use crate::api::types::Provider;
use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::meals::MealCardView;
use crate::state::AppState;

/// Provider card display data for templates.
#[derive(Clone)]
pub struct ProviderCardView {
    pub id: String,
    pub name: String,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
}

impl From<&Provider> for ProviderCardView {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id.as_str().to_string(),
            name: provider.name.clone(),
            cuisine: provider.cuisine.clone(),
            address: provider.address.clone(),
            logo: provider.logo.clone(),
        }
    }
}

/// Provider directory page template.
#[derive(Template, WebTemplate)]
#[template(path = "providers/index.html")]
pub struct ProvidersIndexTemplate {
    pub providers: Vec<ProviderCardView>,
    pub err: Option<String>,
}

/// Provider detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "providers/show.html")]
pub struct ProviderShowTemplate {
    pub provider: ProviderCardView,
    pub description: Option<String>,
    pub meals: Vec<MealCardView>,
}

/// Display provider directory.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let (providers, err) = match state.backend().list_providers().await {
        Ok(providers) => (
            providers.iter().map(ProviderCardView::from).collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!("Failed to fetch providers: {e}");
            (Vec::new(), Some(e.user_message()))
        }
    };

    ProvidersIndexTemplate { providers, err }
}

/// Display a provider and its menu.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProviderShowTemplate> {
    let provider = state
        .backend()
        .get_provider(&ProviderId::new(id))
        .await
        .map_err(|e| match e {
            crate::api::ApiError::NotFound(_) => {
                AppError::NotFound("Provider not found".to_string())
            }
            other => AppError::Api(other),
        })?;

    Ok(ProviderShowTemplate {
        description: provider.description.clone(),
        meals: provider.meals.iter().map(MealCardView::from).collect(),
        provider: ProviderCardView::from(&provider),
    })
}
