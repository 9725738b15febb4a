//! Meal catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use tiffinbox_core::MealId;

use crate::api::types::{Meal, MealFilter};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Meal card display data for templates (grids, teasers).
#[derive(Clone)]
pub struct MealCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub cuisine: Option<String>,
    pub image: Option<String>,
    pub is_available: bool,
}

impl From<&Meal> for MealCardView {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.as_str().to_string(),
            name: meal.name.clone(),
            price: meal.price.to_string(),
            cuisine: meal.cuisine.clone(),
            image: meal.image.clone(),
            is_available: meal.is_available,
        }
    }
}

/// Meal detail display data, including the add-to-cart snapshot fields.
#[derive(Clone)]
pub struct MealDetailView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub cuisine: Option<String>,
    pub image: Option<String>,
    pub provider_id: Option<String>,
    pub rating: Option<String>,
    pub is_available: bool,
}

impl From<&Meal> for MealDetailView {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.as_str().to_string(),
            name: meal.name.clone(),
            description: meal.description.clone(),
            price: meal.price.to_string(),
            cuisine: meal.cuisine.clone(),
            image: meal.image.clone(),
            provider_id: meal
                .provider_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            rating: meal.rating.map(|rating| format!("{rating:.1}")),
            is_available: meal.is_available,
        }
    }
}

/// Catalog filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MealsQuery {
    pub page: Option<u32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub category: Option<String>,
    pub q: Option<String>,
}

impl MealsQuery {
    fn to_filter(&self) -> MealFilter {
        MealFilter {
            page: self.page,
            limit: Some(PAGE_SIZE),
            min_price: self.min_price,
            max_price: self.max_price,
            category: none_if_blank(self.category.as_deref()),
            search: none_if_blank(self.q.as_deref()),
            provider_id: None,
        }
    }
}

fn none_if_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

const PAGE_SIZE: u32 = 12;

/// Meal listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "meals/index.html")]
pub struct MealsIndexTemplate {
    pub meals: Vec<MealCardView>,
    pub category: String,
    pub q: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more_pages: bool,
    pub err: Option<String>,
}

/// Meal detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "meals/show.html")]
pub struct MealShowTemplate {
    pub meal: MealDetailView,
}

/// Display meal listing page.
///
/// A backend failure degrades to an empty grid with a one-line error;
/// the rest of the page stays up.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<MealsQuery>,
) -> impl IntoResponse {
    let current_page = query.page.unwrap_or(1);

    let (meals, pagination, err) = match state.backend().list_meals(&query.to_filter()).await {
        Ok(page) => (page.meals, page.pagination, None),
        Err(e) => {
            tracing::warn!("Failed to fetch meals: {e}");
            (Vec::new(), None, Some(e.user_message()))
        }
    };

    let total_pages = pagination.map_or(1, |p| p.pages.max(1));

    MealsIndexTemplate {
        meals: meals.iter().map(MealCardView::from).collect(),
        category: query.category.unwrap_or_default(),
        q: query.q.unwrap_or_default(),
        current_page,
        total_pages,
        has_more_pages: current_page < total_pages,
        err,
    }
}

/// Display meal detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<MealShowTemplate> {
    let meal = state
        .backend()
        .get_meal(&MealId::new(id))
        .await
        .map_err(|e| match e {
            crate::api::ApiError::NotFound(_) => {
                AppError::NotFound("This meal is no longer on the menu".to_string())
            }
            other => AppError::Api(other),
        })?;

    Ok(MealShowTemplate {
        meal: MealDetailView::from(&meal),
    })
}
