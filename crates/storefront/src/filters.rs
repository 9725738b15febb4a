//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount with the taka sign.
///
/// Usage in templates: `{{ meal.price|taka }}`
#[askama::filter_fn]
pub fn taka(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("\u{09f3} {value}"))
}

/// Maps an order status to its badge CSS class.
///
/// Usage in templates: `{{ order.status|status_badge }}`
#[askama::filter_fn]
pub fn status_badge(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(match value.to_string().as_str() {
        "CANCELLED" => "badge badge-red",
        "DELIVERED" => "badge badge-green",
        _ => "badge badge-amber",
    })
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}
