//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use aabhushan_core::ProductCategory;

use crate::catalog::ListingQuery;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// One entry of the category index.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub slug: &'static str,
    pub title: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryIndex {
    pub success: bool,
    pub categories: Vec<CategorySummary>,
}

fn parse_category(slug: &str) -> Result<ProductCategory> {
    slug.parse()
        .map_err(|_| AppError::NotFound(format!("Category {slug}")))
}

/// Categories in navigation order with product counts.
pub async fn index(State(state): State<AppState>) -> Json<CategoryIndex> {
    let categories = ProductCategory::ALL
        .into_iter()
        .map(|category| CategorySummary {
            slug: category.slug(),
            title: category.title(),
            count: state.catalog().in_category(category).count(),
        })
        .collect();
    Json(CategoryIndex {
        success: true,
        categories,
    })
}

/// One page of a category listing.
pub async fn list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: std::result::Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Response> {
    let category = parse_category(&slug)?;
    let Query(query) =
        query.map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))?;

    let listing = state.catalog().list(category, &query);
    Ok(Json(listing).into_response())
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Response> {
    let category = parse_category(&slug)?;
    let product = state
        .catalog()
        .get(category, &id)
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;
    Ok(Json(product).into_response())
}
