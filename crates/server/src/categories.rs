//! Categories API endpoints.

use api_types::category::{
    CategoryDetail, CategoryListResponse, CategoryNew, CategoryRulesResponse, CategoryRulesUpdate,
    CategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    budget::map_warning,
    expenses::{CategoryLabels, map_expense},
    server::ServerState,
    user::CurrentUser,
};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        color: category.color,
        budget_percent: category.budget_percent,
    }
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state.engine.list_categories(&user.id).await?;
    let warning = engine::check_percent_total(&categories).map(map_warning);

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(map_category).collect(),
        warning,
    }))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            &user.id,
            &payload.name,
            &payload.color,
            payload.budget_percent,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn detail(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryDetail>, ServerError> {
    let category = state.engine.category(&user.id, category_id).await?;
    let expenses = state
        .engine
        .list_category_expenses(&user.id, category_id)
        .await?;

    let labels = CategoryLabels::new(std::slice::from_ref(&category));

    Ok(Json(CategoryDetail {
        category: map_category(category),
        expenses: expenses
            .into_iter()
            .map(|expense| map_expense(expense, &labels))
            .collect(),
    }))
}

/// Update the 50/30/20-style percentages. A total other than 100 is saved
/// and reported as a warning.
pub async fn update_rules(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryRulesUpdate>,
) -> Result<Json<CategoryRulesResponse>, ServerError> {
    let warning = state
        .engine
        .update_category_percents(&user.id, &payload.percents)
        .await?;
    let categories = state
        .engine
        .list_categories(&user.id)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryRulesResponse {
        categories,
        warning: warning.map(map_warning),
    }))
}
