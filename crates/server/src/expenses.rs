//! Expense API endpoints.

use std::collections::HashMap;

use api_types::expense::{ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    Category, MonthKey, NewExpense, UNCATEGORIZED_COLOR, UNCATEGORIZED_NAME, monthly_projection,
};
use uuid::Uuid;

use crate::{
    ServerError,
    income::{frequency_from_api, frequency_to_api},
    server::ServerState,
    user::CurrentUser,
};

/// Name and color of each category, for labeling expenses.
pub(crate) struct CategoryLabels(HashMap<Uuid, (String, String)>);

impl CategoryLabels {
    pub(crate) fn new(categories: &[Category]) -> Self {
        Self(
            categories
                .iter()
                .map(|c| (c.id, (c.name.clone(), c.color.clone())))
                .collect(),
        )
    }

    fn get(&self, category_id: Option<Uuid>) -> (String, String) {
        category_id
            .and_then(|id| self.0.get(&id))
            .cloned()
            .unwrap_or_else(|| {
                (
                    UNCATEGORIZED_NAME.to_string(),
                    UNCATEGORIZED_COLOR.to_string(),
                )
            })
    }
}

pub(crate) fn map_expense(expense: engine::Expense, labels: &CategoryLabels) -> ExpenseView {
    let (category_name, category_color) = labels.get(expense.category_id);
    ExpenseView {
        id: expense.id,
        description: expense.description,
        amount_minor: expense.amount.minor(),
        category_id: expense.category_id,
        category_name,
        category_color,
        frequency: frequency_to_api(expense.frequency),
        date: expense.date,
    }
}

/// All expenses, or only those of `?category_id=`.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = match query.category_id {
        Some(category_id) => {
            state
                .engine
                .list_category_expenses(&user.id, category_id)
                .await?
        }
        None => state.engine.list_expenses(&user.id).await?,
    };
    let labels = CategoryLabels::new(&state.engine.list_categories(&user.id).await?);
    let month = MonthKey::of(Utc::now().date_naive());
    let monthly_total = monthly_projection(&expenses, month).total;

    Ok(Json(ExpenseListResponse {
        expenses: expenses
            .into_iter()
            .map(|expense| map_expense(expense, &labels))
            .collect(),
        monthly_total_minor: monthly_total.minor(),
    }))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .add_expense(
            &user.id,
            NewExpense {
                description: payload.description,
                amount: engine::Money::new(payload.amount_minor),
                category_id: payload.category_id,
                frequency: frequency_from_api(payload.frequency),
                date: payload.date,
            },
        )
        .await?;
    let labels = CategoryLabels::new(&state.engine.list_categories(&user.id).await?);

    Ok((StatusCode::CREATED, Json(map_expense(expense, &labels))))
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(&user.id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
