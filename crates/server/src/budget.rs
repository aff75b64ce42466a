//! Dashboard, charts and monthly planner endpoints.

use api_types::{
    MonthQuery,
    budget::{BudgetWarning, CategorySummaryView, ChartsResponse, DashboardResponse},
    planner::{PlannedItemView, PlannerCategoryView, PlannerResponse, PlannerSave},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;
use engine::{MonthKey, PlanItemDraft};

use crate::{ServerError, server::ServerState, user::CurrentUser};

fn parse_month(query: &MonthQuery) -> Result<Option<MonthKey>, ServerError> {
    let month = query
        .month
        .as_deref()
        .map(str::trim)
        .filter(|month| !month.is_empty())
        .map(str::parse::<MonthKey>)
        .transpose()?;
    Ok(month)
}

pub(crate) fn map_warning(warning: engine::BudgetWarning) -> BudgetWarning {
    match warning {
        engine::BudgetWarning::PercentTotalMismatch { total } => {
            BudgetWarning::PercentTotalMismatch { total }
        }
        engine::BudgetWarning::MissingDate { record_id } => {
            BudgetWarning::MissingDate { record_id }
        }
    }
}

fn map_summary(summary: engine::CategorySummary) -> CategorySummaryView {
    CategorySummaryView {
        category_id: summary.category_id,
        name: summary.name,
        color: summary.color,
        budget_percent: summary.budget_percent,
        budget_minor: summary.budget_amount.minor(),
        spent_minor: summary.spent.minor(),
        remaining_minor: summary.remaining.minor(),
        utilization_percent: summary.utilization_percent,
        utilization_capped: summary.utilization_capped,
    }
}

pub async fn dashboard(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let month = parse_month(&query)?;
    let dashboard = state.engine.dashboard(&user.id, month).await?;
    let summary = dashboard.summary;

    Ok(Json(DashboardResponse {
        month: summary.month.to_string(),
        currency: dashboard.currency.to_string(),
        total_income_minor: summary.total_income.minor(),
        total_expenses_minor: summary.total_expenses.minor(),
        total_budgeted_minor: summary.total_budgeted.minor(),
        uncategorized_spent_minor: summary.uncategorized_spent.minor(),
        categories: summary.categories.into_iter().map(map_summary).collect(),
        warnings: summary.warnings.into_iter().map(map_warning).collect(),
    }))
}

/// Budget vs. spend per category, as parallel series.
pub async fn charts(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ChartsResponse>, ServerError> {
    let month = parse_month(&query)?;
    let summary = state.engine.dashboard(&user.id, month).await?.summary;

    let mut charts = ChartsResponse {
        month: summary.month.to_string(),
        labels: Vec::with_capacity(summary.categories.len()),
        colors: Vec::with_capacity(summary.categories.len()),
        budget_minor: Vec::with_capacity(summary.categories.len()),
        spent_minor: Vec::with_capacity(summary.categories.len()),
    };
    for category in summary.categories {
        charts.budget_minor.push(category.budget_amount.minor());
        charts.spent_minor.push(category.spent.minor());
        charts.labels.push(category.name);
        charts.colors.push(category.color);
    }
    Ok(Json(charts))
}

fn map_planner(planner: engine::BudgetPlanner) -> PlannerResponse {
    PlannerResponse {
        month: planner.month.to_string(),
        currency: planner.currency.to_string(),
        monthly_income_minor: planner.monthly_income.minor(),
        grand_total_minor: planner.grand_total.minor(),
        categories: planner
            .categories
            .into_iter()
            .map(|category| PlannerCategoryView {
                category_id: category.category_id,
                name: category.name,
                color: category.color,
                budget_percent: category.budget_percent,
                rule_limit_minor: category.rule_limit.minor(),
                planned_total_minor: category.planned_total.minor(),
                spent_minor: category.spent.minor(),
                items: category
                    .items
                    .into_iter()
                    .map(|item| PlannedItemView {
                        name: item.name,
                        amount_minor: item.amount.minor(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub async fn planner(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<PlannerResponse>, ServerError> {
    let month = parse_month(&query)?;
    let planner = state.engine.budget_planner(&user.id, month).await?;
    Ok(Json(map_planner(planner)))
}

/// Replace the plan of the month and return the refreshed planner.
pub async fn save_planner(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
    Json(payload): Json<PlannerSave>,
) -> Result<Json<PlannerResponse>, ServerError> {
    let month = parse_month(&query)?.unwrap_or_else(|| MonthKey::of(Utc::now().date_naive()));
    let drafts = payload
        .items
        .into_iter()
        .map(|item| PlanItemDraft {
            category_id: item.category_id,
            name: item.name,
            amount: item.amount,
        })
        .collect();

    state
        .engine
        .save_monthly_budget_plan(&user.id, month, drafts)
        .await?;
    let planner = state.engine.budget_planner(&user.id, Some(month)).await?;
    Ok(Json(map_planner(planner)))
}
