//! Savings goals and emergency fund endpoints.

use api_types::savings::{
    CommitmentFormula, EmergencyFundUpdate, EmergencyFundView, SavingsGoalNew, SavingsGoalView,
    SavingsPayment, SavingsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Money, NewSavingsGoal};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::CurrentUser};

fn map_goal(goal: engine::SavingsGoal) -> SavingsGoalView {
    SavingsGoalView {
        id: goal.id,
        name: goal.name,
        goal_minor: goal.goal.minor(),
        saved_minor: goal.saved.minor(),
        achieved: goal.achieved,
        target_date: goal.target_date,
        monthly_commitment_minor: goal.monthly_commitment.minor(),
    }
}

fn map_fund(fund: engine::EmergencyFund) -> EmergencyFundView {
    EmergencyFundView {
        goal_minor: fund.goal.minor(),
        current_minor: fund.current.minor(),
        progress_percent: fund.progress_percent(),
    }
}

fn map_formula(formula: CommitmentFormula) -> engine::CommitmentFormula {
    match formula {
        CommitmentFormula::FullGoal => engine::CommitmentFormula::FullGoal,
        CommitmentFormula::Outstanding => engine::CommitmentFormula::Outstanding,
    }
}

pub async fn overview(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<SavingsResponse>, ServerError> {
    let overview = state.engine.savings_overview(&user.id).await?;

    Ok(Json(SavingsResponse {
        goals: overview.goals.into_iter().map(map_goal).collect(),
        total_saved_minor: overview.total_saved.minor(),
        emergency_fund: map_fund(overview.emergency_fund),
        suggested_emergency_goal_minor: overview.suggested_emergency_goal.minor(),
    }))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<SavingsGoalNew>,
) -> Result<(StatusCode, Json<SavingsGoalView>), ServerError> {
    let goal = state
        .engine
        .add_savings_goal(
            &user.id,
            NewSavingsGoal {
                name: payload.name,
                goal: Money::new(payload.goal_minor),
                target_date: payload.target_date,
                formula: payload.formula.map(map_formula),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_goal(goal))))
}

pub async fn pay(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<SavingsPayment>,
) -> Result<Json<SavingsGoalView>, ServerError> {
    let goal = state
        .engine
        .pay_savings_goal(&user.id, goal_id, Money::new(payload.amount_minor))
        .await?;
    Ok(Json(map_goal(goal)))
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_savings_goal(&user.id, goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_emergency_fund(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<EmergencyFundUpdate>,
) -> Result<Json<EmergencyFundView>, ServerError> {
    if payload.goal_minor.is_none() && payload.current_minor.is_none() {
        return Err(ServerError::Generic(
            "goal_minor or current_minor required".to_string(),
        ));
    }
    let fund = state
        .engine
        .update_emergency_fund(
            &user.id,
            payload.goal_minor.map(Money::new),
            payload.current_minor.map(Money::new),
        )
        .await?;
    Ok(Json(map_fund(fund)))
}
