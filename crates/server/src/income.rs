//! Income API endpoints.

use api_types::{
    Frequency,
    income::{IncomeListResponse, IncomeNew, IncomeView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Money, MonthKey, NewIncome, monthly_equivalent, monthly_projection};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::CurrentUser};

pub(crate) fn frequency_from_api(frequency: Frequency) -> engine::Frequency {
    match frequency {
        Frequency::OneOff => engine::Frequency::OneOff,
        Frequency::Biweekly => engine::Frequency::Biweekly,
        Frequency::Monthly => engine::Frequency::Monthly,
        Frequency::Annual => engine::Frequency::Annual,
    }
}

pub(crate) fn frequency_to_api(frequency: engine::Frequency) -> Frequency {
    match frequency {
        engine::Frequency::OneOff => Frequency::OneOff,
        engine::Frequency::Biweekly => Frequency::Biweekly,
        engine::Frequency::Monthly => Frequency::Monthly,
        engine::Frequency::Annual => Frequency::Annual,
    }
}

fn map_income(income: engine::Income, month: MonthKey) -> IncomeView {
    let monthly_value = monthly_equivalent(&income, month).map_or(0, Money::minor);
    IncomeView {
        id: income.id,
        source: income.source,
        amount_minor: income.amount.minor(),
        frequency: frequency_to_api(income.frequency),
        date: income.date,
        monthly_value_minor: monthly_value,
    }
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<IncomeListResponse>, ServerError> {
    let income = state.engine.list_income(&user.id).await?;
    let month = MonthKey::of(Utc::now().date_naive());
    let monthly_total = monthly_projection(&income, month).total;

    Ok(Json(IncomeListResponse {
        income: income
            .into_iter()
            .map(|income| map_income(income, month))
            .collect(),
        monthly_total_minor: monthly_total.minor(),
    }))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<IncomeView>), ServerError> {
    let income = state
        .engine
        .add_income(
            &user.id,
            NewIncome {
                source: payload.source,
                amount: engine::Money::new(payload.amount_minor),
                frequency: frequency_from_api(payload.frequency),
                date: payload.date,
            },
        )
        .await?;

    let month = MonthKey::of(Utc::now().date_naive());
    Ok((StatusCode::CREATED, Json(map_income(income, month))))
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(income_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_income(&user.id, income_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
