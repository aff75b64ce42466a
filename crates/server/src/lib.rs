use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};
pub use user::CurrentUser;

mod budget;
mod categories;
mod expenses;
mod income;
mod profile;
mod savings;
mod server;
mod user;

pub mod types {
    pub mod budget {
        pub use api_types::MonthQuery;
        pub use api_types::budget::{
            BudgetWarning, CategorySummaryView, ChartsResponse, DashboardResponse,
        };
        pub use api_types::planner::{
            PlanItemNew, PlannedItemView, PlannerCategoryView, PlannerResponse, PlannerSave,
        };
    }

    pub mod income {
        pub use api_types::Frequency;
        pub use api_types::income::{IncomeListResponse, IncomeNew, IncomeView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseView};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryDetail, CategoryListResponse, CategoryNew, CategoryRulesResponse,
            CategoryRulesUpdate, CategoryView,
        };
    }

    pub mod savings {
        pub use api_types::savings::{
            CommitmentFormula, EmergencyFundUpdate, EmergencyFundView, SavingsGoalNew,
            SavingsGoalView, SavingsPayment, SavingsResponse,
        };
    }

    pub mod user {
        pub use api_types::user::{CurrencyUpdate, UserView};
    }

    pub mod profile {
        pub use api_types::profile::{ProfileRequest, ProfileResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidPercent(_)
        | EngineError::InvalidCurrency(_)
        | EngineError::InvalidFrequency(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Serialization(msg) => {
            tracing::error!("serialization error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
