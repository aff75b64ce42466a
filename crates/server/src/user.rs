//! User settings endpoints.

use api_types::user::{CurrencyUpdate, UserView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};

/// User resolved from the identity header by the auth middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
}

pub async fn set_currency(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CurrencyUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let updated = state
        .engine
        .set_currency(&user.id, &payload.currency)
        .await?;

    Ok(Json(UserView {
        id: updated.id,
        currency: updated.currency.to_string(),
    }))
}
