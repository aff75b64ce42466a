//! Investor profile prediction.

use api_types::profile::{ProfileRequest, ProfileResponse};
use axum::{Extension, Json, extract::State};
use engine::{Prediction, ProfileFeatures};

use crate::{server::ServerState, user::CurrentUser};

pub async fn predict(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileRequest>,
) -> Json<ProfileResponse> {
    let features = ProfileFeatures {
        age: payload.age,
        sex: payload.sex,
        nationality: payload.nationality,
        income_bracket: payload.income_bracket,
        investment_knowledge: payload.investment_knowledge,
        employment_status: payload.employment_status,
    };

    let response = match state.classifier.predict_profile(&features) {
        Prediction::Profile(profile) => {
            tracing::debug!("user {}: predicted profile {profile}", user.id);
            ProfileResponse::Profile { profile }
        }
        Prediction::Unavailable => ProfileResponse::Unavailable { unavailable: true },
    };
    Json(response)
}
