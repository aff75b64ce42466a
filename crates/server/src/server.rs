use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::headers::{Error as AxumError, Header, HeaderMapExt};

use std::sync::Arc;

use crate::{budget, categories, expenses, income, profile, savings, user};
use engine::{Engine, ProfileClassifier};

static USER_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub classifier: Arc<ProfileClassifier>,
}

/// Typed header carrying the authenticated user id.
///
/// The identity provider in front of the server sets "x-user-id" once the
/// user signed in.
#[derive(Debug)]
struct UserIdHeader(String);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(UserIdHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn identify(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    // Missing and malformed headers are both unauthorized.
    let Some(UserIdHeader(id)) = request.headers().typed_get::<UserIdHeader>() else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user::CurrentUser { id });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/dashboard", get(budget::dashboard))
        .route("/charts", get(budget::charts))
        .route("/income", get(income::list).post(income::create))
        .route("/income/{id}", delete(income::remove))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/{id}", delete(expenses::remove))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/rules", put(categories::update_rules))
        .route("/categories/{id}", get(categories::detail))
        .route(
            "/budget/planner",
            get(budget::planner).put(budget::save_planner),
        )
        .route("/savings", get(savings::overview).post(savings::create))
        .route("/savings/emergency-fund", put(savings::update_emergency_fund))
        .route("/savings/{id}/pay", post(savings::pay))
        .route("/savings/{id}", delete(savings::remove))
        .route("/user/currency", put(user::set_currency))
        .route("/profile/predict", post(profile::predict))
        .route_layer(middleware::from_fn(identify))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    classifier: ProfileClassifier,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        classifier: Arc::new(classifier),
    };

    axum::serve(listener, router(state)).await
}
