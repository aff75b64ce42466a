use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use engine::{Engine, ProfileClassifier, ProfileModel};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use serde_json::{Value, json};
use server::ServerState;
use tower::ServiceExt;

const PROFILE_MODEL: &str = r#"{
    "features": ["age", "investment_knowledge"],
    "encoders": {"investment_knowledge": ["advanced", "basic", "none"]},
    "classes": ["aggressive", "conservative"],
    "trees": [{"nodes": [
        {"feature": 0, "threshold": 40.0, "left": 1, "right": 2},
        {"value": [1.0, 0.0]},
        {"value": [0.0, 1.0]}
    ]}]
}"#;

async fn setup_app_with_db(classifier: ProfileClassifier) -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    let app = server::router(ServerState {
        engine: Arc::new(engine),
        classifier: Arc::new(classifier),
    });
    (app, db)
}

async fn setup_app(classifier: ProfileClassifier) -> Router {
    setup_app_with_db(classifier).await.0
}

/// Stores an expense of alice pointing at a category that does not exist.
async fn insert_dangling_expense(db: &DatabaseConnection, amount_minor: i64, date: &str) {
    let sql = format!(
        "INSERT INTO expenses (id, user_id, description, amount_minor, category_id, frequency, date, created_at) \
         VALUES ('{}', 'alice', 'Ghost', {amount_minor}, '{}', 'monthly', '{date}', '2025-07-01T00:00:00+00:00')",
        uuid::Uuid::new_v4(),
        uuid::Uuid::new_v4(),
    );
    db.execute_unprepared(&sql).await.unwrap();
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "alice");
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = setup_app(ProfileClassifier::unavailable()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header("x-user-id", "  ")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_reflects_income_and_expenses() {
    let app = setup_app(ProfileClassifier::unavailable()).await;

    let (status, categories) = send(&app, request("GET", "/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    let needs = categories["categories"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/income",
            Some(json!({"source": "Salary", "amount_minor": 2_500_000, "frequency": "mensual"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, expense) = send(
        &app,
        request(
            "POST",
            "/expenses",
            Some(json!({
                "description": "Rent",
                "amount_minor": 600_000,
                "category_id": needs,
                "frequency": "monthly"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["frequency"], "monthly");

    let (status, dashboard) = send(&app, request("GET", "/dashboard?month=2025-08", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["month"], "2025-08");
    assert_eq!(dashboard["currency"], "USD");
    assert_eq!(dashboard["total_income_minor"], 2_500_000);
    assert_eq!(dashboard["total_expenses_minor"], 600_000);
    assert_eq!(dashboard["categories"][0]["budget_minor"], 1_250_000);
    assert_eq!(dashboard["categories"][0]["remaining_minor"], 650_000);
    assert_eq!(dashboard["categories"][0]["utilization_percent"], 48.0);

    let (status, charts) = send(&app, request("GET", "/charts?month=2025-08", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        charts["labels"],
        json!(["Necesidades", "Deseos", "Ahorro e Inversión"])
    );
    assert_eq!(charts["spent_minor"], json!([600_000, 0, 0]));

    let uri = format!("/expenses?category_id={needs}");
    let (status, listed) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["expenses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_input_maps_to_client_errors() {
    let app = setup_app(ProfileClassifier::unavailable()).await;

    let (status, body) = send(&app, request("GET", "/dashboard?month=2025-13", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/income",
            Some(json!({"source": "Salary", "amount_minor": -5})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        request("PUT", "/user/currency", Some(json!({"currency": "EURO"}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/income",
            Some(json!({
                "source": "x",
                "amount_minor": 5_000_000_000_000_000_000_i64,
                "frequency": "monthly"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let uri = format!("/income/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/categories",
            Some(json!({"name": "deseos", "color": "#ffffff"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn rules_update_reports_percent_mismatch() {
    let app = setup_app(ProfileClassifier::unavailable()).await;
    let (_, categories) = send(&app, request("GET", "/categories", None)).await;
    let needs = categories["categories"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(categories["warning"], Value::Null);

    let mut percents = serde_json::Map::new();
    percents.insert(needs.clone(), json!(40));
    let (status, body) = send(
        &app,
        request(
            "PUT",
            "/categories/rules",
            Some(json!({ "percents": percents })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["warning"],
        json!({"kind": "percent_total_mismatch", "total": 90})
    );
    assert_eq!(body["categories"][0]["budget_percent"], 40);

    let (status, listed) = send(&app, request("GET", "/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        listed["warning"],
        json!({"kind": "percent_total_mismatch", "total": 90})
    );

    let (status, detail) = send(&app, request("GET", &format!("/categories/{needs}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["category"]["name"], "Necesidades");
}

#[tokio::test]
async fn planner_round_trip() {
    let app = setup_app(ProfileClassifier::unavailable()).await;
    let (_, categories) = send(&app, request("GET", "/categories", None)).await;
    let needs = categories["categories"][0]["id"].as_str().unwrap().to_string();

    let (status, planner) = send(
        &app,
        request(
            "PUT",
            "/budget/planner?month=2025-08",
            Some(json!({"items": [
                {"category_id": needs, "name": "Alquiler", "amount": "15000"},
                {"category_id": needs, "name": "Luz", "amount": "1500,50"},
                {"category_id": needs, "name": "", "amount": "10"}
            ]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(planner["grand_total_minor"], 1_650_050);
    assert_eq!(planner["categories"][0]["items"].as_array().unwrap().len(), 2);

    let (status, planner) = send(&app, request("GET", "/budget/planner?month=2025-08", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(planner["categories"][0]["planned_total_minor"], 1_650_050);
}

#[tokio::test]
async fn savings_flow() {
    let app = setup_app(ProfileClassifier::unavailable()).await;

    let (status, goal) = send(
        &app,
        request(
            "POST",
            "/savings",
            Some(json!({"name": "Laptop", "goal_minor": 60_000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = goal["id"].as_str().unwrap().to_string();

    let (status, paid) = send(
        &app,
        request(
            "POST",
            &format!("/savings/{id}/pay"),
            Some(json!({"amount_minor": 60_000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["achieved"], true);

    let (status, fund) = send(
        &app,
        request(
            "PUT",
            "/savings/emergency-fund",
            Some(json!({"goal_minor": 100_000, "current_minor": 25_000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fund["progress_percent"], 25.0);

    let (status, overview) = send(&app, request("GET", "/savings", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["total_saved_minor"], 60_000);
    assert_eq!(overview["emergency_fund"]["current_minor"], 25_000);

    let (status, _) = send(&app, request("DELETE", &format!("/savings/{id}"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn profile_prediction() {
    let model = ProfileModel::from_json(PROFILE_MODEL).unwrap();
    let app = setup_app(ProfileClassifier::from_model(model)).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/profile/predict",
            Some(json!({"age": "29", "investment_knowledge": "basic"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"profile": "aggressive"}));

    let app = setup_app(ProfileClassifier::unavailable()).await;
    let (status, body) = send(
        &app,
        request("POST", "/profile/predict", Some(json!({"age": "29"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"unavailable": true}));
}

#[tokio::test]
async fn income_history_shows_monthly_values() {
    let app = setup_app(ProfileClassifier::unavailable()).await;

    for body in [
        json!({"source": "Freelance", "amount_minor": 100_000, "frequency": "quincenal"}),
        json!({"source": "Sale", "amount_minor": 40_000, "frequency": "one_off"}),
    ] {
        let (status, _) = send(&app, request("POST", "/income", Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, request("GET", "/income", None)).await;
    assert_eq!(status, StatusCode::OK);
    let income = body["income"].as_array().unwrap();
    assert_eq!(income.len(), 2);
    let value_of = |source: &str| {
        income
            .iter()
            .find(|row| row["source"] == source)
            .map(|row| row["monthly_value_minor"].clone())
            .unwrap()
    };
    assert_eq!(value_of("Freelance"), 216_667);
    assert_eq!(value_of("Sale"), 0);
    assert_eq!(body["monthly_total_minor"], 216_667);
}

#[tokio::test]
async fn expense_history_is_labeled_and_sorted_by_date() {
    let (app, db) = setup_app_with_db(ProfileClassifier::unavailable()).await;
    let (_, categories) = send(&app, request("GET", "/categories", None)).await;
    let needs = categories["categories"][0]["id"].as_str().unwrap().to_string();

    for body in [
        json!({"description": "Rent", "amount_minor": 600_000, "category_id": needs,
               "frequency": "monthly", "date": "2025-08-01"}),
        json!({"description": "Cash", "amount_minor": 1_000, "frequency": "one_off"}),
        json!({"description": "Gift", "amount_minor": 3_000, "frequency": "one_off",
               "date": "2025-09-10"}),
    ] {
        let (status, _) = send(&app, request("POST", "/expenses", Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    insert_dangling_expense(&db, 5_000, "2025-07-15").await;

    let (status, body) = send(&app, request("GET", "/expenses", None)).await;
    assert_eq!(status, StatusCode::OK);
    let expenses = body["expenses"].as_array().unwrap();
    let order: Vec<_> = expenses
        .iter()
        .map(|row| row["description"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["Gift", "Rent", "Ghost", "Cash"]);

    assert_eq!(expenses[1]["category_name"], "Necesidades");
    assert_eq!(expenses[1]["category_color"], "#3b82f6");
    for row in [&expenses[0], &expenses[2], &expenses[3]] {
        assert_eq!(row["category_name"], "Uncategorized");
        assert_eq!(row["category_color"], "#6b7280");
    }
    // Monthly rent and the monthly ghost expense; the dated one-off falls in
    // another month and the undated one is skipped.
    assert_eq!(body["monthly_total_minor"], 605_000);

    let (status, detail) = send(&app, request("GET", &format!("/categories/{needs}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["expenses"][0]["category_name"], "Necesidades");
}

#[tokio::test]
async fn dashboard_reports_overspend_and_uncategorized() {
    let (app, db) = setup_app_with_db(ProfileClassifier::unavailable()).await;
    let (_, categories) = send(&app, request("GET", "/categories", None)).await;
    let wants = categories["categories"][1]["id"].as_str().unwrap().to_string();

    for (path, body) in [
        ("/income", json!({"source": "Salary", "amount_minor": 1_000_000, "frequency": "monthly"})),
        ("/expenses", json!({"description": "Trip", "amount_minor": 450_000,
                             "category_id": wants, "frequency": "monthly"})),
        ("/expenses", json!({"description": "Misc", "amount_minor": 2_000,
                             "frequency": "monthly"})),
    ] {
        let (status, _) = send(&app, request("POST", path, Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    insert_dangling_expense(&db, 5_000, "2025-08-02").await;

    let (status, dashboard) = send(&app, request("GET", "/dashboard?month=2025-08", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_expenses_minor"], 457_000);
    assert_eq!(dashboard["uncategorized_spent_minor"], 7_000);

    let wants = &dashboard["categories"][1];
    assert_eq!(wants["budget_minor"], 300_000);
    assert_eq!(wants["spent_minor"], 450_000);
    assert_eq!(wants["remaining_minor"], -150_000);
    assert_eq!(wants["utilization_percent"], 150.0);
    assert_eq!(wants["utilization_capped"], 100.0);
}
