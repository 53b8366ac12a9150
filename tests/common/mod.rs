use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db,
    entities::{category, product},
    events::{self, EventSender},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application backed by a throwaway
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_file = std::env::temp_dir().join(format!("stockroom_test_{}.db", Uuid::new_v4()));
        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(db_arc, cfg, event_sender);
        let router = stockroom_api::app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router. When `cookie` is set it rides as
    /// the Cookie header, mimicking a browser carrying the session.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(raw) = cookie {
            builder = builder.header(header::COOKIE, raw);
        }

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a category row directly, bypassing the HTTP surface.
    pub async fn seed_category(&self, name: &str) -> Uuid {
        let created = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed category");
        created.id
    }

    /// Seed a product row directly, bypassing the HTTP surface.
    pub async fn seed_product(
        &self,
        category_id: Uuid,
        name: &str,
        barcode: &str,
        price: Decimal,
        quantity_in_stock: i32,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            brand: Set("Acme".to_string()),
            item_number: Set(String::new()),
            price: Set(price),
            barcode: Set(barcode.to_string()),
            quantity_in_stock: Set(quantity_in_stock),
            category_id: Set(category_id),
            unit_size: Set(String::new()),
            description: Set(String::new()),
            discount: Set(String::new()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed product")
    }
}

/// Pull the `pos_session` cookie pair out of a response's Set-Cookie header.
pub fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("pos_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Parse a decimal field regardless of whether it was serialized as a
/// string or a bare number.
pub fn dec_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string field"),
        Value::Number(n) => n.to_string().parse().expect("decimal number field"),
        other => panic!("expected a decimal field, got {other}"),
    }
}

/// Read a response body as JSON, asserting the expected status first.
pub async fn json_body(response: axum::response::Response, expected: StatusCode) -> Value {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read response body")
        .to_bytes();
    assert_eq!(
        status,
        expected,
        "unexpected status, body: {}",
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}
