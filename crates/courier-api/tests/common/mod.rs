//! Fixtures shared by the API integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use courier_api::{build_router, AppState};
use courier_common::config::{
    AppConfig, AuthConfig, CryptoConfig, DatabaseConfig, LimitsConfig, ServerConfig,
};
use courier_db::{
    repository::identities::{self, NewIdentity},
    Database,
};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn config(retain_private_keys: bool) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: SECRET.into(),
            access_token_ttl_secs: 300,
            retain_private_keys,
        },
        crypto: CryptoConfig { rsa_bits: 2048 },
        limits: LimitsConfig {
            max_payload_bytes: 1_048_576,
        },
    }
}

pub struct TestApp {
    pub db: Database,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(config(false)).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = Database::in_memory().await.unwrap();
        let state = AppState::from_config(db.clone(), &config).unwrap();
        Self {
            db,
            router: build_router(state),
        }
    }

    /// Insert an identity directly, skipping key generation.
    pub async fn seed_identity(&self, id: &str, public_key: &str) {
        let email = format!("{id}@example.test");
        identities::create_identity(
            &self.db.pool,
            NewIdentity {
                id,
                email: &email,
                phone: id,
                password_hash: "unused",
                public_key,
                private_key: None,
                created_at: 0,
            },
        )
        .await
        .unwrap();
    }

    pub fn token_for(&self, id: &str) -> String {
        courier_api::auth::generate_access_token(id, &format!("{id}@example.test"), SECRET, 300)
            .unwrap()
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(json) => {
                self.raw(method, uri, token, Some("application/json"), json.to_string())
                    .await
            }
            None => self.raw(method, uri, token, None, String::new()).await,
        }
    }

    /// Send `body` verbatim with the given content type, if any.
    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }
}
