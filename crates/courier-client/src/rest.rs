//! Async REST client for the Courier API.
//!
//! Plaintext never reaches the wire: [`RestClient::send_message`] fetches the
//! recipient's public key and seals locally before posting.

use async_trait::async_trait;
use courier_common::{
    crypto::{public_key_from_pem, seal},
    models::{
        envelope::{Envelope, MessagesResponse, SendMessageResponse},
        identity::{LoginResponse, PublicKeyResponse, RegisterResponse},
    },
};
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{ClientError, Result};
use crate::sync::MessageSource;

const DEFAULT_BASE: &str = "http://localhost:5000";

/// Async Courier REST client.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut h = header::HeaderMap::new();
                h.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/json"),
                );
                h
            })
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE).trim_end_matches('/').to_owned(),
            token: None,
        })
    }

    /// Use an existing session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let msg = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: msg,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    // ── Accounts ──────────────────────────────────────────────────────────────

    /// Register a new identity. The returned private key is not kept anywhere
    /// else unless the server retains keys; store it.
    pub async fn register(&self, email: &str, phone: &str, password: &str) -> Result<RegisterResponse> {
        self.post(
            "/register",
            &json!({ "email": email, "phone": phone, "password": password }),
        )
        .await
    }

    /// Log in and keep the session token for subsequent calls.
    pub async fn login(&mut self, code: &str, password: &str) -> Result<LoginResponse> {
        let resp: LoginResponse = self
            .post("/login", &json!({ "code": code, "password": password }))
            .await?;
        self.token = Some(resp.token.clone());
        Ok(resp)
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    /// SPKI PEM public key of `id`.
    pub async fn public_key(&self, id: &str) -> Result<String> {
        let resp: PublicKeyResponse = self.get(&format!("/public-key/{id}")).await?;
        Ok(resp.public_key)
    }

    /// Seal `text` for `to` and submit it.
    pub async fn send_message(&self, to: &str, text: &str) -> Result<()> {
        let recipient = public_key_from_pem(&self.public_key(to).await?)?;
        let sealed = seal(text.as_bytes(), &recipient)?;

        let _: SendMessageResponse = self
            .post(
                "/send-message",
                &json!({
                    "to": to,
                    "encryptedMessage": sealed.encrypted_message,
                    "encryptedAESKey": sealed.encrypted_aes_key,
                }),
            )
            .await?;
        tracing::debug!(to = %to, "Message sent");
        Ok(())
    }

    /// Drain the pending queue.
    pub async fn fetch_messages(&self) -> Result<Vec<Envelope>> {
        let resp: MessagesResponse = self.get("/fetch-messages").await?;
        Ok(resp.messages)
    }

    pub async fn message_history(&self) -> Result<Vec<Envelope>> {
        let resp: MessagesResponse = self.get("/message-history").await?;
        Ok(resp.messages)
    }
}

#[async_trait]
impl MessageSource for RestClient {
    async fn fetch_pending(&self) -> Result<Vec<Envelope>> {
        self.fetch_messages().await
    }

    async fn fetch_history(&self) -> Result<Vec<Envelope>> {
        self.message_history().await
    }
}
