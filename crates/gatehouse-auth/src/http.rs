//! HTTP user verification backend.
//!
//! Calls a remote user service that owns the authoritative credential store.
//! Supports JSON (default) and bincode serialization via [`StoreCodec`].
//!
//! # Example
//!
//! ```no_run
//! use gatehouse_auth::http::HttpVerifier;
//! use gatehouse_config::StoreCodec;
//!
//! let store = HttpVerifier::new("https://users.example.internal", StoreCodec::Json, Some("node-token".into()));
//! ```

use std::time::Duration;

use async_trait::async_trait;
use gatehouse_config::{StoreCodec, StoreConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{AuthError, StoreUser, UserVerifier, Verification};

/// Verification backend that delegates to a remote user service.
#[derive(Debug)]
pub struct HttpVerifier {
    client: Client,
    verify_url: String,
    codec: StoreCodec,
    node_token: Option<String>,
}

impl HttpVerifier {
    /// Create a new HTTP verifier.
    ///
    /// `base_url` is the service URL; requests go to `{base_url}/verify`.
    /// `node_token` is sent as a Bearer token when set.
    pub fn new(base_url: impl Into<String>, codec: StoreCodec, node_token: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, codec, node_token)
    }

    /// Create with a custom reqwest [`Client`] (for timeouts, proxies, etc.).
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        codec: StoreCodec,
        node_token: Option<String>,
    ) -> Self {
        let base = base_url.into();
        let base = base.trim_end_matches('/');
        Self {
            client,
            verify_url: format!("{base}/verify"),
            codec,
            node_token,
        }
    }

    /// Build from the `[store]` section. Returns `Ok(None)` when no URL is configured.
    pub fn from_config(config: &StoreConfig) -> Result<Option<Self>, AuthError> {
        let Some(url) = config.http_url.as_deref() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AuthError::backend)?;
        Ok(Some(Self::with_client(
            client,
            url,
            config.codec,
            config.node_token.clone(),
        )))
    }

    /// Send a request and decode the response.
    async fn request<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        body: &Req,
    ) -> Result<Resp, AuthError> {
        let mut req = self.client.post(&self.verify_url);
        if let Some(ref token) = self.node_token {
            req = req.bearer_auth(token);
        }
        let resp = match self.codec {
            StoreCodec::Bincode => {
                let bytes = bincode::serialize(body).map_err(AuthError::backend)?;
                req.header("Content-Type", "application/octet-stream")
                    .body(bytes)
                    .send()
                    .await
                    .map_err(AuthError::backend)?
            }
            StoreCodec::Json => req.json(body).send().await.map_err(AuthError::backend)?,
        };

        if !resp.status().is_success() {
            return Err(AuthError::Backend(format!(
                "HTTP {}",
                resp.status().as_u16()
            )));
        }

        match self.codec {
            StoreCodec::Bincode => {
                let bytes = resp.bytes().await.map_err(AuthError::backend)?;
                bincode::deserialize(&bytes).map_err(AuthError::backend)
            }
            StoreCodec::Json => resp.json().await.map_err(AuthError::backend),
        }
    }
}

#[async_trait]
impl UserVerifier for HttpVerifier {
    async fn verify(
        &self,
        username: &str,
        password: &str,
        hashed: bool,
    ) -> Result<Verification, AuthError> {
        let req = wire::VerifyRequest {
            username,
            password,
            hashed,
        };
        let result: Result<wire::Verification, wire::StoreError> = self.request(&req).await?;
        result.map(Into::into).map_err(Into::into)
    }
}

// ── Wire types (must match the user service exactly) ──────────────

#[allow(missing_debug_implementations)]
mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize)]
    pub struct VerifyRequest<'a> {
        pub username: &'a str,
        pub password: &'a str,
        pub hashed: bool,
    }

    #[derive(Serialize, Deserialize)]
    pub enum Verification {
        Valid {
            user: String,
            groups: Vec<String>,
            extra: Vec<(String, String)>,
        },
        UnknownUser,
        BadPassword,
    }

    #[derive(Serialize, Deserialize)]
    pub enum StoreError {
        Backend(String),
        Unavailable,
    }
}

// ── Wire ↔ core conversions ───────────────────────────────────────

impl From<wire::Verification> for Verification {
    fn from(w: wire::Verification) -> Self {
        match w {
            wire::Verification::Valid {
                user,
                groups,
                extra,
            } => Verification::Valid(StoreUser {
                user,
                groups: groups.into_iter().collect(),
                extra: extra.into_iter().collect(),
            }),
            wire::Verification::UnknownUser => Verification::UnknownUser,
            wire::Verification::BadPassword => Verification::BadPassword,
        }
    }
}

impl From<wire::StoreError> for AuthError {
    fn from(w: wire::StoreError) -> Self {
        match w {
            wire::StoreError::Backend(s) => Self::Backend(s),
            wire::StoreError::Unavailable => Self::Backend("user service unavailable".into()),
        }
    }
}
