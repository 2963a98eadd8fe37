//! Async HTTP client for the companion backend.

use std::future::Future;

use anyhow::Context;
use portal_core::{
  Error, Result,
  identity::{Identity, UNAUTHORIZED},
  root::{Health, Hello},
  source::{IdentitySource, SessionCredential},
};
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:    String,
  /// Name of the cookie the session credential travels in.
  pub cookie_name: String,
}

/// Async HTTP client for the backend's JSON endpoints.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. No request
/// timeout is set and nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Where the backend starts a login.
  pub fn login_url(&self) -> String {
    self.url("/login")
  }

  /// Where the backend ends the session.
  pub fn logout_url(&self) -> String {
    self.url("/logout")
  }

  fn with_session(
    &self,
    req: RequestBuilder,
    credential: Option<&SessionCredential>,
  ) -> RequestBuilder {
    match credential {
      Some(credential) => req.header(
        header::COOKIE,
        format!("{}={}", self.config.cookie_name, credential.expose()),
      ),
      None => req,
    }
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  async fn send(&self, req: RequestBuilder, label: &str) -> Result<Response> {
    let resp = req.send().await.map_err(|e| {
      let e = transport(&e);
      tracing::warn!(error = %e, "{label} failed");
      e
    })?;
    tracing::debug!(status = %resp.status(), "{label}");
    Ok(resp)
  }

  /// The body is parsed whatever the status; a non-success status only
  /// becomes the error when the body does not parse.
  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let label = format!("GET {path}");
    let resp = self.send(self.client.get(self.url(path)), &label).await?;
    let status = resp.status();
    let body = resp.bytes().await.map_err(|e| transport(&e))?;
    match serde_json::from_slice(&body) {
      Ok(value) => Ok(value),
      Err(_) if !status.is_success() => Err(Error::Status(status.as_u16())),
      Err(e) => Err(e.into()),
    }
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// `GET /api/me`
  pub async fn fetch_me(&self, credential: Option<&SessionCredential>) -> Result<Identity> {
    let req = self.with_session(self.client.get(self.url("/api/me")), credential);
    let resp = self.send(req, "GET /api/me").await?;

    let status = resp.status().as_u16();
    if status == UNAUTHORIZED {
      return Ok(Identity::Unauthenticated);
    }
    let body = resp.bytes().await.map_err(|e| transport(&e))?;
    Identity::from_response(status, &body)
  }

  // ── Root view ─────────────────────────────────────────────────────────────

  /// `GET /health`
  pub async fn health(&self) -> Result<Health> {
    self.get_json("/health").await
  }

  /// `GET /api/hello`
  pub async fn hello(&self) -> Result<Hello> {
    self.get_json("/api/hello").await
  }
}

impl IdentitySource for ApiClient {
  fn fetch_identity<'a>(
    &'a self,
    credential: Option<&'a SessionCredential>,
  ) -> impl Future<Output = Result<Identity>> + Send + 'a {
    self.fetch_me(credential)
  }
}

/// A transport error described by its whole `source()` chain, so the cause
/// ("Connection refused") survives next to reqwest's summary.
fn transport(error: &dyn std::error::Error) -> Error {
  let mut message = error.to_string();
  let mut source = error.source();
  while let Some(cause) = source {
    let text = cause.to_string();
    if !text.is_empty() && !message.contains(&text) {
      message.push_str(": ");
      message.push_str(&text);
    }
    source = cause.source();
  }
  Error::Transport(message)
}
