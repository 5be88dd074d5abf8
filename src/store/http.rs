//! HTTP backend for the catalog port: a thin, retryable wrapper over the
//! marketplace REST API. Authentication happens once at construction; the
//! bearer credential is reused for every call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{CatalogStore, ConceptKind, ItemSummary, MediaHandle, SourceRecord};
use crate::common::error::{Result, SyncError};
use crate::domain::{Actor, Concept, ToolEntry};
use crate::vocab::KEYWORD_VOCABULARY;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;

pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    /// Full Authorization header value, read-only after construction.
    token: String,
}

impl HttpCatalog {
    /// Sign in with credentials; the bearer credential comes back in the
    /// Authorization response header.
    pub async fn sign_in(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let client = reqwest::Client::new();
        let url = format!("{}/auth/sign-in", base_url.trim_end_matches('/'));
        let resp = client
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SyncError::Auth(format!(
                "sign-in rejected with status {}",
                resp.status()
            )));
        }
        let token = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                SyncError::Auth("sign-in response carried no Authorization header".to_string())
            })?;
        debug!("signed in to catalog");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Use a pre-issued token instead of signing in.
    pub fn with_token(base_url: &str, token: &str) -> Self {
        let token = if token.starts_with("Bearer ") {
            token.to_string()
        } else {
            format!("Bearer {token}")
        };
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send(
            || {
                self.client
                    .get(self.url(path))
                    .query(query)
                    .header(AUTHORIZATION, &self.token)
            },
            None,
        )
        .await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(
            || {
                self.client
                    .post(self.url(path))
                    .json(body)
                    .header(AUTHORIZATION, &self.token)
            },
            Some(body),
        )
        .await
    }

    async fn patch_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(
            || {
                self.client
                    .patch(self.url(path))
                    .json(body)
                    .header(AUTHORIZATION, &self.token)
            },
            Some(body),
        )
        .await
    }

    /// Send with retry on transient transport failures, then validate.
    async fn send<F>(&self, build: F, payload: Option<&Value>) -> Result<Value>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        let resp = loop {
            attempt += 1;
            match build().send().await {
                Ok(resp) => break resp,
                Err(e) if attempt < MAX_ATTEMPTS && (e.is_connect() || e.is_timeout()) => {
                    warn!(attempt, error = %e, "transient transport error, retrying");
                    tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e.into()),
            }
        };
        Self::validate(resp, payload).await
    }

    /// Shared response validation: non-2xx raises a hard error carrying the
    /// request payload and the server feedback; a soft conflict-at-source
    /// marker in a successful response is surfaced as a warning.
    async fn validate(resp: reqwest::Response, payload: Option<&Value>) -> Result<Value> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(SyncError::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    "no feedback from server".to_string()
                } else {
                    body
                },
                payload: payload.map(|p| p.to_string()),
            });
        }

        let value: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };
        if value
            .get("conflict-at-source")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            warn!("server reported a conflict-at-source on this record");
        }
        Ok(value)
    }

    fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
        serde_json::from_value(value)
            .map_err(|e| SyncError::MalformedResponse(format!("cannot decode {what}: {e}")))
    }

    fn decode_field<T: DeserializeOwned>(value: &Value, field: &str) -> Result<T> {
        let inner = value.get(field).cloned().ok_or_else(|| {
            SyncError::MalformedResponse(format!("response missing '{field}' field"))
        })?;
        Self::decode(inner, field)
    }
}

#[async_trait]
impl CatalogStore for HttpCatalog {
    async fn find_source_by_url(&self, url: &str) -> Result<Option<SourceRecord>> {
        let value = self.get_json("/sources", &[("q", url)]).await?;
        let sources: Vec<SourceRecord> = Self::decode_field(&value, "sources")?;
        Ok(sources.into_iter().find(|s| s.url == url))
    }

    async fn create_source(
        &self,
        label: &str,
        url: &str,
        url_template: Option<&str>,
    ) -> Result<SourceRecord> {
        let body = json!({
            "label": label,
            "url": url,
            "urlTemplate": url_template,
        });
        let value = self.post_json("/sources", &body).await?;
        Self::decode(value, "source")
    }

    async fn search_actors(&self, name: &str) -> Result<Vec<Actor>> {
        let value = self.get_json("/actor-search", &[("q", name)]).await?;
        Self::decode_field(&value, "actors")
    }

    async fn create_actor(&self, actor: &Actor) -> Result<Actor> {
        let body = serde_json::to_value(actor)?;
        let value = self.post_json("/actors", &body).await?;
        Self::decode(value, "actor")
    }

    async fn search_concepts(&self, query: &str, kind: ConceptKind) -> Result<Vec<Concept>> {
        let value = self
            .get_json("/concept-search", &[("q", query), ("types", kind.as_query())])
            .await?;
        Self::decode_field(&value, "concepts")
    }

    async fn create_keyword_concept(&self, concept: &Concept) -> Result<Concept> {
        let vocabulary = concept
            .vocabulary
            .as_ref()
            .map(|v| v.code.as_str())
            .unwrap_or(KEYWORD_VOCABULARY);
        let body = serde_json::to_value(concept)?;
        let value = self
            .post_json(&format!("/vocabularies/{vocabulary}/concepts"), &body)
            .await?;
        Self::decode(value, "concept")
    }

    async fn import_thumbnail(&self, source_url: &str) -> Result<MediaHandle> {
        let body = json!({ "sourceUrl": source_url });
        let value = self.post_json("/media/upload/import", &body).await?;
        Self::decode(value, "media handle")
    }

    async fn search_items(&self, label: &str, source_label: &str) -> Result<Vec<ItemSummary>> {
        let value = self
            .get_json(
                "/item-search",
                &[
                    ("q", label),
                    ("f.source", source_label),
                    ("categories", "tool-or-service"),
                ],
            )
            .await?;
        Self::decode_field(&value, "items")
    }

    async fn create_tool(&self, entry: &ToolEntry) -> Result<ItemSummary> {
        let body = serde_json::to_value(entry)?;
        let value = self.post_json("/tools-services", &body).await?;
        Self::decode(value, "tool entry")
    }

    async fn update_tool(&self, id: i64, entry: &ToolEntry) -> Result<ItemSummary> {
        let body = serde_json::to_value(entry)?;
        let value = self.patch_json(&format!("/tools-services/{id}"), &body).await?;
        Self::decode(value, "tool entry")
    }
}
