//! HTTP client for one resource-hub resource. Mirrors the five CRUD routes.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Status { status, .. } => Some(*status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[derive(Clone, Debug)]
pub struct ResourceClient {
    http: Client,
    url: String,
}

impl ResourceClient {
    /// `base` is the API root (e.g. `http://127.0.0.1:5000/api`), `resource` the mounted name.
    pub fn new(base: &str, resource: &str) -> Self {
        Self::with_client(Client::new(), base, resource)
    }

    pub fn with_client(http: Client, base: &str, resource: &str) -> Self {
        ResourceClient {
            http,
            url: format!("{}/{}", base.trim_end_matches('/'), resource),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.url, id)
    }

    pub async fn index<T: DeserializeOwned>(&self) -> Result<Vec<T>, ClientError> {
        let res = self.http.get(&self.url).send().await?;
        decode(res).await
    }

    pub async fn show<T: DeserializeOwned>(&self, id: &str) -> Result<T, ClientError> {
        let res = self.http.get(self.item_url(id)).send().await?;
        decode(res).await
    }

    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(&self, body: &B) -> Result<T, ClientError> {
        let res = self.http.post(&self.url).json(body).send().await?;
        decode(res).await
    }

    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let res = self.http.put(self.item_url(id)).json(body).send().await?;
        decode(res).await
    }

    pub async fn destroy<T: DeserializeOwned>(&self, id: &str) -> Result<T, ClientError> {
        let res = self.http.delete(self.item_url(id)).send().await?;
        decode(res).await
    }

    /// Untyped convenience: every item as raw JSON.
    pub async fn index_json(&self) -> Result<Vec<Value>, ClientError> {
        self.index().await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        tracing::debug!(status = %status, body = %body, "request failed");
        return Err(ClientError::Status { status, body });
    }
    Ok(res.json().await?)
}
