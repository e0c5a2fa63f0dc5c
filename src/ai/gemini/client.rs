use crate::credentials::CredentialPool;
use crate::models::DEFAULT_BASE_URL;
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Lightweight Gemini REST client shared by the text/image/chat/audio/video modules.
///
/// Every outbound call draws exactly one credential from the pool at send time,
/// except calls on a long-running operation, which reuse the credential slot
/// that submitted it. Operations are scoped to the submitting project.
#[derive(Clone)]
pub struct GeminiHttpClient {
    client: Client,
    credentials: Arc<CredentialPool>,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    pub fn new(credentials: Arc<CredentialPool>, timeout: Duration) -> Self {
        Self::new_with_client(credentials, timeout, Client::new())
    }

    pub fn new_with_client(
        credentials: Arc<CredentialPool>,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn credential(&self, pinned: Option<usize>) -> &str {
        match pinned {
            Some(slot) => self.credentials.credential_at(slot),
            None => self.credentials.next_credential(),
        }
    }

    async fn send(&self, builder: RequestBuilder, credential: &str) -> Result<reqwest::Response> {
        let response = builder
            .timeout(self.timeout)
            .header("x-goog-api-key", credential)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    async fn parse<Resp: DeserializeOwned>(response: reqwest::Response) -> Result<Resp> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
        credential: &str,
    ) -> Result<Resp> {
        let response = self
            .send(
                self.client
                    .post(&url)
                    .header("Content-Type", "application/json")
                    .json(request),
                credential,
            )
            .await?;
        Self::parse(response).await
    }

    /// Calls `generateContent` for the given model.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        model: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            normalize_model_id(model)
        );
        tracing::debug!("Sending generateContent request to Gemini (model: {})", model);
        self.post_to_url(url, request, self.credentials.next_credential()).await
    }

    /// Calls `predictLongRunning`, returning the operation resource and the
    /// credential slot that submitted it.
    pub async fn predict_long_running<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        model: &str,
        request: &Req,
    ) -> Result<(Resp, usize)> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url,
            normalize_model_id(model)
        );
        tracing::debug!("Submitting long-running job to Gemini (model: {})", model);
        let slot = self.credentials.next_slot();
        let operation = self
            .post_to_url(url, request, self.credentials.credential_at(slot))
            .await?;
        Ok((operation, slot))
    }

    /// Fetches a long-running operation by resource name (`models/.../operations/...`).
    /// `pinned` selects the credential slot; `None` draws the next one.
    pub async fn get_operation<Resp: DeserializeOwned>(
        &self,
        name: &str,
        pinned: Option<usize>,
    ) -> Result<Resp> {
        let url = format!("{}/v1beta/{}", self.base_url, name.trim_start_matches('/'));
        let response = self.send(self.client.get(&url), self.credential(pinned)).await?;
        Self::parse(response).await
    }

    /// Authenticated binary download of a provider-hosted asset.
    pub async fn download(&self, uri: &str, pinned: Option<usize>) -> Result<Vec<u8>> {
        let response = self.send(self.client.get(uri), self.credential(pinned)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Strips a leading `models/` so both bare and prefixed ids build the same URL.
pub fn normalize_model_id(model: &str) -> &str {
    let trimmed = model.trim().trim_matches('/');
    trimmed.strip_prefix("models/").unwrap_or(trimmed)
}
