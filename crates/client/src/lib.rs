//! HTTP client for the rally API.
//!
//! [`SignupApiClient`] posts signup payloads and fetches resolved pages
//! using [`reqwest`]. It implements [`StepSubmitter`], so a
//! [`rally_core::signup::flow::SignupFlow`] can drive it directly.

use async_trait::async_trait;
use rally_core::page::ResolvedPageView;
use rally_core::signup::flow::{SignupPayload, StepSubmitter, SubmissionError};
use rally_core::signup::SIGNUP_ENDPOINT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// Errors from the rally API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL has no path to append endpoints to (e.g. `mailto:`).
    #[error("Base URL cannot carry a path: {0}")]
    NotABase(String),

    /// The API returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for one rally API origin.
#[derive(Debug, Clone)]
pub struct SignupApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl SignupApiClient {
    /// * `base_url` - API origin, e.g. `http://api:5000`. A trailing slash is ignored.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::NotABase(base_url.into()));
        }
        Ok(Self { client, base_url })
    }

    /// `POST /api/v1/signup` with the flattened step values and page code.
    pub async fn submit_signup(&self, payload: &SignupPayload) -> Result<(), ClientError> {
        let url = self.endpoint(signup_segments())?;
        let response = self.client.post(url).json(payload).send().await?;

        Self::ensure_success(response).await?;
        tracing::debug!(code = payload.code(), "Signup step accepted");
        Ok(())
    }

    /// `GET /api/v1/pages/{code}`. The code is sent as one percent-encoded
    /// path segment.
    ///
    /// A 404 is `Ok(None)`; the page does not exist in the campaign the
    /// base URL's host maps to.
    pub async fn fetch_page(&self, code: &str) -> Result<Option<ResolvedPageView>, ClientError> {
        let url = self.endpoint(["api", "v1", "pages", code])?;
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: DataEnvelope<ResolvedPageView> = Self::parse_response(response).await?;
        Ok(Some(envelope.data))
    }

    /// Append `segments` to the base URL, encoding each one.
    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::NotABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

fn signup_segments() -> impl Iterator<Item = &'static str> {
    SIGNUP_ENDPOINT.split('/').filter(|s| !s.is_empty())
}

/// Pull the `error` message out of an API error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty())
}

impl From<ClientError> for SubmissionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, body } => SubmissionError::Rejected {
                status,
                message: error_message(&body),
            },
            ClientError::Request(e) => SubmissionError::Transport(Box::new(e)),
            other @ (ClientError::InvalidUrl(_) | ClientError::NotABase(_)) => {
                SubmissionError::Transport(Box::new(other))
            }
        }
    }
}

#[async_trait]
impl StepSubmitter for SignupApiClient {
    async fn submit(&self, payload: &SignupPayload) -> Result<(), SubmissionError> {
        self.submit_signup(payload).await.map_err(|e| {
            tracing::warn!(code = payload.code(), error = %e, "Signup step rejected");
            SubmissionError::from(e)
        })
    }
}
