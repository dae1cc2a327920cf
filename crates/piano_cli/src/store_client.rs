//! HTTP client for the melody service.

use async_trait::async_trait;
use log::debug;
use piano_core::{Melody, MelodyStore, NewMelody, StoreError};
use reqwest::{Client, Response};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `MelodyStore` backed by the REST API at `{base_url}/api/melodies`.
#[derive(Debug, Clone)]
pub struct HttpMelodyStore {
    client: Client,
    endpoint: String,
}

impl HttpMelodyStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: melodies_endpoint(base_url),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MelodyStore for HttpMelodyStore {
    async fn list(&self) -> Result<Vec<Melody>, StoreError> {
        debug!("event=store_list module=client status=start");
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        accept(response)
            .await?
            .json::<Vec<Melody>>()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))
    }

    async fn create(&self, draft: &NewMelody) -> Result<Melody, StoreError> {
        debug!("event=store_create module=client status=start");
        let response = self
            .client
            .post(&self.endpoint)
            .json(draft)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        accept(response)
            .await?
            .json::<Melody>()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))
    }
}

fn melodies_endpoint(base_url: &str) -> String {
    format!("{}/api/melodies", base_url.trim().trim_end_matches('/'))
}

/// Passes success responses through; turns others into `Rejected` with the
/// backend's `{message}` when it sent one.
async fn accept(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message: rejection_message(&text),
    })
}

fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "no error message".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{melodies_endpoint, rejection_message};

    #[test]
    fn endpoint_ignores_trailing_slashes() {
        assert_eq!(
            melodies_endpoint("http://localhost:5000/"),
            "http://localhost:5000/api/melodies"
        );
        assert_eq!(
            melodies_endpoint(" http://piano.test "),
            "http://piano.test/api/melodies"
        );
    }

    #[test]
    fn rejection_message_prefers_json_message() {
        assert_eq!(rejection_message(r#"{"message":"bad title"}"#), "bad title");
        assert_eq!(rejection_message("plain failure\n"), "plain failure");
        assert_eq!(rejection_message(""), "no error message");
    }
}
