use async_trait::async_trait;
use flashdeck_core::flashcard::{CardId, CardInput, Flashcard, GenerateRequest, GeneratedCard};
use reqwest::{Client, StatusCode};

use crate::{FlashcardService, ServiceError};

/// Async HTTP client implementation of FlashcardService.
/// Connects to a running flashcard store (flashdeck-server or a compatible API).
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the store is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Network(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = error_message(&body);

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Network(format!("{status}: {msg}"))
    }
}

/// Pull a message out of `{"error": ..}` or FastAPI-style `{"detail": ..}` bodies.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["error"]
                .as_str()
                .or_else(|| v["detail"].as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl FlashcardService for HttpService {
    async fn list_flashcards(&self) -> Result<Vec<Flashcard>, ServiceError> {
        self.get_json("/flashcards").await
    }

    async fn create_flashcard(&self, input: &CardInput) -> Result<Flashcard, ServiceError> {
        self.post_json("/flashcards", input).await
    }

    async fn update_flashcard(
        &self,
        id: CardId,
        input: &CardInput,
    ) -> Result<Flashcard, ServiceError> {
        self.put_json(&format!("/flashcards/{id}"), input).await
    }

    async fn delete_flashcard(&self, id: CardId) -> Result<(), ServiceError> {
        self.delete_req(&format!("/flashcards/{id}")).await
    }

    async fn generate_flashcards(
        &self,
        request: &GenerateRequest,
    ) -> Result<Vec<GeneratedCard>, ServiceError> {
        let resp = self
            .client
            .post(format!("{}/generate_flashcards", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::BAD_GATEWAY {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Generation(error_message(&body)));
        }
        handle_response(resp).await
    }
}
