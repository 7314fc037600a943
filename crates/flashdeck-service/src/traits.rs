use async_trait::async_trait;
use flashdeck_core::flashcard::{CardId, CardInput, Flashcard, GenerateRequest, GeneratedCard};
use flashdeck_core::FlashdeckError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Transport failures and non-success statuses reported by the store.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ServiceError::Network(_) | ServiceError::NotFound(_) | ServiceError::InvalidInput(_)
        )
    }
}

impl From<FlashdeckError> for ServiceError {
    fn from(e: FlashdeckError) -> Self {
        match e {
            FlashdeckError::NotFound(msg) => ServiceError::NotFound(msg),
            FlashdeckError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
        }
    }
}

/// The flashcard store contract.
///
/// The terminal front end programs against this trait.
/// `HttpService` talks to a remote store over HTTP.
/// `LocalService` keeps cards in process and backs the server.
///
/// Each call is a single attempt: no retries, no caching.
#[async_trait]
pub trait FlashcardService: Send + Sync {
    async fn list_flashcards(&self) -> Result<Vec<Flashcard>, ServiceError>;
    async fn create_flashcard(&self, input: &CardInput) -> Result<Flashcard, ServiceError>;
    async fn update_flashcard(
        &self,
        id: CardId,
        input: &CardInput,
    ) -> Result<Flashcard, ServiceError>;
    async fn delete_flashcard(&self, id: CardId) -> Result<(), ServiceError>;
    async fn generate_flashcards(
        &self,
        request: &GenerateRequest,
    ) -> Result<Vec<GeneratedCard>, ServiceError>;
}
