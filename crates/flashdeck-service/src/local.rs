use std::sync::Arc;

use async_trait::async_trait;
use flashdeck_core::flashcard::{CardId, CardInput, Flashcard, GenerateRequest, GeneratedCard};
use tracing::warn;

use crate::generate::{self, CompletionBackend, GenerateError, OfflineBackend};
use crate::store::SqliteStore;
use crate::{FlashcardService, ServiceError};

/// In-process implementation: cards live in SQLite, generation runs through
/// a [`CompletionBackend`].
pub struct LocalService {
    store: SqliteStore,
    generator: Arc<dyn CompletionBackend>,
}

impl LocalService {
    pub fn new(store: SqliteStore, generator: Arc<dyn CompletionBackend>) -> Self {
        Self { store, generator }
    }

    /// A service over a fresh in-memory database.
    pub fn in_memory(generator: Arc<dyn CompletionBackend>) -> Result<Self, ServiceError> {
        Ok(Self::new(SqliteStore::open_in_memory()?, generator))
    }

    /// An in-memory service using the canned offline decks for generation.
    pub fn offline() -> Result<Self, ServiceError> {
        Self::in_memory(Arc::new(OfflineBackend))
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }
}

impl From<GenerateError> for ServiceError {
    fn from(e: GenerateError) -> Self {
        ServiceError::Generation(e.to_string())
    }
}

#[async_trait]
impl FlashcardService for LocalService {
    async fn list_flashcards(&self) -> Result<Vec<Flashcard>, ServiceError> {
        self.store.list()
    }

    async fn create_flashcard(&self, input: &CardInput) -> Result<Flashcard, ServiceError> {
        input.validate()?;
        self.store.insert(input)
    }

    async fn update_flashcard(
        &self,
        id: CardId,
        input: &CardInput,
    ) -> Result<Flashcard, ServiceError> {
        input.validate()?;
        self.store.update(id, input)
    }

    async fn delete_flashcard(&self, id: CardId) -> Result<(), ServiceError> {
        self.store.delete(id)
    }

    async fn generate_flashcards(
        &self,
        request: &GenerateRequest,
    ) -> Result<Vec<GeneratedCard>, ServiceError> {
        request.validate()?;
        generate::generate_cards(self.generator.as_ref(), request)
            .await
            .map_err(|e| {
                warn!(topic = %request.topic, "generation failed: {e}");
                ServiceError::from(e)
            })
    }
}
