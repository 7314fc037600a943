pub mod error;
pub mod flashcard;
pub mod topics;

pub use error::FlashdeckError;
pub use flashcard::{
    normalize_topic, CardId, CardInput, Flashcard, GenerateRequest, GeneratedCard, ALL_TOPICS,
    DEFAULT_TOPIC, GENERATE_BATCH_SIZE,
};
pub use topics::TopicSet;
