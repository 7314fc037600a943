use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use flashdeck_service::generate::{
    ChatCompletionsBackend, CompletionBackend, GenerateError, OfflineBackend,
    DEFAULT_COMPLETIONS_URL, DEFAULT_MODEL,
};
use flashdeck_service::{ServiceError, SqliteStore};

const IN_MEMORY_DB: &str = ":memory:";

#[derive(Debug, Parser)]
#[command(name = "flashdeck-server", about = "Flashcard store and generator API")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "FLASHDECK_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "FLASHDECK_PORT", default_value = "8000")]
    pub port: u16,

    /// SQLite database file (`:memory:` for a throwaway store)
    #[arg(long, env = "FLASHDECK_DB", default_value = "flashcards.db")]
    pub db: PathBuf,

    /// API key for the chat-completions service.
    /// Without one, generation serves canned offline decks.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name sent to the chat-completions service
    #[arg(long, env = "FLASHDECK_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Chat-completions endpoint
    #[arg(long, env = "FLASHDECK_COMPLETIONS_URL", default_value = DEFAULT_COMPLETIONS_URL)]
    pub completions_url: String,

    /// Timeout for one generation request (seconds)
    #[arg(long, env = "FLASHDECK_GENERATE_TIMEOUT", default_value = "30")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Open the card database named by `--db`.
    pub fn open_store(&self) -> Result<SqliteStore, ServiceError> {
        if self.db.as_os_str() == IN_MEMORY_DB {
            SqliteStore::open_in_memory()
        } else {
            SqliteStore::open_path(&self.db)
        }
    }

    /// The generation backend implied by this configuration.
    pub fn completion_backend(&self) -> Result<Arc<dyn CompletionBackend>, GenerateError> {
        match self.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(Arc::new(ChatCompletionsBackend::new(
                &self.completions_url,
                key.to_string(),
                &self.model,
                Duration::from_secs(self.timeout_secs),
            )?)),
            None => Ok(Arc::new(OfflineBackend)),
        }
    }
}
