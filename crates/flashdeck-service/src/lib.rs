pub mod generate;
mod http;
mod local;
mod store;
mod traits;

pub use http::HttpService;
pub use local::LocalService;
pub use store::SqliteStore;
pub use traits::{FlashcardService, ServiceError};
