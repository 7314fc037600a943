use std::sync::Arc;

use axum::Router;
use flashdeck_service::generate::CompletionBackend;
use flashdeck_service::LocalService;
use tokio::net::TcpListener;

use crate::routes::{build_router, InnerAppState};

/// Build a test router over an empty `:memory:` database with offline generation.
pub fn test_router() -> Router {
    router_for(LocalService::offline().unwrap())
}

/// Build a test router whose generator is the given backend.
pub fn test_router_with_backend(backend: Arc<dyn CompletionBackend>) -> Router {
    router_for(LocalService::in_memory(backend).unwrap())
}

fn router_for(service: LocalService) -> Router {
    build_router(Arc::new(InnerAppState { service }))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    spawn_router(test_router()).await
}

/// Like [`spawn_test_server`], but generation goes through `backend`.
pub async fn spawn_test_server_with_backend(backend: Arc<dyn CompletionBackend>) -> TestServer {
    spawn_router(test_router_with_backend(backend)).await
}

async fn spawn_router(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
