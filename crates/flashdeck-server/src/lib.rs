pub mod config;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use flashdeck_service::LocalService;
use tokio::net::TcpListener;

pub async fn serve(listener: TcpListener, service: LocalService) -> Result<()> {
    let app = routes::build_router(Arc::new(routes::InnerAppState { service }));
    axum::serve(listener, app).await?;
    Ok(())
}
