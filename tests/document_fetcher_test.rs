use std::net::SocketAddr;

use axum::{
    http::{header, StatusCode},
    routing::get,
    Router,
};
use mjbea::{
    config::FetcherConfig,
    error::AppError,
    integrations::{DocumentFetcher, HttpDocumentFetcher},
};
use tokio::net::TcpListener;

async fn serve_documents() -> anyhow::Result<SocketAddr> {
    let app = Router::new()
        .route(
            "/documents/birth-certificates/MJBEA242500001",
            get(|| async { ([(header::CONTENT_TYPE, "application/pdf")], b"%PDF-1.4".to_vec()) }),
        )
        .route(
            "/documents/photos/MJBEA242500001.png",
            get(|| async { (StatusCode::NOT_FOUND, "missing") }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(addr)
}

fn fetcher() -> anyhow::Result<HttpDocumentFetcher> {
    Ok(HttpDocumentFetcher::new(&FetcherConfig { timeout_secs: 5 })?)
}

#[tokio::test]
async fn test_fetch_returns_bytes_and_media_type() -> anyhow::Result<()> {
    let addr = serve_documents().await?;

    let fetched = fetcher()?
        .fetch(&format!("http://{addr}/documents/birth-certificates/MJBEA242500001"))
        .await?;

    assert_eq!(fetched.bytes, b"%PDF-1.4");
    assert_eq!(fetched.content_type.as_deref(), Some("application/pdf"));

    Ok(())
}

#[tokio::test]
async fn test_error_status_is_external_error() -> anyhow::Result<()> {
    let addr = serve_documents().await?;

    let result = fetcher()?
        .fetch(&format!("http://{addr}/documents/photos/MJBEA242500001.png"))
        .await;

    assert!(matches!(result, Err(AppError::External(ref m)) if m.contains("404")));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_is_external_error() -> anyhow::Result<()> {
    // Take a free port, then close it again
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let result = fetcher()?.fetch(&format!("http://{addr}/documents/photos/x.png")).await;
    assert!(matches!(result, Err(AppError::External(_))));

    Ok(())
}
