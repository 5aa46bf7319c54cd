use mock_server::{MockResponse, SharedJournal};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let journal = SharedJournal::default();
    if let Ok(path) = std::env::var("MOCK_SCRIPT") {
        let script: Vec<MockResponse> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        tracing::info!(%path, responses = script.len(), "loaded response script");
        let mut journal = journal.lock().await;
        for response in script {
            journal.enqueue(response);
        }
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    mock_server::run(listener, journal).await?;
    Ok(())
}
