use anyhow::Result;
use mock_server::ServerConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let listener = TcpListener::bind(config.addr()).await?;
    let public_url = match config.public_url {
        Some(url) => url,
        None => mock_server::public_url_for(listener.local_addr()?),
    };
    mock_server::serve(listener, &public_url).await?;
    Ok(())
}
