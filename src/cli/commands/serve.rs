//! Serve command implementation.

use crate::chat::ChatEngine;
use crate::cli::Output;
use crate::config::Settings;
use crate::server;
use anyhow::Result;

/// Run the chat API server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or(&settings.server.host);
    let port = port.unwrap_or(settings.server.port);

    let engine = ChatEngine::from_settings(&settings)?;
    let app = server::router(engine);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Paddock Chat Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Chat UI", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Liveness", "GET  /api/chat");
    Output::kv("Chat", "POST /api/chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
