//! Web server command.

use console::style;

use crate::config::Settings;
use crate::llm::LlmClient;

/// Start the API server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    settings.ensure_dirs()?;

    println!("{} Preparing database...", style("→").cyan());
    let ctx = settings.create_db_context();
    match ctx.init_schema().await {
        Ok(()) => {
            println!("  {} Database ready", style("✓").green());
        }
        Err(e) => {
            eprintln!("  {} Schema init failed: {}", style("✗").red(), e);
            return Err(anyhow::anyhow!("Database initialization failed: {}", e));
        }
    }

    // Surface backend availability up front; an unreachable Ollama is not
    // fatal here, uploads will just fail until it comes back.
    let llm = LlmClient::new(settings.llm.clone());
    let status = llm.status().await;
    if status.available {
        println!(
            "  {} Ollama is running with {} models available",
            style("✓").green(),
            status.model_count
        );
        if !status.models.is_empty() {
            let preview: Vec<_> = status.models.iter().take(5).cloned().collect();
            println!("    Models: {}", preview.join(", "));
        }
    } else {
        println!(
            "  {} Ollama not available: {}",
            style("⚠").yellow(),
            status.error.unwrap_or_else(|| "unknown error".to_string())
        );
        println!("    Please ensure Ollama is installed and running: https://ollama.ai");
    }

    println!(
        "{} Starting irsight server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8000" -> 127.0.0.1:8000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8000
/// - Host and port: "0.0.0.0:8000" -> 0.0.0.0:8000
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Treat as a bare host with the default port
    if !bind.is_empty() && !bind.contains(':') {
        return Ok((bind.to_string(), 8000));
    }

    Err(anyhow::anyhow!("Invalid bind address: {}", bind))
}
