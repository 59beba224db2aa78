//! Show installed and recommended models.

use console::style;

use crate::config::Settings;
use crate::llm::{recommended_models, LlmClient};

pub async fn cmd_models(settings: &Settings) -> anyhow::Result<()> {
    let llm = LlmClient::new(settings.llm.clone());

    match llm.list_models().await {
        Ok(installed) => {
            println!("{} Installed models ({}):", style("→").cyan(), installed.len());
            for model in &installed {
                println!("  {}", model);
            }
            if installed.is_empty() {
                println!("  (none - pull one with `ollama pull llama3.2`)");
            }
        }
        Err(e) => {
            println!("{} Could not reach Ollama: {}", style("✗").red(), e);
        }
    }

    println!();
    println!("{} Recommended for IR analysis:", style("→").cyan());
    for rec in recommended_models() {
        let marker = if rec.recommended {
            style("*").green()
        } else {
            style(" ").dim()
        };
        println!(
            "  {} {:<12} {:>5}  {}",
            marker, rec.name, rec.size, rec.description
        );
    }

    Ok(())
}
