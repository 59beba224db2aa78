//! Initialize the data directory and database schema.

use console::style;

use crate::config::Settings;

pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_dirs()?;
    println!(
        "{} Data directory: {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;
    println!(
        "{} Database ready: {}",
        style("✓").green(),
        settings.database_url()
    );

    Ok(())
}
