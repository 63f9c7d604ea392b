//! `chatfolio init` — Write a starter config file.

use chatfolio_config::AppConfig;

pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = AppConfig::default_path();

    if path.exists() && !force {
        println!("  Config already exists at {}", path.display());
        println!("  Re-run with --force to overwrite it.");
        return Ok(());
    }

    std::fs::write(&path, AppConfig::default_toml())
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

    println!("  ✅ Wrote {}", path.display());
    println!("  Set OPENAI_API_KEY (or api_key in the file) before starting the server.");
    Ok(())
}
