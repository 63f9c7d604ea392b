//! `chatfolio doctor` — Diagnose configuration and knowledge.

use chatfolio_config::AppConfig;
use chatfolio_core::provider::Provider;
use chatfolio_knowledge::build_system_prompt;
use chatfolio_providers::CompletionClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Chatfolio Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = std::env::var(chatfolio_config::CONFIG_PATH_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| AppConfig::default_path());
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ℹ️  No config file at {} — using defaults", config_path.display());
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Cannot continue without a valid configuration.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ❌ No API key — set OPENAI_API_KEY");
        issues += 1;
    }

    match chatfolio_knowledge::KnowledgeRecord::load(config.knowledge.path.as_deref()) {
        Ok(record) => {
            println!(
                "  ✅ Knowledge loaded: {} ({} projects, {} skill categories)",
                record.personal_info.name,
                record.projects.len(),
                record.skills.len()
            );
            match build_system_prompt(&record) {
                Ok(prompt) => println!("  ✅ System prompt renders ({} chars)", prompt.len()),
                Err(e) => {
                    println!("  ❌ System prompt failed to render: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Knowledge failed to load: {e}");
            issues += 1;
        }
    }

    if config.has_api_key() {
        let client = CompletionClient::from_config(&config)?;
        match Provider::health_check(client.provider().as_ref()).await {
            Ok(true) => println!("  ✅ Upstream reachable at {}", config.api_base_url),
            Ok(false) => {
                println!("  ⚠️  Upstream at {} rejected the health check", config.api_base_url);
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Upstream unreachable: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
