//! `chatfolio ask` — One-shot question through the same pipeline as
//! `POST /api/chat`.

use chatfolio_gateway::validate::validate_value;
use chatfolio_knowledge::build_system_prompt;
use chatfolio_providers::CompletionClient;

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let knowledge = super::load_knowledge(&config)?;

    let message = validate_value(&serde_json::json!({ "message": message }))?;
    let system_prompt = build_system_prompt(&knowledge)?;

    let client = CompletionClient::from_config(&config)?;
    if !client.is_configured() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or add them to .env):");
        eprintln!("    OPENAI_API_KEY    = 'sk-...'");
        eprintln!("    CHATFOLIO_API_KEY = 'sk-...'");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let answer = client.complete(&system_prompt, &message).await?;
    println!("{answer}");

    Ok(())
}
