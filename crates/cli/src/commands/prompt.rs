//! `chatfolio prompt` — Print the rendered system prompt.

use chatfolio_knowledge::build_system_prompt;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let knowledge = super::load_knowledge(&config)?;
    print!("{}", build_system_prompt(&knowledge)?);
    Ok(())
}
