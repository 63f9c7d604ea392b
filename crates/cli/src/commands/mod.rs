pub mod ask;
pub mod doctor;
pub mod init;
pub mod prompt;
pub mod serve;

use chatfolio_config::AppConfig;
use chatfolio_knowledge::KnowledgeRecord;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub(crate) fn load_knowledge(
    config: &AppConfig,
) -> Result<KnowledgeRecord, Box<dyn std::error::Error>> {
    Ok(KnowledgeRecord::load(config.knowledge.path.as_deref())
        .map_err(|e| format!("Failed to load knowledge: {e}"))?)
}
