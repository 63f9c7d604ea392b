//! Knowledge record for Chatfolio.
//!
//! The record is the only source the assistant may answer from. It is built
//! once at startup, either from the embedded `data/knowledge.toml` or from a
//! TOML file named in configuration, validated, and then shared read-only for
//! the lifetime of the process.

pub mod prompt;

pub use prompt::{build_system_prompt, fallback_reply};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

const BUILTIN_KNOWLEDGE: &str = include_str!("../data/knowledge.toml");

/// Everything the assistant knows about the person it represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub personal_info: PersonalInfo,
    pub summary: ProfessionalSummary,

    /// Project catalog, in presentation order
    #[serde(default)]
    pub projects: Vec<Project>,

    /// Skill categories, in presentation order
    #[serde(default)]
    pub skills: Vec<SkillCategory>,

    #[serde(default)]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub experience: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalSummary {
    pub overview: String,
    pub specialization: String,
    pub expertise: String,
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier, used as the object key in the rendered catalog
    pub key: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub challenges_solved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub value: String,
}

/// Public projection of the record served by `GET /api/knowledge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeSummary {
    pub name: String,
    pub title: String,
    pub projects_count: usize,
    pub skills_categories: Vec<String>,
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub email: String,
    pub website: String,
}

impl KnowledgeRecord {
    /// The record compiled into the binary.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Self::from_toml_str(BUILTIN_KNOWLEDGE)
    }

    /// Parse and validate a record from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, KnowledgeError> {
        let record: Self =
            toml::from_str(content).map_err(|e| KnowledgeError::Parse(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Load a record from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, otherwise use the built-in record.
    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        let record = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::builtin()?,
        };
        info!(
            name = %record.personal_info.name,
            projects = record.projects.len(),
            source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "builtin".into()),
            "Knowledge record loaded"
        );
        Ok(record)
    }

    /// First word of the person's name, used in conversational text.
    pub fn first_name(&self) -> &str {
        self.personal_info
            .name
            .split_whitespace()
            .next()
            .unwrap_or(&self.personal_info.name)
    }

    pub fn summary(&self) -> KnowledgeSummary {
        KnowledgeSummary {
            name: self.personal_info.name.clone(),
            title: self.personal_info.title.clone(),
            projects_count: self.projects.len(),
            skills_categories: self.skills.iter().map(|s| s.category.clone()).collect(),
            contact: Contact {
                email: self.personal_info.email.clone(),
                website: self.personal_info.website.clone(),
            },
        }
    }

    /// Reject records the prompt builder could not render faithfully.
    fn validate(&self) -> Result<(), KnowledgeError> {
        if self.personal_info.name.trim().is_empty() {
            return Err(KnowledgeError::Invalid("personal_info.name is empty".into()));
        }
        if self.personal_info.email.trim().is_empty() {
            return Err(KnowledgeError::Invalid("personal_info.email is empty".into()));
        }

        ensure_unique("projects", self.projects.iter().map(|p| p.key.as_str()))?;
        ensure_unique("skills", self.skills.iter().map(|s| s.category.as_str()))?;
        ensure_unique("metrics", self.metrics.iter().map(|m| m.key.as_str()))?;

        Ok(())
    }
}

fn ensure_unique<'a>(
    section: &str,
    keys: impl Iterator<Item = &'a str>,
) -> Result<(), KnowledgeError> {
    let mut seen = HashSet::new();
    for key in keys {
        if key.trim().is_empty() {
            return Err(KnowledgeError::Invalid(format!("{section}: empty key")));
        }
        if !seen.insert(key) {
            return Err(KnowledgeError::Invalid(format!(
                "{section}: duplicate key '{key}'"
            )));
        }
    }
    Ok(())
}

/// Knowledge loading and rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge file at {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse knowledge record: {0}")]
    Parse(String),

    #[error("Invalid knowledge record: {0}")]
    Invalid(String),

    #[error("Failed to render knowledge record: {0}")]
    Render(#[from] serde_json::Error),
}
