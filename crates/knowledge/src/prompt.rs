//! System prompt rendering.
//!
//! The prompt is a pure function of the knowledge record: no timestamps, no
//! randomness, and catalog order is preserved so two renders of the same
//! record are byte-identical.

use crate::{KnowledgeError, KnowledgeRecord, Project};
use serde::{Serialize, Serializer};

/// Render the complete system prompt, or fail without producing a partial one.
pub fn build_system_prompt(record: &KnowledgeRecord) -> Result<String, KnowledgeError> {
    let info = &record.personal_info;
    let summary = &record.summary;
    let first = record.first_name();

    let projects = to_pretty_json(&OrderedMap(
        record
            .projects
            .iter()
            .map(|p| (p.key.as_str(), ProjectView::from(p)))
            .collect(),
    ))?;
    let skills = to_pretty_json(&OrderedMap(
        record
            .skills
            .iter()
            .map(|s| (s.category.as_str(), s.items.as_slice()))
            .collect(),
    ))?;
    let metrics = to_pretty_json(&OrderedMap(
        record
            .metrics
            .iter()
            .map(|m| (m.key.as_str(), m.value.as_str()))
            .collect(),
    ))?;

    Ok(format!(
        "You are an AI assistant representing {name}, a {title}.

Your knowledge about {first} includes:

PERSONAL INFO:
- Name: {name}
- Title: {title}
- Experience: {experience}
- Location: {location}
- Email: {email}
- Phone: {phone}
- Website: {website}
- Company: {company}

PROFESSIONAL SUMMARY:
{overview} {specialization} {expertise} {goal}

PROJECTS:
{projects}

SKILLS:
{skills}

METRICS:
{metrics}

INSTRUCTIONS:
1. Answer questions about {name} based ONLY on the knowledge provided above
2. Be conversational, professional, and enthusiastic about {first}'s work
3. If asked about something not in your knowledge base, respond with: \"{fallback}\"
4. When discussing projects, be specific about technologies, features, and challenges solved
5. Always represent {first} in a professional and positive manner
6. If asked about contact information, provide {first}'s email and phone number
7. Keep responses concise but informative (2-3 paragraphs max unless specifically asked for more detail)
",
        name = info.name,
        title = info.title,
        experience = info.experience,
        location = info.location,
        email = info.email,
        phone = info.phone,
        website = info.website,
        company = info.company,
        overview = summary.overview,
        specialization = summary.specialization,
        expertise = summary.expertise,
        goal = summary.goal,
        fallback = fallback_reply(record),
    ))
}

/// The sentence the assistant must use when the record has no answer.
pub fn fallback_reply(record: &KnowledgeRecord) -> String {
    let first = record.first_name();
    format!(
        "I'm sorry, I don't have that specific information about {first} in my knowledge base. \
         You can contact {first} directly at {} for more details.",
        record.personal_info.email
    )
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, KnowledgeError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// A JSON object whose keys keep insertion order.
struct OrderedMap<'a, V>(Vec<(&'a str, V)>);

impl<V: Serialize> Serialize for OrderedMap<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// A project as it appears inside the catalog object (the key is the map key).
#[derive(Serialize)]
struct ProjectView<'a> {
    name: &'a str,
    description: &'a str,
    technologies: &'a [String],
    status: &'a str,
    features: &'a [String],
    challenges_solved: &'a [String],
}

impl<'a> From<&'a Project> for ProjectView<'a> {
    fn from(p: &'a Project) -> Self {
        Self {
            name: &p.name,
            description: &p.description,
            technologies: &p.technologies,
            status: &p.status,
            features: &p.features,
            challenges_solved: &p.challenges_solved,
        }
    }
}
