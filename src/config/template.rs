use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A template registration in templates.toml. The HTML body lives in a
/// separate file under `templates/`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TemplateEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub file: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_active() -> bool {
    true
}
