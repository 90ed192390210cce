use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Falls back to the organization's country when rendering.
    #[serde(default)]
    pub country: Option<String>,
    /// Case file reference shown on documents for this contact.
    #[serde(default)]
    pub dossier: Option<String>,
}
