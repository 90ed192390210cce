//! Template filtering and default selection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// A stored HTML document skeleton.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub html_content: String,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl DocumentTemplate {
    pub fn has_type(&self, doc_type: &str) -> bool {
        self.doc_type.eq_ignore_ascii_case(doc_type)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.to_lowercase() == tag.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateFilter {
    Type(String),
    Tag(String),
}

impl TemplateFilter {
    pub fn matches(&self, template: &DocumentTemplate) -> bool {
        match self {
            TemplateFilter::Type(doc_type) => template.has_type(doc_type),
            TemplateFilter::Tag(tag) => template.has_tag(tag),
        }
    }
}

/// Active templates that pass `filter`, in input order.
pub fn filter_templates<'a>(
    candidates: &'a [DocumentTemplate],
    filter: &TemplateFilter,
) -> Vec<&'a DocumentTemplate> {
    candidates
        .iter()
        .filter(|t| t.is_active && filter.matches(t))
        .collect()
}

fn newest_first(a: &DocumentTemplate, b: &DocumentTemplate) -> Ordering {
    // None sorts last; equal or missing dates keep input order (stable sort)
    b.created_at.cmp(&a.created_at)
}

/// Pick the template a document of `doc_type` should use.
///
/// Preference order: a template flagged default, then one whose type matches
/// `doc_type`, then the most recently created one. When no creation dates
/// are known the first candidate wins. Empty input gives `None`.
pub fn resolve_default<'a>(
    filtered: &[&'a DocumentTemplate],
    doc_type: &str,
) -> Option<&'a DocumentTemplate> {
    let mut ordered: Vec<&'a DocumentTemplate> = filtered.to_vec();
    ordered.sort_by(|a, b| newest_first(a, b));

    ordered
        .iter()
        .find(|t| t.is_default)
        .or_else(|| ordered.iter().find(|t| t.has_type(doc_type)))
        .or_else(|| ordered.first())
        .copied()
}

/// Defaults first, then newest first.
pub fn sorted_for_display<'a>(templates: &[&'a DocumentTemplate]) -> Vec<&'a DocumentTemplate> {
    let mut sorted = templates.to_vec();
    sorted.sort_by(|a, b| b.is_default.cmp(&a.is_default).then_with(|| newest_first(a, b)));
    sorted
}

/// Tracks which template a document uses.
///
/// A template the user chose explicitly survives every [`refresh`] for as
/// long as it is still among the filtered candidates. Otherwise the
/// selection follows [`resolve_default`].
///
/// [`refresh`]: TemplateSelection::refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSelection {
    selected: Option<String>,
    user_chosen: bool,
}

impl TemplateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_user_chosen(&self) -> bool {
        self.user_chosen
    }

    /// Record an explicit user choice. Returns false when `id` does not pass
    /// the filter, leaving the selection unchanged.
    pub fn choose(
        &mut self,
        candidates: &[DocumentTemplate],
        filter: &TemplateFilter,
        id: &str,
    ) -> bool {
        let available = filter_templates(candidates, filter);
        if !available.iter().any(|t| t.id == id) {
            return false;
        }
        tracing::debug!(template = id, "template chosen by user");
        self.selected = Some(id.to_string());
        self.user_chosen = true;
        true
    }

    /// Re-evaluate after the candidate set or the filter changed.
    pub fn refresh<'a>(
        &mut self,
        candidates: &'a [DocumentTemplate],
        filter: &TemplateFilter,
        doc_type: &str,
    ) -> Option<&'a DocumentTemplate> {
        let available = filter_templates(candidates, filter);

        if self.user_chosen {
            if let Some(id) = self.selected.as_deref() {
                if let Some(kept) = available.iter().find(|t| t.id == id) {
                    return Some(*kept);
                }
            }
            self.user_chosen = false;
        }

        let resolved = resolve_default(&available, doc_type);
        self.selected = resolved.map(|t| t.id.clone());
        match resolved {
            Some(t) => tracing::debug!(template = %t.id, candidates = available.len(), "default template resolved"),
            None => tracing::debug!(?filter, "no template matched"),
        }
        resolved
    }
}
