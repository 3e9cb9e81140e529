//! In-memory domain store for context-engineering entities
//!
//! The store is the authoritative owner of three independent collections:
//! sessions, context windows, and prompt templates. Entities are created and
//! appended to, never updated in place or deleted; everything lives for the
//! lifetime of the process. The store is explicitly constructed and handed to
//! the dispatcher, so tests get isolation with a fresh instance each.

use crate::id::IdGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default session name when the caller provides none.
pub const DEFAULT_SESSION_NAME: &str = "New Session";

/// Default token budget for a new context window.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Default reserved-token headroom for a new context window.
pub const DEFAULT_RESERVED_TOKENS: u32 = 512;

/// Default category for a new prompt template.
pub const DEFAULT_TEMPLATE_CATEGORY: &str = "general";

/// Default priority for a new context element.
pub const DEFAULT_ELEMENT_PRIORITY: i64 = 5;

/// Inclusive priority bounds for context elements.
pub const PRIORITY_MIN: i64 = 1;
pub const PRIORITY_MAX: i64 = 10;

/// Errors raised by store mutations.
///
/// Only `add_element` can fail by contract; every other operation accepts
/// its input, applying defaults where fields are missing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Referenced context window does not exist
    #[error("Window {0} not found")]
    WindowNotFound(String),
}

/// Role of a context element within a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRole {
    System,
    #[default]
    User,
    Assistant,
}

/// Top-level grouping entity owning references to zero or more windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Window ids in creation order. Ids are appended when a window is
    /// created against this session; windows themselves live in the window
    /// collection.
    pub window_ids: Vec<String>,
}

/// A bounded container of ordered elements with a declared token budget.
///
/// `session_id` is a reference, not ownership: it is recorded as given and
/// may name a session that never existed. Nothing traverses it assuming the
/// session is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWindow {
    pub id: String,
    pub session_id: String,
    pub max_tokens: u32,
    pub reserved_tokens: u32,
    pub elements: Vec<ContextElement>,
    pub created_at: DateTime<Utc>,
}

/// One piece of content appended to a context window.
///
/// Elements have no independent id; they are addressed by position in their
/// window's sequence, which preserves append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextElement {
    pub content: String,
    #[serde(rename = "type")]
    pub role: ElementRole,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
}

/// A reusable parameterized text entity, independent of sessions and windows.
///
/// The template body is an opaque string; `{variable}` placeholders are not
/// validated for well-formedness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time collection counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreStats {
    pub sessions: usize,
    pub windows: usize,
    pub templates: usize,
    pub total_elements: usize,
}

/// Authoritative owner of all entity collections.
pub struct ContextStore {
    sessions: HashMap<String, Session>,
    windows: HashMap<String, ContextWindow>,
    /// Templates keep creation order for listing.
    templates: Vec<PromptTemplate>,
    ids: IdGenerator,
}

impl std::fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStore")
            .field("sessions", &self.sessions.len())
            .field("windows", &self.windows.len())
            .field("templates", &self.templates.len())
            .finish()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            windows: HashMap::new(),
            templates: Vec::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Create a session. Always succeeds; missing fields take defaults.
    pub fn create_session(
        &mut self,
        name: Option<String>,
        description: Option<String>,
    ) -> &Session {
        let id = self.ids.next();
        let session = Session {
            id: id.clone(),
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
            description: description.unwrap_or_default(),
            created_at: Utc::now(),
            window_ids: Vec::new(),
        };
        self.sessions.entry(id).or_insert(session)
    }

    /// Create a context window against a session reference.
    ///
    /// Always succeeds, even when `session_id` does not resolve: the
    /// reference is recorded as given. When it does resolve, the new window's
    /// id is appended to that session's `window_ids` before returning.
    /// A non-positive `max_tokens` falls back to the default so the budget
    /// invariant holds.
    pub fn create_window(
        &mut self,
        session_id: String,
        max_tokens: Option<u32>,
        reserved_tokens: Option<u32>,
    ) -> &ContextWindow {
        let id = self.ids.next();
        let window = ContextWindow {
            id: id.clone(),
            session_id: session_id.clone(),
            max_tokens: max_tokens.filter(|&t| t > 0).unwrap_or(DEFAULT_MAX_TOKENS),
            reserved_tokens: reserved_tokens.unwrap_or(DEFAULT_RESERVED_TOKENS),
            elements: Vec::new(),
            created_at: Utc::now(),
        };

        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.window_ids.push(id.clone());
        }

        self.windows.entry(id).or_insert(window)
    }

    /// Append an element to a window's sequence.
    ///
    /// Fails with [`StoreError::WindowNotFound`] when the window id is
    /// unknown, leaving every collection untouched. On success returns the
    /// window's element count after the append. Priority is clamped into
    /// `[1, 10]`.
    pub fn add_element(
        &mut self,
        window_id: &str,
        content: String,
        role: Option<ElementRole>,
        priority: Option<i64>,
    ) -> Result<usize, StoreError> {
        let window = self
            .windows
            .get_mut(window_id)
            .ok_or_else(|| StoreError::WindowNotFound(window_id.to_string()))?;

        window.elements.push(ContextElement {
            content,
            role: role.unwrap_or_default(),
            priority: priority
                .unwrap_or(DEFAULT_ELEMENT_PRIORITY)
                .clamp(PRIORITY_MIN, PRIORITY_MAX),
            created_at: Utc::now(),
        });

        Ok(window.elements.len())
    }

    /// Create a prompt template. Always succeeds.
    pub fn create_template(
        &mut self,
        name: String,
        description: String,
        template: String,
        category: Option<String>,
    ) -> &PromptTemplate {
        let entry = PromptTemplate {
            id: self.ids.next(),
            name,
            description,
            template,
            category: category.unwrap_or_else(|| DEFAULT_TEMPLATE_CATEGORY.to_string()),
            created_at: Utc::now(),
        };
        let idx = self.templates.len();
        self.templates.push(entry);
        &self.templates[idx]
    }

    /// List templates in creation order, optionally filtered by category.
    pub fn list_templates(&self, category: Option<&str>) -> Vec<&PromptTemplate> {
        self.templates
            .iter()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .collect()
    }

    /// Look up a session by id.
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Look up a window by id.
    pub fn window(&self, id: &str) -> Option<&ContextWindow> {
        self.windows.get(id)
    }

    /// Point-in-time counts across all collections.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sessions: self.sessions.len(),
            windows: self.windows.len(),
            templates: self.templates.len(),
            total_elements: self.windows.values().map(|w| w.elements.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_defaults() {
        let mut store = ContextStore::new();
        let session = store.create_session(None, None);
        assert_eq!(session.name, DEFAULT_SESSION_NAME);
        assert_eq!(session.description, "");
        assert!(session.window_ids.is_empty());
    }

    #[test]
    fn test_empty_session_name_takes_default() {
        let mut store = ContextStore::new();
        let session = store.create_session(Some(String::new()), None);
        assert_eq!(session.name, DEFAULT_SESSION_NAME);
    }

    #[test]
    fn test_window_links_back_to_session() {
        let mut store = ContextStore::new();
        let session_id = store.create_session(Some("s".into()), None).id.clone();
        let window_id = store
            .create_window(session_id.clone(), None, None)
            .id
            .clone();

        let session = store.session(&session_id).unwrap();
        assert_eq!(session.window_ids, vec![window_id]);
    }

    #[test]
    fn test_window_with_dangling_session_is_recorded() {
        let mut store = ContextStore::new();
        let window = store.create_window("no-such-session".into(), None, None);
        assert_eq!(window.session_id, "no-such-session");
        assert_eq!(store.stats().windows, 1);
        assert_eq!(store.stats().sessions, 0);
    }

    #[test]
    fn test_window_token_defaults() {
        let mut store = ContextStore::new();
        let window = store.create_window("s1".into(), None, None);
        assert_eq!(window.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(window.reserved_tokens, DEFAULT_RESERVED_TOKENS);
    }

    #[test]
    fn test_zero_max_tokens_falls_back_to_default() {
        let mut store = ContextStore::new();
        let window = store.create_window("s1".into(), Some(0), Some(0));
        assert_eq!(window.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(window.reserved_tokens, 0);
    }

    #[test]
    fn test_add_element_appends_in_order() {
        let mut store = ContextStore::new();
        let window_id = store.create_window("s1".into(), None, None).id.clone();

        let count = store
            .add_element(&window_id, "first".into(), Some(ElementRole::System), None)
            .unwrap();
        assert_eq!(count, 1);
        let count = store
            .add_element(&window_id, "second".into(), None, Some(7))
            .unwrap();
        assert_eq!(count, 2);

        let window = store.window(&window_id).unwrap();
        assert_eq!(window.elements[0].content, "first");
        assert_eq!(window.elements[0].role, ElementRole::System);
        assert_eq!(window.elements[0].priority, 5);
        assert_eq!(window.elements[1].content, "second");
        assert_eq!(window.elements[1].role, ElementRole::User);
        assert_eq!(window.elements[1].priority, 7);
    }

    #[test]
    fn test_add_element_unknown_window_fails_without_mutation() {
        let mut store = ContextStore::new();
        store.create_window("s1".into(), None, None);
        let before = store.stats();

        let err = store.add_element("missing", "content".into(), None, None);
        assert!(matches!(err, Err(StoreError::WindowNotFound(_))));

        let after = store.stats();
        assert_eq!(before.windows, after.windows);
        assert_eq!(before.total_elements, after.total_elements);
    }

    #[test]
    fn test_priority_is_clamped() {
        let mut store = ContextStore::new();
        let window_id = store.create_window("s1".into(), None, None).id.clone();

        store
            .add_element(&window_id, "hi".into(), None, Some(11))
            .unwrap();
        store
            .add_element(&window_id, "lo".into(), None, Some(-3))
            .unwrap();

        let window = store.window(&window_id).unwrap();
        assert_eq!(window.elements[0].priority, PRIORITY_MAX);
        assert_eq!(window.elements[1].priority, PRIORITY_MIN);
    }

    #[test]
    fn test_create_template_returns_new_entry() {
        let mut store = ContextStore::new();
        store.create_template("first".into(), "".into(), "{a}".into(), None);
        let template =
            store.create_template("second".into(), "d".into(), "{b}".into(), Some("code".into()));

        assert_eq!(template.name, "second");
        assert_eq!(template.category, "code");
        assert!(!template.id.is_empty());
        assert_eq!(store.list_templates(None).len(), 2);
    }

    #[test]
    fn test_template_category_filter() {
        let mut store = ContextStore::new();
        store.create_template("a".into(), "".into(), "{x}".into(), None);
        store.create_template("b".into(), "".into(), "{y}".into(), Some("code".into()));
        store.create_template("c".into(), "".into(), "{z}".into(), Some("code".into()));

        assert_eq!(store.list_templates(None).len(), 3);

        let code = store.list_templates(Some("code"));
        assert_eq!(code.len(), 2);
        assert!(code.iter().all(|t| t.category == "code"));
        assert_eq!(code[0].name, "b");
        assert_eq!(code[1].name, "c");

        assert!(store.list_templates(Some("missing")).is_empty());
        assert_eq!(store.list_templates(Some("general")).len(), 1);
    }

    #[test]
    fn test_stats_track_all_collections() {
        let mut store = ContextStore::new();
        let session_id = store.create_session(None, None).id.clone();
        store.create_session(None, None);
        let window_id = store
            .create_window(session_id, None, None)
            .id
            .clone();
        store.create_template("t".into(), "".into(), "x".into(), None);
        store
            .add_element(&window_id, "e".into(), None, None)
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.windows, 1);
        assert_eq!(stats.templates, 1);
        assert_eq!(stats.total_elements, 1);
    }
}
