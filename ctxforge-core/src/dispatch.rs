//! Command dispatcher: the sole entry point for command execution
//!
//! The dispatcher maps a wire name to exactly one store operation,
//! deserializes the argument bag into that command's typed struct, and wraps
//! every outcome into one of two envelope shapes. It is stateless across
//! invocations; all side effects live in the store it owns.

use crate::catalog::Command;
use crate::store::{ContextStore, ElementRole, StoreError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Failure conditions converted into error envelopes at the dispatch
/// boundary. None of these propagate to the transport.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Invocation named a command absent from the catalog
    #[error("Unknown tool: {0}")]
    UnknownCommand(String),

    /// Arguments were present but malformed for the command's shape
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Arguments for `create_context_session`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionArgs {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Arguments for `create_context_window`.
#[derive(Debug, Deserialize)]
pub struct CreateWindowArgs {
    pub session_id: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub reserved_tokens: Option<u32>,
}

/// Arguments for `add_context_element`.
#[derive(Debug, Deserialize)]
pub struct AddElementArgs {
    pub window_id: String,
    pub content: String,
    #[serde(default, rename = "type")]
    pub role: Option<ElementRole>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// Arguments for `create_prompt_template`.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateArgs {
    pub name: String,
    pub description: String,
    pub template: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Arguments for `list_prompt_templates`.
#[derive(Debug, Default, Deserialize)]
pub struct ListTemplatesArgs {
    #[serde(default)]
    pub category: Option<String>,
}

/// Uniform result of one invocation: a JSON payload plus the out-of-band
/// failure flag the transport forwards distinctly from a normal payload.
#[derive(Debug, Clone)]
pub struct Reply {
    pub payload: Value,
    pub is_error: bool,
}

impl Reply {
    fn success(payload: Value) -> Self {
        Self {
            payload,
            is_error: false,
        }
    }

    fn failure(command: &str, error: &DispatchError) -> Self {
        Self {
            payload: json!({
                "error": error.to_string(),
                "tool": command,
            }),
            is_error: true,
        }
    }
}

/// Routes commands to the store and shapes the results.
#[derive(Debug, Default)]
pub struct Dispatcher {
    store: ContextStore,
}

impl Dispatcher {
    /// Create a dispatcher over a fresh store.
    pub fn new() -> Self {
        Self::with_store(ContextStore::new())
    }

    /// Create a dispatcher over an existing store.
    pub fn with_store(store: ContextStore) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Execute one command. Every invocation terminates in exactly one of
    /// the two envelope shapes; nothing panics or propagates.
    pub fn handle(&mut self, command: &str, args: Value) -> Reply {
        match self.execute(command, args) {
            Ok(payload) => Reply::success(payload),
            Err(error) => {
                tracing::debug!(command, %error, "command failed");
                Reply::failure(command, &error)
            }
        }
    }

    fn execute(&mut self, name: &str, args: Value) -> Result<Value, DispatchError> {
        let command =
            Command::from_name(name).ok_or_else(|| DispatchError::UnknownCommand(name.into()))?;

        // Callers may omit the argument bag entirely.
        let args = if args.is_null() { json!({}) } else { args };

        match command {
            Command::CreateSession => {
                let args: CreateSessionArgs = parse(args)?;
                let session = self.store.create_session(args.name, args.description);
                Ok(json!({
                    "success": true,
                    "session_id": session.id,
                    "message": format!("Session created: {}", session.name),
                }))
            }
            Command::CreateWindow => {
                let args: CreateWindowArgs = parse(args)?;
                let window =
                    self.store
                        .create_window(args.session_id, args.max_tokens, args.reserved_tokens);
                Ok(json!({
                    "success": true,
                    "window_id": window.id,
                    "message": format!(
                        "Context window created with {} max tokens",
                        window.max_tokens
                    ),
                }))
            }
            Command::AddElement => {
                let args: AddElementArgs = parse(args)?;
                let count = self.store.add_element(
                    &args.window_id,
                    args.content,
                    args.role,
                    args.priority,
                )?;
                Ok(json!({
                    "success": true,
                    "message": "Element added to context window",
                    "element_count": count,
                }))
            }
            Command::GetStats => {
                let stats = self.store.stats();
                Ok(json!({
                    "sessions": stats.sessions,
                    "windows": stats.windows,
                    "templates": stats.templates,
                    "total_elements": stats.total_elements,
                    "status": "operational",
                }))
            }
            Command::CreateTemplate => {
                let args: CreateTemplateArgs = parse(args)?;
                let template = self.store.create_template(
                    args.name,
                    args.description,
                    args.template,
                    args.category,
                );
                Ok(json!({
                    "success": true,
                    "template_id": template.id,
                    "message": format!("Template created: {}", template.name),
                }))
            }
            Command::ListTemplates => {
                let args: ListTemplatesArgs = parse(args)?;
                let templates = self.store.list_templates(args.category.as_deref());
                let total = templates.len();
                Ok(json!({
                    "templates": templates,
                    "total": total,
                }))
            }
        }
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, DispatchError> {
    serde_json::from_value(args).map_err(|e| DispatchError::InvalidArgs(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_id(dispatcher: &mut Dispatcher) -> String {
        let reply = dispatcher.handle("create_context_session", json!({"name": "test"}));
        reply.payload["session_id"].as_str().unwrap().to_string()
    }

    fn window_id(dispatcher: &mut Dispatcher, session: &str) -> String {
        let reply = dispatcher.handle("create_context_window", json!({"session_id": session}));
        reply.payload["window_id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_create_session_envelope() {
        let mut dispatcher = Dispatcher::new();
        let reply = dispatcher.handle("create_context_session", json!({"name": "research"}));

        assert!(!reply.is_error);
        assert_eq!(reply.payload["success"], true);
        assert!(reply.payload["session_id"].is_string());
        assert_eq!(reply.payload["message"], "Session created: research");
    }

    #[test]
    fn test_unknown_command_envelope() {
        let mut dispatcher = Dispatcher::new();
        let reply = dispatcher.handle("drop_tables", json!({}));

        assert!(reply.is_error);
        assert_eq!(reply.payload["error"], "Unknown tool: drop_tables");
        assert_eq!(reply.payload["tool"], "drop_tables");
        // Failed lookups never touch the store.
        assert_eq!(dispatcher.store().stats().sessions, 0);
    }

    #[test]
    fn test_window_defaults_applied() {
        let mut dispatcher = Dispatcher::new();
        let reply = dispatcher.handle("create_context_window", json!({"session_id": "s1"}));

        assert!(!reply.is_error);
        assert_eq!(
            reply.payload["message"],
            "Context window created with 8192 max tokens"
        );
        let id = reply.payload["window_id"].as_str().unwrap();
        let window = dispatcher.store().window(id).unwrap();
        assert_eq!(window.max_tokens, 8192);
        assert_eq!(window.reserved_tokens, 512);
    }

    #[test]
    fn test_window_appends_to_session() {
        let mut dispatcher = Dispatcher::new();
        let session = session_id(&mut dispatcher);
        let window = window_id(&mut dispatcher, &session);

        let stored = dispatcher.store().session(&session).unwrap();
        assert_eq!(stored.window_ids, vec![window]);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut dispatcher = Dispatcher::new();
        let reply = dispatcher.handle("create_context_window", json!({}));

        assert!(reply.is_error);
        assert_eq!(reply.payload["tool"], "create_context_window");
        assert!(
            reply.payload["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid arguments")
        );
    }

    #[test]
    fn test_wrong_typed_field_is_rejected() {
        let mut dispatcher = Dispatcher::new();
        let reply = dispatcher.handle(
            "create_context_window",
            json!({"session_id": "s1", "max_tokens": "lots"}),
        );
        assert!(reply.is_error);
    }

    #[test]
    fn test_add_element_counts() {
        let mut dispatcher = Dispatcher::new();
        let session = session_id(&mut dispatcher);
        let window = window_id(&mut dispatcher, &session);

        let reply = dispatcher.handle(
            "add_context_element",
            json!({"window_id": window, "content": "hello", "type": "system"}),
        );
        assert!(!reply.is_error);
        assert_eq!(reply.payload["success"], true);
        assert_eq!(reply.payload["element_count"], 1);
        assert_eq!(reply.payload["message"], "Element added to context window");

        let reply = dispatcher.handle(
            "add_context_element",
            json!({"window_id": window, "content": "again"}),
        );
        assert_eq!(reply.payload["element_count"], 2);
    }

    #[test]
    fn test_add_element_unknown_window() {
        let mut dispatcher = Dispatcher::new();
        let before = dispatcher.store().stats();

        let reply = dispatcher.handle(
            "add_context_element",
            json!({"window_id": "w-missing", "content": "x"}),
        );

        assert!(reply.is_error);
        assert_eq!(reply.payload["error"], "Window w-missing not found");
        assert_eq!(reply.payload["tool"], "add_context_element");

        let after = dispatcher.store().stats();
        assert_eq!(before.total_elements, after.total_elements);
        assert_eq!(before.windows, after.windows);
    }

    #[test]
    fn test_priority_out_of_range_is_clamped() {
        let mut dispatcher = Dispatcher::new();
        let session = session_id(&mut dispatcher);
        let window = window_id(&mut dispatcher, &session);

        dispatcher.handle(
            "add_context_element",
            json!({"window_id": window, "content": "x", "priority": 11}),
        );
        dispatcher.handle(
            "add_context_element",
            json!({"window_id": window, "content": "y", "priority": 0}),
        );

        let stored = dispatcher.store().window(&window).unwrap();
        assert_eq!(stored.elements[0].priority, 10);
        assert_eq!(stored.elements[1].priority, 1);
    }

    #[test]
    fn test_invalid_role_is_rejected() {
        let mut dispatcher = Dispatcher::new();
        let session = session_id(&mut dispatcher);
        let window = window_id(&mut dispatcher, &session);

        let reply = dispatcher.handle(
            "add_context_element",
            json!({"window_id": window, "content": "x", "type": "robot"}),
        );
        assert!(reply.is_error);
        assert_eq!(dispatcher.store().stats().total_elements, 0);
    }

    #[test]
    fn test_stats_envelope() {
        let mut dispatcher = Dispatcher::new();
        let session = session_id(&mut dispatcher);
        window_id(&mut dispatcher, &session);
        dispatcher.handle(
            "create_prompt_template",
            json!({"name": "t", "description": "d", "template": "Hi {name}"}),
        );

        let reply = dispatcher.handle("get_context_stats", Value::Null);
        assert!(!reply.is_error);
        assert_eq!(reply.payload["sessions"], 1);
        assert_eq!(reply.payload["windows"], 1);
        assert_eq!(reply.payload["templates"], 1);
        assert_eq!(reply.payload["total_elements"], 0);
        assert_eq!(reply.payload["status"], "operational");
    }

    #[test]
    fn test_list_templates_envelope_and_filter() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.handle(
            "create_prompt_template",
            json!({"name": "a", "description": "", "template": "{x}"}),
        );
        dispatcher.handle(
            "create_prompt_template",
            json!({"name": "b", "description": "", "template": "{y}", "category": "code"}),
        );

        let all = dispatcher.handle("list_prompt_templates", json!({}));
        assert_eq!(all.payload["total"], 2);
        assert_eq!(all.payload["templates"].as_array().unwrap().len(), 2);

        let code = dispatcher.handle("list_prompt_templates", json!({"category": "code"}));
        assert_eq!(code.payload["total"], 1);
        assert_eq!(code.payload["templates"][0]["name"], "b");
        assert_eq!(code.payload["templates"][0]["category"], "code");

        // Unfiltered listing is a superset of any filtered one.
        assert!(
            all.payload["total"].as_u64().unwrap() >= code.payload["total"].as_u64().unwrap()
        );
    }

    #[test]
    fn test_template_envelope() {
        let mut dispatcher = Dispatcher::new();
        let reply = dispatcher.handle(
            "create_prompt_template",
            json!({"name": "summarize", "description": "d", "template": "Summarize {text}"}),
        );

        assert!(!reply.is_error);
        assert_eq!(reply.payload["success"], true);
        assert!(reply.payload["template_id"].is_string());
        assert_eq!(reply.payload["message"], "Template created: summarize");
    }
}
