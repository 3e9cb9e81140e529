//! Command catalog: the fixed set of commands and their input shapes
//!
//! The catalog is purely descriptive. It enumerates every command the server
//! understands and advertises each one's JSON-Schema input shape verbatim to
//! `tools/list` callers. Validation is owned by the dispatcher, which
//! deserializes arguments into typed structs; the two can't diverge because
//! the schemas here are documentation of those structs, not a second rule
//! engine.

use serde_json::{Value, json};

/// The closed set of commands the dispatcher understands.
///
/// One variant per command; routing is an exhaustive match, so adding a
/// command without a handler fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateSession,
    CreateWindow,
    AddElement,
    GetStats,
    CreateTemplate,
    ListTemplates,
}

impl Command {
    /// Every command, in the order advertised to callers.
    pub const ALL: [Command; 6] = [
        Command::CreateSession,
        Command::CreateWindow,
        Command::AddElement,
        Command::GetStats,
        Command::CreateTemplate,
        Command::ListTemplates,
    ];

    /// Resolve a wire name to a command. `None` for anything unrecognized.
    pub fn from_name(name: &str) -> Option<Command> {
        match name {
            "create_context_session" => Some(Command::CreateSession),
            "create_context_window" => Some(Command::CreateWindow),
            "add_context_element" => Some(Command::AddElement),
            "get_context_stats" => Some(Command::GetStats),
            "create_prompt_template" => Some(Command::CreateTemplate),
            "list_prompt_templates" => Some(Command::ListTemplates),
            _ => None,
        }
    }

    /// Wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateSession => "create_context_session",
            Command::CreateWindow => "create_context_window",
            Command::AddElement => "add_context_element",
            Command::GetStats => "get_context_stats",
            Command::CreateTemplate => "create_prompt_template",
            Command::ListTemplates => "list_prompt_templates",
        }
    }

    /// Human-readable description advertised to callers.
    pub fn description(&self) -> &'static str {
        match self {
            Command::CreateSession => "Create a new context engineering session",
            Command::CreateWindow => "Create a new context window in a session",
            Command::AddElement => "Add an element to a context window",
            Command::GetStats => "Get statistics about the context engineering system",
            Command::CreateTemplate => "Create a new prompt template",
            Command::ListTemplates => "List available prompt templates",
        }
    }

    /// JSON Schema for this command's arguments, exposed unmodified through
    /// the discovery call.
    pub fn input_schema(&self) -> Value {
        match self {
            Command::CreateSession => json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Session name",
                        "default": "New Session"
                    },
                    "description": {
                        "type": "string",
                        "description": "Session description",
                        "default": ""
                    }
                }
            }),
            Command::CreateWindow => json!({
                "type": "object",
                "properties": {
                    "session_id": {
                        "type": "string",
                        "description": "The session ID"
                    },
                    "max_tokens": {
                        "type": "integer",
                        "description": "Maximum tokens",
                        "default": 8192
                    },
                    "reserved_tokens": {
                        "type": "integer",
                        "description": "Reserved tokens",
                        "default": 512
                    }
                },
                "required": ["session_id"]
            }),
            Command::AddElement => json!({
                "type": "object",
                "properties": {
                    "window_id": {
                        "type": "string",
                        "description": "The context window ID"
                    },
                    "content": {
                        "type": "string",
                        "description": "The content to add"
                    },
                    "type": {
                        "type": "string",
                        "enum": ["system", "user", "assistant"],
                        "default": "user"
                    },
                    "priority": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 10,
                        "default": 5
                    }
                },
                "required": ["window_id", "content"]
            }),
            Command::GetStats => json!({
                "type": "object",
                "properties": {}
            }),
            Command::CreateTemplate => json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Template name"
                    },
                    "description": {
                        "type": "string",
                        "description": "Template description"
                    },
                    "template": {
                        "type": "string",
                        "description": "Template content with {variables}"
                    },
                    "category": {
                        "type": "string",
                        "default": "general"
                    }
                },
                "required": ["name", "description", "template"]
            }),
            Command::ListTemplates => json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "Filter by category"
                    }
                }
            }),
        }
    }
}
