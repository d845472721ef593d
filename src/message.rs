//! Chat message assembly.
//!
//! Turns an instruction, a prompt and the chunked files into the ordered
//! conversation sent to the endpoint.

use crate::splitter::ChunkMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed system message restricting answers to the supplied files.
pub const GUARDRAIL: &str =
    "Only answer based on the provided file contents; do not guess or bring in outside info.";

/// Prefix of the final user message carrying the prompt.
pub const PROMPT_PREFIX: &str = "User prompt: ";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model
    System,
    /// Content supplied by the user
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
        })
    }
}

/// A role-tagged entry of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Builds the conversation for one request.
///
/// The order is fixed: the trimmed instruction, the [`GUARDRAIL`], one user
/// message per chunk in map order, then the trimmed prompt.
///
/// # Examples
///
/// ```
/// use llm_read::{build_messages, ChunkMap, Role};
///
/// let messages = build_messages("  Be terse.  ", "  What is X?  ", &ChunkMap::new());
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[0].content, "Be terse.");
/// assert_eq!(messages[2].role, Role::User);
/// assert_eq!(messages[2].content, "User prompt: What is X?");
/// ```
#[must_use]
pub fn build_messages(instruction: &str, prompt: &str, chunks: &ChunkMap) -> Vec<Message> {
    let mut messages = Vec::with_capacity(chunks.total_chunks() + 3);
    messages.push(Message::system(instruction.trim()));
    messages.push(Message::system(GUARDRAIL));

    for (path, parts) in chunks.iter() {
        let total = parts.len();
        for (index, part) in parts.iter().enumerate() {
            let label = if total > 1 {
                format!("{} [chunk {}/{}]", path.display(), index + 1, total)
            } else {
                path.display().to_string()
            };
            messages.push(Message::user(format!("File: {label}\n```\n{part}\n```")));
        }
    }

    messages.push(Message::user(format!("{PROMPT_PREFIX}{}", prompt.trim())));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_files() {
        let messages = build_messages("  Be terse.  ", "  What is X?  ", &ChunkMap::new());

        assert_eq!(
            messages,
            vec![
                Message::system("Be terse."),
                Message::system(GUARDRAIL),
                Message::user("User prompt: What is X?"),
            ]
        );
    }

    #[test]
    fn test_single_chunk_has_no_suffix() {
        let map: ChunkMap = [("a.txt", vec!["hello".to_string()])].into_iter().collect();
        let messages = build_messages("i", "p", &map);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(messages[2].content, "File: a.txt\n```\nhello\n```");
    }

    #[test]
    fn test_multiple_chunks_are_labeled() {
        let map: ChunkMap = [("a.txt", vec!["hello".to_string(), "world".to_string()])]
            .into_iter()
            .collect();
        let messages = build_messages("i", "p", &map);

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[2].content, "File: a.txt [chunk 1/2]\n```\nhello\n```");
        assert_eq!(messages[3].content, "File: a.txt [chunk 2/2]\n```\nworld\n```");
    }

    #[test]
    fn test_follows_map_order() {
        let map: ChunkMap = [
            ("z.rs", vec!["last".to_string()]),
            ("a.rs", vec!["first".to_string()]),
        ]
        .into_iter()
        .collect();
        let messages = build_messages("i", "p", &map);

        assert!(messages[2].content.starts_with("File: z.rs\n"));
        assert!(messages[3].content.starts_with("File: a.rs\n"));
        assert_eq!(messages.last().unwrap().content, "User prompt: p");
    }

    #[test]
    fn test_chunk_text_is_raw() {
        let map: ChunkMap = [("x.md", vec!["  padded  \n".to_string()])].into_iter().collect();
        let messages = build_messages("i", "p", &map);

        assert_eq!(messages[2].content, "File: x.md\n```\n  padded  \n\n```");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::system("hi")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"hi"}"#);
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_only_system_and_user_roles() {
        assert_eq!(serde_json::from_str::<Role>(r#""user""#).unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>(r#""assistant""#).is_err());
    }
}
