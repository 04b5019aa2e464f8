//! Narrative commentary and follow-up chat over an analysis
//!
//! The calculator output is rendered to a context document and sent to a
//! hosted text-generation model. Credentials arrive through
//! [`crate::config::NarrativeSettings`]; nothing here reads the environment.

pub mod client;
pub mod prompt;
pub mod session;

pub use client::{GeminiClient, NarrativeClient, NarrativeRequest};
pub use session::{ChatHistory, ChatMessage, ChatSession, Role};
