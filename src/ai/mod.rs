//! Prompt service integration
//!
//! The AI service is treated as an opaque `generate(input) -> text`
//! collaborator: a reqwest client plus the two prompt templates CodeLoop
//! uses. Failures are propagated, never retried.

mod client;
pub mod flows;
mod types;

pub use client::{PromptClient, PromptError};
pub use types::{ContentBlock, Message, MessageRequest, MessageResponse};
