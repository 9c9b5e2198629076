//! Data models for loops and their lifecycle
//!
//! A `Loop` is one persisted prompt -> generated-code (-> optional
//! explanation) record, optionally chained to a parent via lineage. Records
//! are never mutated after creation except for the explanation write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Minimum prompt length accepted at creation, in characters.
pub const MIN_PROMPT_CHARS: usize = 10;

/// Target language selected at creation. The set mirrors what the
/// playground form offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    Python,
    #[serde(rename = "HTML")]
    Html,
    Go,
    TypeScript,
    #[serde(rename = "CSS")]
    Css,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Go => "Go",
            Language::TypeScript => "TypeScript",
            Language::Css => "CSS",
        }
    }

    /// All supported languages, in display order.
    pub fn all() -> &'static [Language] {
        &[
            Language::JavaScript,
            Language::Python,
            Language::Html,
            Language::Go,
            Language::TypeScript,
            Language::Css,
        ]
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JavaScript" => Ok(Language::JavaScript),
            "Python" => Ok(Language::Python),
            "HTML" => Ok(Language::Html),
            "Go" => Ok(Language::Go),
            "TypeScript" => Ok(Language::TypeScript),
            "CSS" => Ok(Language::Css),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Developer experience level used to tailor code explanations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(ExperienceLevel::Junior),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            other => Err(format!("Unknown experience level: {}", other)),
        }
    }
}

/// A persisted loop record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Loop {
    /// Store-assigned unique identifier
    pub id: Uuid,
    /// Identifier of the owning user; set at creation, never reassigned
    pub user_id: String,
    /// Free-text user input; immutable after creation
    pub prompt: String,
    /// Target language selected at creation
    pub language: Language,
    /// Generated code; set at creation, immutable thereafter
    pub code: String,
    /// Optional generated explanation; written by a later, separate action
    pub explanation: Option<String>,
    /// Experience level the owner selected, if any
    pub experience_level: Option<ExperienceLevel>,
    /// Lineage pointer to the loop this one was forked from.
    /// Non-owning reference; no cascading behavior.
    pub parent_loop_id: Option<Uuid>,
    /// Store-assigned creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Loop {
    /// Seed a fork of this loop. Only the lineage pointer is carried over;
    /// the caller supplies everything else for the new draft.
    pub fn fork_seed(&self) -> ForkSeed {
        ForkSeed {
            parent_loop_id: self.id,
        }
    }
}

/// Lineage seed produced by forking a persisted loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForkSeed {
    pub parent_loop_id: Uuid,
}

impl ForkSeed {
    /// Turn the seed into a draft once the user has a prompt and code.
    pub fn into_draft(
        self,
        user_id: impl Into<String>,
        prompt: impl Into<String>,
        language: Language,
        code: impl Into<String>,
    ) -> LoopDraft {
        let mut draft = LoopDraft::new(user_id, prompt, language, code);
        draft.parent_loop_id = Some(self.parent_loop_id);
        draft
    }
}

/// Validation failure raised before any network or store call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("Prompt must be at least {MIN_PROMPT_CHARS} characters")]
    PromptTooShort,
}

/// An in-memory candidate loop: everything but the store-assigned id and
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopDraft {
    pub user_id: String,
    pub prompt: String,
    pub language: Language,
    pub code: String,
    pub explanation: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub parent_loop_id: Option<Uuid>,
}

impl LoopDraft {
    /// Create a root draft (no lineage).
    pub fn new(
        user_id: impl Into<String>,
        prompt: impl Into<String>,
        language: Language,
        code: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            prompt: prompt.into(),
            language,
            code: code.into(),
            explanation: None,
            experience_level: None,
            parent_loop_id: None,
        }
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_level = Some(level);
        self
    }

    pub fn with_parent(mut self, parent_loop_id: Uuid) -> Self {
        self.parent_loop_id = Some(parent_loop_id);
        self
    }

    /// Check the presence constraints every persisted loop must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("user_id"));
        }
        validate_prompt(&self.prompt)?;
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyField("code"));
        }
        Ok(())
    }
}

/// Check the prompt constraints enforced at the creation form, before any
/// network call is made.
pub fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    if prompt.trim().is_empty() {
        return Err(ValidationError::EmptyField("prompt"));
    }
    if prompt.chars().count() < MIN_PROMPT_CHARS {
        return Err(ValidationError::PromptTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> LoopDraft {
        LoopDraft::new(
            "u1",
            "Write a hello world",
            Language::Python,
            "print('hello')",
        )
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn test_short_prompt_rejected() {
        let mut draft = valid_draft();
        draft.prompt = "too short".to_string(); // 9 chars
        assert_eq!(draft.validate(), Err(ValidationError::PromptTooShort));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut draft = valid_draft();
        draft.user_id = "  ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::EmptyField("user_id")));

        let mut draft = valid_draft();
        draft.code = String::new();
        assert_eq!(draft.validate(), Err(ValidationError::EmptyField("code")));
    }

    #[test]
    fn test_fork_seed_carries_only_lineage() {
        let source = Loop {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            prompt: "Write a hello world".to_string(),
            language: Language::Python,
            code: "print('hello')".to_string(),
            explanation: Some("prints hello".to_string()),
            experience_level: None,
            parent_loop_id: None,
            created_at: Utc::now(),
        };

        let seed = source.fork_seed();
        assert_eq!(seed.parent_loop_id, source.id);

        let draft = seed.into_draft("u1", "Add a greeting name", Language::Python, "code");
        assert_eq!(draft.parent_loop_id, Some(source.id));
        assert_eq!(draft.prompt, "Add a greeting name");
        assert!(draft.explanation.is_none());
    }

    #[test]
    fn test_language_round_trip() {
        for lang in Language::all() {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), *lang);
        }
        assert!("Rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serde_uses_display_names() {
        let json = serde_json::to_string(&Language::Html).unwrap();
        assert_eq!(json, "\"HTML\"");
        let parsed: Language = serde_json::from_str("\"TypeScript\"").unwrap();
        assert_eq!(parsed, Language::TypeScript);
    }
}
