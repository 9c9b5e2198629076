pub mod ai;
pub mod config;
pub mod core;
pub mod data;
pub mod util;
pub mod web;

pub use ai::{PromptClient, PromptError};
pub use config::Config;
pub use core::CodeLoopCore;
pub use data::{Database, ExperienceLevel, ForkSeed, Language, Loop, LoopDraft, LoopStore};
pub use web::{run_server, ServerConfig, WebAppState};
