//! Studio orchestrator - the AI orchestration layer behind a creative studio
//!
//! Turns typed generation requests (text, image, video, speech, chat with
//! tools, trip planning, voice chat) into calls against the Gemini API,
//! spreading load across a pool of API keys, and serves them over HTTP.

pub mod ai;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod grounding;
pub mod models;
pub mod prompts;
pub mod server;
pub mod video;
pub mod voice;

pub use error::{Error, Result};
