//! Data models and structures
//!
//! Defines the typed request and result shapes for every generation modality,
//! the caller-owned conversation history, and the environment configuration.

use crate::grounding::GroundingChunk;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPart {
    pub text: String,
}

/// One turn of a caller-owned conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub parts: Vec<TextPart>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![TextPart { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![TextPart { text: text.into() }],
        }
    }
}

pub type ConversationHistory = Vec<ConversationTurn>;

/// Raw media supplied inline with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    #[default]
    Standard,
    Pro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub mode: Option<ImageMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditRequest {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub edit_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAnalyzeRequest {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodeMode {
    Debug,
    Explain,
    Optimize,
    Generate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRequest {
    pub code: String,
    pub mode: CodeMode,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub history: ConversationHistory,
    pub reasoning_mode: bool,
    pub search_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripForm {
    pub starting_point: String,
    pub destination: String,
    pub duration: String,
    pub budget: String,
    pub interests: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripOptions {
    pub dining: bool,
    pub transport: bool,
    pub pro_tips: bool,
    pub alternatives: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub form: TripForm,
    pub options: TripOptions,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripExtraKind {
    Packing,
    Budget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInfo {
    pub destination: String,
    pub duration: String,
    pub interests: String,
    pub budget: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripExtraRequest {
    pub kind: TripExtraKind,
    pub trip_info: TripInfo,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub prompt: String,
    pub image: Option<MediaPart>,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeRequest {
    pub audio_bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultimodalRequest {
    pub parts: Vec<MediaPart>,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChatRequest {
    pub audio_bytes: Vec<u8>,
    pub mime_type: String,
    pub history: ConversationHistory,
    pub voice_name: Option<String>,
}

/// A generation request, tagged by modality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Text(TextRequest),
    Image(ImageRequest),
    ImageEdit(ImageEditRequest),
    ImageAnalyze(ImageAnalyzeRequest),
    Code(CodeRequest),
    Chat(ChatRequest),
    Trip(TripRequest),
    TripExtra(TripExtraRequest),
    Video(VideoRequest),
    Speech(SpeechRequest),
    Transcribe(TranscribeRequest),
    Multimodal(MultimodalRequest),
    VoiceChat(VoiceChatRequest),
}

impl GenerationRequest {
    pub fn modality(&self) -> &'static str {
        match self {
            GenerationRequest::Text(_) => "text",
            GenerationRequest::Image(_) => "image",
            GenerationRequest::ImageEdit(_) => "image-edit",
            GenerationRequest::ImageAnalyze(_) => "image-analyze",
            GenerationRequest::Code(_) => "code",
            GenerationRequest::Chat(_) => "chat",
            GenerationRequest::Trip(_) => "trip",
            GenerationRequest::TripExtra(_) => "trip-extra",
            GenerationRequest::Video(_) => "video",
            GenerationRequest::Speech(_) => "speech",
            GenerationRequest::Transcribe(_) => "transcribe",
            GenerationRequest::Multimodal(_) => "multimodal",
            GenerationRequest::VoiceChat(_) => "voice-chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Text answer plus the normalized citations the provider attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundedText {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    pub audio_bytes: Vec<u8>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Text(String),
    Image(GeneratedImage),
    Video(Vec<u8>),
    Audio(Vec<u8>),
    Grounded(GroundedText),
    Voice(VoiceReply),
}

impl GenerationResult {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationResult::Text(_) => "text",
            GenerationResult::Image(_) => "image",
            GenerationResult::Video(_) => "video",
            GenerationResult::Audio(_) => "audio",
            GenerationResult::Grounded(_) => "grounded text",
            GenerationResult::Voice(_) => "voice reply",
        }
    }
}

// Configuration
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub text: String,
    pub reasoning: String,
    pub image: String,
    pub image_pro: String,
    pub tts: String,
    pub video: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: "gemini-2.5-flash".to_string(),
            reasoning: "gemini-2.5-pro".to_string(),
            image: "gemini-2.5-flash-image".to_string(),
            image_pro: "gemini-3-pro-image-preview".to_string(),
            tts: "gemini-2.5-flash-preview-tts".to_string(),
            video: "veo-3.0-fast-generate-001".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub models: ModelConfig,
    pub video_poll_interval: Duration,
    pub video_max_poll_attempts: u32,
    pub video_max_wait: Duration,
    pub request_timeout: Duration,
    pub default_voice: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_keys = ["GEMINI_API_KEYS", "GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .map(|raw| parse_key_list(&raw))
            .find(|keys| !keys.is_empty())
            .unwrap_or_default();

        if api_keys.is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEYS (or GEMINI_API_KEY) not set".to_string(),
            ));
        }

        let defaults = ModelConfig::default();
        let models = ModelConfig {
            text: env_or("GEMINI_TEXT_MODEL", defaults.text),
            reasoning: env_or("GEMINI_REASONING_MODEL", defaults.reasoning),
            image: env_or("GEMINI_IMAGE_MODEL", defaults.image),
            image_pro: env_or("GEMINI_IMAGE_PRO_MODEL", defaults.image_pro),
            tts: env_or("GEMINI_TTS_MODEL", defaults.tts),
            video: env_or("GEMINI_VIDEO_MODEL", defaults.video),
        };

        Ok(Self {
            api_keys,
            base_url: env_or("GEMINI_BASE_URL", DEFAULT_BASE_URL.to_string()),
            models,
            video_poll_interval: Duration::from_millis(env_parse("VIDEO_POLL_INTERVAL_MS", 3000)?),
            video_max_poll_attempts: env_parse("VIDEO_MAX_POLL_ATTEMPTS", 120)?,
            video_max_wait: Duration::from_secs(env_parse("VIDEO_MAX_WAIT_SECS", 600)?),
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS", 120)?),
            default_voice: env_or("DEFAULT_VOICE_NAME", "Kore".to_string()),
        })
    }
}

/// Split a comma-separated credential list, dropping blanks.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_list_drops_blanks() {
        assert_eq!(
            parse_key_list(" key-a, ,key-b,,"),
            vec!["key-a".to_string(), "key-b".to_string()]
        );
        assert!(parse_key_list(" , ").is_empty());
    }

    #[test]
    fn test_conversation_turn_serialization() {
        let turn = ConversationTurn::model("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"model","parts":[{"text":"hello"}]}"#);

        let parsed: ConversationTurn =
            serde_json::from_str(r#"{"role":"user","parts":[{"text":"hi"}]}"#).unwrap();
        assert_eq!(parsed, ConversationTurn::user("hi"));
    }

    #[test]
    fn test_aspect_ratio_wire_format() {
        let ratio: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
        assert_eq!(ratio, AspectRatio::Portrait);
        assert_eq!(AspectRatio::Landscape.as_str(), "16:9");
    }

    #[test]
    fn test_request_modality_names() {
        let request = GenerationRequest::Chat(ChatRequest {
            message: "hi".to_string(),
            history: vec![],
            reasoning_mode: false,
            search_enabled: false,
        });
        assert_eq!(request.modality(), "chat");
    }

    #[test]
    fn test_default_models_are_distinct_tiers() {
        let models = ModelConfig::default();
        assert_ne!(models.text, models.reasoning);
        assert_ne!(models.image, models.image_pro);
    }
}
