//! AI provider integration for every generation modality.
//!
//! Each capability is a trait so the orchestrators can be driven by either the
//! Gemini clients or the mocks in [`mock`].

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod wav;

pub use gemini::{
    GeminiAudioClient, GeminiChatClient, GeminiImageClient, GeminiTextClient, GeminiVideoClient,
};
pub use mock::{MockAudioClient, MockChatClient, MockImageClient, MockTextClient, MockVideoJobs};

use crate::models::{
    ChatRequest, CodeRequest, GeneratedImage, GroundedText, ImageAnalyzeRequest, ImageEditRequest,
    ImageRequest, MultimodalRequest, SpeechRequest, TextRequest, TranscribeRequest,
    TripExtraRequest, TripRequest, VideoRequest,
};
use crate::video::VideoJob;
use crate::Result;
use async_trait::async_trait;

/// Text-in, text-out operations.
#[async_trait]
pub trait TextService: Send + Sync {
    async fn generate_text(&self, request: &TextRequest) -> Result<String>;
    async fn analyze_image(&self, request: &ImageAnalyzeRequest) -> Result<String>;
    async fn assist_code(&self, request: &CodeRequest) -> Result<String>;
    async fn multimodal(&self, request: &MultimodalRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage>;
    async fn edit_image(&self, request: &ImageEditRequest) -> Result<GeneratedImage>;
}

/// Tool-enabled conversation and trip planning.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<GroundedText>;
    async fn plan_trip(&self, request: &TripRequest) -> Result<GroundedText>;
    async fn trip_extra(&self, request: &TripExtraRequest) -> Result<String>;
}

#[async_trait]
pub trait AudioService: Send + Sync {
    async fn transcribe(&self, request: &TranscribeRequest) -> Result<String>;
    /// Returns WAV-encoded audio.
    async fn synthesize_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>>;
}

/// Provider side of the async video job lifecycle.
#[async_trait]
pub trait VideoJobService: Send + Sync {
    async fn submit_video(&self, request: &VideoRequest) -> Result<VideoJob>;
    async fn refresh_video_job(&self, job: &VideoJob) -> Result<VideoJob>;
    /// Fetch the finished asset at `uri` on behalf of `job`.
    async fn download_video(&self, job: &VideoJob, uri: &str) -> Result<Vec<u8>>;
}
