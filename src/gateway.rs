//! Generation gateway: routes a typed request to the capability that serves it.

use crate::ai::gemini::GeminiHttpClient;
use crate::ai::{
    AudioService, ChatService, GeminiAudioClient, GeminiChatClient, GeminiImageClient,
    GeminiTextClient, GeminiVideoClient, ImageService, TextService, VideoJobService,
};
use crate::credentials::CredentialPool;
use crate::models::{Config, GenerationRequest, GenerationResult};
use crate::video::{PollPolicy, VideoPoller};
use crate::voice::VoicePipeline;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Injectable service bundle used to construct an [`Orchestrator`] in tests.
#[derive(Clone)]
pub struct GenerationServices {
    pub text: Arc<dyn TextService>,
    pub image: Arc<dyn ImageService>,
    pub chat: Arc<dyn ChatService>,
    pub audio: Arc<dyn AudioService>,
    pub video: Arc<dyn VideoJobService>,
}

pub struct Orchestrator {
    text: Arc<dyn TextService>,
    image: Arc<dyn ImageService>,
    chat: Arc<dyn ChatService>,
    audio: Arc<dyn AudioService>,
    poller: VideoPoller,
    voice: VoicePipeline,
}

impl Orchestrator {
    pub fn with_services(
        services: GenerationServices,
        policy: PollPolicy,
        default_voice: String,
    ) -> Self {
        Self {
            poller: VideoPoller::new(services.video, policy),
            voice: VoicePipeline::new(
                services.audio.clone(),
                services.chat.clone(),
                default_voice,
            ),
            text: services.text,
            image: services.image,
            chat: services.chat,
            audio: services.audio,
        }
    }

    /// Build the Gemini-backed orchestrator from environment configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Arc::new(CredentialPool::new(config.api_keys.clone())?);
        info!("Credential pool holds {} key(s)", credentials.len());

        // One connection pool shared by every capability client.
        let http = GeminiHttpClient::new_with_client(
            credentials,
            config.request_timeout,
            reqwest::Client::new(),
        )
        .with_base_url(config.base_url.clone());

        let models = &config.models;
        info!(
            "Models: text={}, reasoning={}, image={}, image_pro={}, tts={}, video={}",
            models.text, models.reasoning, models.image, models.image_pro, models.tts, models.video
        );

        let services = GenerationServices {
            text: Arc::new(GeminiTextClient::new(http.clone(), models.text.clone())),
            image: Arc::new(GeminiImageClient::new(
                http.clone(),
                models.image.clone(),
                models.image_pro.clone(),
            )),
            chat: Arc::new(GeminiChatClient::new(
                http.clone(),
                models.text.clone(),
                models.reasoning.clone(),
            )),
            audio: Arc::new(GeminiAudioClient::new(
                http.clone(),
                models.text.clone(),
                models.tts.clone(),
            )),
            video: Arc::new(GeminiVideoClient::new(http, models.video.clone())),
        };

        Ok(Self::with_services(
            services,
            PollPolicy::from_config(config),
            config.default_voice.clone(),
        ))
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poller.policy()
    }

    pub fn default_voice(&self) -> &str {
        self.voice.default_voice()
    }

    /// Run one request. Failures come back as [`Error::Request`] tagged with
    /// the request's modality.
    pub async fn dispatch(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        self.dispatch_with_deadline(request, None, cancel).await
    }

    /// Like [`dispatch`](Self::dispatch), but fails with
    /// [`Error::DeadlineExceeded`] once `deadline` passes.
    pub async fn dispatch_with_deadline(
        &self,
        request: GenerationRequest,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        let modality = request.modality();
        debug!("Dispatching {} request", modality);

        let result = match deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.route(request, cancel)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::DeadlineExceeded),
                }
            }
            None => self.route(request, cancel).await,
        };

        result.map_err(|source| {
            error!("{} request failed: {}", modality, source);
            Error::Request {
                modality,
                source: Box::new(source),
            }
        })
    }

    async fn route(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        match request {
            GenerationRequest::Text(req) => {
                self.text.generate_text(&req).await.map(GenerationResult::Text)
            }
            GenerationRequest::Image(req) => self
                .image
                .generate_image(&req)
                .await
                .map(GenerationResult::Image),
            GenerationRequest::ImageEdit(req) => {
                self.image.edit_image(&req).await.map(GenerationResult::Image)
            }
            GenerationRequest::ImageAnalyze(req) => {
                self.text.analyze_image(&req).await.map(GenerationResult::Text)
            }
            GenerationRequest::Code(req) => {
                self.text.assist_code(&req).await.map(GenerationResult::Text)
            }
            GenerationRequest::Chat(req) => {
                self.chat.chat(&req).await.map(GenerationResult::Grounded)
            }
            GenerationRequest::Trip(req) => {
                self.chat.plan_trip(&req).await.map(GenerationResult::Grounded)
            }
            GenerationRequest::TripExtra(req) => {
                self.chat.trip_extra(&req).await.map(GenerationResult::Text)
            }
            GenerationRequest::Video(req) => self
                .poller
                .generate(&req, cancel)
                .await
                .map(GenerationResult::Video),
            GenerationRequest::Speech(req) => self
                .audio
                .synthesize_speech(&req)
                .await
                .map(GenerationResult::Audio),
            GenerationRequest::Transcribe(req) => {
                self.audio.transcribe(&req).await.map(GenerationResult::Text)
            }
            GenerationRequest::Multimodal(req) => {
                self.text.multimodal(&req).await.map(GenerationResult::Text)
            }
            GenerationRequest::VoiceChat(req) => {
                self.voice.run(&req).await.map(GenerationResult::Voice)
            }
        }
    }
}
