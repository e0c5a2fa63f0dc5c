use super::client::GeminiHttpClient;
use super::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, PrebuiltVoiceConfig,
    SpeechConfig, VoiceConfig,
};
use crate::ai::{mime, wav, AudioService};
use crate::models::{SpeechRequest, TranscribeRequest};
use crate::{prompts, Error, Result};
use async_trait::async_trait;

pub struct GeminiAudioClient {
    http: GeminiHttpClient,
    transcribe_model: String,
    tts_model: String,
}

impl GeminiAudioClient {
    pub fn new(http: GeminiHttpClient, transcribe_model: String, tts_model: String) -> Self {
        Self {
            http,
            transcribe_model,
            tts_model,
        }
    }
}

#[async_trait]
impl AudioService for GeminiAudioClient {
    async fn transcribe(&self, request: &TranscribeRequest) -> Result<String> {
        tracing::debug!(
            "Transcribing audio ({} bytes, {}) via Gemini",
            request.audio_bytes.len(),
            request.mime_type
        );

        let body = GenerateContentRequest::single_turn(vec![
            Part::inline(&request.mime_type, &request.audio_bytes),
            Part::text(prompts::TRANSCRIBE),
        ]);

        let response: GenerateContentResponse = self
            .http
            .generate_content(&self.transcribe_model, &body)
            .await?;

        response
            .text()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::no_content("transcription", response.empty_reason()))
    }

    async fn synthesize_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let body = GenerateContentRequest {
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: request.voice_name.clone(),
                        },
                    },
                }),
            }),
            ..GenerateContentRequest::single_turn(vec![Part::text(&request.text)])
        };

        let response: GenerateContentResponse =
            self.http.generate_content(&self.tts_model, &body).await?;

        let audio = response
            .inline_data()
            .ok_or_else(|| Error::no_content("speech", response.empty_reason()))?;

        let bytes = audio.decode().map_err(|e| {
            Error::AiProvider(format!("Failed to decode Gemini base64 audio: {}", e))
        })?;
        if bytes.is_empty() {
            return Err(Error::no_content("speech", "audio payload was empty"));
        }

        if wav::is_wav(&bytes) {
            return Ok(bytes);
        }

        let sample_rate =
            mime::pcm_sample_rate(&audio.mime_type).unwrap_or(wav::DEFAULT_SAMPLE_RATE);
        tracing::debug!(
            "Wrapping {} bytes of PCM ({}) as WAV at {} Hz",
            bytes.len(),
            audio.mime_type,
            sample_rate
        );
        wav::wrap_pcm16_mono(&bytes, sample_rate)
    }
}
