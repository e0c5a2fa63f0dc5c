//! Voice chat: transcribe, converse, then synthesize the reply.
//!
//! The stages run strictly in order and the first failure ends the run. There
//! is no compensation for stages that already completed.

use crate::ai::{AudioService, ChatService};
use crate::models::{ChatRequest, SpeechRequest, TranscribeRequest, VoiceChatRequest, VoiceReply};
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Transcription,
    Conversation,
    Synthesis,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Transcription => "transcription",
            PipelineStage::Conversation => "conversation",
            PipelineStage::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn tag<T>(stage: PipelineStage, result: Result<T>) -> Result<T> {
    result.map_err(|source| {
        warn!("Voice pipeline stopped at {}: {}", stage, source);
        Error::Pipeline {
            stage,
            source: Box::new(source),
        }
    })
}

pub struct VoicePipeline {
    audio: Arc<dyn AudioService>,
    chat: Arc<dyn ChatService>,
    default_voice: String,
}

impl VoicePipeline {
    pub fn new(
        audio: Arc<dyn AudioService>,
        chat: Arc<dyn ChatService>,
        default_voice: String,
    ) -> Self {
        Self {
            audio,
            chat,
            default_voice,
        }
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    pub async fn run(&self, request: &VoiceChatRequest) -> Result<VoiceReply> {
        let transcript = tag(
            PipelineStage::Transcription,
            self.audio
                .transcribe(&TranscribeRequest {
                    audio_bytes: request.audio_bytes.clone(),
                    mime_type: request.mime_type.clone(),
                })
                .await,
        )?;
        info!("Voice pipeline transcribed {} chars", transcript.len());

        let reply = tag(
            PipelineStage::Conversation,
            self.chat
                .chat(&ChatRequest {
                    message: transcript,
                    history: request.history.clone(),
                    reasoning_mode: false,
                    search_enabled: false,
                })
                .await,
        )?;

        let voice_name = request
            .voice_name
            .clone()
            .unwrap_or_else(|| self.default_voice.clone());
        let audio_bytes = tag(
            PipelineStage::Synthesis,
            self.audio
                .synthesize_speech(&SpeechRequest {
                    text: reply.text.clone(),
                    voice_name,
                })
                .await,
        )?;
        info!("Voice pipeline produced {} bytes of audio", audio_bytes.len());

        Ok(VoiceReply {
            audio_bytes,
            text: reply.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockAudioClient, MockChatClient};
    use crate::models::ConversationTurn;
    use pretty_assertions::assert_eq;

    fn request() -> VoiceChatRequest {
        VoiceChatRequest {
            audio_bytes: vec![1, 2, 3],
            mime_type: "audio/webm".to_string(),
            history: vec![
                ConversationTurn::user("hello"),
                ConversationTurn::model("hi there"),
            ],
            voice_name: None,
        }
    }

    fn pipeline(audio: &MockAudioClient, chat: &MockChatClient) -> VoicePipeline {
        VoicePipeline::new(
            Arc::new(audio.clone()),
            Arc::new(chat.clone()),
            "Kore".to_string(),
        )
    }

    #[tokio::test]
    async fn test_transcription_failure_short_circuits() {
        let audio = MockAudioClient::new().with_transcribe_failure("unsupported codec");
        let chat = MockChatClient::new();

        let err = pipeline(&audio, &chat).run(&request()).await.unwrap_err();

        assert_eq!(err.pipeline_stage(), Some(PipelineStage::Transcription));
        assert!(err.to_string().contains("transcription"));
        assert!(err.to_string().contains("unsupported codec"));
        assert_eq!(chat.get_call_count(), 0);
        assert_eq!(audio.speech_count(), 0);
    }

    #[tokio::test]
    async fn test_conversation_failure_skips_synthesis() {
        let audio = MockAudioClient::new();
        let chat = MockChatClient::new().with_failure("quota exhausted");

        let err = pipeline(&audio, &chat).run(&request()).await.unwrap_err();

        assert_eq!(err.pipeline_stage(), Some(PipelineStage::Conversation));
        assert_eq!(audio.transcribe_count(), 1);
        assert_eq!(audio.speech_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_tagged() {
        let audio = MockAudioClient::new().with_speech_failure("voice unavailable");
        let chat = MockChatClient::new().with_text_reply("Sure.");

        let err = pipeline(&audio, &chat).run(&request()).await.unwrap_err();

        assert_eq!(err.pipeline_stage(), Some(PipelineStage::Synthesis));
        assert_eq!(chat.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_reply_pairs_audio_with_chat_text() {
        let audio = MockAudioClient::new()
            .with_transcript("what's the weather")
            .with_audio(vec![9, 9, 9]);
        let chat = MockChatClient::new().with_text_reply("Sunny all day.");

        let reply = pipeline(&audio, &chat).run(&request()).await.unwrap();

        assert_eq!(
            reply,
            VoiceReply {
                audio_bytes: vec![9, 9, 9],
                text: "Sunny all day.".to_string(),
            }
        );
        let spoken = audio.speech_requests();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, "Sunny all day.");
        assert_eq!(spoken[0].voice_name, "Kore");
    }

    #[tokio::test]
    async fn test_chat_stage_forces_flags_and_keeps_history() {
        let audio = MockAudioClient::new().with_transcript("tell me more");
        let chat = MockChatClient::new();

        pipeline(&audio, &chat).run(&request()).await.unwrap();

        let sent = chat.chat_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message, "tell me more");
        assert_eq!(sent[0].history, request().history);
        assert!(!sent[0].reasoning_mode);
        assert!(!sent[0].search_enabled);
    }

    #[tokio::test]
    async fn test_voice_override() {
        let audio = MockAudioClient::new();
        let chat = MockChatClient::new();
        let mut req = request();
        req.voice_name = Some("Puck".to_string());

        pipeline(&audio, &chat).run(&req).await.unwrap();

        assert_eq!(audio.speech_requests()[0].voice_name, "Puck");
    }
}
