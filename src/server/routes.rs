use super::{ApiResult, AppState};
use crate::ai::mime::detect_image_mime;
use crate::grounding::GroundingChunk;
use crate::models::{
    AspectRatio, ChatRequest, CodeMode, CodeRequest, ConversationHistory, GenerationRequest,
    GenerationResult, ImageAnalyzeRequest, ImageEditRequest, ImageMode, ImageRequest, MediaPart,
    MultimodalRequest, SpeechRequest, TextRequest, TranscribeRequest, TripExtraKind,
    TripExtraRequest, TripForm, TripInfo, TripOptions, TripRequest, VideoRequest,
    VoiceChatRequest,
};
use crate::{Error, Result};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Decode base64 media, tolerating a `data:<mime>;base64,` prefix.
fn decode_media(data: &str) -> Result<Vec<u8>> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, body)| body),
        None => data,
    };
    Ok(STANDARD.decode(payload.trim())?)
}

fn unexpected(route: &'static str, result: &GenerationResult) -> Error {
    Error::no_content(route, format!("unexpected {} result", result.kind()))
}

fn into_text(route: &'static str, result: GenerationResult) -> Result<String> {
    match result {
        GenerationResult::Text(text) => Ok(text),
        other => Err(unexpected(route, &other)),
    }
}

#[derive(Debug, Serialize)]
pub struct ResultBody {
    result: String,
}

async fn text_route(
    state: &AppState,
    route: &'static str,
    request: GenerationRequest,
) -> ApiResult<Json<ResultBody>> {
    let result = state.generate(request).await?;
    Ok(Json(ResultBody {
        result: into_text(route, result)?,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    image_data: String,
    mime_type: String,
}

async fn image_route(state: &AppState, request: GenerationRequest) -> ApiResult<Json<ImageBody>> {
    match state.generate(request).await? {
        GenerationResult::Image(image) => Ok(Json(ImageBody {
            image_data: STANDARD.encode(&image.bytes),
            mime_type: image.mime_type,
        })),
        other => Err(unexpected("image", &other).into()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBody {
    prompt: String,
    system_instruction: Option<String>,
    model: Option<String>,
}

pub async fn text(
    State(state): State<AppState>,
    Json(body): Json<TextBody>,
) -> ApiResult<Json<ResultBody>> {
    let request = GenerationRequest::Text(TextRequest {
        prompt: body.prompt,
        system_instruction: body.system_instruction,
        model: body.model,
    });
    text_route(&state, "text", request).await
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerateBody {
    prompt: String,
    mode: Option<ImageMode>,
}

pub async fn image(
    State(state): State<AppState>,
    Json(body): Json<ImageGenerateBody>,
) -> ApiResult<Json<ImageBody>> {
    let request = GenerationRequest::Image(ImageRequest {
        prompt: body.prompt,
        mode: body.mode,
    });
    image_route(&state, request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    image_data: String,
    mime_type: String,
    prompt: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> ApiResult<Json<ResultBody>> {
    let request = GenerationRequest::ImageAnalyze(ImageAnalyzeRequest {
        image_bytes: decode_media(&body.image_data)?,
        mime_type: body.mime_type,
        prompt: body.prompt,
    });
    text_route(&state, "analyze", request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBody {
    image_data: String,
    mime_type: String,
    edit_prompt: String,
}

pub async fn edit(
    State(state): State<AppState>,
    Json(body): Json<EditBody>,
) -> ApiResult<Json<ImageBody>> {
    let request = GenerationRequest::ImageEdit(ImageEditRequest {
        image_bytes: decode_media(&body.image_data)?,
        mime_type: body.mime_type,
        edit_prompt: body.edit_prompt,
    });
    image_route(&state, request).await
}

#[derive(Debug, Deserialize)]
pub struct CodeBody {
    code: String,
    mode: CodeMode,
    language: String,
}

pub async fn code(
    State(state): State<AppState>,
    Json(body): Json<CodeBody>,
) -> ApiResult<Json<ResultBody>> {
    let request = GenerationRequest::Code(CodeRequest {
        code: body.code,
        mode: body.mode,
        language: body.language,
    });
    text_route(&state, "code", request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    message: String,
    #[serde(default)]
    history: ConversationHistory,
    #[serde(default)]
    is_reasoning_mode: bool,
    #[serde(default)]
    enable_search: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyBody {
    text: String,
    grounding_links: Vec<GroundingChunk>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> ApiResult<Json<ChatReplyBody>> {
    let request = GenerationRequest::Chat(ChatRequest {
        message: body.message,
        history: body.history,
        reasoning_mode: body.is_reasoning_mode,
        search_enabled: body.enable_search,
    });
    match state.generate(request).await? {
        GenerationResult::Grounded(reply) => Ok(Json(ChatReplyBody {
            text: reply.text,
            grounding_links: reply.grounding_chunks,
        })),
        other => Err(unexpected("chat", &other).into()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanBody {
    starting_point: String,
    destination: String,
    duration: String,
    #[serde(default)]
    budget: String,
    #[serde(default)]
    interests: String,
    #[serde(default)]
    dining: bool,
    #[serde(default)]
    transport: bool,
    #[serde(default)]
    alternatives: bool,
    #[serde(default)]
    pro_tips: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryBody {
    itinerary: String,
    grounding_chunks: Vec<GroundingChunk>,
}

pub async fn trip_plan(
    State(state): State<AppState>,
    Json(body): Json<TripPlanBody>,
) -> ApiResult<Json<ItineraryBody>> {
    let request = GenerationRequest::Trip(TripRequest {
        form: TripForm {
            starting_point: body.starting_point,
            destination: body.destination,
            duration: body.duration,
            budget: body.budget,
            interests: body.interests,
        },
        options: TripOptions {
            dining: body.dining,
            transport: body.transport,
            pro_tips: body.pro_tips,
            alternatives: body.alternatives,
        },
    });
    match state.generate(request).await? {
        GenerationResult::Grounded(plan) => Ok(Json(ItineraryBody {
            itinerary: plan.text,
            grounding_chunks: plan.grounding_chunks,
        })),
        other => Err(unexpected("trip-plan", &other).into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct TripExtraBody {
    #[serde(rename = "type")]
    kind: TripExtraKind,
    destination: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    interests: String,
    budget: Option<String>,
}

pub async fn trip_extra(
    State(state): State<AppState>,
    Json(body): Json<TripExtraBody>,
) -> ApiResult<Json<ResultBody>> {
    let request = GenerationRequest::TripExtra(TripExtraRequest {
        kind: body.kind,
        trip_info: TripInfo {
            destination: body.destination,
            duration: body.duration,
            interests: body.interests,
            budget: body.budget,
        },
    });
    text_route(&state, "trip-extra", request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBody {
    prompt: String,
    image: Option<String>,
    mime_type: Option<String>,
    #[serde(default)]
    aspect_ratio: AspectRatio,
}

pub async fn video(
    State(state): State<AppState>,
    Json(body): Json<VideoBody>,
) -> ApiResult<Response> {
    let image = match body.image.as_deref() {
        Some(data) => {
            let bytes = decode_media(data)?;
            let mime_type = body
                .mime_type
                .unwrap_or_else(|| detect_image_mime(&bytes).to_string());
            Some(MediaPart { mime_type, bytes })
        }
        None => None,
    };
    let request = GenerationRequest::Video(VideoRequest {
        prompt: body.prompt,
        image,
        aspect_ratio: body.aspect_ratio,
    });
    match state.generate(request).await? {
        GenerationResult::Video(bytes) => {
            Ok(([(header::CONTENT_TYPE, "video/mp4")], bytes).into_response())
        }
        other => Err(unexpected("video", &other).into()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsBody {
    text: String,
    voice_name: Option<String>,
}

pub async fn tts(State(state): State<AppState>, Json(body): Json<TtsBody>) -> ApiResult<Response> {
    let voice_name = body
        .voice_name
        .unwrap_or_else(|| state.orchestrator.default_voice().to_string());
    let request = GenerationRequest::Speech(SpeechRequest {
        text: body.text,
        voice_name,
    });
    match state.generate(request).await? {
        GenerationResult::Audio(bytes) => {
            Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
        }
        other => Err(unexpected("tts", &other).into()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeBody {
    audio_data: String,
    mime_type: String,
}

pub async fn transcribe(
    State(state): State<AppState>,
    Json(body): Json<TranscribeBody>,
) -> ApiResult<Json<ResultBody>> {
    let request = GenerationRequest::Transcribe(TranscribeRequest {
        audio_bytes: decode_media(&body.audio_data)?,
        mime_type: body.mime_type,
    });
    text_route(&state, "transcribe", request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct MultimodalBody {
    #[serde(default)]
    parts: Vec<PartBody>,
    prompt: String,
}

pub async fn multimodal(
    State(state): State<AppState>,
    Json(body): Json<MultimodalBody>,
) -> ApiResult<Json<ResultBody>> {
    let parts = body
        .parts
        .into_iter()
        .map(|part| {
            Ok(MediaPart {
                bytes: decode_media(&part.data)?,
                mime_type: part.mime_type,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let request = GenerationRequest::Multimodal(MultimodalRequest {
        parts,
        prompt: body.prompt,
    });
    text_route(&state, "multimodal", request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceChatBody {
    audio_data: String,
    mime_type: String,
    #[serde(default)]
    history: ConversationHistory,
    voice_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceChatReplyBody {
    audio_data: String,
    text_response: String,
}

pub async fn voice_chat(
    State(state): State<AppState>,
    Json(body): Json<VoiceChatBody>,
) -> ApiResult<Json<VoiceChatReplyBody>> {
    let request = GenerationRequest::VoiceChat(VoiceChatRequest {
        audio_bytes: decode_media(&body.audio_data)?,
        mime_type: body.mime_type,
        history: body.history,
        voice_name: body.voice_name,
    });
    match state.generate(request).await? {
        GenerationResult::Voice(reply) => Ok(Json(VoiceChatReplyBody {
            audio_data: STANDARD.encode(&reply.audio_bytes),
            text_response: reply.text,
        })),
        other => Err(unexpected("voice-chat", &other).into()),
    }
}
