use super::{AudioService, ChatService, ImageService, TextService, VideoJobService};
use crate::models::{
    ChatRequest, CodeRequest, GeneratedImage, GroundedText, ImageAnalyzeRequest, ImageEditRequest,
    ImageRequest, MultimodalRequest, SpeechRequest, TextRequest, TranscribeRequest,
    TripExtraRequest, TripRequest, VideoRequest,
};
use crate::video::VideoJob;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

fn next_response<T: Clone>(responses: &[T], count: usize) -> Option<T> {
    if responses.is_empty() {
        None
    } else {
        Some(responses[(count - 1) % responses.len()].clone())
    }
}

fn bump(counter: &Mutex<usize>) -> usize {
    let mut count = counter.lock().unwrap();
    *count += 1;
    *count
}

fn injected(failure: &Mutex<Option<String>>) -> Result<()> {
    match failure.lock().unwrap().as_ref() {
        Some(message) => Err(Error::AiProvider(message.clone())),
        None => Ok(()),
    }
}

#[derive(Clone, Default)]
pub struct MockTextClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn respond(&self, default: String) -> Result<String> {
        let count = bump(&self.call_count);
        injected(&self.failure)?;
        Ok(next_response(&self.responses.lock().unwrap(), count).unwrap_or(default))
    }
}

#[async_trait]
impl TextService for MockTextClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        self.respond(format!("Mock answer to: {}", request.prompt))
    }

    async fn analyze_image(&self, request: &ImageAnalyzeRequest) -> Result<String> {
        self.respond(format!("An image of {} bytes", request.image_bytes.len()))
    }

    async fn assist_code(&self, request: &CodeRequest) -> Result<String> {
        self.respond(format!("Reviewed {} code", request.language))
    }

    async fn multimodal(&self, request: &MultimodalRequest) -> Result<String> {
        self.respond(format!("Considered {} parts", request.parts.len()))
    }
}

#[derive(Clone)]
pub struct MockImageClient {
    image: Arc<Mutex<Option<GeneratedImage>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            image: Arc::new(Mutex::new(Some(GeneratedImage {
                bytes: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
                mime_type: "image/png".to_string(),
            }))),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image(self, bytes: Vec<u8>, mime_type: &str) -> Self {
        *self.image.lock().unwrap() = Some(GeneratedImage {
            bytes,
            mime_type: mime_type.to_string(),
        });
        self
    }

    /// Behave like a model that answers with text only.
    pub fn text_only(self) -> Self {
        *self.image.lock().unwrap() = None;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn respond(&self, modality: &'static str) -> Result<GeneratedImage> {
        bump(&self.call_count);
        self.image
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::no_content(modality, "model replied with text only"))
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockImageClient {
    async fn generate_image(&self, _request: &ImageRequest) -> Result<GeneratedImage> {
        self.respond("image")
    }

    async fn edit_image(&self, _request: &ImageEditRequest) -> Result<GeneratedImage> {
        self.respond("image edit")
    }
}

#[derive(Clone, Default)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<GroundedText>>>,
    chat_requests: Arc<Mutex<Vec<ChatRequest>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: GroundedText) -> Self {
        self.responses.lock().unwrap().push(reply);
        self
    }

    pub fn with_text_reply(self, text: &str) -> Self {
        self.with_reply(GroundedText {
            text: text.to_string(),
            grounding_chunks: vec![],
        })
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    fn respond(&self, default: &str) -> Result<GroundedText> {
        let count = bump(&self.call_count);
        injected(&self.failure)?;
        Ok(
            next_response(&self.responses.lock().unwrap(), count).unwrap_or_else(|| GroundedText {
                text: default.to_string(),
                grounding_chunks: vec![],
            }),
        )
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn chat(&self, request: &ChatRequest) -> Result<GroundedText> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.respond("Mock chat reply")
    }

    async fn plan_trip(&self, request: &TripRequest) -> Result<GroundedText> {
        self.respond(&format!("Itinerary for {}", request.form.destination))
    }

    async fn trip_extra(&self, request: &TripExtraRequest) -> Result<String> {
        self.respond(&format!("Extras for {}", request.trip_info.destination))
            .map(|reply| reply.text)
    }
}

#[derive(Clone)]
pub struct MockAudioClient {
    transcript: Arc<Mutex<String>>,
    audio: Arc<Mutex<Vec<u8>>>,
    transcribe_failure: Arc<Mutex<Option<String>>>,
    speech_failure: Arc<Mutex<Option<String>>>,
    transcribe_count: Arc<Mutex<usize>>,
    speech_requests: Arc<Mutex<Vec<SpeechRequest>>>,
}

impl MockAudioClient {
    pub fn new() -> Self {
        Self {
            transcript: Arc::new(Mutex::new("Mock transcript".to_string())),
            audio: Arc::new(Mutex::new(
                crate::ai::wav::wrap_pcm16_mono(&[0, 0], 24_000).unwrap_or_default(),
            )),
            transcribe_failure: Arc::new(Mutex::new(None)),
            speech_failure: Arc::new(Mutex::new(None)),
            transcribe_count: Arc::new(Mutex::new(0)),
            speech_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_transcript(self, transcript: &str) -> Self {
        *self.transcript.lock().unwrap() = transcript.to_string();
        self
    }

    pub fn with_audio(self, audio: Vec<u8>) -> Self {
        *self.audio.lock().unwrap() = audio;
        self
    }

    pub fn with_transcribe_failure(self, message: &str) -> Self {
        *self.transcribe_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_speech_failure(self, message: &str) -> Self {
        *self.speech_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn transcribe_count(&self) -> usize {
        *self.transcribe_count.lock().unwrap()
    }

    pub fn speech_count(&self) -> usize {
        self.speech_requests.lock().unwrap().len()
    }

    pub fn speech_requests(&self) -> Vec<SpeechRequest> {
        self.speech_requests.lock().unwrap().clone()
    }
}

impl Default for MockAudioClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioService for MockAudioClient {
    async fn transcribe(&self, _request: &TranscribeRequest) -> Result<String> {
        bump(&self.transcribe_count);
        injected(&self.transcribe_failure)?;
        Ok(self.transcript.lock().unwrap().clone())
    }

    async fn synthesize_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.speech_requests.lock().unwrap().push(request.clone());
        injected(&self.speech_failure)?;
        Ok(self.audio.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct VideoScript {
    pending_polls: usize,
    never_done: bool,
    done_on_submit: bool,
    without_uri: bool,
    failure: Option<String>,
    video: Vec<u8>,
    submits: usize,
    refreshes: usize,
    downloads: usize,
}

/// Scripted video provider: reports `done=false` for the first N status
/// queries and `done=true` on the next one.
#[derive(Clone, Default)]
pub struct MockVideoJobs {
    script: Arc<Mutex<VideoScript>>,
}

impl MockVideoJobs {
    pub const VIDEO_URI: &'static str = "mock://videos/1.mp4";

    pub fn new() -> Self {
        let mock = Self::default();
        mock.script.lock().unwrap().video = b"\x00\x00\x00\x18ftypmp42".to_vec();
        mock
    }

    pub fn with_pending_polls(self, polls: usize) -> Self {
        self.script.lock().unwrap().pending_polls = polls;
        self
    }

    pub fn never_done(self) -> Self {
        self.script.lock().unwrap().never_done = true;
        self
    }

    pub fn done_on_submit(self) -> Self {
        self.script.lock().unwrap().done_on_submit = true;
        self
    }

    pub fn without_uri(self) -> Self {
        self.script.lock().unwrap().without_uri = true;
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.script.lock().unwrap().failure = Some(message.to_string());
        self
    }

    pub fn with_video(self, video: Vec<u8>) -> Self {
        self.script.lock().unwrap().video = video;
        self
    }

    pub fn submit_count(&self) -> usize {
        self.script.lock().unwrap().submits
    }

    pub fn refresh_count(&self) -> usize {
        self.script.lock().unwrap().refreshes
    }

    pub fn download_count(&self) -> usize {
        self.script.lock().unwrap().downloads
    }

    fn finished(script: &VideoScript, id: &str) -> VideoJob {
        match &script.failure {
            Some(failure) => VideoJob {
                id: id.to_string(),
                done: true,
                result_uri: None,
                failure: Some(failure.clone()),
                credential: None,
            },
            None => VideoJob {
                id: id.to_string(),
                done: true,
                result_uri: (!script.without_uri).then(|| Self::VIDEO_URI.to_string()),
                failure: None,
                credential: None,
            },
        }
    }
}

#[async_trait]
impl VideoJobService for MockVideoJobs {
    async fn submit_video(&self, _request: &VideoRequest) -> Result<VideoJob> {
        let mut script = self.script.lock().unwrap();
        script.submits += 1;
        if script.done_on_submit {
            Ok(Self::finished(&script, "operations/mock"))
        } else {
            Ok(VideoJob::pending("operations/mock"))
        }
    }

    async fn refresh_video_job(&self, job: &VideoJob) -> Result<VideoJob> {
        let mut script = self.script.lock().unwrap();
        script.refreshes += 1;
        if script.never_done || script.refreshes <= script.pending_polls {
            Ok(VideoJob::pending(job.id.clone()))
        } else {
            Ok(Self::finished(&script, &job.id))
        }
    }

    async fn download_video(&self, _job: &VideoJob, uri: &str) -> Result<Vec<u8>> {
        let mut script = self.script.lock().unwrap();
        script.downloads += 1;
        if uri != Self::VIDEO_URI {
            return Err(Error::AiProvider(format!("unknown video uri {}", uri)));
        }
        Ok(script.video.clone())
    }
}
