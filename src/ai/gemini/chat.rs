use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, Part, Tool};
use crate::ai::ChatService;
use crate::models::{ChatRequest, GroundedText, TripExtraRequest, TripRequest};
use crate::{grounding, prompts, Error, Result};
use async_trait::async_trait;

pub struct GeminiChatClient {
    http: GeminiHttpClient,
    model: String,
    reasoning_model: String,
}

impl GeminiChatClient {
    pub fn new(http: GeminiHttpClient, model: String, reasoning_model: String) -> Self {
        if model == reasoning_model {
            tracing::warn!(
                "Reasoning model matches the chat model ({}); reasoning mode is a no-op",
                model
            );
        }

        Self {
            http,
            model,
            reasoning_model,
        }
    }

    /// Builds the provider request for a chat turn. Search and reasoning are
    /// independent switches: one attaches a tool, the other picks the model.
    fn chat_request<'a>(&'a self, request: &ChatRequest) -> (&'a str, GenerateContentRequest) {
        let mut contents: Vec<Content> = request.history.iter().map(Content::from).collect();
        contents.push(Content::user(vec![Part::text(&request.message)]));

        let tools = if request.search_enabled {
            vec![Tool::GoogleSearch {}]
        } else {
            Vec::new()
        };

        let model = if request.reasoning_mode {
            self.reasoning_model.as_str()
        } else {
            self.model.as_str()
        };

        (
            model,
            GenerateContentRequest {
                contents,
                tools,
                ..Default::default()
            },
        )
    }

    async fn grounded(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        modality: &'static str,
    ) -> Result<GroundedText> {
        let response: GenerateContentResponse = self.http.generate_content(model, request).await?;

        let text = response
            .text()
            .ok_or_else(|| Error::no_content(modality, response.empty_reason()))?;
        let grounding_chunks = grounding::extract(response.grounding_metadata());

        Ok(GroundedText {
            text,
            grounding_chunks,
        })
    }
}

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn chat(&self, request: &ChatRequest) -> Result<GroundedText> {
        let (model, body) = self.chat_request(request);
        tracing::debug!(
            "Chat turn with {} history turns (model: {}, search: {})",
            request.history.len(),
            model,
            request.search_enabled
        );
        self.grounded(model, &body, "chat").await
    }

    async fn plan_trip(&self, request: &TripRequest) -> Result<GroundedText> {
        let body = GenerateContentRequest {
            tools: vec![Tool::GoogleMaps {}],
            ..GenerateContentRequest::single_turn(vec![Part::text(
                prompts::trip_itinerary_prompt(request),
            )])
        }
        .with_system_instruction(prompts::TRIP_SYSTEM);

        self.grounded(&self.model, &body, "trip itinerary").await
    }

    async fn trip_extra(&self, request: &TripExtraRequest) -> Result<String> {
        let body = GenerateContentRequest::single_turn(vec![Part::text(
            prompts::trip_extra_prompt(request),
        )]);

        let response: GenerateContentResponse =
            self.http.generate_content(&self.model, &body).await?;
        response
            .text()
            .ok_or_else(|| Error::no_content("trip extra", response.empty_reason()))
    }
}
