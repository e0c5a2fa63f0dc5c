use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::ai::ImageService;
use crate::models::{GeneratedImage, ImageEditRequest, ImageMode, ImageRequest};
use crate::{Error, Result};
use async_trait::async_trait;

pub struct GeminiImageClient {
    http: GeminiHttpClient,
    model: String,
    pro_model: String,
}

impl GeminiImageClient {
    pub fn new(http: GeminiHttpClient, model: String, pro_model: String) -> Self {
        Self {
            http,
            model,
            pro_model,
        }
    }

    fn model_for(&self, mode: ImageMode) -> &str {
        match mode {
            ImageMode::Standard => &self.model,
            ImageMode::Pro => &self.pro_model,
        }
    }

    async fn request_image(
        &self,
        model: &str,
        parts: Vec<Part>,
        modality: &'static str,
    ) -> Result<GeneratedImage> {
        let request = GenerateContentRequest {
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                ..Default::default()
            }),
            ..GenerateContentRequest::single_turn(parts)
        };

        let response: GenerateContentResponse = self.http.generate_content(model, &request).await?;

        // The model may answer with text only (e.g. it declined the edit).
        let image_data = response.inline_data().ok_or_else(|| {
            let detail = match response.text() {
                Some(text) => format!("model replied with text only: {}", text),
                None => response.empty_reason(),
            };
            Error::no_content(modality, detail)
        })?;

        tracing::debug!(
            "Gemini returned image with mime_type: {}",
            image_data.mime_type
        );

        let bytes = image_data.decode().map_err(|e| {
            Error::AiProvider(format!("Failed to decode Gemini base64 image: {}", e))
        })?;

        if bytes.is_empty() {
            return Err(Error::no_content(modality, "image payload was empty"));
        }

        Ok(GeneratedImage {
            bytes,
            mime_type: image_data.mime_type.clone(),
        })
    }
}

#[async_trait]
impl ImageService for GeminiImageClient {
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let model = self.model_for(request.mode.unwrap_or_default());
        self.request_image(model, vec![Part::text(&request.prompt)], "image")
            .await
    }

    async fn edit_image(&self, request: &ImageEditRequest) -> Result<GeneratedImage> {
        let parts = vec![
            Part::inline(&request.mime_type, &request.image_bytes),
            Part::text(&request.edit_prompt),
        ];
        self.request_image(&self.model, parts, "image edit").await
    }
}
