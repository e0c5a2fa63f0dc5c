use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse, Part};
use crate::ai::TextService;
use crate::models::{CodeRequest, ImageAnalyzeRequest, MultimodalRequest, TextRequest};
use crate::{prompts, Error, Result};
use async_trait::async_trait;

pub struct GeminiTextClient {
    http: GeminiHttpClient,
    model: String,
}

impl GeminiTextClient {
    pub fn new(http: GeminiHttpClient, model: String) -> Self {
        Self { http, model }
    }

    async fn complete(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        modality: &'static str,
    ) -> Result<String> {
        let response: GenerateContentResponse = self.http.generate_content(model, request).await?;
        response
            .text()
            .ok_or_else(|| Error::no_content(modality, response.empty_reason()))
    }
}

#[async_trait]
impl TextService for GeminiTextClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let mut body = GenerateContentRequest::single_turn(vec![Part::text(&request.prompt)]);
        if let Some(system) = &request.system_instruction {
            body = body.with_system_instruction(system);
        }

        let model = request.model.as_deref().unwrap_or(&self.model);
        self.complete(model, &body, "text").await
    }

    async fn analyze_image(&self, request: &ImageAnalyzeRequest) -> Result<String> {
        tracing::debug!(
            "Analyzing image ({} bytes, {}) via Gemini",
            request.image_bytes.len(),
            request.mime_type
        );

        let prompt = request
            .prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(prompts::ANALYZE_DEFAULT);

        let body = GenerateContentRequest::single_turn(vec![
            Part::inline(&request.mime_type, &request.image_bytes),
            Part::text(prompt),
        ]);

        self.complete(&self.model, &body, "image analysis").await
    }

    async fn assist_code(&self, request: &CodeRequest) -> Result<String> {
        let body = GenerateContentRequest::single_turn(vec![Part::text(prompts::code_prompt(
            request,
        ))])
        .with_system_instruction(prompts::CODE_SYSTEM);

        self.complete(&self.model, &body, "code").await
    }

    async fn multimodal(&self, request: &MultimodalRequest) -> Result<String> {
        let mut parts: Vec<Part> = request.parts.iter().map(Part::from).collect();
        parts.push(Part::text(&request.prompt));

        self.complete(&self.model, &GenerateContentRequest::single_turn(parts), "multimodal")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::models::{CodeMode, MediaPart};
    use wiremock::matchers::{body_partial_json, body_string_contains, path};
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    fn make_client(server: &MockServer) -> GeminiTextClient {
        GeminiTextClient::new(test_support::http(server), DEFAULT_MODEL.to_string())
    }

    #[tokio::test]
    async fn test_generate_text_parses_response() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": { "parts": [{ "text": "Be brief." }] },
                "contents": [{ "role": "user", "parts": [{ "text": "Name a colour" }] }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("Teal")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = make_client(&server)
            .generate_text(&TextRequest {
                prompt: "Name a colour".to_string(),
                system_instruction: Some("Be brief.".to_string()),
                model: None,
            })
            .await
            .unwrap();
        assert_eq!(result, "Teal");
    }

    #[tokio::test]
    async fn test_generate_text_honours_model_override() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("ok")),
            )
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .generate_text(&TextRequest {
                prompt: "hi".to_string(),
                system_instruction: None,
                model: Some("models/gemini-2.5-pro".to_string()),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_text_is_no_content() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_text(&TextRequest {
                prompt: "hi".to_string(),
                system_instruction: None,
                model: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoContent { modality: "text", .. }));
        assert!(!err.is_upstream());
    }

    #[tokio::test]
    async fn test_analyze_image_uses_default_prompt_and_inline_data() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("Describe this image in detail"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("A cat")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = make_client(&server)
            .analyze_image(&ImageAnalyzeRequest {
                image_bytes: vec![0x89, 0x50, 0x4E, 0x47],
                mime_type: "image/png".to_string(),
                prompt: None,
            })
            .await
            .unwrap();
        assert_eq!(result, "A cat");
    }

    #[tokio::test]
    async fn test_assist_code_sends_rendered_template() {
        let server = MockServer::start().await;
        let request = CodeRequest {
            code: "print(1/0)".to_string(),
            mode: CodeMode::Debug,
            language: "python".to_string(),
        };

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": prompts::code_prompt(&request) }] }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("fixed")),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(make_client(&server).assist_code(&request).await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_multimodal_appends_prompt_after_media() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [
                    { "inlineData": { "mimeType": "image/jpeg", "data": "AQI=" } },
                    { "inlineData": { "mimeType": "audio/mpeg", "data": "Aw==" } },
                    { "text": "Compare these" }
                ] }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::text_response("Similar")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = make_client(&server)
            .multimodal(&MultimodalRequest {
                parts: vec![
                    MediaPart {
                        mime_type: "image/jpeg".to_string(),
                        bytes: vec![1, 2],
                    },
                    MediaPart {
                        mime_type: "audio/mpeg".to_string(),
                        bytes: vec![3],
                    },
                ],
                prompt: "Compare these".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result, "Similar");
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_text(&TextRequest {
                prompt: "hi".to_string(),
                system_instruction: None,
                model: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
