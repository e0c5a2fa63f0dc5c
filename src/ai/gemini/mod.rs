pub mod audio;
pub mod chat;
pub mod client;
pub mod image;
pub mod text;
pub mod types;
pub mod video;

pub use audio::GeminiAudioClient;
pub use chat::GeminiChatClient;
pub use client::GeminiHttpClient;
pub use image::GeminiImageClient;
pub use text::GeminiTextClient;
pub use video::GeminiVideoClient;

#[cfg(test)]
pub(crate) mod test_support {
    use super::client::GeminiHttpClient;
    use crate::credentials::CredentialPool;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer};

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";

    pub fn post_path_regex(regex: &str) -> wiremock::MockBuilder {
        Mock::given(method("POST")).and(path_regex(regex))
    }

    pub fn http(server: &MockServer) -> GeminiHttpClient {
        let pool = CredentialPool::new(vec!["test-key".to_string()]).unwrap();
        GeminiHttpClient::new(Arc::new(pool), Duration::from_secs(5)).with_base_url(server.uri())
    }

    pub fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }
}
