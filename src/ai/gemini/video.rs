//! Veo video generation over `predictLongRunning`.
//!
//! Submission returns an operation resource name (`models/.../operations/...`)
//! that is re-fetched until `done`, then the sample URI is downloaded with an
//! authenticated GET.

use super::client::GeminiHttpClient;
use crate::ai::VideoJobService;
use crate::models::VideoRequest;
use crate::video::VideoJob;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VeoImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<OperationError>,
}

impl From<Operation> for VideoJob {
    fn from(op: Operation) -> Self {
        let failure = op.error.map(|e| {
            let message = e
                .message
                .unwrap_or_else(|| "video generation failed".to_string());
            match e.code {
                Some(code) => format!("{} (code {})", message, code),
                None => message,
            }
        });

        VideoJob {
            result_uri: op.response.as_ref().and_then(extract_video_uri),
            done: op.done || failure.is_some(),
            id: op.name,
            failure,
            credential: None,
        }
    }
}

fn extract_video_uri(response: &Value) -> Option<String> {
    [
        "/generateVideoResponse/generatedSamples/0/video/uri",
        "/generateVideoResponse/generatedSamples/0/videoUri",
        "/generatedVideos/0/video/uri",
    ]
    .into_iter()
    .find_map(|path| response.pointer(path).and_then(Value::as_str))
    .map(str::to_string)
}

pub struct GeminiVideoClient {
    http: GeminiHttpClient,
    model: String,
}

impl GeminiVideoClient {
    pub fn new(http: GeminiHttpClient, model: String) -> Self {
        Self { http, model }
    }
}

#[async_trait]
impl VideoJobService for GeminiVideoClient {
    async fn submit_video(&self, request: &VideoRequest) -> Result<VideoJob> {
        use base64::Engine as _;

        let image = request.image.as_ref().map(|image| VeoImage {
            bytes_base64_encoded: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
            mime_type: image.mime_type.clone(),
        });

        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image,
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.as_str(),
            },
        };

        let (operation, slot): (Operation, usize) =
            self.http.predict_long_running(&self.model, &body).await?;
        Ok(VideoJob {
            credential: Some(slot),
            ..operation.into()
        })
    }

    async fn refresh_video_job(&self, job: &VideoJob) -> Result<VideoJob> {
        let operation: Operation = self.http.get_operation(&job.id, job.credential).await?;
        Ok(VideoJob {
            credential: job.credential,
            ..operation.into()
        })
    }

    async fn download_video(&self, job: &VideoJob, uri: &str) -> Result<Vec<u8>> {
        self.http.download(uri, job.credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::credentials::CredentialPool;
    use crate::models::{AspectRatio, MediaPart};
    use crate::video::{PollPolicy, VideoPoller};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OP_NAME: &str = "models/veo-3.0-fast-generate-001/operations/op-123";

    fn make_client(server: &MockServer) -> GeminiVideoClient {
        GeminiVideoClient::new(
            test_support::http(server),
            "veo-3.0-fast-generate-001".to_string(),
        )
    }

    #[test]
    fn test_operation_error_marks_job_failed() {
        let op: Operation = serde_json::from_value(serde_json::json!({
            "name": OP_NAME,
            "error": { "code": 3, "message": "prompt rejected" }
        }))
        .unwrap();
        let job = VideoJob::from(op);
        assert!(job.done);
        assert_eq!(job.failure.as_deref(), Some("prompt rejected (code 3)"));
        assert!(job.result_uri.is_none());
    }

    #[tokio::test]
    async fn test_submit_sends_instance_and_aspect_ratio() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/veo-3.0-fast-generate-001:predictLongRunning"))
            .and(body_partial_json(serde_json::json!({
                "instances": [{
                    "prompt": "waves",
                    "image": { "bytesBase64Encoded": "AQID", "mimeType": "image/png" }
                }],
                "parameters": { "aspectRatio": "9:16" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME
            })))
            .expect(1)
            .mount(&server)
            .await;

        let job = make_client(&server)
            .submit_video(&VideoRequest {
                prompt: "waves".to_string(),
                image: Some(MediaPart {
                    mime_type: "image/png".to_string(),
                    bytes: vec![1, 2, 3],
                }),
                aspect_ratio: AspectRatio::Portrait,
            })
            .await
            .unwrap();
        assert_eq!(
            job,
            VideoJob {
                credential: Some(0),
                ..VideoJob::pending(OP_NAME)
            }
        );
    }

    #[tokio::test]
    async fn test_poller_runs_full_lifecycle_against_gemini() {
        let server = MockServer::start().await;
        let download_uri = format!("{}/v1beta/files/vid-1:download?alt=media", server.uri());

        Mock::given(method("POST"))
            .and(path("/v1beta/models/veo-3.0-fast-generate-001:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v1beta/{}", OP_NAME)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME,
                "done": false
            })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v1beta/{}", OP_NAME)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME,
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [{ "video": { "uri": download_uri } }]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1beta/files/vid-1:download"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let poller = VideoPoller::new(
            Arc::new(make_client(&server)),
            PollPolicy {
                interval: Duration::from_millis(1),
                max_attempts: 10,
                max_wait: Duration::from_secs(10),
            },
        );

        let bytes = poller
            .generate(
                &VideoRequest {
                    prompt: "waves".to_string(),
                    image: None,
                    aspect_ratio: AspectRatio::Landscape,
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(bytes, b"mp4-bytes".to_vec());
    }

    #[tokio::test]
    async fn test_status_checks_and_download_reuse_submitting_credential() {
        let server = MockServer::start().await;
        let download_uri = format!("{}/v1beta/files/vid-2:download?alt=media", server.uri());

        Mock::given(method("POST"))
            .and(path("/v1beta/models/veo-3.0-fast-generate-001:predictLongRunning"))
            .and(header("x-goog-api-key", "key-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v1beta/{}", OP_NAME)))
            .and(header("x-goog-api-key", "key-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME,
                "done": false
            })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v1beta/{}", OP_NAME)))
            .and(header("x-goog-api-key", "key-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME,
                "done": true,
                "response": { "generatedVideos": [{ "video": { "uri": download_uri } }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1beta/files/vid-2:download"))
            .and(header("x-goog-api-key", "key-a"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pinned".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(header("x-goog-api-key", "key-b"))
            .respond_with(ResponseTemplate::new(403))
            .expect(0)
            .mount(&server)
            .await;

        let pool = CredentialPool::new(vec!["key-a".to_string(), "key-b".to_string()]).unwrap();
        let http = GeminiHttpClient::new(Arc::new(pool), Duration::from_secs(5))
            .with_base_url(server.uri());
        let poller = VideoPoller::new(
            Arc::new(GeminiVideoClient::new(http, "veo-3.0-fast-generate-001".to_string())),
            PollPolicy {
                interval: Duration::from_millis(1),
                max_attempts: 10,
                max_wait: Duration::from_secs(10),
            },
        );

        let bytes = poller
            .generate(
                &VideoRequest {
                    prompt: "tide".to_string(),
                    image: None,
                    aspect_ratio: AspectRatio::Landscape,
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(bytes, b"pinned".to_vec());
    }
}
