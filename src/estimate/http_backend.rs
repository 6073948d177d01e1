// The estimation service over HTTP.

use reqwest::blocking::{multipart, Client, Response};
use std::time::Duration;

use effort_report::session::{
    extract_detail, EstimateRequest, TasksRequest, UploadRequest,
};
use effort_report::task_gen::{GenerateFileRequest, GenerateRequest};

use crate::estimate::*;

pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> CliResult<HttpBackend> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context(HttpClientSnafu {})?;
        Ok(HttpBackend {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, kind: FormKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint())
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Network(format!(
                "No answer after {} seconds: {}",
                self.timeout.as_secs(),
                e
            ))
        } else if e.is_connect() {
            BackendError::Network(format!("Connection failed: {}", e))
        } else {
            BackendError::Network(e.to_string())
        }
    }

    fn finish(&self, sent: reqwest::Result<Response>) -> Result<JSValue, BackendError> {
        let response = sent.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().map_err(|e| self.transport_error(e))?;
        debug!("HttpBackend: status {} body {} bytes", status, body.len());
        decode_body(status.as_u16(), status.is_success(), &body)
    }
}

/// Interprets the body of an answer. Failure bodies are searched for a `detail`.
fn decode_body(status: u16, success: bool, body: &str) -> Result<JSValue, BackendError> {
    if !success {
        let detail = serde_json::from_str::<JSValue>(body)
            .ok()
            .and_then(|js| extract_detail(&js));
        warn!("decode_body: status {} detail {:?}", status, detail);
        return Err(BackendError::Server { status, detail });
    }
    serde_json::from_str(body).map_err(|e| BackendError::InvalidBody(e.to_string()))
}

impl EstimationBackend for HttpBackend {
    fn estimate(&self, request: &EstimateRequest) -> Result<JSValue, BackendError> {
        let url = self.url(FormKind::Text);
        info!("POST {}", url);
        self.finish(self.client.post(url).json(request).send())
    }

    fn upload_requirements(&self, request: &UploadRequest) -> Result<JSValue, BackendError> {
        let url = self.url(FormKind::Upload);
        info!("POST {} ({}, {} bytes)", url, request.file_name, request.contents.len());
        let part = multipart::Part::bytes(request.contents.clone())
            .file_name(request.file_name.clone());
        let form = multipart::Form::new()
            .part("file", part)
            .text("method", request.method.clone());
        self.finish(self.client.post(url).multipart(form).send())
    }

    fn estimate_from_tasks(&self, request: &TasksRequest) -> Result<JSValue, BackendError> {
        let url = self.url(FormKind::Tasks);
        info!("POST {} ({} tasks)", url, request.tasks.len());
        self.finish(self.client.post(url).json(request).send())
    }

    fn generate_tasks(&self, request: &GenerateRequest) -> Result<JSValue, BackendError> {
        let url = self.url(FormKind::Generate);
        info!("POST {} (at most {} tasks)", url, request.max_tasks);
        self.finish(self.client.post(url).json(request).send())
    }

    fn generate_tasks_from_file(
        &self,
        request: &GenerateFileRequest,
    ) -> Result<JSValue, BackendError> {
        let url = self.url(FormKind::GenerateFromFile);
        info!("POST {} ({}, {} bytes)", url, request.file_name, request.contents.len());
        let part = multipart::Part::bytes(request.contents.clone())
            .file_name(request.file_name.clone());
        let form = multipart::Form::new()
            .part("file", part)
            .text("max_tasks", request.max_tasks.to_string());
        self.finish(self.client.post(url).multipart(form).send())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_bodies() {
        assert_eq!(
            decode_body(400, false, r#"{"detail": "Text is empty"}"#),
            Err(BackendError::Server {
                status: 400,
                detail: Some("Text is empty".to_string())
            })
        );
        assert_eq!(
            decode_body(502, false, "<html>Bad Gateway</html>"),
            Err(BackendError::Server {
                status: 502,
                detail: None
            })
        );
    }

    #[test]
    fn success_bodies() {
        assert_eq!(
            decode_body(200, true, r#"{"total_effort": 4}"#),
            Ok(serde_json::json!({"total_effort": 4}))
        );
        assert!(matches!(
            decode_body(200, true, "not json"),
            Err(BackendError::InvalidBody(_))
        ));
    }

    #[test]
    fn endpoints() {
        let b = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(b.url(FormKind::Manual), "http://localhost:8000/estimate");
        assert_eq!(
            b.url(FormKind::Upload),
            "http://localhost:8000/upload-requirements"
        );
        assert_eq!(
            b.url(FormKind::Tasks),
            "http://localhost:8000/estimate-from-tasks"
        );
        assert_eq!(
            b.url(FormKind::GenerateFromFile),
            "http://localhost:8000/api/task-generation/generate-from-file"
        );
    }

    #[test]
    fn unreachable_service() {
        // Nothing listens on the discard port.
        let b = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let request = EstimateRequest {
            text: Some("requirements".to_string()),
            parameters: None,
            method: DEFAULT_METHOD.to_string(),
        };
        assert!(matches!(
            b.estimate(&request),
            Err(BackendError::Network(_))
        ));
    }
}
