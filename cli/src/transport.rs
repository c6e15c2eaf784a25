//! Executes core requests over HTTP with `ureq`.

use console_core::{ApiConfig, HttpMethod, HttpOutcome, HttpRequest, HttpResponse, TransportError};

pub struct Transport {
    agent: ureq::Agent,
    origin: Option<String>,
}

impl Transport {
    /// `origin` resolves origin-relative paths such as `/api/customers/`.
    pub fn new(origin: &str) -> Self {
        Self::build(Some(origin.trim_end_matches('/').to_string()))
    }

    /// Only same-origin configurations need `origin`; otherwise it is unused.
    pub fn for_config(config: &ApiConfig, origin: &str) -> Self {
        if config.is_same_origin() {
            tracing::debug!(origin, "resolving API paths against origin");
            Self::new(origin)
        } else {
            Self::build(None)
        }
    }

    fn build(origin: Option<String>) -> Self {
        // Error statuses come back as data so the core can read the envelope.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, origin }
    }

    pub fn url(&self, path: &str) -> String {
        match &self.origin {
            Some(origin) if path.starts_with('/') => format!("{origin}{path}"),
            _ => path.to_string(),
        }
    }

    pub fn execute(&self, request: HttpRequest) -> HttpOutcome {
        let url = self.url(&request.path);
        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        let headers = &request.headers;
        let result = match (request.method, request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), headers).send(&body[..])
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&url), headers).send(&body[..])
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&url), headers).send_empty(),
        };
        let mut response = result.map_err(|err| {
            tracing::warn!(%url, error = %err, "request did not complete");
            TransportError(err.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| TransportError(err.to_string()))?;
        tracing::debug!(status, %url, "response received");

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
