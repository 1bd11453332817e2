//! Blocking HTTPS transport backed by ureq.

use todoist_core::{HttpRequest, HttpResponse, Transport, TransportError};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are interpreted by the core client, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.post(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder
            .send(req.body.as_bytes())
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        // A body we cannot read still leaves the status meaningful; the
        // empty string then fails decoding and is reported as unreadable.
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "could not read response body");
                String::new()
            }
        };
        Ok(HttpResponse { status, body })
    }
}
