use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::model::project::Project;
use crate::model::record::RecordId;

/// Error type for remote API calls
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("server returned status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<ureq::Error> for RemoteError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => RemoteError::Status(code),
            ureq::Error::Transport(t) => RemoteError::Transport(t.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Project>,
}

/// Blocking CRUD client for a REST backend exposing `/projects`.
///
/// Every call is a single attempt: no retry, no backoff.
pub struct RemoteProjects {
    agent: ureq::Agent,
    base_url: String,
}

impl RemoteProjects {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        RemoteProjects {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    fn record_url(&self, id: RecordId) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }

    /// `GET /projects`, answered with `{"data": [...]}`.
    pub fn list(&self) -> Result<Vec<Project>, RemoteError> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET");
        let response = self.agent.get(&url).set("Accept", "application/json").call()?;
        let envelope: ListEnvelope = response
            .into_json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }

    /// `POST /projects`. Returns the created record if the server sent one.
    pub fn create(&self, project: &Project) -> Result<Option<Project>, RemoteError> {
        let url = self.collection_url();
        tracing::debug!(%url, "POST");
        let response = self
            .agent
            .post(&url)
            .set("Accept", "application/json")
            .send_json(project)?;
        read_record(response)
    }

    /// `PUT /projects/{id}`. Returns the updated record if the server sent one.
    pub fn update(&self, project: &Project) -> Result<Option<Project>, RemoteError> {
        let url = self.record_url(project.id);
        tracing::debug!(%url, "PUT");
        let response = self
            .agent
            .put(&url)
            .set("Accept", "application/json")
            .send_json(project)?;
        read_record(response)
    }

    /// `DELETE /projects/{id}`.
    pub fn delete(&self, id: RecordId) -> Result<(), RemoteError> {
        let url = self.record_url(id);
        tracing::debug!(%url, "DELETE");
        self.agent.delete(&url).call()?;
        Ok(())
    }
}

/// The affected record, bare or wrapped in `{"data": ...}`. An empty body
/// is `None`.
fn read_record(response: ureq::Response) -> Result<Option<Project>, RemoteError> {
    let body = response
        .into_string()
        .map_err(|e| RemoteError::Transport(e.to_string()))?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))?;
    let record = match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        Value::Object(map) => Value::Object(map),
        _ => return Ok(None),
    };
    serde_json::from_value(record)
        .map(Some)
        .map_err(|e| RemoteError::Decode(e.to_string()))
}
