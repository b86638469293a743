/// Voice platform client: the single point of entry for all calls to the
/// voice-agent hosting service (agent creation, call listing, call detail).
///
/// No retries: every failure goes straight back to the operator, who re-triggers
/// the action. Any status ≥ 300 is an error carrying the raw response body.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

use crate::models::assistant::{AssistantPayload, CreatedAssistant};
use crate::models::call::{CallListResponse, CallRecord, CallSummary};

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response (status {status}) has no agent id: {body}")]
    MissingId { status: u16, body: String },
}

/// Operations this service needs from the voice platform.
/// Carried in `AppState` as `Arc<dyn VoicePlatform>`.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    /// Creates a new agent and returns its platform-assigned id.
    async fn create_assistant(&self, payload: &AssistantPayload) -> Result<String, VoiceError>;

    /// Lists calls, optionally filtered server-side by agent id.
    async fn list_calls(
        &self,
        assistant_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CallSummary>, VoiceError>;

    async fn get_call(&self, call_id: &str) -> Result<CallRecord, VoiceError>;

    async fn delete_assistant(&self, assistant_id: &str) -> Result<(), VoiceError>;
}

#[derive(Clone)]
pub struct VapiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VapiClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, VoiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Reads the body and turns any status ≥ 300 into `VoiceError::Api`.
async fn checked_body(response: Response) -> Result<(u16, String), VoiceError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    if status >= 300 {
        return Err(VoiceError::Api { status, body });
    }
    Ok((status, body))
}

#[async_trait]
impl VoicePlatform for VapiClient {
    async fn create_assistant(&self, payload: &AssistantPayload) -> Result<String, VoiceError> {
        let response = self
            .client
            .post(self.url("/assistant"))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let (status, body) = checked_body(response).await?;
        let created: CreatedAssistant = serde_json::from_str(&body)?;

        match created.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!("Voice platform created agent {id} (status {status})");
                Ok(id)
            }
            None => Err(VoiceError::MissingId { status, body }),
        }
    }

    async fn list_calls(
        &self,
        assistant_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CallSummary>, VoiceError> {
        let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(id) = assistant_id {
            query.push(("assistantId", id.to_string()));
        }

        let response = self
            .client
            .get(self.url("/call"))
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await?;

        let (_, body) = checked_body(response).await?;
        let calls = serde_json::from_str::<CallListResponse>(&body)?.into_calls();
        debug!("Voice platform listed {} calls", calls.len());
        Ok(calls)
    }

    async fn get_call(&self, call_id: &str) -> Result<CallRecord, VoiceError> {
        let response = self
            .client
            .get(self.url(&format!("/call/{call_id}")))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let (_, body) = checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<(), VoiceError> {
        let response = self
            .client
            .delete(self.url(&format!("/assistant/{assistant_id}")))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        checked_body(response).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory stand-in for the voice platform used by stage and router tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeVoicePlatform {
        pub created: Mutex<Vec<AssistantPayload>>,
        pub deleted: Mutex<Vec<String>>,
        pub next_ids: Mutex<Vec<String>>,
        pub create_failure: Option<(u16, String)>,
        pub calls: Vec<CallSummary>,
        pub details: HashMap<String, CallRecord>,
        pub filtered_list_fails: bool,
        pub list_fails: bool,
        pub list_requests: Mutex<Vec<Option<String>>>,
    }

    impl FakeVoicePlatform {
        pub fn with_ids(ids: &[&str]) -> Self {
            Self {
                next_ids: Mutex::new(ids.iter().rev().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl VoicePlatform for FakeVoicePlatform {
        async fn create_assistant(
            &self,
            payload: &AssistantPayload,
        ) -> Result<String, VoiceError> {
            if let Some((status, body)) = &self.create_failure {
                return Err(VoiceError::Api {
                    status: *status,
                    body: body.clone(),
                });
            }
            self.created.lock().unwrap().push(payload.clone());
            let id = self
                .next_ids
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "asst_default".to_string());
            Ok(id)
        }

        async fn list_calls(
            &self,
            assistant_id: Option<&str>,
            _limit: u32,
        ) -> Result<Vec<CallSummary>, VoiceError> {
            self.list_requests
                .lock()
                .unwrap()
                .push(assistant_id.map(String::from));
            if self.list_fails || (assistant_id.is_some() && self.filtered_list_fails) {
                return Err(VoiceError::Api {
                    status: 500,
                    body: "list unavailable".to_string(),
                });
            }
            Ok(self.calls.clone())
        }

        async fn get_call(&self, call_id: &str) -> Result<CallRecord, VoiceError> {
            self.details
                .get(call_id)
                .cloned()
                .ok_or_else(|| VoiceError::Api {
                    status: 404,
                    body: format!("call {call_id} not found"),
                })
        }

        async fn delete_assistant(&self, assistant_id: &str) -> Result<(), VoiceError> {
            self.deleted.lock().unwrap().push(assistant_id.to_string());
            Ok(())
        }
    }
}
