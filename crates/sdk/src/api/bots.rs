//! Bots API endpoints.

use crate::client::BaasClient;
use crate::error::BaasResult;
use baas_core::{BotId, RecordingMode, SpeechToTextProvider};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bots API for sending bots into meetings and managing their data.
pub struct BotsApi<'a> {
    client: &'a BaasClient,
}

impl<'a> BotsApi<'a> {
    pub(crate) fn new(client: &'a BaasClient) -> Self {
        Self { client }
    }

    /// Send a bot into a meeting.
    pub async fn join(&self, request: &JoinRequest) -> BaasResult<JoinResponse> {
        self.client.http.post("/bots", request).await
    }

    /// Remove a bot from its meeting.
    pub async fn leave(&self, bot_id: BotId) -> BaasResult<LeaveResponse> {
        self.client.http.delete(&format!("/bots/{bot_id}")).await
    }

    /// Get recording, transcript and metadata for a bot's meeting.
    pub async fn meeting_data(&self, bot_id: BotId) -> BaasResult<Value> {
        self.client
            .http
            .get_with_query("/bots/meeting_data", &[("bot_id", bot_id.to_string())])
            .await
    }

    /// Delete the recorded data of a bot.
    pub async fn delete_data(&self, bot_id: BotId) -> BaasResult<DeleteDataResponse> {
        self.client
            .http
            .post_empty(&format!("/bots/{bot_id}/delete_data"))
            .await
    }

    /// List recent bots with their metadata.
    pub async fn list_with_metadata(&self, query: &ListBotsQuery) -> BaasResult<Value> {
        self.client
            .http
            .get_with_query("/bots/bots_with_metadata", query)
            .await
    }

    /// Transcribe a bot's audio again, optionally with another provider.
    pub async fn retranscribe(&self, request: &RetranscribeRequest) -> BaasResult<()> {
        self.client
            .http
            .post_no_response("/bots/retranscribe", request)
            .await
    }
}

/// Speech-to-text settings attached to a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechToText {
    pub provider: SpeechToTextProvider,
}

/// When a bot leaves a meeting on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomaticLeave {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noone_joined_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waiting_room_timeout: Option<u32>,
}

/// Request to send a bot into a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub meeting_url: String,
    pub bot_name: String,
    pub reserved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplication_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_mode: Option<RecordingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_to_text: Option<SpeechToText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_leave: Option<AutomaticLeave>,
}

impl JoinRequest {
    pub fn new(meeting_url: impl Into<String>, bot_name: impl Into<String>) -> Self {
        Self {
            meeting_url: meeting_url.into(),
            bot_name: bot_name.into(),
            reserved: false,
            bot_image: None,
            entry_message: None,
            deduplication_key: None,
            recording_mode: None,
            speech_to_text: None,
            webhook_url: None,
            extra: None,
            automatic_leave: None,
        }
    }
}

/// Response from sending a bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub bot_id: BotId,
}

/// Response from removing a bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResponse {
    pub ok: bool,
}

/// Response from deleting a bot's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDataResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Filters for listing recent bots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListBotsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_extra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by_extra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
}

/// Request to transcribe a bot's audio again.
#[derive(Debug, Clone, Serialize)]
pub struct RetranscribeRequest {
    pub bot_uuid: BotId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_to_text: Option<SpeechToText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}
