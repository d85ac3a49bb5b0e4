//! Calendar events API endpoints.

use crate::api::bots::SpeechToText;
use crate::client::BaasClient;
use crate::error::BaasResult;
use baas_core::{AudioFrequency, CalendarId, EventId, EventStatus, Nullable, RecordingMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Events API for browsing calendar events and scheduling recordings.
pub struct EventsApi<'a> {
    client: &'a BaasClient,
}

impl<'a> EventsApi<'a> {
    pub(crate) fn new(client: &'a BaasClient) -> Self {
        Self { client }
    }

    /// List events of a calendar.
    pub async fn list(&self, query: &ListEventsQuery) -> BaasResult<Value> {
        self.client
            .http
            .get_with_query("/calendar_events/", query)
            .await
    }

    /// Get a single event.
    pub async fn get(&self, event_id: EventId) -> BaasResult<Value> {
        self.client
            .http
            .get(&format!("/calendar_events/{event_id}"))
            .await
    }

    /// Schedule a bot to record an event.
    pub async fn schedule_record(
        &self,
        event_id: EventId,
        occurrences: Occurrences,
        config: &BotConfig,
    ) -> BaasResult<Value> {
        self.client
            .http
            .post_with_query(&format!("/calendar_events/{event_id}/bot"), &occurrences, config)
            .await
    }

    /// Cancel a scheduled recording.
    pub async fn unschedule_record(
        &self,
        event_id: EventId,
        occurrences: Occurrences,
    ) -> BaasResult<Value> {
        self.client
            .http
            .delete_with_query(&format!("/calendar_events/{event_id}/bot"), &occurrences)
            .await
    }

    /// Partially update the bot scheduled for an event.
    pub async fn patch_bot(
        &self,
        event_id: EventId,
        occurrences: Occurrences,
        config: &BotConfigPatch,
    ) -> BaasResult<Value> {
        self.client
            .http
            .patch_with_query(&format!("/calendar_events/{event_id}/bot"), &occurrences, config)
            .await
    }
}

/// Filters for listing calendar events.
#[derive(Debug, Clone, Serialize)]
pub struct ListEventsQuery {
    pub calendar_id: CalendarId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_lte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_gte: Option<String>,
}

impl ListEventsQuery {
    pub fn new(calendar_id: CalendarId) -> Self {
        Self {
            calendar_id,
            attendee_email: None,
            cursor: None,
            organizer_email: None,
            start_date_gte: None,
            start_date_lte: None,
            status: None,
            updated_at_gte: None,
        }
    }
}

/// Whether a scheduling change applies to every occurrence of a recurring event.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Occurrences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_occurrences: Option<bool>,
}

/// Real-time audio streaming endpoints of a bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfig {
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub input: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub output: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub audio_frequency: Nullable<AudioFrequency>,
}

impl StreamingConfig {
    pub fn is_empty(&self) -> bool {
        self.input.is_missing() && self.output.is_missing() && self.audio_frequency.is_missing()
    }
}

/// Bot configuration used when scheduling a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub bot_name: String,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub bot_image: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub deduplication_key: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub entry_message: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub extra: Nullable<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub noone_joined_timeout: Nullable<u32>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub recording_mode: Nullable<RecordingMode>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub speech_to_text: Nullable<SpeechToText>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub streaming: Nullable<StreamingConfig>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub waiting_room_timeout: Nullable<u32>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub webhook_url: Nullable<String>,
}

/// Partial bot configuration; only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfigPatch {
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub bot_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub bot_image: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub deduplication_key: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub entry_message: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub extra: Nullable<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub noone_joined_timeout: Nullable<u32>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub recording_mode: Nullable<RecordingMode>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub speech_to_text: Nullable<SpeechToText>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub streaming: Nullable<StreamingConfig>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub waiting_room_timeout: Nullable<u32>,
    #[serde(default, skip_serializing_if = "Nullable::is_missing")]
    pub webhook_url: Nullable<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BaasClient {
        BaasClient::builder().base_url(server.uri()).build().unwrap()
    }

    #[tokio::test]
    async fn test_list_sends_calendar_and_status() {
        let server = MockServer::start().await;
        let calendar_id = CalendarId(Uuid::new_v4());

        Mock::given(method("GET"))
            .and(path("/calendar_events/"))
            .and(query_param("calendar_id", calendar_id.to_string()))
            .and(query_param("status", "upcoming"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "next": null})))
            .expect(1)
            .mount(&server)
            .await;

        let query = ListEventsQuery {
            status: Some(EventStatus::Upcoming),
            ..ListEventsQuery::new(calendar_id)
        };
        let page = client_for(&server).events().list(&query).await.unwrap();
        assert!(page["next"].is_null());
    }

    #[tokio::test]
    async fn test_schedule_record_with_all_occurrences() {
        let server = MockServer::start().await;
        let event_id = EventId(Uuid::new_v4());

        Mock::given(method("POST"))
            .and(path(format!("/calendar_events/{event_id}/bot")))
            .and(query_param("all_occurrences", "true"))
            .and(body_json(json!({
                "bot_name": "Recorder",
                "entry_message": null,
                "streaming": {"input": "wss://in", "audio_frequency": "24khz"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"uuid": event_id}])))
            .expect(1)
            .mount(&server)
            .await;

        let config = BotConfig {
            bot_name: "Recorder".to_string(),
            bot_image: Nullable::Missing,
            deduplication_key: Nullable::Missing,
            entry_message: Nullable::Null,
            extra: Nullable::Missing,
            noone_joined_timeout: Nullable::Missing,
            recording_mode: Nullable::Missing,
            speech_to_text: Nullable::Missing,
            streaming: Nullable::Value(StreamingConfig {
                input: Nullable::Value("wss://in".to_string()),
                output: Nullable::Missing,
                audio_frequency: Nullable::Value(AudioFrequency::Khz24),
            }),
            waiting_room_timeout: Nullable::Missing,
            webhook_url: Nullable::Missing,
        };
        let occurrences = Occurrences {
            all_occurrences: Some(true),
        };

        client_for(&server)
            .events()
            .schedule_record(event_id, occurrences, &config)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unschedule_without_flag_sends_no_query() {
        let server = MockServer::start().await;
        let event_id = EventId(Uuid::new_v4());

        Mock::given(method("DELETE"))
            .and(path(format!("/calendar_events/{event_id}/bot")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .events()
            .unschedule_record(event_id, Occurrences::default())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_patch_bot_sends_only_present_fields() {
        let server = MockServer::start().await;
        let event_id = EventId(Uuid::new_v4());

        Mock::given(method("PATCH"))
            .and(path(format!("/calendar_events/{event_id}/bot")))
            .and(body_json(json!({"bot_name": "Renamed", "webhook_url": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let patch = BotConfigPatch {
            bot_name: Nullable::Value("Renamed".to_string()),
            webhook_url: Nullable::Null,
            ..Default::default()
        };
        client_for(&server)
            .events()
            .patch_bot(event_id, Occurrences::default(), &patch)
            .await
            .unwrap();
    }
}
