// Calendar event tools: browsing events and scheduling recordings

use crate::error::ToolError;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    check_uri, json_schema_boolean, json_schema_enum, json_schema_free_object,
    json_schema_integer, json_schema_object, json_schema_string, json_schema_uri,
    json_schema_uuid, nullable, parse_arguments, Tool, ToolArguments,
};
use baas_sdk::{
    AudioFrequency, BaasClient, BotConfig, BotConfigPatch, CalendarId, EventId, EventStatus,
    ListEventsQuery, Nullable, Occurrences, RecordingMode, SpeechToText, SpeechToTextProvider,
    StreamingConfig,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Bot settings shared by `scheduleRecordEvent` and `patchBot`.
///
/// Every field keeps apart an explicit `null` from an omitted key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotConfigArgs {
    #[serde(default)]
    bot_image: Nullable<String>,
    #[serde(default)]
    deduplication_key: Nullable<String>,
    #[serde(default)]
    entry_message: Nullable<String>,
    #[serde(default)]
    extra: Nullable<Map<String, Value>>,
    #[serde(default)]
    no_one_joined_timeout: Nullable<u32>,
    #[serde(default)]
    recording_mode: Nullable<RecordingMode>,
    #[serde(default)]
    speech_to_text_provider: Nullable<SpeechToTextProvider>,
    #[serde(default)]
    streaming_audio_frequency: Nullable<AudioFrequency>,
    #[serde(default)]
    streaming_input: Nullable<String>,
    #[serde(default)]
    streaming_output: Nullable<String>,
    #[serde(default)]
    waiting_room_timeout: Nullable<u32>,
    #[serde(default)]
    webhook_url: Nullable<String>,
}

impl BotConfigArgs {
    fn validate(&self) -> Result<(), String> {
        let urls = [
            ("botImage", &self.bot_image),
            ("streamingInput", &self.streaming_input),
            ("streamingOutput", &self.streaming_output),
            ("webhookUrl", &self.webhook_url),
        ];
        for (field, value) in urls {
            if let Nullable::Value(url) = value {
                check_uri(field, url)?;
            }
        }
        Ok(())
    }

    /// Streaming settings, left out entirely when no streaming field was given.
    fn streaming(&mut self) -> Nullable<StreamingConfig> {
        let streaming = StreamingConfig {
            input: std::mem::take(&mut self.streaming_input),
            output: std::mem::take(&mut self.streaming_output),
            audio_frequency: std::mem::take(&mut self.streaming_audio_frequency),
        };
        if streaming.is_empty() {
            Nullable::Missing
        } else {
            Nullable::Value(streaming)
        }
    }

    fn into_config(mut self, bot_name: String) -> BotConfig {
        let streaming = self.streaming();
        BotConfig {
            bot_name,
            bot_image: self.bot_image,
            deduplication_key: self.deduplication_key,
            entry_message: self.entry_message,
            extra: self.extra,
            noone_joined_timeout: self.no_one_joined_timeout,
            recording_mode: self.recording_mode,
            speech_to_text: self
                .speech_to_text_provider
                .map(|provider| SpeechToText { provider }),
            streaming,
            waiting_room_timeout: self.waiting_room_timeout,
            webhook_url: self.webhook_url,
        }
    }

    fn into_patch(mut self, bot_name: Nullable<String>) -> BotConfigPatch {
        let streaming = self.streaming();
        BotConfigPatch {
            bot_name,
            bot_image: self.bot_image,
            deduplication_key: self.deduplication_key,
            entry_message: self.entry_message,
            extra: self.extra,
            noone_joined_timeout: self.no_one_joined_timeout,
            recording_mode: self.recording_mode,
            speech_to_text: self
                .speech_to_text_provider
                .map(|provider| SpeechToText { provider }),
            streaming,
            waiting_room_timeout: self.waiting_room_timeout,
            webhook_url: self.webhook_url,
        }
    }
}

/// Schema properties of the bot settings, all accepting `null`.
fn bot_config_properties() -> Map<String, Value> {
    let properties = json!({
        "botImage": json_schema_uri("URL of an image to use as the bot avatar"),
        "deduplicationKey": json_schema_string("Key preventing duplicate bots in the same meeting"),
        "entryMessage": json_schema_string("Chat message the bot posts on joining"),
        "extra": json_schema_free_object("Custom metadata attached to the bot"),
        "noOneJoinedTimeout": json_schema_integer("Seconds to wait for participants before leaving", Some(0), None),
        "recordingMode": json_schema_enum("Recording layout", &RecordingMode::ALL),
        "speechToTextProvider": json_schema_enum("Transcription provider", &SpeechToTextProvider::ALL),
        "streamingAudioFrequency": json_schema_enum("Sample rate of streamed audio", &AudioFrequency::ALL),
        "streamingInput": json_schema_uri("WebSocket URL the bot streams meeting audio to"),
        "streamingOutput": json_schema_uri("WebSocket URL the bot plays audio from"),
        "waitingRoomTimeout": json_schema_integer("Seconds to wait in the waiting room before leaving", Some(0), None),
        "webhookUrl": json_schema_uri("URL receiving bot status webhooks")
    });

    match properties {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, schema)| (name, nullable(schema)))
            .collect(),
        _ => Map::new(),
    }
}

fn all_occurrences_schema() -> Value {
    json_schema_boolean("Apply to every occurrence of a recurring event")
}

fn occurrences(all_occurrences: Option<bool>) -> Occurrences {
    Occurrences { all_occurrences }
}

/// Tool to list the events of a calendar
pub struct ListEventsTool {
    client: BaasClient,
}

impl ListEventsTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEventsArgs {
    calendar_id: CalendarId,
    attendee_email: Option<String>,
    cursor: Option<String>,
    organizer_email: Option<String>,
    start_date_gte: Option<String>,
    start_date_lte: Option<String>,
    status: Option<EventStatus>,
    updated_at_gte: Option<String>,
}

impl ToolArguments for ListEventsArgs {}

#[async_trait::async_trait]
impl Tool for ListEventsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "listEvents".to_string(),
            description: "List the events of a connected calendar".to_string(),
            input_schema: json_schema_object(
                json!({
                    "calendarId": json_schema_uuid("ID of the calendar integration"),
                    "attendeeEmail": json_schema_string("Only events with this attendee"),
                    "cursor": json_schema_string("Pagination cursor from a previous page"),
                    "organizerEmail": json_schema_string("Only events organised by this address"),
                    "startDateGte": json_schema_string("Only events starting at or after this ISO 8601 date"),
                    "startDateLte": json_schema_string("Only events starting at or before this ISO 8601 date"),
                    "status": json_schema_enum("Event status filter", &EventStatus::ALL),
                    "updatedAtGte": json_schema_string("Only events updated at or after this ISO 8601 date")
                }),
                vec!["calendarId"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: ListEventsArgs = parse_arguments("listEvents", arguments)?;
        let query = ListEventsQuery {
            attendee_email: args.attendee_email,
            cursor: args.cursor,
            organizer_email: args.organizer_email,
            start_date_gte: args.start_date_gte,
            start_date_lte: args.start_date_lte,
            status: args.status,
            updated_at_gte: args.updated_at_gte,
            ..ListEventsQuery::new(args.calendar_id)
        };

        let events = self
            .client
            .events()
            .list(&query)
            .await
            .map_err(|e| ToolError::remote("list events of calendar", args.calendar_id, e))?;

        Ok(CallToolResult::json(&events))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventIdArgs {
    event_id: EventId,
    all_occurrences: Option<bool>,
}

impl ToolArguments for EventIdArgs {}

/// Tool to get one calendar event
pub struct GetEventTool {
    client: BaasClient,
}

impl GetEventTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetEventTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "getEvent".to_string(),
            description: "Get the details of a calendar event".to_string(),
            input_schema: json_schema_object(
                json!({
                    "eventId": json_schema_uuid("ID of the calendar event")
                }),
                vec!["eventId"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: EventIdArgs = parse_arguments("getEvent", arguments)?;

        let event = self
            .client
            .events()
            .get(args.event_id)
            .await
            .map_err(|e| ToolError::remote("get event", args.event_id, e))?;

        Ok(CallToolResult::json(&event))
    }
}

/// Tool to schedule a bot for a calendar event
pub struct ScheduleRecordEventTool {
    client: BaasClient,
}

impl ScheduleRecordEventTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRecordArgs {
    event_id: EventId,
    all_occurrences: Option<bool>,
    bot_name: String,
    #[serde(flatten)]
    config: BotConfigArgs,
}

impl ToolArguments for ScheduleRecordArgs {
    fn validate(&self) -> Result<(), String> {
        self.config.validate()
    }
}

#[async_trait::async_trait]
impl Tool for ScheduleRecordEventTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = bot_config_properties();
        properties.insert("eventId".into(), json_schema_uuid("ID of the calendar event"));
        properties.insert("allOccurrences".into(), all_occurrences_schema());
        properties.insert("botName".into(), json_schema_string("Display name of the bot"));

        ToolSchema {
            name: "scheduleRecordEvent".to_string(),
            description: "Schedule a bot to record a calendar event".to_string(),
            input_schema: json_schema_object(Value::Object(properties), vec!["eventId", "botName"]),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: ScheduleRecordArgs = parse_arguments("scheduleRecordEvent", arguments)?;
        let config = args.config.into_config(args.bot_name);

        let events = self
            .client
            .events()
            .schedule_record(args.event_id, occurrences(args.all_occurrences), &config)
            .await
            .map_err(|e| ToolError::remote("schedule recording of event", args.event_id, e))?;

        Ok(CallToolResult::json(&events))
    }
}

/// Tool to cancel the recording of a calendar event
pub struct UnscheduleRecordEventTool {
    client: BaasClient,
}

impl UnscheduleRecordEventTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for UnscheduleRecordEventTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "unscheduleRecordEvent".to_string(),
            description: "Cancel the bot scheduled to record a calendar event".to_string(),
            input_schema: json_schema_object(
                json!({
                    "eventId": json_schema_uuid("ID of the calendar event"),
                    "allOccurrences": all_occurrences_schema()
                }),
                vec!["eventId"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: EventIdArgs = parse_arguments("unscheduleRecordEvent", arguments)?;

        let events = self
            .client
            .events()
            .unschedule_record(args.event_id, occurrences(args.all_occurrences))
            .await
            .map_err(|e| ToolError::remote("unschedule recording of event", args.event_id, e))?;

        Ok(CallToolResult::json(&events))
    }
}

/// Tool to change the bot scheduled for a calendar event
pub struct PatchBotTool {
    client: BaasClient,
}

impl PatchBotTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchBotArgs {
    event_id: EventId,
    all_occurrences: Option<bool>,
    #[serde(default)]
    bot_name: Nullable<String>,
    #[serde(flatten)]
    config: BotConfigArgs,
}

impl ToolArguments for PatchBotArgs {
    fn validate(&self) -> Result<(), String> {
        self.config.validate()
    }
}

#[async_trait::async_trait]
impl Tool for PatchBotTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = bot_config_properties();
        properties.insert("eventId".into(), json_schema_uuid("ID of the calendar event"));
        properties.insert("allOccurrences".into(), all_occurrences_schema());
        properties.insert(
            "botName".into(),
            nullable(json_schema_string("Display name of the bot")),
        );

        ToolSchema {
            name: "patchBot".to_string(),
            description: "Update the settings of the bot scheduled for a calendar event"
                .to_string(),
            input_schema: json_schema_object(Value::Object(properties), vec!["eventId"]),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: PatchBotArgs = parse_arguments("patchBot", arguments)?;
        let patch = args.config.into_patch(args.bot_name);

        let events = self
            .client
            .events()
            .patch_bot(args.event_id, occurrences(args.all_occurrences), &patch)
            .await
            .map_err(|e| ToolError::remote("patch bot of event", args.event_id, e))?;

        Ok(CallToolResult::json(&events))
    }
}
