// Meeting bot tools: join, leave, meeting data, retranscription

use crate::error::ToolError;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    check_range, check_uri, json_schema_boolean, json_schema_enum, json_schema_free_object,
    json_schema_integer, json_schema_object, json_schema_string, json_schema_uri,
    json_schema_uuid, parse_arguments, with_default, Tool, ToolArguments,
};
use baas_sdk::{
    AutomaticLeave, BaasClient, BaasError, BotId, JoinRequest, ListBotsQuery, RecordingMode,
    RetranscribeRequest, SpeechToText, SpeechToTextProvider,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const DEFAULT_BOT_NAME: &str = "Meeting BaaS Bot";

/// Upper bound of `listRecentBots` page size.
pub const MAX_LIST_LIMIT: u32 = 50;

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

/// Arguments naming a single bot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotIdArgs {
    bot_id: BotId,
}

impl ToolArguments for BotIdArgs {}

fn bot_id_schema() -> Value {
    json_schema_object(
        json!({
            "botId": json_schema_uuid("ID of the bot")
        }),
        vec!["botId"],
    )
}

/// Tool to send a bot into a meeting
pub struct JoinMeetingTool {
    client: BaasClient,
}

impl JoinMeetingTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinMeetingArgs {
    meeting_url: String,
    #[serde(default = "default_bot_name")]
    bot_name: String,
    #[serde(default)]
    reserved: bool,
    bot_image: Option<String>,
    entry_message: Option<String>,
    deduplication_key: Option<String>,
    recording_mode: Option<RecordingMode>,
    speech_to_text_provider: Option<SpeechToTextProvider>,
    webhook_url: Option<String>,
    extra: Option<Map<String, Value>>,
    no_one_joined_timeout: Option<u32>,
    waiting_room_timeout: Option<u32>,
}

impl ToolArguments for JoinMeetingArgs {
    fn validate(&self) -> Result<(), String> {
        check_uri("meetingUrl", &self.meeting_url)?;
        if let Some(url) = &self.bot_image {
            check_uri("botImage", url)?;
        }
        if let Some(url) = &self.webhook_url {
            check_uri("webhookUrl", url)?;
        }
        Ok(())
    }
}

impl From<JoinMeetingArgs> for JoinRequest {
    fn from(args: JoinMeetingArgs) -> Self {
        let automatic_leave =
            if args.no_one_joined_timeout.is_some() || args.waiting_room_timeout.is_some() {
                Some(AutomaticLeave {
                    noone_joined_timeout: args.no_one_joined_timeout,
                    waiting_room_timeout: args.waiting_room_timeout,
                })
            } else {
                None
            };

        JoinRequest {
            reserved: args.reserved,
            bot_image: args.bot_image,
            entry_message: args.entry_message,
            deduplication_key: args.deduplication_key,
            recording_mode: args.recording_mode,
            speech_to_text: args
                .speech_to_text_provider
                .map(|provider| SpeechToText { provider }),
            webhook_url: args.webhook_url,
            extra: args.extra,
            automatic_leave,
            ..JoinRequest::new(args.meeting_url, args.bot_name)
        }
    }
}

#[async_trait::async_trait]
impl Tool for JoinMeetingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "joinMeeting".to_string(),
            description: "Send a bot to join a video meeting and record it".to_string(),
            input_schema: json_schema_object(
                json!({
                    "meetingUrl": json_schema_uri("URL of the meeting to join"),
                    "botName": with_default(
                        json_schema_string("Display name of the bot"),
                        json!(DEFAULT_BOT_NAME)
                    ),
                    "reserved": with_default(
                        json_schema_boolean("Use a reserved bot that is ready four minutes before the meeting"),
                        json!(false)
                    ),
                    "botImage": json_schema_uri("URL of an image to use as the bot avatar"),
                    "entryMessage": json_schema_string("Chat message the bot posts on joining"),
                    "deduplicationKey": json_schema_string("Key preventing duplicate bots in the same meeting"),
                    "recordingMode": json_schema_enum("Recording layout", &RecordingMode::ALL),
                    "speechToTextProvider": json_schema_enum("Transcription provider", &SpeechToTextProvider::ALL),
                    "webhookUrl": json_schema_uri("URL receiving bot status webhooks"),
                    "extra": json_schema_free_object("Custom metadata attached to the bot"),
                    "noOneJoinedTimeout": json_schema_integer("Seconds to wait for participants before leaving", Some(0), None),
                    "waitingRoomTimeout": json_schema_integer("Seconds to wait in the waiting room before leaving", Some(0), None)
                }),
                vec!["meetingUrl"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: JoinMeetingArgs = parse_arguments("joinMeeting", arguments)?;
        let meeting_url = args.meeting_url.clone();
        let request = JoinRequest::from(args);

        let joined = self
            .client
            .bots()
            .join(&request)
            .await
            .map_err(|e| ToolError::remote("join meeting", &meeting_url, e))?;

        tracing::info!(bot_id = %joined.bot_id, meeting_url = %meeting_url, "Bot joining meeting");
        Ok(CallToolResult::text(format!(
            "Successfully joined meeting {}. Bot ID: {}",
            meeting_url, joined.bot_id
        )))
    }
}

/// Tool to remove a bot from its meeting
pub struct LeaveMeetingTool {
    client: BaasClient,
}

impl LeaveMeetingTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for LeaveMeetingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "leaveMeeting".to_string(),
            description: "Remove a bot from the meeting it is attending".to_string(),
            input_schema: bot_id_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: BotIdArgs = parse_arguments("leaveMeeting", arguments)?;

        let left = self
            .client
            .bots()
            .leave(args.bot_id)
            .await
            .map_err(|e| ToolError::remote("leave meeting", args.bot_id, e))?;

        if !left.ok {
            return Err(ToolError::remote(
                "leave meeting",
                args.bot_id,
                BaasError::NotCompleted("bot did not leave".to_string()),
            ));
        }
        Ok(CallToolResult::text(format!(
            "Bot {} successfully left the meeting",
            args.bot_id
        )))
    }
}

/// Tool to fetch recording and transcript data of a bot
pub struct GetMeetingDataTool {
    client: BaasClient,
}

impl GetMeetingDataTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetMeetingDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "getMeetingData".to_string(),
            description: "Get the recording, transcript and metadata of a bot's meeting".to_string(),
            input_schema: bot_id_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: BotIdArgs = parse_arguments("getMeetingData", arguments)?;

        let data = self
            .client
            .bots()
            .meeting_data(args.bot_id)
            .await
            .map_err(|e| ToolError::remote("get meeting data for bot", args.bot_id, e))?;

        Ok(CallToolResult::json(&data))
    }
}

/// Tool to delete the recorded data of a bot
pub struct DeleteDataTool {
    client: BaasClient,
}

impl DeleteDataTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "deleteData".to_string(),
            description: "Delete the recording, transcript and other data of a bot".to_string(),
            input_schema: bot_id_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: BotIdArgs = parse_arguments("deleteData", arguments)?;

        let deleted = self
            .client
            .bots()
            .delete_data(args.bot_id)
            .await
            .map_err(|e| ToolError::remote("delete data of bot", args.bot_id, e))?;

        if !deleted.ok {
            return Err(ToolError::remote(
                "delete data of bot",
                args.bot_id,
                BaasError::NotCompleted("data was not deleted".to_string()),
            ));
        }
        let text = match deleted.status {
            Some(status) => format!("Data for bot {} deleted (status: {status})", args.bot_id),
            None => format!("Data for bot {} deleted", args.bot_id),
        };
        Ok(CallToolResult::text(text))
    }
}

/// Tool to list recent bots with their metadata
pub struct ListRecentBotsTool {
    client: BaasClient,
}

impl ListRecentBotsTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListRecentBotsArgs {
    bot_name: Option<String>,
    created_after: Option<String>,
    created_before: Option<String>,
    cursor: Option<String>,
    filter_by_extra: Option<String>,
    limit: Option<u32>,
    meeting_url: Option<String>,
    sort_by_extra: Option<String>,
    speaker_name: Option<String>,
}

impl ToolArguments for ListRecentBotsArgs {
    fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit {
            check_range("limit", limit, 1, MAX_LIST_LIMIT)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Tool for ListRecentBotsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "listRecentBots".to_string(),
            description: "List recent bots with their metadata, newest first".to_string(),
            input_schema: json_schema_object(
                json!({
                    "botName": json_schema_string("Filter by bot name"),
                    "createdAfter": json_schema_string("Only bots created after this ISO 8601 date"),
                    "createdBefore": json_schema_string("Only bots created before this ISO 8601 date"),
                    "cursor": json_schema_string("Pagination cursor from a previous page"),
                    "filterByExtra": json_schema_string("Filter on extra metadata, as key:value pairs separated by commas"),
                    "limit": json_schema_integer("Maximum number of bots to return", Some(1), Some(MAX_LIST_LIMIT)),
                    "meetingUrl": json_schema_string("Filter by meeting URL"),
                    "sortByExtra": json_schema_string("Sort on an extra metadata field, as field:asc or field:desc"),
                    "speakerName": json_schema_string("Filter by the name of a speaker")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: ListRecentBotsArgs = parse_arguments("listRecentBots", arguments)?;
        let query = ListBotsQuery {
            bot_name: args.bot_name,
            created_after: args.created_after,
            created_before: args.created_before,
            cursor: args.cursor,
            filter_by_extra: args.filter_by_extra,
            limit: args.limit,
            meeting_url: args.meeting_url,
            sort_by_extra: args.sort_by_extra,
            speaker_name: args.speaker_name,
        };

        let bots = self
            .client
            .bots()
            .list_with_metadata(&query)
            .await
            .map_err(|e| ToolError::remote_untargeted("list recent bots", e))?;

        Ok(CallToolResult::json(&bots))
    }
}

/// Tool to transcribe a bot's audio again
pub struct RetranscribeBotTool {
    client: BaasClient,
}

impl RetranscribeBotTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetranscribeArgs {
    bot_id: BotId,
    speech_to_text_provider: Option<SpeechToTextProvider>,
    webhook_url: Option<String>,
}

impl ToolArguments for RetranscribeArgs {
    fn validate(&self) -> Result<(), String> {
        match &self.webhook_url {
            Some(url) => check_uri("webhookUrl", url),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Tool for RetranscribeBotTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "retranscribeBot".to_string(),
            description: "Transcribe a bot's recording again, optionally with another provider"
                .to_string(),
            input_schema: json_schema_object(
                json!({
                    "botId": json_schema_uuid("ID of the bot"),
                    "speechToTextProvider": json_schema_enum("Transcription provider", &SpeechToTextProvider::ALL),
                    "webhookUrl": json_schema_uri("URL notified when the transcription is ready")
                }),
                vec!["botId"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: RetranscribeArgs = parse_arguments("retranscribeBot", arguments)?;
        let request = RetranscribeRequest {
            bot_uuid: args.bot_id,
            speech_to_text: args
                .speech_to_text_provider
                .map(|provider| SpeechToText { provider }),
            webhook_url: args.webhook_url,
        };

        self.client
            .bots()
            .retranscribe(&request)
            .await
            .map_err(|e| ToolError::remote("retranscribe bot", args.bot_id, e))?;

        Ok(CallToolResult::text(format!(
            "Retranscription requested for bot {}",
            args.bot_id
        )))
    }
}
