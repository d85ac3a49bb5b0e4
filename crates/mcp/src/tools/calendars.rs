// Calendar integration tools

use crate::error::ToolError;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_enum, json_schema_object, json_schema_string, json_schema_uuid, parse_arguments,
    Tool, ToolArguments,
};
use baas_sdk::{BaasClient, CalendarCredentials, CalendarId, CalendarProvider, CreateCalendarRequest};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const CREDENTIAL_FIELDS: [&str; 4] = [
    "oauthClientId",
    "oauthClientSecret",
    "oauthRefreshToken",
    "platform",
];

/// OAuth credentials as tool arguments.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialArgs {
    oauth_client_id: String,
    oauth_client_secret: String,
    oauth_refresh_token: String,
    platform: CalendarProvider,
}

impl ToolArguments for CredentialArgs {}

impl From<CredentialArgs> for CalendarCredentials {
    fn from(args: CredentialArgs) -> Self {
        CalendarCredentials {
            oauth_client_id: args.oauth_client_id,
            oauth_client_secret: args.oauth_client_secret,
            oauth_refresh_token: args.oauth_refresh_token,
            platform: args.platform,
        }
    }
}

fn credential_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "oauthClientId".into(),
        json_schema_string("OAuth client ID of the calendar provider app"),
    );
    properties.insert(
        "oauthClientSecret".into(),
        json_schema_string("OAuth client secret of the calendar provider app"),
    );
    properties.insert(
        "oauthRefreshToken".into(),
        json_schema_string("OAuth refresh token of the calendar owner"),
    );
    properties.insert(
        "platform".into(),
        json_schema_enum("Calendar provider", &CalendarProvider::ALL),
    );
    properties
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarIdArgs {
    calendar_id: CalendarId,
}

impl ToolArguments for CalendarIdArgs {}

fn calendar_id_schema() -> Value {
    json_schema_object(
        json!({
            "calendarId": json_schema_uuid("ID of the calendar integration")
        }),
        vec!["calendarId"],
    )
}

fn no_arguments_schema() -> Value {
    json_schema_object(json!({}), vec![])
}

/// Tool to connect a provider calendar
pub struct CreateCalendarTool {
    client: BaasClient,
}

impl CreateCalendarTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCalendarArgs {
    #[serde(flatten)]
    credentials: CredentialArgs,
    raw_calendar_id: Option<String>,
}

impl ToolArguments for CreateCalendarArgs {}

#[async_trait::async_trait]
impl Tool for CreateCalendarTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = credential_properties();
        properties.insert(
            "rawCalendarId".into(),
            json_schema_string("Provider ID of the calendar to sync; defaults to the primary calendar"),
        );

        ToolSchema {
            name: "createCalendar".to_string(),
            description: "Connect a Google or Microsoft calendar to Meeting BaaS".to_string(),
            input_schema: json_schema_object(Value::Object(properties), CREDENTIAL_FIELDS.to_vec()),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: CreateCalendarArgs = parse_arguments("createCalendar", arguments)?;
        let request = CreateCalendarRequest {
            credentials: args.credentials.into(),
            raw_calendar_id: args.raw_calendar_id,
        };

        let calendar = self
            .client
            .calendars()
            .create(&request)
            .await
            .map_err(|e| ToolError::remote_untargeted("create calendar", e))?;

        Ok(CallToolResult::json(&calendar))
    }
}

/// Tool to list connected calendars
pub struct ListCalendarsTool {
    client: BaasClient,
}

impl ListCalendarsTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ListCalendarsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "listCalendars".to_string(),
            description: "List all connected calendars".to_string(),
            input_schema: no_arguments_schema(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult, ToolError> {
        let calendars = self
            .client
            .calendars()
            .list()
            .await
            .map_err(|e| ToolError::remote_untargeted("list calendars", e))?;

        Ok(CallToolResult::json(&calendars))
    }
}

/// Tool to get one connected calendar
pub struct GetCalendarTool {
    client: BaasClient,
}

impl GetCalendarTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetCalendarTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "getCalendar".to_string(),
            description: "Get the details of a connected calendar".to_string(),
            input_schema: calendar_id_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: CalendarIdArgs = parse_arguments("getCalendar", arguments)?;

        let calendar = self
            .client
            .calendars()
            .get(args.calendar_id)
            .await
            .map_err(|e| ToolError::remote("get calendar", args.calendar_id, e))?;

        Ok(CallToolResult::json(&calendar))
    }
}

/// Tool to replace the credentials of a connected calendar
pub struct UpdateCalendarTool {
    client: BaasClient,
}

impl UpdateCalendarTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCalendarArgs {
    calendar_id: CalendarId,
    #[serde(flatten)]
    credentials: CredentialArgs,
}

impl ToolArguments for UpdateCalendarArgs {}

#[async_trait::async_trait]
impl Tool for UpdateCalendarTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = credential_properties();
        properties.insert(
            "calendarId".into(),
            json_schema_uuid("ID of the calendar integration"),
        );
        let mut required = vec!["calendarId"];
        required.extend(CREDENTIAL_FIELDS);

        ToolSchema {
            name: "updateCalendar".to_string(),
            description: "Update the OAuth credentials of a connected calendar".to_string(),
            input_schema: json_schema_object(Value::Object(properties), required),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: UpdateCalendarArgs = parse_arguments("updateCalendar", arguments)?;
        let credentials = CalendarCredentials::from(args.credentials);

        let calendar = self
            .client
            .calendars()
            .update(args.calendar_id, &credentials)
            .await
            .map_err(|e| ToolError::remote("update calendar", args.calendar_id, e))?;

        Ok(CallToolResult::json(&calendar))
    }
}

/// Tool to disconnect a calendar
pub struct DeleteCalendarTool {
    client: BaasClient,
}

impl DeleteCalendarTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteCalendarTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "deleteCalendar".to_string(),
            description: "Disconnect a calendar and cancel its scheduled recordings".to_string(),
            input_schema: calendar_id_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: CalendarIdArgs = parse_arguments("deleteCalendar", arguments)?;

        self.client
            .calendars()
            .delete(args.calendar_id)
            .await
            .map_err(|e| ToolError::remote("delete calendar", args.calendar_id, e))?;

        Ok(CallToolResult::text(format!(
            "Calendar {} deleted",
            args.calendar_id
        )))
    }
}

/// Tool to resynchronise every connected calendar
pub struct ResyncAllCalendarsTool {
    client: BaasClient,
}

impl ResyncAllCalendarsTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ResyncAllCalendarsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "resyncAllCalendars".to_string(),
            description: "Force a resynchronisation of all connected calendars".to_string(),
            input_schema: no_arguments_schema(),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult, ToolError> {
        let outcome = self
            .client
            .calendars()
            .resync_all()
            .await
            .map_err(|e| ToolError::remote_untargeted("resync calendars", e))?;

        Ok(CallToolResult::json(&outcome))
    }
}

/// Tool to list the provider calendars reachable with a set of credentials
pub struct ListRawCalendarsTool {
    client: BaasClient,
}

impl ListRawCalendarsTool {
    pub fn new(client: BaasClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ListRawCalendarsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "listRawCalendars".to_string(),
            description: "List the calendars available at the provider before connecting one"
                .to_string(),
            input_schema: json_schema_object(
                Value::Object(credential_properties()),
                CREDENTIAL_FIELDS.to_vec(),
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: CredentialArgs = parse_arguments("listRawCalendars", arguments)?;
        let credentials = CalendarCredentials::from(args);

        let calendars = self
            .client
            .calendars()
            .list_raw(&credentials)
            .await
            .map_err(|e| ToolError::remote_untargeted("list raw calendars", e))?;

        Ok(CallToolResult::json(&calendars))
    }
}
