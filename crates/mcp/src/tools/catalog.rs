// The full Meeting BaaS tool catalog

use crate::error::McpError;
use crate::server::McpServer;
use crate::tools::bots::{
    DeleteDataTool, GetMeetingDataTool, JoinMeetingTool, LeaveMeetingTool, ListRecentBotsTool,
    RetranscribeBotTool,
};
use crate::tools::calendars::{
    CreateCalendarTool, DeleteCalendarTool, GetCalendarTool, ListCalendarsTool,
    ListRawCalendarsTool, ResyncAllCalendarsTool, UpdateCalendarTool,
};
use crate::tools::echo::EchoTool;
use crate::tools::events::{
    GetEventTool, ListEventsTool, PatchBotTool, ScheduleRecordEventTool, UnscheduleRecordEventTool,
};
use crate::tools::Tool;
use baas_sdk::BaasClient;
use std::sync::Arc;

/// Every tool, bound to `client`, in catalog order.
pub fn catalog(client: &BaasClient) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(JoinMeetingTool::new(client.clone())),
        Arc::new(LeaveMeetingTool::new(client.clone())),
        Arc::new(GetMeetingDataTool::new(client.clone())),
        Arc::new(DeleteDataTool::new(client.clone())),
        Arc::new(CreateCalendarTool::new(client.clone())),
        Arc::new(ListCalendarsTool::new(client.clone())),
        Arc::new(GetCalendarTool::new(client.clone())),
        Arc::new(UpdateCalendarTool::new(client.clone())),
        Arc::new(DeleteCalendarTool::new(client.clone())),
        Arc::new(ResyncAllCalendarsTool::new(client.clone())),
        Arc::new(ListRecentBotsTool::new(client.clone())),
        Arc::new(RetranscribeBotTool::new(client.clone())),
        Arc::new(ListRawCalendarsTool::new(client.clone())),
        Arc::new(ListEventsTool::new(client.clone())),
        Arc::new(GetEventTool::new(client.clone())),
        Arc::new(ScheduleRecordEventTool::new(client.clone())),
        Arc::new(UnscheduleRecordEventTool::new(client.clone())),
        Arc::new(PatchBotTool::new(client.clone())),
        Arc::new(EchoTool),
    ]
}

/// Attach the catalog to `server`, with a client built from `api_key`
/// against the production API.
///
/// A missing or empty key still registers every tool; remote calls then
/// fail with an authentication error envelope.
pub fn register_tools(server: &mut McpServer, api_key: Option<&str>) -> Result<(), McpError> {
    let mut builder = BaasClient::builder();
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    register_tools_with_client(server, &builder.build()?)
}

/// Attach the catalog to `server` using an existing client.
///
/// Fails with `McpError::DuplicateTool` if any catalog tool is already
/// registered; the server is then left unchanged.
pub fn register_tools_with_client(
    server: &mut McpServer,
    client: &BaasClient,
) -> Result<(), McpError> {
    server.registry_mut().register_all(catalog(client))?;
    tracing::debug!(
        tools = server.registry().len(),
        authenticated = client.has_api_key(),
        "Registered Meeting BaaS tools"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn client() -> BaasClient {
        BaasClient::builder().build().unwrap()
    }

    #[test]
    fn test_catalog_names() {
        let names: Vec<String> = catalog(&client())
            .iter()
            .map(|tool| tool.schema().name)
            .collect();

        assert_eq!(
            names,
            vec![
                "joinMeeting",
                "leaveMeeting",
                "getMeetingData",
                "deleteData",
                "createCalendar",
                "listCalendars",
                "getCalendar",
                "updateCalendar",
                "deleteCalendar",
                "resyncAllCalendars",
                "listRecentBots",
                "retranscribeBot",
                "listRawCalendars",
                "listEvents",
                "getEvent",
                "scheduleRecordEvent",
                "unscheduleRecordEvent",
                "patchBot",
                "echo",
            ]
        );
    }

    #[test]
    fn test_register_without_key() {
        let mut server = McpServer::default();
        register_tools(&mut server, None).unwrap();
        assert_eq!(server.registry().len(), 19);
    }

    #[test]
    fn test_double_registration_rejected() {
        let client = client();
        let mut server = McpServer::default();
        register_tools_with_client(&mut server, &client).unwrap();

        let err = server
            .registry_mut()
            .register_all(catalog(&client))
            .unwrap_err();
        assert!(matches!(err, McpError::DuplicateTool(name) if name == "joinMeeting"));

        let schemas = server.registry().list_schemas();
        let unique: HashSet<_> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(schemas.len(), 19);
        assert_eq!(unique.len(), schemas.len());
    }

    #[test]
    fn test_double_registration_through_register_tools() {
        let mut server = McpServer::default();
        register_tools(&mut server, Some("key")).unwrap();

        let err = register_tools(&mut server, Some("key")).unwrap_err();
        assert!(matches!(err, McpError::DuplicateTool(_)));
        assert_eq!(server.registry().len(), 19);
    }

    #[test]
    fn test_schemas_are_objects_with_descriptions() {
        for tool in catalog(&client()) {
            let schema = tool.schema();
            assert!(!schema.description.is_empty(), "{}", schema.name);
            assert_eq!(schema.input_schema["type"], "object", "{}", schema.name);
        }
    }
}
