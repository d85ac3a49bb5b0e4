//! Calendars API endpoints.

use crate::client::BaasClient;
use crate::error::BaasResult;
use baas_core::{CalendarId, CalendarProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Calendars API for managing calendar integrations.
pub struct CalendarsApi<'a> {
    client: &'a BaasClient,
}

impl<'a> CalendarsApi<'a> {
    pub(crate) fn new(client: &'a BaasClient) -> Self {
        Self { client }
    }

    /// Create a calendar integration.
    pub async fn create(&self, request: &CreateCalendarRequest) -> BaasResult<Value> {
        self.client.http.post("/calendars/", request).await
    }

    /// List calendar integrations.
    pub async fn list(&self) -> BaasResult<Value> {
        self.client.http.get("/calendars/").await
    }

    /// Get a calendar integration.
    pub async fn get(&self, calendar_id: CalendarId) -> BaasResult<Value> {
        self.client
            .http
            .get(&format!("/calendars/{calendar_id}"))
            .await
    }

    /// Replace the credentials of a calendar integration.
    pub async fn update(
        &self,
        calendar_id: CalendarId,
        credentials: &CalendarCredentials,
    ) -> BaasResult<Value> {
        self.client
            .http
            .patch(&format!("/calendars/{calendar_id}"), credentials)
            .await
    }

    /// Delete a calendar integration.
    pub async fn delete(&self, calendar_id: CalendarId) -> BaasResult<()> {
        self.client
            .http
            .delete_no_response(&format!("/calendars/{calendar_id}"))
            .await
    }

    /// Trigger a resynchronisation of every calendar.
    pub async fn resync_all(&self) -> BaasResult<Value> {
        self.client
            .http
            .post_empty("/internal/calendar/resync_all")
            .await
    }

    /// List the calendars visible to a set of OAuth credentials at the provider.
    pub async fn list_raw(&self, credentials: &CalendarCredentials) -> BaasResult<Value> {
        self.client.http.post("/calendars/raw", credentials).await
    }
}

/// OAuth credentials granting access to a provider calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarCredentials {
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_refresh_token: String,
    pub platform: CalendarProvider,
}

/// Request to create a calendar integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarRequest {
    #[serde(flatten)]
    pub credentials: CalendarCredentials,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_calendar_id: Option<String>,
}
