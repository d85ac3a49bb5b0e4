//! # Meeting BaaS SDK
//!
//! Typed Rust client for the Meeting BaaS API: meeting bots, calendar
//! integrations and scheduled recordings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use baas_sdk::{BaasClient, BaasResult, JoinRequest};
//!
//! #[tokio::main]
//! async fn main() -> BaasResult<()> {
//!     let client = BaasClient::builder()
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     let request = JoinRequest::new("https://meet.google.com/abc-defg-hij", "Notetaker");
//!     let joined = client.bots().join(&request).await?;
//!     println!("Bot {} is joining", joined.bot_id);
//!
//!     let calendars = client.calendars().list().await?;
//!     println!("{calendars:#}");
//!
//!     Ok(())
//! }
//! ```
//!
//! Requests are sent once. Non-success responses are returned as
//! [`BaasError`] values; nothing is retried.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-export main client
pub use client::{BaasClient, BaasClientBuilder};
pub use config::{ClientConfig, API_KEY_HEADER, DEFAULT_BASE_URL};
pub use error::{BaasError, BaasResult};

// Re-export request and response models
pub use api::{
    AutomaticLeave, BotConfig, BotConfigPatch, CalendarCredentials, CreateCalendarRequest,
    DeleteDataResponse, JoinRequest, JoinResponse, LeaveResponse, ListBotsQuery,
    ListEventsQuery, Occurrences, RetranscribeRequest, SpeechToText, StreamingConfig,
};

// Re-export core types for convenience
pub use baas_core::{
    AudioFrequency, BotId, CalendarId, CalendarProvider, EventId, EventStatus, Nullable,
    RecordingMode, SpeechToTextProvider,
};
