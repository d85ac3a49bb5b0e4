use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a meeting bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotId(pub Uuid);

impl std::fmt::Display for BotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a calendar integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarId(pub Uuid);

impl std::fmt::Display for CalendarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar provider backing an integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarProvider {
    Google,
    Microsoft,
}

impl CalendarProvider {
    pub const ALL: [&'static str; 2] = ["Google", "Microsoft"];
}

/// How the bot records the meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    SpeakerView,
    GalleryView,
    AudioOnly,
}

impl RecordingMode {
    pub const ALL: [&'static str; 3] = ["speaker_view", "gallery_view", "audio_only"];
}

/// Speech-to-text engine used for transcription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechToTextProvider {
    Gladia,
    Runpod,
    Default,
}

impl SpeechToTextProvider {
    pub const ALL: [&'static str; 3] = ["Gladia", "Runpod", "Default"];
}

/// Sample rate of streamed meeting audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFrequency {
    #[serde(rename = "16khz")]
    Khz16,
    #[serde(rename = "24khz")]
    Khz24,
}

impl AudioFrequency {
    pub const ALL: [&'static str; 2] = ["16khz", "24khz"];
}

/// Time filter applied when listing calendar events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Past,
    All,
}

impl EventStatus {
    pub const ALL: [&'static str; 3] = ["upcoming", "past", "all"];
}
