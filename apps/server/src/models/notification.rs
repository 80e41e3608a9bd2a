//! Outbound HipChat notification payloads.

use std::str::FromStr;

use serde::Serialize;

use crate::error::HipChatError;

/// Shortest message HipChat accepts, in characters
pub const MIN_MESSAGE_CHARS: usize = 1;
/// Longest message HipChat accepts, in characters
pub const MAX_MESSAGE_CHARS: usize = 10_000;

// =============================================================================
// Color Enum
// =============================================================================

/// Background color of a room notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Yellow,
    Green,
    Red,
    Purple,
    Gray,
    Random,
}

impl FromStr for Color {
    type Err = HipChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            "red" => Ok(Color::Red),
            "purple" => Ok(Color::Purple),
            "gray" => Ok(Color::Gray),
            "random" => Ok(Color::Random),
            other => Err(HipChatError::InvalidColor(other.to_string())),
        }
    }
}

// =============================================================================
// Message Format Enum
// =============================================================================

/// How HipChat renders the message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    /// Links and markup are rendered
    #[default]
    Html,
    /// Shown as-is, suitable for code and quotes
    Text,
}

impl FromStr for MessageFormat {
    type Err = HipChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(MessageFormat::Html),
            "text" => Ok(MessageFormat::Text),
            other => Err(HipChatError::InvalidFormat(other.to_string())),
        }
    }
}

// =============================================================================
// Notification Request
// =============================================================================

/// JSON body posted to the room notification and user message endpoints.
///
/// The message length is checked on construction, so every value of this type
/// is safe to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    message: String,
    color: Color,
    notify: bool,
    message_format: MessageFormat,
    #[serde(rename = "from", skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
}

impl NotificationRequest {
    /// Creates a request with HipChat's defaults: yellow, silent, html
    pub fn new(message: impl Into<String>) -> Result<Self, HipChatError> {
        let message = message.into();
        let len = message.chars().count();

        if len < MIN_MESSAGE_CHARS {
            return Err(HipChatError::MessageTooShort);
        }
        if len > MAX_MESSAGE_CHARS {
            return Err(HipChatError::MessageTooLong);
        }

        Ok(Self {
            message,
            color: Color::default(),
            notify: false,
            message_format: MessageFormat::default(),
            sender: None,
        })
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Pings the recipients when true
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn format(mut self, format: MessageFormat) -> Self {
        self.message_format = format;
        self
    }

    /// Overrides the sender name, which otherwise defaults to the token owner
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
