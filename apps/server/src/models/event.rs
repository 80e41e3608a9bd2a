//! Inbound bttn press events.
//!
//! An event is built from the fields of a single request and dropped once the
//! response has been sent.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Keys every press must carry, checked in this order
pub const REQUIRED_FIELDS: [&str; 3] = ["channel", "recipient", "message"];

// =============================================================================
// Channel Enum
// =============================================================================

/// Notification medium selected by the press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    HipChat,
    Sms,
}

impl FromStr for Channel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hipchat" => Ok(Channel::HipChat),
            "sms" => Ok(Channel::Sms),
            other => Err(AppError::UnknownChannel(other.to_string())),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::HipChat => write!(f, "hipchat"),
            Channel::Sms => write!(f, "sms"),
        }
    }
}

// =============================================================================
// Inbound Event
// =============================================================================

/// A validated press: where to send what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub channel: Channel,
    /// Room name/id for HipChat, phone number for SMS
    pub recipient: String,
    pub message: String,
}

impl InboundEvent {
    /// Builds an event from decoded request fields.
    ///
    /// Reports the first missing key in `REQUIRED_FIELDS` order, then rejects
    /// unknown channels. Field values are not otherwise validated here; the
    /// channel decides what a valid recipient or message is.
    pub fn from_fields(fields: &HashMap<String, String>) -> AppResult<Self> {
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|key| !fields.contains_key(**key)) {
            return Err(AppError::MissingField(*missing));
        }

        let channel = fields["channel"].parse::<Channel>()?;

        Ok(Self {
            channel,
            recipient: fields["recipient"].clone(),
            message: fields["message"].clone(),
        })
    }
}

/// Body of the deprecated `/bttn` endpoint
#[derive(Debug, Deserialize)]
pub struct LegacyPress {
    #[serde(default)]
    pub user: Option<String>,
}

impl LegacyPress {
    /// Message posted to the legacy room on behalf of `user`
    pub fn message(user: &str) -> String {
        format!("{} pressed the bttn", user)
    }
}
