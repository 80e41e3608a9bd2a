//! Channel dispatchers.
//!
//! Every channel a press can be routed to implements [`ChannelDispatcher`];
//! the endpoint checks credentials first and only then delivers.

pub mod hipchat;
pub mod sms;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::Channel;

pub use hipchat::{HipChatClient, HipChatDispatcher, HipChatResponse};
pub use sms::SmsDispatcher;

// =============================================================================
// Dispatch Outcome
// =============================================================================

/// Status and body the endpoint answers with after a successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: u16,
    pub body: String,
}

impl DispatchOutcome {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

// =============================================================================
// Channel Dispatcher Trait
// =============================================================================

/// Trait for channel dispatchers (Strategy pattern)
#[async_trait]
pub trait ChannelDispatcher: Send + Sync {
    /// Fails with the name of the first missing credential
    fn check_credentials(&self) -> AppResult<()>;

    /// Sends `message` to `recipient`
    async fn deliver(&self, recipient: &str, message: &str) -> AppResult<DispatchOutcome>;
}

// =============================================================================
// Dispatcher Factory
// =============================================================================

/// Creates the dispatcher for a channel
pub fn create_dispatcher(
    channel: Channel,
    config: &Config,
    hipchat: &HipChatClient,
) -> Box<dyn ChannelDispatcher> {
    match channel {
        Channel::HipChat => Box::new(HipChatDispatcher::new(hipchat.clone())),
        Channel::Sms => Box::new(SmsDispatcher::new(config.twilio.clone())),
    }
}
