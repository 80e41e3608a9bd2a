//! SMS dispatcher.
//!
//! Only the credential checks are in place; delivery answers with a fixed
//! placeholder so the endpoint contract stays stable until Twilio sending lands.

use async_trait::async_trait;

use super::{ChannelDispatcher, DispatchOutcome};
use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};

/// SMS dispatcher backed by Twilio credentials
pub struct SmsDispatcher {
    config: TwilioConfig,
}

impl SmsDispatcher {
    pub fn new(config: TwilioConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChannelDispatcher for SmsDispatcher {
    fn check_credentials(&self) -> AppResult<()> {
        if self.config.account_sid.is_none() {
            return Err(AppError::MissingConfig("TWILIO_ACCOUNT_SID"));
        }
        if self.config.auth_token.is_none() {
            return Err(AppError::MissingConfig("TWILIO_AUTH_TOKEN"));
        }
        Ok(())
    }

    async fn deliver(&self, number: &str, message: &str) -> AppResult<DispatchOutcome> {
        log::info!(
            "SMS delivery to {} not implemented, dropping {} chars",
            number,
            message.chars().count()
        );
        Ok(DispatchOutcome::new(200, "Not yet implemented"))
    }
}
