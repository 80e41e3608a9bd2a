//! HipChat v2 API client and dispatcher.
//!
//! Posts notifications to rooms and private messages to users. Arguments are
//! validated before any request is made; provider responses outside the 2xx
//! range come back as a [`DeliveryError`] carrying the raw body.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use url::Url;

use super::{ChannelDispatcher, DispatchOutcome};
use crate::config::HipChatConfig;
use crate::error::{AppError, AppResult, DeliveryError, HipChatError};
use crate::models::{MessageFormat, NotificationRequest};

/// Successful provider response
#[derive(Debug, Clone)]
pub struct HipChatResponse {
    pub status: u16,
    pub body: String,
}

/// Thin wrapper around the HipChat REST API
#[derive(Debug, Clone)]
pub struct HipChatClient {
    client: reqwest::Client,
    api_root: Url,
    default_token: Option<String>,
}

impl HipChatClient {
    /// Creates a client from configuration
    pub fn new(config: &HipChatConfig) -> Result<Self, HipChatError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_root: config.api_root.clone(),
            default_token: config.api_token.clone(),
        })
    }

    /// True when requests can be made without an explicit token
    pub fn has_default_token(&self) -> bool {
        self.default_token.is_some()
    }

    /// POST `room/{room}/notification`
    pub async fn send_room_message(
        &self,
        room_id_or_name: &str,
        request: &NotificationRequest,
        auth_token: Option<&str>,
    ) -> Result<HipChatResponse, HipChatError> {
        if room_id_or_name.is_empty() {
            return Err(HipChatError::MissingRecipient("room_id_or_name"));
        }

        let url = self.endpoint(&["room", room_id_or_name, "notification"]);
        self.call_api(url, request, auth_token).await
    }

    /// POST `user/{user}/message`
    ///
    /// Private messages have no color or sender override.
    pub async fn send_user_message(
        &self,
        user_id_or_email: &str,
        message: &str,
        notify: bool,
        format: MessageFormat,
        auth_token: Option<&str>,
    ) -> Result<HipChatResponse, HipChatError> {
        if user_id_or_email.is_empty() {
            return Err(HipChatError::MissingRecipient("user_id_or_email"));
        }

        let request = NotificationRequest::new(message)?
            .notify(notify)
            .format(format);
        let url = self.endpoint(&["user", user_id_or_email, "message"]);
        self.call_api(url, &request, auth_token).await
    }

    /// Appends percent-encoded path segments to the API root
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Explicit token wins over the configured one
    fn resolve_token<'a>(
        &'a self,
        auth_token: Option<&'a str>,
    ) -> Result<&'a str, HipChatError> {
        auth_token
            .filter(|t| !t.is_empty())
            .or(self.default_token.as_deref())
            .ok_or(HipChatError::MissingToken)
    }

    async fn call_api(
        &self,
        url: Url,
        request: &NotificationRequest,
        auth_token: Option<&str>,
    ) -> Result<HipChatResponse, HipChatError> {
        let token = self.resolve_token(auth_token)?;

        let mut builder = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json");
        if let Some(host) = url.host_str() {
            let host = match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            builder = builder.header(HOST, host);
        }

        log::debug!("POST {}", url);
        let response = builder.json(request).send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if status / 100 != 2 {
            return Err(DeliveryError::new(status, body).into());
        }

        Ok(HipChatResponse { status, body })
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Forwards presses to a HipChat room as plain text
pub struct HipChatDispatcher {
    client: HipChatClient,
}

impl HipChatDispatcher {
    pub fn new(client: HipChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChannelDispatcher for HipChatDispatcher {
    fn check_credentials(&self) -> AppResult<()> {
        if !self.client.has_default_token() {
            return Err(AppError::MissingConfig("HIPCHAT_API_TOKEN"));
        }
        Ok(())
    }

    async fn deliver(&self, room: &str, message: &str) -> AppResult<DispatchOutcome> {
        let request = NotificationRequest::new(message)?.format(MessageFormat::Text);

        match self.client.send_room_message(room, &request, None).await {
            Ok(response) => Ok(DispatchOutcome::new(
                response.status,
                "Message sent successfully",
            )),
            Err(HipChatError::Delivery(e)) => {
                log::warn!("HipChat rejected message for room '{}': {}", room, e);
                Err(AppError::Delivery(e))
            }
            Err(e @ HipChatError::Transport(_)) => {
                log::error!("HipChat unreachable for room '{}': {}", room, e);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
