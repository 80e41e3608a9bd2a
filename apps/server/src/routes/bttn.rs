use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::error::PayloadError;
use actix_web::{http::header, http::StatusCode, web, HttpRequest, HttpResponse};
use futures_util::{stream, StreamExt};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Channel, InboundEvent, LegacyPress};
use crate::services::{create_dispatcher, DispatchOutcome, HipChatClient};

/// POST /
/// Forwards a bttn press to the channel named in the request
pub async fn bttn_pressed(
    config: web::Data<Config>,
    hipchat: web::Data<HipChatClient>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let fields = decode_fields(&req, body).await?;
    let event = InboundEvent::from_fields(&fields)?;

    log::info!("bttn pressed: {} -> {}", event.channel, event.recipient);

    let dispatcher = create_dispatcher(event.channel, config.get_ref(), hipchat.get_ref());
    dispatcher.check_credentials()?;
    let outcome = dispatcher.deliver(&event.recipient, &event.message).await?;

    Ok(respond(outcome))
}

/// POST /bttn
/// Legacy endpoint (deprecated): posts a fixed message to the legacy room
pub async fn legacy_bttn_pressed(
    config: web::Data<Config>,
    hipchat: web::Data<HipChatClient>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    log::warn!("POST /bttn is deprecated, send form fields to POST / instead");

    let press: LegacyPress = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;
    let user = press.user.ok_or_else(|| {
        AppError::Validation("Request body must include a 'user' key.".to_string())
    })?;

    let dispatcher = create_dispatcher(Channel::HipChat, config.get_ref(), hipchat.get_ref());
    dispatcher.check_credentials()?;
    let outcome = dispatcher
        .deliver(&config.legacy_room, &LegacyPress::message(&user))
        .await?;

    Ok(respond(outcome))
}

/// Decodes a urlencoded form, a multipart form or a flat JSON object into
/// string fields. Repeated keys keep their first value; JSON nulls count as absent.
async fn decode_fields(
    req: &HttpRequest,
    body: web::Bytes,
) -> AppResult<HashMap<String, String>> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;

        return Ok(object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect());
    }

    if content_type.starts_with("multipart/form-data") {
        return decode_multipart(req, body).await;
    }

    let raw = std::str::from_utf8(&body)
        .map_err(|_| AppError::Validation("Request form must be valid UTF-8.".to_string()))?;
    let form = web::Query::<Vec<(String, String)>>::from_query(raw)
        .map_err(|e| AppError::Validation(format!("Invalid request form: {}", e)))?;

    Ok(first_values(form.into_inner()))
}

/// Collects the text parts of a multipart body; file uploads are skipped
async fn decode_multipart(
    req: &HttpRequest,
    body: web::Bytes,
) -> AppResult<HashMap<String, String>> {
    let stream = stream::once(async move { Ok::<_, PayloadError>(body) });
    let mut multipart = Multipart::new(req.headers(), stream);
    let mut pairs = Vec::new();

    while let Some(field) = multipart.next().await {
        let mut field =
            field.map_err(|e| AppError::Validation(format!("Invalid multipart form: {}", e)))?;

        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();
        let name = field.name().map(str::to_string);

        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::Validation(format!("Invalid multipart form: {}", e)))?;
            value.extend_from_slice(&chunk);
        }

        let name = match name {
            Some(name) if !is_file => name,
            _ => continue,
        };
        let value = String::from_utf8(value).map_err(|_| {
            AppError::Validation(format!("Multipart field '{}' must be valid UTF-8.", name))
        })?;

        pairs.push((name, value));
    }

    Ok(first_values(pairs))
}

fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (key, value) in pairs {
        fields.entry(key).or_insert(value);
    }
    fields
}

fn respond(outcome: DispatchOutcome) -> HttpResponse {
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::OK);

    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(outcome.body)
}

/// Configure bttn routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(bttn_pressed))
        .route("/bttn", web::post().to(legacy_bttn_pressed));
}
