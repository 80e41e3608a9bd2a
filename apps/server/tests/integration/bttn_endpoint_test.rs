//! Integration tests for the bttn press endpoints
//!
//! Builds the app in-process and points the HipChat client at a fake provider.

use actix_web::{test, web, App};
use bttn_relay::config::{Config, TwilioConfig};
use bttn_relay::routes;
use bttn_relay::services::HipChatClient;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

use crate::common::{
    hipchat_config, hipchat_config_with_timeout, test_config, twilio_config,
    unreachable_api_root, FakeHipChat,
};

const ROOM_NOT_FOUND: &str = r#"{"error":{"message":"Room not found"}}"#;

fn config(api_root: Url, token: Option<&str>, twilio: TwilioConfig) -> Config {
    test_config(hipchat_config(api_root, token), twilio)
}

/// Runs one request against a freshly built app and returns status and body
async fn send(config: Config, req: test::TestRequest) -> (u16, String) {
    let client = HipChatClient::new(&config.hipchat).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(client))
            .configure(routes::bttn::configure),
    )
    .await;

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn form(body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(body.to_string())
}

fn multipart(parts: &[(&str, &str)]) -> test::TestRequest {
    let mut body = String::new();
    for (name, value) in parts {
        body.push_str(&format!(
            "--XX\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            name, value
        ));
    }
    body.push_str("--XX--\r\n");

    test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "multipart/form-data; boundary=XX"))
        .set_payload(body)
}

fn offline_config() -> Config {
    config(unreachable_api_root(), None, TwilioConfig::default())
}

// =============================================================================
// Field Validation Tests
// =============================================================================

#[actix_web::test]
async fn test_missing_keys_reported_in_declared_order() {
    let cases = [
        ("", "channel"),
        ("recipient=Lounge&message=hi", "channel"),
        ("channel=hipchat", "recipient"),
        ("channel=hipchat&message=hi", "recipient"),
        ("channel=sms&recipient=%2B15551234567", "message"),
    ];

    for (body, key) in cases {
        let (status, text) = send(offline_config(), form(body)).await;

        assert_eq!(status, 400, "body: {}", body);
        assert_eq!(text, format!("Request form must include a '{}' key.", key));
    }
}

#[actix_web::test]
async fn test_unknown_channel() {
    let (status, text) = send(
        offline_config(),
        form("channel=bogus&recipient=Lounge&message=hi"),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Unknown channel: 'bogus'");
}

#[actix_web::test]
async fn test_json_body_is_accepted() {
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"channel": "bogus", "recipient": "Lounge", "message": "hi"}));

    let (status, text) = send(offline_config(), req).await;

    assert_eq!(status, 400);
    assert_eq!(text, "Unknown channel: 'bogus'");
}

#[actix_web::test]
async fn test_json_null_counts_as_missing() {
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"channel": null, "recipient": "Lounge", "message": "hi"}));

    let (status, text) = send(offline_config(), req).await;

    assert_eq!(status, 400);
    assert_eq!(text, "Request form must include a 'channel' key.");
}

#[actix_web::test]
async fn test_repeated_form_key_keeps_first_value() {
    let (status, text) = send(
        offline_config(),
        form("channel=bogus&channel=sms&recipient=Lounge&message=hi"),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Unknown channel: 'bogus'");
}

#[actix_web::test]
async fn test_multipart_body_is_accepted() {
    let (status, text) = send(
        offline_config(),
        multipart(&[("channel", "bogus"), ("recipient", "Lounge"), ("message", "hi")]),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Unknown channel: 'bogus'");
}

#[actix_web::test]
async fn test_multipart_missing_key() {
    let (status, text) = send(
        offline_config(),
        multipart(&[("channel", "hipchat"), ("message", "hi")]),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Request form must include a 'recipient' key.");
}

#[actix_web::test]
async fn test_multipart_press_reaches_hipchat() {
    let fake = FakeHipChat::start(200, "");
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let (status, text) = send(
        config,
        multipart(&[
            ("channel", "hipchat"),
            ("recipient", "Lounge"),
            ("message", "Someone is at the door"),
        ]),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(text, "Message sent successfully");
    assert_eq!(fake.requests()[0].body["message"], "Someone is at the door");
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");

    let (status, _) = send(offline_config(), req).await;
    assert_eq!(status, 400);
}

// =============================================================================
// HipChat Channel Tests
// =============================================================================

#[actix_web::test]
async fn test_hipchat_missing_token() {
    let (status, text) = send(
        offline_config(),
        form("channel=hipchat&recipient=Lounge&message=hi"),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Missing HIPCHAT_API_TOKEN environment variable.");
}

#[actix_web::test]
async fn test_hipchat_success() {
    let fake = FakeHipChat::start(200, "");
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let (status, text) = send(
        config,
        form("channel=hipchat&recipient=Lounge&message=Someone+is+at+the+door"),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(text, "Message sent successfully");

    let sent = &fake.requests()[0];
    assert_eq!(sent.path, "/v2/room/Lounge/notification");
    assert_eq!(sent.body["message"], "Someone is at the door");
    assert_eq!(sent.body["message_format"], "text");
    assert_eq!(sent.body["color"], "yellow");
}

#[actix_web::test]
async fn test_hipchat_success_uses_provider_status() {
    let fake = FakeHipChat::start(202, "");
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let (status, text) = send(config, form("channel=hipchat&recipient=1&message=hi")).await;

    assert_eq!(status, 202);
    assert_eq!(text, "Message sent successfully");
}

#[actix_web::test]
async fn test_hipchat_failure_passes_provider_response_through() {
    let fake = FakeHipChat::start(404, ROOM_NOT_FOUND);
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let (status, text) = send(
        config,
        form("channel=hipchat&recipient=Nowhere&message=hi"),
    )
    .await;

    assert_eq!(status, 404);
    assert_eq!(text, ROOM_NOT_FOUND);
}

#[actix_web::test]
async fn test_hipchat_empty_message_rejected_without_request() {
    let fake = FakeHipChat::start(204, "");
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let (status, text) = send(config, form("channel=hipchat&recipient=Lounge&message=")).await;

    assert_eq!(status, 400);
    assert_eq!(text, "Message too short, must be 1-10,000 chars.");
    assert!(fake.requests().is_empty());
}

#[actix_web::test]
async fn test_hipchat_unreachable_is_bad_gateway() {
    let config = config(unreachable_api_root(), Some("t"), TwilioConfig::default());

    let (status, _) = send(config, form("channel=hipchat&recipient=Lounge&message=hi")).await;

    assert_eq!(status, 502);
}

#[actix_web::test]
async fn test_hipchat_timeout_is_gateway_timeout() {
    let fake = FakeHipChat::start_delayed(200, "", Duration::from_millis(500));
    let config = test_config(
        hipchat_config_with_timeout(fake.api_root(), Some("t"), Duration::from_millis(50)),
        TwilioConfig::default(),
    );

    let (status, text) = send(config, form("channel=hipchat&recipient=Lounge&message=hi")).await;

    assert_eq!(status, 504);
    assert_eq!(text, "Request to HipChat timed out");
}

// =============================================================================
// SMS Channel Tests
// =============================================================================

#[actix_web::test]
async fn test_sms_missing_account_sid() {
    let config = config(
        unreachable_api_root(),
        None,
        twilio_config(None, Some("token")),
    );

    let (status, text) = send(
        config,
        form("channel=sms&recipient=%2B15551234567&message=hi"),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Missing TWILIO_ACCOUNT_SID environment variable.");
}

#[actix_web::test]
async fn test_sms_missing_auth_token() {
    let config = config(
        unreachable_api_root(),
        None,
        twilio_config(Some("AC123"), None),
    );

    let (status, text) = send(
        config,
        form("channel=sms&recipient=%2B15551234567&message=hi"),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(text, "Missing TWILIO_AUTH_TOKEN environment variable.");
}

#[actix_web::test]
async fn test_sms_stub() {
    let config = config(
        unreachable_api_root(),
        None,
        twilio_config(Some("AC123"), Some("token")),
    );

    let (status, text) = send(
        config,
        form("channel=sms&recipient=%2B15551234567&message=hi"),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(text, "Not yet implemented");
}

// =============================================================================
// Legacy Endpoint Tests
// =============================================================================

#[actix_web::test]
async fn test_legacy_endpoint_posts_to_legacy_room() {
    let fake = FakeHipChat::start(204, "");
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let req = test::TestRequest::post()
        .uri("/bttn")
        .set_json(json!({"user": "hugo"}));
    let (status, _) = send(config, req).await;

    assert_eq!(status, 204);

    let sent = &fake.requests()[0];
    assert_eq!(sent.path, "/v2/room/bttn/notification");
    assert_eq!(sent.body["message"], "hugo pressed the bttn");
}

#[actix_web::test]
async fn test_legacy_endpoint_requires_user() {
    let fake = FakeHipChat::start(204, "");
    let config = config(fake.api_root(), Some("t"), TwilioConfig::default());

    let req = test::TestRequest::post().uri("/bttn").set_json(json!({}));
    let (status, text) = send(config, req).await;

    assert_eq!(status, 400);
    assert_eq!(text, "Request body must include a 'user' key.");
    assert!(fake.requests().is_empty());
}

#[actix_web::test]
async fn test_get_root_is_not_routed() {
    let (status, _) = send(offline_config(), test::TestRequest::get().uri("/")).await;
    assert!(status == 404 || status == 405);
}

