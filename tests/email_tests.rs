use notification_worker::{
    clients::email::{EmailChannel, EmailSettings},
    error::DeliveryError,
};
use tokio_test::{assert_err, assert_ok};

use crate::support::{RecordingTransport, smtp_settings};

/// Test: A configured channel submits one plain-text mail to host:port
#[tokio::test]
async fn test_send_submits_to_configured_server() {
    let transport = RecordingTransport::default();
    let channel = EmailChannel::with_transport(smtp_settings(), transport.clone());

    assert_ok!(channel.send("a@example.com", "Hi", "Test").await);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);

    let (target, mail) = &calls[0];
    assert_eq!(target.host, "smtp.example.com");
    assert_eq!(target.port, 587);
    assert_eq!(target.username, "noreply@example.com");
    assert_eq!(target.password, "secret");
    assert_eq!(mail.from, "noreply@example.com");
    assert_eq!(mail.to, "a@example.com");
    assert_eq!(mail.subject, "Hi");
    assert_eq!(mail.body, "Test");
}

/// Test: SMTP_USER is used as the login when present
#[tokio::test]
async fn test_explicit_user_is_login_identity() {
    let transport = RecordingTransport::default();
    let settings = EmailSettings {
        user: "mailer".to_string(),
        ..smtp_settings()
    };
    let channel = EmailChannel::with_transport(settings, transport.clone());

    assert_ok!(channel.send("a@example.com", "Hi", "Test").await);

    assert_eq!(transport.calls()[0].0.username, "mailer");
}

/// Test: Any missing required setting fails fast without a transport call
#[tokio::test]
async fn test_missing_setting_is_config_error() {
    let blank_from = EmailSettings {
        from: String::new(),
        ..smtp_settings()
    };
    let blank_password = EmailSettings {
        password: String::new(),
        ..smtp_settings()
    };
    let blank_host = EmailSettings {
        host: String::new(),
        ..smtp_settings()
    };
    let blank_port = EmailSettings {
        port: "  ".to_string(),
        ..smtp_settings()
    };

    for (missing, settings) in [
        ("SMTP_FROM", blank_from),
        ("SMTP_PASSWORD", blank_password),
        ("SMTP_HOST", blank_host),
        ("SMTP_PORT", blank_port),
    ] {
        let transport = RecordingTransport::default();
        let channel = EmailChannel::with_transport(settings, transport.clone());

        let error = assert_err!(channel.send("a@example.com", "Hi", "Test").await);

        match error {
            DeliveryError::Config(detail) => assert!(
                detail.contains(missing),
                "expected {} in {:?}",
                missing,
                detail
            ),
            other => panic!("expected config error, got {:?}", other),
        }
        assert!(transport.calls().is_empty(), "{} must not reach the transport", missing);
    }
}

/// Test: Every missing setting is reported together
#[tokio::test]
async fn test_all_missing_settings_are_listed() {
    let transport = RecordingTransport::default();
    let channel = EmailChannel::with_transport(EmailSettings::default(), transport.clone());

    let error = assert_err!(channel.send("a@example.com", "Hi", "Test").await);

    assert_eq!(
        error.to_string(),
        "channel configuration incomplete: missing SMTP_FROM, SMTP_PASSWORD, SMTP_HOST, SMTP_PORT"
    );
    assert!(transport.calls().is_empty());
}

/// Test: A port that is not a number is a configuration problem
#[tokio::test]
async fn test_non_numeric_port_is_config_error() {
    let transport = RecordingTransport::default();
    let settings = EmailSettings {
        port: "smtp".to_string(),
        ..smtp_settings()
    };
    let channel = EmailChannel::with_transport(settings, transport.clone());

    let error = assert_err!(channel.send("a@example.com", "Hi", "Test").await);

    assert!(matches!(error, DeliveryError::Config(_)));
    assert!(transport.calls().is_empty());
}

/// Test: Transport failures surface as transport errors
#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport = RecordingTransport::failing("connection refused");
    let channel = EmailChannel::with_transport(smtp_settings(), transport.clone());

    let error = assert_err!(channel.send("a@example.com", "Hi", "Test").await);

    match error {
        DeliveryError::Transport(detail) => assert_eq!(detail, "connection refused"),
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(transport.calls().len(), 1);
}
