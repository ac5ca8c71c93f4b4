use super::*;

#[test]
fn ws_url_maps_http_schemes() {
    assert_eq!(ws_url("http://127.0.0.1:3000").unwrap(), "ws://127.0.0.1:3000/api/ws");
    assert_eq!(ws_url("https://sketch.example/").unwrap(), "wss://sketch.example/api/ws");
}

#[test]
fn ws_url_rejects_other_schemes() {
    let err = ws_url("ftp://example").unwrap_err();
    assert!(matches!(err, SessionError::InvalidUrl(url) if url == "ftp://example"));
}

#[test]
fn config_defaults_to_five_second_join_timeout() {
    let config = SessionConfig::from_base_url("http://localhost:3000").unwrap();
    assert_eq!(config.join_timeout, Duration::from_secs(5));
    let config = config.with_join_timeout(Duration::from_millis(250));
    assert_eq!(config.join_timeout, Duration::from_millis(250));
}

#[tokio::test]
async fn blank_name_never_connects() {
    // Nothing listens here; a connection attempt would surface as Transport.
    let config = SessionConfig { url: "ws://127.0.0.1:9/api/ws".into(), join_timeout: DEFAULT_JOIN_TIMEOUT };
    let mut host = SessionHost::new(config);

    let err = host.mount("  ", "demo").await.err().expect("blank name rejected");
    assert!(matches!(err, SessionError::Form(JoinFormError::EmptyName)));
    let err = host.mount("Alice", "").await.err().expect("blank room rejected");
    assert!(matches!(err, SessionError::Form(JoinFormError::EmptyRoom)));
    assert!(host.current().is_none());
}

#[tokio::test]
async fn unreachable_relay_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = SessionConfig { url: format!("ws://{addr}/api/ws"), join_timeout: DEFAULT_JOIN_TIMEOUT };
    let mut host = SessionHost::new(config);

    let err = host.mount("Alice", "demo").await.err().expect("connect should fail");
    assert!(matches!(err, SessionError::Transport(_)));
    assert!(err.to_string().starts_with("connection problem"));
    assert!(host.current().is_none());
}
