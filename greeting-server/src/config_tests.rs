use super::*;
use serde_json::json;
use std::io::Write;

fn parse(args: &[&str]) -> Args {
    let mut argv = vec!["greeting-server"];
    argv.extend_from_slice(args);
    Args::try_parse_from(argv).unwrap()
}

#[test]
fn test_flag_defaults() {
    let args = parse(&["--expected-audience", "https://greet.example.com"]);
    assert_eq!(args.port, 3002);
    assert_eq!(args.server_name, "Greeting MCP");
    assert_eq!(args.server_version, "1.0.0");
    assert_eq!(args.validation_timeout_secs, 10);

    let config = ServerConfig::from_args(args).unwrap();
    assert_eq!(config.audience, "https://greet.example.com");
    assert_eq!(config.validation_timeout, Duration::from_secs(10));
    assert_eq!(config.bind.port(), 3002);
    assert_eq!(config.metadata, json!({}));
}

#[test]
fn test_profile_and_log_format_values() {
    let args = parse(&["--hosting-profile", "edge", "--log-format", "json", "--enable-todo-tools"]);
    assert_eq!(args.hosting_profile, HostingProfile::Edge);
    assert_eq!(args.log_format, LogFormat::Json);
    assert!(args.enable_todo_tools);

    assert!(Args::try_parse_from(["greeting-server", "--hosting-profile", "lambda"]).is_err());
}

#[test]
fn test_zero_timeout_rejected() {
    let args = parse(&["--validation-timeout-secs", "0"]);
    assert!(matches!(ServerConfig::from_args(args), Err(ConfigError::ZeroTimeout)));
}

#[test]
fn test_audience_is_trimmed() {
    let config = ServerConfig::from_args(parse(&["--expected-audience", "  aud  "])).unwrap();
    assert_eq!(config.audience, "aud");
}

#[test]
fn test_inline_metadata_wins_over_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"resource":"from-file"}}"#).unwrap();

    let value = load_metadata(r#"{"resource":"inline"}"#, Some(file.path())).unwrap();
    assert_eq!(value, json!({"resource": "inline"}));
}

#[test]
fn test_metadata_read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"resource":"https://greet.example.com","authorization_servers":["https://idp.example.com"]}}"#
    )
    .unwrap();

    let value = load_metadata("", Some(file.path())).unwrap();
    assert_eq!(value["resource"], "https://greet.example.com");
}

#[test]
fn test_missing_metadata_file_yields_empty_object() {
    let dir = tempfile::tempdir().unwrap();
    let value = load_metadata("", Some(&dir.path().join("absent.json"))).unwrap();
    assert_eq!(value, json!({}));
    assert_eq!(load_metadata("   ", None).unwrap(), json!({}));
}

#[test]
fn test_invalid_metadata_rejected() {
    assert!(matches!(
        load_metadata("{nope", None),
        Err(ConfigError::InvalidMetadata(_))
    ));
    assert!(matches!(
        load_metadata("[1,2]", None),
        Err(ConfigError::MetadataNotObject)
    ));
}

#[test]
fn test_identity_provider_settings_populated() {
    let config = ServerConfig::from_args(parse(&[
        "--sk-env-url",
        "https://idp.example.com",
        "--sk-client-id",
        "id",
        "--sk-client-secret",
        "secret",
    ]))
    .unwrap();
    assert!(config.identity_provider.is_complete());
    assert_eq!(config.identity_provider.client_id, "id");
}
