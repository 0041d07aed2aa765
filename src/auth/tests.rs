//! Tests for the auth module

use super::*;

#[test]
fn test_bearer_header() {
    let token = ApiToken::new("secret123");
    let header = token.bearer_header().unwrap();

    assert_eq!(header, "Bearer secret123");
    assert!(header.is_sensitive());
}

#[test]
fn test_debug_redacts_token() {
    let token = ApiToken::from("secret123");
    let debug = format!("{token:?}");

    assert!(!debug.contains("secret123"));
    assert_eq!(debug, "ApiToken(***)");
}

#[test]
fn test_invalid_header_characters() {
    let token = ApiToken::new("line\nbreak");
    let err = token.bearer_header().unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidConfigValue { ref field, .. } if field == "token"
    ));
}

#[test]
fn test_empty_token() {
    assert!(ApiToken::default().is_empty());
    assert!(ApiToken::new("   ").is_empty());
    assert!(!ApiToken::new("t").is_empty());
}

#[test]
fn test_serde_transparent() {
    let token: ApiToken = serde_yaml::from_str("\"abc\"").unwrap();
    assert_eq!(token.expose(), "abc");
    assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
}
