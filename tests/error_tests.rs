// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use gemstudio::auth::ValidationResult;
use gemstudio::error::StudioError;

#[test]
fn test_error_display_messages() {
    let errors = vec![
        StudioError::Config("bad ttl".to_string()),
        StudioError::api(Some(503), "UNAVAILABLE"),
        StudioError::api(None, "connection reset"),
        StudioError::ImageDecode("truncated".to_string()),
        StudioError::InvalidRequest("Bad request".to_string()),
        StudioError::CredentialRejected(ValidationResult::Unauthorized),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_api_error_includes_status_when_known() {
    let with_status = StudioError::api(Some(429), "RESOURCE_EXHAUSTED: quota");
    assert_eq!(
        with_status.to_string(),
        "Gemini API error (HTTP 429): RESOURCE_EXHAUSTED: quota"
    );

    let without_status = StudioError::api(None, "timed out");
    assert_eq!(without_status.to_string(), "Gemini API error: timed out");
}

#[test]
fn test_status_code_through_wrappers() {
    let exhausted = StudioError::RetryExhausted {
        operation: "Generate content".to_string(),
        attempts: 3,
        last_error: Box::new(StudioError::api(Some(502), "Bad Gateway")),
    };
    assert_eq!(exhausted.status_code(), Some(502));
    assert!(exhausted.to_string().contains("after 3 attempts"));
    assert!(exhausted.to_string().contains("Bad Gateway"));

    let failed = StudioError::ValidationFailed(Box::new(StudioError::api(Some(401), "UNAUTHENTICATED")));
    assert_eq!(failed.status_code(), Some(401));
    assert!(matches!(failed.root(), StudioError::Api { .. }));

    assert_eq!(StudioError::InvalidRequest("x".to_string()).status_code(), None);
}

#[test]
fn test_credential_rejected_message() {
    let error = StudioError::CredentialRejected(ValidationResult::Forbidden);
    assert!(format!("{}", error).contains("403"));

    let error = StudioError::CredentialRejected(ValidationResult::OtherFailure("quota project missing".to_string()));
    assert!(format!("{}", error).contains("quota project missing"));
}
