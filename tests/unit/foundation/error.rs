use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PhotostampError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        PhotostampError::submission("x")
            .to_string()
            .contains("submission failure:")
    );
    assert!(
        PhotostampError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PhotostampError::stale(3, 5)
            .to_string()
            .contains("stale render discarded: token 3 superseded by 5")
    );
}

#[test]
fn only_submission_failures_are_retryable() {
    assert!(PhotostampError::submission("upload").is_retryable());
    assert!(!PhotostampError::decode("jpeg").is_retryable());
    assert!(!PhotostampError::stale(1, 2).is_retryable());
    assert!(PhotostampError::decode("jpeg").is_decode());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PhotostampError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
