//! Shared plumbing for the task-array inference API.
//!
//! Image and video generation share one endpoint: a POST of a JSON array
//! of task objects, the first of which authenticates the request. The
//! response carries either a `data` array of results or an `errors` array.

use serde_json::Value;

/// Builds the authentication task that leads every request.
pub(crate) fn authentication_task(api_key: &str) -> Value {
    serde_json::json!({
        "taskType": "authentication",
        "apiKey": api_key,
    })
}

/// Extracts the first error message from a response envelope, if any.
pub(crate) fn error_message(value: &Value) -> Option<String> {
    let errors = value.get("errors")?.as_array()?;
    let first = errors.first()?;
    match first["message"].as_str() {
        Some(message) if !message.is_empty() => Some(message.to_owned()),
        _ => Some("generation request rejected".to_owned()),
    }
}

/// Extracts the named URL field from the first result in `data`.
pub(crate) fn first_result_url<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value["data"][0][field].as_str().filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_task_carries_key() {
        let task = authentication_task("sk-test");
        assert_eq!(task["taskType"], "authentication");
        assert_eq!(task["apiKey"], "sk-test");
    }

    #[test]
    fn error_message_extracted_from_envelope() {
        let value: Value = serde_json::from_str(
            r#"{"errors":[{"code":"invalidApiKey","message":"Invalid API key"}]}"#,
        )
        .unwrap();
        assert_eq!(error_message(&value).as_deref(), Some("Invalid API key"));
    }

    #[test]
    fn empty_error_message_gets_fallback() {
        let value: Value = serde_json::from_str(r#"{"errors":[{"code":"x"}]}"#).unwrap();
        assert_eq!(
            error_message(&value).as_deref(),
            Some("generation request rejected")
        );
    }

    #[test]
    fn no_errors_field_means_no_error() {
        let value: Value = serde_json::from_str(r#"{"data":[{"imageURL":"u"}]}"#).unwrap();
        assert!(error_message(&value).is_none());
    }

    #[test]
    fn first_result_url_reads_named_field() {
        let value: Value =
            serde_json::from_str(r#"{"data":[{"imageURL":"https://cdn.example/a.png"}]}"#).unwrap();
        assert_eq!(
            first_result_url(&value, "imageURL"),
            Some("https://cdn.example/a.png")
        );
        assert!(first_result_url(&value, "videoURL").is_none());
    }

    #[test]
    fn empty_url_treated_as_missing() {
        let value: Value = serde_json::from_str(r#"{"data":[{"imageURL":""}]}"#).unwrap();
        assert!(first_result_url(&value, "imageURL").is_none());
    }
}
