//! Pulling a JSON object out of free-form model text.
//!
//! Models wrap their answer in Markdown fences or add a sentence around it.
//! We strip one fence pair, then take the outermost `{ ... }` span. Anything
//! that still fails to decode is an `InvalidResponse`, which callers must not
//! retry.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::LlmError;

/// Remove a surrounding Markdown code fence (with optional language tag).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim().trim_start_matches('\u{feff}').trim();

    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];

    // Opening fence line may carry a language tag such as `json`.
    let body = match after.split_once('\n') {
        Some((tag, rest)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => rest,
        _ => after.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Isolate and parse the JSON object contained in model output.
pub fn extract_json_payload(text: &str) -> Result<Value, LlmError> {
    let body = strip_code_fences(text);

    let (Some(open), Some(close)) = (body.find('{'), body.rfind('}')) else {
        return Err(LlmError::invalid_response(
            "model output contains no JSON object",
        ));
    };
    if close < open {
        return Err(LlmError::invalid_response(
            "model output contains no JSON object",
        ));
    }

    serde_json::from_str(&body[open..=close])
        .map_err(|e| LlmError::invalid_response(format!("model output is not valid JSON: {}", e)))
}

/// Extract the JSON object and decode it into `T`.
pub fn decode_payload<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let value = extract_json_payload(text)?;
    serde_json::from_value(value).map_err(|e| {
        LlmError::invalid_response(format!("model output has unexpected shape: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use serde_json::json;

    #[test]
    fn test_fenced_json_block() {
        let text = "```json\n{\"menu_items\":[]}\n```";
        assert_eq!(strip_code_fences(text), "{\"menu_items\":[]}");
        assert_eq!(extract_json_payload(text).unwrap(), json!({"menu_items": []}));
    }

    #[test]
    fn test_bare_fence_without_language() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_prose_around_object() {
        let text = "Here is the menu you asked for:\n{\"a\": {\"b\": 2}}\nEnjoy!";
        assert_eq!(extract_json_payload(text).unwrap(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_unclosed_fence() {
        let text = "```json\n{\"a\": true}";
        assert_eq!(extract_json_payload(text).unwrap(), json!({"a": true}));
    }

    #[test]
    fn test_plain_object_untouched() {
        assert_eq!(strip_code_fences("  {\"x\": 1}  "), "{\"x\": 1}");
    }

    #[test]
    fn test_no_object_is_invalid_response() {
        let err = extract_json_payload("Sorry, I cannot read this image.").unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::InvalidResponse);
    }

    #[test]
    fn test_broken_json_is_invalid_response() {
        let err = extract_json_payload("```json\n{\"menu_items\": [\n```").unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::InvalidResponse);
    }

    #[test]
    fn test_decode_wrong_shape() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Payload {
            items: Vec<String>,
        }
        let err = decode_payload::<Payload>("{\"items\": 3}").unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::InvalidResponse);
    }
}
