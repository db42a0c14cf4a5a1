use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fallback when an error payload carries no recognizable detail.
const FALLBACK_MESSAGE: &str = "An error occurred";

/// Keys that survive `strip_error_fields` regardless of their value shape.
const PROTECTED_KEYS: &[&str] = &["message"];

/// Errors from a single normalization attempt. Never propagated to the
/// client; the original response is returned instead.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Response-normalizing middleware.
///
/// Every structured (JSON) response gets a `status` key defaulted to its
/// HTTP status code. Error responses (status >= 400) additionally get a
/// single human-readable `message` extracted from the payload, and the
/// nested per-field validation detail is stripped so clients always see a
/// flat `{status, message, ...}` envelope.
///
/// Normalization is best-effort: if the body cannot be parsed or the
/// payload has an unexpected shape, the original response passes through
/// unchanged.
pub async fn normalize_response(request: Request, next: Next) -> Response {
    // Documentation endpoints serve non-envelope payloads verbatim
    let docs_path = request.uri().path().contains("docs");

    let response = next.run(request).await;

    if docs_path || !is_structured(&response) {
        return response;
    }

    let status = response.status();
    let (mut parts, body) = response.into_parts();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // Body stream failed mid-read; the original cannot be rebuilt
            tracing::debug!("failed to buffer response body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    if bytes.is_empty() {
        return Response::from_parts(parts, Body::from(bytes));
    }

    match rewrite_body(status, &bytes) {
        Ok(rewritten) => {
            parts.headers.insert(
                header::CONTENT_LENGTH,
                header::HeaderValue::from(rewritten.len()),
            );
            Response::from_parts(parts, Body::from(rewritten))
        }
        Err(e) => {
            tracing::debug!("response normalization skipped: {}", e);
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

/// Is this a structured response whose payload the normalizer may touch?
/// File, stream, and plain-text responses fail this check and pass through.
fn is_structured(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

/// Parse, transform, and re-serialize one response body.
fn rewrite_body(status: StatusCode, bytes: &[u8]) -> Result<Vec<u8>, NormalizeError> {
    let parsed: Value = serde_json::from_slice(bytes)?;
    let payload = render_payload(status, parsed)?;
    Ok(serde_json::to_vec(&payload)?)
}

/// Apply the envelope rules to a decoded payload.
///
/// A `null` payload counts as absent and becomes an empty mapping; any
/// other non-mapping payload is a transform failure.
pub(crate) fn render_payload(status: StatusCode, payload: Value) -> Result<Value, NormalizeError> {
    let mut payload = match payload {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => return Err(NormalizeError::NotAnObject),
    };

    // An existing status value is preserved, not overwritten
    payload
        .entry("status")
        .or_insert_with(|| Value::from(status.as_u16()));

    if status.as_u16() >= 400 {
        let message = extract_error_message(&payload);
        payload.insert("message".to_string(), Value::String(message));
        strip_error_fields(&mut payload);
    }

    Ok(Value::Object(payload))
}

/// Extract a single error message from a payload.
///
/// Precedence: `message` > `detail` > first of `non_field_errors` > the
/// first key (insertion order) holding an error-shaped value. Sequence
/// values yield their first element bare; mapping values recurse and
/// compose as `"<key>: <nested message>"`. Falls back to a generic
/// message when nothing matches.
pub(crate) fn extract_error_message(payload: &Map<String, Value>) -> String {
    if let Some(message) = payload.get("message").filter(|v| is_truthy(v)) {
        return value_to_message(message);
    }

    if let Some(detail) = payload.get("detail").filter(|v| is_truthy(v)) {
        return value_to_message(detail);
    }

    if let Some(Value::Array(errors)) = payload.get("non_field_errors") {
        if let Some(first) = errors.first() {
            return value_to_message(first);
        }
    }

    for (key, value) in payload {
        match value {
            Value::Array(items) => {
                if let Some(first) = items.first() {
                    return value_to_message(first);
                }
            }
            Value::Object(nested) => {
                return format!("{}: {}", key, extract_error_message(nested));
            }
            _ => {}
        }
    }

    FALLBACK_MESSAGE.to_string()
}

/// Remove keys whose values duplicate the extracted error message.
///
/// Non-empty sequence values are deleted at their level; non-empty mapping
/// values are cleaned recursively but never deleted themselves. Empty
/// sequences and mappings are left alone. The key list is snapshotted
/// before deletion since removal happens after the scan.
pub(crate) fn strip_error_fields(payload: &mut Map<String, Value>) {
    let mut keys_to_remove = Vec::new();

    for (key, value) in payload.iter_mut() {
        if PROTECTED_KEYS.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::Array(items) if !items.is_empty() => {
                keys_to_remove.push(key.clone());
            }
            Value::Object(nested) if !nested.is_empty() => {
                strip_error_fields(nested);
            }
            _ => {}
        }
    }

    for key in keys_to_remove {
        // shift_remove keeps the surviving keys in insertion order
        payload.shift_remove(&key);
    }
}

/// Truthiness for payload values: null, false, zero, and empty
/// strings/sequences/mappings are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// String form of a payload value. Strings are taken verbatim; anything
/// else is rendered as JSON.
fn value_to_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
