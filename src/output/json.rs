//! JSON extraction from interpreter output.

use serde_json::{Deserializer, Value};

/// Parse the first JSON document in `output`.
///
/// Parsing starts at the first `{` or `[`, which skips warnings and
/// banners printed before the payload; text after the document is
/// ignored. An object yields one element, an array yields its elements.
/// Empty input or malformed JSON yields an empty vector.
pub fn extract_json(output: &str) -> Vec<Value> {
    let Some(start) = output.find(['{', '[']) else {
        return Vec::new();
    };

    let mut stream = Deserializer::from_str(&output[start..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Array(items))) => items,
        Some(Ok(value @ Value::Object(_))) => vec![value],
        Some(Ok(_)) | Some(Err(_)) | None => Vec::new(),
    }
}
