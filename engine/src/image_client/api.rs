use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DrawError;

/// OpenAI-style image generation request body.
#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u8,
    pub size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageItem {
    #[serde(default)]
    b64_image: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Inline(String),
    Remote(String),
}

impl ImageSource {
    /// `None` for items that carry neither a base64 payload nor a URL.
    pub fn from_item(item: Value) -> Option<Self> {
        let ImageItem {
            b64_image,
            b64_json,
            url,
        } = serde_json::from_value(item).ok()?;

        b64_image
            .or(b64_json)
            .map(ImageSource::Inline)
            .or(url.map(ImageSource::Remote))
    }
}

/// Returns the non-empty image list found under `data`, or failing that, `images`.
pub fn image_items(body: &str) -> Result<Vec<Value>, DrawError> {
    let list = match serde_json::from_str::<Value>(body)? {
        Value::Object(mut map) => map
            .remove("data")
            .filter(|v| !v.is_null())
            .or_else(|| map.remove("images")),
        _ => None,
    };

    match list {
        Some(Value::Array(items)) if !items.is_empty() => Ok(items),
        _ => Err(DrawError::UnexpectedFormat),
    }
}
