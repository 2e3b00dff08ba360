use crate::services::error::{ServiceError, ServiceResult};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_JPEG: &str = "image/jpeg";

/// A single file from an upload request, validated and (for JSON) parsed.
///
/// Uploads only live for the duration of one ingestion call.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub json: Option<serde_json::Value>,
}

impl Upload {
    /// Validate a raw file part.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::UnsupportedContentType`] unless the type is JSON, PNG or JPEG
    /// - [`ServiceError::Validation`] for an empty filename or a JSON body that does not parse
    pub fn new(filename: &str, content_type: &str, data: Vec<u8>) -> ServiceResult<Self> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(ServiceError::Validation(
                "every uploaded file needs a filename".to_string(),
            ));
        }

        let content_type = normalize_content_type(content_type);
        let json = match content_type.as_str() {
            CONTENT_TYPE_JSON => Some(serde_json::from_slice(&data).map_err(|e| {
                ServiceError::Validation(format!("{filename} is not valid JSON: {e}"))
            })?),
            CONTENT_TYPE_PNG | CONTENT_TYPE_JPEG => None,
            _ => return Err(ServiceError::UnsupportedContentType(content_type)),
        };

        Ok(Self {
            filename: filename.to_string(),
            content_type,
            data,
            json,
        })
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/") || self.json.is_none()
    }

    /// The definition text of a JSON upload.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] if the bytes are not UTF-8.
    pub fn definition(&self) -> ServiceResult<String> {
        String::from_utf8(self.data.clone()).map_err(|_| {
            ServiceError::Validation(format!("{} is not UTF-8 text", self.filename))
        })
    }
}

/// Lowercase the media type and drop parameters such as `; charset=utf-8`.
#[must_use]
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_upload_is_parsed() {
        let upload =
            Upload::new("sheet.json", "application/json", br#"{"image":"tile.png"}"#.to_vec()).ok();
        assert!(upload.as_ref().is_some_and(|u| !u.is_image()));
        let json = upload.and_then(|u| u.json);
        assert_eq!(json.as_ref().and_then(|j| j["image"].as_str()), Some("tile.png"));
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        let upload = Upload::new("map.json", "Application/JSON; charset=utf-8", b"{}".to_vec());
        assert!(upload.is_ok_and(|u| u.content_type == CONTENT_TYPE_JSON));
    }

    #[test]
    fn images_have_no_json() {
        let upload = Upload::new("tile.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        assert!(upload.is_ok_and(|u| u.is_image() && u.json.is_none()));
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = Upload::new("notes.txt", "text/plain", b"hi".to_vec());
        assert!(matches!(err, Err(ServiceError::UnsupportedContentType(ct)) if ct == "text/plain"));
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let err = Upload::new("map.json", "application/json", b"{not json".to_vec());
        assert!(matches!(err, Err(ServiceError::Validation(msg)) if msg.contains("map.json")));
    }

    #[test]
    fn blank_filename_is_rejected() {
        let err = Upload::new("  ", "image/png", vec![1]);
        assert!(matches!(err, Err(ServiceError::Validation(_))));
    }
}
