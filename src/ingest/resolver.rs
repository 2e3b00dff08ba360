//! Batch classification and reference extraction.
//!
//! Pure: no I/O, no database. The pipeline persists what this module produces.

use std::collections::HashSet;

use serde_json::Value;

use super::upload::Upload;
use crate::services::error::{ServiceError, ServiceResult};

/// A spritesheet upload and the filename of the image it slices.
#[derive(Debug, Clone)]
pub struct SpritesheetUpload {
    pub upload: Upload,
    pub image_source: String,
}

/// A tilemap upload and the distinct spritesheet filenames it draws from, in discovery order.
#[derive(Debug, Clone)]
pub struct TilemapUpload {
    pub upload: Upload,
    pub sources: Vec<String>,
}

/// A batch split by asset kind, ready for ordered persistence.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBatch {
    pub images: Vec<Upload>,
    pub spritesheets: Vec<SpritesheetUpload>,
    pub tilemaps: Vec<TilemapUpload>,
    /// JSON files that are neither spritesheets nor tilemaps. Never persisted.
    pub unclassified: Vec<String>,
}

impl ResolvedBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
            && self.spritesheets.is_empty()
            && self.tilemaps.is_empty()
            && self.unclassified.is_empty()
    }
}

enum Kind {
    Image,
    Spritesheet(String),
    Tilemap(Vec<String>),
    Unclassified,
}

fn classify(upload: &Upload) -> Kind {
    if upload.is_image() {
        return Kind::Image;
    }
    let Some(json) = upload.json.as_ref() else {
        return Kind::Image;
    };
    if let Some(image) = json.get("image").and_then(Value::as_str) {
        return Kind::Spritesheet(image.to_string());
    }
    if let Some(tilesets) = json.get("tilesets").and_then(Value::as_array) {
        return Kind::Tilemap(tileset_sources(tilesets));
    }
    Kind::Unclassified
}

/// Collect `source` strings from tileset entries, skipping embedded tilesets
/// and keeping only the first occurrence of each name.
fn tileset_sources(tilesets: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    tilesets
        .iter()
        .filter_map(|tileset| tileset.get("source").and_then(Value::as_str))
        .filter(|source| seen.insert(*source))
        .map(str::to_string)
        .collect()
}

/// Classify a batch of uploads and extract their reference edges.
///
/// Upload order is preserved within each kind.
///
/// # Errors
///
/// Returns [`ServiceError::Validation`] when two uploads share a filename, since
/// filenames are the keys references resolve against.
pub fn resolve(uploads: Vec<Upload>) -> ServiceResult<ResolvedBatch> {
    let mut filenames = HashSet::new();
    for upload in &uploads {
        if !filenames.insert(upload.filename.as_str()) {
            return Err(ServiceError::Validation(format!(
                "duplicate filename in upload: {}",
                upload.filename
            )));
        }
    }

    let mut batch = ResolvedBatch::default();
    for upload in uploads {
        match classify(&upload) {
            Kind::Image => batch.images.push(upload),
            Kind::Spritesheet(image_source) => batch.spritesheets.push(SpritesheetUpload {
                upload,
                image_source,
            }),
            Kind::Tilemap(sources) => batch.tilemaps.push(TilemapUpload { upload, sources }),
            Kind::Unclassified => batch.unclassified.push(upload.filename),
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(filename: &str, body: &str) -> Upload {
        Upload {
            filename: filename.to_string(),
            content_type: "application/json".to_string(),
            data: body.as_bytes().to_vec(),
            json: serde_json::from_str(body).ok(),
        }
    }

    fn png(filename: &str) -> Upload {
        Upload {
            filename: filename.to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
            json: None,
        }
    }

    #[test]
    fn classifies_each_kind() {
        let batch = resolve(vec![
            json("map.json", r#"{"tilesets":[{"source":"sheet.json"}]}"#),
            png("tile.png"),
            json("sheet.json", r#"{"image":"tile.png"}"#),
            json("notes.json", r#"{"title":"no asset here"}"#),
        ])
        .unwrap_or_default();

        assert_eq!(batch.images.len(), 1);
        assert_eq!(batch.images[0].filename, "tile.png");
        assert_eq!(batch.spritesheets.len(), 1);
        assert_eq!(batch.spritesheets[0].image_source, "tile.png");
        assert_eq!(batch.tilemaps.len(), 1);
        assert_eq!(batch.tilemaps[0].sources, vec!["sheet.json".to_string()]);
        assert_eq!(batch.unclassified, vec!["notes.json".to_string()]);
    }

    #[test]
    fn tilemap_sources_are_deduplicated_in_discovery_order() {
        let batch = resolve(vec![json(
            "map.json",
            r#"{"tilesets":[
                {"source":"b.json"},
                {"source":"a.json"},
                {"firstgid":5,"tiles":[]},
                {"source":"b.json"},
                {"source":42}
            ]}"#,
        )])
        .unwrap_or_default();

        assert_eq!(
            batch.tilemaps[0].sources,
            vec!["b.json".to_string(), "a.json".to_string()]
        );
    }

    #[test]
    fn empty_tilesets_is_still_a_tilemap() {
        let batch = resolve(vec![json("map.json", r#"{"tilesets":[]}"#)]).unwrap_or_default();
        assert_eq!(batch.tilemaps.len(), 1);
        assert!(batch.tilemaps[0].sources.is_empty());
    }

    #[test]
    fn image_field_wins_over_tilesets() {
        let batch = resolve(vec![json(
            "odd.json",
            r#"{"image":"tile.png","tilesets":[{"source":"x.json"}]}"#,
        )])
        .unwrap_or_default();
        assert_eq!(batch.spritesheets.len(), 1);
        assert!(batch.tilemaps.is_empty());
    }

    #[test]
    fn non_string_image_field_is_not_a_spritesheet() {
        let batch = resolve(vec![json("odd.json", r#"{"image":7}"#)]).unwrap_or_default();
        assert!(batch.spritesheets.is_empty());
        assert_eq!(batch.unclassified, vec!["odd.json".to_string()]);
    }

    #[test]
    fn duplicate_filenames_are_rejected() {
        let result = resolve(vec![png("tile.png"), png("tile.png")]);
        assert!(matches!(result, Err(ServiceError::Validation(msg)) if msg.contains("tile.png")));
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        assert!(resolve(Vec::new()).is_ok_and(|b| b.is_empty()));
    }
}
