//! Bulk asset ingestion: classify an upload batch, resolve its references, and persist it
//! atomically (images, then spritesheets, then tilemaps).

pub mod pipeline;
pub mod resolver;
pub mod upload;

pub use pipeline::{IngestPolicy, IngestReport, ReferenceMap, ingest_batch};
pub use resolver::{ResolvedBatch, resolve};
pub use upload::Upload;
