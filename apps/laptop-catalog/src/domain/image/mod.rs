//! Laptop Images
//!
//! Types for the client-streaming image upload: the header that opens an
//! upload, the messages that make up the stream, and the stored result.

use std::path::PathBuf;

/// Header of an upload: which laptop the image belongs to and its type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageInfo {
    /// Owning laptop.
    pub laptop_id: String,
    /// Content-type tag, stored as the file extension (e.g. `.jpg`).
    pub image_type: String,
}

/// One inbound message of an image upload.
///
/// A well-formed upload is exactly one `Info` followed by zero or more
/// `Chunk`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadImageMessage {
    /// Upload header.
    Info(ImageInfo),
    /// Slice of the image payload.
    Chunk(Vec<u8>),
}

/// Bookkeeping record of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Owning laptop.
    pub laptop_id: String,
    /// Content-type tag.
    pub image_type: String,
    /// Location of the payload on disk.
    pub path: PathBuf,
}

/// Outcome of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// Generated image identity.
    pub id: String,
    /// Payload length in bytes.
    pub size: usize,
}
