//! Laptop File Serializer
//!
//! Writes and reads laptop records as files, either in protobuf wire format
//! (the same encoding the gRPC service uses) or as pretty-printed JSON.
//!
//! JSON output uses snake_case field names and enum names, emits every
//! field including empty ones, and flattens the weight into `weight_kg` or
//! `weight_lb`.

use std::path::Path;

use prost::Message;

use crate::domain::laptop::Laptop;
use crate::infrastructure::grpc::proto;

/// Serializer failure.
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    /// The record could not be encoded.
    #[error("cannot encode laptop to binary: {0}")]
    Encode(#[from] prost::EncodeError),
    /// The file did not hold a valid encoded record.
    #[error("cannot decode binary to laptop: {0}")]
    Decode(#[from] prost::DecodeError),
    /// JSON conversion failed.
    #[error("cannot convert laptop to JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The file could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SerializerError + '_ {
    move |source| SerializerError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Encode `laptop` in protobuf wire format.
///
/// # Errors
///
/// Returns `SerializerError::Encode` if encoding fails.
pub fn laptop_to_binary(laptop: &Laptop) -> Result<Vec<u8>, SerializerError> {
    let message = proto::Laptop::from(laptop.clone());
    let mut buf = Vec::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;
    Ok(buf)
}

/// Decode a laptop from protobuf wire format.
///
/// # Errors
///
/// Returns `SerializerError::Decode` if the bytes are not a valid record.
pub fn laptop_from_binary(bytes: &[u8]) -> Result<Laptop, SerializerError> {
    let message = proto::Laptop::decode(bytes)?;
    Ok(message.into())
}

/// Render `laptop` as pretty-printed JSON.
///
/// # Errors
///
/// Returns `SerializerError::Json` if serialization fails.
pub fn laptop_to_json(laptop: &Laptop) -> Result<String, SerializerError> {
    Ok(serde_json::to_string_pretty(laptop)?)
}

/// Write `laptop` to `path` in protobuf wire format.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_laptop_to_binary_file(
    laptop: &Laptop,
    path: impl AsRef<Path>,
) -> Result<(), SerializerError> {
    let path = path.as_ref();
    let bytes = laptop_to_binary(laptop)?;
    std::fs::write(path, bytes).map_err(io_error(path))
}

/// Read a laptop written by [`write_laptop_to_binary_file`].
///
/// # Errors
///
/// Returns an error if reading or decoding fails.
pub fn read_laptop_from_binary_file(path: impl AsRef<Path>) -> Result<Laptop, SerializerError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(io_error(path))?;
    laptop_from_binary(&bytes)
}

/// Write `laptop` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_laptop_to_json_file(
    laptop: &Laptop,
    path: impl AsRef<Path>,
) -> Result<(), SerializerError> {
    let path = path.as_ref();
    let json = laptop_to_json(laptop)?;
    std::fs::write(path, json).map_err(io_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_laptop;

    #[test]
    fn binary_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laptop.bin");
        let laptop = sample_laptop();

        write_laptop_to_binary_file(&laptop, &path).unwrap();
        let read = read_laptop_from_binary_file(&path).unwrap();

        assert_eq!(read, laptop);
    }

    #[test]
    fn binary_is_protobuf_wire_format() {
        let laptop = sample_laptop();
        let bytes = laptop_to_binary(&laptop).unwrap();

        let decoded = proto::Laptop::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.id, laptop.id);
        assert_eq!(decoded.gpus.len(), 1);
    }

    #[test]
    fn json_uses_snake_case_and_enum_names() {
        let json = laptop_to_json(&sample_laptop()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["cpu"]["min_ghz"], 3.0);
        assert_eq!(value["memory"]["unit"], "GIGABYTE");
        assert_eq!(value["storages"][0]["driver"], "SSD");
        assert_eq!(value["screen"]["panel"], "IPS");
        assert_eq!(value["keyboard"]["layout"], "QWERTY");
        assert_eq!(value["weight_kg"], 1.2);
        assert!(value.get("updated_at").is_some());
        assert!(json.contains('\n'));
    }

    #[test]
    fn json_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laptop.json");
        let laptop = sample_laptop();

        write_laptop_to_json_file(&laptop, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, laptop_to_json(&laptop).unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_laptop_from_binary_file(dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, SerializerError::Io { .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = laptop_from_binary(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, SerializerError::Decode(_)));
    }
}
