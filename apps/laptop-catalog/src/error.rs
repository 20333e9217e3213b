//! Service errors for the laptop catalog.
//!
//! Every failed call is reported as a [`ServiceError`]: a status kind plus a
//! human-readable message. At the transport boundary it becomes a
//! `tonic::Status` carrying rich error details from `tonic-types`.
//!
//! # Status Kinds
//!
//! | Kind | gRPC Code | Raised When |
//! |------|-----------|-------------|
//! | `InvalidArgument` | `INVALID_ARGUMENT` (3) | Malformed id, unknown laptop, protocol violation, oversize image |
//! | `AlreadyExists` | `ALREADY_EXISTS` (6) | Duplicate laptop id |
//! | `NotFound` | `NOT_FOUND` (5) | Lookup of a missing laptop |
//! | `DeadlineExceeded` | `DEADLINE_EXCEEDED` (4) | Call deadline passed |
//! | `Canceled` | `CANCELLED` (1) | Caller went away |
//! | `Internal` | `INTERNAL` (13) | Store or I/O failure |
//! | `Unknown` | `UNKNOWN` (2) | Stream receive or send failure |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tonic::Code;
use tonic_types::{ErrorDetails, StatusExt};

use crate::application::ports::Interrupted;

/// Domain attached to every error info detail.
pub const ERROR_DOMAIN: &str = "laptop.catalog";

/// Failure classification of a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    /// The request is malformed or refers to something that does not exist.
    InvalidArgument,
    /// The record being created already exists.
    AlreadyExists,
    /// The requested record does not exist.
    NotFound,
    /// The call's deadline passed before it completed.
    DeadlineExceeded,
    /// The call was cancelled by the caller.
    Canceled,
    /// A store or I/O failure.
    Internal,
    /// A stream failed in a way the service cannot classify.
    Unknown,
}

impl StatusKind {
    /// Map to the gRPC status code.
    #[must_use]
    pub const fn grpc_code(&self) -> Code {
        match self {
            Self::InvalidArgument => Code::InvalidArgument,
            Self::AlreadyExists => Code::AlreadyExists,
            Self::NotFound => Code::NotFound,
            Self::DeadlineExceeded => Code::DeadlineExceeded,
            Self::Canceled => Code::Cancelled,
            Self::Internal => Code::Internal,
            Self::Unknown => Code::Unknown,
        }
    }

    /// Machine-readable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::NotFound => "NOT_FOUND",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Canceled => "CANCELED",
            Self::Internal => "INTERNAL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// A failed service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    kind: StatusKind,
    message: String,
    context: Vec<(String, String)>,
}

impl ServiceError {
    /// Create a new service error.
    #[must_use]
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the status kind.
    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        self.kind
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Convert to a tonic Status with rich error details.
    #[must_use]
    pub fn to_status(&self) -> tonic::Status {
        let mut details = ErrorDetails::new();

        let metadata: HashMap<String, String> = self.context.iter().cloned().collect();
        details.set_error_info(self.kind.reason(), ERROR_DOMAIN, metadata);

        if self.kind == StatusKind::InvalidArgument {
            details.add_bad_request_violation("request", &self.message);
        }

        tonic::Status::with_error_details(self.kind.grpc_code(), &self.message, details)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.reason(), self.message)
    }
}

impl std::error::Error for ServiceError {}

impl From<ServiceError> for tonic::Status {
    fn from(error: ServiceError) -> Self {
        error.to_status()
    }
}

/// Convenience constructors for common errors.
impl ServiceError {
    /// Malformed request or protocol violation.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusKind::InvalidArgument, message)
    }

    /// Duplicate laptop id.
    #[must_use]
    pub fn already_exists(laptop_id: &str) -> Self {
        Self::new(
            StatusKind::AlreadyExists,
            format!("laptop with id {laptop_id} already exists"),
        )
        .with_context("laptop_id", laptop_id)
    }

    /// Store or I/O failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Internal, message)
    }

    /// Unclassified stream failure.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Unknown, message)
    }

    /// Interrupted call.
    #[must_use]
    pub fn interrupted(reason: Interrupted) -> Self {
        match reason {
            Interrupted::DeadlineExceeded => {
                Self::new(StatusKind::DeadlineExceeded, "deadline is exceeded")
            }
            Interrupted::Canceled => Self::new(StatusKind::Canceled, "request is canceled"),
        }
    }
}

impl From<Interrupted> for ServiceError {
    fn from(reason: Interrupted) -> Self {
        Self::interrupted(reason)
    }
}
