//! Prometheus Metrics Module
//!
//! Exposes catalog metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Requests**: Completed calls per RPC and status code, with durations
//! - **Catalog**: Laptops created, search results streamed
//! - **Uploads**: Image bytes accepted
//! - **Ratings**: Scores recorded
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port. Recording
//! functions are no-ops until [`init_metrics`] installs the recorder, so
//! library code and tests can call them freely.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Calling it again returns the handle installed by the first call.
///
/// # Errors
///
/// Returns an error if the recorder cannot be installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "laptop_catalog_requests_total",
        "Total completed RPCs by method and status code"
    );
    describe_histogram!(
        "laptop_catalog_request_duration_seconds",
        "RPC duration from first byte to final status"
    );

    describe_counter!(
        "laptop_catalog_laptops_created_total",
        "Total laptops added to the catalog"
    );
    describe_counter!(
        "laptop_catalog_search_results_total",
        "Total laptops streamed to search clients"
    );

    describe_counter!(
        "laptop_catalog_image_bytes_total",
        "Total image bytes accepted from uploads"
    );

    describe_counter!(
        "laptop_catalog_ratings_total",
        "Total scores folded into laptop ratings"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Metric labels for RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rpc {
    /// Unary create.
    CreateLaptop,
    /// Server-streaming search.
    SearchLaptop,
    /// Client-streaming image upload.
    UploadImage,
    /// Bidirectional rating.
    RateLaptop,
}

impl Rpc {
    /// Get the label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateLaptop => "create_laptop",
            Self::SearchLaptop => "search_laptop",
            Self::UploadImage => "upload_image",
            Self::RateLaptop => "rate_laptop",
        }
    }
}

/// Record a completed RPC.
///
/// `code` is `"OK"` for success or the failure reason.
pub fn record_request(rpc: Rpc, code: &'static str, duration: Duration) {
    counter!(
        "laptop_catalog_requests_total",
        "rpc" => rpc.as_str(),
        "code" => code
    )
    .increment(1);

    histogram!(
        "laptop_catalog_request_duration_seconds",
        "rpc" => rpc.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record a laptop added to the catalog.
pub fn record_laptop_created() {
    counter!("laptop_catalog_laptops_created_total").increment(1);
}

/// Record a laptop streamed to a search client.
pub fn record_search_result() {
    counter!("laptop_catalog_search_results_total").increment(1);
}

/// Record the size of an accepted image.
pub fn record_image_bytes(bytes: usize) {
    counter!("laptop_catalog_image_bytes_total").increment(bytes as u64);
}

/// Record a score folded into a rating.
pub fn record_rating() {
    counter!("laptop_catalog_ratings_total").increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_as_str() {
        assert_eq!(Rpc::CreateLaptop.as_str(), "create_laptop");
        assert_eq!(Rpc::SearchLaptop.as_str(), "search_laptop");
        assert_eq!(Rpc::UploadImage.as_str(), "upload_image");
        assert_eq!(Rpc::RateLaptop.as_str(), "rate_laptop");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_request(Rpc::CreateLaptop, "OK", Duration::from_millis(3));
        record_laptop_created();
        record_search_result();
        record_image_bytes(1024);
        record_rating();
    }
}
