//! Catalog Service
//!
//! Orchestrates the four catalog operations over the store ports. The
//! service never touches the wire: streaming operations receive a
//! [`MessageSource`] and/or [`MessageSink`], and every operation receives a
//! [`CallContext`] it polls for cancellation.
//!
//! # Cancellation Points
//!
//! - `create_laptop`: once, right before the store write
//! - `search_laptop`: before every candidate (inside the store)
//! - `upload_image`: before every chunk
//! - `rate_laptop`: before every rating

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::ports::{
    CallContext, ImageStore, LaptopStore, MessageSink, MessageSource, RatingStore, StoreError,
    StreamError,
};
use crate::domain::filter::Filter;
use crate::domain::image::{ImageInfo, SavedImage, UploadImageMessage};
use crate::domain::laptop::Laptop;
use crate::domain::rating::{RatingRequest, RatingSummary};
use crate::error::ServiceError;
use crate::infrastructure::metrics;

/// Default upload limit: 1 MiB.
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 1 << 20;

/// Laptop catalog use cases.
#[derive(Clone)]
pub struct CatalogService {
    laptops: Arc<dyn LaptopStore>,
    images: Arc<dyn ImageStore>,
    ratings: Arc<dyn RatingStore>,
    max_image_size: usize,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("max_image_size", &self.max_image_size)
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    /// Create a service over the given stores with the default upload limit.
    #[must_use]
    pub fn new(
        laptops: Arc<dyn LaptopStore>,
        images: Arc<dyn ImageStore>,
        ratings: Arc<dyn RatingStore>,
    ) -> Self {
        Self {
            laptops,
            images,
            ratings,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
        }
    }

    /// Override the upload limit in bytes.
    #[must_use]
    pub const fn with_max_image_size(mut self, max_image_size: usize) -> Self {
        self.max_image_size = max_image_size;
        self
    }

    /// The upload limit in bytes.
    #[must_use]
    pub const fn max_image_size(&self) -> usize {
        self.max_image_size
    }

    /// The laptop store.
    #[must_use]
    pub fn laptop_store(&self) -> &Arc<dyn LaptopStore> {
        &self.laptops
    }

    /// The image store.
    #[must_use]
    pub fn image_store(&self) -> &Arc<dyn ImageStore> {
        &self.images
    }

    // =========================================================================
    // CreateLaptop
    // =========================================================================

    /// Add a laptop to the catalog and return its identity.
    ///
    /// A supplied identity must be a UUID; a missing one is generated.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed identity, `DeadlineExceeded` or
    /// `Canceled` if the call was interrupted before the write,
    /// `AlreadyExists` for a duplicate, `Internal` for any other store error.
    #[instrument(skip_all, fields(laptop_id = %laptop.id))]
    pub async fn create_laptop(
        &self,
        ctx: &CallContext,
        mut laptop: Laptop,
    ) -> Result<String, ServiceError> {
        info!("Received create-laptop request");

        if laptop.has_id() {
            Uuid::parse_str(&laptop.id).map_err(|e| {
                log_error(ServiceError::invalid_argument(format!(
                    "laptop ID is not a valid UUID: {e}"
                )))
            })?;
        } else {
            laptop.id = Uuid::new_v4().to_string();
        }

        ctx.check().map_err(|reason| log_error(reason.into()))?;

        match self.laptops.save(&laptop).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(id)) => {
                return Err(log_error(ServiceError::already_exists(&id)));
            }
            Err(e) => {
                return Err(log_error(ServiceError::internal(format!(
                    "cannot save laptop to the store: {e}"
                ))));
            }
        }

        metrics::record_laptop_created();
        info!(laptop_id = %laptop.id, "Saved laptop");
        Ok(laptop.id)
    }

    // =========================================================================
    // SearchLaptop
    // =========================================================================

    /// Stream every laptop matching `filter` to `found` as it is discovered.
    ///
    /// Returns the number of laptops sent.
    ///
    /// # Errors
    ///
    /// `DeadlineExceeded` or `Canceled` if interrupted, `Internal` if the
    /// receiver fails.
    #[instrument(skip_all, fields(max_price_usd = filter.max_price_usd))]
    pub async fn search_laptop(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        found: &mut dyn MessageSink<Laptop>,
    ) -> Result<usize, ServiceError> {
        info!(?filter, "Received search-laptop request");

        let mut sink = CountingSink {
            inner: found,
            sent: 0,
        };

        match self.laptops.search(ctx, filter, &mut sink).await {
            Ok(()) => {}
            Err(StoreError::Interrupted(reason)) => return Err(log_error(reason.into())),
            Err(e) => {
                return Err(log_error(ServiceError::internal(format!(
                    "unexpected error: {e}"
                ))));
            }
        }

        info!(sent = sink.sent, "Search finished");
        Ok(sink.sent)
    }

    // =========================================================================
    // UploadImage
    // =========================================================================

    /// Receive an image as one info message followed by data chunks and
    /// store it once the client finishes sending.
    ///
    /// # Errors
    ///
    /// `Unknown` on a receive failure, `InvalidArgument` for a protocol
    /// violation, an unknown laptop, an unusable image type or an image
    /// larger than the limit, `DeadlineExceeded` or `Canceled` if
    /// interrupted, `Internal` on a store failure.
    #[instrument(skip_all)]
    pub async fn upload_image(
        &self,
        ctx: &CallContext,
        messages: &mut dyn MessageSource<UploadImageMessage>,
    ) -> Result<SavedImage, ServiceError> {
        let info = match messages.next_message().await {
            Ok(Some(UploadImageMessage::Info(info))) => info,
            Ok(Some(UploadImageMessage::Chunk(_))) => {
                return Err(log_error(ServiceError::invalid_argument(
                    "first message must carry image info",
                )));
            }
            Ok(None) => {
                return Err(log_error(ServiceError::invalid_argument(
                    "upload stream ended before image info",
                )));
            }
            Err(e) => {
                return Err(log_error(ServiceError::unknown(format!(
                    "cannot receive image info: {e}"
                ))));
            }
        };

        let ImageInfo {
            laptop_id,
            image_type,
        } = info;
        info!(laptop_id = %laptop_id, image_type = %image_type, "Received upload-image request");

        if !is_valid_image_type(&image_type) {
            return Err(log_error(ServiceError::invalid_argument(format!(
                "image type {image_type:?} must not contain path separators"
            ))));
        }

        self.require_laptop(&laptop_id).await?;

        let mut data = Vec::new();
        loop {
            ctx.check().map_err(|reason| log_error(reason.into()))?;

            debug!("Waiting for chunk data");
            let chunk = match messages.next_message().await {
                Ok(Some(UploadImageMessage::Chunk(chunk))) => chunk,
                Ok(Some(UploadImageMessage::Info(_))) => {
                    return Err(log_error(ServiceError::invalid_argument(
                        "image info may only be sent once",
                    )));
                }
                Ok(None) => {
                    debug!("No more data");
                    break;
                }
                Err(e) => {
                    return Err(log_error(ServiceError::unknown(format!(
                        "cannot receive chunk data: {e}"
                    ))));
                }
            };

            let image_size = data.len().saturating_add(chunk.len());
            debug!(chunk_size = chunk.len(), image_size, "Received chunk");

            if image_size > self.max_image_size {
                return Err(log_error(ServiceError::invalid_argument(format!(
                    "image is too large: {image_size} > {}",
                    self.max_image_size
                ))));
            }

            data.extend_from_slice(&chunk);
        }

        let saved = self
            .images
            .save(&laptop_id, &image_type, data)
            .await
            .map_err(|e| {
                log_error(ServiceError::internal(format!(
                    "cannot save image to the store: {e}"
                )))
            })?;

        metrics::record_image_bytes(saved.size);
        info!(image_id = %saved.id, size = saved.size, "Saved image");
        Ok(saved)
    }

    // =========================================================================
    // RateLaptop
    // =========================================================================

    /// Fold each incoming rating into its laptop's aggregate and reply with
    /// the updated aggregate before reading the next rating.
    ///
    /// Returns the number of ratings processed.
    ///
    /// # Errors
    ///
    /// `DeadlineExceeded` or `Canceled` if interrupted, `InvalidArgument`
    /// for an unknown laptop or a non-finite score, `Unknown` on a receive
    /// or send failure, `Internal` on a store failure.
    #[instrument(skip_all)]
    pub async fn rate_laptop(
        &self,
        ctx: &CallContext,
        requests: &mut dyn MessageSource<RatingRequest>,
        replies: &mut dyn MessageSink<RatingSummary>,
    ) -> Result<usize, ServiceError> {
        let mut processed = 0;

        loop {
            ctx.check().map_err(|reason| log_error(reason.into()))?;

            let request = match requests.next_message().await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!("No more data");
                    break;
                }
                Err(e) => {
                    return Err(log_error(ServiceError::unknown(format!(
                        "cannot receive stream request: {e}"
                    ))));
                }
            };

            let RatingRequest { laptop_id, score } = request;
            info!(laptop_id = %laptop_id, score, "Received rate-laptop request");

            self.require_laptop(&laptop_id).await?;

            if !score.is_finite() {
                return Err(log_error(ServiceError::invalid_argument(format!(
                    "score must be a finite number, got {score}"
                ))));
            }

            let rating = self.ratings.add(&laptop_id, score);
            metrics::record_rating();

            let summary = RatingSummary::new(laptop_id, &rating);
            replies.send(summary).await.map_err(|e| {
                log_error(ServiceError::unknown(format!(
                    "cannot send stream response: {e}"
                )))
            })?;

            processed += 1;
        }

        Ok(processed)
    }

    /// Check that `laptop_id` names a stored laptop.
    async fn require_laptop(&self, laptop_id: &str) -> Result<(), ServiceError> {
        match self.laptops.find(laptop_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound(_)) => Err(log_error(
                ServiceError::invalid_argument(format!("laptop {laptop_id} is not found"))
                    .with_context("laptop_id", laptop_id),
            )),
            Err(e) => Err(log_error(ServiceError::internal(format!(
                "cannot find laptop: {e}"
            )))),
        }
    }
}

/// Image types become file name suffixes and must stay inside the image
/// directory.
fn is_valid_image_type(image_type: &str) -> bool {
    !image_type.contains(['/', '\\'])
}

fn log_error(error: ServiceError) -> ServiceError {
    warn!(kind = %error.kind(), message = error.message(), "Request failed");
    error
}

/// Forwards search results and counts them.
struct CountingSink<'a> {
    inner: &'a mut dyn MessageSink<Laptop>,
    sent: usize,
}

#[async_trait::async_trait]
impl MessageSink<Laptop> for CountingSink<'_> {
    async fn send(&mut self, laptop: Laptop) -> Result<(), StreamError> {
        debug!(laptop_id = %laptop.id, "Found laptop");
        self.inner.send(laptop).await?;
        self.sent += 1;
        metrics::record_search_result();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
