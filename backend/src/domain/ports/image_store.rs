//! Driven port for storing uploaded images.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{Error, ImageDescriptor};

use super::define_port_error;

define_port_error! {
    /// Failures raised by image store adapters.
    pub enum ImageStoreError {
        /// The staged upload could not be read.
        Source { message: String } => "image upload could not be read: {message}",
        /// The upload is not an accepted image format.
        UnsupportedFormat { format: String } => "unsupported image format: {format}",
        /// The image could not be written to its destination.
        Storage { message: String } => "image storage failed: {message}",
    }
}

/// Store an image, get back a descriptor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the staged file at `source` and describe where it now lives.
    async fn upload_image(&self, source: &Path) -> Result<ImageDescriptor, ImageStoreError>;

    /// Remove a previously stored image by its public id.
    async fn delete_image(&self, public_id: &str) -> Result<(), ImageStoreError>;
}

impl From<ImageStoreError> for Error {
    fn from(err: ImageStoreError) -> Self {
        match err {
            ImageStoreError::Source { .. } | ImageStoreError::UnsupportedFormat { .. } => {
                Error::invalid_request(err.to_string())
            }
            ImageStoreError::Storage { .. } => Error::internal(err.to_string()),
        }
    }
}
