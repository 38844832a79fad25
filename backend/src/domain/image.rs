//! Descriptor returned by the image store after an upload.

use serde::{Deserialize, Serialize};

/// Where an uploaded image lives and what it is.
///
/// Beers carry one as their label image, pubs as their logo. The descriptor
/// is opaque to the relationship core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    /// Public URL clients load the image from.
    pub url: String,
    /// Store-assigned identifier, used to delete or replace the image.
    pub public_id: String,
    /// Size in bytes.
    pub size: u64,
    /// File format, lowercase extension without the dot.
    pub format: String,
}
