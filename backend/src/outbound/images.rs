//! Filesystem image store.
//!
//! Uploads are staged by the HTTP front end in an upload directory and named
//! by a path relative to it. Storing an image moves its bytes into the image
//! directory under a fresh public id; the image directory is then served
//! statically under `base_url`. Both directories are opened as capability
//! handles, so relative paths cannot reach outside them.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ImageDescriptor;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// Lowercase extensions accepted as images.
pub const ACCEPTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// [`ImageStore`] writing into a local directory.
#[derive(Clone)]
pub struct LocalImageStore {
    uploads: Arc<Dir>,
    images: Arc<Dir>,
    base_url: String,
}

impl LocalImageStore {
    /// Open (creating when missing) the staging and image directories.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when either directory cannot be created or
    /// opened.
    pub fn open(
        upload_dir: impl AsRef<Path>,
        image_dir: impl AsRef<Path>,
        base_url: impl Into<String>,
    ) -> io::Result<Self> {
        Ok(Self {
            uploads: Arc::new(open_dir(upload_dir.as_ref())?),
            images: Arc::new(open_dir(image_dir.as_ref())?),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base_url)
    }
}

fn open_dir(path: &Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(path, ambient_authority())?;
    Dir::open_ambient_dir(path, ambient_authority())
}

fn format_of(source: &Path) -> Result<String, ImageStoreError> {
    let format = source
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ACCEPTED_FORMATS.contains(&format.as_str()) {
        Ok(format)
    } else {
        Err(ImageStoreError::unsupported_format(if format.is_empty() {
            "none".to_owned()
        } else {
            format
        }))
    }
}

fn is_public_id(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_hexdigit())
}

async fn blocking<T, F>(task: F) -> Result<T, ImageStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ImageStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ImageStoreError::storage(format!("image task failed: {err}")))?
}

struct Stored {
    public_id: String,
    file_name: String,
    size: u64,
}

fn store_upload(
    uploads: &Dir,
    images: &Dir,
    source: &Path,
    format: &str,
) -> Result<Stored, ImageStoreError> {
    let bytes = uploads
        .read(source)
        .map_err(|err| ImageStoreError::source(format!("{}: {err}", source.display())))?;
    if bytes.is_empty() {
        return Err(ImageStoreError::source(format!(
            "{}: upload is empty",
            source.display()
        )));
    }

    let public_id = Uuid::new_v4().simple().to_string();
    let file_name = format!("{public_id}.{format}");
    images
        .write(&file_name, &bytes)
        .map_err(|err| ImageStoreError::storage(format!("{file_name}: {err}")))?;

    if let Err(err) = uploads.remove_file(source) {
        warn!(source = %source.display(), error = %err, "staged upload not removed");
    }

    Ok(Stored {
        public_id,
        file_name,
        size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
    })
}

fn remove_image(images: &Dir, public_id: &str) -> Result<usize, ImageStoreError> {
    let prefix = format!("{public_id}.");
    let entries = images
        .entries()
        .map_err(|err| ImageStoreError::storage(err.to_string()))?;
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|err| ImageStoreError::storage(err.to_string()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) {
            images
                .remove_file(name)
                .map_err(|err| ImageStoreError::storage(format!("{name}: {err}")))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload_image(&self, source: &Path) -> Result<ImageDescriptor, ImageStoreError> {
        let format = format_of(source)?;
        let source: PathBuf = source.to_path_buf();
        let (uploads, images) = (Arc::clone(&self.uploads), Arc::clone(&self.images));
        let task_format = format.clone();
        let stored =
            blocking(move || store_upload(&uploads, &images, &source, &task_format)).await?;
        debug!(public_id = %stored.public_id, size = stored.size, "image stored");
        Ok(ImageDescriptor {
            url: self.url_for(&stored.file_name),
            public_id: stored.public_id,
            size: stored.size,
            format,
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), ImageStoreError> {
        if !is_public_id(public_id) {
            return Err(ImageStoreError::storage(format!(
                "`{public_id}` is not an image id"
            )));
        }
        let images = Arc::clone(&self.images);
        let id = public_id.to_owned();
        let removed = blocking(move || remove_image(&images, &id)).await?;
        if removed == 0 {
            debug!(%public_id, "image already absent");
        }
        Ok(())
    }
}
