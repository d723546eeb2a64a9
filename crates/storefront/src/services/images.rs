//! Image storage for product, category and hero uploads.
//!
//! Two backends: files on local disk served from `/uploads`, or Cloudinary
//! via its signed upload API. Uploads are accepted only when both the file
//! extension and the declared MIME type name an image format.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::{CloudinaryConfig, ImageStoreConfig};

/// Error message shown when a non-image is uploaded.
pub const IMAGES_ONLY: &str = "Images only!";

/// URL prefix for locally stored images.
pub const LOCAL_URL_PREFIX: &str = "/uploads/";

const ALLOWED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp", "svg"];

/// Cloudinary resize applied on upload (fit within 1000x1000).
const CLOUDINARY_TRANSFORMATION: &str = "c_limit,h_1000,w_1000";

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("Images only!")]
    NotAnImage,

    #[error("image file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image service rejected the request: {0}")]
    Upstream(String),
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Lowercased extension including the dot, e.g. `".png"`.
    fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// Whether `file_name` and `content_type` both name an allowed image format.
#[must_use]
pub fn is_allowed_image(file_name: &str, content_type: &str) -> bool {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let content_type = content_type.to_ascii_lowercase();

    let extension_ok = ALLOWED_FORMATS.iter().any(|f| extension.contains(f));
    let mime_ok = ALLOWED_FORMATS.iter().any(|f| content_type.contains(f));
    extension_ok && mime_ok
}

/// Where uploaded images go.
#[derive(Clone)]
pub enum ImageStore {
    Local {
        dir: PathBuf,
    },
    Cloudinary {
        client: reqwest::Client,
        config: CloudinaryConfig,
    },
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

impl ImageStore {
    /// Build the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &ImageStoreConfig) -> Result<Self, ImageStoreError> {
        Ok(match config {
            ImageStoreConfig::Local { dir } => Self::Local { dir: dir.clone() },
            ImageStoreConfig::Cloudinary(cloudinary) => Self::Cloudinary {
                client: reqwest::Client::builder()
                    .timeout(Duration::from_secs(30))
                    .build()?,
                config: cloudinary.clone(),
            },
        })
    }

    /// Directory served at `/uploads`, when storing locally.
    #[must_use]
    pub fn local_dir(&self) -> Option<&Path> {
        match self {
            Self::Local { dir } => Some(dir),
            Self::Cloudinary { .. } => None,
        }
    }

    /// Store an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::NotAnImage` for non-images, otherwise an
    /// I/O or upstream error.
    #[instrument(skip(self, image), fields(file_name = %image.file_name, size = image.bytes.len()))]
    pub async fn save(&self, prefix: &str, image: &UploadedImage) -> Result<String, ImageStoreError> {
        if !is_allowed_image(&image.file_name, &image.content_type) {
            return Err(ImageStoreError::NotAnImage);
        }

        match self {
            Self::Local { dir } => {
                let file_name = stored_file_name(prefix, &image.extension());
                tokio::fs::create_dir_all(dir).await?;
                tokio::fs::write(dir.join(&file_name), &image.bytes).await?;
                Ok(format!("{LOCAL_URL_PREFIX}{file_name}"))
            }
            Self::Cloudinary { client, config } => upload(client, config, image).await,
        }
    }

    /// Remove a previously stored image. URLs this store does not own are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an I/O or upstream error if removal fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        match self {
            Self::Local { dir } => {
                let Some(file_name) = local_file_name(url) else {
                    return Ok(());
                };
                match tokio::fs::remove_file(dir.join(file_name)).await {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                    _ => Ok(()),
                }
            }
            Self::Cloudinary { client, config } => {
                let Some(public_id) = cloudinary_public_id(url) else {
                    return Ok(());
                };
                destroy(client, config, &public_id).await
            }
        }
    }

    /// Delete images, logging failures instead of returning them.
    pub async fn delete_quietly<'u>(&self, urls: impl IntoIterator<Item = &'u str>) {
        for url in urls {
            if let Err(e) = self.delete(url).await {
                warn!(url, error = %e, "Failed to delete image");
            }
        }
    }
}

fn stored_file_name(prefix: &str, extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{millis}-{}{extension}", &suffix[..8])
}

/// File name inside the upload dir for a `/uploads/...` URL.
fn local_file_name(url: &str) -> Option<&str> {
    let name = url.strip_prefix(LOCAL_URL_PREFIX)?;
    (!name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.starts_with('.'))
        .then_some(name)
}

/// `folder/name` from `https://res.cloudinary.com/<cloud>/image/upload/v1/<folder>/<name>.<ext>`.
fn cloudinary_public_id(url: &str) -> Option<String> {
    if !url.contains("res.cloudinary.com") {
        return None;
    }
    let mut parts = url.rsplit('/');
    let file = parts.next()?;
    let folder = parts.next()?;
    let stem = file.split('.').next()?;
    if stem.is_empty() || folder.is_empty() {
        return None;
    }
    Some(format!("{folder}/{stem}"))
}

/// Cloudinary request signature: sorted `key=value` pairs joined with `&`,
/// followed by the API secret, hashed.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

async fn upload(
    client: &reqwest::Client,
    config: &CloudinaryConfig,
    image: &UploadedImage,
) -> Result<String, ImageStoreError> {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = sign(
        &[
            ("folder", config.folder.as_str()),
            ("timestamp", timestamp.as_str()),
            ("transformation", CLOUDINARY_TRANSFORMATION),
        ],
        config.api_secret.expose_secret(),
    );

    let file = reqwest::multipart::Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)?;
    let form = reqwest::multipart::Form::new()
        .part("file", file)
        .text("api_key", config.api_key.clone())
        .text("timestamp", timestamp)
        .text("folder", config.folder.clone())
        .text("transformation", CLOUDINARY_TRANSFORMATION)
        .text("signature_algorithm", "sha256")
        .text("signature", signature);

    let response = client
        .post(format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        ))
        .multipart(form)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }
    let body: UploadResponse = response.json().await?;
    Ok(body.secure_url)
}

async fn destroy(
    client: &reqwest::Client,
    config: &CloudinaryConfig,
    public_id: &str,
) -> Result<(), ImageStoreError> {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = sign(
        &[("public_id", public_id), ("timestamp", timestamp.as_str())],
        config.api_secret.expose_secret(),
    );

    let response = client
        .post(format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            config.cloud_name
        ))
        .form(&[
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", config.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }
    Ok(())
}

async fn upstream_error(response: reqwest::Response) -> ImageStoreError {
    let status = response.status();
    let message = response
        .json::<CloudinaryErrorBody>()
        .await
        .map_or_else(|_| status.to_string(), |body| body.error.message);
    ImageStoreError::Upstream(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_image_requires_extension_and_mime() {
        assert!(is_allowed_image("ring.JPG", "image/jpeg"));
        assert!(is_allowed_image("logo.svg", "image/svg+xml"));
        assert!(is_allowed_image("hero.webp", "image/webp"));
        assert!(!is_allowed_image("ring.jpg", "application/pdf"));
        assert!(!is_allowed_image("notes.txt", "image/png"));
        assert!(!is_allowed_image("noextension", "image/png"));
    }

    #[test]
    fn test_local_file_name_rejects_traversal() {
        assert_eq!(
            local_file_name("/uploads/product-1.jpg"),
            Some("product-1.jpg")
        );
        assert_eq!(local_file_name("/uploads/../secret"), None);
        assert_eq!(local_file_name("/uploads/.env"), None);
        assert_eq!(local_file_name("https://cdn.example.com/a.jpg"), None);
    }

    #[test]
    fn test_cloudinary_public_id() {
        assert_eq!(
            cloudinary_public_id(
                "https://res.cloudinary.com/demo/image/upload/v1712/jewel_products/abc123.jpg"
            )
            .as_deref(),
            Some("jewel_products/abc123")
        );
        assert_eq!(cloudinary_public_id("/uploads/product-1.jpg"), None);
    }

    #[test]
    fn test_sign_sorts_parameters() {
        let a = sign(&[("timestamp", "1"), ("folder", "f")], "s");
        let b = sign(&[("folder", "f"), ("timestamp", "1")], "s");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_stored_file_name_keeps_prefix_and_extension() {
        let name = stored_file_name("product", ".png");
        assert!(name.starts_with("product-"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_local_save_and_delete() {
        let dir = std::env::temp_dir().join(format!("jewelbox-images-{}", Uuid::new_v4()));
        let store = ImageStore::Local { dir: dir.clone() };
        let image = UploadedImage {
            file_name: "ring.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };

        let url = store.save("product", &image).await.unwrap();
        assert!(url.starts_with("/uploads/product-"));
        let path = dir.join(url.trim_start_matches(LOCAL_URL_PREFIX));
        assert!(path.exists());

        store.delete(&url).await.unwrap();
        assert!(!path.exists());
        // Deleting again is not an error
        store.delete(&url).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_save_rejects_non_image() {
        let store = ImageStore::Local {
            dir: std::env::temp_dir(),
        };
        let file = UploadedImage {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert!(matches!(
            store.save("product", &file).await,
            Err(ImageStoreError::NotAnImage)
        ));
    }
}
