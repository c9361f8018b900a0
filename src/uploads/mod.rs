pub mod form;

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::UploadConfig;

pub use form::{FormFields, FormPayload};

/// Accepted image kinds; both the file extension and the MIME subtype must be one of these.
const IMAGE_KINDS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Subdirectory, under the upload root, holding animal pictures.
pub const ANIMAL_DIR: &str = "animales";

/// URL prefix under which the upload root is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Solo se permiten archivos de imagen (JPEG, JPG, PNG, GIF, WEBP)")]
    UnsupportedType,

    #[error("El archivo es demasiado grande. Tamaño máximo: {limit}")]
    TooLarge { limit: String },

    #[error("Error al subir archivo: {0}")]
    Multipart(String),

    #[error("El campo {field} debe ser {expected}")]
    InvalidField { field: String, expected: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn too_large(max_bytes: usize) -> Self {
        UploadError::TooLarge { limit: size_label(max_bytes) }
    }
}

/// Human-readable size limit, rounded up: whole MB from 1 MiB, KB below.
pub fn size_label(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB {
        format!("{}MB", bytes.div_ceil(MIB))
    } else {
        format!("{}KB", bytes.div_ceil(KIB))
    }
}

/// An accepted image, fully read into memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub extension: String,
    pub data: Vec<u8>,
}

/// Check a file's declared name and MIME type. Returns the lowercased extension, dot included.
pub fn validate_image(file_name: &str, content_type: &str) -> Result<String, UploadError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| IMAGE_KINDS.contains(&e.as_str()))
        .ok_or(UploadError::UnsupportedType)?;

    let content_type = content_type.to_ascii_lowercase();
    let subtype = content_type
        .strip_prefix("image/")
        .map(|s| s.split(';').next().unwrap_or(s).trim())
        .ok_or(UploadError::UnsupportedType)?;
    if !IMAGE_KINDS.contains(&subtype) {
        return Err(UploadError::UnsupportedType);
    }

    Ok(format!(".{}", extension))
}

/// Stored name: sanitized stem, upload time and a random suffix.
fn stored_file_name(original: &str, extension: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        stem = "imagen".to_string();
    }
    format!("{}-{}-{}{}", stem, Utc::now().timestamp_millis(), Uuid::new_v4().simple(), extension)
}

/// Image files on local disk, served back under [`PUBLIC_PREFIX`].
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: config.dir.clone(),
            max_bytes: config.max_file_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn too_large(&self) -> UploadError {
        UploadError::too_large(self.max_bytes)
    }

    /// Create the upload directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(self.root.join(ANIMAL_DIR)).await?;
        Ok(())
    }

    /// Write an animal picture; returns its public path.
    pub async fn save(&self, image: &ImageUpload) -> Result<String, UploadError> {
        if image.data.len() > self.max_bytes {
            return Err(self.too_large());
        }

        let name = stored_file_name(&image.file_name, &image.extension);
        let dir = self.root.join(ANIMAL_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &image.data).await?;

        debug!("Stored upload {} ({} bytes)", name, image.data.len());
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, ANIMAL_DIR, name))
    }

    /// Delete the file behind a public path. A missing file is not an error.
    pub async fn remove(&self, public_path: &str) -> Result<(), UploadError> {
        let Some(path) = self.resolve(public_path) else {
            warn!("Refusing to remove file outside the upload directory: {}", public_path);
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a public path to a file under the root, rejecting anything that escapes it.
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = Path::new(public_path.strip_prefix(PUBLIC_PREFIX)?.trim_start_matches('/'));
        if relative.as_os_str().is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> ImageStore {
        ImageStore::new(&UploadConfig { dir: dir.to_path_buf(), max_file_bytes: 16 })
    }

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voz-uploads-{}-{}", name, Uuid::new_v4().simple()))
    }

    #[test]
    fn size_limit_is_never_shown_as_zero() {
        assert_eq!(size_label(5 * 1024 * 1024), "5MB");
        assert_eq!(size_label(5 * 1024 * 1024 + 1), "6MB");
        assert_eq!(size_label(512 * 1024), "512KB");
        assert_eq!(size_label(16), "1KB");
        assert_eq!(
            store(Path::new("unused")).too_large().to_string(),
            "El archivo es demasiado grande. Tamaño máximo: 1KB"
        );
    }

    #[test]
    fn extension_and_mime_must_both_match() {
        assert_eq!(validate_image("Luna.JPG", "image/jpeg").unwrap(), ".jpg");
        assert_eq!(validate_image("luna.webp", "image/webp").unwrap(), ".webp");
        assert!(matches!(validate_image("luna.png", "application/pdf"), Err(UploadError::UnsupportedType)));
        assert!(matches!(validate_image("luna.pdf", "image/png"), Err(UploadError::UnsupportedType)));
        assert!(matches!(validate_image("luna", "image/png"), Err(UploadError::UnsupportedType)));
    }

    #[test]
    fn stored_name_keeps_sanitized_stem_and_extension() {
        let name = stored_file_name("mi foto (1).png", ".png");
        assert!(name.starts_with("mi_foto__1_-"), "{}", name);
        assert!(name.ends_with(".png"));
        assert!(stored_file_name("", ".png").starts_with("imagen-"));
        assert!(stored_file_name("C:/fotos/../rex.gif", ".gif").starts_with("rex-"));
    }

    #[test]
    fn resolve_rejects_escapes() {
        let s = store(Path::new("/srv/uploads"));
        assert_eq!(s.resolve("/uploads/animales/a.png"), Some(PathBuf::from("/srv/uploads/animales/a.png")));
        assert_eq!(s.resolve("/uploads/../etc/passwd"), None);
        assert_eq!(s.resolve("/etc/passwd"), None);
        assert_eq!(s.resolve("/uploads/"), None);
    }

    #[tokio::test]
    async fn save_then_remove() {
        let root = temp_root("save");
        let s = store(&root);
        let image = ImageUpload {
            file_name: "rex.png".into(),
            content_type: "image/png".into(),
            extension: ".png".into(),
            data: vec![1, 2, 3],
        };

        let public = s.save(&image).await.unwrap();
        assert!(public.starts_with("/uploads/animales/rex-"));
        let on_disk = s.resolve(&public).unwrap();
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), vec![1, 2, 3]);

        s.remove(&public).await.unwrap();
        assert!(!on_disk.exists());
        // Second removal finds nothing and still succeeds
        s.remove(&public).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn save_rejects_oversized() {
        let root = temp_root("big");
        let image = ImageUpload {
            file_name: "big.gif".into(),
            content_type: "image/gif".into(),
            extension: ".gif".into(),
            data: vec![0; 17],
        };
        assert!(matches!(store(&root).save(&image).await, Err(UploadError::TooLarge { .. })));
    }
}
