//! Icon resolution for incoming notifications.
//!
//! Sources are tried in the protocol's priority order: the `image-data`
//! hint, the `image-path` hint, the `app_icon` string, and finally the
//! legacy `icon_data` hint. Path-like references that don't point at an
//! existing file are treated as icon-theme names and handed to the
//! injected [`IconThemeLookup`]. Every failure is logged and the record
//! simply proceeds iconless; a `Notify` call never fails over its icon.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use yawns_domain::notifications::Hints;

/// Resolves freedesktop icon names against the active icon theme.
///
/// Theme traversal belongs to the desktop toolkit, so the daemon only
/// defines the seam. The default [`NoThemeLookup`] resolves nothing.
#[async_trait]
pub trait IconThemeLookup: Send + Sync {
    async fn lookup(&self, name: &str, size: u32) -> Option<PathBuf>;
}

pub struct NoThemeLookup;

#[async_trait]
impl IconThemeLookup for NoThemeLookup {
    async fn lookup(&self, _name: &str, _size: u32) -> Option<PathBuf> {
        None
    }
}

pub struct IconResolver {
    theme: Box<dyn IconThemeLookup>,
    icon_size: u32,
}

impl IconResolver {
    pub fn new(theme: Box<dyn IconThemeLookup>, icon_size: u32) -> Self {
        Self { theme, icon_size }
    }

    /// Resolves the image payload for one notification, or `None` for an
    /// iconless record.
    pub async fn resolve(&self, hints: &Hints, app_icon: &str) -> Option<Vec<u8>> {
        if let Some(image) = hints.image() {
            return Some(image.data.clone());
        }
        if let Some(reference) = hints.image_path() {
            if let Some(bytes) = self.read_reference(reference).await {
                return Some(bytes);
            }
        }
        if !app_icon.is_empty() {
            if let Some(bytes) = self.read_reference(app_icon).await {
                return Some(bytes);
            }
        }
        if let Some(image) = hints.legacy_icon() {
            return Some(image.data.clone());
        }
        None
    }

    /// Reads an icon reference: a `file://` URI, a plain path, or (when
    /// neither exists on disk) an icon-theme name.
    async fn read_reference(&self, reference: &str) -> Option<Vec<u8>> {
        let stripped = reference.strip_prefix("file://").unwrap_or(reference);
        let path = Path::new(stripped);
        if path.exists() {
            match tokio::fs::read(path).await {
                Ok(bytes) => return Some(bytes),
                Err(error) => {
                    warn!(path = %path.display(), %error, "failed to read icon file");
                    return None;
                }
            }
        }
        let Some(theme_path) = self.theme.lookup(stripped, self.icon_size).await else {
            debug!(reference, "icon reference is neither a file nor a theme icon");
            return None;
        };
        match tokio::fs::read(&theme_path).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                warn!(path = %theme_path.display(), %error, "failed to read theme icon");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use yawns_domain::notifications::{HintValue, ImageData};

    fn image_hint(data: Vec<u8>) -> HintValue {
        HintValue::Image(ImageData {
            width: 1,
            height: 1,
            rowstride: 3,
            has_alpha: false,
            bits_per_sample: 8,
            channels: 3,
            data,
        })
    }

    fn resolver() -> IconResolver {
        IconResolver::new(Box::new(NoThemeLookup), 64)
    }

    struct FixedLookup(PathBuf);

    #[async_trait]
    impl IconThemeLookup for FixedLookup {
        async fn lookup(&self, name: &str, _size: u32) -> Option<PathBuf> {
            (name == "mail-unread").then(|| self.0.clone())
        }
    }

    #[tokio::test]
    async fn image_data_hint_has_top_priority() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"from-file").unwrap();
        let mut hints = Hints::new();
        hints.insert("image-data", image_hint(vec![9, 9, 9]));
        hints.insert(
            "image-path",
            HintValue::Str(file.path().to_string_lossy().into_owned()),
        );
        let bytes = resolver().resolve(&hints, "").await;
        assert_eq!(bytes, Some(vec![9, 9, 9]));
    }

    #[tokio::test]
    async fn image_path_hint_reads_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"png-bytes").unwrap();
        let mut hints = Hints::new();
        hints.insert(
            "image-path",
            HintValue::Str(format!("file://{}", file.path().display())),
        );
        let bytes = resolver().resolve(&hints, "").await;
        assert_eq!(bytes.as_deref(), Some(b"png-bytes".as_slice()));
    }

    #[tokio::test]
    async fn app_icon_is_the_fallback_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"app-icon").unwrap();
        let hints = Hints::new();
        let bytes = resolver()
            .resolve(&hints, &file.path().to_string_lossy())
            .await;
        assert_eq!(bytes.as_deref(), Some(b"app-icon".as_slice()));
    }

    #[tokio::test]
    async fn unreadable_sources_fall_through_to_legacy_hint() {
        let mut hints = Hints::new();
        hints.insert(
            "image-path",
            HintValue::Str("/nonexistent/image.png".to_string()),
        );
        hints.insert("icon_data", image_hint(vec![4, 5, 6]));
        let bytes = resolver().resolve(&hints, "/also/missing.png").await;
        assert_eq!(bytes, Some(vec![4, 5, 6]));
    }

    #[tokio::test]
    async fn everything_missing_resolves_iconless() {
        let bytes = resolver().resolve(&Hints::new(), "").await;
        assert_eq!(bytes, None);
    }

    #[tokio::test]
    async fn theme_lookup_handles_icon_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"theme-icon").unwrap();
        let resolver = IconResolver::new(Box::new(FixedLookup(file.path().to_path_buf())), 64);
        let bytes = resolver.resolve(&Hints::new(), "mail-unread").await;
        assert_eq!(bytes.as_deref(), Some(b"theme-icon".as_slice()));
        assert_eq!(resolver.resolve(&Hints::new(), "unknown-icon").await, None);
    }
}
