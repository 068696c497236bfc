//! Upload validation for the media library.
//!
//! Files are checked against a fixed allow-list before any bytes are sent
//! to the CDN. Both the declared content type and the file extension must
//! belong to the same media kind.

use serde::{Deserialize, Serialize};

/// Largest accepted image upload (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Largest accepted video upload (100 MiB).
pub const MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;

const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
    ("image/webp", &["webp"]),
    ("image/svg+xml", &["svg"]),
    ("image/avif", &["avif"]),
];

const VIDEO_TYPES: &[(&str, &[&str])] = &[
    ("video/mp4", &["mp4", "m4v"]),
    ("video/webm", &["webm"]),
    ("video/quicktime", &["mov"]),
];

/// CDN resource type of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Path segment used by the CDN API (`image` / `video`).
    #[must_use]
    pub const fn resource_type(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    #[must_use]
    pub const fn max_bytes(self) -> u64 {
        match self {
            Self::Image => MAX_IMAGE_BYTES,
            Self::Video => MAX_VIDEO_BYTES,
        }
    }

    const fn allowed(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            Self::Image => IMAGE_TYPES,
            Self::Video => VIDEO_TYPES,
        }
    }

    /// Classify a declared content type, ignoring parameters like `; charset`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        [Self::Image, Self::Video]
            .into_iter()
            .find(|kind| kind.allowed().iter().any(|(mime, _)| *mime == essence))
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(format!("invalid resource type: {s}")),
        }
    }
}

/// Reasons an upload is refused before reaching the CDN.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    #[error("the file is empty")]
    Empty,
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("file extension .{extension} does not match {content_type}")]
    ExtensionMismatch {
        extension: String,
        content_type: String,
    },
    #[error("{kind:?} files must be at most {max_mb} MB")]
    TooLarge { kind: MediaKind, max_mb: u64 },
}

/// Validate a candidate upload and return its media kind.
///
/// # Errors
///
/// Returns an [`UploadValidationError`] if the file is empty, the content
/// type is not on the allow-list, the extension belongs to a different
/// type, or the size exceeds the kind's limit.
pub fn validate_upload(
    file_name: &str,
    content_type: &str,
    size: u64,
) -> Result<MediaKind, UploadValidationError> {
    if size == 0 {
        return Err(UploadValidationError::Empty);
    }

    let kind = MediaKind::from_content_type(content_type)
        .ok_or_else(|| UploadValidationError::UnsupportedType(content_type.to_owned()))?;

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let extension_matches = kind
        .allowed()
        .iter()
        .any(|(mime, exts)| *mime == essence && exts.contains(&extension.as_str()));
    if !extension_matches {
        return Err(UploadValidationError::ExtensionMismatch {
            extension,
            content_type: essence,
        });
    }

    if size > kind.max_bytes() {
        return Err(UploadValidationError::TooLarge {
            kind,
            max_mb: kind.max_bytes() / (1024 * 1024),
        });
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_images_and_videos() {
        assert_eq!(
            validate_upload("Hero.JPG", "image/jpeg", 2_000_000),
            Ok(MediaKind::Image)
        );
        assert_eq!(
            validate_upload("demo.mov", "video/quicktime", 50_000_000),
            Ok(MediaKind::Video)
        );
    }

    #[test]
    fn rejects_empty_and_unknown_types() {
        assert_eq!(
            validate_upload("a.png", "image/png", 0),
            Err(UploadValidationError::Empty)
        );
        assert!(matches!(
            validate_upload("notes.pdf", "application/pdf", 10),
            Err(UploadValidationError::UnsupportedType(_))
        ));
    }

    #[test]
    fn rejects_extension_that_disagrees_with_type() {
        assert!(matches!(
            validate_upload("payload.exe", "image/png", 10),
            Err(UploadValidationError::ExtensionMismatch { .. })
        ));
        assert!(matches!(
            validate_upload("clip.mp4", "image/png", 10),
            Err(UploadValidationError::ExtensionMismatch { .. })
        ));
    }

    #[test]
    fn enforces_per_kind_size_limits() {
        assert_eq!(
            validate_upload("big.png", "image/png", MAX_IMAGE_BYTES + 1),
            Err(UploadValidationError::TooLarge {
                kind: MediaKind::Image,
                max_mb: 10
            })
        );
        assert_eq!(
            validate_upload("big.mp4", "video/mp4", MAX_IMAGE_BYTES + 1),
            Ok(MediaKind::Video)
        );
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(
            MediaKind::from_content_type("image/svg+xml; charset=utf-8"),
            Some(MediaKind::Image)
        );
    }
}
