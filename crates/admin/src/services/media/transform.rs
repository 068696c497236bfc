//! Delivery URLs with on-the-fly transformations.
//!
//! A transformation is rendered as comma-separated `key_value` segments,
//! e.g. `w_400,h_300,c_fill,g_auto,q_auto,f_auto`, placed between
//! `/upload/` and the public id.

use folio_core::MediaKind;
use serde::Deserialize;

/// Resize mode (`c_` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Fill,
    Fit,
    Limit,
    Pad,
    Scale,
    Thumb,
}

impl Crop {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Fit => "fit",
            Self::Limit => "limit",
            Self::Pad => "pad",
            Self::Scale => "scale",
            Self::Thumb => "thumb",
        }
    }
}

/// Focus point for cropping (`g_` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    Auto,
    Center,
    Face,
    North,
    South,
    East,
    West,
}

impl Gravity {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Center => "center",
            Self::Face => "face",
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

/// A set of transformation parameters. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Transformation {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<Crop>,
    pub gravity: Option<Gravity>,
    /// `auto` or 1-100.
    pub quality: Option<String>,
    /// `auto` or an extension such as `webp`.
    pub format: Option<String>,
}

impl Transformation {
    /// Square-ish grid thumbnail.
    #[must_use]
    pub fn thumbnail() -> Self {
        Self {
            width: Some(300),
            height: Some(300),
            crop: Some(Crop::Fill),
            gravity: Some(Gravity::Auto),
            quality: Some("auto".to_string()),
            format: Some("auto".to_string()),
        }
    }

    /// Full-width hero image, never upscaled.
    #[must_use]
    pub fn hero() -> Self {
        Self {
            width: Some(1600),
            height: None,
            crop: Some(Crop::Limit),
            gravity: None,
            quality: Some("auto".to_string()),
            format: Some("auto".to_string()),
        }
    }

    /// Render the URL segment; empty when nothing is set.
    #[must_use]
    pub fn to_segment(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("w_{w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("h_{h}"));
        }
        if let Some(c) = self.crop {
            parts.push(format!("c_{}", c.as_str()));
        }
        if let Some(g) = self.gravity {
            parts.push(format!("g_{}", g.as_str()));
        }
        if let Some(q) = sanitized(self.quality.as_deref()) {
            parts.push(format!("q_{q}"));
        }
        if let Some(f) = sanitized(self.format.as_deref()) {
            parts.push(format!("f_{f}"));
        }
        parts.join(",")
    }
}

/// Keep free-form values to `[a-z0-9:]` so they cannot break the URL.
fn sanitized(value: Option<&str>) -> Option<String> {
    let value = value?.trim().to_ascii_lowercase();
    (!value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ':'))
    .then_some(value)
}

/// Build `https://res.cloudinary.com/{cloud}/{type}/upload/{segment}/{public_id}`.
#[must_use]
pub fn delivery_url(
    delivery_base: &str,
    cloud_name: &str,
    kind: MediaKind,
    public_id: &str,
    transformation: &Transformation,
) -> String {
    let segment = transformation.to_segment();
    let public_id = public_id.trim_start_matches('/');
    if segment.is_empty() {
        format!(
            "{delivery_base}/{cloud_name}/{}/upload/{public_id}",
            kind.resource_type()
        )
    } else {
        format!(
            "{delivery_base}/{cloud_name}/{}/upload/{segment}/{public_id}",
            kind.resource_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://res.cloudinary.com";

    #[test]
    fn thumbnail_segment_order() {
        assert_eq!(
            Transformation::thumbnail().to_segment(),
            "w_300,h_300,c_fill,g_auto,q_auto,f_auto"
        );
    }

    #[test]
    fn builds_transformed_url() {
        let url = delivery_url(
            BASE,
            "folio-demo",
            MediaKind::Image,
            "portfolio/hero",
            &Transformation::hero(),
        );
        assert_eq!(
            url,
            "https://res.cloudinary.com/folio-demo/image/upload/w_1600,c_limit,q_auto,f_auto/portfolio/hero"
        );
    }

    #[test]
    fn empty_transformation_omits_segment() {
        let url = delivery_url(
            BASE,
            "folio-demo",
            MediaKind::Video,
            "portfolio/demo",
            &Transformation::default(),
        );
        assert_eq!(
            url,
            "https://res.cloudinary.com/folio-demo/video/upload/portfolio/demo"
        );
    }

    #[test]
    fn free_form_values_are_sanitized() {
        let t = Transformation {
            quality: Some("80".to_string()),
            format: Some("webp/../../x".to_string()),
            ..Default::default()
        };
        assert_eq!(t.to_segment(), "q_80");
    }
}
