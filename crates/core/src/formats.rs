//! Output formats and the input-kind compatibility table.
//!
//! A *kind* is a MIME-like string describing a source file (`image/png`,
//! `text/csv`, ...). Each kind maps to a fixed set of output formats; unknown
//! kinds map to an empty set.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PDF_KIND: &str = "application/pdf";
pub const DOCX_KIND: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX_KIND: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const FALLBACK_KIND: &str = "application/octet-stream";

/// A format a batch can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
    Bmp,
    Pdf,
    Txt,
    Docx,
    Html,
    Xlsx,
    Json,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 10] = [
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::Webp,
        TargetFormat::Bmp,
        TargetFormat::Pdf,
        TargetFormat::Txt,
        TargetFormat::Docx,
        TargetFormat::Html,
        TargetFormat::Xlsx,
        TargetFormat::Json,
    ];

    /// File extension, also used as the output kind label.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Pdf => "pdf",
            TargetFormat::Txt => "txt",
            TargetFormat::Docx => "docx",
            TargetFormat::Html => "html",
            TargetFormat::Xlsx => "xlsx",
            TargetFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Jpg => "image/jpeg",
            TargetFormat::Png => "image/png",
            TargetFormat::Webp => "image/webp",
            TargetFormat::Bmp => "image/bmp",
            TargetFormat::Pdf => PDF_KIND,
            TargetFormat::Txt => "text/plain",
            TargetFormat::Docx => DOCX_KIND,
            TargetFormat::Html => "text/html",
            TargetFormat::Xlsx => XLSX_KIND,
            TargetFormat::Json => "application/json",
        }
    }

    /// Raster format for image targets, `None` for document targets.
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            TargetFormat::Jpg => Some(image::ImageFormat::Jpeg),
            TargetFormat::Png => Some(image::ImageFormat::Png),
            TargetFormat::Webp => Some(image::ImageFormat::WebP),
            TargetFormat::Bmp => Some(image::ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn is_image(self) -> bool {
        self.image_format().is_some()
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        let ext = s.trim().trim_start_matches('.').to_ascii_lowercase();
        if ext == "jpeg" {
            return Ok(TargetFormat::Jpg);
        }
        TargetFormat::ALL
            .into_iter()
            .find(|format| format.extension() == ext)
            .ok_or_else(|| ConversionError::UnknownFormat(s.to_string()))
    }
}

use TargetFormat::*;

/// Input kind to permitted output formats.
const CONVERSION_MAP: &[(&str, &[TargetFormat])] = &[
    // Images
    ("image/jpeg", &[Png, Webp]),
    ("image/png", &[Jpg, Webp]),
    ("image/webp", &[Jpg, Png]),
    ("image/bmp", &[Jpg, Png, Webp]),
    // Documents
    ("text/plain", &[Pdf, Docx]),
    ("text/html", &[Pdf, Docx]),
    ("application/json", &[Txt, Pdf]),
    ("application/xml", &[Txt, Pdf]),
    ("text/xml", &[Txt, Pdf]),
    ("text/csv", &[Pdf, Xlsx]),
    // Text extraction only
    (PDF_KIND, &[Txt]),
    (DOCX_KIND, &[Pdf, Txt, Html]),
];

/// Output formats permitted for an input kind. Empty for unknown kinds.
pub fn allowed_targets(kind: &str) -> &'static [TargetFormat] {
    CONVERSION_MAP
        .iter()
        .find(|(input, _)| *input == kind)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Whether the table permits converting `kind` into `target`.
pub fn is_conversion_supported(kind: &str, target: TargetFormat) -> bool {
    allowed_targets(kind).contains(&target)
}

pub fn is_image_kind(kind: &str) -> bool {
    kind.starts_with("image/")
}

/// Kinds whose content is read as text before conversion.
pub fn is_text_kind(kind: &str) -> bool {
    matches!(
        kind,
        "text/plain" | "text/html" | "text/csv" | "application/json" | "application/xml" | "text/xml"
    )
}

/// Images are mutually compatible; everything else must match exactly.
pub fn are_kinds_compatible(existing: &str, incoming: &str) -> bool {
    existing == incoming || (is_image_kind(existing) && is_image_kind(incoming))
}

/// Infer a kind from a file name's extension.
pub fn kind_from_file_name(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return FALLBACK_KIND;
    };
    match ext.to_ascii_lowercase().as_str() {
        "csv" => "text/csv",
        "xml" => "application/xml",
        other => other
            .parse::<TargetFormat>()
            .map(TargetFormat::mime_type)
            .unwrap_or(FALLBACK_KIND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_targets_images() {
        assert_eq!(allowed_targets("image/png"), &[Jpg, Webp]);
        assert_eq!(allowed_targets("image/jpeg"), &[Png, Webp]);
        assert_eq!(allowed_targets("image/bmp"), &[Jpg, Png, Webp]);
    }

    #[test]
    fn test_allowed_targets_documents() {
        assert_eq!(allowed_targets("text/plain"), &[Pdf, Docx]);
        assert_eq!(allowed_targets("text/csv"), &[Pdf, Xlsx]);
        assert_eq!(allowed_targets(PDF_KIND), &[Txt]);
        assert_eq!(allowed_targets(DOCX_KIND), &[Pdf, Txt, Html]);
    }

    #[test]
    fn test_allowed_targets_unknown_kind_is_empty() {
        assert!(allowed_targets("application/zip").is_empty());
        assert!(allowed_targets("").is_empty());
    }

    #[test]
    fn test_is_conversion_supported() {
        assert!(is_conversion_supported("image/png", Webp));
        assert!(!is_conversion_supported("image/png", Png));
        assert!(!is_conversion_supported("text/plain", Json));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(is_image_kind("image/webp"));
        assert!(!is_image_kind("text/plain"));
        assert!(is_text_kind("text/xml"));
        assert!(is_text_kind("application/xml"));
        assert!(is_text_kind("application/json"));
        assert!(!is_text_kind(PDF_KIND));
        assert!(!is_text_kind(DOCX_KIND));
        assert!(!is_text_kind(XLSX_KIND));
    }

    #[test]
    fn test_are_kinds_compatible() {
        assert!(are_kinds_compatible("image/png", "image/jpeg"));
        assert!(are_kinds_compatible("text/csv", "text/csv"));
        assert!(!are_kinds_compatible("text/csv", "text/plain"));
        assert!(!are_kinds_compatible("image/png", "text/plain"));
    }

    #[test]
    fn test_target_format_parse() {
        assert_eq!("webp".parse::<TargetFormat>().unwrap(), Webp);
        assert_eq!("JPEG".parse::<TargetFormat>().unwrap(), Jpg);
        assert_eq!(".docx".parse::<TargetFormat>().unwrap(), Docx);
        assert!(matches!(
            "tiff".parse::<TargetFormat>(),
            Err(ConversionError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_target_format_labels() {
        assert_eq!(Webp.to_string(), "webp");
        assert_eq!(Xlsx.mime_type(), XLSX_KIND);
        assert!(Bmp.is_image());
        assert!(!Pdf.is_image());
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(kind_from_file_name("photo.JPEG"), "image/jpeg");
        assert_eq!(kind_from_file_name("data.csv"), "text/csv");
        assert_eq!(kind_from_file_name("feed.xml"), "application/xml");
        assert_eq!(kind_from_file_name("notes.txt"), "text/plain");
        assert_eq!(kind_from_file_name("README"), FALLBACK_KIND);
        assert_eq!(kind_from_file_name("archive.zip"), FALLBACK_KIND);
    }
}
