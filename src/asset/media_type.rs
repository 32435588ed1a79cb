use std::path::Path;

/// Media types accepted as operation inputs or produced as outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Bmp,
    Doc,
    Docx,
    Gif,
    Htm,
    Html,
    Jpeg,
    Jpg,
    Json,
    Png,
    Ppt,
    Pptx,
    Pdf,
    Rtf,
    Tif,
    Tiff,
    Txt,
    Xls,
    Xlsx,
    Zip,
}

const MEDIA_TYPES: &[(MediaType, &str, &str)] = &[
    (MediaType::Bmp, "bmp", "image/bmp"),
    (MediaType::Doc, "doc", "application/msword"),
    (
        MediaType::Docx,
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (MediaType::Gif, "gif", "image/gif"),
    (MediaType::Htm, "htm", "text/html"),
    (MediaType::Html, "html", "text/html"),
    (MediaType::Jpeg, "jpeg", "image/jpeg"),
    (MediaType::Jpg, "jpg", "image/jpeg"),
    (MediaType::Json, "json", "application/json"),
    (MediaType::Png, "png", "image/png"),
    (MediaType::Ppt, "ppt", "application/vnd.ms-powerpoint"),
    (
        MediaType::Pptx,
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (MediaType::Pdf, "pdf", "application/pdf"),
    (MediaType::Rtf, "rtf", "text/rtf"),
    (MediaType::Tif, "tif", "image/tiff"),
    (MediaType::Tiff, "tiff", "image/tiff"),
    (MediaType::Txt, "txt", "text/plain"),
    (MediaType::Xls, "xls", "application/vnd.ms-excel"),
    (
        MediaType::Xlsx,
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (MediaType::Zip, "zip", "application/zip"),
];

impl MediaType {
    pub fn mime_type(&self) -> &'static str {
        MEDIA_TYPES[*self as usize].2
    }

    pub fn extension(&self) -> &'static str {
        MEDIA_TYPES[*self as usize].1
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        MEDIA_TYPES
            .iter()
            .find(|(_, e, _)| *e == ext)
            .map(|(m, _, _)| *m)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension for a MIME type; the first table row wins.
    pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
        let mime = mime.split(';').next().unwrap_or_default().trim();
        MEDIA_TYPES
            .iter()
            .find(|(_, _, m)| m.eq_ignore_ascii_case(mime))
            .map(|(_, e, _)| *e)
    }
}
