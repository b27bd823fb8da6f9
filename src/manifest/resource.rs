//! File-extension classification for manifest resources.
//!
//! Classification runs once per resource at ingestion time; the
//! resolver and tag renderer only ever read the stored result.

use std::sync::LazyLock;

use regex::Regex;

use super::ResourceType;

static IS_JS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[cm]?js(\?[^.]+)?$").unwrap());
static HAS_EXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^./]+\.[^./]+$").unwrap());
static IS_CSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(css|postcss|sass|scss|less|stylus|styl)(\?[^.]+)?$").unwrap());

/// True for JavaScript output paths. Extension-less paths count as JS,
/// matching how webpack names runtime chunks.
pub fn is_js(file: &str) -> bool {
    IS_JS_RE.is_match(file) || !HAS_EXT_RE.is_match(file)
}

/// True for stylesheet output paths, including preprocessor extensions.
pub fn is_css(file: &str) -> bool {
    IS_CSS_RE.is_match(file)
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "svg", "gif", "webp", "ico"];
const FONT_EXTENSIONS: &[&str] = &["woff", "woff2", "ttf", "otf", "eot"];
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "aiff", "aif", "au", "raw", "vox", "opus",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "ogv", "mkv", "avi", "mov", "flv", "wmv", "mpg", "mpeg", "m4v", "3gp", "3g2",
    "mxf", "rm", "rmvb", "asf", "asx", "m3u8", "m3u", "pls", "cue",
];

/// Map a file extension to its preload `as=` classification.
///
/// Not exhaustive; extensions outside the common cases return `None`
/// and the resource is emitted without an `as=` attribute.
pub fn resource_type_for_extension(ext: &str) -> Option<ResourceType> {
    match ext {
        "js" | "cjs" | "mjs" => Some(ResourceType::Script),
        "css" => Some(ResourceType::Style),
        _ if IMAGE_EXTENSIONS.contains(&ext) => Some(ResourceType::Image),
        _ if FONT_EXTENSIONS.contains(&ext) => Some(ResourceType::Font),
        _ if AUDIO_EXTENSIONS.contains(&ext) => Some(ResourceType::Audio),
        _ if VIDEO_EXTENSIONS.contains(&ext) => Some(ResourceType::Video),
        _ => None,
    }
}

/// MIME type for `type=` attributes on preload/prefetch hints.
///
/// Only fonts and images carry one; a few image extensions do not map
/// one-for-one onto their MIME name.
pub fn mime_type_for(resource_type: Option<ResourceType>, extension: &str) -> Option<String> {
    match resource_type {
        Some(ResourceType::Font) => Some(format!("font/{extension}")),
        Some(ResourceType::Image) => Some(match extension {
            "ico" => "image/x-icon".to_string(),
            "jpg" => "image/jpeg".to_string(),
            "svg" => "image/svg+xml".to_string(),
            _ => format!("image/{extension}"),
        }),
        _ => None,
    }
}

/// Classification of one output path, derived purely from its
/// extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResource {
    /// The path that was classified.
    pub path: String,
    /// True for `.mjs` outputs, which load as ES modules.
    pub is_module: bool,
    /// Preload `as=` classification, if the extension is recognized.
    pub resource_type: Option<ResourceType>,
    /// MIME type for the `type=` attribute, if one applies.
    pub mime_type: Option<String>,
}

/// Classify an output path by extension, ignoring any query string.
pub fn parse_resource(path: &str) -> ParsedResource {
    let without_query = path.split('?').next().unwrap_or(path);
    let extension = without_query.rsplit('.').next().unwrap_or("");
    // A path with no dot yields itself from rsplit; treat that as no
    // extension.
    let extension = if extension == without_query { "" } else { extension };
    let resource_type = resource_type_for_extension(extension);
    ParsedResource {
        path: path.to_string(),
        is_module: extension == "mjs",
        resource_type,
        mime_type: mime_type_for(resource_type, extension),
    }
}
