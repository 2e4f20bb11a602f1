use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Tags a blog upload may keep. Everything else is stripped; script and
/// style bodies are removed entirely.
const ALLOWED_TAGS: [&str; 10] = ["p", "h1", "h2", "h3", "strong", "em", "ul", "ol", "li", "br"];

/// How many leading bytes the HTML sniff looks at.
const SNIFF_WINDOW: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentFileError {
    #[error("File must be of type HTML")]
    NotHtml,
    #[error("Error reading file content - invalid format")]
    InvalidEncoding,
}

/// Validates and sanitizes an uploaded HTML file.
///
/// The upload must look like HTML (leading-bytes sniff, or the declared
/// multipart content type) and decode as UTF-8. The surviving markup is
/// limited to the allow-list above with no attributes.
pub fn sanitize_html_upload(
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, ContentFileError> {
    if !sniff_is_html(bytes) && !declared_html(content_type) {
        return Err(ContentFileError::NotHtml);
    }

    let raw = std::str::from_utf8(bytes).map_err(|_| ContentFileError::InvalidEncoding)?;
    Ok(blog_sanitizer().clean(raw).to_string())
}

fn blog_sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder.tags(HashSet::from(ALLOWED_TAGS));
    builder.tag_attributes(HashMap::new());
    builder.generic_attributes(HashSet::new());
    builder
}

fn declared_html(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    essence.eq_ignore_ascii_case("text/html")
}

/// Content-based check over the first kilobyte: the buffer has to open
/// with a recognizable HTML construct.
fn sniff_is_html(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let text = String::from_utf8_lossy(window);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let lower: String = trimmed
        .chars()
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();

    const MARKERS: [&str; 8] = [
        "<!doctype html",
        "<html",
        "<head",
        "<body",
        "<!--",
        "<p",
        "<h1",
        "<div",
    ];
    MARKERS.iter().any(|marker| lower.starts_with(marker))
}
