// src/urls.rs
// =============================================================================
// Small, pure helpers for working with URLs found inside pages.
//
// - url_hash: the stable hash that names every archived file
// - convert_srcset_to_url: picks one image out of a srcset attribute
// - extension_type: decides whether an image URL has a usable extension
// - resolve_url: turns a relative href into an absolute URL
//
// Nothing here touches the network or the filesystem, so everything is
// easy to unit test.
// =============================================================================

use url::Url;

// Marker written into the alt text of images we refuse to download
pub const NO_CONTENT_TYPE: &str = "noContentType";

// Hashes a URL into the number used for its local file name
//
// This is the classic 31-multiplier string hash over UTF-16 code units with
// 32-bit wrapping arithmetic. The archive viewer recomputes it from the
// seed URL, so it must never change.
//
// Example:
//   url_hash("hello") = 99162322
pub fn url_hash(url: &str) -> i32 {
    url.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

// File name of an archived page: "<hash>.html"
pub fn html_file_name(url: &str) -> String {
    format!("{}.html", url_hash(url))
}

// File name of an archived stylesheet: "<hash>.css"
pub fn css_file_name(url: &str) -> String {
    format!("{}.css", url_hash(url))
}

// File name of an archived image: "<hash>.<ext>"
pub fn image_file_name(url: &str, extension: &str) -> String {
    format!("{}.{}", url_hash(url), extension)
}

// Takes the first candidate out of a srcset attribute
//
// A srcset looks like "a.jpg 1x, b.jpg 2x". We keep everything up to the
// first space, which is the first image URL.
pub fn convert_srcset_to_url(srcset: &str) -> String {
    srcset.split(' ').next().unwrap_or("").to_string()
}

// Classifies the extension of an image URL
//
// Looks at the text after the last dot (ignoring anything after the first
// space). Returns Some(extension) when it is 3 or 4 characters long and is
// not "svg", otherwise None.
//
// Examples:
//   "photo.jpg"      -> Some("jpg")
//   "photo.jpeg 2x"  -> Some("jpeg")
//   "photo.svg"      -> None
//   "photo"          -> None
pub fn extension_type(url: &str) -> Option<String> {
    let before_space = url.split(' ').next().unwrap_or("");
    let (_, extension) = before_space.rsplit_once('.')?;

    let length = extension.chars().count();
    if (length == 3 || length == 4) && extension != "svg" {
        Some(extension.to_string())
    } else {
        None
    }
}

// Resolves a possibly-relative URL to an absolute URL
//
// Parameters:
//   base: the page the href was found on
//   href: the raw attribute value
//
// Returns: Some(absolute_url) or None if it can't be resolved
//
// Examples:
//   base = "https://www.example.com/page"
//   href = "/docs" -> Some("https://www.example.com/docs")
//   href = "https://other.com" -> Some("https://other.com/")
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(href).ok().map(|url| url.to_string()),
    }
}
