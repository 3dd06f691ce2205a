// src/crawl/download.rs
// =============================================================================
// Asset downloads: stylesheets before the crawl, images after it.
//
// Stylesheets are fetched once from the seed page, a few at a time,
// and all of them are done before any crawl worker starts. Images are fetched by the image pool in
// the second phase; each one is decoded and re-encoded so only real images
// end up in the archive.
//
// Failures here are logged and counted, never fatal.
// =============================================================================

use futures::stream::{self, StreamExt};
use image::{DynamicImage, ImageFormat};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

use super::crawler::CrawlShared;
use crate::error::{ArchiveError, Result};
use crate::fetch::{fetch_bytes, fetch_text};
use crate::html::extract_stylesheet_urls;
use crate::urls::{css_file_name, extension_type, image_file_name};

// Downloads every stylesheet linked from the seed page
//
// Returns how many were saved.
pub(crate) async fn prefetch_stylesheets(shared: &Arc<CrawlShared>) -> usize {
    let timeout = shared.config.stylesheet_timeout;
    let root = &shared.seed;

    let body = match fetch_text(&shared.client, root, timeout).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "could not fetch seed page for stylesheets");
            shared.recovered(&e);
            return 0;
        }
    };

    // The seed was validated when the crawler was built
    let Ok(base) = Url::parse(root) else {
        return 0;
    };

    let downloads = extract_stylesheet_urls(&body, &base).into_iter().map(move |url| async move {
        let path = shared.location.css_folder().join(css_file_name(&url));
        let result = save_stylesheet(&shared.client, &url, &path, timeout).await;
        (url, path, result)
    });

    // Same bound as the worker pools
    let results: Vec<_> = stream::iter(downloads)
        .buffer_unordered(shared.config.workers)
        .collect()
        .await;

    let mut saved = 0;
    for (url, path, result) in results {
        match result {
            Ok(()) => {
                saved += 1;
                trace!(url = %url, path = %path.display(), "saved stylesheet");
            }
            Err(e) => shared.recovered(&e),
        }
    }
    saved
}

async fn save_stylesheet(client: &Client, url: &str, path: &Path, timeout: std::time::Duration) -> Result<()> {
    let css = fetch_text(client, url, timeout).await?;
    tokio::fs::write(path, css).await?;
    Ok(())
}

// Image pool job: download one image into the images folder
pub(crate) async fn download_image(shared: Arc<CrawlShared>, url: String) {
    match save_image(&shared.client, &url, shared.location.images_folder()).await {
        Ok(path) => {
            shared.counters.images_saved.fetch_add(1, Ordering::SeqCst);
            debug!(url = %url, path = %path.display(), "saved image");
        }
        Err(e) => {
            shared.counters.image_failures.fetch_add(1, Ordering::SeqCst);
            shared.recovered(&e);
        }
    }
    shared.counters.images_attempted.fetch_add(1, Ordering::SeqCst);
}

// Fetches, decodes and re-encodes one image
//
// The file is named "<hash>.<ext>" with the extension found in the URL,
// and encoded in that format.
pub async fn save_image(client: &Client, url: &str, folder: &Path) -> Result<PathBuf> {
    let extension =
        extension_type(url).ok_or_else(|| ArchiveError::decode(url, "unsupported extension"))?;
    let bytes = fetch_bytes(client, url).await?;
    let path = folder.join(image_file_name(url, &extension));

    // Decoding is CPU work; keep it off the async worker threads
    let owned_url = url.to_string();
    let target = path.clone();
    tokio::task::spawn_blocking(move || reencode(&owned_url, &bytes, &extension, &target))
        .await
        .map_err(|e| ArchiveError::decode(url, e))??;

    Ok(path)
}

fn reencode(url: &str, bytes: &[u8], extension: &str, path: &Path) -> Result<()> {
    let format = ImageFormat::from_extension(extension)
        .ok_or_else(|| ArchiveError::decode(url, format!("unsupported format .{}", extension)))?;

    let decoded = image::load_from_memory(bytes).map_err(|e| ArchiveError::decode(url, e))?;

    // JPEG has no alpha channel
    let decoded = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(decoded.to_rgb8())
    } else {
        decoded
    };

    decoded
        .save_with_format(path, format)
        .map_err(|e| ArchiveError::decode(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_reencode_png_to_jpg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.jpg");
        reencode("https://www.example.com/x.jpg", &png_bytes(), "jpg", &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_reencode_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let err = reencode("https://www.example.com/x.png", b"not an image", "png", &dir.path().join("x.png"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::DecodeFailed { .. }));
    }

    #[test]
    fn test_reencode_rejects_unknown_format() {
        let dir = TempDir::new().unwrap();
        let err = reencode("https://www.example.com/x.html", &png_bytes(), "html", &dir.path().join("x.html"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::DecodeFailed { .. }));
    }
}
