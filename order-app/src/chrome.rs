//! Headless Chrome rasterizer.

use async_trait::async_trait;
use base64::Engine as _;
use headless_chrome::{Browser, LaunchOptions, protocol::cdp::Page};
use order_core::export::{
    CaptureError, CaptureOptions, FORM_ROOT_ID, OrderDocument, READY_MARKER_ID, Rasterizer,
};
use tracing::debug;

/// Initial window height; the capture clip follows the document instead.
const WINDOW_HEIGHT: u32 = 1200;

/// Renders documents in a fresh headless Chrome per capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeRasterizer;

fn render(err: impl std::fmt::Display) -> CaptureError {
    CaptureError::Render(err.to_string())
}

fn capture_blocking(
    html: String,
    options: CaptureOptions,
) -> Result<Vec<u8>, CaptureError> {
    let launch = LaunchOptions::default_builder()
        .headless(true)
        .window_size(Some((options.width_px, WINDOW_HEIGHT)))
        .build()
        .map_err(|e| render(format!("Failed to build launch options: {e}")))?;
    let browser =
        Browser::new(launch).map_err(|e| render(format!("Failed to launch browser: {e}")))?;
    let tab = browser
        .new_tab()
        .map_err(|e| render(format!("Failed to create tab: {e}")))?;

    let url = format!(
        "data:text/html;charset=utf-8;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(html)
    );
    tab.navigate_to(&url)
        .map_err(|e| render(format!("Navigation failed: {e}")))?
        .wait_until_navigated()
        .map_err(|e| render(format!("Wait for navigation failed: {e}")))?;

    // Layout has settled once the trailing marker exists and web fonts
    // have finished loading.
    tab.wait_for_element(&format!("#{READY_MARKER_ID}"))
        .map_err(|e| render(format!("Document never became ready: {e}")))?;
    tab.evaluate("document.fonts.ready.then(() => true)", true)
        .map_err(|e| render(format!("Waiting for fonts failed: {e}")))?;

    let height = tab
        .evaluate(
            &format!("document.getElementById('{FORM_ROOT_ID}').scrollHeight"),
            false,
        )
        .map_err(|e| render(format!("Measuring the document failed: {e}")))?
        .value
        .and_then(|value| value.as_f64())
        .filter(|height| *height > 0.0)
        .ok_or_else(|| render("Document has no height"))?;

    let clip = Page::Viewport {
        x: 0.0,
        y: 0.0,
        width: f64::from(options.width_px),
        height,
        scale: options.pixel_ratio,
    };
    let png = tab
        .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
        .map_err(|e| CaptureError::Rasterize(format!("Screenshot failed: {e}")))?;

    debug!(height, bytes = png.len(), "captured order document");
    Ok(png)
}

#[async_trait]
impl Rasterizer for ChromeRasterizer {
    async fn rasterize(
        &self,
        document: &OrderDocument,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>, CaptureError> {
        let html = document.html().to_string();
        let options = CaptureOptions {
            width_px: document.width_px(),
            ..*options
        };
        tokio::task::spawn_blocking(move || capture_blocking(html, options))
            .await
            .map_err(|e| render(format!("Capture task failed: {e}")))?
    }
}
