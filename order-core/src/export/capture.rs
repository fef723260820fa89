use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;

use super::document::{CANONICAL_WIDTH_PX, OrderDocument};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The rendering engine could not be started or could not load the document.
    #[error("Rendering failed: {0}")]
    Render(String),

    /// The page loaded but the screenshot could not be taken.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// The captured bytes are not a usable PNG.
    #[error("Captured image is invalid: {0}")]
    Image(String),
}

/// How the document is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Layout width in CSS pixels.
    pub width_px: u32,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f64,
}

impl CaptureOptions {
    pub const MIN_PIXEL_RATIO: f64 = 2.0;

    /// Sets the pixel ratio, never below [`Self::MIN_PIXEL_RATIO`].
    pub fn with_pixel_ratio(
        mut self,
        ratio: f64,
    ) -> Self {
        self.pixel_ratio = if ratio.is_finite() {
            ratio.max(Self::MIN_PIXEL_RATIO)
        } else {
            Self::MIN_PIXEL_RATIO
        };
        self
    }

    /// Expected pixel width of the captured image.
    pub fn output_width(&self) -> u32 {
        (f64::from(self.width_px) * self.pixel_ratio).round() as u32
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width_px: CANONICAL_WIDTH_PX,
            pixel_ratio: Self::MIN_PIXEL_RATIO,
        }
    }
}

/// Turns a rendered document into PNG bytes.
///
/// Implementations must not capture before layout has settled; a capture
/// taken too early comes out blank or truncated.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(
        &self,
        document: &OrderDocument,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>, CaptureError>;
}

/// Re-encodes a captured PNG over an opaque white background.
///
/// Any transparency left by the rendering engine is composited onto
/// white, and the result carries no alpha channel.
pub fn flatten_to_opaque_png(png: &[u8]) -> Result<Vec<u8>, CaptureError> {
    let captured = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| CaptureError::Image(e.to_string()))?
        .to_rgba8();

    let (width, height) = captured.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::Image("image has no pixels".to_string()));
    }

    let mut flattened = RgbImage::new(width, height);
    for (x, y, pixel) in captured.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let over_white =
            |channel: u8| ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        flattened.put_pixel(x, y, Rgb([over_white(r), over_white(g), over_white(b)]));
    }

    let mut encoded = Vec::new();
    flattened
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(|e| CaptureError::Image(e.to_string()))?;
    Ok(encoded)
}
