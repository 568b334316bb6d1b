use crate::draw::model::Color;
use anyhow::{bail, Context, Result};
use std::io::Cursor;

/// RGBA8 pixel buffer sized to the viewport.
///
/// Freshly created, resized and cleared surfaces are fully transparent; the
/// background colour is only what the eraser paints with in
/// [`EraserMode::PaintBackground`](crate::draw::model::EraserMode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    background: Color,
    pixels: Vec<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self> {
        let len = buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            background,
            pixels: vec![0u8; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Resizing discards all content.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let len = buffer_len(width, height)?;
        self.width = width;
        self.height = height;
        self.pixels = vec![0u8; len];
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    /// Writes `color` at `(x, y)`; coordinates outside the surface are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn opaque_pixel_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .context("surface buffer does not match its dimensions")?;
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .context("encode surface snapshot as png")?;
        Ok(out.into_inner())
    }
}

fn buffer_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        bail!("raster surface needs a non-zero area, got {width}x{height}");
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .with_context(|| format!("raster surface {width}x{height} is too large"))
}
