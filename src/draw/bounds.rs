use crate::draw::surface::RasterSurface;

/// Inclusive pixel rectangle. `min_x <= max_x` and `min_y <= max_y` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// Zero-size box on the surface centre pixel.
    pub fn surface_center(surface: &RasterSurface) -> Self {
        let x = surface.width() / 2;
        let y = surface.height() / 2;
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) as f32 / 2.0,
            (self.min_y + self.max_y) as f32 / 2.0,
        )
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Tight box around every pixel with non-zero alpha, or `None` for a blank surface.
pub fn scan_content_bounds(surface: &RasterSurface) -> Option<BoundingBox> {
    let width = surface.width() as usize;
    let mut bounds: Option<BoundingBox> = None;

    for (y, row) in surface.pixels().chunks_exact(width * 4).enumerate() {
        let mut columns = row
            .chunks_exact(4)
            .enumerate()
            .filter(|(_, px)| px[3] > 0)
            .map(|(x, _)| x as u32);
        let Some(first) = columns.next() else {
            continue;
        };
        let last = columns.last().unwrap_or(first);
        let y = y as u32;

        bounds = Some(match bounds {
            None => BoundingBox {
                min_x: first,
                min_y: y,
                max_x: last,
                max_y: y,
            },
            Some(b) => BoundingBox {
                min_x: b.min_x.min(first),
                min_y: b.min_y,
                max_x: b.max_x.max(last),
                max_y: y,
            },
        });
    }

    bounds
}

pub fn scan_bounds_or_center(surface: &RasterSurface) -> BoundingBox {
    scan_content_bounds(surface).unwrap_or_else(|| BoundingBox::surface_center(surface))
}
