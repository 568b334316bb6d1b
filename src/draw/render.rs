use crate::draw::input::Segment;
use crate::draw::model::Color;
use crate::draw::surface::RasterSurface;

const WIDE_STROKE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentRenderPath {
    DenseStamp,
    CapsuleRaster,
}

fn select_segment_render_path(segment: Segment, stroke_width: u32) -> SegmentRenderPath {
    if stroke_width < WIDE_STROKE_THRESHOLD {
        return SegmentRenderPath::DenseStamp;
    }
    let dx = segment.to.0 as i64 - segment.from.0 as i64;
    let dy = segment.to.1 as i64 - segment.from.1 as i64;
    if dx * dx + dy * dy <= 2 {
        SegmentRenderPath::DenseStamp
    } else {
        SegmentRenderPath::CapsuleRaster
    }
}

/// Rasterises one round-capped segment and returns the number of pixel writes.
pub fn draw_segment(
    surface: &mut RasterSurface,
    segment: Segment,
    color: Color,
    stroke_width: u32,
) -> u64 {
    let stroke_width = stroke_width.max(1);
    let pad = (stroke_width.saturating_sub(1) / 2) as i64 + 1;
    let Some(segment) = clip_segment(segment, surface, pad) else {
        return 0;
    };
    match select_segment_render_path(segment, stroke_width) {
        SegmentRenderPath::DenseStamp => draw_segment_dense_stamped(surface, segment, color, stroke_width),
        SegmentRenderPath::CapsuleRaster => draw_segment_capsule(surface, segment, color, stroke_width),
    }
}

/// Liang-Barsky clip against the surface grown by `pad` on every side, so the
/// rasterisers only ever walk coordinates near the surface.
fn clip_segment(segment: Segment, surface: &RasterSurface, pad: i64) -> Option<Segment> {
    let (x_min, y_min) = (-pad as f64, -pad as f64);
    let x_max = surface.width() as i64 - 1 + pad;
    let y_max = surface.height() as i64 - 1 + pad;
    let (x0, y0) = (segment.from.0 as f64, segment.from.1 as f64);
    let (dx, dy) = (
        segment.to.0 as f64 - x0,
        segment.to.1 as f64 - y0,
    );

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - x_min),
        (dx, x_max as f64 - x0),
        (-dy, y0 - y_min),
        (dy, y_max as f64 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| ((x0 + dx * t).round() as i32, (y0 + dy * t).round() as i32);
    Some(Segment {
        from: if t0 > 0.0 { at(t0) } else { segment.from },
        to: if t1 < 1.0 { at(t1) } else { segment.to },
    })
}

fn draw_segment_dense_stamped(
    surface: &mut RasterSurface,
    segment: Segment,
    color: Color,
    stroke_width: u32,
) -> u64 {
    let (mut x0, mut y0) = segment.from;
    let (x1, y1) = segment.to;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut operations: u64 = 0;

    loop {
        operations = operations.saturating_add(draw_brush(surface, (x0, y0), color, stroke_width));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    operations
}

fn draw_segment_capsule(
    surface: &mut RasterSurface,
    segment: Segment,
    color: Color,
    stroke_width: u32,
) -> u64 {
    let radius = (stroke_width.saturating_sub(1) / 2) as f32;
    let pad = radius.ceil() as i32 + 1;
    let x_lo = (segment.from.0.min(segment.to.0) - pad).max(0);
    let y_lo = (segment.from.1.min(segment.to.1) - pad).max(0);
    let x_hi = (segment.from.0.max(segment.to.0) + pad).min(surface.width() as i32 - 1);
    let y_hi = (segment.from.1.max(segment.to.1) + pad).min(surface.height() as i32 - 1);

    let radius_sq = radius * radius;
    let mut operations: u64 = 0;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if point_segment_distance_sq((x, y), segment) <= radius_sq {
                surface.set_pixel(x, y, color);
                operations = operations.saturating_add(1);
            }
        }
    }
    operations
}

fn point_segment_distance_sq(point: (i32, i32), segment: Segment) -> f32 {
    let px = point.0 as f32;
    let py = point.1 as f32;
    let x0 = segment.from.0 as f32;
    let y0 = segment.from.1 as f32;
    let vx = segment.to.0 as f32 - x0;
    let vy = segment.to.1 as f32 - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        let dx = px - x0;
        let dy = py - y0;
        return dx * dx + dy * dy;
    }
    let t = (((px - x0) * vx + (py - y0) * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}

fn draw_brush(surface: &mut RasterSurface, center: (i32, i32), color: Color, stroke_width: u32) -> u64 {
    let radius = (stroke_width.saturating_sub(1) / 2) as i32;
    let mut writes: u64 = 0;
    for y in (center.1 - radius)..=(center.1 + radius) {
        for x in (center.0 - radius)..=(center.0 + radius) {
            let dx = x - center.0;
            let dy = y - center.1;
            if dx * dx + dy * dy <= radius * radius {
                surface.set_pixel(x, y, color);
                writes = writes.saturating_add(1);
            }
        }
    }
    writes
}
