use geo_types::Coord;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;

/// Mask value for pixels inside the polygon.
pub const MASK_ON: u8 = 255;

/// Clamp every point into `[0, width-1] x [0, height-1]`.
pub fn clamp_polygon(polygon: &[Coord<i32>], width: u32, height: u32) -> Vec<Coord<i32>> {
    let max_x = i32::try_from(width.saturating_sub(1)).unwrap_or(i32::MAX);
    let max_y = i32::try_from(height.saturating_sub(1)).unwrap_or(i32::MAX);
    polygon
        .iter()
        .map(|p| Coord {
            x: p.x.clamp(0, max_x),
            y: p.y.clamp(0, max_y),
        })
        .collect()
}

/// Rasterize a closed polygon into a `width x height` binary mask.
///
/// The interior is filled with the even-odd rule and the edges themselves are
/// drawn too, so boundary pixels are always set. Points are clamped into the
/// image first; the caller's polygon is left untouched.
pub fn rasterize_polygon(polygon: &[Coord<i32>], width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if polygon.is_empty() || width == 0 || height == 0 {
        return mask;
    }

    let points = clamp_polygon(polygon, width, height);
    fill_even_odd(&mut mask, &points);

    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        draw_line_segment_mut(
            &mut mask,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            Luma([MASK_ON]),
        );
    }

    mask
}

/// Tight bounds `((min_x, min_y), (max_x, max_y))` of the positive pixels,
/// or `None` for an empty mask.
pub fn mask_bounds(mask: &GrayImage) -> Option<((u32, u32), (u32, u32))> {
    let mut bounds: Option<((u32, u32), (u32, u32))> = None;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => ((x, y), (x, y)),
            Some(((x0, y0), (x1, y1))) => ((x0.min(x), y0.min(y)), (x1.max(x), y1.max(y))),
        });
    }
    bounds
}

/// Scanline fill. Points must already lie inside the mask.
fn fill_even_odd(mask: &mut GrayImage, points: &[Coord<i32>]) {
    let (Some(y_min), Some(y_max)) = (
        points.iter().map(|p| p.y).min(),
        points.iter().map(|p| p.y).max(),
    ) else {
        return;
    };
    let max_x = mask.width() as i64 - 1;

    let n = points.len();
    let mut intersections: Vec<f64> = Vec::with_capacity(n);
    for y in y_min..=y_max {
        intersections.clear();
        for i in 0..n {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            // half-open in y so shared vertices are counted once
            if (p1.y <= y && y < p2.y) || (p2.y <= y && y < p1.y) {
                let t = f64::from(y - p1.y) / f64::from(p2.y - p1.y);
                intersections.push(f64::from(p1.x) + t * f64::from(p2.x - p1.x));
            }
        }
        intersections.sort_by(|a, b| a.total_cmp(b));

        for span in intersections.chunks_exact(2) {
            let from = (span[0].ceil() as i64).max(0);
            let to = (span[1].floor() as i64).min(max_x);
            for x in from..=to {
                mask.put_pixel(x as u32, y as u32, Luma([MASK_ON]));
            }
        }
    }
}
