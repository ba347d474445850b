use stencil_fast_types::{BinaryMask, PixelPoint};

pub fn disk_radius(bridge_width: u32) -> usize {
    (f64::from(bridge_width) / 2.0).round().max(1.0) as usize
}

/// Sets every pixel within `radius` of `center` to ink, clipped to the mask.
pub fn paint_disk(mask: &mut BinaryMask, center: PixelPoint, radius: usize) {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return;
    }

    let cx = center.x as isize;
    let cy = center.y as isize;
    let r = radius as isize;
    let r2 = r * r;
    let start_y = (cy - r).max(0);
    let end_y = (cy + r).min(height as isize - 1);

    for y in start_y..=end_y {
        let dy = y - cy;
        let dx_limit = ((r2 - dy * dy).max(0) as f64).sqrt().floor() as isize;
        let start_x = (cx - dx_limit).max(0);
        let end_x = (cx + dx_limit).min(width as isize - 1);
        if start_x > end_x {
            continue;
        }
        let row = y as usize * width;
        for x in start_x as usize..=end_x as usize {
            mask.set_ink(row + x);
        }
    }
}

/// Draws a `bridge_width`-wide stroke between two pixels by stamping a disk
/// at every Bresenham step.
pub fn draw_bridge(mask: &mut BinaryMask, from: PixelPoint, to: PixelPoint, bridge_width: u32) {
    let radius = disk_radius(bridge_width);
    let (x1, y1) = (to.x as isize, to.y as isize);
    let mut x = from.x as isize;
    let mut y = from.y as isize;
    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        paint_disk(mask, PixelPoint::new(x as usize, y as usize), radius);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = err * 2;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}
