use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Clip segment `a`-`b` to the rectangle `[0, width] x [0, height]`
/// (Liang-Barsky). Returns `None` when no part of it is inside.
pub fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    width: f64,
    height: f64,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [(-dx, a.0), (dx, width - a.0), (-dy, a.1), (dy, height - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(2, 1);
        draw_line(&mut canvas, 0, 0, 3, 0);
        // top row of both cells: 0x01 | 0x08
        assert_eq!(canvas.to_string(), "⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        // left column of both cells: 0x01 | 0x02 | 0x04 | 0x40
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_offscreen_points_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        draw_line(&mut canvas, -5, 0, 0, 0);
        assert_eq!(canvas.to_string(), "⠁");
    }

    #[test]
    fn test_clip_keeps_inner_segment() {
        let clipped = clip_segment((1.0, 1.0), (3.0, 2.0), 10.0, 10.0);
        assert_eq!(clipped, Some(((1.0, 1.0), (3.0, 2.0))));
    }

    #[test]
    fn test_clip_cuts_long_segment_to_canvas() {
        let clipped = clip_segment((5.0, -1.0e6), (5.0, 1.0e6), 10.0, 8.0);
        assert_eq!(clipped, Some(((5.0, 0.0), (5.0, 8.0))));
    }

    #[test]
    fn test_clip_rejects_outside_segment() {
        assert_eq!(clip_segment((-5.0, -5.0), (-1.0, 20.0), 10.0, 10.0), None);
        assert_eq!(clip_segment((0.0, 12.0), (10.0, 11.0), 10.0, 10.0), None);
    }
}
