//! Pointer marker composited onto captures
//!
//! The marker is a red arrow whose tip points up-left at 45 degrees. Its tail
//! sits on the pointer position, so the anchor is the tail, not the tip.

use image::{Rgba, RgbaImage};

/// Length of the arrow shaft
pub const ARROW_LENGTH: f64 = 30.0;
/// Angle between the shaft and each arrowhead line, in degrees
pub const ARROWHEAD_ANGLE: f64 = 40.0;
/// Length of each arrowhead line
pub const ARROWHEAD_LENGTH: f64 = 15.0;
/// Stroke width of all three lines
pub const STROKE_WIDTH: f64 = 4.0;
/// Shaft direction, measured from the positive x axis towards positive y
const SHAFT_ANGLE: f64 = 45.0;

pub const ARROW_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

type Point = (f64, f64);

/// The three line segments forming the arrow anchored at `(x, y)`
pub fn arrow_segments(x: f64, y: f64) -> [(Point, Point); 3] {
    let shaft = SHAFT_ANGLE.to_radians();
    let tip = (
        x - ARROW_LENGTH * shaft.cos(),
        y - ARROW_LENGTH * shaft.sin(),
    );

    let left = (SHAFT_ANGLE - ARROWHEAD_ANGLE).to_radians();
    let right = (SHAFT_ANGLE + ARROWHEAD_ANGLE).to_radians();
    let left_end = (
        tip.0 + ARROWHEAD_LENGTH * left.cos(),
        tip.1 + ARROWHEAD_LENGTH * left.sin(),
    );
    let right_end = (
        tip.0 + ARROWHEAD_LENGTH * right.cos(),
        tip.1 + ARROWHEAD_LENGTH * right.sin(),
    );

    [((x, y), tip), (tip, left_end), (tip, right_end)]
}

/// Draw the arrow into `image` with its anchor at local `(x, y)`
pub fn draw_pointer_arrow(image: &mut RgbaImage, x: i32, y: i32) {
    for (from, to) in arrow_segments(x as f64, y as f64) {
        draw_thick_line(image, from, to, STROKE_WIDTH / 2.0, ARROW_COLOR);
    }
}

fn draw_thick_line(image: &mut RgbaImage, from: Point, to: Point, radius: f64, color: Rgba<u8>) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    // Half-pixel steps leave no gaps between stamps
    let steps = (length * 2.0).ceil().max(1.0) as usize;

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        stamp_disc(image, from.0 + dx * t, from.1 + dy * t, radius, color);
    }
}

fn stamp_disc(image: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let x_min = ((cx - radius).floor() as i64).max(0);
    let x_max = ((cx + radius).ceil() as i64).min(width - 1);
    let y_min = ((cy - radius).floor() as i64).max(0);
    let y_max = ((cy + radius).ceil() as i64).min(height - 1);

    for py in y_min..=y_max {
        for px in x_min..=x_max {
            let (ddx, ddy) = (px as f64 - cx, py as f64 - cy);
            if ddx * ddx + ddy * ddy <= radius * radius {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn segments_share_the_tip() {
        let [shaft, head_l, head_r] = arrow_segments(100.0, 100.0);
        assert_eq!(shaft.0, (100.0, 100.0));
        assert_eq!(shaft.1, head_l.0);
        assert_eq!(shaft.1, head_r.0);

        let (tx, ty) = shaft.1;
        let expected = 100.0 - ARROW_LENGTH / 2f64.sqrt();
        assert!((tx - expected).abs() < 1e-9);
        assert!((ty - expected).abs() < 1e-9);
    }

    #[test]
    fn arrow_is_drawn_at_anchor_and_along_shaft() {
        let mut img = RgbaImage::from_pixel(200, 200, WHITE);
        draw_pointer_arrow(&mut img, 100, 100);

        assert_eq!(*img.get_pixel(100, 100), ARROW_COLOR);
        assert_eq!(*img.get_pixel(90, 90), ARROW_COLOR);
        assert_eq!(*img.get_pixel(180, 20), WHITE);
        assert_eq!(*img.get_pixel(120, 120), WHITE);
    }

    #[test]
    fn drawing_near_the_border_is_clipped() {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        draw_pointer_arrow(&mut img, 2, 2);
        assert_eq!(*img.get_pixel(2, 2), ARROW_COLOR);
    }
}
