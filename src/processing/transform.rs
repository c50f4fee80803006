//! Quad placement math: aspect-fit base corners, commit arithmetic and the
//! per-frame scale/translate/rotate evaluation.

use bytemuck::{Pod, Zeroable};

/// A 2D point or displacement in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotate counter-clockwise about the origin by `angle` radians.
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: cos * self.x - sin * self.y,
            y: sin * self.x + cos * self.y,
        }
    }

    pub fn scaled(self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }

    pub fn offset(self, by: Self) -> Self {
        Self {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }

    pub fn delta_from(self, origin: Self) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// Convert a cursor position in window pixels to normalized device coordinates.
pub fn pixel_to_ndc(px: f64, py: f64, width: u32, height: u32) -> Point {
    let w = f64::from(width.max(1));
    let h = f64::from(height.max(1));
    Point {
        x: 2.0 * px / w - 1.0,
        y: 1.0 - 2.0 * py / h,
    }
}

/// The quad's four persisted corners, in the order
/// `(-x,-y)`, `(+x,+y)`, `(-x,+y)`, `(+x,-y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCorners(pub [Point; 4]);

impl QuadCorners {
    /// Axis-aligned corners fitting an image of `width`×`height` so its longer
    /// side spans `[-1, 1]`.
    pub fn fit_image(width: u32, height: u32) -> Self {
        let w = f64::from(width.max(1));
        let h = f64::from(height.max(1));
        let (cx, cy) = if h >= w { (w / h, 1.0) } else { (1.0, h / w) };
        Self::from_half_extent(cx, cy)
    }

    pub fn from_half_extent(cx: f64, cy: f64) -> Self {
        Self([
            Point::new(-cx, -cy),
            Point::new(cx, cy),
            Point::new(-cx, cy),
            Point::new(cx, -cy),
        ])
    }

    /// Fold a pending scale and drag into the persisted corners.
    pub fn commit(&mut self, scale: f64, drag: Point) {
        for corner in &mut self.0 {
            *corner = corner.scaled(scale).offset(drag);
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for corner in &mut self.0 {
            *corner = corner.scaled(factor);
        }
    }

    /// Apply scale and drag, then rotate about the origin.
    pub fn evaluate(&self, rotation: f64, scale: f64, drag: Point) -> Self {
        Self(self.0.map(|c| c.scaled(scale).offset(drag).rotated(rotation)))
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

// Image row 0 is the top, so the (-,-) corner samples v = 1.
const CORNER_UV: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 0.0], [0.0, 0.0], [1.0, 1.0]];
const TRIANGLES: [usize; 6] = [0, 1, 2, 0, 1, 3];

/// Expand four corners into two triangles with texture coordinates.
#[allow(clippy::cast_possible_truncation)]
pub fn triangle_list(corners: &QuadCorners) -> [QuadVertex; 6] {
    TRIANGLES.map(|i| {
        let p = corners.0[i];
        QuadVertex {
            pos: [p.x as f32, p.y as f32],
            uv: CORNER_UV[i],
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn tall_image_fits_height() {
        let c = QuadCorners::fit_image(200, 400);
        assert!(close(c.0[1], Point::new(0.5, 1.0)));
    }

    #[test]
    fn wide_image_fits_width() {
        let c = QuadCorners::fit_image(800, 200);
        assert!(close(c.0[1], Point::new(1.0, 0.25)));
        assert!(close(c.0[0], Point::new(-1.0, -0.25)));
    }

    #[test]
    fn degenerate_size_falls_back_to_unit_square() {
        let c = QuadCorners::fit_image(0, 0);
        assert_eq!(c, QuadCorners::from_half_extent(1.0, 1.0));
    }

    #[test]
    fn pixel_center_is_origin() {
        let p = pixel_to_ndc(256.0, 256.0, 512, 512);
        assert!(close(p, Point::ZERO));
        let top_left = pixel_to_ndc(0.0, 0.0, 512, 512);
        assert!(close(top_left, Point::new(-1.0, 1.0)));
    }

    #[test]
    fn evaluate_scales_before_rotating() {
        let c = QuadCorners::from_half_extent(1.0, 1.0);
        let out = c.evaluate(FRAC_PI_2, 2.0, Point::new(1.0, 0.0));
        // (1,1)*2 + (1,0) = (3,2), rotated a quarter turn -> (-2,3)
        assert!(close(out.0[1], Point::new(-2.0, 3.0)));
    }

    #[test]
    fn triangles_share_the_diagonal() {
        let verts = triangle_list(&QuadCorners::from_half_extent(1.0, 0.5));
        assert_eq!(verts[0], verts[3]);
        assert_eq!(verts[1], verts[4]);
        assert_eq!(verts[5].pos, [1.0, -0.5]);
        assert_eq!(verts[5].uv, [1.0, 1.0]);
    }
}
