//! Scan-line rasterization into the context's pixel buffer
//!
//! All entry points take integer screen coordinates and reject points
//! outside the current screen size. Degenerate shapes (every point on one
//! row or one column) are skipped with a debug log rather than drawn.

use super::context::RenderContext;
use super::math::round_to_int;
use super::types::{Point2i, RasterMode};
use crate::error::RasterError;

fn is_horizontal_line(points: &[Point2i]) -> bool {
    points.windows(2).all(|w| w[0].y == w[1].y)
}

fn is_vertical_line(points: &[Point2i]) -> bool {
    points.windows(2).all(|w| w[0].x == w[1].x)
}

impl RenderContext {
    fn check_points(&self, points: &[Point2i]) -> Result<(), RasterError> {
        let (w, h) = (self.width() as i32, self.height() as i32);
        for p in points {
            if p.x < 0 || p.x >= w || p.y < 0 || p.y >= h {
                return Err(RasterError::OutOfBounds {
                    x: p.x,
                    y: p.y,
                    width: self.width(),
                    height: self.height(),
                });
            }
        }
        Ok(())
    }

    /// Write the draw color at an already validated position
    fn plot(&mut self, x: i32, y: i32) {
        debug_assert!(x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height());
        if x < 0 || y < 0 || x as usize >= self.width() || y as usize >= self.height() {
            return;
        }
        let idx = y as usize * self.pitch() + x as usize * self.bytes_per_pixel();
        let bytes = self.draw_color().to_bgra();
        self.buffer_mut()[idx..idx + 4].copy_from_slice(&bytes);
    }

    /// Inclusive span, ends in either order
    fn span(&mut self, x_start: i32, x_end: i32, y: i32) {
        let (left, right) = if x_start > x_end { (x_end, x_start) } else { (x_start, x_end) };
        for x in left..=right {
            self.plot(x, y);
        }
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32) -> Result<(), RasterError> {
        self.check_points(&[Point2i::new(x, y)])?;
        self.plot(x, y);
        Ok(())
    }

    /// Draw a line stepping along the axis with the larger delta. The minor
    /// axis advances when `major * slope - minor` exceeds one half.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), RasterError> {
        self.check_points(&[Point2i::new(x0, y0), Point2i::new(x1, y1)])?;

        let (dx, dy) = ((x1 - x0).abs(), (y1 - y0).abs());
        let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());

        if dx == dy {
            // diagonal, or a single pixel
            for i in 0..=dx {
                self.plot(x0 + i * sx, y0 + i * sy);
            }
            return Ok(());
        }

        let x_major = dx > dy;
        let (major_len, minor_len) = if x_major { (dx, dy) } else { (dy, dx) };
        let slope = minor_len as f32 / major_len as f32;

        let mut minor = 0;
        for major in 0..=major_len {
            if major as f32 * slope - minor as f32 > 0.5 {
                minor += 1;
            }
            if x_major {
                self.plot(x0 + major * sx, y0 + minor * sy);
            } else {
                self.plot(x0 + minor * sx, y0 + major * sy);
            }
        }
        Ok(())
    }

    /// Outline a closed polygon
    pub fn draw_polygon_wire(&mut self, points: &[Point2i]) -> Result<(), RasterError> {
        if points.len() < 3 {
            return Err(RasterError::TooFewPoints(points.len()));
        }
        self.check_points(points)?;

        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            self.draw_line(p.x, p.y, q.x, q.y)?;
        }
        Ok(())
    }

    pub fn draw_triangle_wire(&mut self, p0: Point2i, p1: Point2i, p2: Point2i) -> Result<(), RasterError> {
        self.draw_polygon_wire(&[p0, p1, p2])
    }

    /// Fill a triangle by splitting it at the middle vertex into a
    /// flat-bottom and a flat-top half
    pub fn draw_triangle_fill(&mut self, p0: Point2i, p1: Point2i, p2: Point2i) -> Result<(), RasterError> {
        let mut pts = [p0, p1, p2];
        self.check_points(&pts)?;

        if is_horizontal_line(&pts) || is_vertical_line(&pts) {
            log::debug!("skipping degenerate triangle {:?}", pts);
            return Ok(());
        }

        pts.sort_by_key(|p| p.y);
        let [a, b, c] = pts;

        if a.y == b.y {
            self.fill_top_flat(a, b, c)
        } else if b.y == c.y {
            self.fill_bottom_flat(a, b, c)
        } else {
            let x_split = (c.x - a.x) as f32 / (c.y - a.y) as f32 * (b.y - a.y) as f32 + a.x as f32;
            let split = Point2i::new(round_to_int(x_split), b.y);
            self.fill_bottom_flat(a, b, split)?;
            self.fill_top_flat(split, b, c)
        }
    }

    /// `top` above the horizontal edge `left`-`right`
    pub fn fill_bottom_flat(&mut self, top: Point2i, left: Point2i, right: Point2i) -> Result<(), RasterError> {
        debug_assert_eq!(left.y, right.y);
        self.check_points(&[top, left, right])?;
        if is_horizontal_line(&[top, left, right]) {
            log::debug!("skipping flat-bottom sliver at y={}", top.y);
            return Ok(());
        }

        let dy = (left.y - top.y) as f32;
        let slope_left = (left.x - top.x) as f32 / dy;
        let slope_right = (right.x - top.x) as f32 / dy;

        let mut x_start = top.x as f32;
        let mut x_end = top.x as f32;
        for y in top.y..=left.y {
            self.span(round_to_int(x_start), round_to_int(x_end), y);
            x_start += slope_left;
            x_end += slope_right;
        }
        Ok(())
    }

    /// Horizontal edge `left`-`right` above `bottom`
    pub fn fill_top_flat(&mut self, left: Point2i, right: Point2i, bottom: Point2i) -> Result<(), RasterError> {
        debug_assert_eq!(left.y, right.y);
        self.check_points(&[left, right, bottom])?;
        if is_horizontal_line(&[left, right, bottom]) {
            log::debug!("skipping flat-top sliver at y={}", bottom.y);
            return Ok(());
        }

        let dy = (bottom.y - left.y) as f32;
        let slope_left = (bottom.x - left.x) as f32 / dy;
        let slope_right = (bottom.x - right.x) as f32 / dy;

        let mut x_start = left.x as f32;
        let mut x_end = right.x as f32;
        for y in left.y..=bottom.y {
            self.span(round_to_int(x_start), round_to_int(x_end), y);
            x_start += slope_left;
            x_end += slope_right;
        }
        Ok(())
    }

    /// General scan-line fill.
    ///
    /// Two edge cursors leave the top vertex, one walking backwards through
    /// the point list and one forwards. Each cursor skips edges with no
    /// height and picks up a new edge when the scan line reaches the end of
    /// its current one. Exact for convex polygons.
    pub fn draw_polygon_fill(&mut self, points: &[Point2i]) -> Result<(), RasterError> {
        let count = points.len();
        if count < 3 {
            return Err(RasterError::TooFewPoints(count));
        }
        self.check_points(points)?;

        if is_horizontal_line(points) || is_vertical_line(points) {
            log::debug!("skipping degenerate polygon of {} points", count);
            return Ok(());
        }

        let mut top = 0;
        let mut bottom = 0;
        for (i, p) in points.iter().enumerate().skip(1) {
            if p.y < points[top].y {
                top = i;
            }
            if p.y > points[bottom].y {
                bottom = i;
            }
        }

        let mut left_end = top;
        let mut right_end = top;
        let (mut x_start, mut x_end) = (0.0f32, 0.0f32);
        let (mut slope_left, mut slope_right) = (0.0f32, 0.0f32);

        for y in points[top].y..=points[bottom].y {
            if y >= points[left_end].y {
                let mut left_start;
                loop {
                    left_start = left_end;
                    left_end = (left_start + count - 1) % count;
                    if points[left_start].y != points[left_end].y {
                        break;
                    }
                }
                let (s, e) = (points[left_start], points[left_end]);
                slope_left = (e.x - s.x) as f32 / (e.y - s.y) as f32;
                x_start = s.x as f32;
            }

            if y >= points[right_end].y {
                let mut right_start;
                loop {
                    right_start = right_end;
                    right_end = (right_start + 1) % count;
                    if points[right_start].y != points[right_end].y {
                        break;
                    }
                }
                let (s, e) = (points[right_start], points[right_end]);
                slope_right = (e.x - s.x) as f32 / (e.y - s.y) as f32;
                x_end = s.x as f32;
            }

            self.span(round_to_int(x_start), round_to_int(x_end), y);
            x_start += slope_left;
            x_end += slope_right;
        }
        Ok(())
    }

    /// Wire or filled triangle
    pub fn draw_triangle(&mut self, mode: RasterMode, p: [Point2i; 3]) -> Result<(), RasterError> {
        match mode {
            RasterMode::Wire => self.draw_triangle_wire(p[0], p[1], p[2]),
            RasterMode::Fill => self.draw_triangle_fill(p[0], p[1], p[2]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Color;

    fn ctx(w: usize, h: usize) -> RenderContext {
        let mut ctx = RenderContext::with_size(w, h, 32).unwrap();
        ctx.set_clear_color(Color::BLACK);
        ctx.set_draw_color(Color::WHITE);
        ctx.clear();
        ctx
    }

    fn lit(ctx: &RenderContext) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..ctx.height() {
            for x in 0..ctx.width() {
                if ctx.pixel(x, y) == Some(Color::WHITE) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn pts(list: &[(i32, i32)]) -> Vec<Point2i> {
        list.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn test_draw_pixel_bounds() {
        let mut c = ctx(4, 4);
        c.draw_pixel(3, 2).unwrap();
        assert_eq!(lit(&c), vec![(3, 2)]);
        assert!(matches!(c.draw_pixel(4, 0), Err(RasterError::OutOfBounds { .. })));
        assert!(c.draw_pixel(0, -1).is_err());
    }

    #[test]
    fn test_line_single_pixel() {
        let mut c = ctx(4, 4);
        c.draw_line(1, 1, 1, 1).unwrap();
        assert_eq!(lit(&c), vec![(1, 1)]);
    }

    #[test]
    fn test_line_shallow_reaches_endpoint() {
        let mut c = ctx(12, 5);
        c.draw_line(0, 0, 10, 3).unwrap();
        let px = lit(&c);
        assert_eq!(px.len(), 11);
        assert!(px.contains(&(0, 0)));
        assert!(px.contains(&(10, 3)));
        // one pixel per column
        for x in 0..=10 {
            assert_eq!(px.iter().filter(|p| p.0 == x).count(), 1);
        }
    }

    #[test]
    fn test_line_steep_reversed() {
        let mut c = ctx(5, 12);
        c.draw_line(3, 10, 0, 0).unwrap();
        let px = lit(&c);
        assert_eq!(px.len(), 11);
        assert!(px.contains(&(3, 10)));
        assert!(px.contains(&(0, 0)));
        for y in 0..=10 {
            assert_eq!(px.iter().filter(|p| p.1 == y).count(), 1);
        }
    }

    #[test]
    fn test_line_diagonal() {
        let mut c = ctx(6, 6);
        c.draw_line(5, 0, 0, 5).unwrap();
        let px = lit(&c);
        assert_eq!(px.len(), 6);
        assert!(px.iter().all(|&(x, y)| x + y == 5));
    }

    #[test]
    fn test_polygon_fill_right_triangle() {
        let mut c = ctx(20, 20);
        c.draw_polygon_fill(&pts(&[(0, 0), (10, 0), (0, 10)])).unwrap();
        let got = lit(&c);
        let mut expected = Vec::new();
        for y in 0..20usize {
            for x in 0..20usize {
                if x + y <= 10 {
                    expected.push((x, y));
                }
            }
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn test_triangle_fill_matches_polygon_fill() {
        let mut a = ctx(20, 20);
        let mut b = ctx(20, 20);
        a.draw_triangle_fill((0, 0).into(), (10, 0).into(), (0, 10).into()).unwrap();
        b.draw_polygon_fill(&pts(&[(0, 0), (10, 0), (0, 10)])).unwrap();
        assert_eq!(lit(&a), lit(&b));
    }

    #[test]
    fn test_triangle_fill_general_split() {
        let mut c = ctx(20, 20);
        c.draw_triangle_fill((5, 0).into(), (0, 5).into(), (10, 10).into()).unwrap();
        let px = lit(&c);
        // every vertex is covered and every row in between has a span
        assert!(px.contains(&(5, 0)));
        assert!(px.contains(&(0, 5)));
        assert!(px.contains(&(10, 10)));
        for y in 0..=10 {
            assert!(px.iter().any(|p| p.1 == y));
        }
        assert!(px.iter().all(|p| p.1 <= 10));
    }

    #[test]
    fn test_fill_rectangle_polygon() {
        let mut c = ctx(10, 10);
        c.draw_polygon_fill(&pts(&[(1, 1), (6, 1), (6, 4), (1, 4)])).unwrap();
        let px = lit(&c);
        assert_eq!(px.len(), 6 * 4);
        assert!(px.iter().all(|&(x, y)| (1..=6).contains(&x) && (1..=4).contains(&y)));
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut c = ctx(10, 10);
        c.draw_polygon_fill(&pts(&[(1, 3), (5, 3), (8, 3)])).unwrap();
        c.draw_polygon_fill(&pts(&[(2, 1), (2, 5), (2, 8)])).unwrap();
        c.draw_triangle_fill((1, 3).into(), (5, 3).into(), (8, 3).into()).unwrap();
        assert!(lit(&c).is_empty());
    }

    #[test]
    fn test_polygon_argument_errors() {
        let mut c = ctx(10, 10);
        assert_eq!(c.draw_polygon_fill(&pts(&[(0, 0), (1, 1)])), Err(RasterError::TooFewPoints(2)));
        assert!(c.draw_polygon_wire(&pts(&[(0, 0), (10, 0), (0, 5)])).is_err());
        assert!(lit(&c).is_empty());
    }

    #[test]
    fn test_triangle_wire_outline() {
        let mut c = ctx(12, 12);
        c.draw_triangle(RasterMode::Wire, [(0, 0).into(), (10, 0).into(), (0, 10).into()]).unwrap();
        let px = lit(&c);
        assert!(px.contains(&(5, 0)));
        assert!(px.contains(&(0, 5)));
        assert!(px.contains(&(5, 5)));
        // interior stays empty
        assert!(!px.contains(&(2, 2)));
    }

    #[test]
    fn test_flat_halves() {
        let mut c = ctx(10, 10);
        c.fill_bottom_flat((4, 0).into(), (0, 4).into(), (8, 4).into()).unwrap();
        let px = lit(&c);
        assert_eq!(px.iter().filter(|p| p.1 == 0).count(), 1);
        assert_eq!(px.iter().filter(|p| p.1 == 4).count(), 9);

        let mut c = ctx(10, 10);
        c.fill_top_flat((8, 2).into(), (0, 2).into(), (4, 6).into()).unwrap();
        let px = lit(&c);
        assert_eq!(px.iter().filter(|p| p.1 == 2).count(), 9);
        assert_eq!(px.iter().filter(|p| p.1 == 6).count(), 1);
        assert!(c.fill_top_flat((0, 2).into(), (12, 2).into(), (4, 6).into()).is_err());
    }
}
