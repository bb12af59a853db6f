//! Depth-buffered rasterizer for lines and triangles
use nalgebra::Vector3;

use crate::color::Color;
use crate::matrix::PointMatrix;
use crate::shading::{Lighting, Material};

/// Direction the viewer looks in.
fn view_vector() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, -1.0)
}

/// How `draw_polygons` colors the triangles it keeps.
#[derive(Debug, Clone, Copy)]
pub enum PolygonStyle<'a> {
    /// Outline every visible triangle in a single color.
    Wireframe(Color),
    /// Outline and fill with one lit color per triangle.
    Flat {
        lighting: &'a Lighting,
        material: &'a Material,
    },
}

/// Pixel grid plus depth buffer.
///
/// Coordinates have their origin at the bottom-left corner; larger depth
/// values are nearer to the viewer.
pub struct Rasterizer {
    width: usize,
    height: usize,
    background: Color,
    pixels: Vec<Color>,
    depth_buffer: Vec<f64>,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            background,
            pixels: vec![background; size],
            depth_buffer: vec![f64::NEG_INFINITY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Pixels in row-major order starting from the top visual row.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.depth_buffer.fill(f64::NEG_INFINITY);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((self.height - 1 - y) * self.width + x)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Option<f64> {
        self.index(x, y).map(|i| self.depth_buffer[i])
    }

    /// Write one pixel if it is on screen and nearer than what is stored.
    pub fn plot(&mut self, x: i32, y: i32, depth: f64, color: Color) -> bool {
        match self.index(x, y) {
            Some(i) if depth > self.depth_buffer[i] => {
                self.depth_buffer[i] = depth;
                self.pixels[i] = color;
                true
            }
            _ => false,
        }
    }

    /// Midpoint line between two points, interpolating depth.
    ///
    /// Endpoints are ordered left to right (bottom to top when vertical)
    /// first, so both directions cover the same pixels.
    ///
    /// The segment is clipped to the buffer (plus a one pixel border) before
    /// stepping, so the walk never leaves the visible area by more than that.
    pub fn draw_line(&mut self, p0: [f64; 3], p1: [f64; 3], color: Color) {
        if !p0.iter().chain(&p1).all(|v| v.is_finite()) {
            return;
        }
        let (p0, p1) = if p0[0].total_cmp(&p1[0]).then(p0[1].total_cmp(&p1[1])).is_gt() {
            (p1, p0)
        } else {
            (p0, p1)
        };
        let bounds = [-1.0, self.width as f64, -1.0, self.height as f64];
        let Some((p0, p1)) = clip_segment(p0, p1, bounds) else {
            return;
        };

        let (mut x0, mut y0, mut z0) = (p0[0] as i32, p0[1] as i32, p0[2]);
        let (mut x1, mut y1, mut z1) = (p1[0] as i32, p1[1] as i32, p1[2]);
        if x0 > x1 || (x0 == x1 && y0 > y1) {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
            std::mem::swap(&mut z0, &mut z1);
        }

        let dx = x1 - x0;
        let dy = y1 - y0;
        let depth = |step: i32, steps: i32| z0 + (z1 - z0) * (step as f64 / steps as f64);

        if dx == 0 && dy == 0 {
            self.plot(x0, y0, z0.max(z1), color);
            return;
        }
        if dx == 0 {
            for i in 0..=dy {
                self.plot(x0, y0 + i, depth(i, dy), color);
            }
            return;
        }
        if dy == 0 {
            for i in 0..=dx {
                self.plot(x0 + i, y0, depth(i, dx), color);
            }
            return;
        }

        // f(x, y) = A x + B y + C, zero on the line
        let a = 2 * dy;
        let b = -2 * dx;
        let (mut x, mut y) = (x0, y0);

        if dy > dx {
            // slope > 1: step y, test f(x + 1/2, y + 1)
            let mut d = a / 2 + b;
            for i in 0..=dy {
                self.plot(x, y, depth(i, dy), color);
                if d < 0 {
                    x += 1;
                    d += a;
                }
                y += 1;
                d += b;
            }
        } else if dy > 0 {
            // 0 < slope <= 1: step x, test f(x + 1, y + 1/2)
            let mut d = a + b / 2;
            for i in 0..=dx {
                self.plot(x, y, depth(i, dx), color);
                if d > 0 {
                    y += 1;
                    d += b;
                }
                x += 1;
                d += a;
            }
        } else if -dy <= dx {
            // -1 <= slope < 0: step x, test f(x + 1, y - 1/2)
            let mut d = a - b / 2;
            for i in 0..=dx {
                self.plot(x, y, depth(i, dx), color);
                if d < 0 {
                    y -= 1;
                    d -= b;
                }
                x += 1;
                d += a;
            }
        } else {
            // slope < -1: step y down, test f(x + 1/2, y - 1)
            let mut d = a / 2 - b;
            for i in 0..=-dy {
                self.plot(x, y, depth(i, -dy), color);
                if d > 0 {
                    x += 1;
                    d += a;
                }
                y -= 1;
                d -= b;
            }
        }
    }

    /// Draw rows `(2i, 2i + 1)` as independent edges.
    pub fn draw_lines(&mut self, edges: &PointMatrix, color: Color) {
        for pair in 0..edges.rows() / 2 {
            let p0 = xyz(edges.row(2 * pair));
            let p1 = xyz(edges.row(2 * pair + 1));
            self.draw_line(p0, p1, color);
        }
    }

    /// Draw rows `(3i, 3i + 1, 3i + 2)` as triangles.
    ///
    /// Returns how many triangles survived back-face culling.
    pub fn draw_polygons(&mut self, polygons: &PointMatrix, style: &PolygonStyle<'_>) -> usize {
        let mut drawn = 0;
        for triangle in 0..polygons.rows() / 3 {
            let vertices = [
                xyz(polygons.row(3 * triangle)),
                xyz(polygons.row(3 * triangle + 1)),
                xyz(polygons.row(3 * triangle + 2)),
            ];
            let normal = surface_normal(vertices);
            if normal.dot(&view_vector()) >= 0.0 {
                continue;
            }
            drawn += 1;

            let color = match style {
                PolygonStyle::Wireframe(color) => *color,
                PolygonStyle::Flat { lighting, material } => lighting.shade(&normal, material),
            };
            let [p0, p1, p2] = vertices;
            self.draw_line(p0, p1, color);
            self.draw_line(p1, p2, color);
            self.draw_line(p2, p0, color);

            if let PolygonStyle::Flat { .. } = style {
                self.fill_triangle(vertices, color);
            }
        }
        drawn
    }

    /// Scanline fill between a long edge (bottom to top) and the two short
    /// edges meeting at the middle vertex.
    ///
    /// Only rows inside the buffer are walked; edge positions are computed
    /// from the row offset rather than accumulated.
    fn fill_triangle(&mut self, vertices: [[f64; 3]; 3], color: Color) {
        if !vertices.iter().flatten().all(|v| v.is_finite()) {
            return;
        }
        let mut sorted = vertices;
        sorted.sort_by(|a, b| a[1].total_cmp(&b[1]));
        let [bottom, middle, top] = sorted;

        let y_bottom = bottom[1].trunc();
        let y_middle = middle[1].trunc();
        let y_top = top[1].trunc();

        let first = y_bottom.max(0.0);
        let last = y_top.min(self.height as f64 - 1.0);
        if first > last {
            return;
        }

        let (dx0, dz0) = edge_step(bottom, top, y_top - y_bottom);
        let (dx1, dz1) = edge_step(bottom, middle, y_middle - y_bottom);
        let (dx2, dz2) = edge_step(middle, top, y_top - y_middle);

        for y in first as i32..=last as i32 {
            let row = y as f64;
            let long = (
                bottom[0] + dx0 * (row - y_bottom),
                bottom[2] + dz0 * (row - y_bottom),
            );
            let short = if row < y_middle {
                (
                    bottom[0] + dx1 * (row - y_bottom),
                    bottom[2] + dz1 * (row - y_bottom),
                )
            } else {
                (
                    middle[0] + dx2 * (row - y_middle),
                    middle[2] + dz2 * (row - y_middle),
                )
            };
            self.draw_span(y, long, short, color);
        }
    }

    fn draw_span(&mut self, y: i32, a: (f64, f64), b: (f64, f64), color: Color) {
        let ((xa, za), (xb, zb)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        let x_start = xa.trunc();
        let x_end = xb.trunc();
        let dz = if x_end > x_start {
            (zb - za) / (x_end - x_start)
        } else {
            0.0
        };

        let first = x_start.max(0.0);
        let last = x_end.min(self.width as f64 - 1.0);
        if first > last {
            return;
        }
        for x in first as i32..=last as i32 {
            self.plot(x, y, za + dz * (x as f64 - x_start), color);
        }
    }
}

fn xyz(row: &[f64]) -> [f64; 3] {
    [row[0], row[1], row[2]]
}

/// `(p0 - p1) x (p0 - p2)`
fn surface_normal(vertices: [[f64; 3]; 3]) -> Vector3<f64> {
    let [p0, p1, p2] = vertices.map(Vector3::from);
    (p0 - p1).cross(&(p0 - p2))
}

/// Per-row x and depth increments along an edge spanning `rows` scanlines.
fn edge_step(from: [f64; 3], to: [f64; 3], rows: f64) -> (f64, f64) {
    if rows > 0.0 {
        ((to[0] - from[0]) / rows, (to[2] - from[2]) / rows)
    } else {
        (0.0, 0.0)
    }
}

/// Liang-Barsky clip of `p0 -> p1` against `[x_min, x_max, y_min, y_max]`,
/// depth interpolated along the kept part. `None` when nothing is inside.
fn clip_segment(
    p0: [f64; 3],
    p1: [f64; 3],
    [x_min, x_max, y_min, y_max]: [f64; 4],
) -> Option<([f64; 3], [f64; 3])> {
    let delta = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-delta[0], p0[0] - x_min),
        (delta[0], x_max - p0[0]),
        (-delta[1], p0[1] - y_min),
        (delta[1], y_max - p0[1]),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        [
            (p0[0] + t * delta[0]).clamp(x_min, x_max),
            (p0[1] + t * delta[1]).clamp(y_min, y_max),
            p0[2] + t * delta[2],
        ]
    };
    let start = if t0 > 0.0 { at(t0) } else { p0 };
    let end = if t1 < 1.0 { at(t1) } else { p1 };
    Some((start, end))
}
