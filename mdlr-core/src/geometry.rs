//! Geometry primitives for 3D rendering
use std::f64::consts::{PI, TAU};

use crate::error::MatrixError;
use crate::matrix::PointMatrix;
use crate::transform::{Axis, Transform};

/// A point in model space.
pub type Point3 = [f64; 3];

/// Parameter step used when sampling cubic curves.
pub const DEFAULT_CURVE_STEP: f64 = 1.0 / 1000.0;

/// Steps per parameter for sphere and torus grids.
pub const DEFAULT_RESOLUTION: usize = 18;

/// Cubic curve flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Endpoints plus tangent control points
    Hermite,
    /// Four Bezier control points
    Bezier,
}

impl CurveKind {
    /// The 4x4 basis turning curve parameters into cubic coefficients.
    pub fn basis(self) -> PointMatrix {
        let rows = match self {
            CurveKind::Hermite => [
                [2.0, -2.0, 1.0, 1.0],
                [-3.0, 3.0, -2.0, -1.0],
                [0.0, 0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
            ],
            CurveKind::Bezier => [
                [-1.0, 3.0, -3.0, 1.0],
                [3.0, -6.0, 3.0, 0.0],
                [-3.0, 3.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
            ],
        };
        let mut basis = PointMatrix::with_cols(4);
        for row in &rows {
            basis.push_row(row);
        }
        basis
    }

    /// Per-axis parameter column for the basis.
    ///
    /// Hermite tangents are given as control points, so the rates of change
    /// are `p1 - p0` and `p3 - p2`.
    fn parameters(self, points: &[Point3; 4], axis: usize) -> PointMatrix {
        let [p0, p1, p2, p3] = [
            points[0][axis],
            points[1][axis],
            points[2][axis],
            points[3][axis],
        ];
        let column = match self {
            CurveKind::Hermite => [p0, p2, p1 - p0, p3 - p2],
            CurveKind::Bezier => [p0, p1, p2, p3],
        };
        let mut params = PointMatrix::with_cols(1);
        for value in column {
            params.push_row(&[value]);
        }
        params
    }
}

/// Accumulates homogeneous points `(x, y, z, 1)` for primitives.
///
/// Edges are stored as consecutive pairs of rows and polygons as consecutive
/// triples; the rasterizer consumes them the same way.
#[derive(Debug, Clone)]
pub struct GeometryBuilder {
    points: PointMatrix,
    resolution: usize,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self {
            points: PointMatrix::with_cols(4),
            resolution: DEFAULT_RESOLUTION,
        }
    }

    /// Builder with a custom sphere/torus grid resolution (at least 3).
    pub fn with_resolution(resolution: usize) -> Self {
        Self {
            points: PointMatrix::with_cols(4),
            resolution: resolution.max(3),
        }
    }

    pub fn points(&self) -> &PointMatrix {
        &self.points
    }

    pub fn into_points(self) -> PointMatrix {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn add_point(&mut self, x: f64, y: f64, z: f64) {
        self.points.push_row(&[x, y, z, 1.0]);
    }

    pub fn add_edge(&mut self, p0: Point3, p1: Point3) {
        self.add_point(p0[0], p0[1], p0[2]);
        self.add_point(p1[0], p1[1], p1[2]);
    }

    /// Vertices must wind counter-clockwise when seen from the viewer.
    pub fn add_polygon(&mut self, p0: Point3, p1: Point3, p2: Point3) {
        self.add_point(p0[0], p0[1], p0[2]);
        self.add_point(p1[0], p1[1], p1[2]);
        self.add_point(p2[0], p2[1], p2[2]);
    }

    /// Closed polyline around `center` in its z plane.
    ///
    /// `step` is a fraction of a full turn; by default it shrinks with the
    /// radius so every segment has roughly the same length.
    pub fn add_circle(&mut self, center: Point3, r: f64, step: Option<f64>) {
        if !(r > 0.0 && r.is_finite()) {
            return;
        }
        let step = step.unwrap_or(1.0 / (50.0 * r));
        if !(step > 0.0) {
            return;
        }
        let steps = ((1.0 / step).round() as usize).max(3);
        let [cx, cy, cz] = center;
        let point_at = |i: usize| {
            let t = TAU * i as f64 / steps as f64;
            [cx + r * t.cos(), cy + r * t.sin(), cz]
        };

        let mut previous = point_at(0);
        for i in 1..=steps {
            let next = point_at(i);
            self.add_edge(previous, next);
            previous = next;
        }
    }

    pub fn add_curve(&mut self, points: [Point3; 4], kind: CurveKind) -> Result<(), MatrixError> {
        self.add_curve_with_step(points, kind, DEFAULT_CURVE_STEP)
    }

    pub fn add_curve_with_step(
        &mut self,
        points: [Point3; 4],
        kind: CurveKind,
        step: f64,
    ) -> Result<(), MatrixError> {
        let basis = kind.basis();
        let mut coefficients = [[0.0; 4]; 3];
        for (axis, coefficient) in coefficients.iter_mut().enumerate() {
            let solved = basis.multiply(&kind.parameters(&points, axis))?;
            for (i, value) in coefficient.iter_mut().enumerate() {
                *value = solved.get(i, 0);
            }
        }

        let evaluate = |t: f64| -> Point3 {
            coefficients.map(|[a, b, c, d]| ((a * t + b) * t + c) * t + d)
        };

        let steps = if step > 0.0 {
            ((1.0 / step).round() as usize).max(1)
        } else {
            1
        };
        let mut previous = evaluate(0.0);
        for i in 1..=steps {
            let next = evaluate(i as f64 / steps as f64);
            self.add_edge(previous, next);
            previous = next;
        }
        Ok(())
    }

    /// Axis-aligned box spanning `[x, x+w] x [y, y+h] x [z-d, z]`.
    pub fn add_prism(&mut self, origin: Point3, width: f64, height: f64, depth: f64) {
        let [x0, y0, z0] = origin;
        let x1 = x0 + width;
        let y1 = y0 + height;
        let z1 = z0 - depth;

        // Front
        self.add_polygon([x0, y1, z0], [x0, y0, z0], [x1, y0, z0]);
        self.add_polygon([x0, y1, z0], [x1, y0, z0], [x1, y1, z0]);
        // Back
        self.add_polygon([x1, y1, z1], [x1, y0, z1], [x0, y0, z1]);
        self.add_polygon([x1, y1, z1], [x0, y0, z1], [x0, y1, z1]);
        // Right
        self.add_polygon([x1, y1, z0], [x1, y0, z0], [x1, y0, z1]);
        self.add_polygon([x1, y1, z0], [x1, y0, z1], [x1, y1, z1]);
        // Left
        self.add_polygon([x0, y1, z1], [x0, y0, z1], [x0, y0, z0]);
        self.add_polygon([x0, y1, z1], [x0, y0, z0], [x0, y1, z0]);
        // Top
        self.add_polygon([x0, y1, z1], [x0, y1, z0], [x1, y1, z0]);
        self.add_polygon([x0, y1, z1], [x1, y1, z0], [x1, y1, z1]);
        // Bottom
        self.add_polygon([x1, y0, z1], [x1, y0, z0], [x0, y0, z0]);
        self.add_polygon([x1, y0, z1], [x0, y0, z0], [x0, y0, z1]);
    }

    pub fn add_sphere(&mut self, center: Point3, r: f64) {
        let n = self.resolution;
        let [cx, cy, cz] = center;

        // rotation-major grid: n longitudes, n + 1 samples pole to pole
        let mut grid = Vec::with_capacity(n * (n + 1));
        for rotation in 0..n {
            let phi = TAU * rotation as f64 / n as f64;
            for circle in 0..=n {
                let theta = PI * circle as f64 / n as f64;
                grid.push([
                    cx + r * theta.cos(),
                    cy + r * theta.sin() * phi.cos(),
                    cz + r * theta.sin() * phi.sin(),
                ]);
            }
        }
        let at = |rotation: usize, circle: usize| grid[(rotation % n) * (n + 1) + circle];

        for rotation in 0..n {
            for circle in 0..n {
                let a = at(rotation, circle);
                let b = at(rotation + 1, circle);
                let c = at(rotation + 1, circle + 1);
                let d = at(rotation, circle + 1);
                // a and b meet at the first pole, c and d at the second
                if circle != 0 {
                    self.add_polygon(a, c, b);
                }
                if circle != n - 1 {
                    self.add_polygon(a, d, c);
                }
            }
        }
    }

    pub fn add_torus(&mut self, center: Point3, circle_radius: f64, torus_radius: f64) {
        let n = self.resolution;
        let [cx, cy, cz] = center;

        let mut grid = Vec::with_capacity(n * n);
        for rotation in 0..n {
            let (sin_phi, cos_phi) = (TAU * rotation as f64 / n as f64).sin_cos();
            for circle in 0..n {
                let (sin_theta, cos_theta) = (TAU * circle as f64 / n as f64).sin_cos();
                let ring = circle_radius * cos_theta + torus_radius;
                grid.push([
                    cx + cos_phi * ring,
                    cy + circle_radius * sin_theta,
                    cz + sin_phi * ring,
                ]);
            }
        }
        let at = |rotation: usize, circle: usize| grid[(rotation % n) * n + circle % n];

        for rotation in 0..n {
            for circle in 0..n {
                let a = at(rotation, circle);
                let b = at(rotation + 1, circle);
                let c = at(rotation + 1, circle + 1);
                let d = at(rotation, circle + 1);
                self.add_polygon(a, d, b);
                self.add_polygon(c, b, d);
            }
        }
    }

    pub fn make_translate(&mut self, x: f64, y: f64, z: f64) {
        self.points = Transform::translation_matrix(x, y, z);
    }

    pub fn make_scale(&mut self, x: f64, y: f64, z: f64) {
        self.points = Transform::scale_matrix(x, y, z);
    }

    pub fn make_rot_x(&mut self, degrees: f64) {
        self.points = Transform::rotation_matrix(Axis::X, degrees);
    }

    pub fn make_rot_y(&mut self, degrees: f64) {
        self.points = Transform::rotation_matrix(Axis::Y, degrees);
    }

    pub fn make_rot_z(&mut self, degrees: f64) {
        self.points = Transform::rotation_matrix(Axis::Z, degrees);
    }

    pub fn make_hermite(&mut self) {
        self.points = CurveKind::Hermite.basis();
    }

    pub fn make_bezier(&mut self) {
        self.points = CurveKind::Bezier.basis();
    }
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
