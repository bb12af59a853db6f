//! Affine transformation matrices
use crate::matrix::PointMatrix;

/// Axis of rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

/// One elementary transform with its literal parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformKind {
    Translate([f64; 3]),
    Scale([f64; 3]),
    /// Angle in degrees
    Rotate(Axis, f64),
}

impl TransformKind {
    /// Multiply every positional or angular parameter by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            TransformKind::Translate(v) => TransformKind::Translate(v.map(|c| c * factor)),
            TransformKind::Scale(v) => TransformKind::Scale(v.map(|c| c * factor)),
            TransformKind::Rotate(axis, degrees) => TransformKind::Rotate(axis, degrees * factor),
        }
    }

    pub fn matrix(&self) -> PointMatrix {
        match *self {
            TransformKind::Translate([x, y, z]) => Transform::translation_matrix(x, y, z),
            TransformKind::Scale([x, y, z]) => Transform::scale_matrix(x, y, z),
            TransformKind::Rotate(axis, degrees) => Transform::rotation_matrix(axis, degrees),
        }
    }
}

/// Transform builder for 4x4 affine matrices (column-vector convention)
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation_matrix(x: f64, y: f64, z: f64) -> PointMatrix {
        from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f64, sy: f64, sz: f64) -> PointMatrix {
        from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix about `axis` from an angle in degrees.
    ///
    /// The Y rotation uses the same sign layout as scripts written for the
    /// MDL toolchain expect, which is the transpose of the right-handed one.
    pub fn rotation_matrix(axis: Axis, degrees: f64) -> PointMatrix {
        let (s, c) = degrees.to_radians().sin_cos();
        let rows = match axis {
            Axis::X => [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            Axis::Y => [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            Axis::Z => [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        from_rows(rows)
    }
}

fn from_rows(rows: [[f64; 4]; 4]) -> PointMatrix {
    let mut matrix = PointMatrix::with_cols(4);
    for row in &rows {
        matrix.push_row(row);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix4, Rotation3, Vector3};

    fn assert_matches(ours: &PointMatrix, theirs: &Matrix4<f64>) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (ours.get(i, j) - theirs[(i, j)]).abs() < 1e-9,
                    "mismatch at ({i}, {j}): {} vs {}",
                    ours.get(i, j),
                    theirs[(i, j)]
                );
            }
        }
    }

    #[test]
    fn test_translation_matches_nalgebra() {
        let ours = Transform::translation_matrix(1.0, -2.0, 3.5);
        let theirs = Matrix4::new_translation(&Vector3::new(1.0, -2.0, 3.5));
        assert_matches(&ours, &theirs);
    }

    #[test]
    fn test_scale_matches_nalgebra() {
        let ours = Transform::scale_matrix(2.0, 3.0, 0.5);
        let theirs = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 0.5));
        assert_matches(&ours, &theirs);
    }

    #[test]
    fn test_rotations() {
        let angle = 30.0_f64;
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), angle.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), angle.to_radians());
        // Y runs the other way round.
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), -angle.to_radians());

        assert_matches(&Transform::rotation_matrix(Axis::X, angle), &rx.to_homogeneous());
        assert_matches(&Transform::rotation_matrix(Axis::Y, angle), &ry.to_homogeneous());
        assert_matches(&Transform::rotation_matrix(Axis::Z, angle), &rz.to_homogeneous());
    }

    #[test]
    fn test_scaled_kind() {
        let kind = TransformKind::Rotate(Axis::Z, 90.0).scaled(0.5);
        assert_eq!(kind, TransformKind::Rotate(Axis::Z, 45.0));

        let kind = TransformKind::Translate([2.0, 4.0, -6.0]).scaled(0.5);
        assert_eq!(kind, TransformKind::Translate([1.0, 2.0, -3.0]));
    }

    #[test]
    fn test_axis_names() {
        assert_eq!(Axis::from_name("x"), Some(Axis::X));
        assert_eq!(Axis::from_name("Z"), Some(Axis::Z));
        assert_eq!(Axis::from_name("w"), None);
    }
}
