//! Stack of nested coordinate systems
use crate::error::{MatrixError, StackError};
use crate::matrix::PointMatrix;
use crate::transform::TransformKind;

/// Cumulative local-to-world transforms.
///
/// The bottom entry is the identity and can never be popped. Entries are
/// owned values, so changing the top never reaches the entry below it.
#[derive(Debug, Clone)]
pub struct TransformStack {
    entries: Vec<PointMatrix>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            entries: vec![PointMatrix::identity(4)],
        }
    }

    /// The current origin.
    pub fn top(&self) -> &PointMatrix {
        // `entries` is never empty
        &self.entries[self.entries.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self) {
        let copy = self.top().copy();
        self.entries.push(copy);
    }

    pub fn pop(&mut self) -> Result<PointMatrix, StackError> {
        if self.entries.len() == 1 {
            return Err(StackError::Underflow);
        }
        self.entries.pop().ok_or(StackError::Underflow)
    }

    /// Compose `kind` into the top: `top = top x transform`.
    ///
    /// A knob value scales the parameters before the matrix is built.
    pub fn apply(&mut self, kind: TransformKind, knob: Option<f64>) -> Result<(), MatrixError> {
        let kind = match knob {
            Some(value) => kind.scaled(value),
            None => kind,
        };
        let last = self.entries.len() - 1;
        self.entries[last].multiply_in_place(&kind.matrix())
    }

    /// Back to a single identity.
    pub fn reset(&mut self) {
        self.entries.truncate(1);
        self.entries[0] = PointMatrix::identity(4);
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Axis, Transform};

    #[test]
    fn test_push_pop_restores_top() {
        let mut stack = TransformStack::new();
        stack
            .apply(TransformKind::Translate([1.0, 2.0, 3.0]), None)
            .unwrap();
        let before = stack.top().clone();

        stack.push();
        stack.apply(TransformKind::Rotate(Axis::Y, 33.0), None).unwrap();
        stack.apply(TransformKind::Scale([2.0, 2.0, 2.0]), None).unwrap();
        assert_ne!(stack.top(), &before);

        stack.pop().unwrap();
        assert_eq!(stack.top(), &before);
    }

    #[test]
    fn test_pop_base_underflows() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.pop(), Err(StackError::Underflow));
        stack.push();
        assert!(stack.pop().is_ok());
        assert_eq!(stack.pop(), Err(StackError::Underflow));
        assert_eq!(stack.top(), &PointMatrix::identity(4));
    }

    #[test]
    fn test_apply_right_multiplies() {
        let mut stack = TransformStack::new();
        stack
            .apply(TransformKind::Translate([10.0, 0.0, 0.0]), None)
            .unwrap();
        stack.apply(TransformKind::Scale([2.0, 2.0, 2.0]), None).unwrap();

        let expected = Transform::translation_matrix(10.0, 0.0, 0.0)
            .multiply(&Transform::scale_matrix(2.0, 2.0, 2.0))
            .unwrap();
        assert_eq!(stack.top(), &expected);
        // scale happens in the translated frame: translation column untouched
        assert_eq!(stack.top().get(0, 3), 10.0);
        assert_eq!(stack.top().get(0, 0), 2.0);
    }

    #[test]
    fn test_knob_scales_parameters_before_building() {
        let mut stack = TransformStack::new();
        stack
            .apply(TransformKind::Rotate(Axis::Z, 180.0), Some(0.5))
            .unwrap();
        let quarter = Transform::rotation_matrix(Axis::Z, 90.0);
        assert!(stack.top().approx_eq(&quarter, 1e-12));

        let mut stack = TransformStack::new();
        stack
            .apply(TransformKind::Scale([4.0, 4.0, 4.0]), Some(0.25))
            .unwrap();
        assert_eq!(stack.top(), &PointMatrix::identity(4));
    }

    #[test]
    fn test_reset() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.push();
        stack
            .apply(TransformKind::Translate([1.0, 1.0, 1.0]), None)
            .unwrap();
        stack.reset();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), &PointMatrix::identity(4));
    }
}
