//! Straight line segments

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::geom::Vector2d;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight line between two points, parametrised by arc length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    start: Vector2d,
    end: Vector2d,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSegment {
    pub fn new(start: Vector2d, end: Vector2d) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn get(&self, s: f64) -> Vector2d {
        self.start + (self.end - self.start) * self.reparam(s)
    }

    /// Unit direction of the line, the same at every point.
    pub fn deriv(&self, _s: f64) -> Vector2d {
        (self.end - self.start) / self.length()
    }

    pub fn second_deriv(&self, _s: f64) -> Vector2d {
        Vector2d::zeros()
    }

    pub fn third_deriv(&self, _s: f64) -> Vector2d {
        Vector2d::zeros()
    }

    /// Internal parameter in `[0, 1]` for an arc length.
    fn reparam(&self, s: f64) -> f64 {
        s / self.length()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Vector2Ext;

    #[test]
    fn test_line() {
        let line = LineSegment::new(Vector2d::new(1.0, 1.0), Vector2d::new(4.0, 5.0));

        assert!(util::maths::epsilon_eq(line.length(), 5.0));
        assert!(line.get(0.0).epsilon_eq(&Vector2d::new(1.0, 1.0)));
        assert!(line.get(2.5).epsilon_eq(&Vector2d::new(2.5, 3.0)));
        assert!(line.get(5.0).epsilon_eq(&Vector2d::new(4.0, 5.0)));
        assert!(line.deriv(1.0).epsilon_eq(&Vector2d::new(0.6, 0.8)));
    }
}
