//! Symmetric 4x4 quadric matrix
//!
//! Only the upper triangle is stored, row by row:
//!
//! ```text
//! | m0 m1 m2 m3 |
//! |    m4 m5 m6 |
//! |       m7 m8 |
//! |          m9 |
//! ```

use nalgebra::Vector3;
use std::ops::{Add, AddAssign, Index};

/// Quadric error matrix of one or more planes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymmetricMatrix {
    m: [f64; 10],
}

impl SymmetricMatrix {
    /// Create a matrix from its ten upper-triangle coefficients
    pub fn new(m: [f64; 10]) -> Self {
        Self { m }
    }

    /// Quadric of the plane `a*x + b*y + c*z + d = 0`
    #[rustfmt::skip]
    pub fn from_plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            m: [
                a * a, a * b, a * c, a * d,
                b * b, b * c, b * d,
                c * c, c * d,
                d * d,
            ],
        }
    }

    /// Determinant of the 3x3 matrix assembled from the given coefficients
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub fn det(
        &self,
        a11: usize, a12: usize, a13: usize,
        a21: usize, a22: usize, a23: usize,
        a31: usize, a32: usize, a33: usize,
    ) -> f64 {
        let m = &self.m;
        m[a11] * m[a22] * m[a33] + m[a13] * m[a21] * m[a32] + m[a12] * m[a23] * m[a31]
            - m[a13] * m[a22] * m[a31]
            - m[a11] * m[a23] * m[a32]
            - m[a12] * m[a21] * m[a33]
    }

    /// Point minimizing the quadric error, if the upper 3x3 block is invertible
    pub fn optimal_point(&self) -> Option<Vector3<f64>> {
        let det = self.det(0, 1, 2, 1, 4, 5, 2, 5, 7);
        if det == 0.0 {
            return None;
        }
        Some(Vector3::new(
            -self.det(1, 2, 3, 4, 5, 6, 5, 7, 8) / det,
            self.det(0, 2, 3, 1, 5, 6, 2, 7, 8) / det,
            -self.det(0, 1, 3, 1, 4, 6, 2, 5, 8) / det,
        ))
    }

    /// Quadric error `v^T Q v` of the homogeneous point `(p, 1)`
    pub fn vertex_error(&self, p: &Vector3<f64>) -> f64 {
        let m = &self.m;
        let (x, y, z) = (p.x, p.y, p.z);
        m[0] * x * x + 2.0 * m[1] * x * y + 2.0 * m[2] * x * z + 2.0 * m[3] * x
            + m[4] * y * y + 2.0 * m[5] * y * z + 2.0 * m[6] * y
            + m[7] * z * z + 2.0 * m[8] * z
            + m[9]
    }
}

impl Index<usize> for SymmetricMatrix {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.m[index]
    }
}

impl Add for SymmetricMatrix {
    type Output = SymmetricMatrix;

    fn add(mut self, rhs: SymmetricMatrix) -> SymmetricMatrix {
        self += rhs;
        self
    }
}

impl AddAssign for SymmetricMatrix {
    fn add_assign(&mut self, rhs: SymmetricMatrix) {
        for (a, b) in self.m.iter_mut().zip(rhs.m) {
            *a += b;
        }
    }
}
