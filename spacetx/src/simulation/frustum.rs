//! View frustum for visibility queries
//!
//! Six clip planes extracted from a view-projection matrix (Gribb/Hartmann,
//! OpenGL clip-space convention, which is what `nalgebra::Perspective3`
//! produces). A point is visible when it lies on the inner side of all six.

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector4};

use crate::simulation::states::NVec3;

/// Plane `normal . p + d = 0`, with the normal pointing into the frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: NVec3,
    pub d: f64,
}

impl Plane {
    fn from_coefficients(c: Vector4<f64>) -> Self {
        let normal = NVec3::new(c.x, c.y, c.z);
        let len = normal.norm();
        if len > 0.0 {
            Self { normal: normal / len, d: c.w / len }
        } else {
            Self { normal, d: c.w }
        }
    }

    pub fn signed_distance(&self, p: &NVec3) -> f64 {
        self.normal.dot(p) + self.d
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6], // left, right, bottom, top, near, far
}

impl Frustum {
    /// Extract the clip planes of `projection * view`
    pub fn from_matrix(view_projection: &Matrix4<f64>) -> Self {
        let row = |i: usize| view_projection.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Right-handed perspective camera at `eye` looking at `target`
    pub fn perspective(
        eye: &NVec3,
        target: &NVec3,
        up: &NVec3,
        fovy: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let view = Isometry3::look_at_rh(&Point3::from(*eye), &Point3::from(*target), up).to_homogeneous();
        let projection = Perspective3::new(aspect, fovy, near, far).to_homogeneous();
        Self::from_matrix(&(projection * view))
    }

    /// Camera straight above `(center_x, center_z)` looking down, sized so a
    /// cube of half-size `half_extent` around that point is fully inside.
    /// Returns the eye position together with the frustum.
    pub fn top_down(center_x: f64, center_z: f64, half_extent: f64) -> (NVec3, Self) {
        let height = 2.0 * half_extent.max(1.0);
        let eye = NVec3::new(center_x, height, center_z);
        let target = NVec3::new(center_x, 0.0, center_z);
        let frustum = Self::perspective(
            &eye,
            &target,
            &NVec3::z(),
            std::f64::consts::FRAC_PI_2,
            1.0,
            0.1,
            height * 4.0,
        );
        (eye, frustum)
    }

    pub fn contains_point(&self, p: &NVec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(p) >= 0.0)
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }
}
