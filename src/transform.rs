use crate::error::ConfigError;
use crate::geom::Ray3f;
use crate::types::*;

/// An affine world transform with its inverse and inverse-transpose derived
/// once at construction. Immutable; replacing a shape's transform means
/// building a new `Transform`.
#[derive(Copy, Clone, Debug)]
pub struct Transform {
    fwd: Matrix4f,
    inv: Matrix4f,
    /// Transpose of the inverse's upper 3x3 block; maps normals to world
    /// space correctly under non-uniform scale.
    inv_t: Matrix3f,
}

fn upper3(m: &Matrix4f) -> Matrix3f {
    Matrix3f::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}

impl Transform {
    pub fn new(fwd: Matrix4f) -> Result<Transform, ConfigError> {
        let inv = fwd.invert().ok_or(ConfigError::SingularTransform)?;
        Ok(Transform { fwd, inv, inv_t: upper3(&inv).transpose() })
    }

    pub fn identity() -> Transform {
        Transform {
            fwd: Matrix4f::identity(),
            inv: Matrix4f::identity(),
            inv_t: Matrix3f::identity(),
        }
    }

    pub fn translate(v: Vector3f) -> Transform {
        // Always invertible; skip the singularity check.
        Transform::new(Matrix4f::from_translation(v)).unwrap()
    }

    pub fn scale(s: Float) -> Result<Transform, ConfigError> {
        Transform::new(Matrix4f::from_scale(s))
    }

    pub fn nonuniform_scale(x: Float, y: Float, z: Float) -> Result<Transform, ConfigError> {
        Transform::new(Matrix4f::from_nonuniform_scale(x, y, z))
    }

    pub fn rotate_x(angle: Rad<Float>) -> Transform {
        Transform::new(Matrix4f::from_angle_x(angle)).unwrap()
    }

    pub fn rotate_y(angle: Rad<Float>) -> Transform {
        Transform::new(Matrix4f::from_angle_y(angle)).unwrap()
    }

    pub fn rotate_z(angle: Rad<Float>) -> Transform {
        Transform::new(Matrix4f::from_angle_z(angle)).unwrap()
    }

    /// `self` applied first, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        let inv = self.inv * next.inv;
        Transform { fwd: next.fwd * self.fwd, inv, inv_t: upper3(&inv).transpose() }
    }

    pub fn matrix(&self) -> Matrix4f {
        self.fwd
    }

    pub fn inverse(&self) -> Matrix4f {
        self.inv
    }

    pub fn point_to_object(&self, p: Point3f) -> Point3f {
        Point3f::from_homogeneous(self.inv * p.to_homogeneous())
    }

    pub fn vector_to_object(&self, v: Vector3f) -> Vector3f {
        (self.inv * v.extend(0.0)).truncate()
    }

    pub fn point_to_world(&self, p: Point3f) -> Point3f {
        Point3f::from_homogeneous(self.fwd * p.to_homogeneous())
    }

    pub fn normal_to_world(&self, n: Vector3f) -> Vector3f {
        (self.inv_t * n).normalize()
    }

    /// Transform a world ray into object space. The direction is left
    /// unnormalized on purpose: an affine map preserves the ray parameter, so
    /// a t solved against the returned pair is valid on the world ray as-is.
    pub fn ray_to_object(&self, ray: &Ray3f) -> (Point3f, Vector3f) {
        (self.point_to_object(ray.origin), self.vector_to_object(ray.direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn translation_moves_points_not_vectors() {
        let t = Transform::translate(Vector3f::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(t.point_to_world(Point3f::new(0.0, 0.0, 0.0)), Point3f::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(t.point_to_object(Point3f::new(1.0, 2.0, 3.0)), Point3f::new(0.0, 0.0, 0.0));
        assert_abs_diff_eq!(t.vector_to_object(Vector3f::unit_x()), Vector3f::unit_x());
    }

    #[test]
    fn singular_matrix_is_a_config_error() {
        let m = Matrix4f::from_nonuniform_scale(1.0, 0.0, 1.0);
        assert!(Transform::new(m).is_err());
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform::translate(Vector3f::new(5.0, 0.0, 0.0))
            .then(&Transform::rotate_z(Rad(0.7)))
            .then(&Transform::nonuniform_scale(2.0, 3.0, 4.0).unwrap());
        let p = Point3f::new(1.0, -2.0, 0.5);
        assert_abs_diff_eq!(t.point_to_object(t.point_to_world(p)), p, epsilon = 1e-12);
    }

    #[test]
    fn normals_stay_perpendicular_under_nonuniform_scale() {
        // Scale a 45-degree surface; a naively transformed normal would shear.
        let t = Transform::nonuniform_scale(1.0, 4.0, 1.0).unwrap();
        let tangent = Vector3f::new(1.0, 1.0, 0.0);
        let normal = Vector3f::new(1.0, -1.0, 0.0).normalize();
        let world_tangent = (t.matrix() * tangent.extend(0.0)).truncate();
        let world_normal = t.normal_to_world(normal);
        assert_abs_diff_eq!(world_normal.dot(world_tangent), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(world_normal.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ray_parameter_survives_the_object_map() {
        let t = Transform::nonuniform_scale(2.0, 1.0, 3.0)
            .unwrap()
            .then(&Transform::translate(Vector3f::new(0.0, 1.0, 0.0)));
        let ray = Ray3f::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::unit_z());
        let (o, d) = t.ray_to_object(&ray);
        // Evaluating the object ray at t and mapping forward must land on the
        // world ray at the same t.
        let t_probe = 2.25;
        assert_abs_diff_eq!(t.point_to_world(o + d * t_probe), ray.at(t_probe), epsilon = 1e-12);
    }
}
