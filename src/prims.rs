use std::sync::Arc;

use crate::geom::{Ray3f, RAY_EPSILON};
use crate::material::Material;
use crate::roots::solve_quadratic;
use crate::shape::{nearest_boundary, Intersection, IntersectionInterval, Shape};
use crate::transform::Transform;
use crate::types::*;

/// Two boundary t's closer than this collapse into a tangential single hit.
pub(crate) const TANGENT_WELD: Float = 1e-9;

pub(crate) const PARALLEL: Float = 1e-12;

/// Unit-radius-scalable sphere centered at the object-space origin.
pub struct Sphere {
    radius: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(radius: Float, transform: Transform, material: Arc<dyn Material>) -> Self {
        Sphere { radius, transform, material }
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let oc = o.to_vec();
        let roots = solve_quadratic(
            d.magnitude2(),
            2.0 * d.dot(oc),
            oc.magnitude2() - self.radius * self.radius,
        );
        let hit = |t: Float| {
            let obj_normal = (oc + d * t) / self.radius;
            Intersection::new(
                ray.at(t),
                self.transform.normal_to_world(obj_normal),
                t,
                self as &dyn Shape,
            )
        };
        match roots.as_slice() {
            [] => vec![],
            [t] => vec![IntersectionInterval::degenerate(hit(*t))],
            [t0, t1] if t1 - t0 < TANGENT_WELD => vec![IntersectionInterval::degenerate(hit(*t0))],
            [t0, t1] => vec![IntersectionInterval::new(hit(*t0), hit(*t1))],
            _ => unreachable!("quadratic with more than two roots"),
        }
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    fn inverse_transform(&self) -> Matrix4f {
        self.transform.inverse()
    }
}

/// The object-space z = 0 plane, geometric normal +z. Not a solid.
pub struct Plane {
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Plane {
    pub fn new(transform: Transform, material: Arc<dyn Material>) -> Self {
        Plane { transform, material }
    }

    fn hit_at(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        // Parallel rays miss rather than dividing toward NaN.
        if d.z.abs() < PARALLEL {
            return None;
        }
        let t = -o.z / d.z;
        Some(Intersection::new(
            ray.at(t),
            self.transform.normal_to_world(Vector3f::unit_z()),
            t,
            self as &dyn Shape,
        ))
    }
}

impl Shape for Plane {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        self.hit_at(ray).filter(|hit| hit.t > RAY_EPSILON)
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        self.hit_at(ray).map(IntersectionInterval::degenerate).into_iter().collect()
    }

    fn is_solid(&self) -> bool {
        false
    }

    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    fn inverse_transform(&self) -> Matrix4f {
        self.transform.inverse()
    }
}

/// Axis-aligned [-1,1]^3 box in object space; prisms are this under a
/// non-uniform scale.
pub struct Cube {
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Cube {
    pub fn new(transform: Transform, material: Arc<dyn Material>) -> Self {
        Cube { transform, material }
    }
}

impl Shape for Cube {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);

        let mut t_near = -INFINITY;
        let mut t_far = INFINITY;
        let mut axis_near = 0;
        let mut axis_far = 0;
        for i in 0..3 {
            if d[i].abs() < PARALLEL {
                // Slab never entered or exited; origin must already be inside it.
                if o[i].abs() > 1.0 {
                    return vec![];
                }
                continue;
            }
            let mut t0 = (-1.0 - o[i]) / d[i];
            let mut t1 = (1.0 - o[i]) / d[i];
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_near {
                t_near = t0;
                axis_near = i;
            }
            if t1 < t_far {
                t_far = t1;
                axis_far = i;
            }
            if t_near > t_far {
                return vec![];
            }
        }
        if !t_near.is_finite() || !t_far.is_finite() {
            return vec![];
        }

        let face_normal = |axis: usize, t: Float| {
            let mut n = Vector3f::zero();
            n[axis] = (o[axis] + d[axis] * t).signum();
            self.transform.normal_to_world(n)
        };
        let entry = Intersection::new(ray.at(t_near), face_normal(axis_near, t_near), t_near, self as &dyn Shape);
        if t_far - t_near < TANGENT_WELD {
            return vec![IntersectionInterval::degenerate(entry)];
        }
        let exit = Intersection::new(ray.at(t_far), face_normal(axis_far, t_far), t_far, self as &dyn Shape);
        vec![IntersectionInterval::new(entry, exit)]
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    fn inverse_transform(&self) -> Matrix4f {
        self.transform.inverse()
    }
}

/// A single triangle, Moeller-Trumbore. Not a solid.
pub struct Triangle {
    a: Point3f,
    b: Point3f,
    c: Point3f,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Triangle {
    pub fn new(
        a: Point3f,
        b: Point3f,
        c: Point3f,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Triangle { a, b, c, transform, material }
    }

    fn hit_at(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let pvec = d.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < PARALLEL {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = o - self.a;
        let u = tvec.dot(pvec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return None;
        }
        let qvec = tvec.cross(e1);
        let v = d.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(qvec) * inv_det;
        Some(Intersection::new(
            ray.at(t),
            self.transform.normal_to_world(e1.cross(e2).normalize()),
            t,
            self as &dyn Shape,
        ))
    }
}

impl Shape for Triangle {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        self.hit_at(ray).filter(|hit| hit.t > RAY_EPSILON)
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        self.hit_at(ray).map(IntersectionInterval::degenerate).into_iter().collect()
    }

    fn is_solid(&self) -> bool {
        false
    }

    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    fn inverse_transform(&self) -> Matrix4f {
        self.transform.inverse()
    }
}

/// Bounded quad on the object-space z = 0 plane. Not a solid.
pub struct Rectangle {
    half_u: Float,
    half_v: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Rectangle {
    pub fn new(
        half_u: Float,
        half_v: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Rectangle { half_u, half_v, transform, material }
    }

    fn hit_at(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        if d.z.abs() < PARALLEL {
            return None;
        }
        let t = -o.z / d.z;
        let p = o + d * t;
        if p.x.abs() > self.half_u || p.y.abs() > self.half_v {
            return None;
        }
        Some(Intersection::new(
            ray.at(t),
            self.transform.normal_to_world(Vector3f::unit_z()),
            t,
            self as &dyn Shape,
        ))
    }
}

impl Shape for Rectangle {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        self.hit_at(ray).filter(|hit| hit.t > RAY_EPSILON)
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        self.hit_at(ray).map(IntersectionInterval::degenerate).into_iter().collect()
    }

    fn is_solid(&self) -> bool {
        false
    }

    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    fn inverse_transform(&self) -> Matrix4f {
        self.transform.inverse()
    }
}
