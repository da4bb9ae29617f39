//! Fourth-order and distance-field solids: the torus solves its quartic in
//! closed form; the torus knot has no closed form and is root-found
//! numerically along the ray.

use std::sync::Arc;

use crate::geom::Ray3f;
use crate::material::Material;
use crate::roots::{solve_quadratic, solve_quartic};
use crate::shape::{
    intervals_from_boundaries, nearest_boundary, Intersection, IntersectionInterval, Shape,
};
use crate::transform::Transform;
use crate::types::*;

/// z-axis torus: tube of `minor_radius` around a circle of `major_radius`
/// in the z = 0 plane.
pub struct Torus {
    major_radius: Float,
    minor_radius: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Torus {
    pub fn new(
        major_radius: Float,
        minor_radius: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Torus { major_radius, minor_radius, transform, material }
    }

    fn contains(&self, p: Vector3f) -> bool {
        let ring = (p.x * p.x + p.y * p.y).sqrt() - self.major_radius;
        ring * ring + p.z * p.z <= self.minor_radius * self.minor_radius
    }

    fn normal_at(&self, p: Vector3f) -> Vector3f {
        // Gradient of ((|p|^2 + R^2 - r^2)^2 - 4R^2(x^2 + y^2)).
        let r2 = self.major_radius * self.major_radius;
        let k = p.magnitude2() + r2 - self.minor_radius * self.minor_radius;
        Vector3f::new((k - 2.0 * r2) * p.x, (k - 2.0 * r2) * p.y, k * p.z).normalize()
    }
}

impl Shape for Torus {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let oc = o.to_vec();
        let r2 = self.major_radius * self.major_radius;
        let a2 = self.minor_radius * self.minor_radius;

        let sum_d2 = d.magnitude2();
        let e = oc.magnitude2() - r2 - a2;
        let f = oc.dot(d);

        let roots = solve_quartic(
            sum_d2 * sum_d2,
            4.0 * sum_d2 * f,
            2.0 * sum_d2 * e + 4.0 * f * f + 4.0 * r2 * d.z * d.z,
            4.0 * f * e + 8.0 * r2 * oc.z * d.z,
            e * e - 4.0 * r2 * (a2 - oc.z * oc.z),
        );

        let hits = roots
            .into_iter()
            .map(|t| {
                let p = oc + d * t;
                Intersection::new(
                    ray.at(t),
                    self.transform.normal_to_world(self.normal_at(p)),
                    t,
                    self as &dyn Shape,
                )
            })
            .collect();

        intervals_from_boundaries(hits, |t| self.contains(oc + d * t))
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

/// Tube of `tube_radius` swept along a (p,q) torus-knot curve. No closed
/// form exists; the signed distance to a precomputed polyline of the curve
/// is scanned along the ray and each sign change is refined by bisection.
pub struct TorusKnot {
    tube_radius: Float,
    /// Curve samples, dense enough that the polyline error is far below the
    /// tube radius.
    curve: Vec<Vector3f>,
    bound_radius: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

const KNOT_SAMPLES: usize = 1024;
const BISECT_STEPS: usize = 48;

impl TorusKnot {
    pub fn new(
        p: u32,
        q: u32,
        major_radius: Float,
        knot_radius: Float,
        tube_radius: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        let (pf, qf) = (p as Float, q as Float);
        let curve = (0..KNOT_SAMPLES)
            .map(|i| {
                let theta = 2.0 * PI * i as Float / KNOT_SAMPLES as Float;
                let ring = major_radius + knot_radius * (qf * theta).cos();
                Vector3f::new(
                    ring * (pf * theta).cos(),
                    ring * (pf * theta).sin(),
                    knot_radius * (qf * theta).sin(),
                )
            })
            .collect();
        TorusKnot {
            tube_radius,
            curve,
            bound_radius: major_radius + knot_radius + tube_radius,
            transform,
            material,
        }
    }

    /// Signed distance: negative inside the tube.
    fn sdf(&self, p: Vector3f) -> Float {
        let min2 = self
            .curve
            .iter()
            .map(|&c| (p - c).magnitude2())
            .fold(FLOAT_MAX, |best, d2| iff!(d2 < best, d2, best));
        min2.sqrt() - self.tube_radius
    }

    fn gradient(&self, p: Vector3f) -> Vector3f {
        const H: Float = 1e-5;
        let dx = self.sdf(p + Vector3f::unit_x() * H) - self.sdf(p - Vector3f::unit_x() * H);
        let dy = self.sdf(p + Vector3f::unit_y() * H) - self.sdf(p - Vector3f::unit_y() * H);
        let dz = self.sdf(p + Vector3f::unit_z() * H) - self.sdf(p - Vector3f::unit_z() * H);
        Vector3f::new(dx, dy, dz).normalize()
    }
}

impl Shape for TorusKnot {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let oc = o.to_vec();

        // Clip to the knot's bounding sphere before scanning.
        let clip = solve_quadratic(
            d.magnitude2(),
            2.0 * d.dot(oc),
            oc.magnitude2() - self.bound_radius * self.bound_radius,
        );
        let (t_enter, t_exit) = match clip.as_slice() {
            [t0, t1] => (*t0, *t1),
            _ => return vec![],
        };

        // Scan in arc length, not ray parameter: the object-space direction
        // is unnormalized under scaling transforms.
        let dl = d.magnitude();
        let at = |t: Float| oc + d * t;
        let step = self.tube_radius / (2.0 * dl);

        let mut hits = Vec::new();
        let mut t_prev = t_enter;
        let mut f_prev = self.sdf(at(t_prev));
        let mut t = t_enter + step;
        while t_prev < t_exit {
            let t_cur = min!(t, t_exit);
            let f_cur = self.sdf(at(t_cur));
            if f_prev.signum() != f_cur.signum() {
                // Bracketed a surface crossing; bisect it down.
                let (mut lo, mut hi) = (t_prev, t_cur);
                let mut f_lo = f_prev;
                for _ in 0..BISECT_STEPS {
                    let mid = (lo + hi) / 2.0;
                    let f_mid = self.sdf(at(mid));
                    if f_mid.signum() == f_lo.signum() {
                        lo = mid;
                        f_lo = f_mid;
                    } else {
                        hi = mid;
                    }
                }
                let t_root = (lo + hi) / 2.0;
                hits.push(Intersection::new(
                    ray.at(t_root),
                    self.transform.normal_to_world(self.gradient(at(t_root))),
                    t_root,
                    self as &dyn Shape,
                ));
            }
            t_prev = t_cur;
            f_prev = f_cur;
            t += step;
        }

        intervals_from_boundaries(hits, |t| self.sdf(at(t)) < 0.0)
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
