//! Capped second-order solids. Each intersector collects candidate boundary
//! hits from its surface pieces (side quadric, cap disks), then classifies
//! them into inside spans with the midpoint-containment helper, so seams and
//! tangencies fall out of one code path.

use std::sync::Arc;

use crate::geom::Ray3f;
use crate::material::Material;
use crate::roots::solve_quadratic;
use crate::shape::{
    intervals_from_boundaries, nearest_boundary, Intersection, IntersectionInterval, Shape,
};
use crate::transform::Transform;
use crate::types::*;

const CLIP_SLACK: Float = 1e-9;

/// z-axis cylinder of given radius, capped at z = +-half_height.
pub struct Cylinder {
    radius: Float,
    half_height: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Cylinder {
    pub fn new(
        radius: Float,
        half_height: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Cylinder { radius, half_height, transform, material }
    }
}

impl Shape for Cylinder {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let (r, h) = (self.radius, self.half_height);
        let mut hits = Vec::new();

        // Side surface.
        for t in solve_quadratic(
            d.x * d.x + d.y * d.y,
            2.0 * (o.x * d.x + o.y * d.y),
            o.x * o.x + o.y * o.y - r * r,
        ) {
            let p = o + d * t;
            if p.z.abs() <= h + CLIP_SLACK {
                let n = Vector3f::new(p.x, p.y, 0.0) / r;
                hits.push(Intersection::new(
                    ray.at(t),
                    self.transform.normal_to_world(n),
                    t,
                    self as &dyn Shape,
                ));
            }
        }

        // Cap disks.
        if d.z.abs() > crate::prims::PARALLEL {
            for &cap_z in &[-h, h] {
                let t = (cap_z - o.z) / d.z;
                let p = o + d * t;
                if p.x * p.x + p.y * p.y <= r * r + CLIP_SLACK {
                    let n = Vector3f::new(0.0, 0.0, cap_z.signum());
                    hits.push(Intersection::new(
                        ray.at(t),
                        self.transform.normal_to_world(n),
                        t,
                        self as &dyn Shape,
                    ));
                }
            }
        }

        intervals_from_boundaries(hits, |t| {
            let p = o + d * t;
            p.x * p.x + p.y * p.y <= r * r && p.z.abs() <= h
        })
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

/// z-axis cone: apex at (0,0,height), base disk of `radius` at z = 0.
pub struct Cone {
    radius: Float,
    height: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Cone {
    pub fn new(
        radius: Float,
        height: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Cone { radius, height, transform, material }
    }
}

impl Shape for Cone {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let h = self.height;
        let k2 = (self.radius / h) * (self.radius / h);
        let mut hits = Vec::new();

        // Slant surface; the quadric's mirror nappe above the apex is
        // rejected by the z clip.
        for t in solve_quadratic(
            d.x * d.x + d.y * d.y - k2 * d.z * d.z,
            2.0 * (o.x * d.x + o.y * d.y - k2 * (o.z - h) * d.z),
            o.x * o.x + o.y * o.y - k2 * (o.z - h) * (o.z - h),
        ) {
            let p = o + d * t;
            if p.z >= -CLIP_SLACK && p.z <= h + CLIP_SLACK {
                let n = Vector3f::new(p.x, p.y, -k2 * (p.z - h));
                if n.magnitude2() > 0.0 {
                    hits.push(Intersection::new(
                        ray.at(t),
                        self.transform.normal_to_world(n.normalize()),
                        t,
                        self as &dyn Shape,
                    ));
                }
            }
        }

        // Base disk.
        if d.z.abs() > crate::prims::PARALLEL {
            let t = -o.z / d.z;
            let p = o + d * t;
            if p.x * p.x + p.y * p.y <= self.radius * self.radius + CLIP_SLACK {
                hits.push(Intersection::new(
                    ray.at(t),
                    self.transform.normal_to_world(-Vector3f::unit_z()),
                    t,
                    self as &dyn Shape,
                ));
            }
        }

        intervals_from_boundaries(hits, |t| {
            let p = o + d * t;
            p.z >= 0.0 && p.z <= h && p.x * p.x + p.y * p.y <= k2 * (p.z - h) * (p.z - h)
        })
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

/// Ellipsoid with semi-axes (a, b, c) about the object-space origin.
pub struct Ellipsoid {
    semi: Vector3f,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Ellipsoid {
    pub fn new(
        a: Float,
        b: Float,
        c: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Ellipsoid { semi: Vector3f::new(a, b, c), transform, material }
    }
}

impl Shape for Ellipsoid {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        // Scale into the unit-sphere frame.
        let q = o.to_vec().div_element_wise(self.semi);
        let w = d.div_element_wise(self.semi);
        let roots = solve_quadratic(w.magnitude2(), 2.0 * w.dot(q), q.magnitude2() - 1.0);

        let hit = |t: Float| {
            let p = o + d * t;
            let n = Vector3f::new(
                p.x / (self.semi.x * self.semi.x),
                p.y / (self.semi.y * self.semi.y),
                p.z / (self.semi.z * self.semi.z),
            );
            Intersection::new(
                ray.at(t),
                self.transform.normal_to_world(n.normalize()),
                t,
                self as &dyn Shape,
            )
        };
        match roots.as_slice() {
            [] => vec![],
            [t] => vec![IntersectionInterval::degenerate(hit(*t))],
            [t0, t1] if t1 - t0 < crate::prims::TANGENT_WELD => {
                vec![IntersectionInterval::degenerate(hit(*t0))]
            }
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

/// One-sheet hyperboloid x^2/a^2 + y^2/b^2 - z^2/c^2 = 1, clipped to
/// |z| <= half_height and closed with elliptic cap disks.
pub struct Hyperboloid {
    semi: Vector3f,
    half_height: Float,
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Hyperboloid {
    pub fn new(
        a: Float,
        b: Float,
        c: Float,
        half_height: Float,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Self {
        Hyperboloid { semi: Vector3f::new(a, b, c), half_height, transform, material }
    }

    fn waist(&self, p: Vector3f) -> Float {
        let s = self.semi;
        p.x * p.x / (s.x * s.x) + p.y * p.y / (s.y * s.y) - p.z * p.z / (s.z * s.z)
    }
}

impl Shape for Hyperboloid {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>> {
        let (o, d) = self.transform.ray_to_object(ray);
        let s = self.semi;
        let h = self.half_height;
        let mut hits = Vec::new();

        // Side sheet.
        for t in solve_quadratic(
            d.x * d.x / (s.x * s.x) + d.y * d.y / (s.y * s.y) - d.z * d.z / (s.z * s.z),
            2.0 * (o.x * d.x / (s.x * s.x) + o.y * d.y / (s.y * s.y) - o.z * d.z / (s.z * s.z)),
            self.waist(o.to_vec()) - 1.0,
        ) {
            let p = o + d * t;
            if p.z.abs() <= h + CLIP_SLACK {
                let n = Vector3f::new(p.x / (s.x * s.x), p.y / (s.y * s.y), -p.z / (s.z * s.z));
                hits.push(Intersection::new(
                    ray.at(t),
                    self.transform.normal_to_world(n.normalize()),
                    t,
                    self as &dyn Shape,
                ));
            }
        }

        // Cap disks: at z the cross-section is the ellipse scaled by
        // sqrt(1 + z^2/c^2).
        if d.z.abs() > crate::prims::PARALLEL {
            for &cap_z in &[-h, h] {
                let t = (cap_z - o.z) / d.z;
                let p = o + d * t;
                let bound = 1.0 + cap_z * cap_z / (s.z * s.z);
                if p.x * p.x / (s.x * s.x) + p.y * p.y / (s.y * s.y) <= bound + CLIP_SLACK {
                    let n = Vector3f::new(0.0, 0.0, cap_z.signum());
                    hits.push(Intersection::new(
                        ray.at(t),
                        self.transform.normal_to_world(n),
                        t,
                        self as &dyn Shape,
                    ));
                }
            }
        }

        intervals_from_boundaries(hits, |t| {
            let p = (o + d * t).to_vec();
            self.waist(p) <= 1.0 && p.z.abs() <= h
        })
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
