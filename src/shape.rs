use std::sync::Arc;

use crate::geom::{Ray3f, RAY_EPSILON};
use crate::material::Material;
use crate::types::*;

/// A single hit. Created per query, never cached. `normal` is unit length
/// and points out of the surface geometrically; shading flips it to face the
/// viewer where needed.
#[derive(Copy, Clone)]
pub struct Intersection<'a> {
    pub point: Point3f,
    pub normal: Vector3f,
    pub t: Float,
    pub shape: &'a dyn Shape,
}

impl<'a> Intersection<'a> {
    pub fn new(point: Point3f, normal: Vector3f, t: Float, shape: &'a dyn Shape) -> Self {
        Intersection { point, normal, t, shape }
    }
}

/// The span over which a ray's supporting line is inside a solid. Spans may
/// start behind the origin (negative t); nearest-hit queries filter on
/// `t > RAY_EPSILON`. Callers must not assume `t_in <= t_out` — use
/// `sorted()`. Non-solids report a degenerate span with `t_in == t_out`.
#[derive(Copy, Clone)]
pub struct IntersectionInterval<'a> {
    pub t_in: Float,
    pub t_out: Float,
    pub hit_in: Intersection<'a>,
    pub hit_out: Intersection<'a>,
}

impl<'a> IntersectionInterval<'a> {
    pub fn new(hit_in: Intersection<'a>, hit_out: Intersection<'a>) -> Self {
        IntersectionInterval { t_in: hit_in.t, t_out: hit_out.t, hit_in, hit_out }
    }

    pub fn degenerate(hit: Intersection<'a>) -> Self {
        IntersectionInterval { t_in: hit.t, t_out: hit.t, hit_in: hit, hit_out: hit }
    }

    /// (entry, exit) ordered by t.
    pub fn sorted(&self) -> (&Intersection<'a>, &Intersection<'a>) {
        iff!(self.t_in <= self.t_out, (&self.hit_in, &self.hit_out), (&self.hit_out, &self.hit_in))
    }

    pub fn span(&self) -> Float {
        (self.t_out - self.t_in).abs()
    }
}

pub trait Shape: Sync + Send {
    /// Nearest hit with `t > RAY_EPSILON`, or None. An origin resting on the
    /// surface does not self-intersect; tangential contact is a single hit.
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>>;

    /// All entry/exit spans along the ray's supporting line, ordered by
    /// entry t. Non-solids return one degenerate span or nothing.
    fn intersect_intervals(&self, ray: &Ray3f) -> Vec<IntersectionInterval<'_>>;

    /// Whether the shape bounds a volume. CSG children must.
    fn is_solid(&self) -> bool;

    fn material(&self) -> &Arc<dyn Material>;

    /// Inverse of the world transform, for materials evaluating object-space
    /// procedural patterns.
    fn inverse_transform(&self) -> Matrix4f;
}

/// First boundary of any interval with `t > RAY_EPSILON` — the default
/// nearest-hit query for solids that already computed their interval list.
pub fn nearest_boundary<'a>(intervals: &[IntersectionInterval<'a>]) -> Option<Intersection<'a>> {
    intervals
        .iter()
        .flat_map(|iv| {
            let (entry, exit) = iv.sorted();
            vec![*entry, *exit]
        })
        .filter(|hit| hit.t > RAY_EPSILON)
        .fold(None, |best: Option<Intersection>, hit| match best {
            Some(b) if b.t <= hit.t => Some(b),
            _ => Some(hit),
        })
}

/// Classify a t-sorted list of candidate boundary hits into inside spans by
/// probing solid containment at span midpoints. Near-coincident boundaries
/// (tangencies, cap/side seams) collapse into one. Used by the capped
/// quadrics, whose boundary candidates come from several surface pieces.
pub fn intervals_from_boundaries<'a, F>(
    mut hits: Vec<Intersection<'a>>,
    contains: F,
) -> Vec<IntersectionInterval<'a>>
where
    F: Fn(Float) -> bool,
{
    const WELD: Float = 1e-9;
    hits.sort_by(|a, b| a.t.partial_cmp(&b.t).expect("NaN boundary t"));
    hits.dedup_by(|a, b| (a.t - b.t).abs() < WELD);

    match hits.len() {
        0 => vec![],
        1 => vec![IntersectionInterval::degenerate(hits[0])],
        _ => {
            let mut out = Vec::new();
            let mut i = 0;
            while i + 1 < hits.len() {
                let mid = (hits[i].t + hits[i + 1].t) / 2.0;
                if contains(mid) {
                    out.push(IntersectionInterval::new(hits[i], hits[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            out
        }
    }
}
