//! Boolean solids over ray-interval algebra. The combinators never look at
//! child geometry: both children report the spans over which the ray is
//! inside them, and a single sweep over the merged boundary events decides
//! which sub-spans survive. This stays correct for concave and overlapping
//! children where point-sampling booleans break down.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::geom::Ray3f;
use crate::material::Material;
use crate::shape::{nearest_boundary, Intersection, IntersectionInterval, Shape};
use crate::transform::Transform;
use crate::types::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CsgOp {
    Union,
    Intersection,
    Difference,
}

impl CsgOp {
    fn combine(self, in_left: bool, in_right: bool) -> bool {
        match self {
            CsgOp::Union => in_left || in_right,
            CsgOp::Intersection => in_left && in_right,
            CsgOp::Difference => in_left && !in_right,
        }
    }
}

/// A boolean combination of two solids. A `CsgShape` is itself a solid
/// shape, so combinations nest and carry their own transform.
pub struct CsgShape {
    op: CsgOp,
    left: Box<dyn Shape>,
    right: Box<dyn Shape>,
    transform: Transform,
    material: Arc<dyn Material>,
}

struct Event<'a> {
    t: Float,
    from_right: bool,
    entering: bool,
    hit: Intersection<'a>,
}

/// Surviving spans shorter than this are tangential contacts, not hits.
const SPAN_EPSILON: Float = 1e-9;

impl CsgShape {
    pub fn new(
        op: CsgOp,
        left: Box<dyn Shape>,
        right: Box<dyn Shape>,
        transform: Transform,
        material: Arc<dyn Material>,
    ) -> Result<Self, ConfigError> {
        if !left.is_solid() {
            return Err(ConfigError::NonSolidCsgChild("left"));
        }
        if !right.is_solid() {
            return Err(ConfigError::NonSolidCsgChild("right"));
        }
        Ok(CsgShape { op, left, right, transform, material })
    }

    /// A boundary the subtracted child contributes to a Difference faces out
    /// of the remaining solid, so its normal flips.
    fn orient<'a>(&self, ev: &Event<'a>) -> Intersection<'a> {
        let mut hit = ev.hit;
        if self.op == CsgOp::Difference && ev.from_right {
            hit.normal = -hit.normal;
        }
        hit
    }
}

fn push_events<'a>(
    events: &mut Vec<Event<'a>>,
    intervals: Vec<IntersectionInterval<'a>>,
    from_right: bool,
) {
    for iv in &intervals {
        let (entry, exit) = iv.sorted();
        events.push(Event { t: entry.t, from_right, entering: true, hit: *entry });
        events.push(Event { t: exit.t, from_right, entering: false, hit: *exit });
    }
}

impl Shape for CsgShape {
    fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        nearest_boundary(&self.intersect_intervals(ray))
    }

    fn intersect_intervals<'s>(&'s self, ray: &Ray3f) -> Vec<IntersectionInterval<'s>> {
        let (origin, direction) = self.transform.ray_to_object(ray);
        // The direction stays unnormalized so child t values are valid on
        // the world ray verbatim.
        let obj_ray = Ray3f { origin, direction, energy: ray.energy };

        let mut events = Vec::new();
        push_events(&mut events, self.left.intersect_intervals(&obj_ray), false);
        push_events(&mut events, self.right.intersect_intervals(&obj_ray), true);
        // Entries before exits at equal t, so tangential contact produces a
        // zero-length span (dropped below) rather than a spurious gap.
        events.sort_by(|a, b| {
            a.t.partial_cmp(&b.t)
                .expect("NaN event t")
                .then(b.entering.cmp(&a.entering))
        });

        let mut inside_left = false;
        let mut inside_right = false;
        let mut entry: Option<Intersection> = None;
        let mut out = Vec::new();

        for ev in &events {
            let was = self.op.combine(inside_left, inside_right);
            if ev.from_right {
                inside_right = ev.entering;
            } else {
                inside_left = ev.entering;
            }
            let now = self.op.combine(inside_left, inside_right);

            if !was && now {
                entry = Some(self.orient(ev));
            } else if was && !now {
                if let Some(enter_hit) = entry.take() {
                    let exit_hit = self.orient(ev);
                    if (exit_hit.t - enter_hit.t).abs() > SPAN_EPSILON {
                        out.push(IntersectionInterval::new(enter_hit, exit_hit));
                    }
                }
            }
        }

        // Lift surviving boundaries out of this composite's object space.
        out.iter()
            .map(|iv| {
                let lift = |hit: &Intersection<'s>| -> Intersection<'s> {
                    let mut h = *hit;
                    h.point = self.transform.point_to_world(h.point);
                    h.normal = self.transform.normal_to_world(h.normal);
                    h
                };
                IntersectionInterval::new(lift(&iv.hit_in), lift(&iv.hit_out))
            })
            .collect()
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
