use crate::geom::{Ray3f, RAY_EPSILON};
use crate::lights::Light;
use crate::shape::{Intersection, Shape};
use crate::types::*;

/// The world: unordered shapes and lights, built once by the caller and
/// read-only while rendering. No spatial index; queries are a linear scan.
#[derive(Default)]
pub struct Scene {
    pub shapes: Vec<Box<dyn Shape>>,
    pub lights: Vec<Box<dyn Light>>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    pub fn add_shape(&mut self, shape: Box<dyn Shape>) {
        self.shapes.push(shape);
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    /// Nearest hit across all shapes; ties by smallest positive t, first
    /// shape winning.
    pub fn intersect(&self, ray: &Ray3f) -> Option<Intersection<'_>> {
        self.shapes.iter().fold(None, |best, shape| match (best, shape.intersect(ray)) {
            (None, hit) => hit,
            (Some(best), None) => Some(best),
            (Some(best), Some(hit)) => Some(iff!(hit.t < best.t, hit, best)),
        })
    }

    /// Whether any opaque shape blocks the segment from the ray origin up to
    /// `max_distance`. Transmissive shapes cast no hard shadow.
    pub fn occluded(&self, ray: &Ray3f, max_distance: Float) -> bool {
        self.shapes.iter().any(|shape| match shape.intersect(ray) {
            Some(hit) => {
                hit.t < max_distance - RAY_EPSILON && hit.shape.material().transparency() == 0.0
            }
            None => false,
        })
    }
}
