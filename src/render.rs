use log::info;
use rayon::prelude::*;
use std::time::Instant;

use crate::camera::Camera;
use crate::framebuf::FrameBuf;
use crate::geom::{fresnel_schlick, reflect, refract, Ray3f, MIN_ENERGY, RAY_EPSILON};
use crate::scene::Scene;
use crate::types::*;

/// Render the scene through the camera onto a fresh raster. Rows are traced
/// in parallel; every pixel is an independent `trace` call against the
/// read-only scene graph, so the row writes need no synchronization.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    background: Colorf,
    width: usize,
    height: usize,
) -> FrameBuf {
    let tracer = Tracer { scene, camera, background };
    let started = Instant::now();
    info!(
        "rendering {}x{} ({} shapes, {} lights, depth {})",
        width,
        height,
        scene.shapes.len(),
        scene.lights.len(),
        camera.max_depth
    );

    let mut frame = FrameBuf::new(width, height);
    frame.pixels_mut().par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, pixel) in row.iter_mut().enumerate() {
            let ray = camera.primary_ray(x, y, width, height);
            *pixel = tracer.trace(&ray, 0);
        }
    });

    info!("rendered in {:?}", started.elapsed());
    frame
}

pub struct Tracer<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub background: Colorf,
}

impl<'a> Tracer<'a> {
    /// Whitted-style recursive shading. Terminates on either the depth
    /// counter or the decayed ray energy; each call spawns at most one
    /// reflection and one refraction child.
    pub fn trace(&self, ray: &Ray3f, depth: u32) -> Colorf {
        if depth > self.camera.max_depth || ray.energy < MIN_ENERGY {
            return self.background;
        }
        let hit = match self.scene.intersect(ray) {
            Some(hit) => hit,
            None => return self.background,
        };

        let material = hit.shape.material();
        // Shade with the normal facing the incoming ray; remember which side
        // we are on for the refraction index ratio.
        let entering = ray.direction.dot(hit.normal) < 0.0;
        let normal = iff!(entering, hit.normal, -hit.normal);

        // Local term: every light in scene order, ambient unconditionally,
        // the rest behind a hard shadow test.
        let mut local = Colorf::zero();
        for light in &self.scene.lights {
            if let Some(ill) = light.illumination(hit.point) {
                if self.camera.shadows {
                    let shadow_ray = Ray3f::new(hit.point + normal * RAY_EPSILON, ill.direction);
                    if self.scene.occluded(&shadow_ray, ill.distance) {
                        continue;
                    }
                }
            }
            local += material.color_at(hit.point, normal, light.as_ref(), ray.origin);
        }

        let can_bounce = depth < self.camera.max_depth;
        let mut reflect_weight = iff!(
            self.camera.reflections && material.reflectivity() > 0.0 && can_bounce,
            material.reflectivity(),
            0.0
        );
        let mut refract_weight = 0.0;
        let mut refract_dir = None;

        if self.camera.refractions && material.transparency() > 0.0 && can_bounce {
            let ior = material.index_of_refraction();
            let (n1, n2) = iff!(entering, (1.0, ior), (ior, 1.0));
            let kr = fresnel_schlick(ray.direction.dot(normal), n1, n2);
            let transparency = material.transparency();
            match refract(ray.direction, normal, n1 / n2) {
                Some(dir) => {
                    // Fresnel split of the transmitted budget: kr of it
                    // reflects, the rest refracts. Total weight stays within
                    // reflectivity + transparency.
                    refract_dir = Some(dir);
                    refract_weight = transparency * (1.0 - kr);
                    reflect_weight += (1.0 - reflect_weight) * transparency * kr;
                }
                None => {
                    // Total internal reflection: the whole transmitted
                    // budget reflects instead.
                    reflect_weight += (1.0 - reflect_weight) * transparency;
                }
            }
        }

        let mut color = local * (1.0 - reflect_weight - refract_weight).max(0.0);

        if reflect_weight > 0.0 {
            let dir = reflect(ray.direction, normal);
            let child = ray.child(hit.point + normal * RAY_EPSILON, dir, reflect_weight);
            color += self.trace(&child, depth + 1) * reflect_weight;
        }
        if let Some(dir) = refract_dir {
            let child = ray.child(hit.point - normal * RAY_EPSILON, dir, refract_weight);
            color += self.trace(&child, depth + 1) * refract_weight;
        }

        color
    }
}
