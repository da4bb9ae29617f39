use std::path::Path;
use std::sync::Arc;

use crate::lights::Light;
use crate::texture::texture_cache;
use crate::types::*;

/// The appearance capability the kernel consumes. The kernel never inspects
/// a material's parameters; it only asks for a color under one light and for
/// the three scalar coefficients driving secondary rays.
pub trait Material: Sync + Send {
    /// Appearance of the surface point under a single light, as seen from
    /// `viewer`. Shadowing is the caller's concern.
    fn color_at(
        &self,
        point: Point3f,
        normal: Vector3f,
        light: &dyn Light,
        viewer: Point3f,
    ) -> Colorf;

    fn reflectivity(&self) -> Float {
        0.0
    }

    fn transparency(&self) -> Float {
        0.0
    }

    fn index_of_refraction(&self) -> Float {
        1.0
    }

    /// Receives the owning shape's inverse transform so object-space
    /// procedural patterns follow the shape's placement. Called while the
    /// scene is being built, before the material is shared.
    fn set_object_transform(&mut self, _inverse: Matrix4f) {}
}

/// Classic Phong shading with optional reflective/transmissive behavior.
pub struct Phong {
    pub albedo: Colorf,
    pub specular: Float,
    pub shininess: Float,
    pub reflectivity: Float,
    pub transparency: Float,
    pub ior: Float,
}

impl Phong {
    pub fn matte(albedo: Colorf) -> Self {
        Phong { albedo, specular: 0.0, shininess: 1.0, reflectivity: 0.0, transparency: 0.0, ior: 1.0 }
    }

    pub fn polished(albedo: Colorf, reflectivity: Float) -> Self {
        Phong { albedo, specular: 0.5, shininess: 32.0, reflectivity, transparency: 0.0, ior: 1.0 }
    }

    pub fn glass(ior: Float) -> Self {
        Phong {
            albedo: Colorf::new(1.0, 1.0, 1.0),
            specular: 0.5,
            shininess: 64.0,
            reflectivity: 0.0,
            transparency: 0.95,
            ior,
        }
    }

    fn shade(&self, albedo: Colorf, point: Point3f, normal: Vector3f, light: &dyn Light, viewer: Point3f) -> Colorf {
        let light_color = light.color() * light.intensity();
        match light.illumination(point) {
            // Ambient: constant, geometry-free.
            None => albedo.mul_element_wise(light_color),
            Some(ill) => {
                let diffuse = normal.dot(ill.direction).max(0.0);
                let mut color = albedo.mul_element_wise(light_color) * diffuse;
                if self.specular > 0.0 && diffuse > 0.0 {
                    let to_viewer = (viewer - point).normalize();
                    let half = (ill.direction + to_viewer).normalize();
                    let highlight = normal.dot(half).max(0.0).powf(self.shininess);
                    color += light_color * self.specular * highlight;
                }
                color * ill.attenuation
            }
        }
    }
}

impl Material for Phong {
    fn color_at(
        &self,
        point: Point3f,
        normal: Vector3f,
        light: &dyn Light,
        viewer: Point3f,
    ) -> Colorf {
        self.shade(self.albedo, point, normal, light, viewer)
    }

    fn reflectivity(&self) -> Float {
        self.reflectivity
    }

    fn transparency(&self) -> Float {
        self.transparency
    }

    fn index_of_refraction(&self) -> Float {
        self.ior
    }
}

/// Object-space checkerboard over a Phong base. The pattern is evaluated in
/// the shape's local frame, so it sticks to the shape under any transform.
pub struct Checker {
    pub even: Colorf,
    pub odd: Colorf,
    pub cell: Float,
    base: Phong,
    object_inverse: Matrix4f,
}

impl Checker {
    pub fn new(even: Colorf, odd: Colorf, cell: Float) -> Self {
        Checker { even, odd, cell, base: Phong::matte(even), object_inverse: Matrix4f::identity() }
    }

    fn albedo_at(&self, point: Point3f) -> Colorf {
        let p = Point3f::from_homogeneous(self.object_inverse * point.to_homogeneous());
        let parity = (p.x / self.cell).floor() + (p.y / self.cell).floor() + (p.z / self.cell).floor();
        iff!(parity.rem_euclid(2.0) < 1.0, self.even, self.odd)
    }
}

impl Material for Checker {
    fn color_at(
        &self,
        point: Point3f,
        normal: Vector3f,
        light: &dyn Light,
        viewer: Point3f,
    ) -> Colorf {
        self.base.shade(self.albedo_at(point), point, normal, light, viewer)
    }

    fn set_object_transform(&mut self, inverse: Matrix4f) {
        self.object_inverse = inverse;
    }
}

/// Planar-mapped bitmap texture over a Phong base, decoded through the
/// process-wide cache. Missing or broken files shade with the cache's
/// fallback pixels; the kernel never sees the failure.
pub struct Textured {
    image: Arc<image::RgbImage>,
    pub scale: Float,
    base: Phong,
    object_inverse: Matrix4f,
}

impl Textured {
    pub fn new(path: &Path, scale: Float) -> Self {
        Textured {
            image: texture_cache().load(path),
            scale,
            base: Phong::matte(Colorf::new(1.0, 1.0, 1.0)),
            object_inverse: Matrix4f::identity(),
        }
    }

    fn albedo_at(&self, point: Point3f) -> Colorf {
        let p = Point3f::from_homogeneous(self.object_inverse * point.to_homogeneous());
        let u = (p.x / self.scale).rem_euclid(1.0);
        let v = (p.y / self.scale).rem_euclid(1.0);
        let x = ((u * self.image.width() as Float) as u32).min(self.image.width() - 1);
        let y = ((v * self.image.height() as Float) as u32).min(self.image.height() - 1);
        let px = self.image.get_pixel(x, y);
        Colorf::new(px[0] as Float, px[1] as Float, px[2] as Float) / 255.0
    }
}

impl Material for Textured {
    fn color_at(
        &self,
        point: Point3f,
        normal: Vector3f,
        light: &dyn Light,
        viewer: Point3f,
    ) -> Colorf {
        self.base.shade(self.albedo_at(point), point, normal, light, viewer)
    }

    fn set_object_transform(&mut self, inverse: Matrix4f) {
        self.object_inverse = inverse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::{AmbientLight, PointLight};
    use approx::assert_abs_diff_eq;

    #[test]
    fn ambient_term_ignores_geometry() {
        let m = Phong::matte(Colorf::new(0.5, 0.5, 0.5));
        let l = AmbientLight { color: Colorf::new(1.0, 1.0, 1.0), intensity: 0.2 };
        let c = m.color_at(Point3f::new(0.0, 0.0, 0.0), Vector3f::unit_z(), &l, Point3f::new(0.0, 0.0, 5.0));
        assert_abs_diff_eq!(c, Colorf::new(0.1, 0.1, 0.1), epsilon = 1e-12);
    }

    #[test]
    fn diffuse_follows_incidence_cosine() {
        let m = Phong::matte(Colorf::new(1.0, 1.0, 1.0));
        let viewer = Point3f::new(0.0, 0.0, 5.0);
        let overhead = PointLight::new(Point3f::new(0.0, 0.0, 10.0), Colorf::new(1.0, 1.0, 1.0), 1.0);
        let grazing = PointLight::new(Point3f::new(1000.0, 0.0, 0.1), Colorf::new(1.0, 1.0, 1.0), 1.0);
        let c_over = m.color_at(Point3f::new(0.0, 0.0, 0.0), Vector3f::unit_z(), &overhead, viewer);
        let c_graze = m.color_at(Point3f::new(0.0, 0.0, 0.0), Vector3f::unit_z(), &grazing, viewer);
        assert_abs_diff_eq!(c_over.x, 1.0, epsilon = 1e-12);
        assert!(c_graze.x < 0.01);
    }

    #[test]
    fn backlit_surface_is_dark() {
        let m = Phong::matte(Colorf::new(1.0, 1.0, 1.0));
        let behind = PointLight::new(Point3f::new(0.0, 0.0, -10.0), Colorf::new(1.0, 1.0, 1.0), 1.0);
        let c = m.color_at(Point3f::new(0.0, 0.0, 0.0), Vector3f::unit_z(), &behind, Point3f::new(0.0, 0.0, 5.0));
        assert_abs_diff_eq!(c, Colorf::zero(), epsilon = 1e-12);
    }

    #[test]
    fn textured_shades_with_the_fallback_when_the_file_is_missing() {
        let m = Textured::new(Path::new("no/such/material-texture.png"), 1.0);
        let l = AmbientLight { color: Colorf::new(1.0, 1.0, 1.0), intensity: 1.0 };
        let c = m.color_at(
            Point3f::new(0.1, 0.1, 0.0),
            Vector3f::unit_z(),
            &l,
            Point3f::new(0.0, 0.0, 5.0),
        );
        // Top-left fallback pixel is magenta.
        assert_abs_diff_eq!(c, Colorf::new(1.0, 0.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn checker_alternates_in_object_space() {
        let mut m = Checker::new(Colorf::new(1.0, 1.0, 1.0), Colorf::zero(), 1.0);
        // Shift the pattern frame by half a cell in x.
        m.set_object_transform(Matrix4f::from_translation(Vector3f::new(0.5, 0.0, 0.0)));
        let l = AmbientLight { color: Colorf::new(1.0, 1.0, 1.0), intensity: 1.0 };
        let viewer = Point3f::new(0.0, 0.0, 5.0);
        let a = m.color_at(Point3f::new(0.25, 0.25, 0.0), Vector3f::unit_z(), &l, viewer);
        let b = m.color_at(Point3f::new(1.25, 0.25, 0.0), Vector3f::unit_z(), &l, viewer);
        assert!(a != b, "adjacent cells must differ");
    }
}
