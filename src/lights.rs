use crate::types::*;

/// How a light reaches a surface point. `direction` is unit length, from the
/// point toward the light; `distance` bounds the shadow ray (infinite for
/// directional lights); `attenuation` scales the contribution.
#[derive(Copy, Clone, Debug)]
pub struct Illumination {
    pub direction: Vector3f,
    pub distance: Float,
    pub attenuation: Float,
}

/// The light capability the kernel consumes. `illumination` returns None for
/// ambient lights, which contribute a constant term independent of geometry.
pub trait Light: Sync + Send {
    fn color(&self) -> Colorf;
    fn intensity(&self) -> Float;
    fn illumination(&self, from: Point3f) -> Option<Illumination>;
}

pub struct AmbientLight {
    pub color: Colorf,
    pub intensity: Float,
}

impl Light for AmbientLight {
    fn color(&self) -> Colorf {
        self.color
    }
    fn intensity(&self) -> Float {
        self.intensity
    }
    fn illumination(&self, _from: Point3f) -> Option<Illumination> {
        None
    }
}

pub struct PointLight {
    pub position: Point3f,
    pub color: Colorf,
    pub intensity: Float,
    /// Inverse-square distance falloff; off by default (classic hard-light
    /// behavior).
    pub falloff: bool,
}

impl PointLight {
    pub fn new(position: Point3f, color: Colorf, intensity: Float) -> Self {
        PointLight { position, color, intensity, falloff: false }
    }
}

impl Light for PointLight {
    fn color(&self) -> Colorf {
        self.color
    }
    fn intensity(&self) -> Float {
        self.intensity
    }
    fn illumination(&self, from: Point3f) -> Option<Illumination> {
        let to_light = self.position - from;
        let distance = to_light.magnitude();
        let attenuation = iff!(self.falloff, 1.0 / (distance * distance).max(1e-12), 1.0);
        Some(Illumination { direction: to_light / distance, distance, attenuation })
    }
}

pub struct DirectionalLight {
    /// Direction the light travels, normalized at construction.
    direction: Vector3f,
    pub color: Colorf,
    pub intensity: Float,
}

impl DirectionalLight {
    pub fn new(direction: Vector3f, color: Colorf, intensity: Float) -> Self {
        DirectionalLight { direction: direction.normalize(), color, intensity }
    }
}

impl Light for DirectionalLight {
    fn color(&self) -> Colorf {
        self.color
    }
    fn intensity(&self) -> Float {
        self.intensity
    }
    fn illumination(&self, _from: Point3f) -> Option<Illumination> {
        Some(Illumination { direction: -self.direction, distance: INFINITY, attenuation: 1.0 })
    }
}

pub struct SpotLight {
    pub position: Point3f,
    /// Axis the cone points along, normalized at construction.
    axis: Vector3f,
    /// Cosine of the cone half-angle.
    cos_cutoff: Float,
    pub color: Colorf,
    pub intensity: Float,
}

impl SpotLight {
    pub fn new(
        position: Point3f,
        axis: Vector3f,
        half_angle: Rad<Float>,
        color: Colorf,
        intensity: Float,
    ) -> Self {
        SpotLight {
            position,
            axis: axis.normalize(),
            cos_cutoff: half_angle.0.cos(),
            color,
            intensity,
        }
    }
}

impl Light for SpotLight {
    fn color(&self) -> Colorf {
        self.color
    }
    fn intensity(&self) -> Float {
        self.intensity
    }
    fn illumination(&self, from: Point3f) -> Option<Illumination> {
        let to_light = self.position - from;
        let distance = to_light.magnitude();
        let direction = to_light / distance;
        // Angular falloff from full strength on-axis to zero at the cutoff.
        let cos_angle = (-direction).dot(self.axis);
        if cos_angle <= self.cos_cutoff {
            return Some(Illumination { direction, distance, attenuation: 0.0 });
        }
        let attenuation = (cos_angle - self.cos_cutoff) / (1.0 - self.cos_cutoff);
        Some(Illumination { direction, distance, attenuation })
    }
}
