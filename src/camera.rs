use crate::error::ConfigError;
use crate::geom::Ray3f;
use crate::types::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

/// Maps pixels to primary rays and owns the ray-tracing toggles. Configure
/// before rendering starts; the render loop only reads.
pub struct Camera {
    origin: Point3f,
    projection: Projection,
    /// Orthonormal basis: u right, v up, w opposite the view direction.
    u: Vector3f,
    v: Vector3f,
    w: Vector3f,
    /// Half the view-plane height at unit distance.
    half_height: Float,
    /// Distance from the origin to the look-at target; sizes the
    /// orthographic plane.
    focus_distance: Float,
    pub max_depth: u32,
    pub reflections: bool,
    pub refractions: bool,
    pub shadows: bool,
}

const DEGENERATE_BASIS: Float = 1e-12;

impl Camera {
    pub fn new(
        origin: Point3f,
        target: Point3f,
        up: Vector3f,
        vertical_fov: Deg<Float>,
        projection: Projection,
    ) -> Result<Camera, ConfigError> {
        let gaze = target - origin;
        if gaze.magnitude2() < DEGENERATE_BASIS {
            return Err(ConfigError::DegenerateCamera("look-at target coincides with the origin"));
        }
        let w = -gaze.normalize();
        let across = up.cross(w);
        if across.magnitude2() < DEGENERATE_BASIS {
            return Err(ConfigError::DegenerateCamera("up is parallel to the view direction"));
        }
        let u = across.normalize();
        let v = w.cross(u);
        let theta: Rad<Float> = vertical_fov.into();

        Ok(Camera {
            origin,
            projection,
            u,
            v,
            w,
            half_height: (theta.0 / 2.0).tan(),
            focus_distance: gaze.magnitude(),
            max_depth: 5,
            reflections: true,
            refractions: true,
            shadows: true,
        })
    }

    pub fn origin(&self) -> Point3f {
        self.origin
    }

    /// The ray through the center of pixel (x, y) on a width x height
    /// raster; pixel (0, 0) is top-left.
    pub fn primary_ray(&self, x: usize, y: usize, width: usize, height: usize) -> Ray3f {
        let aspect = width as Float / height as Float;
        // Normalized device coordinates in [-1, 1], y up.
        let sx = (x as Float + 0.5) / width as Float * 2.0 - 1.0;
        let sy = 1.0 - (y as Float + 0.5) / height as Float * 2.0;
        let across = self.u * (sx * self.half_height * aspect);
        let upward = self.v * (sy * self.half_height);

        match self.projection {
            Projection::Perspective => {
                Ray3f::new(self.origin, across + upward - self.w)
            }
            Projection::Orthographic => {
                let plane_point =
                    self.origin + (across + upward) * self.focus_distance;
                Ray3f::new(plane_point, -self.w)
            }
        }
    }
}
