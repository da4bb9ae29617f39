pub use cgmath::{
    Array, ElementWise, EuclideanSpace, InnerSpace, Matrix, MetricSpace, SquareMatrix, VectorSpace,
    Zero,
};
pub use cgmath::{Deg, Matrix3, Matrix4, Point2, Point3, Rad, Vector2, Vector3, Vector4};

pub use std::f64::consts::PI;

pub type Float = f64;
pub type Vector2f = Vector2<Float>;
pub type Vector3f = Vector3<Float>;
pub type Point3f = Point3<Float>;
pub type Matrix3f = Matrix3<Float>;
pub type Matrix4f = Matrix4<Float>;

/// Linear-space RGB; one channel per component. Clamped only at raster
/// conversion, never mid-pipeline.
pub type Colorf = Vector3f;

pub const FLOAT_MAX: Float = std::f64::MAX;
pub const INFINITY: Float = std::f64::INFINITY;
