use failure::Fail;

/// Fatal scene-build errors. The kernel reports these to the caller and never
/// works around them; numerical edge cases during tracing are handled locally
/// and never surface here.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    #[fail(display = "transform matrix is singular and cannot be inverted")]
    SingularTransform,

    #[fail(display = "camera basis is degenerate: {}", _0)]
    DegenerateCamera(&'static str),

    #[fail(display = "csg {} child is not a solid", _0)]
    NonSolidCsgChild(&'static str),
}
