//! Camera module — frustum and camera value types.
//!
//! Provides the passive data containers consumed by frustum queries.
//! The spatial indices do NOT store cameras; they are owned and driven
//! by the caller.

mod camera;
mod frustum;

pub use camera::Camera;
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
