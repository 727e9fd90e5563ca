// Live camera feed hidden behind a black mask that the pointer wipes away.
//
// MaskTrailRenderer turns pointer motion and redraw ticks into
// mask geometry, `mask` rasterizes that geometry over the video frame, and
// the remaining modules are the window, camera and configuration glue.

pub mod camera;
pub mod clock;
pub mod config;
pub mod draw;
pub mod error;
pub mod gamma;
pub mod logging;
pub mod mask;
pub mod mode;
pub mod renderer;
pub mod trail;
pub mod types;
