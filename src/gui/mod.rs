//! The terminal side: a canvas surface and the frame loop driving it.

mod canvas_surface;
mod error;
mod frame_loop;

pub use canvas_surface::{pixel_size, CanvasSurface};
pub use error::VizGuiError;
pub use frame_loop::{run_frame_loop, translate, FrameLoopConfig};
