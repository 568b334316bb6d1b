pub mod bounds;
pub mod input;
pub mod model;
pub mod render;
pub mod surface;

pub use bounds::{scan_bounds_or_center, scan_content_bounds, BoundingBox};
pub use input::{PointerPhase, PointerSample, RawPointerEvent, Segment, StrokeRecorder};
pub use model::{Color, EraserMode, Tool, ToolState, WidthRange};
pub use surface::RasterSurface;
