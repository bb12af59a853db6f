/// mdlr Core Library - scene description, geometry and rasterization
///
/// This library turns MDL scripts into raster images: it parses the script
/// into opcodes, keeps the coordinate-system stack, generates primitive
/// geometry, rasterizes it with a depth buffer and flat shading, and replays
/// the whole script once per animation frame.

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod geometry;
pub mod knobs;
pub mod matrix;
pub mod raster;
pub mod script;
pub mod shading;
pub mod stack;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use color::Color;
pub use config::{LineConvention, RenderConfig};
pub use driver::{AnimationDriver, AnimationPlan, RenderSummary};
pub use error::{MatrixError, MdlError, MdlResult, StackError};
pub use export::{save_image, to_rgb_image, write_ppm, FileSink, ImageSink};
pub use geometry::{CurveKind, GeometryBuilder, Point3};
pub use knobs::KnobTable;
pub use matrix::PointMatrix;
pub use raster::{PolygonStyle, Rasterizer};
pub use script::{parse_script, Opcode};
pub use shading::{Light, Lighting, Material, ShadingMode};
pub use stack::TransformStack;
pub use transform::{Axis, Transform, TransformKind};
