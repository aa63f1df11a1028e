//! cabinet-glb library
//!
//! Reads, reports on and rewrites the GLB models used by the cabinet
//! configurator. Everything works on a [`Model`]: the parsed glTF JSON plus
//! the raw buffer bytes, so vertices can be edited in place and written
//! back without touching anything else in the file.

pub mod adjust;
pub mod bounds;
pub mod container;
pub mod export;
pub mod flatten;
pub mod inspect;
pub mod materials;
pub mod measure;
pub mod model;
pub mod units;
pub mod vertices;

pub use bounds::Bounds;
pub use container::{Glb, GlbError};
pub use model::{ContainerInfo, Model, Validation};
pub use vertices::{PositionSpan, VertexError};
