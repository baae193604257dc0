// Library exports for likeplot

pub mod aggregate;
pub mod color;
pub mod config;
pub mod curve;
pub mod data;
pub mod error;
pub mod graph;
pub mod runtime;

// Chart pipeline
pub mod ir;
pub mod scale;
pub mod compiler;

pub use compiler::ChartKind;
pub use config::{Config, OutputFormat};
pub use data::{Dataset, InputFormat, Record};
pub use error::{Error, Result};
