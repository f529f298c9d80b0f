//! LaTeX side of the pipeline: compiler backend, preamble format cache,
//! and the scratch workspace.

pub mod backend;
pub mod preamble;
pub mod workspace;

pub use backend::{CompilerBackend, CompilerState, LatexBackend};
pub use preamble::PreambleCache;
pub use workspace::Workspace;
