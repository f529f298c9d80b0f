//! Debounced, coalescing compile pipeline.
//!
//! - [`timing`]: rolling statistics that propose the debounce delay
//! - [`debounce`]: re-armable timer between edits and the queue
//! - [`queue`]: single slot where newer jobs replace older ones
//! - [`worker`]: render → cached preamble → compile → deliver
//! - [`manager`]: wires everything together behind `submit`

pub mod debounce;
pub mod manager;
pub mod messages;
pub mod queue;
pub mod timing;
pub mod worker;

pub use manager::TaskManager;
pub use messages::{
    CompileError, CompileEvent, CompileOutcome, CompileRequest, CompileResult, Job, JobId,
};
pub use timing::TimingEstimator;
pub use worker::CompileWorker;
