//! Configuration section definitions.

mod latex;
mod letter;
mod scheduler;

pub use latex::LatexConfig;
pub use letter::LetterConfig;
pub use scheduler::SchedulerConfig;
