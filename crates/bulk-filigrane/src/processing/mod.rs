//! Job execution, polling and batch scheduling

mod job;
mod poll;
mod pool;
mod scheduler;

pub use job::{JobContext, JobState, WatermarkJob};
pub use poll::{poll_until_ready, Clock, PollPolicy, TokioClock};
pub use pool::{WorkerPool, DEFAULT_WORKERS};
pub use scheduler::{DispatchMode, Progress, Scheduler};
