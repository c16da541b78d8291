//! # Mutating operations
//!
//! - [`queue`]: the process-wide FIFO [`Scheduler`]
//! - [`driver`]: spawns a backend command and classifies its result
//! - [`orchestrator`]: per-operation state machine with bounded retries
//! - [`result`]: the normalized result taxonomy
//! - [`oplog`]: append-only record of finished operations

pub mod driver;
pub mod oplog;
pub mod orchestrator;
pub mod queue;
pub mod result;

pub use driver::{Driver, DriverEvent, DriverOutcome, ProcessDriver};
pub use oplog::OperationLog;
pub use orchestrator::{Operation, OperationContext, OperationState};
pub use queue::{Scheduler, Ticket};
pub use result::{OperationOutcome, ResultCode};
