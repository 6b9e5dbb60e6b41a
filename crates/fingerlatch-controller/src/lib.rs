//! Fingerprint latch controller.
//!
//! This crate contains the latch state machine, the sensor polling loop
//! that drives it, the lifecycle wrapper that starts and stops that loop,
//! and the command dispatcher exposed to hosts.

pub mod command;
pub mod control_loop;
pub mod error;
pub mod lifecycle;
pub mod state_machine;

pub use command::{Command, CommandResponse};
pub use control_loop::{IterationOutcome, LatchStatus, LoopStats, run_iteration};
pub use error::{ControllerError, Result};
pub use lifecycle::{DEFAULT_POLL_INTERVAL, LatchController, STOP_GRACE_PERIOD};
pub use state_machine::{ActuatorCommand, LatchPosition, LatchState, StateMachine};
