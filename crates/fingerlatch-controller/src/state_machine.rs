//! Latch state machine.
//!
//! The latch has two positions, `Closed` and `Open`. A detected and matched
//! fingerprint opens it; once no match has been seen for longer than the
//! leave-open timeout, it closes again.
//!
//! # Transitions
//!
//! - Closed + match → Open, emits `MoveTo(open_angle)`
//! - Open + match → Open, refreshes the match time, emits nothing
//! - Open + no match, `now - last_match > timeout` → Closed, emits `MoveTo(closed_angle)`
//! - anything else → unchanged, emits nothing
//!
//! The machine is pure: it never touches hardware or reads the clock. The
//! control loop supplies `now` and executes any emitted command.
//!
//! # Examples
//!
//! ```
//! use fingerlatch_controller::{ActuatorCommand, LatchPosition, StateMachine};
//! use fingerlatch_core::LatchConfig;
//! use fingerlatch_hardware::Reading;
//! use std::time::Duration;
//! use tokio::time::Instant;
//!
//! let config = LatchConfig::new("board", "servo", "sensor")
//!     .unwrap()
//!     .with_leave_open_timeout(Duration::from_secs(5));
//! let mut machine = StateMachine::new(&config);
//! let t0 = Instant::now();
//!
//! assert_eq!(
//!     machine.transition(Reading::MATCH, t0),
//!     Some(ActuatorCommand::MoveTo(config.servo_open_angle))
//! );
//! assert_eq!(machine.transition(Reading::IDLE, t0 + Duration::from_secs(4)), None);
//! assert_eq!(
//!     machine.transition(Reading::IDLE, t0 + Duration::from_secs(6)),
//!     Some(ActuatorCommand::MoveTo(config.servo_closed_angle))
//! );
//! assert_eq!(machine.position(), LatchPosition::Closed);
//! ```

use std::fmt;
use std::time::Duration;

use fingerlatch_core::{Degrees, LatchConfig};
use fingerlatch_hardware::Reading;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Physical position of the latch as last commanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatchPosition {
    /// Latch holds the door shut.
    #[default]
    Closed,

    /// Latch releases the door.
    Open,
}

impl fmt::Display for LatchPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatchPosition::Closed => write!(f, "Closed"),
            LatchPosition::Open => write!(f, "Open"),
        }
    }
}

/// Position plus the time of the last confirmed match.
///
/// Starts `Closed` with no match recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatchState {
    /// Current position.
    pub position: LatchPosition,

    /// Monotonic time of the most recent match, unset until the first one.
    pub last_match_time: Option<Instant>,
}

/// Command the control loop sends to the servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    /// Move the servo to the given angle.
    MoveTo(Degrees),
}

impl ActuatorCommand {
    /// Target angle of this command.
    pub fn angle(&self) -> Degrees {
        match self {
            ActuatorCommand::MoveTo(angle) => *angle,
        }
    }
}

/// Two-state latch controller logic.
///
/// Not shared: exactly one control loop task owns each instance.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: LatchState,
    open_angle: Degrees,
    closed_angle: Degrees,
    leave_open_timeout: Duration,
}

impl StateMachine {
    /// Create a machine in the initial `Closed` state for `config`.
    pub fn new(config: &LatchConfig) -> Self {
        Self {
            state: LatchState::default(),
            open_angle: config.servo_open_angle,
            closed_angle: config.servo_closed_angle,
            leave_open_timeout: config.leave_open_timeout,
        }
    }

    /// Create a machine that continues from `state` under `config`'s angles
    /// and timeout.
    ///
    /// Used when a running latch is reconfigured: an open latch stays open
    /// and still closes once the new timeout has passed since the last match.
    pub fn resume(config: &LatchConfig, state: LatchState) -> Self {
        Self {
            state,
            ..Self::new(config)
        }
    }

    /// Current state.
    pub fn state(&self) -> &LatchState {
        &self.state
    }

    /// Current position.
    pub fn position(&self) -> LatchPosition {
        self.state.position
    }

    /// Feed one reading observed at `now` and return the command to issue, if any.
    ///
    /// The state is updated before the command is returned. Whether the
    /// servo then accepts the command does not affect the state.
    pub fn transition(&mut self, reading: Reading, now: Instant) -> Option<ActuatorCommand> {
        if reading.is_match() {
            self.state.last_match_time = Some(now);
            return match self.state.position {
                LatchPosition::Closed => {
                    self.state.position = LatchPosition::Open;
                    Some(ActuatorCommand::MoveTo(self.open_angle))
                }
                LatchPosition::Open => None,
            };
        }

        if self.state.position == LatchPosition::Open && self.leave_open_expired(now) {
            self.state.position = LatchPosition::Closed;
            return Some(ActuatorCommand::MoveTo(self.closed_angle));
        }

        None
    }

    fn leave_open_expired(&self, now: Instant) -> bool {
        self.state
            .last_match_time
            .is_some_and(|last| now.saturating_duration_since(last) > self.leave_open_timeout)
    }
}
