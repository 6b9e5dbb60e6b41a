//! Sensor polling loop.
//!
//! One iteration reads the sensor, timestamps the reading with the
//! monotonic clock, feeds it to the [`StateMachine`] and sends any emitted
//! command to the servo. Every iteration produces an [`IterationOutcome`];
//! failures are logged and counted, and the loop moves on to the next poll.
//!
//! # Command delivery
//!
//! The state machine advances before the servo is commanded. If the servo
//! rejects the command the state is not rolled back, so the modeled
//! position may differ from the physical one until the next transition.
//!
//! # Cancellation
//!
//! The loop checks its [`CancellationToken`] before each iteration and
//! races it against the inter-poll sleep. An iteration that has already
//! started runs to completion (or failure) before the loop exits.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fingerlatch_hardware::{HardwareError, MatchSensor, ServoDevice};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::state_machine::{ActuatorCommand, LatchPosition, LatchState, StateMachine};

/// Result of one poll iteration.
#[derive(Debug)]
pub enum IterationOutcome {
    /// Reading processed, no command emitted.
    Idle,

    /// Command emitted and accepted by the servo.
    Actuated(ActuatorCommand),

    /// The sensor read failed; the state machine was not consulted.
    SensorFailed(HardwareError),

    /// The servo rejected an emitted command. The state change stands.
    ActuatorFailed {
        /// Command that was rejected.
        command: ActuatorCommand,

        /// Error returned by the servo.
        error: HardwareError,
    },
}

impl IterationOutcome {
    /// Whether the iteration failed.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            IterationOutcome::SensorFailed(_) | IterationOutcome::ActuatorFailed { .. }
        )
    }
}

/// Read-only view of the latch published after every iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatchStatus {
    /// Position as last commanded.
    pub position: LatchPosition,

    /// Monotonic time of the most recent match.
    pub last_match_time: Option<Instant>,
}

impl From<LatchState> for LatchStatus {
    fn from(state: LatchState) -> Self {
        Self {
            position: state.position,
            last_match_time: state.last_match_time,
        }
    }
}

impl From<LatchStatus> for LatchState {
    fn from(status: LatchStatus) -> Self {
        Self {
            position: status.position,
            last_match_time: status.last_match_time,
        }
    }
}

/// Counters accumulated by the control loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Iterations completed, successful or not.
    pub iterations: u64,

    /// Commands accepted by the servo.
    pub commands_issued: u64,

    /// Failed sensor reads.
    pub sensor_failures: u64,

    /// Commands rejected by the servo.
    pub actuator_failures: u64,

    /// Wall-clock time of the most recent failure.
    pub last_failure_at: Option<DateTime<Utc>>,
}

/// Shared counters behind [`LoopStats`].
#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    iterations: AtomicU64,
    commands_issued: AtomicU64,
    sensor_failures: AtomicU64,
    actuator_failures: AtomicU64,
    last_failure_at: Mutex<Option<DateTime<Utc>>>,
}

impl LoopCounters {
    pub(crate) fn snapshot(&self) -> LoopStats {
        LoopStats {
            iterations: self.iterations.load(Ordering::Relaxed),
            commands_issued: self.commands_issued.load(Ordering::Relaxed),
            sensor_failures: self.sensor_failures.load(Ordering::Relaxed),
            actuator_failures: self.actuator_failures.load(Ordering::Relaxed),
            last_failure_at: *self
                .last_failure_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn record(&self, outcome: &IterationOutcome) {
        self.iterations.fetch_add(1, Ordering::Relaxed);

        let failures = match outcome {
            IterationOutcome::Idle => return,
            IterationOutcome::Actuated(_) => {
                self.commands_issued.fetch_add(1, Ordering::Relaxed);
                return;
            }
            IterationOutcome::SensorFailed(_) => &self.sensor_failures,
            IterationOutcome::ActuatorFailed { .. } => &self.actuator_failures,
        };
        failures.fetch_add(1, Ordering::Relaxed);
        *self
            .last_failure_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
    }
}

/// Where the loop reports outcomes and state snapshots.
#[derive(Debug, Clone)]
pub(crate) struct LoopObserver {
    pub(crate) status: watch::Sender<LatchStatus>,
    pub(crate) counters: Arc<LoopCounters>,
}

impl LoopObserver {
    fn record(&self, outcome: &IterationOutcome, machine: &StateMachine) {
        match outcome {
            IterationOutcome::Idle => {}
            IterationOutcome::Actuated(command) => {
                info!(
                    "Latch {}: servo moved to {}",
                    machine.position(),
                    command.angle()
                );
            }
            IterationOutcome::SensorFailed(e) => {
                error!("Error in fingerprint control logic: sensor read failed: {}", e);
            }
            IterationOutcome::ActuatorFailed { command, error } => {
                error!(
                    "Error in fingerprint control logic: servo move to {} failed: {} (latch kept as {})",
                    command.angle(),
                    error,
                    machine.position()
                );
            }
        }

        self.counters.record(outcome);
        self.status.send_replace(LatchStatus::from(*machine.state()));
    }
}

/// Run a single poll: read, transition, actuate.
///
/// Never fails; errors are returned inside the outcome.
pub async fn run_iteration<S, A>(sensor: &S, servo: &A, machine: &mut StateMachine) -> IterationOutcome
where
    S: MatchSensor,
    A: ServoDevice,
{
    let reading = match sensor.read_match().await {
        Ok(reading) => reading,
        Err(e) => return IterationOutcome::SensorFailed(e),
    };

    if reading.is_match() {
        debug!("Fingerprint match detected");
    }

    let now = Instant::now();
    let Some(command) = machine.transition(reading, now) else {
        return IterationOutcome::Idle;
    };

    match servo.move_to(command.angle()).await {
        Ok(()) => IterationOutcome::Actuated(command),
        Err(error) => IterationOutcome::ActuatorFailed { command, error },
    }
}

/// Poll until `token` is cancelled, then hand the machine back.
///
/// The task owns `machine`; nothing else can change the latch state while
/// it runs.
pub(crate) async fn control_loop<S, A>(
    sensor: Arc<S>,
    servo: Arc<A>,
    mut machine: StateMachine,
    token: CancellationToken,
    poll_interval: Duration,
    observer: LoopObserver,
) -> StateMachine
where
    S: MatchSensor,
    A: ServoDevice,
{
    info!(
        "Control loop started (poll interval {}ms)",
        poll_interval.as_millis()
    );

    while !token.is_cancelled() {
        let outcome = run_iteration(sensor.as_ref(), servo.as_ref(), &mut machine).await;
        observer.record(&outcome, &machine);

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    info!("Control loop stopped with latch {}", machine.position());
    machine
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerlatch_core::{Degrees, LatchConfig};
    use fingerlatch_hardware::Reading;
    use fingerlatch_hardware::mock::{MockSensor, MockServo};

    fn machine() -> StateMachine {
        StateMachine::new(&LatchConfig::new("board", "servo", "sensor").unwrap())
    }

    fn observer() -> (LoopObserver, watch::Receiver<LatchStatus>) {
        let (status, rx) = watch::channel(LatchStatus::default());
        let observer = LoopObserver {
            status,
            counters: Arc::new(LoopCounters::default()),
        };
        (observer, rx)
    }

    #[tokio::test]
    async fn test_iteration_idle() {
        let (sensor, _) = MockSensor::new();
        let (servo, servo_handle) = MockServo::new();
        let mut machine = machine();

        let outcome = run_iteration(&sensor, &servo, &mut machine).await;
        assert!(matches!(outcome, IterationOutcome::Idle));
        assert_eq!(servo_handle.move_count(), 0);
    }

    #[tokio::test]
    async fn test_iteration_opens_on_match() {
        let (sensor, sensor_handle) = MockSensor::new();
        let (servo, servo_handle) = MockServo::new();
        let mut machine = machine();

        sensor_handle.queue_reading(Reading::MATCH);
        let outcome = run_iteration(&sensor, &servo, &mut machine).await;

        assert!(matches!(outcome, IterationOutcome::Actuated(_)));
        assert_eq!(servo_handle.moves(), vec![Degrees::new(180).unwrap()]);
        assert_eq!(machine.position(), LatchPosition::Open);
    }

    #[tokio::test]
    async fn test_iteration_sensor_failure_leaves_state() {
        let (sensor, sensor_handle) = MockSensor::new();
        let (servo, servo_handle) = MockServo::new();
        let mut machine = machine();

        sensor_handle.queue_failure("uart framing error");
        let outcome = run_iteration(&sensor, &servo, &mut machine).await;

        assert!(matches!(outcome, IterationOutcome::SensorFailed(_)));
        assert!(outcome.is_failure());
        assert_eq!(machine.position(), LatchPosition::Closed);
        assert_eq!(servo_handle.move_count(), 0);
    }

    #[tokio::test]
    async fn test_iteration_actuator_failure_keeps_transition() {
        let (sensor, sensor_handle) = MockSensor::new();
        let (servo, servo_handle) = MockServo::new();
        let mut machine = machine();

        sensor_handle.queue_reading(Reading::MATCH);
        sensor_handle.queue_reading(Reading::MATCH);
        servo_handle.reject_next(1);

        let outcome = run_iteration(&sensor, &servo, &mut machine).await;
        assert!(matches!(outcome, IterationOutcome::ActuatorFailed { .. }));
        assert_eq!(machine.position(), LatchPosition::Open);

        // Already Open, so the rejected command is not retried.
        let outcome = run_iteration(&sensor, &servo, &mut machine).await;
        assert!(matches!(outcome, IterationOutcome::Idle));
        assert_eq!(servo_handle.move_count(), 0);
    }

    #[tokio::test]
    async fn test_observer_counts_and_publishes() {
        let (observer, rx) = observer();
        let mut machine = machine();
        machine.transition(Reading::MATCH, Instant::now());

        observer.record(&IterationOutcome::Idle, &machine);
        observer.record(
            &IterationOutcome::SensorFailed(HardwareError::disconnected("sensor")),
            &machine,
        );
        observer.record(
            &IterationOutcome::Actuated(ActuatorCommand::MoveTo(Degrees::new(180).unwrap())),
            &machine,
        );

        let stats = observer.counters.snapshot();
        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.sensor_failures, 1);
        assert_eq!(stats.commands_issued, 1);
        assert_eq!(stats.actuator_failures, 0);
        assert!(stats.last_failure_at.is_some());
        assert_eq!(rx.borrow().position, LatchPosition::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_exits_on_cancel() {
        let (sensor, sensor_handle) = MockSensor::new();
        let (servo, _) = MockServo::new();
        let (observer, _rx) = observer();
        let token = CancellationToken::new();

        let task = tokio::spawn(control_loop(
            Arc::new(sensor),
            Arc::new(servo),
            machine(),
            token.clone(),
            Duration::from_millis(200),
            observer,
        ));

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        token.cancel();
        let machine = task.await.unwrap();
        assert_eq!(machine.position(), LatchPosition::Closed);

        let reads = sensor_handle.read_count();
        assert!(reads >= 5, "expected at least 5 polls, got {reads}");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sensor_handle.read_count(), reads);
    }
}
