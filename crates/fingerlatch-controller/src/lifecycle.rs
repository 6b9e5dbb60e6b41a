//! Latch controller lifecycle.
//!
//! [`LatchController`] owns the configuration, the three device handles and
//! at most one running control loop. Each started loop gets its own
//! [`CancellationToken`], so stopping one controller never affects another.
//!
//! # Lifecycle
//!
//! 1. Build with [`LatchController::new`] (or [`LatchController::from_registry`],
//!    which also starts the loop)
//! 2. `start()` spawns the polling task; a second call is a logged no-op
//! 3. `stop()` cancels the task and waits for it, aborting after a grace period
//! 4. `close()` stops the loop before the controller is discarded
//!
//! Dropping a controller with a live loop cancels and aborts the task
//! without waiting.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fingerlatch_core::LatchConfig;
use fingerlatch_core::constants::{DEFAULT_POLL_INTERVAL_MS, STOP_GRACE_PERIOD_MS};
use fingerlatch_hardware::{
    AnyBoard, AnySensor, AnyServo, BoardDevice, DeviceRegistry, MatchSensor, ServoDevice,
};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::control_loop::{LatchStatus, LoopCounters, LoopObserver, LoopStats, control_loop};
use crate::error::Result;
use crate::state_machine::{LatchState, StateMachine};

/// Default delay between sensor polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

/// How long `stop()` waits for an in-flight iteration before aborting it.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(STOP_GRACE_PERIOD_MS);

/// Cancellation token and task of one running control loop.
#[derive(Debug)]
struct RunHandle {
    token: CancellationToken,
    task: JoinHandle<StateMachine>,
}

impl RunHandle {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

/// How a control loop task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    /// Loop observed cancellation and returned.
    Completed,
    /// Task was aborted after the grace period.
    Aborted,
    /// Task panicked.
    Panicked,
}

impl TaskTermination {
    fn classify<T>(result: &std::result::Result<T, JoinError>) -> Self {
        match result {
            Ok(_) => Self::Completed,
            Err(e) if e.is_cancelled() => Self::Aborted,
            Err(_) => Self::Panicked,
        }
    }
}

/// Fingerprint-driven latch controller.
///
/// Generic over the device types so tests can run against mocks directly;
/// the defaults are the enum-dispatch wrappers stored in a
/// [`DeviceRegistry`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use fingerlatch_controller::LatchController;
/// use fingerlatch_core::LatchConfig;
/// use fingerlatch_hardware::mock::{MockBoard, MockSensor, MockServo};
///
/// #[tokio::main]
/// async fn main() {
///     let config = LatchConfig::new("board", "servo", "sensor").unwrap();
///     let (sensor, _sensor_handle) = MockSensor::new();
///     let (servo, _servo_handle) = MockServo::new();
///
///     let mut controller = LatchController::new(
///         config,
///         Arc::new(MockBoard::default()),
///         Arc::new(sensor),
///         Arc::new(servo),
///     );
///
///     assert!(controller.start());
///     assert!(!controller.start());
///     assert!(controller.stop().await);
/// }
/// ```
pub struct LatchController<B = AnyBoard, S = AnySensor, A = AnyServo> {
    config: LatchConfig,
    board: Arc<B>,
    sensor: Arc<S>,
    servo: Arc<A>,
    poll_interval: Duration,
    run: Option<RunHandle>,
    status: watch::Sender<LatchStatus>,
    counters: Arc<LoopCounters>,
}

impl<B, S, A> LatchController<B, S, A>
where
    B: BoardDevice + 'static,
    S: MatchSensor + 'static,
    A: ServoDevice + 'static,
{
    /// Create a stopped controller.
    pub fn new(config: LatchConfig, board: Arc<B>, sensor: Arc<S>, servo: Arc<A>) -> Self {
        let (status, _) = watch::channel(LatchStatus::default());
        Self {
            config,
            board,
            sensor,
            servo,
            poll_interval: DEFAULT_POLL_INTERVAL,
            run: None,
            status,
            counters: Arc::new(LoopCounters::default()),
        }
    }

    /// Set the delay between polls. Takes effect on the next `start()`.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Spawn the control loop.
    ///
    /// Returns `false` without spawning if a loop is already running. A
    /// previous loop that exited on its own is replaced. Every start begins
    /// from a fresh `Closed` state.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            info!("Already running control logic");
            return false;
        }

        if self.run.take().is_some() {
            warn!("Previous control loop exited unexpectedly, restarting");
        }

        self.spawn_loop(StateMachine::new(&self.config));
        info!(
            "Started fingerprint control logic (sensor={}, servo={})",
            self.config.sensor, self.config.servo
        );
        true
    }

    fn spawn_loop(&mut self, machine: StateMachine) {
        let token = CancellationToken::new();
        self.status.send_replace(LatchStatus::from(*machine.state()));

        let observer = LoopObserver {
            status: self.status.clone(),
            counters: Arc::clone(&self.counters),
        };
        let task = tokio::spawn(control_loop(
            Arc::clone(&self.sensor),
            Arc::clone(&self.servo),
            machine,
            token.clone(),
            self.poll_interval,
            observer,
        ));
        self.run = Some(RunHandle { token, task });
    }

    /// Stop the control loop and wait for it to exit.
    ///
    /// An iteration already in flight gets [`STOP_GRACE_PERIOD`] to finish;
    /// after that the task is aborted. Once this returns the stopped loop
    /// issues no further servo commands.
    ///
    /// Returns `false` if no loop was running.
    pub async fn stop(&mut self) -> bool {
        self.halt().await.is_some()
    }

    /// Cancel and join the live loop, returning the latch state it ended in.
    ///
    /// Returns `None` if no loop was live. A loop that already died is reaped.
    async fn halt(&mut self) -> Option<LatchState> {
        let Some(run) = self.run.take() else {
            info!("Control logic is not running");
            return None;
        };

        if !run.is_live() {
            match TaskTermination::classify(&run.task.await) {
                TaskTermination::Panicked => {
                    error!("Control logic is not running: loop task had panicked")
                }
                _ => info!("Control logic is not running"),
            }
            return None;
        }

        let RunHandle { token, mut task } = run;
        token.cancel();

        let result = match tokio::time::timeout(STOP_GRACE_PERIOD, &mut task).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Control loop did not stop within {}ms, aborting",
                    STOP_GRACE_PERIOD.as_millis()
                );
                task.abort();
                task.await
            }
        };

        match TaskTermination::classify(&result) {
            TaskTermination::Completed => info!("Stopped fingerprint control logic"),
            TaskTermination::Aborted => info!("Aborted fingerprint control logic"),
            TaskTermination::Panicked => error!("Control loop task panicked"),
        }

        let state = match result {
            Ok(machine) => *machine.state(),
            // No machine to hand back; use the last published state.
            Err(_) => LatchState::from(*self.status.borrow()),
        };
        Some(state)
    }

    /// Stop the loop before the controller is discarded.
    pub async fn close(&mut self) {
        self.stop().await;
        info!("Closed latch controller");
    }

    /// Whether a control loop task is alive.
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(RunHandle::is_live)
    }

    /// Replace configuration and devices, then make sure a loop is running.
    ///
    /// A live loop is restarted under the new configuration but keeps its
    /// latch state: an open latch stays open and closes once the new
    /// leave-open timeout has passed since the last match. If no loop was
    /// live, a fresh one is started from `Closed`.
    pub async fn reconfigure_with(
        &mut self,
        config: LatchConfig,
        board: Arc<B>,
        sensor: Arc<S>,
        servo: Arc<A>,
    ) {
        let resumed = if self.is_running() {
            self.halt().await
        } else {
            None
        };

        self.config = config;
        self.board = board;
        self.sensor = sensor;
        self.servo = servo;
        info!(
            "Reconfigured latch (board={}, servo={}, sensor={}, timeout={:?})",
            self.config.board, self.config.servo, self.config.sensor, self.config.leave_open_timeout
        );

        match resumed {
            Some(state) => {
                self.spawn_loop(StateMachine::resume(&self.config, state));
                info!(
                    "Resumed fingerprint control logic with latch {}",
                    state.position
                );
            }
            None => {
                self.start();
            }
        }
    }
}

impl<B, S, A> LatchController<B, S, A> {
    /// Subscribe to the latch status published after each iteration.
    pub fn status(&self) -> watch::Receiver<LatchStatus> {
        self.status.subscribe()
    }

    /// Loop counters accumulated over the controller's lifetime.
    pub fn stats(&self) -> LoopStats {
        self.counters.snapshot()
    }

    /// Active configuration.
    pub fn config(&self) -> &LatchConfig {
        &self.config
    }

    /// Board handle. Held for the latch but not driven by the loop.
    pub fn board(&self) -> &Arc<B> {
        &self.board
    }

    /// Sensor handle.
    pub fn sensor(&self) -> &Arc<S> {
        &self.sensor
    }

    /// Servo handle.
    pub fn servo(&self) -> &Arc<A> {
        &self.servo
    }
}

impl LatchController<AnyBoard, AnySensor, AnyServo> {
    /// Resolve `config`'s dependencies from `registry` and start the loop.
    ///
    /// # Errors
    /// Returns `ControllerError::Hardware` if a dependency is not registered.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn from_registry(config: LatchConfig, registry: &DeviceRegistry) -> Result<Self> {
        let devices = registry.resolve(&config)?;
        let mut controller = Self::new(config, devices.board, devices.sensor, devices.servo);
        controller.start();
        Ok(controller)
    }

    /// Resolve new dependencies from `registry`, then reconfigure.
    ///
    /// Nothing changes if resolution fails.
    ///
    /// # Errors
    /// Returns `ControllerError::Hardware` if a dependency is not registered.
    pub async fn reconfigure(&mut self, config: LatchConfig, registry: &DeviceRegistry) -> Result<()> {
        let devices = registry.resolve(&config)?;
        self.reconfigure_with(config, devices.board, devices.sensor, devices.servo)
            .await;
        Ok(())
    }
}

impl<B, S, A> fmt::Debug for LatchController<B, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatchController")
            .field("config", &self.config)
            .field("poll_interval", &self.poll_interval)
            .field("running", &self.run.as_ref().is_some_and(RunHandle::is_live))
            .finish_non_exhaustive()
    }
}

impl<B, S, A> Drop for LatchController<B, S, A> {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            run.token.cancel();
            run.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerlatch_core::Degrees;
    use fingerlatch_hardware::Reading;
    use fingerlatch_hardware::mock::{MockBoard, MockSensor, MockSensorHandle, MockServo, MockServoHandle};

    use crate::error::ControllerError;
    use crate::state_machine::LatchPosition;

    type MockController = LatchController<MockBoard, MockSensor, MockServo>;

    fn controller() -> (MockController, MockSensorHandle, MockServoHandle) {
        let config = LatchConfig::new("board", "servo", "sensor").unwrap();
        let (sensor, sensor_handle) = MockSensor::new();
        let (servo, servo_handle) = MockServo::new();
        let controller = LatchController::new(
            config,
            Arc::new(MockBoard::default()),
            Arc::new(sensor),
            Arc::new(servo),
        );
        (controller, sensor_handle, servo_handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop() {
        let (mut controller, _, _) = controller();

        assert!(!controller.is_running());
        assert!(controller.start());
        assert!(controller.is_running());

        assert!(controller.stop().await);
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_noop() {
        let (mut controller, _, _) = controller();
        assert!(!controller.stop().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_spawns_once() {
        let (mut controller, sensor_handle, servo_handle) = controller();
        sensor_handle.set_idle_reading(Reading::MATCH);

        assert!(controller.start());
        assert!(!controller.start());
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(servo_handle.move_count(), 1);
        controller.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_follows_loop() {
        let (mut controller, sensor_handle, _) = controller();
        let mut status = controller.status();

        sensor_handle.queue_reading(Reading::MATCH);
        controller.start();
        status
            .wait_for(|s| s.position == LatchPosition::Open)
            .await
            .unwrap();

        assert!(status.borrow().last_match_time.is_some());
        assert!(controller.stats().commands_issued >= 1);
        controller.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_state() {
        let (mut controller, sensor_handle, servo_handle) = controller();

        sensor_handle.queue_reading(Reading::MATCH);
        controller.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.stop().await;

        sensor_handle.queue_reading(Reading::MATCH);
        controller.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.close().await;

        // Each run starts Closed, so each run opens once.
        assert_eq!(servo_handle.move_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_loop() {
        let (mut controller, sensor_handle, _) = controller();
        controller.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(controller);

        tokio::task::yield_now().await;
        let reads = sensor_handle.read_count();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sensor_handle.read_count(), reads);
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_registry_starts() {
        let mut registry = DeviceRegistry::new();
        registry.register_board("board-1", MockBoard::default());
        registry.register_servo("servo-1", MockServo::new().0);
        registry.register_sensor("sensor-1", MockSensor::new().0);

        let config = LatchConfig::new("board-1", "servo-1", "sensor-1").unwrap();
        let mut controller = LatchController::from_registry(config, &registry).unwrap();
        assert!(controller.is_running());
        controller.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_registry_missing_sensor() {
        let mut registry = DeviceRegistry::new();
        registry.register_board("board-1", MockBoard::default());
        registry.register_servo("servo-1", MockServo::new().0);

        let config = LatchConfig::new("board-1", "servo-1", "sensor-1").unwrap();
        let error = LatchController::from_registry(config, &registry).unwrap_err();
        assert!(matches!(error, ControllerError::Hardware(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_while_open_keeps_state() {
        let (mut controller, sensor_handle, servo_handle) = controller();
        sensor_handle.queue_reading(Reading::MATCH);
        controller.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let config = controller
            .config()
            .clone()
            .with_leave_open_timeout(Duration::from_secs(3));
        let board = Arc::clone(controller.board());
        let sensor = Arc::clone(controller.sensor());
        let servo = Arc::clone(controller.servo());
        controller.reconfigure_with(config, board, sensor, servo).await;

        assert!(controller.is_running());
        assert_eq!(controller.status().borrow().position, LatchPosition::Open);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(
            servo_handle.moves(),
            vec![Degrees::new(180).unwrap(), Degrees::new(90).unwrap()]
        );
        controller.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_when_stopped_starts_closed() {
        let (mut controller, _, servo_handle) = controller();

        let config = controller.config().clone();
        let board = Arc::clone(controller.board());
        let sensor = Arc::clone(controller.sensor());
        let servo = Arc::clone(controller.servo());
        controller.reconfigure_with(config, board, sensor, servo).await;

        assert!(controller.is_running());
        assert_eq!(controller.status().borrow().position, LatchPosition::Closed);
        controller.close().await;
        assert_eq!(servo_handle.move_count(), 0);
    }

    async fn fail() {
        panic!("control loop failure");
    }

    #[tokio::test]
    async fn test_termination_classify() {
        let completed: std::result::Result<(), JoinError> = Ok(());
        assert_eq!(TaskTermination::classify(&completed), TaskTermination::Completed);

        let pending = tokio::spawn(std::future::pending::<()>());
        pending.abort();
        assert_eq!(
            TaskTermination::classify(&pending.await),
            TaskTermination::Aborted
        );

        let panicked = tokio::spawn(fail());
        assert_eq!(
            TaskTermination::classify(&panicked.await),
            TaskTermination::Panicked
        );
    }
}
