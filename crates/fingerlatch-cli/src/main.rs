//! fingerlatch - interactive latch controller running on mock devices.
//!
//! Loads a latch configuration, registers mock devices under the configured
//! dependency names and starts the controller. Lines read from stdin drive
//! the mock sensor or the controller:
//!
//! - `match`, `reject`, `idle`: queue one sensor reading
//! - `fail`: queue one failed sensor read
//! - `start`, `stop`: lifecycle commands
//! - `status`, `stats`: print latch status or loop counters
//! - a JSON object such as `{"action": "stop"}`: run it as a command request
//! - `quit`: stop the controller and exit
//!
//! Usage: `fingerlatch [config.json]`. Without an argument `fingerlatch.json`
//! is used if present, otherwise default dependency names.

use std::path::Path;

use anyhow::{Context, Result};
use fingerlatch_controller::LatchController;
use fingerlatch_core::LatchConfig;
use fingerlatch_hardware::mock::{MockBoard, MockSensor, MockSensorHandle, MockServo, MockServoHandle};
use fingerlatch_hardware::{DeviceRegistry, Reading};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const DEFAULT_CONFIG_PATH: &str = "fingerlatch.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fingerlatch=info".parse()?),
        )
        .init();

    info!("fingerlatch {}", fingerlatch_core::VERSION);

    let config = load_config(std::env::args().nth(1))?;
    info!(
        "Latch dependencies: board={} servo={} sensor={}",
        config.board, config.servo, config.sensor
    );

    let (registry, sensor, servo) = mock_registry(&config);
    let mut controller = LatchController::from_registry(config, &registry)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !handle_line(line.trim(), &mut controller, &sensor, &servo).await? {
                    break;
                }
            }
        }
    }

    controller.close().await;
    Ok(())
}

/// Load the configuration from `path`, the default file, or built-in names.
fn load_config(path: Option<String>) -> Result<LatchConfig> {
    if let Some(path) = path {
        return LatchConfig::load(&path).with_context(|| format!("Failed to load config from {path}"));
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return LatchConfig::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load config from {DEFAULT_CONFIG_PATH}"));
    }

    warn!("No config file found, using default mock dependencies");
    Ok(LatchConfig::new("board", "servo", "sensor")?)
}

fn mock_registry(config: &LatchConfig) -> (DeviceRegistry, MockSensorHandle, MockServoHandle) {
    let (sensor, sensor_handle) = MockSensor::with_name(config.sensor.clone());
    let (servo, servo_handle) = MockServo::with_name(config.servo.clone());

    let mut registry = DeviceRegistry::new();
    registry.register_board(config.board.clone(), MockBoard::default());
    registry.register_servo(config.servo.clone(), servo);
    registry.register_sensor(config.sensor.clone(), sensor);

    (registry, sensor_handle, servo_handle)
}

/// Handle one input line. Returns `false` when the session should end.
async fn handle_line(
    line: &str,
    controller: &mut LatchController,
    sensor: &MockSensorHandle,
    servo: &MockServoHandle,
) -> Result<bool> {
    match line {
        "" => {}
        "match" => sensor.queue_reading(Reading::MATCH),
        "reject" => sensor.queue_reading(Reading::REJECTED),
        "idle" => sensor.queue_reading(Reading::IDLE),
        "fail" => sensor.queue_failure("simulated sensor failure"),
        "start" => {
            controller.start();
        }
        "stop" => {
            controller.stop().await;
        }
        "status" => {
            let status = *controller.status().borrow();
            let servo_position = servo
                .position()
                .map_or_else(|| "unknown".to_string(), |angle| angle.to_string());
            println!(
                "latch={} running={} servo={}",
                status.position,
                controller.is_running(),
                servo_position
            );
        }
        "stats" => println!("{:?}", controller.stats()),
        "quit" | "exit" => return Ok(false),
        request if request.starts_with('{') => {
            match serde_json::from_str::<Value>(request) {
                Ok(Value::Object(request)) => {
                    let response = controller.do_command(&request).await;
                    println!("{}", serde_json::to_string(&response)?);
                }
                Ok(_) => warn!("Command request must be a JSON object"),
                Err(e) => warn!("Invalid command JSON: {}", e),
            }
        }
        other => warn!("Unknown input: {}", other),
    }
    Ok(true)
}
