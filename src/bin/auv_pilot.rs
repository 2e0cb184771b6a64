/**
 * AUV Pilot Binary
 *
 * Runs the motion-control pipeline against the actuation bus:
 * 1. Reads start/dive/sensor frames from the serial MCU link
 * 2. Drives the mission sequencer and stabilization loops
 * 3. Writes 10-channel PWM command frames back out
 */

use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use auv_pilot::config::PilotConfig;
use auv_pilot::msg::Axis;
use auv_pilot::pilot::Pilot;
use auv_pilot::uart::UartBridge;

#[derive(Parser)]
#[command(name = "auv_pilot")]
#[command(about = "AUV motion-control core: sensors in, thruster PWM out")]
#[command(version)]
struct Cli{
    /// Calibration delay in seconds before the mission runs
    #[arg(long)]
    delay: f64,

    /// Mission duration in seconds, negative means unbounded
    #[arg(long)]
    duration: f64,

    /// PWM magnitude for the test movement
    #[arg(long, default_value_t = 0)]
    pwm: i32,

    /// Axis to drive while the mission runs (surge/sway/heave/roll/pitch/yaw/stop)
    #[arg(long, default_value = "stop")]
    movement: Axis,

    /// Serial port of the actuation bus
    #[arg(long, default_value = "/dev/ttyACM0")]
    port: String,

    /// Baud rate of the actuation bus
    #[arg(long, default_value_t = 115200)]
    baud: u32,

    /// Seconds a sensor source may stay silent before it is flagged stale
    #[arg(long, default_value_t = 2.0)]
    stale_after: f64,
}

fn main() -> anyhow::Result<()>{
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = PilotConfig::new(cli.delay, cli.duration);
    config.test_pwm = cli.pwm;
    config.test_axis = cli.movement;
    config.stale_after = cli.stale_after;
    config.validate().context("invalid configuration")?;

    tracing::info!(
        delay = config.delay,
        duration = config.duration,
        axis = %config.test_axis,
        pwm = config.test_pwm,
        "starting pilot"
    );

    let mut bridge = UartBridge::open(&cli.port, cli.baud)
        .with_context(|| format!("failed to open {}", cli.port))?;
    let mut pilot = Pilot::new(&config);

    let epoch = Instant::now();

    loop{
        //the serial read timeout paces this loop
        bridge.poll(&mut pilot.inbound)?;

        let now = epoch.elapsed().as_secs_f64();
        pilot.spin_once(now);

        while let Some(cmd) = pilot.outbound.pwm_actuator.try_receive(){
            bridge.send_pwm(&cmd)?;
        }

        //remaining outbound channels feed external consumers; trace and drop
        while let Some(state) = pilot.outbound.vehicle_state.try_receive(){
            tracing::debug!(?state, "vehicle state");
        }
        while let Some(sp) = pilot.outbound.set_point.try_receive(){
            tracing::debug!(?sp, "set point");
        }
        while let Some(started) = pilot.outbound.started.try_receive(){
            tracing::trace!(started, "started signal");
        }
        while let Some(cap) = pilot.outbound.thrust_cap.try_receive(){
            tracing::debug!(cap, "thrust cap");
        }
        while let Some(movement) = pilot.outbound.movement.try_receive(){
            tracing::trace!(axis = %movement.axis, pwm = movement.pwm, "movement");
        }
        while pilot.outbound.object_detection.try_receive().is_some(){}
    }
}
