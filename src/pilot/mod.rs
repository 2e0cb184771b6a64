/**
 * Pilot event loop
 *
 * Owns every pipeline component plus the inbound/outbound channel sets and
 * dispatches events to their handlers. Single-threaded and cooperative:
 * each handler runs to completion, per-channel FIFO order is preserved,
 * and cross-channel interleaving follows the fixed drain order below
 * (deliberately an unspecified contract for callers).
 *
 * Sensors feed the estimator/aggregator, the start heartbeat drives the
 * mission sequencer, and error residuals run the stabilization loops into
 * the thruster allocator. Actuation publishes are gated to 10 Hz by a
 * minimum inter-command interval.
 */

use tracing::debug;

use crate::channel::Channel;
use crate::config::PilotConfig;
use crate::control::Stabilizer;
use crate::mission::MissionSequencer;
use crate::msg::{
    Axis, DepthSample, ErrorResidual, HeadingSample, ImuSample, Movement, ObjectDetection,
    OdometrySample, PwmActuator, Setpoint, VehicleState,
};
use crate::nav::{DriftDetector, OrientationEstimator};
use crate::state::StateAggregator;
use crate::thruster::Thrusters;

/// Minimum seconds between actuation publishes (10 Hz ceiling).
pub const ACTUATION_INTERVAL: f64 = 0.1;

//assumed control period until two residuals have been observed
const DEFAULT_DT: f64 = 0.1;

const SENSOR_DEPTH: usize = 64;
const FLAG_DEPTH: usize = 16;

pub struct InboundChannels{
    pub imu: Channel<ImuSample>,
    pub heading: Channel<HeadingSample>,
    pub filtered_yaw: Channel<f64>,
    pub odometry: Channel<OdometrySample>,
    pub depth: Channel<DepthSample>,
    pub dive: Channel<bool>,
    pub start: Channel<bool>,
    pub error: Channel<ErrorResidual>,
}

impl InboundChannels{
    fn new() -> Self{
        InboundChannels{
            imu: Channel::new("/imu", SENSOR_DEPTH),
            heading: Channel::new("/heading", SENSOR_DEPTH),
            filtered_yaw: Channel::new("/filtered_yaw", SENSOR_DEPTH),
            odometry: Channel::new("/odometry", SENSOR_DEPTH),
            depth: Channel::new("/depth", SENSOR_DEPTH),
            dive: Channel::new("/dive", FLAG_DEPTH),
            start: Channel::new("/start", FLAG_DEPTH),
            error: Channel::new("/error", SENSOR_DEPTH),
        }
    }
}

pub struct OutboundChannels{
    pub vehicle_state: Channel<VehicleState>,
    pub object_detection: Channel<ObjectDetection>,
    pub started: Channel<bool>,
    pub set_point: Channel<Setpoint>,
    pub movement: Channel<Movement>,
    pub thrust_cap: Channel<i32>,
    pub pwm_actuator: Channel<PwmActuator>,
}

impl OutboundChannels{
    fn new() -> Self{
        OutboundChannels{
            vehicle_state: Channel::new("/vehicle_state", SENSOR_DEPTH),
            object_detection: Channel::new("/object_detection", FLAG_DEPTH),
            started: Channel::new("/started", FLAG_DEPTH),
            set_point: Channel::new("/set_point", SENSOR_DEPTH),
            movement: Channel::new("/movement", SENSOR_DEPTH),
            thrust_cap: Channel::new("/thrust_cap", FLAG_DEPTH),
            pwm_actuator: Channel::new("/pwm_actuator", SENSOR_DEPTH),
        }
    }
}

pub struct Pilot{
    test_axis: Axis,
    test_pwm: i32,

    pub inbound: InboundChannels,
    pub outbound: OutboundChannels,

    estimator: OrientationEstimator,
    drift: DriftDetector,
    aggregator: StateAggregator,
    mission: MissionSequencer,
    stabilizer: Stabilizer,
    thrusters: Thrusters,

    was_started: bool,
    last_error_at: Option<f64>,
    last_actuation_at: Option<f64>,
}

impl Pilot{
    pub fn new(config: &PilotConfig) -> Self{
        Pilot{
            test_axis: config.test_axis,
            test_pwm: config.test_pwm,
            inbound: InboundChannels::new(),
            outbound: OutboundChannels::new(),
            estimator: OrientationEstimator::new(),
            drift: DriftDetector::new(),
            aggregator: StateAggregator::new(config.stale_after),
            mission: MissionSequencer::new(config.delay, config.duration),
            stabilizer: Stabilizer::new(),
            thrusters: Thrusters::new(),
            was_started: false,
            last_error_at: None,
            last_actuation_at: None,
        }
    }

    /// Drain every inbound channel through its handler. `now` is monotonic
    /// seconds; all timing (boot time, staleness, rate gate) derives from it.
    pub fn spin_once(&mut self, now: f64){
        while let Some(sample) = self.inbound.imu.try_receive(){
            self.handle_imu(&sample, now);
        }
        while let Some(sample) = self.inbound.heading.try_receive(){
            self.handle_heading(&sample);
        }
        while let Some(yaw) = self.inbound.filtered_yaw.try_receive(){
            self.aggregator.set_yaw(yaw, now);
        }
        while let Some(odom) = self.inbound.odometry.try_receive(){
            self.aggregator.set_position(odom, now);
        }
        while let Some(sample) = self.inbound.depth.try_receive(){
            self.aggregator.set_depth(sample.depth, now);
        }
        while let Some(dive) = self.inbound.dive.try_receive(){
            self.mission.set_dive(dive);
        }
        while let Some(active) = self.inbound.start.try_receive(){
            self.handle_start(active, now);
        }
        while let Some(residual) = self.inbound.error.try_receive(){
            self.handle_error(&residual, now);
        }
    }

    fn handle_imu(&mut self, sample: &ImuSample, now: f64){
        let attitude = self.estimator.on_imu(&sample.orientation);
        self.aggregator.set_attitude(attitude, now);
        self.drift.record_imu(&sample.angular_velocity_cov);
    }

    fn handle_heading(&mut self, sample: &HeadingSample){
        self.estimator.on_heading(sample.yaw);
        self.drift.record_heading(sample.yaw);
    }

    fn handle_start(&mut self, active: bool, now: f64){
        let Some(tick) = self.mission.on_start_signal(active, now) else{
            //signal dropped to false: mission reset, neutralize if we were live
            if self.was_started{
                self.halt_thrusters();
                self.was_started = false;
            }
            return;
        };

        self.outbound.started.publish(tick.started);
        if let Some(set_point) = tick.set_point{
            self.outbound.set_point.publish(set_point);
        }
        if let Some(cap) = tick.thrust_cap{
            self.outbound.thrust_cap.publish(cap);
        }

        if let Some(state) = self.aggregator.tick(tick.started){
            self.aggregator.warn_if_stale(now);
            self.outbound.vehicle_state.publish(state);
            //detection pipeline is out of scope, the record stays empty
            self.outbound.object_detection.publish(ObjectDetection::default());
        }

        if tick.started{
            self.thrusters.apply(self.test_axis, self.test_pwm);
            self.outbound.movement.publish(Movement{ axis: self.test_axis, pwm: self.test_pwm });
            self.publish_actuation(now);
        }else if self.was_started{
            self.halt_thrusters();
        }
        self.was_started = tick.started;
    }

    fn handle_error(&mut self, residual: &ErrorResidual, now: f64){
        let dt = self
            .last_error_at
            .map(|t| now - t)
            .filter(|d| *d > 0.0)
            .unwrap_or(DEFAULT_DT);
        self.last_error_at = Some(now);

        let corr = self.stabilizer.stabilize(residual, dt);
        debug!(?corr, dt, "stabilization cycle");

        if !self.mission.is_started(){
            return;
        }

        //every group write for this cycle lands before the single publish,
        //so a partially mixed vector is never observed externally. within
        //the vertical group the later call overwrites the earlier one
        //(allocator limitation, kept as-is); heave goes last so depth
        //holding wins the group
        self.thrusters.roll(corr.roll.round() as i32);
        self.thrusters.pitch(corr.pitch.round() as i32);
        self.thrusters.heave(corr.heave.round() as i32);
        self.thrusters.yaw(corr.yaw.round() as i32);
        self.publish_actuation(now);
    }

    //rate gate: skip publishes closer together than ACTUATION_INTERVAL
    fn publish_actuation(&mut self, now: f64){
        if let Some(last) = self.last_actuation_at{
            if now - last < ACTUATION_INTERVAL{
                return;
            }
        }
        self.last_actuation_at = Some(now);
        self.outbound.pwm_actuator.publish(self.thrusters.command());
    }

    //neutralize and flush immediately, bypassing the rate gate
    fn halt_thrusters(&mut self){
        self.thrusters.stop();
        self.stabilizer.reset();
        self.outbound.pwm_actuator.publish(self.thrusters.command());
    }

    pub fn mission(&self) -> &MissionSequencer{
        &self.mission
    }

    pub fn aggregator(&self) -> &StateAggregator{
        &self.aggregator
    }

    pub fn estimator(&self) -> &OrientationEstimator{
        &self.estimator
    }

    pub fn thrusters(&self) -> &Thrusters{
        &self.thrusters
    }
}
