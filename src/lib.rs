pub mod channel;
pub mod msg;
pub mod nav;
pub mod state;
pub mod mission;
pub mod control;
pub mod thruster;
pub mod config;
pub mod pilot;
pub mod uart;

pub use channel::Channel;
pub use config::{ConfigError, PilotConfig};
pub use control::{Pid, Stabilizer};
pub use mission::{MissionSequencer, MissionState, MissionTick};
pub use msg::{
    Axis, DepthSample, ErrorResidual, HeadingSample, ImuSample, Movement, ObjectDetection,
    OdometrySample, PwmActuator, Setpoint, VehicleState,
};
pub use nav::{DriftDetector, DriftVerdict, OrientationEstimator};
pub use pilot::Pilot;
pub use state::{CalibrationOffset, StateAggregator};
pub use thruster::Thrusters;
pub use uart::UartBridge;
