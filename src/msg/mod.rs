/**
 * Typed event and command records
 *
 * Inbound samples arrive from the sensor stack (IMU, compass, visual
 * odometry, pressure sensor) and the mission switches; outbound records
 * feed the guidance consumers and the actuation bus.
 */

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Quaternion, Vector3};

/// Raw IMU sample: unit quaternion plus the three covariance matrices
/// reported alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample{
    pub orientation: Quaternion<f64>,
    pub orientation_cov: Matrix3<f64>,
    pub angular_velocity_cov: Matrix3<f64>,
    pub linear_acceleration_cov: Matrix3<f64>,
}

impl Default for ImuSample{
    fn default() -> Self{
        ImuSample{
            orientation: Quaternion::identity(),
            orientation_cov: Matrix3::zeros(),
            angular_velocity_cov: Matrix3::zeros(),
            linear_acceleration_cov: Matrix3::zeros(),
        }
    }
}

/// Magnetic compass sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSample{
    pub yaw: f64,             //degrees
    pub mag: Vector3<f64>,    //µT
}

impl Default for HeadingSample{
    fn default() -> Self{
        HeadingSample{ yaw: 0.0, mag: Vector3::zeros() }
    }
}

/// Visual odometry position sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OdometrySample{
    pub x: f64,               //meters
    pub y: f64,
    pub z: f64,
}

/// Pressure sensor depth sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthSample{
    pub depth: f64,           //meters, negative below surface
}

/// Per-axis error residual (set point minus state), computed upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorResidual{
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub depth: f64,
}

/// Merged vehicle state record. Each field is fed by exactly one sensor
/// stream, so partial updates from different sources never conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleState{
    pub roll: f64,            //degrees
    pub pitch: f64,
    pub yaw: f64,
    pub depth: f64,           //meters
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
}

/// Mission set point targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint{
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub depth: f64,
}

impl Default for Setpoint{
    fn default() -> Self{
        Setpoint{ roll: 0.0, pitch: 0.0, yaw: -88.0, depth: -0.4 }
    }
}

/// One of the six degree-of-freedom directions, plus the all-stop command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Axis{
    Surge,
    Sway,
    Heave,
    Roll,
    Pitch,
    Yaw,
    #[default]
    Stop,
}

impl Axis{
    pub fn as_str(&self) -> &'static str{
        match self{
            Axis::Surge => "surge",
            Axis::Sway => "sway",
            Axis::Heave => "heave",
            Axis::Roll => "roll",
            Axis::Pitch => "pitch",
            Axis::Yaw => "yaw",
            Axis::Stop => "stop",
        }
    }
}

impl FromStr for Axis{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>{
        match s{
            "surge" => Ok(Axis::Surge),
            "sway" => Ok(Axis::Sway),
            "heave" => Ok(Axis::Heave),
            "roll" => Ok(Axis::Roll),
            "pitch" => Ok(Axis::Pitch),
            "yaw" => Ok(Axis::Yaw),
            "stop" => Ok(Axis::Stop),
            other => Err(format!("unknown axis '{}'", other)),
        }
    }
}

impl fmt::Display for Axis{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        f.write_str(self.as_str())
    }
}

/// Movement command for the thruster allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Movement{
    pub axis: Axis,
    pub pwm: i32,
}

/// 10-channel actuation vector, neutral at 1500.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmActuator{
    pub pwm: [i32; 10],
}

impl Default for PwmActuator{
    fn default() -> Self{
        PwmActuator{ pwm: [1500; 10] }
    }
}

/// Detection placeholder published alongside the vehicle state. The
/// detection pipeline is not part of this core, so the list stays empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectDetection{
    pub bounding_boxes: Vec<BoundingBox>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBox{
    pub class_name: String,
    pub probability: f64,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_setpoint_defaults(){
        let sp = Setpoint::default();
        assert_eq!(sp.roll, 0.0);
        assert_eq!(sp.pitch, 0.0);
        assert_eq!(sp.yaw, -88.0);
        assert_eq!(sp.depth, -0.4);
    }

    #[test]
    fn test_axis_round_trip(){
        for name in ["surge", "sway", "heave", "roll", "pitch", "yaw", "stop"]{
            let axis: Axis = name.parse().unwrap();
            assert_eq!(axis.as_str(), name);
        }
        assert!("dive".parse::<Axis>().is_err());
    }

    #[test]
    fn test_pwm_actuator_neutral(){
        let cmd = PwmActuator::default();
        assert!(cmd.pwm.iter().all(|&p| p == 1500));
    }
}
