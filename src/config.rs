use thiserror::Error;

use crate::msg::Axis;
use crate::thruster::{PWM_MAX, PWM_NEUTRAL};

#[derive(Debug, Error)]
pub enum ConfigError{
    #[error("calibration delay must be finite and non-negative, got {0}")]
    InvalidDelay(f64),
    #[error("mission duration must be finite (negative means unbounded), got {0}")]
    InvalidDuration(f64),
    #[error("test pwm magnitude {0} exceeds the +/-{1} actuator span")]
    PwmOutOfRange(i32, i32),
    #[error("staleness window must be positive, got {0}")]
    InvalidStaleWindow(f64),
}

/// Static run configuration, supplied once at startup. The mission cannot
/// be timed without delay and duration, so the binary refuses to start
/// without them.
#[derive(Debug, Clone)]
pub struct PilotConfig{
    /// Calibration delay in seconds before the mission runs.
    pub delay: f64,
    /// Mission duration in seconds; negative means unbounded.
    pub duration: f64,
    /// PWM magnitude for the configured test movement.
    pub test_pwm: i32,
    /// Axis driven while the mission is running.
    pub test_axis: Axis,
    /// Seconds a sensor source may stay silent before it is flagged stale.
    pub stale_after: f64,
}

impl PilotConfig{
    pub fn new(delay: f64, duration: f64) -> Self{
        PilotConfig{
            delay,
            duration,
            test_pwm: 0,
            test_axis: Axis::Stop,
            stale_after: 2.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError>{
        if !self.delay.is_finite() || self.delay < 0.0{
            return Err(ConfigError::InvalidDelay(self.delay));
        }
        if !self.duration.is_finite(){
            return Err(ConfigError::InvalidDuration(self.duration));
        }
        let span = PWM_MAX - PWM_NEUTRAL;
        if self.test_pwm.abs() > span{
            return Err(ConfigError::PwmOutOfRange(self.test_pwm, span));
        }
        if !self.stale_after.is_finite() || self.stale_after <= 0.0{
            return Err(ConfigError::InvalidStaleWindow(self.stale_after));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_valid_config(){
        let mut cfg = PilotConfig::new(5.0, 20.0);
        cfg.test_pwm = 100;
        cfg.test_axis = Axis::Surge;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_negative_duration_is_allowed(){
        assert!(PilotConfig::new(5.0, -1.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_delay(){
        assert!(matches!(
            PilotConfig::new(-1.0, 20.0).validate(),
            Err(ConfigError::InvalidDelay(_))
        ));
    }

    #[test]
    fn test_rejects_nan_duration(){
        assert!(matches!(
            PilotConfig::new(5.0, f64::NAN).validate(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_test_pwm(){
        let mut cfg = PilotConfig::new(5.0, 20.0);
        cfg.test_pwm = 500;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PwmOutOfRange(500, 400))
        ));
    }
}
