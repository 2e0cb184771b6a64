/**
 * Stabilization controller
 *
 * Four independent PID loops (roll, pitch, yaw, depth) turning externally
 * computed error residuals into PWM corrections. The loops are stateful and
 * expect residuals at a roughly uniform rate; integral and derivative terms
 * are scaled by the measured inter-sample dt.
 */

pub mod pid;

pub use pid::Pid;

use crate::msg::ErrorResidual;

/// Per-axis PWM corrections produced by one stabilization cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Corrections{
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub heave: f64,
}

pub struct Stabilizer{
    pid_heave: Pid,
    pid_roll: Pid,
    pid_pitch: Pid,
    pid_yaw: Pid,
}

impl Stabilizer{
    pub fn new() -> Self{
        Stabilizer{
            pid_heave: Pid::new(1000.0, 0.0, 0.0),
            pid_roll: Pid::new(500.0, 20.0, 50.0),
            pid_pitch: Pid::new(500.0, 20.0, 50.0),
            pid_yaw: Pid::new(1200.0, 20.0, 50.0),
        }
    }

    /// Run all four loops against one residual record.
    pub fn stabilize(&mut self, error: &ErrorResidual, dt: f64) -> Corrections{
        Corrections{
            roll: self.pid_roll.update(error.roll, dt),
            pitch: self.pid_pitch.update(error.pitch, dt),
            yaw: self.pid_yaw.update(error.yaw, dt),
            heave: self.pid_heave.update(error.depth, dt),
        }
    }

    /// Drop accumulated loop state, e.g. on a mission reset.
    pub fn reset(&mut self){
        self.pid_heave.reset();
        self.pid_roll.reset();
        self.pid_pitch.reset();
        self.pid_yaw.reset();
    }
}

impl Default for Stabilizer{
    fn default() -> Self{
        Self::new()
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_depth_loop_is_proportional_only(){
        let mut stab = Stabilizer::new();
        let residual = ErrorResidual{ depth: 0.2, ..Default::default() };

        let first = stab.stabilize(&residual, 0.1);
        let second = stab.stabilize(&residual, 0.1);

        assert_relative_eq!(first.heave, 200.0);
        //no integral or derivative on depth, output is repeatable
        assert_relative_eq!(second.heave, first.heave);
    }

    #[test]
    fn test_axes_are_independent(){
        let mut stab = Stabilizer::new();
        let residual = ErrorResidual{ yaw: 1.0, ..Default::default() };

        let corr = stab.stabilize(&residual, 0.1);
        assert!(corr.yaw > 0.0);
        assert_relative_eq!(corr.roll, 0.0);
        assert_relative_eq!(corr.pitch, 0.0);
        assert_relative_eq!(corr.heave, 0.0);
    }

    #[test]
    fn test_yaw_gain_dominates_roll(){
        let mut stab = Stabilizer::new();
        let residual = ErrorResidual{ roll: 1.0, yaw: 1.0, ..Default::default() };

        //first cycle: Kp*e + Ki*e*dt, no derivative yet
        let corr = stab.stabilize(&residual, 0.1);
        assert_relative_eq!(corr.roll, 500.0 + 20.0 * 0.1);
        assert_relative_eq!(corr.yaw, 1200.0 + 20.0 * 0.1);
    }
}
