//integrator clamp, in error-unit-seconds; with the stabilization gains this
//caps the integral contribution at a few hundred PWM counts
const I_LIMIT: f64 = 25.0;

/// Single-axis PID loop with persistent integral and previous-error memory.
///
/// out = Kp*e + Ki*integral(e dt) + Kd*de/dt. The integral accumulator
/// saturates at +/-I_LIMIT so a held error cannot wind the loop up without
/// bound.
#[derive(Debug, Clone)]
pub struct Pid{
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    prev_error: Option<f64>,
    i_limit: f64,
}

impl Pid{
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self{
        Pid{
            kp,
            ki,
            kd,
            integral: 0.0,
            prev_error: None,
            i_limit: I_LIMIT,
        }
    }

    /// Advance the loop with one error sample taken dt seconds after the
    /// previous one.
    pub fn update(&mut self, error: f64, dt: f64) -> f64{
        self.integral += error * dt;
        self.integral = self.integral.clamp(-self.i_limit, self.i_limit);

        let derivative = match self.prev_error{
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    /// Clear the accumulated state, e.g. between missions.
    pub fn reset(&mut self){
        self.integral = 0.0;
        self.prev_error = None;
    }

    pub fn integral(&self) -> f64{
        self.integral
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_proportional_only(){
        let mut pid = Pid::new(1000.0, 0.0, 0.0);
        assert_relative_eq!(pid.update(0.5, 0.1), 500.0);
        assert_relative_eq!(pid.update(-0.2, 0.1), -200.0);
    }

    #[test]
    fn test_integral_accumulates(){
        let mut pid = Pid::new(0.0, 20.0, 0.0);
        //two samples of constant error 1.0 at 10 Hz
        assert_relative_eq!(pid.update(1.0, 0.1), 20.0 * 0.1);
        assert_relative_eq!(pid.update(1.0, 0.1), 20.0 * 0.2);
    }

    #[test]
    fn test_integral_saturates(){
        let mut pid = Pid::new(0.0, 20.0, 0.0);
        for _ in 0..1000{
            pid.update(10.0, 0.1);
        }
        assert_relative_eq!(pid.integral(), 25.0);
        //a held error produces a bounded correction
        assert_relative_eq!(pid.update(10.0, 0.1), 20.0 * 25.0);
    }

    #[test]
    fn test_derivative_uses_previous_error(){
        let mut pid = Pid::new(0.0, 0.0, 50.0);
        //first sample has no previous error, derivative term is zero
        assert_relative_eq!(pid.update(1.0, 0.1), 0.0);
        //de/dt = (2 - 1) / 0.1 = 10
        assert_relative_eq!(pid.update(2.0, 0.1), 500.0);
    }

    #[test]
    fn test_reset_clears_memory(){
        let mut pid = Pid::new(0.0, 20.0, 50.0);
        pid.update(1.0, 0.1);
        pid.update(2.0, 0.1);
        pid.reset();

        assert_relative_eq!(pid.integral(), 0.0);
        //after reset the derivative term starts from scratch again
        assert_relative_eq!(pid.update(3.0, 0.1), 20.0 * 0.3);
    }
}
