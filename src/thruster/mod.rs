/**
 * Thruster allocation
 *
 * Fixed mixing table mapping one axis command + magnitude onto the ten PWM
 * channels. Each axis owns a four-channel group: surge/sway/yaw share
 * channels 1-4 and heave/roll/pitch share channels 5-8, so commanding two
 * axes of the same group in one cycle overwrites the earlier call
 * (last-write-wins, deliberately not superposed). Channels 9-10 only move
 * under `stop`. The vector persists across calls.
 */

use crate::msg::{Axis, PwmActuator};

pub const PWM_NEUTRAL: i32 = 1500;

//actuator hard limits; anything outside this span is not accepted by the ESCs
pub const PWM_MIN: i32 = 1100;
pub const PWM_MAX: i32 = 1900;

pub struct Thrusters{
    pwm: [i32; 10],
}

impl Thrusters{
    pub fn new() -> Self{
        Thrusters{ pwm: [PWM_NEUTRAL; 10] }
    }

    /// Channels 1-4 forward.
    pub fn surge(&mut self, pwm: i32){
        self.set(0, PWM_NEUTRAL + pwm);
        self.set(1, PWM_NEUTRAL + pwm);
        self.set(2, PWM_NEUTRAL + pwm);
        self.set(3, PWM_NEUTRAL + pwm);
    }

    /// Channels 1-4 lateral.
    pub fn sway(&mut self, pwm: i32){
        self.set(0, PWM_NEUTRAL - pwm);
        self.set(1, PWM_NEUTRAL + pwm);
        self.set(2, PWM_NEUTRAL + pwm);
        self.set(3, PWM_NEUTRAL - pwm);
    }

    /// Channels 1-4 differential.
    pub fn yaw(&mut self, pwm: i32){
        self.set(0, PWM_NEUTRAL - pwm);
        self.set(1, PWM_NEUTRAL - pwm);
        self.set(2, PWM_NEUTRAL + pwm);
        self.set(3, PWM_NEUTRAL + pwm);
    }

    /// Channels 5-8 vertical.
    pub fn heave(&mut self, pwm: i32){
        self.set(4, PWM_NEUTRAL + pwm);
        self.set(5, PWM_NEUTRAL + pwm);
        self.set(6, PWM_NEUTRAL + pwm);
        self.set(7, PWM_NEUTRAL + pwm);
    }

    /// Channels 5-8 differential port/starboard.
    pub fn roll(&mut self, pwm: i32){
        self.set(4, PWM_NEUTRAL - pwm);
        self.set(5, PWM_NEUTRAL + pwm);
        self.set(6, PWM_NEUTRAL - pwm);
        self.set(7, PWM_NEUTRAL + pwm);
    }

    /// Channels 5-8 differential fore/aft.
    pub fn pitch(&mut self, pwm: i32){
        self.set(4, PWM_NEUTRAL + pwm);
        self.set(5, PWM_NEUTRAL + pwm);
        self.set(6, PWM_NEUTRAL - pwm);
        self.set(7, PWM_NEUTRAL - pwm);
    }

    /// All ten channels back to neutral.
    pub fn stop(&mut self){
        self.pwm = [PWM_NEUTRAL; 10];
    }

    /// Dispatch a named axis command.
    pub fn apply(&mut self, axis: Axis, pwm: i32){
        match axis{
            Axis::Surge => self.surge(pwm),
            Axis::Sway => self.sway(pwm),
            Axis::Yaw => self.yaw(pwm),
            Axis::Heave => self.heave(pwm),
            Axis::Roll => self.roll(pwm),
            Axis::Pitch => self.pitch(pwm),
            Axis::Stop => self.stop(),
        }
    }

    pub fn pwm(&self) -> [i32; 10]{
        self.pwm
    }

    pub fn command(&self) -> PwmActuator{
        PwmActuator{ pwm: self.pwm }
    }

    fn set(&mut self, index: usize, value: i32){
        self.pwm[index] = value.clamp(PWM_MIN, PWM_MAX);
    }
}

impl Default for Thrusters{
    fn default() -> Self{
        Self::new()
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_surge_leaves_vertical_group_alone(){
        let mut t = Thrusters::new();
        t.heave(-60);
        t.surge(100);

        let pwm = t.pwm();
        assert_eq!(&pwm[0..4], &[1600, 1600, 1600, 1600]);
        //channels 5-8 keep the previous heave command
        assert_eq!(&pwm[4..8], &[1440, 1440, 1440, 1440]);
        assert_eq!(&pwm[8..10], &[1500, 1500]);
    }

    #[test]
    fn test_sway_signs(){
        let mut t = Thrusters::new();
        t.sway(50);
        assert_eq!(&t.pwm()[0..4], &[1450, 1550, 1550, 1450]);
    }

    #[test]
    fn test_yaw_signs(){
        let mut t = Thrusters::new();
        t.yaw(50);
        assert_eq!(&t.pwm()[0..4], &[1450, 1450, 1550, 1550]);
    }

    #[test]
    fn test_roll_and_pitch_signs(){
        let mut t = Thrusters::new();
        t.roll(40);
        assert_eq!(&t.pwm()[4..8], &[1460, 1540, 1460, 1540]);

        t.pitch(40);
        assert_eq!(&t.pwm()[4..8], &[1540, 1540, 1460, 1460]);
    }

    #[test]
    fn test_horizontal_group_last_write_wins(){
        let mut t = Thrusters::new();
        t.surge(100);
        t.yaw(50);

        //yaw overwrote the surge command on channels 1-4
        assert_eq!(&t.pwm()[0..4], &[1450, 1450, 1550, 1550]);
    }

    #[test]
    fn test_stop_resets_everything(){
        let mut t = Thrusters::new();
        t.surge(200);
        t.heave(-150);
        t.stop();
        assert_eq!(t.pwm(), [1500; 10]);
    }

    #[test]
    fn test_writes_are_clamped_to_safe_range(){
        let mut t = Thrusters::new();
        t.surge(600);
        assert_eq!(&t.pwm()[0..4], &[PWM_MAX; 4]);

        t.sway(600);
        assert_eq!(t.pwm()[0], PWM_MIN);
        assert_eq!(t.pwm()[1], PWM_MAX);
    }

    #[test]
    fn test_vector_persists_across_calls(){
        let mut t = Thrusters::new();
        t.heave(30);
        t.heave(30);
        //no implicit reset between identical commands
        assert_eq!(&t.pwm()[4..8], &[1530; 4]);
    }
}
