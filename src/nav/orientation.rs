use nalgebra::Quaternion;
use tracing::info;

/// Roll/pitch attitude derived from the IMU quaternion, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attitude{
    pub roll: f64,
    pub pitch: f64,
}

/// Convert a unit quaternion to (roll, pitch, yaw) in degrees.
pub fn quat_to_euler_deg(q: &Quaternion<f64>) -> (f64, f64, f64){
    let (x, y, z, w) = (q.i, q.j, q.k, q.w);
    let roll = (2.0 * (y * z + w * x)).atan2(w * w - x * x - y * y + z * z);
    let pitch = (-2.0 * (x * z - w * y)).asin();
    let yaw = (2.0 * (x * y + w * z)).atan2(w * w + x * x - y * y - z * z);
    (roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}

/// Converts IMU quaternions to roll/pitch and keeps the displayed yaw
/// anchored to the compass.
///
/// Displayed yaw is never taken from the gyro-integrated quaternion alone;
/// the first IMU sample that arrives after a compass heading locks a yaw
/// offset (compass yaw minus quaternion yaw) that is applied from then on.
/// The calibration fires exactly once per process.
pub struct OrientationEstimator{
    last_heading_yaw: Option<f64>,
    yaw_offset: f64,
    yaw_calibrated: bool,
    displayed_yaw: f64,
}

impl OrientationEstimator{
    pub fn new() -> Self{
        OrientationEstimator{
            last_heading_yaw: None,
            yaw_offset: 0.0,
            yaw_calibrated: false,
            displayed_yaw: 0.0,
        }
    }

    /// Ingest an IMU quaternion; returns the derived roll/pitch.
    pub fn on_imu(&mut self, orientation: &Quaternion<f64>) -> Attitude{
        let (roll, pitch, quat_yaw) = quat_to_euler_deg(orientation);

        if !self.yaw_calibrated{
            if let Some(heading_yaw) = self.last_heading_yaw{
                self.yaw_offset = heading_yaw - quat_yaw;
                self.yaw_calibrated = true;
                info!(offset = self.yaw_offset, "yaw calibration locked");
            }
        }

        self.displayed_yaw = quat_yaw + self.yaw_offset;
        Attitude{ roll, pitch }
    }

    /// Remember the latest compass yaw for the calibration.
    pub fn on_heading(&mut self, yaw: f64){
        self.last_heading_yaw = Some(yaw);
    }

    pub fn yaw_offset(&self) -> f64{
        self.yaw_offset
    }

    pub fn is_calibrated(&self) -> bool{
        self.yaw_calibrated
    }

    /// Quaternion yaw with the calibration offset applied.
    pub fn displayed_yaw(&self) -> f64{
        self.displayed_yaw
    }
}

impl Default for OrientationEstimator{
    fn default() -> Self{
        Self::new()
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_quaternion_is_level(){
        let q = Quaternion::new(1.0, 0.0, 0.0, 0.0); //w, x, y, z
        let (roll, pitch, yaw) = quat_to_euler_deg(&q);
        assert_relative_eq!(roll, 0.0);
        assert_relative_eq!(pitch, 0.0);
        assert_relative_eq!(yaw, 0.0);
    }

    #[test]
    fn test_pure_yaw_rotation(){
        //90 degrees about z
        let half = (90.0f64).to_radians() / 2.0;
        let q = Quaternion::new(half.cos(), 0.0, 0.0, half.sin());
        let (roll, pitch, yaw) = quat_to_euler_deg(&q);
        assert_relative_eq!(roll, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-9);
        assert_relative_eq!(yaw, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pure_roll_rotation(){
        let half = (30.0f64).to_radians() / 2.0;
        let q = Quaternion::new(half.cos(), half.sin(), 0.0, 0.0);
        let (roll, pitch, _) = quat_to_euler_deg(&q);
        assert_relative_eq!(roll, 30.0, epsilon = 1e-9);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_calibration_needs_heading_first(){
        let mut est = OrientationEstimator::new();
        let q = Quaternion::new(1.0, 0.0, 0.0, 0.0);

        est.on_imu(&q);
        assert!(!est.is_calibrated());

        est.on_heading(-92.5);
        est.on_imu(&q);
        assert!(est.is_calibrated());
        assert_relative_eq!(est.yaw_offset(), -92.5);
        assert_relative_eq!(est.displayed_yaw(), -92.5);
    }

    #[test]
    fn test_calibration_fires_exactly_once(){
        let mut est = OrientationEstimator::new();
        let q = Quaternion::new(1.0, 0.0, 0.0, 0.0);

        est.on_heading(10.0);
        est.on_heading(20.0);
        est.on_imu(&q);
        assert_relative_eq!(est.yaw_offset(), 20.0);

        //later headings must not move the locked offset
        est.on_heading(55.0);
        est.on_imu(&q);
        assert_relative_eq!(est.yaw_offset(), 20.0);
    }
}
