/**
 * Navigation sensing
 *
 * Orientation estimation from the IMU quaternion plus the compass-backed
 * one-shot yaw calibration, and the advisory drift monitor over short-term
 * covariance/heading divergence.
 */

pub mod orientation;
pub mod drift;

pub use orientation::{Attitude, OrientationEstimator};
pub use drift::{DriftDetector, DriftVerdict};
