use std::collections::VecDeque;

use nalgebra::Matrix3;
use tracing::{debug, warn};

/// Bounded history length for both the covariance and yaw buffers.
pub const HISTORY_CAP: usize = 100;

const DEFAULT_COV_THRESHOLD: f64 = 0.01;
const DEFAULT_YAW_THRESHOLD: f64 = 1.0; //degrees

/// Advisory classification of one successive-sample delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftVerdict{
    Drift(f64),
    NoDrift(f64),
}

impl DriftVerdict{
    pub fn is_drift(&self) -> bool{
        matches!(self, DriftVerdict::Drift(_))
    }

    pub fn delta(&self) -> f64{
        match self{
            DriftVerdict::Drift(d) | DriftVerdict::NoDrift(d) => *d,
        }
    }
}

/// Watches short-term divergence in the yaw-related angular velocity
/// covariance and in the compass heading. Verdicts are advisory: they are
/// logged and handed back, and nothing downstream keys control flow on them.
pub struct DriftDetector{
    cov_history: VecDeque<Matrix3<f64>>,
    yaw_history: VecDeque<f64>,
    cov_threshold: f64,
    yaw_threshold: f64,
}

impl DriftDetector{
    pub fn new() -> Self{
        Self::with_thresholds(DEFAULT_COV_THRESHOLD, DEFAULT_YAW_THRESHOLD)
    }

    pub fn with_thresholds(cov_threshold: f64, yaw_threshold: f64) -> Self{
        DriftDetector{
            cov_history: VecDeque::with_capacity(HISTORY_CAP),
            yaw_history: VecDeque::with_capacity(HISTORY_CAP),
            cov_threshold,
            yaw_threshold,
        }
    }

    /// Record an angular-velocity covariance snapshot and classify the
    /// change of its yaw element against the previous sample.
    pub fn record_imu(&mut self, angular_velocity_cov: &Matrix3<f64>) -> Option<DriftVerdict>{
        if self.cov_history.len() == HISTORY_CAP{
            self.cov_history.pop_front();
        }
        self.cov_history.push_back(*angular_velocity_cov);

        if self.cov_history.len() < 2{
            return None; //not enough data yet
        }

        let current = self.cov_history[self.cov_history.len() - 1][(2, 2)];
        let previous = self.cov_history[self.cov_history.len() - 2][(2, 2)];
        let delta = (current - previous).abs();

        let verdict = if delta > self.cov_threshold{
            warn!(delta, "IMU yaw drift detected");
            DriftVerdict::Drift(delta)
        }else{
            debug!(delta, "no significant IMU yaw drift");
            DriftVerdict::NoDrift(delta)
        };
        Some(verdict)
    }

    /// Record a compass yaw sample and classify the change against the
    /// previous sample.
    pub fn record_heading(&mut self, yaw: f64) -> Option<DriftVerdict>{
        if self.yaw_history.len() == HISTORY_CAP{
            self.yaw_history.pop_front();
        }
        self.yaw_history.push_back(yaw);

        if self.yaw_history.len() < 2{
            return None;
        }

        let current = self.yaw_history[self.yaw_history.len() - 1];
        let previous = self.yaw_history[self.yaw_history.len() - 2];
        let delta = (current - previous).abs();

        let verdict = if delta > self.yaw_threshold{
            warn!(delta, "compass yaw drift detected");
            DriftVerdict::Drift(delta)
        }else{
            debug!(delta, "no significant compass yaw drift");
            DriftVerdict::NoDrift(delta)
        };
        Some(verdict)
    }

    pub fn cov_history_len(&self) -> usize{
        self.cov_history.len()
    }

    pub fn yaw_history_len(&self) -> usize{
        self.yaw_history.len()
    }
}

impl Default for DriftDetector{
    fn default() -> Self{
        Self::new()
    }
}
