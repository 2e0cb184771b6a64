/**
 * State aggregation
 *
 * Merges the per-sensor partial updates into one VehicleState record and
 * owns the pre-mission calibration offset. While the mission has not
 * started, every start-signal tick re-zeroes the offset against the current
 * state; the stored offset only becomes visible once calibration ends.
 */

use tracing::warn;

use crate::msg::{OdometrySample, VehicleState};
use crate::nav::Attitude;

/// Snapshot of the zeroing offsets captured during pre-calibration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationOffset{
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub depth: f64,
}

/// Sensor streams feeding the aggregate, one writer per state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSource{
    Imu,
    FilteredYaw,
    Odometry,
    Depth,
}

const SOURCE_COUNT: usize = 4;

impl SensorSource{
    fn index(self) -> usize{
        match self{
            SensorSource::Imu => 0,
            SensorSource::FilteredYaw => 1,
            SensorSource::Odometry => 2,
            SensorSource::Depth => 3,
        }
    }

    pub fn name(self) -> &'static str{
        match self{
            SensorSource::Imu => "imu",
            SensorSource::FilteredYaw => "filtered_yaw",
            SensorSource::Odometry => "odometry",
            SensorSource::Depth => "depth",
        }
    }
}

const ALL_SOURCES: [SensorSource; SOURCE_COUNT] = [
    SensorSource::Imu,
    SensorSource::FilteredYaw,
    SensorSource::Odometry,
    SensorSource::Depth,
];

pub struct StateAggregator{
    state: VehicleState,
    offset: CalibrationOffset,
    pre_calibrating: bool,
    stale_after: f64, //seconds a source may stay silent before it is flagged
    last_seen: [Option<f64>; SOURCE_COUNT],
}

impl StateAggregator{
    pub fn new(stale_after: f64) -> Self{
        StateAggregator{
            state: VehicleState::default(),
            offset: CalibrationOffset::default(),
            pre_calibrating: false,
            stale_after,
            last_seen: [None; SOURCE_COUNT],
        }
    }

    /// Roll/pitch update from the IMU stream.
    pub fn set_attitude(&mut self, attitude: Attitude, now: f64){
        self.state.roll = attitude.roll;
        self.state.pitch = attitude.pitch;
        self.touch(SensorSource::Imu, now);
    }

    /// Yaw update from the externally filtered heading feed.
    pub fn set_yaw(&mut self, yaw: f64, now: f64){
        self.state.yaw = yaw;
        self.touch(SensorSource::FilteredYaw, now);
    }

    /// Position update from visual odometry.
    pub fn set_position(&mut self, odom: OdometrySample, now: f64){
        self.state.pos_x = odom.x;
        self.state.pos_y = odom.y;
        self.state.pos_z = odom.z;
        self.touch(SensorSource::Odometry, now);
    }

    /// Depth update from the pressure sensor.
    pub fn set_depth(&mut self, depth: f64, now: f64){
        self.state.depth = depth;
        self.touch(SensorSource::Depth, now);
    }

    /// Start-signal tick. While not started the offset is overwritten with
    /// the current state on every tick, deliberately tracking the latest
    /// values rather than latching the first. Returns the state record to
    /// publish when started.
    pub fn tick(&mut self, started: bool) -> Option<VehicleState>{
        self.pre_calibrating = !started;

        if started{
            Some(self.state)
        }else{
            self.pre_calibrate();
            None
        }
    }

    fn pre_calibrate(&mut self){
        self.offset.roll = self.state.roll;
        self.offset.pitch = self.state.pitch;
        self.offset.yaw = self.state.yaw;
        self.offset.depth = self.state.depth;
    }

    /// Offset for callers that opt into zeroed readings: the captured
    /// snapshot once pre-calibration has ended, zero while it is running.
    /// Call sites currently leave the subtraction disabled.
    pub fn offset(&self) -> CalibrationOffset{
        if self.pre_calibrating{
            CalibrationOffset::default()
        }else{
            self.offset
        }
    }

    pub fn state(&self) -> VehicleState{
        self.state
    }

    pub fn is_pre_calibrating(&self) -> bool{
        self.pre_calibrating
    }

    /// Sources that reported at least once but have been silent longer than
    /// the staleness window. Advisory: values are retained regardless.
    pub fn stale_sources(&self, now: f64) -> Vec<&'static str>{
        let mut stale = Vec::new();
        for source in ALL_SOURCES{
            if let Some(seen) = self.last_seen[source.index()]{
                if now - seen > self.stale_after{
                    stale.push(source.name());
                }
            }
        }
        stale
    }

    /// Log stale sources, if any, when the state is about to be published.
    pub fn warn_if_stale(&self, now: f64){
        let stale = self.stale_sources(now);
        if !stale.is_empty(){
            warn!(sources = ?stale, "publishing state with stale sensor data");
        }
    }

    fn touch(&mut self, source: SensorSource, now: f64){
        self.last_seen[source.index()] = Some(now);
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    fn aggregator() -> StateAggregator{
        StateAggregator::new(2.0)
    }

    #[test]
    fn test_partial_updates_are_disjoint(){
        let mut agg = aggregator();
        agg.set_attitude(Attitude{ roll: 1.5, pitch: -2.0 }, 0.0);
        agg.set_yaw(-88.0, 0.0);
        agg.set_depth(-0.4, 0.0);
        agg.set_position(OdometrySample{ x: 1.0, y: 2.0, z: 3.0 }, 0.0);

        let s = agg.state();
        assert_eq!(s.roll, 1.5);
        assert_eq!(s.pitch, -2.0);
        assert_eq!(s.yaw, -88.0);
        assert_eq!(s.depth, -0.4);
        assert_eq!((s.pos_x, s.pos_y, s.pos_z), (1.0, 2.0, 3.0));

        //a later depth update must not disturb the other fields
        agg.set_depth(-1.2, 1.0);
        let s = agg.state();
        assert_eq!(s.yaw, -88.0);
        assert_eq!(s.depth, -1.2);
    }

    #[test]
    fn test_offset_tracks_latest_not_first(){
        let mut agg = aggregator();

        agg.set_depth(-0.1, 0.0);
        agg.tick(false);
        agg.set_depth(-0.2, 1.0);
        agg.tick(false);
        agg.set_depth(-0.35, 2.0);
        agg.tick(false);

        //offset must equal the state at the last tick, not the first
        agg.tick(true);
        assert_eq!(agg.offset().depth, -0.35);
    }

    #[test]
    fn test_offset_hidden_while_pre_calibrating(){
        let mut agg = aggregator();
        agg.set_yaw(-90.0, 0.0);
        agg.tick(false);

        //mid-calibration the getter reports zero
        assert_eq!(agg.offset(), CalibrationOffset::default());

        agg.tick(true);
        assert_eq!(agg.offset().yaw, -90.0);
    }

    #[test]
    fn test_tick_publishes_only_when_started(){
        let mut agg = aggregator();
        agg.set_depth(-0.5, 0.0);

        assert_eq!(agg.tick(false), None);
        assert!(agg.is_pre_calibrating());

        let published = agg.tick(true).unwrap();
        assert_eq!(published.depth, -0.5);
        assert!(!agg.is_pre_calibrating());
    }

    #[test]
    fn test_stale_sources(){
        let mut agg = aggregator();
        agg.set_depth(-0.5, 0.0);
        agg.set_yaw(-88.0, 5.0);

        //depth last seen at t=0, window is 2s
        let stale = agg.stale_sources(5.5);
        assert_eq!(stale, vec!["depth"]);

        //never-seen sources are absence, not dropout
        assert!(!stale.contains(&"odometry"));
    }
}
