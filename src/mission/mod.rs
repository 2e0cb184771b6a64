/**
 * Mission sequencer
 *
 * Timed state machine gating when control begins. It advances only on
 * receipt of the external periodic start signal; there is no internal
 * timer, so a stalled heartbeat freezes boot time and state with it.
 *
 * IDLE -> CALIBRATING on the first observed start=true (records start
 * time), CALIBRATING -> RUNNING once boot time reaches the configured
 * delay, RUNNING -> STOPPED once boot time reaches delay + duration
 * (negative duration means unbounded). A start=false event resets the
 * machine to IDLE; the next start=true re-enters CALIBRATING with a fresh
 * clock.
 */

use tracing::info;

use crate::msg::Setpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionState{
    Idle,
    Calibrating,
    Running,
    Stopped,
}

impl MissionState{
    pub fn label(self) -> &'static str{
        match self{
            Self::Idle => "IDLE",
            Self::Calibrating => "CALIBRATING",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
        }
    }
}

/// Emissions produced by one start-signal tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MissionTick{
    pub started: bool,
    pub set_point: Option<Setpoint>,
    pub thrust_cap: Option<i32>,
}

//fixed schedule, window bounds in seconds relative to the calibration delay
const HEADING_SCHEDULE: [(f64, Option<f64>, f64); 3] = [
    (6.0, Some(16.0), -88.0),
    (17.0, Some(22.0), -168.0),
    (23.0, None, -88.0),
];

const CAP_SCHEDULE: [(f64, Option<f64>, i32); 11] = [
    (6.0, Some(7.0), 1500),
    (7.0, Some(8.0), 1490),
    (8.0, Some(9.0), 1480),
    (9.0, Some(10.0), 1470),
    (10.0, Some(11.0), 1460),
    (11.0, Some(12.0), 1450),
    (12.0, Some(13.0), 1440),
    (13.0, Some(14.0), 1430),
    (14.0, Some(15.0), 1420),
    (15.0, Some(16.0), 1410),
    (16.0, None, 1400),
];

pub struct MissionSequencer{
    state: MissionState,
    delay: f64,
    duration: f64, //negative = unbounded
    start_time: f64,
    boot_time: f64,
    set_point: Setpoint,
    dive: bool,
}

impl MissionSequencer{
    pub fn new(delay: f64, duration: f64) -> Self{
        MissionSequencer{
            state: MissionState::Idle,
            delay,
            duration,
            start_time: 0.0,
            boot_time: 0.0,
            set_point: Setpoint::default(),
            dive: false,
        }
    }

    /// Process one start-signal event. Returns the emissions for this tick,
    /// or None when the signal is false (nothing is published downstream;
    /// the machine resets to IDLE).
    pub fn on_start_signal(&mut self, active: bool, now: f64) -> Option<MissionTick>{
        if !active{
            if self.state != MissionState::Idle{
                self.transition(MissionState::Idle);
                self.start_time = 0.0;
                self.boot_time = 0.0;
            }
            return None;
        }

        if self.state == MissionState::Idle{
            self.start_time = now;
            self.transition(MissionState::Calibrating);
        }
        self.boot_time = now - self.start_time;

        if self.boot_time < self.delay{
            //downstream consumers treat "not started" as keep-calibrating
            info!(boot_time = self.boot_time, "starting...");
            return Some(MissionTick{ started: false, ..Default::default() });
        }

        let within_duration = self.duration < 0.0 || self.boot_time < self.delay + self.duration;
        if !within_duration{
            if self.state != MissionState::Stopped{
                info!("stop");
                self.transition(MissionState::Stopped);
            }
            return Some(MissionTick{ started: false, ..Default::default() });
        }

        if self.state != MissionState::Running{
            self.transition(MissionState::Running);
        }

        //publish the set point as it stands, then let the schedule mutate
        //it; a window's heading shows up in the next tick's publish
        let published = self.set_point;
        let mut cap = None;

        if !self.dive{
            for (start, end, heading) in HEADING_SCHEDULE{
                if self.is_in_range(start, end){
                    self.set_heading(heading);
                }
            }
            for (start, end, value) in CAP_SCHEDULE{
                if self.is_in_range(start, end){
                    cap = Some(value);
                }
            }
        }

        Some(MissionTick{
            started: true,
            set_point: Some(published),
            thrust_cap: cap,
        })
    }

    //window test relative to the calibration delay, exclusive on both ends
    fn is_in_range(&self, start: f64, end: Option<f64>) -> bool{
        match end{
            None => self.boot_time > start + self.delay,
            Some(end) =>{
                start + self.delay < self.boot_time && self.boot_time < end + self.delay
            }
        }
    }

    pub fn set_heading(&mut self, heading: f64){
        if self.set_point.yaw != heading{
            info!(heading, "set heading");
        }
        self.set_point.yaw = heading;
    }

    pub fn set_depth(&mut self, depth: f64){
        info!(depth, "set depth");
        self.set_point.depth = depth;
    }

    pub fn set_dive(&mut self, dive: bool){
        self.dive = dive;
    }

    pub fn state(&self) -> MissionState{
        self.state
    }

    pub fn is_started(&self) -> bool{
        self.state == MissionState::Running
    }

    pub fn boot_time(&self) -> f64{
        self.boot_time
    }

    fn transition(&mut self, next: MissionState){
        info!(prev = self.state.label(), state = next.label(), "mission transition");
        self.state = next;
    }
}
