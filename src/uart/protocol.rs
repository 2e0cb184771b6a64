use nalgebra::{Matrix3, Quaternion, Vector3};

use crate::msg::{DepthSample, ErrorResidual, HeadingSample, ImuSample, PwmActuator};

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct StartFrame{
    pub active: u8,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DiveFrame{
    pub active: u8,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DepthFrame{
    pub depth: f32,       //meters
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingFrame{
    pub yaw: f32,         //degrees
    pub mag: [f32; 3],    //µT
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterYawFrame{
    pub yaw: f32,         //degrees
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug)]
pub struct ImuFrame{
    pub quat: [f32; 4],                   //x, y, z, w
    pub orientation_cov: [f32; 9],        //row major
    pub angular_velocity_cov: [f32; 9],
    pub linear_acceleration_cov: [f32; 9],
}

impl Default for ImuFrame{
    fn default() -> Self{
        ImuFrame{
            quat: [0.0, 0.0, 0.0, 1.0],
            orientation_cov: [0.0; 9],
            angular_velocity_cov: [0.0; 9],
            linear_acceleration_cov: [0.0; 9],
        }
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorFrame{
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub depth: f32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PwmFrame{
    pub pwm: [i32; 10],   //1100-1900 µs, 1500 neutral
}

//frame sizes
pub const START_FRAME_SIZE: usize = 1;
pub const DIVE_FRAME_SIZE: usize = 1;
pub const DEPTH_FRAME_SIZE: usize = 4;
pub const HEADING_FRAME_SIZE: usize = 16;   //4 * f32
pub const FILTER_YAW_FRAME_SIZE: usize = 4;
pub const IMU_FRAME_SIZE: usize = 124;      //31 * f32
pub const ERROR_FRAME_SIZE: usize = 16;     //4 * f32
pub const PWM_FRAME_SIZE: usize = 40;       //10 * i32

macro_rules! frame_codec{
    ($frame:ty, $size:expr) => {
        impl $frame{
            pub fn from_bytes(data: &[u8]) -> Option<Self>{
                if data.len() < $size{
                    return None;
                }
                unsafe{
                    Some(std::ptr::read_unaligned(data.as_ptr() as *const Self))
                }
            }

            pub fn to_bytes(&self) -> Vec<u8>{
                let mut bytes = vec![0u8; $size];
                unsafe{
                    std::ptr::copy_nonoverlapping(
                        self as *const Self as *const u8,
                        bytes.as_mut_ptr(),
                        $size
                    );
                }
                bytes
            }
        }
    };
}

frame_codec!(StartFrame, START_FRAME_SIZE);
frame_codec!(DiveFrame, DIVE_FRAME_SIZE);
frame_codec!(DepthFrame, DEPTH_FRAME_SIZE);
frame_codec!(HeadingFrame, HEADING_FRAME_SIZE);
frame_codec!(FilterYawFrame, FILTER_YAW_FRAME_SIZE);
frame_codec!(ImuFrame, IMU_FRAME_SIZE);
frame_codec!(ErrorFrame, ERROR_FRAME_SIZE);
frame_codec!(PwmFrame, PWM_FRAME_SIZE);

fn widen_matrix(values: &[f32; 9]) -> Matrix3<f64>{
    Matrix3::from_row_slice(&values.map(f64::from))
}

impl ImuFrame{
    pub fn to_sample(&self) -> ImuSample{
        let quat = self.quat; //copy to avoid unaligned access
        let orientation_cov = self.orientation_cov;
        let angular_velocity_cov = self.angular_velocity_cov;
        let linear_acceleration_cov = self.linear_acceleration_cov;
        ImuSample{
            orientation: Quaternion::new(
                f64::from(quat[3]),
                f64::from(quat[0]),
                f64::from(quat[1]),
                f64::from(quat[2]),
            ),
            orientation_cov: widen_matrix(&orientation_cov),
            angular_velocity_cov: widen_matrix(&angular_velocity_cov),
            linear_acceleration_cov: widen_matrix(&linear_acceleration_cov),
        }
    }
}

impl HeadingFrame{
    pub fn to_sample(&self) -> HeadingSample{
        let yaw = self.yaw;
        let mag = self.mag;
        HeadingSample{
            yaw: f64::from(yaw),
            mag: Vector3::new(f64::from(mag[0]), f64::from(mag[1]), f64::from(mag[2])),
        }
    }
}

impl DepthFrame{
    pub fn to_sample(&self) -> DepthSample{
        let depth = self.depth;
        DepthSample{ depth: f64::from(depth) }
    }
}

impl ErrorFrame{
    pub fn to_residual(&self) -> ErrorResidual{
        let (roll, pitch, yaw, depth) = (self.roll, self.pitch, self.yaw, self.depth);
        ErrorResidual{
            roll: f64::from(roll),
            pitch: f64::from(pitch),
            yaw: f64::from(yaw),
            depth: f64::from(depth),
        }
    }
}

impl PwmFrame{
    pub fn new(cmd: &PwmActuator) -> Self{
        PwmFrame{ pwm: cmd.pwm }
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_pwm_frame_round_trip(){
        let frame = PwmFrame{ pwm: [1500, 1600, 1400, 1550, 1450, 1500, 1510, 1490, 1500, 1500] };
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), PWM_FRAME_SIZE);

        let decoded = PwmFrame::from_bytes(&bytes).unwrap();
        let pwm = decoded.pwm; //copy to avoid unaligned access
        assert_eq!(pwm[1], 1600);
        assert_eq!(pwm[2], 1400);
        assert_eq!(pwm[9], 1500);
    }

    #[test]
    fn test_frame_sizes(){
        assert_eq!(std::mem::size_of::<ImuFrame>(), IMU_FRAME_SIZE);
        assert_eq!(std::mem::size_of::<HeadingFrame>(), HEADING_FRAME_SIZE);
        assert_eq!(std::mem::size_of::<ErrorFrame>(), ERROR_FRAME_SIZE);
        assert_eq!(std::mem::size_of::<PwmFrame>(), PWM_FRAME_SIZE);
    }

    #[test]
    fn test_imu_frame_to_sample(){
        let mut cov = [0.0f32; 9];
        cov[8] = 0.25; //element (2,2)
        let frame = ImuFrame{ angular_velocity_cov: cov, ..Default::default() };
        let sample = frame.to_sample();

        assert_eq!(sample.orientation.w, 1.0);
        assert_eq!(sample.angular_velocity_cov[(2, 2)], 0.25);
    }

    #[test]
    fn test_truncated_frame_rejected(){
        let frame = HeadingFrame{ yaw: -88.0, mag: [0.1, 0.2, 0.3] };
        let bytes = frame.to_bytes();
        assert!(HeadingFrame::from_bytes(&bytes[..8]).is_none());
    }
}
