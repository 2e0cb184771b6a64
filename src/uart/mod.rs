pub mod protocol;
pub use protocol::*;

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use thiserror::Error;
use tracing::warn;

use crate::msg::PwmActuator;
use crate::pilot::InboundChannels;

pub const SYNC_BYTE: u8 = 0xAA;
pub const MAX_FRAME_SIZE: usize = 244;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType{
    Start = 0x01,
    Dive = 0x02,
    Depth = 0x03,
    Heading = 0x04,
    Imu = 0x05,
    FilterYaw = 0x06,
    Error = 0x07,
    Pwm = 0x10,
}

impl MsgType{
    fn from_u8(val: u8) -> Option<Self>{
        match val{
            0x01 => Some(MsgType::Start),
            0x02 => Some(MsgType::Dive),
            0x03 => Some(MsgType::Depth),
            0x04 => Some(MsgType::Heading),
            0x05 => Some(MsgType::Imu),
            0x06 => Some(MsgType::FilterYaw),
            0x07 => Some(MsgType::Error),
            0x10 => Some(MsgType::Pwm),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError{
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("serial io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn checksum(data: &[u8]) -> u8{
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

//frame layout: sync, type, len, payload, checksum over type+len+payload
pub fn encode_frame(msg_type: MsgType, payload: &[u8]) -> Vec<u8>{
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.push(SYNC_BYTE);
    frame.push(msg_type as u8);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame.push(checksum(&frame[1..]));
    frame
}

//scan the rx buffer for one complete frame; corrupt bytes are skipped by
//resyncing on the next sync byte, never fatal
pub fn try_parse_frame(buffer: &mut Vec<u8>) -> Option<(MsgType, Vec<u8>)>{
    if buffer.len() < 4{
        return None;
    }

    let sync_pos = buffer.iter().position(|&b| b == SYNC_BYTE)?;
    if sync_pos > 0{
        buffer.drain(0..sync_pos);
    }

    if buffer.len() < 4{
        return None;
    }

    let msg_type_byte = buffer[1];
    let len = buffer[2] as usize;

    if len > MAX_FRAME_SIZE{
        buffer.remove(0);
        return None;
    }

    let frame_len = 4 + len;
    if buffer.len() < frame_len{
        return None;
    }

    let expected = buffer[3 + len];
    let calculated = checksum(&buffer[1..3 + len]);

    if expected != calculated{
        warn!("dropping frame with bad checksum");
        buffer.remove(0);
        return None;
    }

    let Some(msg_type) = MsgType::from_u8(msg_type_byte) else{
        buffer.drain(0..frame_len);
        return None;
    };

    let payload = buffer[3..3 + len].to_vec();
    buffer.drain(0..frame_len);

    Some((msg_type, payload))
}

/// Route one decoded frame into the pilot's inbound channels, widening the
/// wire floats to the f64 domain types.
pub fn dispatch_frame(msg_type: MsgType, payload: &[u8], inbound: &mut InboundChannels){
    match msg_type{
        MsgType::Start =>{
            if let Some(frame) = StartFrame::from_bytes(payload){
                inbound.start.publish(frame.active != 0);
            }
        }
        MsgType::Dive =>{
            if let Some(frame) = DiveFrame::from_bytes(payload){
                inbound.dive.publish(frame.active != 0);
            }
        }
        MsgType::Depth =>{
            if let Some(frame) = DepthFrame::from_bytes(payload){
                inbound.depth.publish(frame.to_sample());
            }
        }
        MsgType::Heading =>{
            if let Some(frame) = HeadingFrame::from_bytes(payload){
                inbound.heading.publish(frame.to_sample());
            }
        }
        MsgType::Imu =>{
            if let Some(frame) = ImuFrame::from_bytes(payload){
                inbound.imu.publish(frame.to_sample());
            }
        }
        MsgType::FilterYaw =>{
            if let Some(frame) = FilterYawFrame::from_bytes(payload){
                let yaw = frame.yaw;
                inbound.filtered_yaw.publish(f64::from(yaw));
            }
        }
        MsgType::Error =>{
            if let Some(frame) = ErrorFrame::from_bytes(payload){
                inbound.error.publish(frame.to_residual());
            }
        }
        //outbound-only type, nothing to do on receive
        MsgType::Pwm => {}
    }
}

/// Serial bridge to the actuation bus: decodes inbound sensor/heartbeat
/// frames into the pilot's channels and writes PWM command frames out.
pub struct UartBridge{
    port: Box<dyn SerialPort>,
    rx_buffer: Vec<u8>,
}

impl UartBridge{
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, BridgeError>{
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;

        Ok(UartBridge{
            port,
            rx_buffer: Vec::with_capacity(512),
        })
    }

    /// Read whatever is pending and dispatch every complete frame. Returns
    /// after the port read times out, which paces the caller's loop.
    pub fn poll(&mut self, inbound: &mut InboundChannels) -> Result<(), BridgeError>{
        let mut read_buf = [0u8; 256];

        match self.port.read(&mut read_buf){
            Ok(n) if n > 0 =>{
                self.rx_buffer.extend_from_slice(&read_buf[..n]);
            }
            Ok(_) => {}
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e.into()),
        }

        while let Some((msg_type, payload)) = try_parse_frame(&mut self.rx_buffer){
            dispatch_frame(msg_type, &payload, inbound);
        }
        Ok(())
    }

    pub fn send_pwm(&mut self, cmd: &PwmActuator) -> Result<(), BridgeError>{
        let frame = encode_frame(MsgType::Pwm, &PwmFrame::new(cmd).to_bytes());
        self.port.write_all(&frame)?;
        self.port.flush()?;
        Ok(())
    }
}
