use bytes::{Buf, BufMut};

use crate::error::{FrameError, Result};

/// Wire size of every telemetry frame.
pub const TELEMETRY_SIZE: usize = 14;

const AUTONOMOUS_BIT: u8 = 0b0000_0001;

/// Packed status byte from the agent.
///
/// Bit 0 is the autonomous-mode flag; the remaining bits are reserved. The
/// raw byte is kept accessible so future flag bits survive a round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo(u8);

impl StatusInfo {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Whether the agent is steering itself (bit 0 set).
    pub fn is_autonomous(&self) -> bool {
        self.0 & AUTONOMOUS_BIT != 0
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

/// One telemetry sample, the agent's last reported state.
///
/// Wire format (all multi-byte fields little-endian):
/// ```text
/// ┌────────────────┬────────────┬─────────────┬────────────┬────────────┐
/// │ wind_direction │ wind_speed │ agent_speed │ agent_pos_x │ agent_pos_y │
/// │ (2B u16)       │ (2B u16)   │ (2B u16)    │ (2B i16)   │ (2B i16)   │
/// ├────────────────┼────────────┴─────────────┼────────────┴────────────┤
/// │ battery_status │ agent_direction           │ status_info             │
/// │ (1B u8)        │ (2B u16)                  │ (1B bitfield)           │
/// └────────────────┴───────────────────────────┴─────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Wind direction in degrees.
    pub wind_direction: u16,
    /// Wind speed in cm/s.
    pub wind_speed: u16,
    /// Agent speed over ground in cm/s.
    pub agent_speed: u16,
    /// Agent position, x axis.
    pub agent_pos_x: i16,
    /// Agent position, y axis.
    pub agent_pos_y: i16,
    /// Battery charge in percent.
    pub battery_status: u8,
    /// Agent heading in degrees.
    pub agent_direction: u16,
    /// Packed status flags.
    pub status_info: StatusInfo,
}

impl TelemetryFrame {
    /// Encode into the 14-byte wire format. Pure, total, inverse of
    /// [`TelemetryFrame::decode`].
    pub fn encode(&self) -> [u8; TELEMETRY_SIZE] {
        let mut frame = [0u8; TELEMETRY_SIZE];
        let mut buf = &mut frame[..];
        buf.put_u16_le(self.wind_direction);
        buf.put_u16_le(self.wind_speed);
        buf.put_u16_le(self.agent_speed);
        buf.put_i16_le(self.agent_pos_x);
        buf.put_i16_le(self.agent_pos_y);
        buf.put_u8(self.battery_status);
        buf.put_u16_le(self.agent_direction);
        buf.put_u8(self.status_info.raw());
        frame
    }

    /// Decode a telemetry frame.
    ///
    /// Fails with [`FrameError::LengthMismatch`] unless the input is exactly
    /// [`TELEMETRY_SIZE`] bytes; a wrong-length input never yields a partial
    /// frame. For 14-byte inputs decoding is total — every field occupies its
    /// full bit-width, so there are no invalid values to reject.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != TELEMETRY_SIZE {
            return Err(FrameError::LengthMismatch {
                len: bytes.len(),
                expected: TELEMETRY_SIZE,
            });
        }

        let mut buf = bytes;
        Ok(Self {
            wind_direction: buf.get_u16_le(),
            wind_speed: buf.get_u16_le(),
            agent_speed: buf.get_u16_le(),
            agent_pos_x: buf.get_i16_le(),
            agent_pos_y: buf.get_i16_le(),
            battery_status: buf.get_u8(),
            agent_direction: buf.get_u16_le(),
            status_info: StatusInfo::new(buf.get_u8()),
        })
    }
}
