//! Wire format for torque estimates.
//!
//! One estimate is the IEEE-754 `f32` joint torque in little-endian byte
//! order, four bytes, nothing else: no header, no length, no checksum. A
//! reader that starts mid-stream has no way to resynchronise, so consumers
//! must open the stream before the estimator starts emitting.

/// Bytes per encoded estimate.
pub const FRAME_LEN: usize = 4;

/// Encode one torque value.
///
/// ```
/// use exotorque_core::wire::{decode_torque, encode_torque};
///
/// let bytes = encode_torque(-12.5);
/// assert_eq!(bytes, (-12.5_f32).to_le_bytes());
/// assert_eq!(decode_torque(bytes), -12.5);
/// ```
#[inline]
pub fn encode_torque(torque_nm: f32) -> [u8; FRAME_LEN] {
    torque_nm.to_le_bytes()
}

#[inline]
pub fn decode_torque(bytes: [u8; FRAME_LEN]) -> f32 {
    f32::from_le_bytes(bytes)
}

/// Incremental decoder for a torque byte stream.
///
/// Reads from a serial port arrive in arbitrary chunks; partial frames are
/// held until the remaining bytes show up.
#[derive(Debug, Clone, Default)]
pub struct TorqueFrameDecoder {
    pending: [u8; FRAME_LEN],
    len: usize,
}

impl TorqueFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns a value when it completes a frame.
    pub fn push_byte(&mut self, byte: u8) -> Option<f32> {
        if let Some(slot) = self.pending.get_mut(self.len) {
            *slot = byte;
            self.len += 1;
        }
        if self.len == FRAME_LEN {
            self.len = 0;
            Some(decode_torque(self.pending))
        } else {
            None
        }
    }

    /// Feed a chunk and append every completed value to `out`.
    ///
    /// Returns how many values were appended.
    pub fn push(&mut self, bytes: &[u8], out: &mut Vec<f32>) -> usize {
        let before = out.len();
        out.extend(bytes.iter().filter_map(|&b| self.push_byte(b)));
        out.len() - before
    }

    /// Bytes of an incomplete frame currently held.
    pub fn pending_len(&self) -> usize {
        self.len
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

/// Decode a complete buffer. Trailing bytes that do not fill a frame are
/// ignored.
pub fn decode_all(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(FRAME_LEN)
        .filter_map(|chunk| <[u8; FRAME_LEN]>::try_from(chunk).ok())
        .map(decode_torque)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        // 1.0f32 = 0x3F80_0000
        assert_eq!(encode_torque(1.0), [0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_decoder_handles_split_frames() {
        let mut stream = Vec::new();
        for value in [1.5_f32, -101.35, 0.0] {
            stream.extend_from_slice(&encode_torque(value));
        }

        let mut decoder = TorqueFrameDecoder::new();
        let mut out = Vec::new();
        let (first, rest) = stream.split_at(3);
        let (second, third) = rest.split_at(6);

        assert_eq!(decoder.push(first, &mut out), 0);
        assert_eq!(decoder.pending_len(), 3);
        assert_eq!(decoder.push(second, &mut out), 2);
        assert_eq!(decoder.push(third, &mut out), 1);
        assert_eq!(out, vec![1.5, -101.35, 0.0]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decode_all_ignores_trailing_bytes() {
        let mut stream = encode_torque(2.0).to_vec();
        stream.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode_all(&stream), vec![2.0]);
    }

    #[test]
    fn test_reset_drops_partial_frame() {
        let mut decoder = TorqueFrameDecoder::new();
        decoder.push_byte(0x01);
        decoder.reset();
        assert_eq!(decoder.pending_len(), 0);

        let mut out = Vec::new();
        decoder.push(&encode_torque(-3.0), &mut out);
        assert_eq!(out, vec![-3.0]);
    }
}
