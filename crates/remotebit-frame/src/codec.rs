use bytes::{BufMut, Bytes, BytesMut};

/// Frame header: component (1) + id (1) = 2 bytes.
pub const HEADER_SIZE: usize = 2;

/// A received or outgoing frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Component tag (logical channel).
    pub component: u8,
    /// Instance id within the component.
    pub id: u8,
    /// Everything after the header.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(component: u8, id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            component,
            id,
            payload: payload.into(),
        }
    }

    /// Split raw link bytes into header and payload.
    ///
    /// Returns `None` for writes shorter than the header; such frames carry
    /// no routing information and are dropped.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        Some(Self::new(
            bytes[0],
            bytes[1],
            Bytes::copy_from_slice(&bytes[HEADER_SIZE..]),
        ))
    }

    /// The wire encoding of this frame.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_buffer(self.component, self.id, &self.payload, &mut dst);
        dst.freeze()
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Payload read as little-endian 16-bit values.
    pub fn values(&self) -> Vec<u16> {
        decode_values(&self.payload)
    }

    /// Payload as handed to buffer handlers.
    ///
    /// This is frame bytes `2..len-2`: the final two payload bytes are cut
    /// off along with the header, unlike [`Frame::values`] which reads the
    /// whole payload. Payloads of two bytes or fewer yield an empty buffer.
    pub fn truncated_buffer(&self) -> Bytes {
        let end = self.payload.len().saturating_sub(2);
        self.payload.slice(..end)
    }
}

/// Encode a values frame.
///
/// Wire format:
/// ```text
/// ┌───────────┬────────┬──────────────┬──────────────┬─────┐
/// │ Component │ Id     │ v0 (2B LE)   │ v1 (2B LE)   │ ... │
/// │ (1B)      │ (1B)   │ lo, hi       │ lo, hi       │     │
/// └───────────┴────────┴──────────────┴──────────────┴─────┘
/// ```
///
/// Each value contributes its low 16 bits; anything above wraps silently.
pub fn encode_values(component: u8, id: u8, values: &[u32], dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + values.len() * 2);
    dst.put_u8(component);
    dst.put_u8(id);
    for &value in values {
        dst.put_u8((value & 0xff) as u8);
        dst.put_u8(((value >> 8) & 0xff) as u8);
    }
}

/// Encode a raw-bytes frame. The payload is copied verbatim.
pub fn encode_buffer(component: u8, id: u8, bytes: &[u8], dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + bytes.len());
    dst.put_u8(component);
    dst.put_u8(id);
    dst.put_slice(bytes);
}

/// Decode a payload into 16-bit values.
///
/// Bytes are consumed in little-endian pairs. A trailing unpaired byte is
/// read as a value whose high byte is 0.
pub fn decode_values(payload: &[u8]) -> Vec<u16> {
    payload
        .chunks(2)
        .map(|pair| {
            let low = u16::from(pair[0]);
            let high = pair.get(1).copied().map_or(0, u16::from);
            (high << 8) | low
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_frame(component: u8, id: u8, values: &[u32]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_values(component, id, values, &mut buf);
        buf
    }

    #[test]
    fn test_encode_values_layout() {
        let buf = values_frame(100, 3, &[300, 65535]);
        assert_eq!(buf.as_ref(), &[100, 3, 0x2c, 0x01, 0xff, 0xff]);
    }

    #[test]
    fn test_values_roundtrip() {
        let buf = values_frame(101, 15, &[300, 65535]);
        let frame = Frame::parse(&buf).unwrap();
        assert_eq!(frame.component, 101);
        assert_eq!(frame.id, 15);
        assert_eq!(frame.values(), vec![300, 65535]);
    }

    #[test]
    fn test_values_roundtrip_every_key() {
        let values = [0u32, 1, 255, 256, 300, 4660, 32768, 65534, 65535];
        for component in 0..=u8::MAX {
            for id in 0..=15u8 {
                let buf = values_frame(component, id, &values);
                let frame = Frame::parse(&buf).unwrap();
                assert_eq!((frame.component, frame.id), (component, id));
                let decoded: Vec<u32> = frame.values().into_iter().map(u32::from).collect();
                assert_eq!(decoded, values, "component {component} id {id}");
            }
        }
    }

    #[test]
    fn test_value_256_splits_into_low_and_high() {
        let buf = values_frame(100, 0, &[256]);
        assert_eq!(&buf[HEADER_SIZE..], &[0, 1]);
    }

    #[test]
    fn test_out_of_range_value_wraps() {
        let buf = values_frame(100, 0, &[65536 + 5]);
        assert_eq!(&buf[HEADER_SIZE..], &[5, 0]);
    }

    #[test]
    fn test_trailing_low_byte_defaults_high_to_zero() {
        assert_eq!(decode_values(&[0x2c, 0x01, 0x07]), vec![300, 7]);
        assert!(decode_values(&[]).is_empty());
    }

    #[test]
    fn test_encode_buffer_is_verbatim() {
        let mut buf = BytesMut::new();
        encode_buffer(101, 2, &[9, 8, 7], &mut buf);
        assert_eq!(buf.as_ref(), &[101, 2, 9, 8, 7]);
    }

    #[test]
    fn test_parse_rejects_short_frames() {
        assert!(Frame::parse(&[]).is_none());
        assert!(Frame::parse(&[100]).is_none());
        let header_only = Frame::parse(&[100, 1]).unwrap();
        assert!(header_only.payload.is_empty());
        assert!(header_only.values().is_empty());
    }

    #[test]
    fn test_truncated_buffer_cuts_last_two_bytes() {
        let frame = Frame::parse(&[100, 1, 10, 20, 30, 40, 50]).unwrap();
        assert_eq!(frame.truncated_buffer().as_ref(), &[10, 20, 30]);
    }

    #[test]
    fn test_truncated_buffer_empty_for_short_payloads() {
        for bytes in [&[100u8, 1][..], &[100, 1, 10], &[100, 1, 10, 20]] {
            let frame = Frame::parse(bytes).unwrap();
            assert!(frame.truncated_buffer().is_empty());
        }
    }

    #[test]
    fn test_to_bytes_matches_wire() {
        let frame = Frame::new(100, 4, vec![1u8, 2, 3]);
        assert_eq!(frame.wire_size(), HEADER_SIZE + 3);
        assert_eq!(frame.to_bytes().as_ref(), &[100, 4, 1, 2, 3]);
    }
}
