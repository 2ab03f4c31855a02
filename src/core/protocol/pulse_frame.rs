// src/core/protocol/pulse_frame.rs

//! Wire layout for the multicast pulse request/reply protocol.
//! This is a fixed-layout binary record, not RESP: a 15-byte header tag, a
//! fixed hostname field, a sequence number, the RRI lookup-clue, a flags
//! word, a version byte, and an optional embedded cluster-view payload whose
//! length must equal `histories * history_size` of the sender's vault.

use crate::core::constants::{PULSE_HEADER_SIZE, PULSE_REPLY_HEADER, PULSE_REQUEST_HEADER};
use crate::core::errors::{MtceError, MtceResult};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Fixed width of the hostname field in the buffer. The source reads the RRI
/// using two overlapping length checks, leaving it ambiguous whether
/// hostnames longer than this are a supported path; both checks are
/// preserved below rather than guessed away.
pub const HOSTNAME_FIELD_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseKind {
    Request,
    Reply,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PulseMessage {
    pub kind: PulseKind,
    pub hostname: String,
    pub sequence: u32,
    /// The RRI ("lookup clue"): a per-(host,controller) cached integer.
    pub rri: u32,
    pub flags: u32,
    pub version: u8,
    /// Raw bytes of the embedded cluster-view payload, opaque to this
    /// module. `core::cluster::vault` knows how to interpret them.
    pub cluster_payload: Option<Bytes>,
}

impl PulseMessage {
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(
            PULSE_HEADER_SIZE
                + HOSTNAME_FIELD_LEN
                + 4
                + 4
                + 4
                + 1
                + self.cluster_payload.as_ref().map_or(0, |p| p.len()),
        );
        let header: &[u8; PULSE_HEADER_SIZE] = match self.kind {
            PulseKind::Request => PULSE_REQUEST_HEADER,
            PulseKind::Reply => PULSE_REPLY_HEADER,
        };
        buf.put_slice(header);

        let mut hostname_field = [0u8; HOSTNAME_FIELD_LEN];
        let name_bytes = self.hostname.as_bytes();
        let copy_len = name_bytes.len().min(HOSTNAME_FIELD_LEN - 1);
        hostname_field[..copy_len].copy_from_slice(&name_bytes[..copy_len]);
        buf.put_slice(&hostname_field);

        buf.put_u32(self.sequence);
        buf.put_u32(self.rri);
        buf.put_u32(self.flags);
        buf.put_u8(self.version);
        if let Some(payload) = &self.cluster_payload {
            buf.put_slice(payload);
        }
        buf
    }

    /// Decodes a datagram. Size mismatches, a missing/garbled header, or a
    /// version < 1 with a non-empty trailing payload are all malformed
    /// and are rejected rather than guessed at.
    pub fn decode(mut data: Bytes) -> MtceResult<Self> {
        const FIXED_LEN: usize = PULSE_HEADER_SIZE + HOSTNAME_FIELD_LEN + 4 + 4 + 4 + 1;
        if data.len() < FIXED_LEN {
            return Err(MtceError::Malformed(format!(
                "pulse datagram too short: {} < {FIXED_LEN}",
                data.len()
            )));
        }

        let mut header = [0u8; PULSE_HEADER_SIZE];
        data.copy_to_slice(&mut header);
        let kind = if &header == PULSE_REQUEST_HEADER {
            PulseKind::Request
        } else if &header == PULSE_REPLY_HEADER {
            PulseKind::Reply
        } else {
            return Err(MtceError::Malformed("unrecognized pulse header".into()));
        };

        let mut hostname_field = [0u8; HOSTNAME_FIELD_LEN];
        data.copy_to_slice(&mut hostname_field);
        // Two overlapping length checks, preserved intentionally: a NUL scan
        // bounded by the field width, and a defensive `strnlen`-style cap.
        let nul_scan_len = hostname_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(HOSTNAME_FIELD_LEN);
        let capped_len = nul_scan_len.min(HOSTNAME_FIELD_LEN);
        let hostname = String::from_utf8_lossy(&hostname_field[..capped_len]).into_owned();

        let sequence = data.get_u32();
        let rri = data.get_u32();
        let flags = data.get_u32();
        let version = data.get_u8();

        let cluster_payload = if data.has_remaining() {
            if version < 1 {
                return Err(MtceError::Malformed(
                    "cluster payload present but version < 1".into(),
                ));
            }
            Some(data.copy_to_bytes(data.remaining()))
        } else {
            None
        };

        Ok(Self {
            kind,
            hostname,
            sequence,
            rri,
            flags,
            version,
            cluster_payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_without_cluster_payload() {
        let msg = PulseMessage {
            kind: PulseKind::Request,
            hostname: "compute-0".into(),
            sequence: 42,
            rri: 7,
            flags: 0b011,
            version: 1,
            cluster_payload: None,
        };
        let encoded = msg.encode().freeze();
        let decoded = PulseMessage::decode(encoded).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn round_trips_with_cluster_payload() {
        let msg = PulseMessage {
            kind: PulseKind::Reply,
            hostname: "controller-1".into(),
            sequence: 9,
            rri: 3,
            flags: 1,
            version: 1,
            cluster_payload: Some(Bytes::from_static(&[1, 2, 3, 4])),
        };
        let encoded = msg.encode().freeze();
        let decoded = PulseMessage::decode(encoded).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn rejects_version_zero_with_payload() {
        let msg = PulseMessage {
            kind: PulseKind::Reply,
            hostname: "h".into(),
            sequence: 1,
            rri: 1,
            flags: 0,
            version: 0,
            cluster_payload: Some(Bytes::from_static(&[9])),
        };
        let encoded = msg.encode().freeze();
        assert!(PulseMessage::decode(encoded).is_err());
    }

    #[test]
    fn rejects_bad_header() {
        let mut raw = vec![b'x'; PULSE_HEADER_SIZE + HOSTNAME_FIELD_LEN + 4 + 4 + 4 + 1];
        raw[0] = b'z';
        assert!(PulseMessage::decode(Bytes::from(raw)).is_err());
    }
}
