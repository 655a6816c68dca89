use crate::media::{MediaFrame, MediaKind};
use bytes::{Bytes, BytesMut};
use webrtc::rtp::packet::Packet;

/// Groups the packets of one remote track into frames.
///
/// Video payloads are collected until the marker bit closes the frame. A
/// timestamp change without a marker means the tail of the previous frame
/// was lost, so the partial frame is dropped. Every audio packet is a frame.
pub struct FrameAssembler {
    kind: MediaKind,
    buffer: BytesMut,
    timestamp: Option<u32>,
    dropped: u64,
}

impl FrameAssembler {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            buffer: BytesMut::new(),
            timestamp: None,
            dropped: 0,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Number of partial video frames discarded so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn push(&mut self, packet: &Packet) -> Option<MediaFrame> {
        if packet.payload.is_empty() {
            return None;
        }

        let header = &packet.header;

        if self.kind == MediaKind::Audio {
            return Some(MediaFrame {
                kind: self.kind,
                payload_type: header.payload_type,
                timestamp: header.timestamp,
                data: packet.payload.clone(),
            });
        }

        if self.timestamp.is_some_and(|ts| ts != header.timestamp) {
            self.buffer.clear();
            self.dropped += 1;
        }

        self.timestamp = Some(header.timestamp);
        self.buffer.extend_from_slice(&packet.payload);

        if !header.marker {
            return None;
        }

        self.timestamp = None;
        let data: Bytes = self.buffer.split().freeze();

        Some(MediaFrame {
            kind: self.kind,
            payload_type: header.payload_type,
            timestamp: header.timestamp,
            data,
        })
    }
}
