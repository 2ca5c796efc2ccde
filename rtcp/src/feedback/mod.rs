#[cfg(test)]
mod feedback_test;

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::buffer::align_to_4;
use util::marshal::{Marshal, MarshalSize, Unmarshal};
use util::Span;

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

pub(crate) const SENDER_SSRC_OFFSET: usize = HEADER_LENGTH;
pub(crate) const MEDIA_SSRC_OFFSET: usize = SENDER_SSRC_OFFSET + SSRC_LENGTH;
/// Common header plus the two SSRCs every feedback message starts with.
pub const FEEDBACK_HEADER_LENGTH: usize = MEDIA_SSRC_OFFSET + SSRC_LENGTH;

/// A transport layer or payload specific feedback message (RFC 4585 6.1).
///
/// The FMT field takes the place of the count and selects the message type.
pub trait FeedbackPacket: RtcpPacket {
    fn message_type(&self) -> u8;

    /// SSRC of the packet sender.
    fn sender_ssrc(&self) -> u32;
    fn set_sender_ssrc(&mut self, ssrc: u32);

    /// SSRC of the media source the feedback is about.
    fn media_ssrc(&self) -> u32;
    fn set_media_ssrc(&mut self, ssrc: u32);
}

/// Validates the feedback header of a whole packet view and returns the
/// padding count.
pub(crate) fn parse_feedback(
    view: &[u8],
    packet_type: PacketType,
    format: u8,
) -> std::result::Result<u8, Error> {
    let (header, padding) = parse_common(view, Some(packet_type))?;
    if view.len() - (padding as usize) < FEEDBACK_HEADER_LENGTH {
        return Err(Error::PacketTooShort);
    }
    if header.count != format {
        return Err(Error::WrongFeedbackType);
    }
    Ok(padding)
}

/// A feedback message without a dedicated decoder, such as application layer
/// feedback. The FCI is kept as opaque bytes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawFeedbackPacket {
    view: BytesMut,
    fci: Span,
    padding: u8,
    dirty: bool,
}

impl Default for RawFeedbackPacket {
    fn default() -> Self {
        RawFeedbackPacket::new(PacketType::PayloadSpecificFeedback, FORMAT_AFB)
    }
}

impl fmt::Display for RawFeedbackPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawFeedbackPacket {} FMT {} from {:x} about {:x}: {:?}",
            self.packet_type(),
            self.raw_message_type(),
            self.sender_ssrc(),
            self.media_ssrc(),
            self.fci()
        )
    }
}

impl RawFeedbackPacket {
    /// An empty message of the given feedback packet type and FMT.
    pub fn new(packet_type: PacketType, format: u8) -> Self {
        RawFeedbackPacket {
            view: empty_view(packet_type, format, FEEDBACK_HEADER_LENGTH),
            fci: Span::mapped(FEEDBACK_HEADER_LENGTH, 0),
            padding: 0,
            dirty: false,
        }
    }

    /// The FMT field as found on the wire.
    pub fn raw_message_type(&self) -> u8 {
        (self.view[0] >> COUNT_SHIFT) & COUNT_MASK
    }

    pub fn set_raw_message_type(&mut self, format: u8) {
        self.view[0] = (self.view[0] & !COUNT_MASK) | (format & COUNT_MASK);
    }

    /// Feedback control information, padding excluded.
    pub fn fci(&self) -> &[u8] {
        self.fci.resolve(&self.view)
    }

    /// The FCI is zero filled up to a 32-bit boundary when serialized.
    pub fn set_fci(&mut self, fci: &[u8]) {
        self.fci = Span::detached(fci);
        self.dirty = true;
    }

    pub fn dump(&self) -> RawFeedbackPacketDump {
        RawFeedbackPacketDump {
            padding: self.padding,
            packet_type: self.view[1],
            message_type: self.raw_message_type(),
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
            fci: self.fci().to_vec(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFeedbackPacketDump {
    pub padding: u8,
    pub packet_type: u8,
    pub message_type: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub fci: Vec<u8>,
}

impl RtcpPacket for RawFeedbackPacket {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::from(self.view[1]),
            self.raw_message_type(),
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for RawFeedbackPacket {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        FEEDBACK_HEADER_LENGTH + align_to_4(self.fci.len()) + self.padding as usize
    }
}

impl Marshal for RawFeedbackPacket {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|   FMT   |       PT      |          length               |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                  SSRC of packet sender                        |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                  SSRC of media source                         |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * :            Feedback Control Information (FCI)                 :
         * :                                                               :
         */
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }

        let n = marshal_header(
            buf,
            size,
            self.raw_message_type(),
            self.view[1],
            self.padding,
        )?;
        buf = &mut buf[n..];

        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..FEEDBACK_HEADER_LENGTH]);
        let fci = self.fci();
        buf.put_slice(fci);
        let fill = align_to_4(fci.len()) - fci.len();
        buf[..fill].fill(0);

        Ok(size)
    }
}

impl Unmarshal for RawFeedbackPacket {
    /// Accepts any FMT of either feedback packet type.
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (header, padding) = parse_common(&view, None)?;
        if header.packet_type != PacketType::TransportSpecificFeedback
            && header.packet_type != PacketType::PayloadSpecificFeedback
        {
            return Err(Error::WrongType.into());
        }
        let end = view.len() - padding as usize;
        if end < FEEDBACK_HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        Ok(RawFeedbackPacket {
            fci: Span::mapped(FEEDBACK_HEADER_LENGTH, end - FEEDBACK_HEADER_LENGTH),
            view,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(RawFeedbackPacket);
impl_packet_padding!(RawFeedbackPacket);

impl FeedbackPacket for RawFeedbackPacket {
    fn message_type(&self) -> u8 {
        self.raw_message_type()
    }

    fn sender_ssrc(&self) -> u32 {
        (&self.view[SENDER_SSRC_OFFSET..]).get_u32()
    }

    fn set_sender_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[SENDER_SSRC_OFFSET..]).put_u32(ssrc);
    }

    fn media_ssrc(&self) -> u32 {
        (&self.view[MEDIA_SSRC_OFFSET..]).get_u32()
    }

    fn set_media_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[MEDIA_SSRC_OFFSET..]).put_u32(ssrc);
    }
}
