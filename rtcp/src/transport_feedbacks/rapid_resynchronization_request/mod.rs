
use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::feedback::*;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

/// The RapidResynchronizationRequest packet informs the encoder about the loss of an undefined amount of coded video data belonging to one or more pictures
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RapidResynchronizationRequest {
    view: BytesMut,
    padding: u8,
    dirty: bool,
}

impl Default for RapidResynchronizationRequest {
    fn default() -> Self {
        RapidResynchronizationRequest {
            view: empty_view(
                PacketType::TransportSpecificFeedback,
                FORMAT_RRR,
                FEEDBACK_HEADER_LENGTH,
            ),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for RapidResynchronizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RapidResynchronizationRequest {:x} {:x}",
            self.sender_ssrc(),
            self.media_ssrc()
        )
    }
}

impl RapidResynchronizationRequest {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        let mut rrr = RapidResynchronizationRequest::default();
        rrr.set_sender_ssrc(sender_ssrc);
        rrr.set_media_ssrc(media_ssrc);
        rrr
    }

    pub fn dump(&self) -> RapidResynchronizationRequestDump {
        RapidResynchronizationRequestDump {
            padding: self.padding,
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RapidResynchronizationRequestDump {
    pub padding: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
}

impl RtcpPacket for RapidResynchronizationRequest {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::TransportSpecificFeedback,
            FORMAT_RRR,
            self.marshal_size(),
            self.padding,
        )
    }

    /// Destination SSRC returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for RapidResynchronizationRequest {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        FEEDBACK_HEADER_LENGTH + self.padding as usize
    }
}

impl Marshal for RapidResynchronizationRequest {
    /// Marshal encodes the RapidResynchronizationRequest in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         * RRR does not require parameters.  Therefore, the length field MUST be
         * 2, and there MUST NOT be any Feedback Control Information.
         *
         * The semantics of this FB message is independent of the payload type.
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
            FORMAT_RRR,
            PacketType::TransportSpecificFeedback as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];
        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..FEEDBACK_HEADER_LENGTH]);

        Ok(size)
    }
}

impl Unmarshal for RapidResynchronizationRequest {
    /// Unmarshal decodes the RapidResynchronizationRequest from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let padding = parse_feedback(&view, PacketType::TransportSpecificFeedback, FORMAT_RRR)?;
        if view.len() - padding as usize != FEEDBACK_HEADER_LENGTH {
            return Err(Error::InvalidLength.into());
        }

        Ok(RapidResynchronizationRequest {
            view,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(RapidResynchronizationRequest);
impl_packet_padding!(RapidResynchronizationRequest);
impl_feedback_packet!(RapidResynchronizationRequest, FORMAT_RRR);
