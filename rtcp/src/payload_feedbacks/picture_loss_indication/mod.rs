#[cfg(test)]
mod picture_loss_indication_test;

use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::feedback::*;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

/// The PictureLossIndication packet informs the encoder about the loss of an undefined amount of coded video data belonging to one or more pictures
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PictureLossIndication {
    view: BytesMut,
    padding: u8,
    dirty: bool,
}

impl Default for PictureLossIndication {
    fn default() -> Self {
        PictureLossIndication {
            view: empty_view(
                PacketType::PayloadSpecificFeedback,
                FORMAT_PLI,
                FEEDBACK_HEADER_LENGTH,
            ),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for PictureLossIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PictureLossIndication {:x} {:x}",
            self.sender_ssrc(),
            self.media_ssrc()
        )
    }
}

impl PictureLossIndication {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        let mut pli = PictureLossIndication::default();
        pli.set_sender_ssrc(sender_ssrc);
        pli.set_media_ssrc(media_ssrc);
        pli
    }

    pub fn dump(&self) -> PictureLossIndicationDump {
        PictureLossIndicationDump {
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
pub struct PictureLossIndicationDump {
    pub padding: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
}

impl RtcpPacket for PictureLossIndication {
    /// Header returns the Header associated with this packet.
    fn header(&self) -> Header {
        Header::describe(
            PacketType::PayloadSpecificFeedback,
            FORMAT_PLI,
            self.marshal_size(),
            self.padding,
        )
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for PictureLossIndication {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        FEEDBACK_HEADER_LENGTH + self.padding as usize
    }
}

impl Marshal for PictureLossIndication {
    /// Marshal encodes the PictureLossIndication in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         * PLI does not require parameters.  Therefore, the length field MUST be
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
            FORMAT_PLI,
            PacketType::PayloadSpecificFeedback as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];
        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..FEEDBACK_HEADER_LENGTH]);

        Ok(size)
    }
}

impl Unmarshal for PictureLossIndication {
    /// Unmarshal decodes the PictureLossIndication from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let padding = parse_feedback(&view, PacketType::PayloadSpecificFeedback, FORMAT_PLI)?;
        if view.len() - padding as usize != FEEDBACK_HEADER_LENGTH {
            return Err(Error::InvalidLength.into());
        }

        Ok(PictureLossIndication {
            view,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(PictureLossIndication);
impl_packet_padding!(PictureLossIndication);
impl_feedback_packet!(PictureLossIndication, FORMAT_PLI);
