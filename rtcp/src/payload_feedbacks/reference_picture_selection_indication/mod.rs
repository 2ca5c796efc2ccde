#[cfg(test)]
mod reference_picture_selection_indication_test;

use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use util::buffer::align_to_4;
use util::marshal::{Marshal, MarshalSize, Unmarshal};
use util::Span;

use crate::error::Error;
use crate::feedback::*;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const PADDING_BITS_OFFSET: usize = FEEDBACK_HEADER_LENGTH;
const PAYLOAD_TYPE_OFFSET: usize = PADDING_BITS_OFFSET + 1;
const BIT_STRING_OFFSET: usize = PAYLOAD_TYPE_OFFSET + 1;
const PAYLOAD_TYPE_MASK: u8 = 0x7f;

/// The ReferencePictureSelectionIndication packet tells the encoder which
/// reference picture to use next, in a codec specific format (RFC 4585 §6.3.3).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      PB       |0| Payload Type|    Native RPSI bit string     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   defined per codec          ...                | Padding (0) |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// PB counts the zero bits after the bit string. Only whole octets are
/// supported.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReferencePictureSelectionIndication {
    view: BytesMut,
    bit_string: Span,
    padding: u8,
    dirty: bool,
}

impl Default for ReferencePictureSelectionIndication {
    fn default() -> Self {
        let length = FEEDBACK_HEADER_LENGTH + 4;
        let mut view = empty_view(PacketType::PayloadSpecificFeedback, FORMAT_RPSI, length);
        // two zero octets follow the payload type
        view[PADDING_BITS_OFFSET] = 16;

        ReferencePictureSelectionIndication {
            view,
            bit_string: Span::mapped(BIT_STRING_OFFSET, 0),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for ReferencePictureSelectionIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReferencePictureSelectionIndication {:x} {:x} pt {} {:02x?}",
            self.sender_ssrc(),
            self.media_ssrc(),
            self.payload_type(),
            self.bit_string()
        )
    }
}

impl ReferencePictureSelectionIndication {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        let mut rpsi = ReferencePictureSelectionIndication::default();
        rpsi.set_sender_ssrc(sender_ssrc);
        rpsi.set_media_ssrc(media_ssrc);
        rpsi
    }

    /// RTP payload type the bit string is meant for.
    pub fn payload_type(&self) -> u8 {
        self.view[PAYLOAD_TYPE_OFFSET] & PAYLOAD_TYPE_MASK
    }

    pub fn set_payload_type(&mut self, payload_type: u8) {
        self.view[PAYLOAD_TYPE_OFFSET] = payload_type & PAYLOAD_TYPE_MASK;
    }

    /// The number of zero bits between the bit string and the end of the FCI.
    pub fn padding_bits(&self) -> u8 {
        if self.is_dirty() {
            self.serialized_padding_bits()
        } else {
            self.view[PADDING_BITS_OFFSET]
        }
    }

    pub fn bit_string(&self) -> &[u8] {
        self.bit_string.resolve(&self.view)
    }

    pub fn set_bit_string(&mut self, bit_string: &[u8]) {
        self.bit_string = Span::detached(bit_string);
        self.dirty = true;
    }

    fn fci_length(&self) -> usize {
        align_to_4(2 + self.bit_string.len())
    }

    fn serialized_padding_bits(&self) -> u8 {
        ((self.fci_length() - 2 - self.bit_string.len()) * 8) as u8
    }

    pub fn dump(&self) -> ReferencePictureSelectionIndicationDump {
        ReferencePictureSelectionIndicationDump {
            padding: self.padding,
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
            padding_bits: self.padding_bits(),
            payload_type: self.payload_type(),
            bit_string: self.bit_string().to_vec(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferencePictureSelectionIndicationDump {
    pub padding: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub padding_bits: u8,
    pub payload_type: u8,
    pub bit_string: Vec<u8>,
}

impl RtcpPacket for ReferencePictureSelectionIndication {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::PayloadSpecificFeedback,
            FORMAT_RPSI,
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for ReferencePictureSelectionIndication {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        FEEDBACK_HEADER_LENGTH + self.fci_length() + self.padding as usize
    }
}

impl Marshal for ReferencePictureSelectionIndication {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
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
            FORMAT_RPSI,
            PacketType::PayloadSpecificFeedback as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..FEEDBACK_HEADER_LENGTH]);
        buf.put_u8(self.serialized_padding_bits());
        buf.put_u8(self.payload_type());

        let bit_string = self.bit_string();
        buf.put_slice(bit_string);
        for _ in 2 + bit_string.len()..self.fci_length() {
            buf.put_u8(0);
        }

        Ok(size)
    }
}

impl Unmarshal for ReferencePictureSelectionIndication {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let padding = parse_feedback(&view, PacketType::PayloadSpecificFeedback, FORMAT_RPSI)?;
        let end = view.len() - padding as usize;
        if end < BIT_STRING_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let padding_bits = view[PADDING_BITS_OFFSET] as usize;
        if padding_bits % 8 != 0 || padding_bits / 8 > end - BIT_STRING_OFFSET {
            return Err(Error::InvalidPaddingBits.into());
        }

        let bit_string = Span::mapped(
            BIT_STRING_OFFSET,
            end - BIT_STRING_OFFSET - padding_bits / 8,
        );

        Ok(ReferencePictureSelectionIndication {
            view,
            bit_string,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(ReferencePictureSelectionIndication);
impl_packet_padding!(ReferencePictureSelectionIndication);
impl_feedback_packet!(ReferencePictureSelectionIndication, FORMAT_RPSI);
