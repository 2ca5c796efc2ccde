
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::feedback::*;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const SLI_ENTRY_LENGTH: usize = 4;
const FIRST_MAX: u16 = 0x1fff;
const NUMBER_MAX: u16 = 0x1fff;
const PICTURE_MAX: u8 = 0x3f;

/// SliEntry represents a single entry to the SLI packet's
/// list of lost slices.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |            First        |        Number           | PictureID |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy, Serialize)]
pub struct SliEntry {
    /// ID of first lost slice, 13 bits
    pub first: u16,
    /// Number of lost slices, 13 bits
    pub number: u16,
    /// ID of related picture, 6 bits
    pub picture: u8,
}

impl SliEntry {
    fn from_word(word: u32) -> Self {
        SliEntry {
            first: (word >> 19) as u16,
            number: ((word >> 6) as u16) & NUMBER_MAX,
            picture: (word as u8) & PICTURE_MAX,
        }
    }

    /// Bits beyond each field's width are dropped.
    fn to_word(self) -> u32 {
        ((self.first & FIRST_MAX) as u32) << 19
            | ((self.number & NUMBER_MAX) as u32) << 6
            | (self.picture & PICTURE_MAX) as u32
    }
}

/// The SliceLossIndication packet informs the encoder about the loss of a picture slice
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SliceLossIndication {
    view: BytesMut,
    sli_entries: Vec<SliEntry>,
    padding: u8,
    dirty: bool,
}

impl Default for SliceLossIndication {
    fn default() -> Self {
        SliceLossIndication {
            view: empty_view(
                PacketType::PayloadSpecificFeedback,
                FORMAT_SLI,
                FEEDBACK_HEADER_LENGTH,
            ),
            sli_entries: vec![],
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for SliceLossIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SliceLossIndication {:x} {:x} {:?}",
            self.sender_ssrc(),
            self.media_ssrc(),
            self.sli_entries,
        )
    }
}

impl SliceLossIndication {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        let mut sli = SliceLossIndication::default();
        sli.set_sender_ssrc(sender_ssrc);
        sli.set_media_ssrc(media_ssrc);
        sli
    }

    pub fn sli_entries(&self) -> &[SliEntry] {
        &self.sli_entries
    }

    pub fn set_sli_entries(&mut self, entries: Vec<SliEntry>) {
        self.sli_entries = entries;
        self.dirty = true;
    }

    pub fn add_sli_entry(&mut self, entry: SliEntry) {
        self.sli_entries.push(entry);
        self.dirty = true;
    }

    pub fn dump(&self) -> SliceLossIndicationDump {
        SliceLossIndicationDump {
            padding: self.padding,
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
            sli_entries: self.sli_entries.clone(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceLossIndicationDump {
    pub padding: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub sli_entries: Vec<SliEntry>,
}

impl RtcpPacket for SliceLossIndication {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::PayloadSpecificFeedback,
            FORMAT_SLI,
            self.marshal_size(),
            self.padding,
        )
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for SliceLossIndication {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        FEEDBACK_HEADER_LENGTH + self.sli_entries.len() * SLI_ENTRY_LENGTH + self.padding as usize
    }
}

impl Marshal for SliceLossIndication {
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
            FORMAT_SLI,
            PacketType::PayloadSpecificFeedback as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..FEEDBACK_HEADER_LENGTH]);
        for entry in &self.sli_entries {
            buf.put_u32(entry.to_word());
        }

        Ok(size)
    }
}

impl Unmarshal for SliceLossIndication {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let padding = parse_feedback(&view, PacketType::PayloadSpecificFeedback, FORMAT_SLI)?;
        let end = view.len() - padding as usize;

        let fci = &view[FEEDBACK_HEADER_LENGTH..end];
        if fci.len() % SLI_ENTRY_LENGTH != 0 {
            return Err(Error::InvalidLength.into());
        }

        let sli_entries = fci
            .chunks_exact(SLI_ENTRY_LENGTH)
            .map(|mut entry| SliEntry::from_word(entry.get_u32()))
            .collect();

        Ok(SliceLossIndication {
            view,
            sli_entries,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(SliceLossIndication);
impl_packet_padding!(SliceLossIndication);
impl_feedback_packet!(SliceLossIndication, FORMAT_SLI);
