
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

/// The Goodbye packet indicates that one or more sources are no longer active.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Goodbye {
    view: BytesMut,
    sources: Vec<u32>,
    reason: Option<Span>,
    padding: u8,
    dirty: bool,
}

impl Default for Goodbye {
    fn default() -> Self {
        Goodbye {
            view: empty_view(PacketType::Goodbye, 0, HEADER_LENGTH),
            sources: vec![],
            reason: None,
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for Goodbye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "Goodbye\n".to_string();
        for (i, s) in self.sources.iter().enumerate() {
            out += format!("\tSource {i}: {s:x}\n").as_str();
        }
        if let Some(reason) = self.reason() {
            out += format!("\tReason: {:?}\n", String::from_utf8_lossy(reason)).as_str();
        }

        write!(f, "{out}")
    }
}

impl Goodbye {
    pub fn new() -> Self {
        Goodbye::default()
    }

    /// The SSRC/CSRC identifiers that are no longer active
    pub fn sources(&self) -> &[u32] {
        &self.sources
    }

    /// More than 31 sources are rejected when the packet is serialized.
    pub fn set_sources(&mut self, sources: Vec<u32>) {
        self.sources = sources;
        self.dirty = true;
    }

    pub fn add_source(&mut self, source: u32) {
        self.sources.push(source);
        self.dirty = true;
    }

    /// Optional text indicating the reason for leaving, e.g., "camera malfunction" or "RTP loop detected"
    pub fn reason(&self) -> Option<&[u8]> {
        self.reason.as_ref().map(|r| r.resolve(&self.view))
    }

    /// A reason longer than 255 octets is rejected when the packet is serialized.
    pub fn set_reason(&mut self, reason: &[u8]) {
        self.reason = Some(Span::detached(reason));
        self.dirty = true;
    }

    pub fn clear_reason(&mut self) {
        if self.reason.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn dump(&self) -> GoodbyeDump {
        GoodbyeDump {
            padding: self.padding,
            sources: self.sources.clone(),
            reason: self
                .reason()
                .map(|r| String::from_utf8_lossy(r).into_owned()),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn reason_size(&self) -> usize {
        self.reason
            .as_ref()
            .map_or(0, |r| align_to_4(1 + r.len()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoodbyeDump {
    pub padding: u8,
    pub sources: Vec<u32>,
    pub reason: Option<String>,
}

impl RtcpPacket for Goodbye {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::Goodbye,
            self.sources.len() as u8,
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.sources.to_vec()
    }
}

impl MarshalSize for Goodbye {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        HEADER_LENGTH
            + self.sources.len() * SSRC_LENGTH
            + self.reason_size()
            + self.padding as usize
    }
}

impl Marshal for Goodbye {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *        0                   1                   2                   3
         *        0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *       |V=2|P|    SC   |   PT=BYE=203  |             length            |
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *       |                           SSRC/CSRC                           |
         *       +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         *       :                              ...                              :
         *       +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * (opt) |     length    |               reason for leaving            ...
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }
        if self.sources.len() > COUNT_MAX {
            return Err(Error::TooManySources.into());
        }

        let n = marshal_header(
            buf,
            size,
            self.sources.len() as u8,
            PacketType::Goodbye as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        for source in &self.sources {
            buf.put_u32(*source);
        }

        if let Some(reason) = self.reason() {
            if reason.len() > SDES_MAX_OCTET_COUNT {
                return Err(Error::ReasonTooLong.into());
            }
            buf.put_u8(reason.len() as u8);
            buf.put_slice(reason);

            let fill = self.reason_size() - 1 - reason.len();
            buf[..fill].fill(0);
        }

        Ok(size)
    }
}

impl Unmarshal for Goodbye {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (header, padding) = parse_common(&view, Some(PacketType::Goodbye))?;
        let end = view.len() - padding as usize;

        let reason_offset = HEADER_LENGTH + header.count as usize * SSRC_LENGTH;
        if reason_offset > end {
            return Err(Error::PacketTooShort.into());
        }

        let mut reader = &view[HEADER_LENGTH..reason_offset];
        let mut sources = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            sources.push(reader.get_u32());
        }

        let reason = if reason_offset < end {
            let reason_len = view[reason_offset] as usize;
            let reason_end = reason_offset + 1 + reason_len;
            if reason_end > end {
                return Err(Error::PacketTooShort.into());
            }
            // at most three null octets may follow the reason
            if end - reason_end >= 4 {
                return Err(Error::InvalidLength.into());
            }
            Some(Span::mapped(reason_offset + 1, reason_len))
        } else {
            None
        };

        Ok(Goodbye {
            view,
            sources,
            reason,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(Goodbye);
impl_packet_padding!(Goodbye);
