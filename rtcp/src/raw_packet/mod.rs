
use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use util::buffer::align_to_4;
use util::marshal::{Marshal, MarshalSize, Unmarshal};
use util::Span;

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

/// RawPacket represents an RTCP packet whose type has no dedicated decoder.
/// Its body is kept as opaque bytes.
///
/// The count field and packet type are read from and written to the view in
/// place.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawPacket {
    view: BytesMut,
    body: Span,
    padding: u8,
    dirty: bool,
}

impl Default for RawPacket {
    fn default() -> Self {
        RawPacket::new(PacketType::ApplicationDefined as u8, 0)
    }
}

impl fmt::Display for RawPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawPacket: type {} count {} body {:?}",
            self.raw_packet_type(),
            self.raw_count(),
            self.body()
        )
    }
}

impl RawPacket {
    /// An empty packet of the given type. Types outside 192..=223 are
    /// rejected when the packet is parsed back.
    pub fn new(packet_type: u8, count: u8) -> Self {
        let mut view = empty_view(PacketType::Unsupported, count, HEADER_LENGTH);
        view[1] = packet_type;
        RawPacket {
            view,
            body: Span::mapped(HEADER_LENGTH, 0),
            padding: 0,
            dirty: false,
        }
    }

    /// The packet type octet as found on the wire.
    pub fn raw_packet_type(&self) -> u8 {
        self.view[1]
    }

    pub fn set_raw_packet_type(&mut self, packet_type: u8) {
        self.view[1] = packet_type;
    }

    /// The five bit count field, whatever it means for this packet type.
    pub fn raw_count(&self) -> u8 {
        (self.view[0] >> COUNT_SHIFT) & COUNT_MASK
    }

    pub fn set_raw_count(&mut self, count: u8) {
        self.view[0] = (self.view[0] & !COUNT_MASK) | (count & COUNT_MASK);
    }

    /// Everything after the common header, padding excluded.
    pub fn body(&self) -> &[u8] {
        self.body.resolve(&self.view)
    }

    /// The body is zero filled up to a 32-bit boundary when serialized.
    pub fn set_body(&mut self, body: &[u8]) {
        self.body = Span::detached(body);
        self.dirty = true;
    }

    pub fn dump(&self) -> RawPacketDump {
        RawPacketDump {
            padding: self.padding,
            packet_type: self.raw_packet_type(),
            count: self.raw_count(),
            body: self.body().to_vec(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPacketDump {
    pub padding: u8,
    pub packet_type: u8,
    pub count: u8,
    pub body: Vec<u8>,
}

impl RtcpPacket for RawPacket {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::from(self.raw_packet_type()),
            self.raw_count(),
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }
}

impl MarshalSize for RawPacket {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        HEADER_LENGTH + align_to_4(self.body.len()) + self.padding as usize
    }
}

impl Marshal for RawPacket {
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
            self.raw_count(),
            self.raw_packet_type(),
            self.padding,
        )?;
        buf = &mut buf[n..];

        let body = self.body();
        buf.put_slice(body);
        let fill = align_to_4(body.len()) - body.len();
        buf[..fill].fill(0);

        Ok(size)
    }
}

impl Unmarshal for RawPacket {
    /// Accepts any packet type in the RTCP range.
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (_, padding) = parse_common(&view, None)?;
        let end = view.len() - padding as usize;

        Ok(RawPacket {
            body: Span::mapped(HEADER_LENGTH, end - HEADER_LENGTH),
            view,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(RawPacket);
impl_packet_padding!(RawPacket);
