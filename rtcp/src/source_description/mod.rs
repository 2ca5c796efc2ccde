#[cfg(test)]
mod source_description_test;

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

const SDES_SOURCE_LEN: usize = 4;
const SDES_TYPE_LEN: usize = 1;
const SDES_OCTET_COUNT_LEN: usize = 1;
const SDES_TEXT_OFFSET: usize = SDES_TYPE_LEN + SDES_OCTET_COUNT_LEN;
/// Smallest chunk: the source followed by a terminator and padding.
const SDES_EMPTY_CHUNK_LEN: usize = 8;

/// SDESType is the item type used in the RTCP SDES control packet.
/// RTP SDES item types registered with IANA. See: https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-5
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum SdesType {
    #[default]
    SdesEnd, // end of SDES list                RFC 3550, 6.5
    SdesCname,    // canonical name                  RFC 3550, 6.5.1
    SdesName,     // user name                       RFC 3550, 6.5.2
    SdesEmail,    // user's electronic mail address  RFC 3550, 6.5.3
    SdesPhone,    // user's phone number             RFC 3550, 6.5.4
    SdesLocation, // geographic user location        RFC 3550, 6.5.5
    SdesTool,     // name of application or tool     RFC 3550, 6.5.6
    SdesNote,     // notice about the source         RFC 3550, 6.5.7
    SdesPrivate,  // private extensions              RFC 3550, 6.5.8
    SdesOther(u8),
}

impl fmt::Display for SdesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdesType::SdesEnd => write!(f, "END"),
            SdesType::SdesCname => write!(f, "CNAME"),
            SdesType::SdesName => write!(f, "NAME"),
            SdesType::SdesEmail => write!(f, "EMAIL"),
            SdesType::SdesPhone => write!(f, "PHONE"),
            SdesType::SdesLocation => write!(f, "LOC"),
            SdesType::SdesTool => write!(f, "TOOL"),
            SdesType::SdesNote => write!(f, "NOTE"),
            SdesType::SdesPrivate => write!(f, "PRIV"),
            SdesType::SdesOther(t) => write!(f, "Unknown({t})"),
        }
    }
}

impl From<u8> for SdesType {
    fn from(b: u8) -> Self {
        match b {
            0 => SdesType::SdesEnd,
            1 => SdesType::SdesCname,
            2 => SdesType::SdesName,
            3 => SdesType::SdesEmail,
            4 => SdesType::SdesPhone,
            5 => SdesType::SdesLocation,
            6 => SdesType::SdesTool,
            7 => SdesType::SdesNote,
            8 => SdesType::SdesPrivate,
            t => SdesType::SdesOther(t),
        }
    }
}

impl From<SdesType> for u8 {
    fn from(t: SdesType) -> Self {
        match t {
            SdesType::SdesEnd => 0,
            SdesType::SdesCname => 1,
            SdesType::SdesName => 2,
            SdesType::SdesEmail => 3,
            SdesType::SdesPhone => 4,
            SdesType::SdesLocation => 5,
            SdesType::SdesTool => 6,
            SdesType::SdesNote => 7,
            SdesType::SdesPrivate => 8,
            SdesType::SdesOther(t) => t,
        }
    }
}

/// A SourceDescriptionItem is a part of a SourceDescription that describes a stream.
#[derive(Debug, PartialEq, Eq, Clone)]
struct SourceDescriptionItem {
    sdes_type: SdesType,
    text: Span,
}

/// A SourceDescriptionChunk contains items describing a single RTP source
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceDescriptionChunk {
    view: BytesMut,
    items: Vec<SourceDescriptionItem>,
    dirty: bool,
}

impl Default for SourceDescriptionChunk {
    fn default() -> Self {
        SourceDescriptionChunk {
            view: BytesMut::zeroed(SDES_EMPTY_CHUNK_LEN),
            items: vec![],
            dirty: false,
        }
    }
}

impl fmt::Display for SourceDescriptionChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("\t{:x}: ", self.source());
        for (sdes_type, text) in self.items() {
            out += format!("{sdes_type}={} ", String::from_utf8_lossy(text)).as_str();
        }
        write!(f, "{out}")
    }
}

/// Scans the items of a chunk that starts at `raw[0]` and returns them along
/// with the chunk length, terminator and padding included.
fn scan_chunk(
    raw: &[u8],
) -> std::result::Result<(Vec<SourceDescriptionItem>, usize), Error> {
    /*
     *  +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
     *  |                          SSRC/CSRC_1                          |
     *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
     *  |                           SDES items                          |
     *  |                              ...                              |
     *  +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
     */
    if raw.len() < SDES_SOURCE_LEN {
        return Err(Error::PacketTooShort);
    }

    let mut items = vec![];
    let mut offset = SDES_SOURCE_LEN;
    loop {
        if offset >= raw.len() {
            return Err(Error::MissingTerminator);
        }

        let sdes_type = SdesType::from(raw[offset]);
        if sdes_type == SdesType::SdesEnd {
            // the terminator and the null octets up to the next 32-bit boundary
            let chunk_len = align_to_4(offset + SDES_TYPE_LEN);
            if chunk_len > raw.len() {
                return Err(Error::PacketTooShort);
            }
            return Ok((items, chunk_len));
        }

        if offset + SDES_TEXT_OFFSET > raw.len() {
            return Err(Error::PacketTooShort);
        }
        let text_len = raw[offset + SDES_TYPE_LEN] as usize;
        let text_offset = offset + SDES_TEXT_OFFSET;
        if text_offset + text_len > raw.len() {
            return Err(Error::PacketTooShort);
        }

        items.push(SourceDescriptionItem {
            sdes_type,
            text: Span::mapped(text_offset, text_len),
        });
        offset = text_offset + text_len;
    }
}

impl SourceDescriptionChunk {
    pub fn new(source: u32) -> Self {
        let mut chunk = SourceDescriptionChunk::default();
        chunk.set_source(source);
        chunk
    }

    /// The source (ssrc) or contributing source (csrc) identifier this chunk describes
    pub fn source(&self) -> u32 {
        (&self.view[..]).get_u32()
    }

    pub fn set_source(&mut self, source: u32) {
        (&mut self.view[..]).put_u32(source);
    }

    /// Items in wire order.
    pub fn items(&self) -> Vec<(SdesType, &[u8])> {
        self.items
            .iter()
            .map(|it| (it.sdes_type, it.text.resolve(&self.view)))
            .collect()
    }

    /// Text of the first item of the given type.
    pub fn item(&self, sdes_type: SdesType) -> Option<&[u8]> {
        self.items
            .iter()
            .find(|it| it.sdes_type == sdes_type)
            .map(|it| it.text.resolve(&self.view))
    }

    pub fn cname(&self) -> Option<&[u8]> {
        self.item(SdesType::SdesCname)
    }

    /// Replaces the text of the first item of the given type, or appends a new
    /// item. Text longer than 255 octets is rejected when serialized.
    pub fn set_item(&mut self, sdes_type: SdesType, text: &[u8]) {
        let text = Span::detached(text);
        match self.items.iter_mut().find(|it| it.sdes_type == sdes_type) {
            Some(it) => it.text = text,
            None => self.items.push(SourceDescriptionItem { sdes_type, text }),
        }
        self.dirty = true;
    }

    /// Appends an item even when one of the same type exists.
    pub fn add_item(&mut self, sdes_type: SdesType, text: &[u8]) {
        self.items.push(SourceDescriptionItem {
            sdes_type,
            text: Span::detached(text),
        });
        self.dirty = true;
    }

    /// Removes every item of the given type. Returns whether any was present.
    pub fn remove_item(&mut self, sdes_type: SdesType) -> bool {
        let before = self.items.len();
        self.items.retain(|it| it.sdes_type != sdes_type);
        let removed = self.items.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn dump(&self) -> SourceDescriptionChunkDump {
        SourceDescriptionChunkDump {
            source: self.source(),
            items: self
                .items()
                .into_iter()
                .map(|(sdes_type, text)| SourceDescriptionItemDump {
                    sdes_type,
                    text: String::from_utf8_lossy(text).into_owned(),
                })
                .collect(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn raw_size(&self) -> usize {
        let mut len = SDES_SOURCE_LEN;
        for it in &self.items {
            len += SDES_TEXT_OFFSET + it.text.len();
        }
        len + SDES_TYPE_LEN // for terminating null octet
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptionChunkDump {
    pub source: u32,
    pub items: Vec<SourceDescriptionItemDump>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptionItemDump {
    pub sdes_type: SdesType,
    pub text: String,
}

impl MarshalSize for SourceDescriptionChunk {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        // align to 32-bit boundary
        align_to_4(self.raw_size())
    }
}

impl Marshal for SourceDescriptionChunk {
    /// Marshal encodes the SourceDescriptionChunk in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }

        buf.put_slice(&self.view[..SDES_SOURCE_LEN]);

        for it in &self.items {
            let text = it.text.resolve(&self.view);
            if text.len() > SDES_MAX_OCTET_COUNT {
                return Err(Error::SdesTextTooLong.into());
            }
            if it.sdes_type == SdesType::SdesEnd {
                return Err(Error::SdesMissingType.into());
            }
            buf.put_u8(it.sdes_type.into());
            buf.put_u8(text.len() as u8);
            buf.put_slice(text);
        }

        // The list of items in each chunk MUST be terminated by one or more null octets,
        // additional null octets MUST be included if needed to pad until the next 32-bit boundary
        let fill = size - self.raw_size() + SDES_TYPE_LEN;
        buf[..fill].fill(0);

        Ok(size)
    }
}

impl Unmarshal for SourceDescriptionChunk {
    /// Unmarshal decodes the SourceDescriptionChunk from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (items, chunk_len) = scan_chunk(&view)?;
        if chunk_len != view.len() {
            return Err(Error::InvalidLength.into());
        }

        Ok(SourceDescriptionChunk {
            view,
            items,
            dirty: false,
        })
    }
}

impl_serializable!(SourceDescriptionChunk);

/// A SourceDescription (SDES) packet describes the sources in an RTP stream.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceDescription {
    view: BytesMut,
    chunks: Vec<SourceDescriptionChunk>,
    padding: u8,
    dirty: bool,
}

impl Default for SourceDescription {
    fn default() -> Self {
        SourceDescription {
            view: empty_view(PacketType::SourceDescription, 0, HEADER_LENGTH),
            chunks: vec![],
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for SourceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "Source Description:\n".to_string();
        for c in &self.chunks {
            out += format!("{c}\n").as_str();
        }
        write!(f, "{out}")
    }
}

impl SourceDescription {
    pub fn new() -> Self {
        SourceDescription::default()
    }

    /// A SDES packet carrying a single CNAME item.
    pub fn with_cname(source: u32, cname: &[u8]) -> Self {
        let mut chunk = SourceDescriptionChunk::new(source);
        chunk.set_item(SdesType::SdesCname, cname);

        let mut sdes = SourceDescription::default();
        sdes.add_chunk(chunk);
        sdes
    }

    pub fn chunks(&self) -> &[SourceDescriptionChunk] {
        &self.chunks
    }

    /// Chunks stay owned by the packet, so their changes are picked up on the
    /// next serialization.
    pub fn chunks_mut(&mut self) -> &mut Vec<SourceDescriptionChunk> {
        self.dirty = true;
        &mut self.chunks
    }

    /// More than 31 chunks are rejected when the packet is serialized.
    pub fn set_chunks(&mut self, chunks: Vec<SourceDescriptionChunk>) {
        self.chunks = chunks;
        self.dirty = true;
    }

    pub fn add_chunk(&mut self, chunk: SourceDescriptionChunk) {
        self.chunks.push(chunk);
        self.dirty = true;
    }

    /// The CNAME of the first chunk that has one.
    pub fn cname(&self) -> Option<&[u8]> {
        self.chunks.iter().find_map(|c| c.cname())
    }

    pub fn dump(&self) -> SourceDescriptionDump {
        SourceDescriptionDump {
            padding: self.padding,
            chunks: self.chunks.iter().map(|c| c.dump()).collect(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty || self.chunks.iter().any(|c| c.is_dirty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptionDump {
    pub padding: u8,
    pub chunks: Vec<SourceDescriptionChunkDump>,
}

impl RtcpPacket for SourceDescription {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::SourceDescription,
            self.chunks.len() as u8,
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.chunks.iter().map(|x| x.source()).collect()
    }
}

impl MarshalSize for SourceDescription {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        let chunks_length: usize = self.chunks.iter().map(|c| c.marshal_size()).sum();
        HEADER_LENGTH + chunks_length + self.padding as usize
    }
}

impl Marshal for SourceDescription {
    /// Marshal encodes the SourceDescription in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *         0                   1                   2                   3
         *         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * header |V=2|P|    SC   |  PT=SDES=202  |             length            |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * chunk  |                          SSRC/CSRC_1                          |
         *   1    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                           SDES items                          |
         *        |                              ...                              |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * chunk  |                          SSRC/CSRC_2                          |
         *   2    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                           SDES items                          |
         *        |                              ...                              |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         */
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }
        if self.chunks.len() > COUNT_MAX {
            return Err(Error::TooManyChunks.into());
        }

        let n = marshal_header(
            buf,
            size,
            self.chunks.len() as u8,
            PacketType::SourceDescription as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        for c in &self.chunks {
            let n = c.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        Ok(size)
    }
}

impl Unmarshal for SourceDescription {
    /// Unmarshal decodes the SourceDescription from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (header, padding) = parse_common(&view, Some(PacketType::SourceDescription))?;
        let end = view.len() - padding as usize;

        let mut offset = HEADER_LENGTH;
        let mut chunks = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            let (items, chunk_len) = scan_chunk(&view[offset..end])?;
            // chunks own a copy; the packet keeps its view whole
            chunks.push(SourceDescriptionChunk {
                view: BytesMut::from(&view[offset..offset + chunk_len]),
                items,
                dirty: false,
            });
            offset += chunk_len;
        }

        if offset != end {
            return Err(Error::InvalidLength.into());
        }

        Ok(SourceDescription {
            view,
            chunks,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(SourceDescription);
impl_packet_padding!(SourceDescription);
