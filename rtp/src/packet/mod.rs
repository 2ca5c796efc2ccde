
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::buffer::put_padding;
use util::marshal::{Marshal, MarshalSize, PacketPadding, Serializable, Unmarshal};
use util::Span;

use crate::error::Error;
use crate::extension::*;
use crate::header::*;

type Result<T> = std::result::Result<T, util::Error>;

/// An RTP packet backed by its wire bytes.
///
/// The fixed header fields are read from and written to the view directly. CSRCs,
/// the header extension, the payload and the padding are tracked separately and
/// only reach the view on the next [`Serializable::serialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    view: BytesMut,
    csrcs: Vec<u32>,
    extension: Option<HeaderExtension>,
    payload: Span,
    padding: u8,
    dirty: bool,
}

impl Default for Packet {
    fn default() -> Self {
        let mut view = BytesMut::zeroed(HEADER_LENGTH);
        view[0] = VERSION << VERSION_SHIFT;
        Packet {
            view,
            csrcs: vec![],
            extension: None,
            payload: Span::mapped(HEADER_LENGTH, 0),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "RTP PACKET:\n".to_string();

        out += format!("\tVersion: {}\n", self.version()).as_str();
        out += format!("\tMarker: {}\n", self.marker()).as_str();
        out += format!("\tPayload Type: {}\n", self.payload_type()).as_str();
        out += format!("\tSequence Number: {}\n", self.sequence_number()).as_str();
        out += format!("\tTimestamp: {}\n", self.timestamp()).as_str();
        out += format!("\tSSRC: {} ({:x})\n", self.ssrc(), self.ssrc()).as_str();
        for csrc in &self.csrcs {
            out += format!("\tCSRC: {csrc} ({csrc:x})\n").as_str();
        }
        if let Some(ext) = &self.extension {
            out += format!("\tHeader Extension: {:#06x}\n", ext.profile).as_str();
        }
        out += format!("\tPayload Length: {}\n", self.payload.len()).as_str();
        out += format!("\tPadding: {}\n", self.padding).as_str();

        write!(f, "{out}")
    }
}

impl Packet {
    pub fn new() -> Self {
        Packet::default()
    }

    pub fn version(&self) -> u8 {
        self.view[0] >> VERSION_SHIFT & VERSION_MASK
    }

    pub fn payload_type(&self) -> u8 {
        self.view[1] & PT_MASK
    }

    pub fn set_payload_type(&mut self, payload_type: u8) {
        self.view[1] = (self.view[1] & !PT_MASK) | (payload_type & PT_MASK);
    }

    pub fn marker(&self) -> bool {
        (self.view[1] >> MARKER_SHIFT & MARKER_MASK) > 0
    }

    pub fn set_marker(&mut self, marker: bool) {
        if marker {
            self.view[1] |= 1 << MARKER_SHIFT;
        } else {
            self.view[1] &= !(1 << MARKER_SHIFT);
        }
    }

    pub fn sequence_number(&self) -> u16 {
        (&self.view[SEQ_NUM_OFFSET..]).get_u16()
    }

    pub fn set_sequence_number(&mut self, sequence_number: u16) {
        (&mut self.view[SEQ_NUM_OFFSET..]).put_u16(sequence_number);
    }

    pub fn timestamp(&self) -> u32 {
        (&self.view[TIMESTAMP_OFFSET..]).get_u32()
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        (&mut self.view[TIMESTAMP_OFFSET..]).put_u32(timestamp);
    }

    pub fn ssrc(&self) -> u32 {
        (&self.view[SSRC_OFFSET..]).get_u32()
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[SSRC_OFFSET..]).put_u32(ssrc);
    }

    pub fn csrc_count(&self) -> usize {
        self.csrcs.len()
    }

    pub fn csrcs(&self) -> &[u32] {
        &self.csrcs
    }

    /// More than 15 CSRCs are rejected when the packet is serialized.
    pub fn set_csrcs(&mut self, csrcs: Vec<u32>) {
        self.csrcs = csrcs;
        self.dirty = true;
    }

    pub fn add_csrc(&mut self, csrc: u32) {
        self.csrcs.push(csrc);
        self.dirty = true;
    }

    pub fn has_header_extension(&self) -> bool {
        self.extension.is_some()
    }

    pub fn header_extension_profile(&self) -> Option<u16> {
        self.extension.as_ref().map(|ext| ext.profile)
    }

    pub fn extension_mode(&self) -> Option<ExtensionMode> {
        self.extension.as_ref().and_then(|ext| ext.mode())
    }

    /// Switches the element encoding. Elements whose id is not valid in the new mode
    /// stay visible until serialization drops them. An opaque extension is replaced
    /// by an empty element list.
    pub fn set_extension_mode(&mut self, mode: ExtensionMode) {
        if let Some(HeaderExtension {
            profile,
            body: ExtensionBody::Elements(m, _),
        }) = &mut self.extension
        {
            if *m == mode {
                return;
            }
            *m = mode;
            *profile = mode.profile();
        } else {
            self.extension = Some(HeaderExtension::with_mode(mode));
        }
        self.dirty = true;
    }

    /// Returns the value of the first element carrying `id`.
    pub fn extension(&self, id: u8) -> Option<&[u8]> {
        self.extensions()
            .into_iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, payload)| payload)
    }

    /// All decoded elements, in wire order.
    pub fn extensions(&self) -> Vec<(u8, &[u8])> {
        match &self.extension {
            Some(HeaderExtension {
                body: ExtensionBody::Elements(_, elements),
                ..
            }) => elements
                .iter()
                .map(|e| (e.id, e.payload.resolve(&self.view)))
                .collect(),
            _ => vec![],
        }
    }

    /// Sets or replaces an element.
    ///
    /// Without an extension, a payload of up to 16 bytes selects the one byte mode and
    /// anything larger the two byte mode. An opaque extension is replaced.
    pub fn set_extension(&mut self, id: u8, payload: &[u8]) {
        let mode = if payload.len() <= 16 {
            ExtensionMode::OneByte
        } else {
            ExtensionMode::TwoBytes
        };
        if self.extension_mode().is_none() {
            self.extension = Some(HeaderExtension::with_mode(mode));
        }

        if let Some(HeaderExtension {
            body: ExtensionBody::Elements(_, elements),
            ..
        }) = &mut self.extension
        {
            let payload = Span::detached(payload);
            match elements.iter_mut().find(|e| e.id == id) {
                Some(e) => e.payload = payload,
                None => elements.push(Extension { id, payload }),
            }
        }
        self.dirty = true;
    }

    pub fn delete_extension(&mut self, id: u8) -> std::result::Result<(), Error> {
        match &mut self.extension {
            Some(HeaderExtension {
                body: ExtensionBody::Elements(_, elements),
                ..
            }) => match elements.iter().position(|e| e.id == id) {
                Some(index) => {
                    elements.remove(index);
                    self.dirty = true;
                    Ok(())
                }
                None => Err(Error::ErrHeaderExtensionNotFound),
            },
            _ => Err(Error::ErrHeaderExtensionsNotEnabled),
        }
    }

    /// Removes every element but keeps the (now empty) extension header.
    pub fn clear_extensions(&mut self) {
        if let Some(HeaderExtension {
            body: ExtensionBody::Elements(_, elements),
            ..
        }) = &mut self.extension
        {
            if !elements.is_empty() {
                elements.clear();
                self.dirty = true;
            }
        }
    }

    /// The opaque body of an extension whose profile is neither one nor two byte.
    pub fn raw_header_extension(&self) -> Option<(u16, &[u8])> {
        match &self.extension {
            Some(HeaderExtension {
                profile,
                body: ExtensionBody::Raw(body),
            }) => Some((*profile, body.resolve(&self.view))),
            _ => None,
        }
    }

    /// Replaces the extension with an opaque body written verbatim. The body must be
    /// a whole number of 32-bit words by serialization time.
    pub fn set_raw_header_extension(&mut self, profile: u16, body: &[u8]) {
        self.extension = Some(HeaderExtension::raw(profile, body));
        self.dirty = true;
    }

    pub fn remove_header_extension(&mut self) {
        if self.extension.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn payload(&self) -> &[u8] {
        self.payload.resolve(&self.view)
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.payload = Span::detached(payload);
        self.dirty = true;
    }

    /// Turns this packet into its RFC 4588 retransmission.
    ///
    /// The original sequence number is prepended to the payload and any padding is
    /// dropped.
    pub fn rtx_encode(&mut self, payload_type: u8, ssrc: u32, sequence_number: u16) {
        let mut payload = BytesMut::with_capacity(2 + self.payload.len());
        payload.put_u16(self.sequence_number());
        payload.put_slice(self.payload());

        self.set_payload_type(payload_type);
        self.set_ssrc(ssrc);
        self.set_sequence_number(sequence_number);
        self.payload = Span::Detached(payload.freeze());
        self.padding = 0;
        self.dirty = true;
    }

    /// Restores the original packet from an RFC 4588 retransmission.
    pub fn rtx_decode(&mut self, payload_type: u8, ssrc: u32) -> std::result::Result<(), Error> {
        if self.payload.len() < 2 {
            return Err(Error::ErrRtxPayloadTooShort);
        }
        let osn = (&self.payload()[..2]).get_u16();

        self.payload = match &self.payload {
            Span::Mapped { offset, len } => Span::mapped(offset + 2, len - 2),
            Span::Detached(b) => Span::Detached(b.slice(2..)),
        };
        self.set_payload_type(payload_type);
        self.set_ssrc(ssrc);
        self.set_sequence_number(osn);
        self.padding = 0;
        self.dirty = true;

        Ok(())
    }

    pub fn dump(&self) -> PacketDump {
        PacketDump {
            version: self.version(),
            padding: self.padding,
            marker: self.marker(),
            payload_type: self.payload_type(),
            sequence_number: self.sequence_number(),
            timestamp: self.timestamp(),
            ssrc: self.ssrc(),
            csrcs: self.csrcs.clone(),
            header_extension: self.extension.as_ref().map(|ext| HeaderExtensionDump {
                profile: ext.profile,
                mode: ext.mode(),
                extensions: self
                    .extensions()
                    .into_iter()
                    .map(|(id, value)| ExtensionDump {
                        id,
                        value: value.to_vec(),
                    })
                    .collect(),
                raw: self.raw_header_extension().map(|(_, body)| body.to_vec()),
            }),
            payload_length: self.payload.len(),
        }
    }

    fn header_len(&self) -> usize {
        HEADER_LENGTH
            + self.csrcs.len() * CSRC_LENGTH
            + self.extension.as_ref().map_or(0, |ext| ext.marshal_size())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketDump {
    pub version: u8,
    pub padding: u8,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrcs: Vec<u32>,
    pub header_extension: Option<HeaderExtensionDump>,
    pub payload_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderExtensionDump {
    pub profile: u16,
    pub mode: Option<ExtensionMode>,
    pub extensions: Vec<ExtensionDump>,
    pub raw: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDump {
    pub id: u8,
    pub value: Vec<u8>,
}

impl MarshalSize for Packet {
    fn marshal_size(&self) -> usize {
        if !self.dirty {
            return self.view.len();
        }
        self.header_len() + self.payload.len() + self.padding as usize
    }
}

impl Marshal for Packet {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::ErrBufferTooSmall.into());
        }
        if !self.dirty {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }
        if self.csrcs.len() > MAX_CSRCS {
            return Err(Error::ErrTooManyCsrcs(self.csrcs.len()).into());
        }

        // The first byte contains the version, padding bit, extension bit, and csrc size
        let mut b0 = (VERSION << VERSION_SHIFT) | self.csrcs.len() as u8;
        if self.padding > 0 {
            b0 |= 1 << PADDING_SHIFT;
        }
        if self.extension.is_some() {
            b0 |= 1 << EXTENSION_SHIFT;
        }
        buf.put_u8(b0);
        // marker, payload type, sequence number, timestamp and ssrc are kept in place
        buf.put_slice(&self.view[1..HEADER_LENGTH]);

        for csrc in &self.csrcs {
            buf.put_u32(*csrc);
        }

        if let Some(ext) = &self.extension {
            let n = ext.marshal_to(&self.view, buf)?;
            buf = &mut buf[n..];
        }

        buf.put_slice(self.payload());
        put_padding(buf, self.padding as usize);

        Ok(size)
    }
}

impl Unmarshal for Packet {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let raw_packet_len = view.len();
        if raw_packet_len < HEADER_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficient.into());
        }

        let b0 = view[0];
        let version = b0 >> VERSION_SHIFT & VERSION_MASK;
        if version != VERSION {
            return Err(Error::ErrInvalidVersion(version).into());
        }
        let padding = (b0 >> PADDING_SHIFT & PADDING_MASK) > 0;
        let extension = (b0 >> EXTENSION_SHIFT & EXTENSION_MASK) > 0;
        let cc = (b0 & CC_MASK) as usize;

        let mut curr_offset = CSRC_OFFSET + (cc * CSRC_LENGTH);
        if raw_packet_len < curr_offset {
            return Err(Error::ErrHeaderSizeInsufficient.into());
        }

        let mut reader = &view[CSRC_OFFSET..curr_offset];
        let mut csrcs = Vec::with_capacity(cc);
        for _ in 0..cc {
            csrcs.push(reader.get_u32());
        }

        let extension = if extension {
            if raw_packet_len < curr_offset + EXTENSION_HEADER_LENGTH {
                return Err(Error::ErrHeaderSizeInsufficientForExtension.into());
            }
            let mut reader = &view[curr_offset..];
            let profile = reader.get_u16();
            let extension_length = reader.get_u16() as usize * 4;
            curr_offset += EXTENSION_HEADER_LENGTH;

            let end = curr_offset + extension_length;
            if raw_packet_len < end {
                return Err(Error::ErrHeaderSizeInsufficientForExtension.into());
            }
            let ext = HeaderExtension::parse(&view, profile, curr_offset, end)?;
            curr_offset = end;
            Some(ext)
        } else {
            None
        };

        let padding = if padding {
            let p = view[raw_packet_len - 1];
            if p == 0 || p as usize > raw_packet_len - curr_offset {
                return Err(Error::ErrInvalidPadding.into());
            }
            p
        } else {
            0
        };

        Ok(Packet {
            payload: Span::mapped(curr_offset, raw_packet_len - curr_offset - padding as usize),
            view,
            csrcs,
            extension,
            padding,
            dirty: false,
        })
    }
}

impl Serializable for Packet {
    fn view(&self) -> &[u8] {
        &self.view
    }

    fn needs_serialization(&self) -> bool {
        self.dirty
    }
}

impl PacketPadding for Packet {
    fn padding(&self) -> u8 {
        self.padding
    }

    fn set_padding(&mut self, padding: u8) {
        if self.padding != padding {
            self.padding = padding;
            self.dirty = true;
        }
    }
}
