//! RTP header extension sub-codec (RFC 3550 5.3.1, RFC 5285).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      defined by profile       |           length              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        header extension                       |
//! |                             ....                              |
//! ```
//!
//! The profile selects how the body is split into elements:
//! `0xBEDE` for one byte `(id:4, len-1:4)` headers and `0x1xxx` for two byte
//! `(id:8, len:8)` headers. Any other profile keeps the body opaque.


use bytes::BufMut;
use serde::Serialize;
use util::buffer::get_padding_size;
use util::Span;

use crate::error::{Error, Result};

pub const EXTENSION_HEADER_LENGTH: usize = 4;
pub const EXTENSION_PROFILE_ONE_BYTE: u16 = 0xBEDE;
pub const EXTENSION_PROFILE_TWO_BYTE: u16 = 0x1000;
pub const EXTENSION_PROFILE_TWO_BYTE_MASK: u16 = 0xF000;
pub const EXTENSION_ID_PADDING: u8 = 0x0;
pub const EXTENSION_ID_RESERVED: u8 = 0xF;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ExtensionMode {
    OneByte,
    TwoBytes,
}

impl ExtensionMode {
    pub fn from_profile(profile: u16) -> Option<Self> {
        if profile == EXTENSION_PROFILE_ONE_BYTE {
            Some(ExtensionMode::OneByte)
        } else if profile & EXTENSION_PROFILE_TWO_BYTE_MASK == EXTENSION_PROFILE_TWO_BYTE {
            Some(ExtensionMode::TwoBytes)
        } else {
            None
        }
    }

    pub fn profile(&self) -> u16 {
        match self {
            ExtensionMode::OneByte => EXTENSION_PROFILE_ONE_BYTE,
            ExtensionMode::TwoBytes => EXTENSION_PROFILE_TWO_BYTE,
        }
    }

    /// Ids outside this range are dropped when the packet is serialized.
    pub fn is_valid_id(&self, id: u8) -> bool {
        match self {
            ExtensionMode::OneByte => (1..=14).contains(&id),
            ExtensionMode::TwoBytes => id >= 1,
        }
    }

    fn element_header_len(&self) -> usize {
        match self {
            ExtensionMode::OneByte => 1,
            ExtensionMode::TwoBytes => 2,
        }
    }
}

/// One `(id, value)` element of an RFC 5285 extension body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub id: u8,
    pub payload: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionBody {
    Elements(ExtensionMode, Vec<Extension>),
    Raw(Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderExtension {
    pub profile: u16,
    pub body: ExtensionBody,
}

impl HeaderExtension {
    pub fn with_mode(mode: ExtensionMode) -> Self {
        HeaderExtension {
            profile: mode.profile(),
            body: ExtensionBody::Elements(mode, vec![]),
        }
    }

    pub fn raw(profile: u16, body: &[u8]) -> Self {
        HeaderExtension {
            profile,
            body: ExtensionBody::Raw(Span::detached(body)),
        }
    }

    /// Parses the body found at `view[start..end]`; element spans are absolute in `view`.
    pub fn parse(view: &[u8], profile: u16, start: usize, end: usize) -> Result<Self> {
        let body = match ExtensionMode::from_profile(profile) {
            Some(ExtensionMode::OneByte) => {
                let mut elements = vec![];
                let mut curr_offset = start;
                while curr_offset < end {
                    let b = view[curr_offset];
                    curr_offset += 1;

                    // id 0 is a single alignment byte whatever its length bits say
                    let id = b >> 4;
                    if id == EXTENSION_ID_PADDING {
                        continue;
                    }
                    if id == EXTENSION_ID_RESERVED {
                        break;
                    }

                    let len = (b & 0x0F) as usize + 1;
                    if curr_offset + len > end {
                        return Err(Error::ErrHeaderSizeInsufficientForExtension);
                    }
                    elements.push(Extension {
                        id,
                        payload: Span::mapped(curr_offset, len),
                    });
                    curr_offset += len;
                }
                ExtensionBody::Elements(ExtensionMode::OneByte, elements)
            }
            Some(ExtensionMode::TwoBytes) => {
                let mut elements = vec![];
                let mut curr_offset = start;
                while curr_offset < end {
                    let id = view[curr_offset];
                    curr_offset += 1;
                    if id == EXTENSION_ID_PADDING {
                        continue;
                    }

                    if curr_offset >= end {
                        return Err(Error::ErrHeaderSizeInsufficientForExtension);
                    }
                    let len = view[curr_offset] as usize;
                    curr_offset += 1;
                    if curr_offset + len > end {
                        return Err(Error::ErrHeaderSizeInsufficientForExtension);
                    }
                    elements.push(Extension {
                        id,
                        payload: Span::mapped(curr_offset, len),
                    });
                    curr_offset += len;
                }
                ExtensionBody::Elements(ExtensionMode::TwoBytes, elements)
            }
            None => ExtensionBody::Raw(Span::mapped(start, end - start)),
        };

        Ok(HeaderExtension { profile, body })
    }

    pub fn mode(&self) -> Option<ExtensionMode> {
        match &self.body {
            ExtensionBody::Elements(mode, _) => Some(*mode),
            ExtensionBody::Raw(_) => None,
        }
    }

    /// Elements that survive serialization in the current mode, in order.
    pub fn valid_elements(&self) -> impl Iterator<Item = &Extension> {
        let (mode, elements) = match &self.body {
            ExtensionBody::Elements(mode, elements) => (Some(*mode), &elements[..]),
            ExtensionBody::Raw(_) => (None, &[][..]),
        };
        elements
            .iter()
            .filter(move |e| mode.map_or(false, |m| m.is_valid_id(e.id)))
    }

    fn unpadded_body_len(&self) -> usize {
        match &self.body {
            ExtensionBody::Elements(mode, _) => self
                .valid_elements()
                .map(|e| mode.element_header_len() + e.payload.len())
                .sum(),
            ExtensionBody::Raw(body) => body.len(),
        }
    }

    /// Size of the extension including its 4-byte header.
    pub fn marshal_size(&self) -> usize {
        let body_len = self.unpadded_body_len();
        EXTENSION_HEADER_LENGTH + body_len + get_padding_size(body_len)
    }

    /// Writes header and body; spans are resolved against `view`.
    pub fn marshal_to(&self, view: &[u8], mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::ErrBufferTooSmall);
        }

        if let ExtensionBody::Elements(mode, elements) = &self.body {
            for e in elements.iter().filter(|e| !mode.is_valid_id(e.id)) {
                log::trace!("dropping header extension id {} in {:?} mode", e.id, mode);
            }
        }

        let body_len = self.unpadded_body_len();
        buf.put_u16(self.profile);
        buf.put_u16(((size - EXTENSION_HEADER_LENGTH) / 4) as u16);

        match &self.body {
            ExtensionBody::Elements(ExtensionMode::OneByte, _) => {
                for e in self.valid_elements() {
                    if e.payload.is_empty() || e.payload.len() > 16 {
                        return Err(Error::ErrRfc8285oneByteHeaderSize);
                    }
                    buf.put_u8((e.id << 4) | (e.payload.len() as u8 - 1));
                    buf.put_slice(e.payload.resolve(view));
                }
            }
            ExtensionBody::Elements(ExtensionMode::TwoBytes, _) => {
                for e in self.valid_elements() {
                    if e.payload.len() > 255 {
                        return Err(Error::ErrRfc8285twoByteHeaderSize);
                    }
                    buf.put_u8(e.id);
                    buf.put_u8(e.payload.len() as u8);
                    buf.put_slice(e.payload.resolve(view));
                }
            }
            ExtensionBody::Raw(body) => {
                if body.len() % 4 != 0 {
                    return Err(Error::HeaderExtensionPayloadNot32BitWords);
                }
                buf.put_slice(body.resolve(view));
            }
        }

        for _ in 0..get_padding_size(body_len) {
            buf.put_u8(0);
        }

        Ok(size)
    }
}
