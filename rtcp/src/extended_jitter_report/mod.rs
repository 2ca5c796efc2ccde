#[cfg(test)]
mod extended_jitter_report_test;

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const JITTER_LENGTH: usize = 4;

/// Extended inter-arrival jitter reports for the sources listed in the
/// accompanying reception reports, in the same order.
///
/// ## Specifications
///
/// * [RFC 5450 §4]
///
/// [RFC 5450 §4]: https://tools.ietf.org/html/rfc5450#section-4
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ExtendedJitterReport {
    view: BytesMut,
    jitters: Vec<u32>,
    padding: u8,
    dirty: bool,
}

impl Default for ExtendedJitterReport {
    fn default() -> Self {
        ExtendedJitterReport {
            view: empty_view(PacketType::ExtendedJitterReport, 0, HEADER_LENGTH),
            jitters: vec![],
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for ExtendedJitterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "ExtendedJitterReport\n".to_string();
        for jitter in &self.jitters {
            out += format!("\tJitter: {jitter}\n").as_str();
        }
        write!(f, "{out}")
    }
}

impl ExtendedJitterReport {
    pub fn new() -> Self {
        ExtendedJitterReport::default()
    }

    pub fn jitters(&self) -> &[u32] {
        &self.jitters
    }

    /// More than 31 values are rejected when the packet is serialized.
    pub fn set_jitters(&mut self, jitters: Vec<u32>) {
        self.jitters = jitters;
        self.dirty = true;
    }

    pub fn add_jitter(&mut self, jitter: u32) {
        self.jitters.push(jitter);
        self.dirty = true;
    }

    pub fn dump(&self) -> ExtendedJitterReportDump {
        ExtendedJitterReportDump {
            padding: self.padding,
            jitters: self.jitters.clone(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedJitterReportDump {
    pub padding: u8,
    pub jitters: Vec<u32>,
}

impl RtcpPacket for ExtendedJitterReport {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::ExtendedJitterReport,
            self.jitters.len() as u8,
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }
}

impl MarshalSize for ExtendedJitterReport {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        HEADER_LENGTH + self.jitters.len() * JITTER_LENGTH + self.padding as usize
    }
}

impl Marshal for ExtendedJitterReport {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|    RC   |   PT=IJ=195   |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                      inter-arrival jitter                     |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * .                                                               .
         * .                                                               .
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }
        if self.jitters.len() > COUNT_MAX {
            return Err(Error::TooManyReports.into());
        }

        let n = marshal_header(
            buf,
            size,
            self.jitters.len() as u8,
            PacketType::ExtendedJitterReport as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        for jitter in &self.jitters {
            buf.put_u32(*jitter);
        }

        Ok(size)
    }
}

impl Unmarshal for ExtendedJitterReport {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (header, padding) = parse_common(&view, Some(PacketType::ExtendedJitterReport))?;
        let end = view.len() - padding as usize;

        let jitters_end = HEADER_LENGTH + header.count as usize * JITTER_LENGTH;
        if jitters_end > end {
            return Err(Error::PacketTooShort.into());
        }
        if end - jitters_end >= JITTER_LENGTH {
            return Err(Error::InvalidLength.into());
        }

        let mut reader = &view[HEADER_LENGTH..jitters_end];
        let mut jitters = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            jitters.push(reader.get_u32());
        }

        Ok(ExtendedJitterReport {
            view,
            jitters,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(ExtendedJitterReport);
impl_packet_padding!(ExtendedJitterReport);
