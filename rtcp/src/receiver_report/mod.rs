
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};
use util::Span;

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;
use crate::reception_report::*;

type Result<T> = std::result::Result<T, util::Error>;

pub(super) const SSRC_OFFSET: usize = HEADER_LENGTH;
pub(super) const REPORTS_OFFSET: usize = SSRC_OFFSET + SSRC_LENGTH;

/// A ReceiverReport (RR) packet provides reception quality feedback for an RTP stream
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReceiverReport {
    view: BytesMut,
    reports: Vec<ReceptionReport>,
    profile_extensions: Span,
    padding: u8,
    dirty: bool,
}

impl Default for ReceiverReport {
    fn default() -> Self {
        ReceiverReport {
            view: empty_view(PacketType::ReceiverReport, 0, REPORTS_OFFSET),
            reports: vec![],
            profile_extensions: Span::mapped(REPORTS_OFFSET, 0),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for ReceiverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("ReceiverReport from {}\n", self.ssrc());
        out += "\tSSRC    \tLost\tLastSequence\n";
        for rep in &self.reports {
            out += format!(
                "\t{:x}\t{}/{}\t{}\n",
                rep.ssrc(),
                rep.fraction_lost(),
                rep.total_lost(),
                rep.last_sequence_number()
            )
            .as_str();
        }
        out += format!("\tProfile Extension Data: {:?}\n", self.profile_extensions()).as_str();

        write!(f, "{out}")
    }
}

impl ReceiverReport {
    pub fn new() -> Self {
        ReceiverReport::default()
    }

    /// The synchronization source identifier for the originator of this RR packet.
    pub fn ssrc(&self) -> u32 {
        (&self.view[SSRC_OFFSET..]).get_u32()
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[SSRC_OFFSET..]).put_u32(ssrc);
    }

    /// Zero or more reception report blocks depending on the number of other
    /// sources heard by this sender since the last report.
    pub fn reports(&self) -> &[ReceptionReport] {
        &self.reports
    }

    /// Blocks are copies of the packet bytes, so handing them out for writing
    /// marks the packet for re-serialization.
    pub fn reports_mut(&mut self) -> &mut Vec<ReceptionReport> {
        self.dirty = true;
        &mut self.reports
    }

    /// More than 31 reports are rejected when the packet is serialized.
    pub fn set_reports(&mut self, reports: Vec<ReceptionReport>) {
        self.reports = reports;
        self.dirty = true;
    }

    pub fn add_report(&mut self, report: ReceptionReport) {
        self.reports.push(report);
        self.dirty = true;
    }

    /// Extension data that may be defined by the profile, carried after the
    /// report blocks.
    pub fn profile_extensions(&self) -> &[u8] {
        self.profile_extensions.resolve(&self.view)
    }

    pub fn set_profile_extensions(&mut self, profile_extensions: &[u8]) {
        self.profile_extensions = Span::detached(profile_extensions);
        self.dirty = true;
    }

    pub fn dump(&self) -> ReceiverReportDump {
        ReceiverReportDump {
            padding: self.padding,
            ssrc: self.ssrc(),
            reports: self.reports.iter().map(|r| r.dump()).collect(),
            profile_extensions: self.profile_extensions().to_vec(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty || self.reports.iter().any(|r| r.is_dirty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverReportDump {
    pub padding: u8,
    pub ssrc: u32,
    pub reports: Vec<ReceptionReportDump>,
    pub profile_extensions: Vec<u8>,
}

impl RtcpPacket for ReceiverReport {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::ReceiverReport,
            self.reports.len() as u8,
            self.marshal_size(),
            self.padding,
        )
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|x| x.ssrc()).collect()
    }
}

impl MarshalSize for ReceiverReport {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        REPORTS_OFFSET
            + self.reports.len() * RECEPTION_REPORT_LENGTH
            + self.profile_extensions.len()
            + self.padding as usize
    }
}

impl Marshal for ReceiverReport {
    /// marshal_to encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *         0                   1                   2                   3
         *         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * header |V=2|P|    RC   |   PT=RR=201   |             length            |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                     SSRC of packet sender                     |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * report |                 SSRC_1 (SSRC of first source)                 |
         * block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *   1    | fraction lost |       cumulative number of packets lost       |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |           extended highest sequence number received           |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                      interarrival jitter                      |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                         last SR (LSR)                         |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                   delay since last SR (DLSR)                  |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * report |                 SSRC_2 (SSRC of second source)                |
         * block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *   2    :                               ...                             :
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         *        |                  profile-specific extensions                  |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports.into());
        }

        let n = marshal_header(
            buf,
            size,
            self.reports.len() as u8,
            PacketType::ReceiverReport as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        buf.put_slice(&self.view[SSRC_OFFSET..REPORTS_OFFSET]);
        for report in &self.reports {
            let n = report.marshal_to(buf)?;
            buf = &mut buf[n..];
        }
        buf.put_slice(self.profile_extensions());

        Ok(size)
    }
}

impl Unmarshal for ReceiverReport {
    /// Unmarshal decodes the ReceiverReport from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (header, padding) = parse_common(&view, Some(PacketType::ReceiverReport))?;
        let end = view.len() - padding as usize;
        if end < REPORTS_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let reports = parse_reports(&view[..end], REPORTS_OFFSET, header.count as usize)?;
        let extensions_offset = REPORTS_OFFSET + reports.len() * RECEPTION_REPORT_LENGTH;

        Ok(ReceiverReport {
            profile_extensions: Span::mapped(extensions_offset, end - extensions_offset),
            view,
            reports,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(ReceiverReport);
impl_packet_padding!(ReceiverReport);
