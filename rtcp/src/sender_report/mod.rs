
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

const SSRC_OFFSET: usize = HEADER_LENGTH;
const NTP_TIME_OFFSET: usize = SSRC_OFFSET + SSRC_LENGTH;
const RTP_TIME_OFFSET: usize = NTP_TIME_OFFSET + 8;
const PACKET_COUNT_OFFSET: usize = RTP_TIME_OFFSET + 4;
const OCTET_COUNT_OFFSET: usize = PACKET_COUNT_OFFSET + 4;
const REPORTS_OFFSET: usize = OCTET_COUNT_OFFSET + 4;

/// A SenderReport (SR) packet provides reception quality feedback for an RTP stream
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SenderReport {
    view: BytesMut,
    reports: Vec<ReceptionReport>,
    profile_extensions: Span,
    padding: u8,
    dirty: bool,
}

impl Default for SenderReport {
    fn default() -> Self {
        SenderReport {
            view: empty_view(PacketType::SenderReport, 0, REPORTS_OFFSET),
            reports: vec![],
            profile_extensions: Span::mapped(REPORTS_OFFSET, 0),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for SenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("SenderReport from {}\n", self.ssrc());
        out += format!("\tNTPTime:\t{}\n", self.ntp_time()).as_str();
        out += format!("\tRTPTIme:\t{}\n", self.rtp_time()).as_str();
        out += format!("\tPacketCount:\t{}\n", self.packet_count()).as_str();
        out += format!("\tOctetCount:\t{}\n", self.octet_count()).as_str();
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

impl SenderReport {
    pub fn new() -> Self {
        SenderReport::default()
    }

    /// The synchronization source identifier for the originator of this SR packet.
    pub fn ssrc(&self) -> u32 {
        (&self.view[SSRC_OFFSET..]).get_u32()
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[SSRC_OFFSET..]).put_u32(ssrc);
    }

    /// The wallclock time when this report was sent so that it may be used in
    /// combination with timestamps returned in reception reports from other
    /// receivers to measure round-trip propagation to those receivers.
    pub fn ntp_time(&self) -> u64 {
        (&self.view[NTP_TIME_OFFSET..]).get_u64()
    }

    pub fn set_ntp_time(&mut self, ntp_time: u64) {
        (&mut self.view[NTP_TIME_OFFSET..]).put_u64(ntp_time);
    }

    /// Corresponds to the same time as the NTP timestamp (above), but in
    /// the same units and with the same random offset as the RTP
    /// timestamps in data packets.
    pub fn rtp_time(&self) -> u32 {
        (&self.view[RTP_TIME_OFFSET..]).get_u32()
    }

    pub fn set_rtp_time(&mut self, rtp_time: u32) {
        (&mut self.view[RTP_TIME_OFFSET..]).put_u32(rtp_time);
    }

    /// The total number of RTP data packets transmitted by the sender
    /// since starting transmission up until the time this SR packet was
    /// generated.
    pub fn packet_count(&self) -> u32 {
        (&self.view[PACKET_COUNT_OFFSET..]).get_u32()
    }

    pub fn set_packet_count(&mut self, packet_count: u32) {
        (&mut self.view[PACKET_COUNT_OFFSET..]).put_u32(packet_count);
    }

    /// The total number of payload octets (i.e., not including header or
    /// padding) transmitted in RTP data packets by the sender since
    /// starting transmission up until the time this SR packet was
    /// generated.
    pub fn octet_count(&self) -> u32 {
        (&self.view[OCTET_COUNT_OFFSET..]).get_u32()
    }

    pub fn set_octet_count(&mut self, octet_count: u32) {
        (&mut self.view[OCTET_COUNT_OFFSET..]).put_u32(octet_count);
    }

    pub fn reports(&self) -> &[ReceptionReport] {
        &self.reports
    }

    /// Marks the packet for re-serialization, like `ReceiverReport::reports_mut`.
    pub fn reports_mut(&mut self) -> &mut Vec<ReceptionReport> {
        self.dirty = true;
        &mut self.reports
    }

    pub fn set_reports(&mut self, reports: Vec<ReceptionReport>) {
        self.reports = reports;
        self.dirty = true;
    }

    pub fn add_report(&mut self, report: ReceptionReport) {
        self.reports.push(report);
        self.dirty = true;
    }

    pub fn profile_extensions(&self) -> &[u8] {
        self.profile_extensions.resolve(&self.view)
    }

    pub fn set_profile_extensions(&mut self, profile_extensions: &[u8]) {
        self.profile_extensions = Span::detached(profile_extensions);
        self.dirty = true;
    }

    pub fn dump(&self) -> SenderReportDump {
        SenderReportDump {
            padding: self.padding,
            ssrc: self.ssrc(),
            ntp_time: self.ntp_time(),
            rtp_time: self.rtp_time(),
            packet_count: self.packet_count(),
            octet_count: self.octet_count(),
            reports: self.reports.iter().map(|r| r.dump()).collect(),
            profile_extensions: self.profile_extensions().to_vec(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty || self.reports.iter().any(|r| r.is_dirty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderReportDump {
    pub padding: u8,
    pub ssrc: u32,
    pub ntp_time: u64,
    pub rtp_time: u32,
    pub packet_count: u32,
    pub octet_count: u32,
    pub reports: Vec<ReceptionReportDump>,
    pub profile_extensions: Vec<u8>,
}

impl RtcpPacket for SenderReport {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::SenderReport,
            self.reports.len() as u8,
            self.marshal_size(),
            self.padding,
        )
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        let mut out: Vec<u32> = self.reports.iter().map(|x| x.ssrc()).collect();
        out.push(self.ssrc());
        out
    }
}

impl MarshalSize for SenderReport {
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

impl Marshal for SenderReport {
    /// marshal_to encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *         0                   1                   2                   3
         *         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * header |V=2|P|    RC   |   PT=SR=200   |             length            |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                         SSRC of sender                        |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * sender |              NTP timestamp, most significant word             |
         * info   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |             NTP timestamp, least significant word             |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                         RTP timestamp                         |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                     sender's packet count                     |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                      sender's octet count                     |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * report |                 SSRC_1 (SSRC of first source)                 |
         * block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *   1    :                               ...                             :
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
            PacketType::SenderReport as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        // ssrc and sender info are kept in place
        buf.put_slice(&self.view[SSRC_OFFSET..REPORTS_OFFSET]);
        for report in &self.reports {
            let n = report.marshal_to(buf)?;
            buf = &mut buf[n..];
        }
        buf.put_slice(self.profile_extensions());

        Ok(size)
    }
}

impl Unmarshal for SenderReport {
    /// Unmarshal decodes the SenderReport from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (header, padding) = parse_common(&view, Some(PacketType::SenderReport))?;
        let end = view.len() - padding as usize;
        if end < REPORTS_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let reports = parse_reports(&view[..end], REPORTS_OFFSET, header.count as usize)?;
        let extensions_offset = REPORTS_OFFSET + reports.len() * RECEPTION_REPORT_LENGTH;

        Ok(SenderReport {
            profile_extensions: Span::mapped(extensions_offset, end - extensions_offset),
            view,
            reports,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(SenderReport);
impl_packet_padding!(SenderReport);
