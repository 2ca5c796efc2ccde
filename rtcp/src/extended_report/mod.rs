#[cfg(test)]
mod extended_report_test;

pub mod dlrr;
pub mod ecn;
pub mod prt;
pub mod rle;
pub mod rrt;
pub mod ssr;
pub mod unknown;
pub mod vm;

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
pub use dlrr::{DLRRReport, DLRRReportBlock, DLRRReportBlockDump, DLRRReportDump};
pub use ecn::{ECNSummaryReportBlock, ECNSummaryReportBlockDump};
pub use prt::{PacketReceiptTimesReportBlock, PacketReceiptTimesReportBlockDump};
pub use rle::{
    Chunk, ChunkType, DuplicateRLEReportBlock, LossRLEReportBlock, RLEReportBlock,
    RLEReportBlockDump,
};
pub use rrt::{ReceiverReferenceTimeReportBlock, ReceiverReferenceTimeReportBlockDump};
use serde::Serialize;
pub use ssr::{StatisticsSummaryReportBlock, StatisticsSummaryReportBlockDump, TTLorHopLimitType};
pub use unknown::{UnknownReportBlock, UnknownReportBlockDump};
use util::buffer::align_to_4;
use util::marshal::{Marshal, MarshalSize, PacketPadding, Serializable, Unmarshal};
use util::Span;
pub use vm::{VoIPMetricsReportBlock, VoIPMetricsReportBlockDump};

use crate::error::Error;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

pub const XR_HEADER_LENGTH: usize = 4;
const SSRC_OFFSET: usize = HEADER_LENGTH;
const REPORTS_OFFSET: usize = SSRC_OFFSET + SSRC_LENGTH;

/// BlockType specifies the type of report in a report block
/// Extended Report block types from RFC 3611.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockType {
    #[default]
    Unknown = 0,
    LossRLE = 1,               // RFC 3611, section 4.1
    DuplicateRLE = 2,          // RFC 3611, section 4.2
    PacketReceiptTimes = 3,    // RFC 3611, section 4.3
    ReceiverReferenceTime = 4, // RFC 3611, section 4.4
    DLRR = 5,                  // RFC 3611, section 4.5
    StatisticsSummary = 6,     // RFC 3611, section 4.6
    VoIPMetrics = 7,           // RFC 3611, section 4.7
    ECNSummary = 13,           // RFC 6679, section 5.2
}

impl From<u8> for BlockType {
    fn from(v: u8) -> Self {
        match v {
            1 => BlockType::LossRLE,
            2 => BlockType::DuplicateRLE,
            3 => BlockType::PacketReceiptTimes,
            4 => BlockType::ReceiverReferenceTime,
            5 => BlockType::DLRR,
            6 => BlockType::StatisticsSummary,
            7 => BlockType::VoIPMetrics,
            13 => BlockType::ECNSummary,
            _ => BlockType::Unknown,
        }
    }
}

/// converts the Extended report block types into readable strings
impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            BlockType::LossRLE => "LossRLEReportBlockType",
            BlockType::DuplicateRLE => "DuplicateRLEReportBlockType",
            BlockType::PacketReceiptTimes => "PacketReceiptTimesReportBlockType",
            BlockType::ReceiverReferenceTime => "ReceiverReferenceTimeReportBlockType",
            BlockType::DLRR => "DLRRReportBlockType",
            BlockType::StatisticsSummary => "StatisticsSummaryReportBlockType",
            BlockType::VoIPMetrics => "VoIPMetricsReportBlockType",
            BlockType::ECNSummary => "ECNSummaryReportBlockType",
            BlockType::Unknown => "UnknownReportBlockType",
        };
        write!(f, "{s}")
    }
}

/// TypeSpecificField as described in RFC 3611 section 4.5. In typical
/// cases, users of ExtendedReports shouldn't need to access this,
/// and should instead use the corresponding fields in the actual
/// report blocks themselves.
pub type TypeSpecificField = u8;

/// XRHeader defines the common fields that must appear at the start
/// of each report block.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      BT       | type-specific |         block length          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct XRHeader {
    /// The block type octet as found on the wire.
    pub block_type: u8,
    pub type_specific: TypeSpecificField,
    /// Length of the block in 32-bit words minus one, header included.
    pub block_length: u16,
}

impl XRHeader {
    pub fn parse(raw: &[u8]) -> std::result::Result<Self, Error> {
        if raw.len() < XR_HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let mut reader = raw;
        Ok(XRHeader {
            block_type: reader.get_u8(),
            type_specific: reader.get_u8(),
            block_length: reader.get_u16(),
        })
    }

    /// Size of the whole block in octets.
    pub fn size(&self) -> usize {
        (self.block_length as usize + 1) * 4
    }
}

impl MarshalSize for XRHeader {
    fn marshal_size(&self) -> usize {
        XR_HEADER_LENGTH
    }
}

impl Marshal for XRHeader {
    /// marshal_to encodes the block header in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < XR_HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u8(self.block_type);
        buf.put_u8(self.type_specific);
        buf.put_u16(self.block_length);

        Ok(XR_HEADER_LENGTH)
    }
}

/// Validates the header of a whole block view against its declared length.
pub(crate) fn parse_block(view: &[u8]) -> std::result::Result<XRHeader, Error> {
    let header = XRHeader::parse(view)?;
    if header.size() != view.len() {
        return Err(Error::InvalidLength);
    }
    Ok(header)
}

/// Like `parse_block`, additionally requiring the block type and an exact size.
pub(crate) fn parse_fixed_block(
    view: &[u8],
    block_type: BlockType,
    size: usize,
) -> std::result::Result<XRHeader, Error> {
    let header = parse_block(view)?;
    if header.block_type != block_type as u8 {
        return Err(Error::WrongBlockType);
    }
    if view.len() < size {
        return Err(Error::PacketTooShort);
    }
    if view.len() != size {
        return Err(Error::InvalidLength);
    }
    Ok(header)
}

/// Writes the header of a block that occupies `size` octets.
pub(crate) fn marshal_block_header(
    mut buf: &mut [u8],
    block_type: u8,
    type_specific: u8,
    size: usize,
) -> std::result::Result<usize, Error> {
    if buf.len() < size {
        return Err(Error::BufferTooShort);
    }
    if size % 4 != 0 || size < XR_HEADER_LENGTH || size / 4 - 1 > u16::MAX as usize {
        return Err(Error::InvalidLength);
    }

    buf.put_u8(block_type);
    buf.put_u8(type_specific);
    buf.put_u16((size / 4 - 1) as u16);

    Ok(XR_HEADER_LENGTH)
}

/// A zeroed block of `size` octets with only its header filled in.
pub(crate) fn empty_block(block_type: BlockType, size: usize) -> BytesMut {
    let mut view = BytesMut::zeroed(size);
    view[0] = block_type as u8;
    (&mut view[2..]).put_u16((size / 4 - 1) as u16);
    view
}

/// One report block of an ExtendedReport, by block type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ReportBlock {
    LossRLE(LossRLEReportBlock),
    DuplicateRLE(DuplicateRLEReportBlock),
    PacketReceiptTimes(PacketReceiptTimesReportBlock),
    ReceiverReferenceTime(ReceiverReferenceTimeReportBlock),
    DLRR(DLRRReportBlock),
    StatisticsSummary(StatisticsSummaryReportBlock),
    VoIPMetrics(VoIPMetricsReportBlock),
    ECNSummary(ECNSummaryReportBlock),
    Unknown(UnknownReportBlock),
}

macro_rules! each_block {
    ($block:expr, $b:ident => $e:expr) => {
        match $block {
            ReportBlock::LossRLE($b) => $e,
            ReportBlock::DuplicateRLE($b) => $e,
            ReportBlock::PacketReceiptTimes($b) => $e,
            ReportBlock::ReceiverReferenceTime($b) => $e,
            ReportBlock::DLRR($b) => $e,
            ReportBlock::StatisticsSummary($b) => $e,
            ReportBlock::VoIPMetrics($b) => $e,
            ReportBlock::ECNSummary($b) => $e,
            ReportBlock::Unknown($b) => $e,
        }
    };
}

impl ReportBlock {
    /// The block type as found on the wire.
    pub fn block_type(&self) -> BlockType {
        BlockType::from(self.view()[0])
    }

    /// destination_ssrc returns an array of ssrc values that this report block refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        each_block!(self, b => b.destination_ssrc())
    }

    pub fn dump(&self) -> ReportBlockDump {
        match self {
            ReportBlock::LossRLE(b) => ReportBlockDump::LossRLE(b.dump()),
            ReportBlock::DuplicateRLE(b) => ReportBlockDump::DuplicateRLE(b.dump()),
            ReportBlock::PacketReceiptTimes(b) => ReportBlockDump::PacketReceiptTimes(b.dump()),
            ReportBlock::ReceiverReferenceTime(b) => {
                ReportBlockDump::ReceiverReferenceTime(b.dump())
            }
            ReportBlock::DLRR(b) => ReportBlockDump::DLRR(b.dump()),
            ReportBlock::StatisticsSummary(b) => ReportBlockDump::StatisticsSummary(b.dump()),
            ReportBlock::VoIPMetrics(b) => ReportBlockDump::VoIPMetrics(b.dump()),
            ReportBlock::ECNSummary(b) => ReportBlockDump::ECNSummary(b.dump()),
            ReportBlock::Unknown(b) => ReportBlockDump::Unknown(b.dump()),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        each_block!(self, b => b.is_dirty())
    }
}

impl fmt::Display for ReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        each_block!(self, b => fmt::Display::fmt(b, f))
    }
}

impl MarshalSize for ReportBlock {
    fn marshal_size(&self) -> usize {
        each_block!(self, b => b.marshal_size())
    }
}

impl Marshal for ReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        each_block!(self, b => b.marshal_to(buf))
    }
}

impl Unmarshal for ReportBlock {
    /// Decodes one whole block, picking the decoder by block type.
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let header = parse_block(&view)?;

        let block = match BlockType::from(header.block_type) {
            BlockType::LossRLE => ReportBlock::LossRLE(RLEReportBlock::unmarshal(view)?),
            BlockType::DuplicateRLE => ReportBlock::DuplicateRLE(RLEReportBlock::unmarshal(view)?),
            BlockType::PacketReceiptTimes => {
                ReportBlock::PacketReceiptTimes(PacketReceiptTimesReportBlock::unmarshal(view)?)
            }
            BlockType::ReceiverReferenceTime => ReportBlock::ReceiverReferenceTime(
                ReceiverReferenceTimeReportBlock::unmarshal(view)?,
            ),
            BlockType::DLRR => ReportBlock::DLRR(DLRRReportBlock::unmarshal(view)?),
            BlockType::StatisticsSummary => {
                ReportBlock::StatisticsSummary(StatisticsSummaryReportBlock::unmarshal(view)?)
            }
            BlockType::VoIPMetrics => {
                ReportBlock::VoIPMetrics(VoIPMetricsReportBlock::unmarshal(view)?)
            }
            BlockType::ECNSummary => {
                ReportBlock::ECNSummary(ECNSummaryReportBlock::unmarshal(view)?)
            }
            BlockType::Unknown => {
                log::trace!(
                    "extended report block type {} kept as an opaque block",
                    header.block_type
                );
                ReportBlock::Unknown(UnknownReportBlock::unmarshal(view)?)
            }
        };

        Ok(block)
    }
}

impl Serializable for ReportBlock {
    fn view(&self) -> &[u8] {
        each_block!(self, b => b.view())
    }

    fn needs_serialization(&self) -> bool {
        self.is_dirty()
    }
}

impl From<RLEReportBlock> for ReportBlock {
    /// Picks the loss or duplicate variant from the block's own type.
    fn from(block: RLEReportBlock) -> Self {
        if block.block_type() == BlockType::DuplicateRLE {
            ReportBlock::DuplicateRLE(block)
        } else {
            ReportBlock::LossRLE(block)
        }
    }
}

macro_rules! impl_from_block {
    ($($variant:ident($t:ty)),*) => {
        $(
            impl From<$t> for ReportBlock {
                fn from(block: $t) -> Self {
                    ReportBlock::$variant(block)
                }
            }
        )*
    };
}

impl_from_block!(
    PacketReceiptTimes(PacketReceiptTimesReportBlock),
    ReceiverReferenceTime(ReceiverReferenceTimeReportBlock),
    DLRR(DLRRReportBlock),
    StatisticsSummary(StatisticsSummaryReportBlock),
    VoIPMetrics(VoIPMetricsReportBlock),
    ECNSummary(ECNSummaryReportBlock),
    Unknown(UnknownReportBlock)
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block_type")]
pub enum ReportBlockDump {
    LossRLE(RLEReportBlockDump),
    DuplicateRLE(RLEReportBlockDump),
    PacketReceiptTimes(PacketReceiptTimesReportBlockDump),
    ReceiverReferenceTime(ReceiverReferenceTimeReportBlockDump),
    DLRR(DLRRReportBlockDump),
    StatisticsSummary(StatisticsSummaryReportBlockDump),
    VoIPMetrics(VoIPMetricsReportBlockDump),
    ECNSummary(ECNSummaryReportBlockDump),
    Unknown(UnknownReportBlockDump),
}

/// The ExtendedReport packet is an Implementation of RTCP Extended
/// reports defined in RFC 3611. It is used to convey detailed
/// information about an RTP stream. Each packet contains one or
/// more report blocks, each of which conveys a different kind of
/// information.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|reserved |   PT=XR=207   |             length            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              ssrc                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                         report blocks                         :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The count field is reserved and always written as 0. Padding found on
/// a parsed packet is kept, but none can be added.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ExtendedReport {
    view: BytesMut,
    reports: Vec<ReportBlock>,
    padding: u8,
    dirty: bool,
}

impl Default for ExtendedReport {
    fn default() -> Self {
        ExtendedReport {
            view: empty_view(PacketType::ExtendedReport, 0, REPORTS_OFFSET),
            reports: vec![],
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for ExtendedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("ExtendedReport from {:x}\n", self.ssrc());
        for report in &self.reports {
            out += format!("\t{report}\n").as_str();
        }
        write!(f, "{out}")
    }
}

impl ExtendedReport {
    pub fn new(ssrc: u32) -> Self {
        let mut xr = ExtendedReport::default();
        xr.set_ssrc(ssrc);
        xr
    }

    /// The synchronization source identifier of the packet originator.
    pub fn ssrc(&self) -> u32 {
        (&self.view[SSRC_OFFSET..]).get_u32()
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[SSRC_OFFSET..]).put_u32(ssrc);
    }

    pub fn reports(&self) -> &[ReportBlock] {
        &self.reports
    }

    /// Gives write access to the report blocks; the packet is re-serialized afterwards.
    pub fn reports_mut(&mut self) -> &mut Vec<ReportBlock> {
        self.dirty = true;
        &mut self.reports
    }

    pub fn set_reports(&mut self, reports: Vec<ReportBlock>) {
        self.reports = reports;
        self.dirty = true;
    }

    pub fn add_report(&mut self, report: impl Into<ReportBlock>) {
        self.reports.push(report.into());
        self.dirty = true;
    }

    pub fn dump(&self) -> ExtendedReportDump {
        ExtendedReportDump {
            padding: self.padding,
            ssrc: self.ssrc(),
            reports: self.reports.iter().map(ReportBlock::dump).collect(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty || self.reports.iter().any(ReportBlock::is_dirty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedReportDump {
    pub padding: u8,
    pub ssrc: u32,
    pub reports: Vec<ReportBlockDump>,
}

impl RtcpPacket for ExtendedReport {
    /// Header returns the Header associated with this packet.
    fn header(&self) -> Header {
        Header::describe(
            PacketType::ExtendedReport,
            0,
            self.marshal_size(),
            self.padding,
        )
    }

    /// destination_ssrc returns an array of ssrc values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports
            .iter()
            .flat_map(ReportBlock::destination_ssrc)
            .collect()
    }
}

impl MarshalSize for ExtendedReport {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        let reports_length: usize = self.reports.iter().map(|r| r.marshal_size()).sum();
        REPORTS_OFFSET + reports_length + self.padding as usize
    }
}

impl Marshal for ExtendedReport {
    /// marshal_to encodes the ExtendedReport in binary
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
            0,
            PacketType::ExtendedReport as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc());
        for report in &self.reports {
            let n = report.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        Ok(size)
    }
}

impl Unmarshal for ExtendedReport {
    /// Unmarshal decodes the ExtendedReport from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let (_, padding) = parse_common(&view, Some(PacketType::ExtendedReport))?;
        let end = view.len() - padding as usize;
        if end < REPORTS_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let mut reports = vec![];
        let mut offset = REPORTS_OFFSET;
        while offset < end {
            let header = XRHeader::parse(&view[offset..end])?;
            let block_end = offset + header.size();
            if block_end > end {
                return Err(Error::PacketTooShort.into());
            }

            // blocks own a copy; the packet keeps its view whole
            reports.push(ReportBlock::unmarshal(BytesMut::from(
                &view[offset..block_end],
            ))?);
            offset = block_end;
        }

        Ok(ExtendedReport {
            view,
            reports,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(ExtendedReport);

impl PacketPadding for ExtendedReport {
    fn padding(&self) -> u8 {
        self.padding
    }

    /// Extended reports keep the padding they were parsed with; setting it is a no-op.
    fn set_padding(&mut self, _padding: u8) {}
}
