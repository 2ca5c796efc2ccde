use super::*;

const SSR_REPORT_BLOCK_LENGTH: usize = XR_HEADER_LENGTH + 36;
const SSRC_OFFSET: usize = XR_HEADER_LENGTH;

const LOSS_REPORTS_FLAG: u8 = 0x80;
const DUPLICATE_REPORTS_FLAG: u8 = 0x40;
const JITTER_REPORTS_FLAG: u8 = 0x20;
const TTL_OR_HOP_LIMIT_SHIFT: u8 = 3;
const TTL_OR_HOP_LIMIT_MASK: u8 = 0x03;

/// StatisticsSummaryReportBlock encodes a Statistics Summary Report
/// Block as described in RFC 3611, section 4.6.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=6      |L|D|J|ToH|rsvd.|       block length = 9        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          begin_seq            |             end_seq           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        lost_packets                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        dup_packets                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         min_jitter                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         max_jitter                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         mean_jitter                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         dev_jitter                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | min_ttl_or_hl | max_ttl_or_hl |mean_ttl_or_hl | dev_ttl_or_hl |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StatisticsSummaryReportBlock {
    view: BytesMut,
}

impl Default for StatisticsSummaryReportBlock {
    fn default() -> Self {
        StatisticsSummaryReportBlock {
            view: empty_block(BlockType::StatisticsSummary, SSR_REPORT_BLOCK_LENGTH),
        }
    }
}

impl fmt::Display for StatisticsSummaryReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatisticsSummary {:?}", self.dump())
    }
}

/// TTLorHopLimitType encodes values for the ToH field in
/// a StatisticsSummaryReportBlock
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TTLorHopLimitType {
    #[default]
    Missing = 0,
    IPv4 = 1,
    IPv6 = 2,
}

impl From<u8> for TTLorHopLimitType {
    fn from(v: u8) -> Self {
        match v {
            1 => TTLorHopLimitType::IPv4,
            2 => TTLorHopLimitType::IPv6,
            _ => TTLorHopLimitType::Missing,
        }
    }
}

impl fmt::Display for TTLorHopLimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            TTLorHopLimitType::Missing => "[ToH Missing]",
            TTLorHopLimitType::IPv4 => "[ToH = IPv4]",
            TTLorHopLimitType::IPv6 => "[ToH = IPv6]",
        };
        write!(f, "{s}")
    }
}

impl StatisticsSummaryReportBlock {
    pub fn new() -> Self {
        StatisticsSummaryReportBlock::default()
    }

    fn flag(&self, flag: u8) -> bool {
        self.view[1] & flag != 0
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.view[1] |= flag;
        } else {
            self.view[1] &= !flag;
        }
    }

    /// Whether lost_packets carries a value.
    pub fn loss_reports(&self) -> bool {
        self.flag(LOSS_REPORTS_FLAG)
    }

    pub fn set_loss_reports(&mut self, on: bool) {
        self.set_flag(LOSS_REPORTS_FLAG, on);
    }

    /// Whether dup_packets carries a value.
    pub fn duplicate_reports(&self) -> bool {
        self.flag(DUPLICATE_REPORTS_FLAG)
    }

    pub fn set_duplicate_reports(&mut self, on: bool) {
        self.set_flag(DUPLICATE_REPORTS_FLAG, on);
    }

    /// Whether the jitter fields carry values.
    pub fn jitter_reports(&self) -> bool {
        self.flag(JITTER_REPORTS_FLAG)
    }

    pub fn set_jitter_reports(&mut self, on: bool) {
        self.set_flag(JITTER_REPORTS_FLAG, on);
    }

    pub fn ttl_or_hop_limit(&self) -> TTLorHopLimitType {
        ((self.view[1] >> TTL_OR_HOP_LIMIT_SHIFT) & TTL_OR_HOP_LIMIT_MASK).into()
    }

    pub fn set_ttl_or_hop_limit(&mut self, toh: TTLorHopLimitType) {
        self.view[1] = (self.view[1] & !(TTL_OR_HOP_LIMIT_MASK << TTL_OR_HOP_LIMIT_SHIFT))
            | ((toh as u8 & TTL_OR_HOP_LIMIT_MASK) << TTL_OR_HOP_LIMIT_SHIFT);
    }

    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc()]
    }

    pub fn dump(&self) -> StatisticsSummaryReportBlockDump {
        StatisticsSummaryReportBlockDump {
            loss_reports: self.loss_reports(),
            duplicate_reports: self.duplicate_reports(),
            jitter_reports: self.jitter_reports(),
            ttl_or_hop_limit: self.ttl_or_hop_limit(),
            ssrc: self.ssrc(),
            begin_seq: self.begin_seq(),
            end_seq: self.end_seq(),
            lost_packets: self.lost_packets(),
            dup_packets: self.dup_packets(),
            min_jitter: self.min_jitter(),
            max_jitter: self.max_jitter(),
            mean_jitter: self.mean_jitter(),
            dev_jitter: self.dev_jitter(),
            min_ttl_or_hl: self.min_ttl_or_hl(),
            max_ttl_or_hl: self.max_ttl_or_hl(),
            mean_ttl_or_hl: self.mean_ttl_or_hl(),
            dev_ttl_or_hl: self.dev_ttl_or_hl(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        false
    }
}

view_accessors!(StatisticsSummaryReportBlock {
    ssrc, set_ssrc: u32 = get_u32, put_u32 @ SSRC_OFFSET;
    begin_seq, set_begin_seq: u16 = get_u16, put_u16 @ 8;
    end_seq, set_end_seq: u16 = get_u16, put_u16 @ 10;
    lost_packets, set_lost_packets: u32 = get_u32, put_u32 @ 12;
    dup_packets, set_dup_packets: u32 = get_u32, put_u32 @ 16;
    min_jitter, set_min_jitter: u32 = get_u32, put_u32 @ 20;
    max_jitter, set_max_jitter: u32 = get_u32, put_u32 @ 24;
    mean_jitter, set_mean_jitter: u32 = get_u32, put_u32 @ 28;
    dev_jitter, set_dev_jitter: u32 = get_u32, put_u32 @ 32;
    min_ttl_or_hl, set_min_ttl_or_hl: u8 = get_u8, put_u8 @ 36;
    max_ttl_or_hl, set_max_ttl_or_hl: u8 = get_u8, put_u8 @ 37;
    mean_ttl_or_hl, set_mean_ttl_or_hl: u8 = get_u8, put_u8 @ 38;
    dev_ttl_or_hl, set_dev_ttl_or_hl: u8 = get_u8, put_u8 @ 39;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsSummaryReportBlockDump {
    pub loss_reports: bool,
    pub duplicate_reports: bool,
    pub jitter_reports: bool,
    pub ttl_or_hop_limit: TTLorHopLimitType,
    pub ssrc: u32,
    pub begin_seq: u16,
    pub end_seq: u16,
    pub lost_packets: u32,
    pub dup_packets: u32,
    pub min_jitter: u32,
    pub max_jitter: u32,
    pub mean_jitter: u32,
    pub dev_jitter: u32,
    pub min_ttl_or_hl: u8,
    pub max_ttl_or_hl: u8,
    pub mean_ttl_or_hl: u8,
    pub dev_ttl_or_hl: u8,
}

impl MarshalSize for StatisticsSummaryReportBlock {
    fn marshal_size(&self) -> usize {
        self.view.len()
    }
}

impl Marshal for StatisticsSummaryReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        buf[..size].copy_from_slice(&self.view);
        Ok(size)
    }
}

impl Unmarshal for StatisticsSummaryReportBlock {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        parse_fixed_block(
            &view,
            BlockType::StatisticsSummary,
            SSR_REPORT_BLOCK_LENGTH,
        )?;
        Ok(StatisticsSummaryReportBlock { view })
    }
}

impl_serializable!(StatisticsSummaryReportBlock);
