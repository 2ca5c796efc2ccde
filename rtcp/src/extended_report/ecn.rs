use super::*;

const ECN_REPORT_BLOCK_LENGTH: usize = XR_HEADER_LENGTH + 20;

/// ECNSummaryReportBlock carries the ECN feedback counters of one media
/// sender (RFC 6679 §5.2).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=13     |   Reserved    |         Block Length=5        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | SSRC of Media Sender                                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ECT (0) Counter                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ECT (1) Counter                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ECN-CE Counter                | not-ECT Counter               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Lost Packets Counter          | Duplication Counter           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ECNSummaryReportBlock {
    view: BytesMut,
}

impl Default for ECNSummaryReportBlock {
    fn default() -> Self {
        ECNSummaryReportBlock {
            view: empty_block(BlockType::ECNSummary, ECN_REPORT_BLOCK_LENGTH),
        }
    }
}

impl fmt::Display for ECNSummaryReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ECNSummary {:?}", self.dump())
    }
}

impl ECNSummaryReportBlock {
    pub fn new(ssrc: u32) -> Self {
        let mut ecn = ECNSummaryReportBlock::default();
        ecn.set_ssrc(ssrc);
        ecn
    }

    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc()]
    }

    pub fn dump(&self) -> ECNSummaryReportBlockDump {
        ECNSummaryReportBlockDump {
            ssrc: self.ssrc(),
            ect0_counter: self.ect0_counter(),
            ect1_counter: self.ect1_counter(),
            ecn_ce_counter: self.ecn_ce_counter(),
            not_ect_counter: self.not_ect_counter(),
            lost_packets_counter: self.lost_packets_counter(),
            duplication_counter: self.duplication_counter(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        false
    }
}

view_accessors!(ECNSummaryReportBlock {
    ssrc, set_ssrc: u32 = get_u32, put_u32 @ 4;
    ect0_counter, set_ect0_counter: u32 = get_u32, put_u32 @ 8;
    ect1_counter, set_ect1_counter: u32 = get_u32, put_u32 @ 12;
    ecn_ce_counter, set_ecn_ce_counter: u16 = get_u16, put_u16 @ 16;
    not_ect_counter, set_not_ect_counter: u16 = get_u16, put_u16 @ 18;
    lost_packets_counter, set_lost_packets_counter: u16 = get_u16, put_u16 @ 20;
    duplication_counter, set_duplication_counter: u16 = get_u16, put_u16 @ 22;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ECNSummaryReportBlockDump {
    pub ssrc: u32,
    pub ect0_counter: u32,
    pub ect1_counter: u32,
    pub ecn_ce_counter: u16,
    pub not_ect_counter: u16,
    pub lost_packets_counter: u16,
    pub duplication_counter: u16,
}

impl MarshalSize for ECNSummaryReportBlock {
    fn marshal_size(&self) -> usize {
        self.view.len()
    }
}

impl Marshal for ECNSummaryReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        buf[..size].copy_from_slice(&self.view);
        Ok(size)
    }
}

impl Unmarshal for ECNSummaryReportBlock {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        parse_fixed_block(&view, BlockType::ECNSummary, ECN_REPORT_BLOCK_LENGTH)?;
        Ok(ECNSummaryReportBlock { view })
    }
}

impl_serializable!(ECNSummaryReportBlock);
