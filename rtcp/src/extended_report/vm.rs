use super::*;

const VM_REPORT_BLOCK_LENGTH: usize = XR_HEADER_LENGTH + 32;

/// VoIPMetricsReportBlock encodes a VoIP Metrics Report Block as described
/// in RFC 3611, section 4.7.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=7      |   reserved    |       block length = 8        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   loss rate   | discard rate  | burst density |  gap density  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       burst duration          |         gap duration          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     round trip delay          |       end system delay        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | signal level  |  noise level  |     RERL      |     Gmin      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   R factor    | ext. R factor |    MOS-LQ     |    MOS-CQ     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   RX config   |   reserved    |          JB nominal           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          JB maximum           |          JB abs max           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VoIPMetricsReportBlock {
    view: BytesMut,
}

impl Default for VoIPMetricsReportBlock {
    fn default() -> Self {
        VoIPMetricsReportBlock {
            view: empty_block(BlockType::VoIPMetrics, VM_REPORT_BLOCK_LENGTH),
        }
    }
}

impl fmt::Display for VoIPMetricsReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoIPMetrics {:?}", self.dump())
    }
}

impl VoIPMetricsReportBlock {
    pub fn new() -> Self {
        VoIPMetricsReportBlock::default()
    }

    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc()]
    }

    pub fn dump(&self) -> VoIPMetricsReportBlockDump {
        VoIPMetricsReportBlockDump {
            ssrc: self.ssrc(),
            loss_rate: self.loss_rate(),
            discard_rate: self.discard_rate(),
            burst_density: self.burst_density(),
            gap_density: self.gap_density(),
            burst_duration: self.burst_duration(),
            gap_duration: self.gap_duration(),
            round_trip_delay: self.round_trip_delay(),
            end_system_delay: self.end_system_delay(),
            signal_level: self.signal_level(),
            noise_level: self.noise_level(),
            rerl: self.rerl(),
            gmin: self.gmin(),
            rfactor: self.rfactor(),
            ext_rfactor: self.ext_rfactor(),
            mos_lq: self.mos_lq(),
            mos_cq: self.mos_cq(),
            rx_config: self.rx_config(),
            jb_nominal: self.jb_nominal(),
            jb_maximum: self.jb_maximum(),
            jb_abs_max: self.jb_abs_max(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        false
    }
}

view_accessors!(VoIPMetricsReportBlock {
    ssrc, set_ssrc: u32 = get_u32, put_u32 @ 4;
    loss_rate, set_loss_rate: u8 = get_u8, put_u8 @ 8;
    discard_rate, set_discard_rate: u8 = get_u8, put_u8 @ 9;
    burst_density, set_burst_density: u8 = get_u8, put_u8 @ 10;
    gap_density, set_gap_density: u8 = get_u8, put_u8 @ 11;
    burst_duration, set_burst_duration: u16 = get_u16, put_u16 @ 12;
    gap_duration, set_gap_duration: u16 = get_u16, put_u16 @ 14;
    round_trip_delay, set_round_trip_delay: u16 = get_u16, put_u16 @ 16;
    end_system_delay, set_end_system_delay: u16 = get_u16, put_u16 @ 18;
    signal_level, set_signal_level: u8 = get_u8, put_u8 @ 20;
    noise_level, set_noise_level: u8 = get_u8, put_u8 @ 21;
    /// Residual echo return loss.
    rerl, set_rerl: u8 = get_u8, put_u8 @ 22;
    gmin, set_gmin: u8 = get_u8, put_u8 @ 23;
    rfactor, set_rfactor: u8 = get_u8, put_u8 @ 24;
    ext_rfactor, set_ext_rfactor: u8 = get_u8, put_u8 @ 25;
    mos_lq, set_mos_lq: u8 = get_u8, put_u8 @ 26;
    mos_cq, set_mos_cq: u8 = get_u8, put_u8 @ 27;
    rx_config, set_rx_config: u8 = get_u8, put_u8 @ 28;
    jb_nominal, set_jb_nominal: u16 = get_u16, put_u16 @ 30;
    jb_maximum, set_jb_maximum: u16 = get_u16, put_u16 @ 32;
    jb_abs_max, set_jb_abs_max: u16 = get_u16, put_u16 @ 34;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoIPMetricsReportBlockDump {
    pub ssrc: u32,
    pub loss_rate: u8,
    pub discard_rate: u8,
    pub burst_density: u8,
    pub gap_density: u8,
    pub burst_duration: u16,
    pub gap_duration: u16,
    pub round_trip_delay: u16,
    pub end_system_delay: u16,
    pub signal_level: u8,
    pub noise_level: u8,
    pub rerl: u8,
    pub gmin: u8,
    pub rfactor: u8,
    pub ext_rfactor: u8,
    pub mos_lq: u8,
    pub mos_cq: u8,
    pub rx_config: u8,
    pub jb_nominal: u16,
    pub jb_maximum: u16,
    pub jb_abs_max: u16,
}

impl MarshalSize for VoIPMetricsReportBlock {
    fn marshal_size(&self) -> usize {
        self.view.len()
    }
}

impl Marshal for VoIPMetricsReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        buf[..size].copy_from_slice(&self.view);
        Ok(size)
    }
}

impl Unmarshal for VoIPMetricsReportBlock {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        parse_fixed_block(&view, BlockType::VoIPMetrics, VM_REPORT_BLOCK_LENGTH)?;
        Ok(VoIPMetricsReportBlock { view })
    }
}

impl_serializable!(VoIPMetricsReportBlock);
