use super::*;

const DLRR_REPORT_LENGTH: usize = 12;
const LAST_RR_OFFSET: usize = 4;
const DLRR_OFFSET: usize = 8;

/// DLRRReport encodes a single report inside a DLRRReportBlock.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DLRRReport {
    view: BytesMut,
}

impl Default for DLRRReport {
    fn default() -> Self {
        DLRRReport {
            view: BytesMut::zeroed(DLRR_REPORT_LENGTH),
        }
    }
}

impl fmt::Display for DLRRReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ssrc {:x} last_rr {:x} dlrr {}]",
            self.ssrc(),
            self.last_rr(),
            self.dlrr()
        )
    }
}

impl DLRRReport {
    pub fn new(ssrc: u32, last_rr: u32, dlrr: u32) -> Self {
        let mut report = DLRRReport::default();
        report.set_ssrc(ssrc);
        report.set_last_rr(last_rr);
        report.set_dlrr(dlrr);
        report
    }

    pub fn dump(&self) -> DLRRReportDump {
        DLRRReportDump {
            ssrc: self.ssrc(),
            last_rr: self.last_rr(),
            dlrr: self.dlrr(),
        }
    }
}

view_accessors!(DLRRReport {
    /// Receiver whose RRT block is answered.
    ssrc, set_ssrc: u32 = get_u32, put_u32 @ 0;
    /// Middle 32 bits of the NTP timestamp of that RRT block.
    last_rr, set_last_rr: u32 = get_u32, put_u32 @ LAST_RR_OFFSET;
    /// Delay since receiving it, in units of 1/65536 seconds.
    dlrr, set_dlrr: u32 = get_u32, put_u32 @ DLRR_OFFSET;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DLRRReportDump {
    pub ssrc: u32,
    pub last_rr: u32,
    pub dlrr: u32,
}

/// DLRRReportBlock encodes a DLRR Report Block as described in
/// RFC 3611 section 4.5.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=5      |   reserved    |         block length          |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                 SSRC_1 (ssrc of first receiver)               | sub-
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+ block
/// |                         last RR (LRR)                         |   1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   delay since last RR (DLRR)                  |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                 SSRC_2 (ssrc of second receiver)              | sub-
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+ block
/// :                               ...                             :   2
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DLRRReportBlock {
    view: BytesMut,
    reports: Vec<DLRRReport>,
    dirty: bool,
}

impl Default for DLRRReportBlock {
    fn default() -> Self {
        DLRRReportBlock {
            view: empty_block(BlockType::DLRR, XR_HEADER_LENGTH),
            reports: vec![],
            dirty: false,
        }
    }
}

impl fmt::Display for DLRRReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DLRR")?;
        for report in &self.reports {
            write!(f, " {report}")?;
        }
        Ok(())
    }
}

impl DLRRReportBlock {
    pub fn new() -> Self {
        DLRRReportBlock::default()
    }

    pub fn reports(&self) -> &[DLRRReport] {
        &self.reports
    }

    /// Gives write access to the sub-reports; the block is re-serialized afterwards.
    pub fn reports_mut(&mut self) -> &mut Vec<DLRRReport> {
        self.dirty = true;
        &mut self.reports
    }

    pub fn set_reports(&mut self, reports: Vec<DLRRReport>) {
        self.reports = reports;
        self.dirty = true;
    }

    pub fn add_report(&mut self, report: DLRRReport) {
        self.reports.push(report);
        self.dirty = true;
    }

    /// destination_ssrc returns an array of ssrc values that this report block refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(DLRRReport::ssrc).collect()
    }

    pub fn dump(&self) -> DLRRReportBlockDump {
        DLRRReportBlockDump {
            reports: self.reports.iter().map(DLRRReport::dump).collect(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DLRRReportBlockDump {
    pub reports: Vec<DLRRReportDump>,
}

impl MarshalSize for DLRRReportBlock {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        XR_HEADER_LENGTH + self.reports.len() * DLRR_REPORT_LENGTH
    }
}

impl Marshal for DLRRReportBlock {
    /// marshal_to encodes the DLRRReportBlock in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }

        let n = marshal_block_header(buf, self.view[0], self.view[1], size)?;
        buf = &mut buf[n..];

        for report in &self.reports {
            buf.put_slice(&report.view);
        }

        Ok(size)
    }
}

impl Unmarshal for DLRRReportBlock {
    /// Unmarshal decodes the DLRRReportBlock from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let header = parse_block(&view)?;
        if header.block_type != BlockType::DLRR as u8 {
            return Err(Error::WrongBlockType.into());
        }

        let body = &view[XR_HEADER_LENGTH..];
        if body.len() % DLRR_REPORT_LENGTH != 0 {
            return Err(Error::InvalidLength.into());
        }

        let reports = body
            .chunks_exact(DLRR_REPORT_LENGTH)
            .map(|report| DLRRReport {
                view: BytesMut::from(report),
            })
            .collect();

        Ok(DLRRReportBlock {
            view,
            reports,
            dirty: false,
        })
    }
}

impl_serializable!(DLRRReportBlock);
