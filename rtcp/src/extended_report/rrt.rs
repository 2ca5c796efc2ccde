use super::*;

const RRT_REPORT_BLOCK_LENGTH: usize = XR_HEADER_LENGTH + 8;
const NTP_TIMESTAMP_OFFSET: usize = XR_HEADER_LENGTH;

/// ReceiverReferenceTimeReportBlock encodes a Receiver Reference Time
/// report block as described in RFC 3611 section 4.4.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=4      |   reserved    |       block length = 2        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |              NTP timestamp, most significant word             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             NTP timestamp, least significant word             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReceiverReferenceTimeReportBlock {
    view: BytesMut,
}

impl Default for ReceiverReferenceTimeReportBlock {
    fn default() -> Self {
        ReceiverReferenceTimeReportBlock {
            view: empty_block(BlockType::ReceiverReferenceTime, RRT_REPORT_BLOCK_LENGTH),
        }
    }
}

impl fmt::Display for ReceiverReferenceTimeReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiverReferenceTime ntp {:x}", self.ntp_timestamp())
    }
}

impl ReceiverReferenceTimeReportBlock {
    pub fn new(ntp_timestamp: u64) -> Self {
        let mut rrt = ReceiverReferenceTimeReportBlock::default();
        rrt.set_ntp_timestamp(ntp_timestamp);
        rrt
    }

    /// The block is about the receiver itself, not about any source.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }

    pub fn dump(&self) -> ReceiverReferenceTimeReportBlockDump {
        ReceiverReferenceTimeReportBlockDump {
            ntp_timestamp: self.ntp_timestamp(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        false
    }
}

view_accessors!(ReceiverReferenceTimeReportBlock {
    /// Wallclock time when this block was sent, in NTP format.
    ntp_timestamp, set_ntp_timestamp: u64 = get_u64, put_u64 @ NTP_TIMESTAMP_OFFSET;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverReferenceTimeReportBlockDump {
    pub ntp_timestamp: u64,
}

impl MarshalSize for ReceiverReferenceTimeReportBlock {
    fn marshal_size(&self) -> usize {
        self.view.len()
    }
}

impl Marshal for ReceiverReferenceTimeReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        buf[..size].copy_from_slice(&self.view);
        Ok(size)
    }
}

impl Unmarshal for ReceiverReferenceTimeReportBlock {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        parse_fixed_block(
            &view,
            BlockType::ReceiverReferenceTime,
            RRT_REPORT_BLOCK_LENGTH,
        )?;
        Ok(ReceiverReferenceTimeReportBlock { view })
    }
}

impl_serializable!(ReceiverReferenceTimeReportBlock);
