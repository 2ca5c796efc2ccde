use super::*;

const SSRC_OFFSET: usize = XR_HEADER_LENGTH;
const BEGIN_SEQ_OFFSET: usize = SSRC_OFFSET + 4;
const END_SEQ_OFFSET: usize = BEGIN_SEQ_OFFSET + 2;
const RECEIPT_TIMES_OFFSET: usize = END_SEQ_OFFSET + 2;
const RECEIPT_TIME_LENGTH: usize = 4;
const THINNING_MASK: u8 = 0x0F;

/// PacketReceiptTimesReportBlock represents a Packet Receipt Times
/// report block, as described in RFC 3611 section 4.3.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=3      | rsvd. |   t   |         block length          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          begin_seq            |             end_seq           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Receipt time of packet begin_seq                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Receipt time of packet (begin_seq + 1) mod 65536        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                              ...                              :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Receipt time of packet (end_seq - 1) mod 65536          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketReceiptTimesReportBlock {
    view: BytesMut,
    receipt_times: Vec<u32>,
    dirty: bool,
}

impl Default for PacketReceiptTimesReportBlock {
    fn default() -> Self {
        PacketReceiptTimesReportBlock {
            view: empty_block(BlockType::PacketReceiptTimes, RECEIPT_TIMES_OFFSET),
            receipt_times: vec![],
            dirty: false,
        }
    }
}

impl fmt::Display for PacketReceiptTimesReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PacketReceiptTimes ssrc {:x} seq {}..{} t {}: {:?}",
            self.ssrc(),
            self.begin_seq(),
            self.end_seq(),
            self.thinning(),
            self.receipt_times
        )
    }
}

impl PacketReceiptTimesReportBlock {
    pub fn new() -> Self {
        PacketReceiptTimesReportBlock::default()
    }

    pub fn thinning(&self) -> u8 {
        self.view[1] & THINNING_MASK
    }

    pub fn set_thinning(&mut self, t: u8) {
        self.view[1] = (self.view[1] & !THINNING_MASK) | (t & THINNING_MASK);
    }

    /// Arrival times of the reported packets, in RTP timestamp units.
    pub fn receipt_times(&self) -> &[u32] {
        &self.receipt_times
    }

    pub fn set_receipt_times(&mut self, receipt_times: Vec<u32>) {
        self.receipt_times = receipt_times;
        self.dirty = true;
    }

    pub fn add_receipt_time(&mut self, receipt_time: u32) {
        self.receipt_times.push(receipt_time);
        self.dirty = true;
    }

    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc()]
    }

    pub fn dump(&self) -> PacketReceiptTimesReportBlockDump {
        PacketReceiptTimesReportBlockDump {
            thinning: self.thinning(),
            ssrc: self.ssrc(),
            begin_seq: self.begin_seq(),
            end_seq: self.end_seq(),
            receipt_times: self.receipt_times.clone(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

view_accessors!(PacketReceiptTimesReportBlock {
    ssrc, set_ssrc: u32 = get_u32, put_u32 @ SSRC_OFFSET;
    begin_seq, set_begin_seq: u16 = get_u16, put_u16 @ BEGIN_SEQ_OFFSET;
    end_seq, set_end_seq: u16 = get_u16, put_u16 @ END_SEQ_OFFSET;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketReceiptTimesReportBlockDump {
    pub thinning: u8,
    pub ssrc: u32,
    pub begin_seq: u16,
    pub end_seq: u16,
    pub receipt_times: Vec<u32>,
}

impl MarshalSize for PacketReceiptTimesReportBlock {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        RECEIPT_TIMES_OFFSET + self.receipt_times.len() * RECEIPT_TIME_LENGTH
    }
}

impl Marshal for PacketReceiptTimesReportBlock {
    /// marshal_to encodes the PacketReceiptTimesReportBlock in binary
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

        buf.put_slice(&self.view[SSRC_OFFSET..RECEIPT_TIMES_OFFSET]);
        for receipt_time in &self.receipt_times {
            buf.put_u32(*receipt_time);
        }

        Ok(size)
    }
}

impl Unmarshal for PacketReceiptTimesReportBlock {
    /// Unmarshal decodes the PacketReceiptTimesReportBlock from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let header = parse_block(&view)?;
        if header.block_type != BlockType::PacketReceiptTimes as u8 {
            return Err(Error::WrongBlockType.into());
        }
        if view.len() < RECEIPT_TIMES_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let receipt_times = view[RECEIPT_TIMES_OFFSET..]
            .chunks_exact(RECEIPT_TIME_LENGTH)
            .map(|mut t| t.get_u32())
            .collect();

        Ok(PacketReceiptTimesReportBlock {
            view,
            receipt_times,
            dirty: false,
        })
    }
}

impl_serializable!(PacketReceiptTimesReportBlock);
