use super::*;

const SSRC_OFFSET: usize = XR_HEADER_LENGTH;
const BEGIN_SEQ_OFFSET: usize = SSRC_OFFSET + 4;
const END_SEQ_OFFSET: usize = BEGIN_SEQ_OFFSET + 2;
const CHUNKS_OFFSET: usize = END_SEQ_OFFSET + 2;
const CHUNK_LENGTH: usize = 2;
const THINNING_MASK: u8 = 0x0F;

/// ChunkType enumerates the three kinds of chunks described in RFC 3611 section 4.1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChunkType {
    RunLength = 0,
    BitVector = 1,
    TerminatingNull = 2,
}

/// Chunk as defined in RFC 3611, section 4.1. These represent information
/// about packet losses and packet duplication. They have three representations:
///
/// Run Length Chunk:
///
///   0                   1
///   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  |C|R|        run length         |
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///
/// Bit Vector Chunk:
///
///   0                   1
///   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  |C|        bit vector           |
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///
/// Terminating Null Chunk:
///
///   0                   1
///   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  |0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0|
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Chunk(pub u16);

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk_type() {
            ChunkType::RunLength => {
                let run_type = self.run_type().unwrap_or(0);
                write!(f, "[RunLength type={}, length={}]", run_type, self.value())
            }
            ChunkType::BitVector => write!(f, "[BitVector {:#b}]", self.value()),
            ChunkType::TerminatingNull => write!(f, "[TerminatingNull]"),
        }
    }
}

impl Chunk {
    /// A run of `length` packets that were all received (`run_type` 1) or all lost (0).
    pub fn run_length(run_type: u8, length: u16) -> Self {
        Chunk(((run_type as u16 & 0x01) << 14) | (length & 0x3FFF))
    }

    /// Fifteen packets, most significant bit first, 1 meaning received.
    pub fn bit_vector(bits: u16) -> Self {
        Chunk(0x8000 | (bits & 0x7FFF))
    }

    /// chunk_type returns the ChunkType that this Chunk represents
    pub fn chunk_type(&self) -> ChunkType {
        if self.0 == 0 {
            ChunkType::TerminatingNull
        } else if (self.0 >> 15) == 0 {
            ChunkType::RunLength
        } else {
            ChunkType::BitVector
        }
    }

    /// run_type returns the run_type that this Chunk represents. It is
    /// only valid if ChunkType is RunLengthChunkType.
    pub fn run_type(&self) -> std::result::Result<u8, Error> {
        if self.chunk_type() != ChunkType::RunLength {
            Err(Error::WrongChunkType)
        } else {
            Ok((self.0 >> 14) as u8 & 0x01)
        }
    }

    /// value returns the value represented in this Chunk
    pub fn value(&self) -> u16 {
        match self.chunk_type() {
            ChunkType::RunLength => self.0 & 0x3FFF,
            ChunkType::BitVector => self.0 & 0x7FFF,
            ChunkType::TerminatingNull => 0,
        }
    }
}

/// RLEReportBlock defines the common structure used by both
/// Loss RLE report blocks (RFC 3611 §4.1) and Duplicate RLE
/// report blocks (RFC 3611 §4.2).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  BT = 1 or 2  | rsvd. |   t   |         block length          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          begin_seq            |             end_seq           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          chunk 1              |             chunk 2           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                              ...                              :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          chunk n-1            |             chunk n           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The chunk list ends at the first terminating null chunk or at the end of
/// the block. An odd number of chunks gets a null chunk appended when written.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RLEReportBlock {
    view: BytesMut,
    chunks: Vec<Chunk>,
    dirty: bool,
}

/// LossRLEReportBlock is used to report information about packet
/// losses, as described in RFC 3611, section 4.1
pub type LossRLEReportBlock = RLEReportBlock;

/// DuplicateRLEReportBlock is used to report information about packet
/// duplication, as described in RFC 3611, section 4.2
pub type DuplicateRLEReportBlock = RLEReportBlock;

impl fmt::Display for RLEReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ssrc {:x} seq {}..{} t {}:",
            self.block_type(),
            self.ssrc(),
            self.begin_seq(),
            self.end_seq(),
            self.thinning()
        )?;
        for chunk in &self.chunks {
            write!(f, " {chunk}")?;
        }
        Ok(())
    }
}

impl RLEReportBlock {
    fn new(block_type: BlockType) -> Self {
        RLEReportBlock {
            view: empty_block(block_type, CHUNKS_OFFSET),
            chunks: vec![],
            dirty: false,
        }
    }

    /// An empty Loss RLE block.
    pub fn loss() -> Self {
        RLEReportBlock::new(BlockType::LossRLE)
    }

    /// An empty Duplicate RLE block.
    pub fn duplicate() -> Self {
        RLEReportBlock::new(BlockType::DuplicateRLE)
    }

    pub fn block_type(&self) -> BlockType {
        BlockType::from(self.view[0])
    }

    pub fn is_loss_rle(&self) -> bool {
        self.block_type() == BlockType::LossRLE
    }

    /// The thinning value t: only every 2^t-th sequence number is reported.
    pub fn thinning(&self) -> u8 {
        self.view[1] & THINNING_MASK
    }

    pub fn set_thinning(&mut self, t: u8) {
        self.view[1] = (self.view[1] & !THINNING_MASK) | (t & THINNING_MASK);
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn set_chunks(&mut self, chunks: Vec<Chunk>) {
        self.chunks = chunks;
        self.dirty = true;
    }

    pub fn add_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
        self.dirty = true;
    }

    /// destination_ssrc returns an array of ssrc values that this report block refers to.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.ssrc()]
    }

    pub fn dump(&self) -> RLEReportBlockDump {
        RLEReportBlockDump {
            thinning: self.thinning(),
            ssrc: self.ssrc(),
            begin_seq: self.begin_seq(),
            end_seq: self.end_seq(),
            chunks: self.chunks.clone(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

view_accessors!(RLEReportBlock {
    /// SSRC of the RTP data packet source being reported upon.
    ssrc, set_ssrc: u32 = get_u32, put_u32 @ SSRC_OFFSET;
    /// First sequence number this block reports on.
    begin_seq, set_begin_seq: u16 = get_u16, put_u16 @ BEGIN_SEQ_OFFSET;
    /// One past the last sequence number this block reports on.
    end_seq, set_end_seq: u16 = get_u16, put_u16 @ END_SEQ_OFFSET;
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RLEReportBlockDump {
    pub thinning: u8,
    pub ssrc: u32,
    pub begin_seq: u16,
    pub end_seq: u16,
    pub chunks: Vec<Chunk>,
}

impl MarshalSize for RLEReportBlock {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        CHUNKS_OFFSET + (self.chunks.len() + self.chunks.len() % 2) * CHUNK_LENGTH
    }
}

impl Marshal for RLEReportBlock {
    /// marshal_to encodes the RLEReportBlock in binary
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

        buf.put_slice(&self.view[SSRC_OFFSET..CHUNKS_OFFSET]);
        for chunk in &self.chunks {
            buf.put_u16(chunk.0);
        }
        if self.chunks.len() % 2 != 0 {
            buf.put_u16(0);
        }

        Ok(size)
    }
}

impl Unmarshal for RLEReportBlock {
    /// Unmarshal decodes the RLEReportBlock from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let header = parse_block(&view)?;
        let block_type = BlockType::from(header.block_type);
        if block_type != BlockType::LossRLE && block_type != BlockType::DuplicateRLE {
            return Err(Error::WrongBlockType.into());
        }
        if view.len() < CHUNKS_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let chunks = view[CHUNKS_OFFSET..]
            .chunks_exact(CHUNK_LENGTH)
            .map(|mut c| Chunk(c.get_u16()))
            .take_while(|c| c.chunk_type() != ChunkType::TerminatingNull)
            .collect();

        Ok(RLEReportBlock {
            view,
            chunks,
            dirty: false,
        })
    }
}

impl_serializable!(RLEReportBlock);
