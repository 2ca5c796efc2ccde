use super::*;

/// UnknownReportBlock is used to store bytes for any report block
/// that has an unknown Report Block Type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UnknownReportBlock {
    view: BytesMut,
    body: Span,
    dirty: bool,
}

impl Default for UnknownReportBlock {
    fn default() -> Self {
        UnknownReportBlock {
            view: empty_block(BlockType::Unknown, XR_HEADER_LENGTH),
            body: Span::mapped(XR_HEADER_LENGTH, 0),
            dirty: false,
        }
    }
}

impl fmt::Display for UnknownReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UnknownReportBlock type {} {:02x?}",
            self.raw_block_type(),
            self.body()
        )
    }
}

impl UnknownReportBlock {
    pub fn new(block_type: u8) -> Self {
        let mut block = UnknownReportBlock::default();
        block.set_raw_block_type(block_type);
        block
    }

    /// The block type octet as found on the wire.
    pub fn raw_block_type(&self) -> u8 {
        self.view[0]
    }

    pub fn set_raw_block_type(&mut self, block_type: u8) {
        self.view[0] = block_type;
    }

    pub fn type_specific(&self) -> TypeSpecificField {
        self.view[1]
    }

    pub fn set_type_specific(&mut self, type_specific: TypeSpecificField) {
        self.view[1] = type_specific;
    }

    /// Everything after the block header.
    pub fn body(&self) -> &[u8] {
        self.body.resolve(&self.view)
    }

    /// The body is zero filled up to a 32-bit boundary when serialized.
    pub fn set_body(&mut self, body: &[u8]) {
        self.body = Span::detached(body);
        self.dirty = true;
    }

    pub fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }

    pub fn dump(&self) -> UnknownReportBlockDump {
        UnknownReportBlockDump {
            block_type: self.raw_block_type(),
            type_specific: self.type_specific(),
            body: self.body().to_vec(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownReportBlockDump {
    pub block_type: u8,
    pub type_specific: u8,
    pub body: Vec<u8>,
}

impl MarshalSize for UnknownReportBlock {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        XR_HEADER_LENGTH + align_to_4(self.body.len())
    }
}

impl Marshal for UnknownReportBlock {
    /// marshal_to encodes the UnknownReportBlock in binary
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

        let body = self.body();
        buf.put_slice(body);
        for _ in body.len()..align_to_4(body.len()) {
            buf.put_u8(0);
        }

        Ok(size)
    }
}

impl Unmarshal for UnknownReportBlock {
    /// Unmarshal decodes the UnknownReportBlock from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        parse_block(&view)?;
        let body = Span::mapped(XR_HEADER_LENGTH, view.len() - XR_HEADER_LENGTH);

        Ok(UnknownReportBlock {
            view,
            body,
            dirty: false,
        })
    }
}

impl_serializable!(UnknownReportBlock);
