use bytes::Bytes;

/// Location of a variable length field.
///
/// A parsed field is `Mapped` onto the packet's own window. A field set through a
/// mutator is `Detached` until the next serialization maps it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Mapped { offset: usize, len: usize },
    Detached(Bytes),
}

impl Default for Span {
    fn default() -> Self {
        Span::Mapped { offset: 0, len: 0 }
    }
}

impl Span {
    pub fn mapped(offset: usize, len: usize) -> Self {
        Span::Mapped { offset, len }
    }

    pub fn detached(raw: &[u8]) -> Self {
        Span::Detached(Bytes::copy_from_slice(raw))
    }

    /// Resolves the span against the window it was parsed from.
    pub fn resolve<'a>(&'a self, view: &'a [u8]) -> &'a [u8] {
        match self {
            Span::Mapped { offset, len } => &view[*offset..*offset + *len],
            Span::Detached(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Span::Mapped { len, .. } => *len,
            Span::Detached(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Span::Detached(_))
    }
}
