
use bytes::{Bytes, BytesMut};

use crate::buffer::get_padding_size;
use crate::error::{Error, Result};

pub trait MarshalSize {
    /// Number of bytes the value occupies once written, computed without mutating it.
    fn marshal_size(&self) -> usize;
}

pub trait Marshal: MarshalSize {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize>;

    fn marshal(&self) -> Result<Bytes> {
        let l = self.marshal_size();
        let mut buf = BytesMut::with_capacity(l);
        buf.resize(l, 0);
        let n = self.marshal_to(&mut buf)?;
        if n != l {
            Err(Error::ErrWrongMarshalSize(n, l))
        } else {
            Ok(buf.freeze())
        }
    }
}

pub trait Unmarshal: Sized + MarshalSize {
    /// Parses `view` eagerly and keeps it as the backing window of the new value.
    fn unmarshal(view: BytesMut) -> Result<Self>;

    fn unmarshal_slice(raw: &[u8]) -> Result<Self> {
        Self::unmarshal(BytesMut::from(raw))
    }
}

/// A value backed by a byte window that is read lazily and rewritten on demand.
///
/// Fixed width setters patch the window directly. Everything else only records the
/// change and raises the dirty flag, which `serialize` clears by writing the whole
/// value into a new window.
///
/// The destination handed to `serialize_into` is moved in, so it can never be the
/// window the value is currently reading from:
///
/// ```compile_fail
/// use bytes::BytesMut;
/// use util::Serializable;
///
/// fn alias<S: Serializable>(s: &mut S) {
///     let own = s.view();
///     let _ = s.serialize_into(BytesMut::from(own));
///     println!("{}", own.len());
/// }
/// ```
pub trait Serializable: Marshal + Unmarshal {
    /// The bytes currently backing the value.
    fn view(&self) -> &[u8];

    /// True when at least one mutation has not been written to the window yet.
    fn needs_serialization(&self) -> bool;

    /// Writes the value into a fresh zero-filled window and adopts it.
    fn serialize(&mut self) -> Result<()> {
        let dest = BytesMut::zeroed(self.marshal_size());
        self.serialize_into(dest).map(|_| ())
    }

    /// Writes the value into the front of `dest` and adopts that region as the new window.
    ///
    /// Returns the unused tail of `dest`.
    fn serialize_into(&mut self, mut dest: BytesMut) -> Result<BytesMut> {
        let l = self.marshal_size();
        if dest.len() < l {
            return Err(Error::ErrBufferShort);
        }
        let rest = dest.split_off(l);
        dest.fill(0);

        let n = self.marshal_to(&mut dest)?;
        if n != l {
            return Err(Error::ErrWrongMarshalSize(n, l));
        }

        *self = Self::unmarshal(dest)?;
        Ok(rest)
    }

    /// Returns an independent copy, serializing first when there are pending mutations.
    fn cloned(&mut self) -> Result<Self> {
        if self.needs_serialization() {
            self.serialize()?;
        }
        Self::unmarshal_slice(self.view())
    }

    /// Like `cloned`, but copies into the front of `dest` and returns the unused tail.
    fn clone_to(&mut self, mut dest: BytesMut) -> Result<(Self, BytesMut)> {
        if self.needs_serialization() {
            self.serialize()?;
        }
        let l = self.view().len();
        if dest.len() < l {
            return Err(Error::ErrBufferShort);
        }
        let rest = dest.split_off(l);
        dest.copy_from_slice(self.view());

        Ok((Self::unmarshal(dest)?, rest))
    }
}

/// Trailing padding shared by RTP and RTCP packets.
pub trait PacketPadding: MarshalSize {
    fn padding(&self) -> u8;

    fn set_padding(&mut self, padding: u8);

    /// Adjusts the padding count so that `marshal_size` becomes a multiple of 4.
    fn pad_to_4_bytes(&mut self) {
        let len = self.marshal_size();
        if len % 4 == 0 {
            return;
        }

        let unpadded = len - self.padding() as usize;
        self.set_padding(get_padding_size(unpadded) as u8);
    }
}
