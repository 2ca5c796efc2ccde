#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod bits;
pub mod span;

#[cfg(feature = "buffer")]
pub mod buffer;

#[cfg(feature = "marshal")]
pub mod marshal;

#[cfg(feature = "marshal")]
pub use crate::marshal::{Marshal, MarshalSize, PacketPadding, Serializable, Unmarshal};
pub use crate::span::Span;

mod error;
pub use error::{Error, ErrorKind, Result, StdError};
