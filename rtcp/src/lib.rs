#![warn(rust_2018_idioms)]

#[macro_use]
mod macros;

pub mod compound_packet;
mod error;
pub mod extended_jitter_report;
pub mod extended_report;
pub mod feedback;
pub mod goodbye;
pub mod header;
pub mod packet;
pub mod payload_feedbacks;
pub mod raw_packet;
pub mod receiver_report;
pub mod reception_report;
pub mod sender_report;
pub mod source_description;
pub mod transport_feedbacks;

pub use error::{Error, Result};
pub use packet::{Packet, RtcpPacket};
