#![warn(rust_2018_idioms)]

// re-export sub-crates
pub use rtcp;
pub use rtp;
pub use util;

use bytes::BytesMut;
use util::marshal::Unmarshal;

/// The content of a datagram read from a port shared by RTP and RTCP.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Datagram {
    Rtp(rtp::Packet),
    Rtcp(Vec<rtcp::Packet>),
}

/// Decodes a datagram from a multiplexed port, telling RTP from RTCP by the
/// second octet (RFC 5761 4).
pub fn demux(raw: BytesMut) -> util::Result<Datagram> {
    if rtcp::header::is_rtcp(&raw) {
        Ok(Datagram::Rtcp(rtcp::packet::unmarshal(raw)?))
    } else if rtp::header::is_rtp(&raw) {
        Ok(Datagram::Rtp(rtp::Packet::unmarshal(raw)?))
    } else {
        log::debug!("dropping {} octets that are neither RTP nor RTCP", raw.len());
        Err(util::Error::Other(
            "datagram is neither RTP nor RTCP".to_owned(),
        ))
    }
}
