
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use util::buffer::put_padding;
use util::marshal::{Marshal, MarshalSize};

use crate::error::Error;

/// PacketType specifies the type of an RTCP packet
/// RTCP packet types registered with IANA. See: https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-4
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    #[default]
    Unsupported = 0,
    ExtendedJitterReport = 195,      // RFC 5450
    SenderReport = 200,              // RFC 3550, 6.4.1
    ReceiverReport = 201,            // RFC 3550, 6.4.2
    SourceDescription = 202,         // RFC 3550, 6.5
    Goodbye = 203,                   // RFC 3550, 6.6
    ApplicationDefined = 204,        // RFC 3550, 6.7 (decoded as a raw packet)
    TransportSpecificFeedback = 205, // RFC 4585, 6051
    PayloadSpecificFeedback = 206,   // RFC 4585, 6.3
    ExtendedReport = 207,            // RFC 3611
}

/// Transport and Payload specific feedback messages overload the count field to act as a message type. those are listed here
pub const FORMAT_TLN: u8 = 1;
/// Transport and Payload specific feedback messages overload the count field to act as a message type. those are listed here
pub const FORMAT_RRR: u8 = 5;
/// Transport and Payload specific feedback messages overload the count field to act as a message type. those are listed here
pub const FORMAT_ECN: u8 = 8;
/// Transport and Payload specific feedback messages overload the count field to act as a message type. those are listed here
pub const FORMAT_PLI: u8 = 1;
/// Transport and Payload specific feedback messages overload the count field to act as a message type. those are listed here
pub const FORMAT_SLI: u8 = 2;
/// Transport and Payload specific feedback messages overload the count field to act as a message type. those are listed here
pub const FORMAT_RPSI: u8 = 3;
/// Application layer feedback (RFC 4585 6.4), decoded as a raw feedback packet.
pub const FORMAT_AFB: u8 = 15;

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PacketType::Unsupported => "Unsupported",
            PacketType::ExtendedJitterReport => "IJ",
            PacketType::SenderReport => "SR",
            PacketType::ReceiverReport => "RR",
            PacketType::SourceDescription => "SDES",
            PacketType::Goodbye => "BYE",
            PacketType::ApplicationDefined => "APP",
            PacketType::TransportSpecificFeedback => "RTPFB",
            PacketType::PayloadSpecificFeedback => "PSFB",
            PacketType::ExtendedReport => "XR",
        };
        write!(f, "{s}")
    }
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            195 => PacketType::ExtendedJitterReport,      // RFC 5450
            200 => PacketType::SenderReport,              // RFC 3550, 6.4.1
            201 => PacketType::ReceiverReport,            // RFC 3550, 6.4.2
            202 => PacketType::SourceDescription,         // RFC 3550, 6.5
            203 => PacketType::Goodbye,                   // RFC 3550, 6.6
            204 => PacketType::ApplicationDefined,        // RFC 3550, 6.7
            205 => PacketType::TransportSpecificFeedback, // RFC 4585, 6051
            206 => PacketType::PayloadSpecificFeedback,   // RFC 4585, 6.3
            207 => PacketType::ExtendedReport,            // RFC 3611
            _ => PacketType::Unsupported,
        }
    }
}

pub const RTP_VERSION: u8 = 2;
pub const VERSION_SHIFT: u8 = 6;
pub const VERSION_MASK: u8 = 0x3;
pub const PADDING_SHIFT: u8 = 5;
pub const PADDING_MASK: u8 = 0x1;
pub const COUNT_SHIFT: u8 = 0;
pub const COUNT_MASK: u8 = 0x1f;

pub const HEADER_LENGTH: usize = 4;
pub const COUNT_MAX: usize = (1 << 5) - 1;
pub const SSRC_LENGTH: usize = 4;
pub const SDES_MAX_OCTET_COUNT: usize = (1 << 8) - 1;

/// Second octets 192..=223 are RTCP packet types (RFC 5761 4).
pub const PACKET_TYPE_RANGE: std::ops::RangeInclusive<u8> = 192..=223;

/// A Header is the common header shared by all RTCP packets
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Header {
    /// If the padding bit is set, this individual RTCP packet contains
    /// some additional padding octets at the end which are not part of
    /// the control information but are included in the length field.
    pub padding: bool,
    /// The number of reception reports, sources contained or FMT in this packet (depending on the Type)
    pub count: u8,
    /// The RTCP packet type for this packet
    pub packet_type: PacketType,
    /// The length of this RTCP packet in 32-bit words minus one,
    /// including the header and any padding.
    pub length: u16,
}

impl Header {
    /// Decodes the first four octets of `raw`. Only the version is checked.
    pub fn parse(raw: &[u8]) -> Result<Self, Error> {
        if raw.len() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }

        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|    RC   |      PT       |             length            |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        let mut reader = raw;
        let b0 = reader.get_u8();
        let version = (b0 >> VERSION_SHIFT) & VERSION_MASK;
        if version != RTP_VERSION {
            return Err(Error::BadVersion);
        }

        let padding = ((b0 >> PADDING_SHIFT) & PADDING_MASK) > 0;
        let count = (b0 >> COUNT_SHIFT) & COUNT_MASK;
        let packet_type = PacketType::from(reader.get_u8());
        let length = reader.get_u16();

        Ok(Header {
            padding,
            count,
            packet_type,
            length,
        })
    }

    /// The header a packet of `size` octets would be written with.
    pub(crate) fn describe(packet_type: PacketType, count: u8, size: usize, padding: u8) -> Self {
        Header {
            padding: padding > 0,
            count,
            packet_type,
            length: (size / 4).saturating_sub(1) as u16,
        }
    }
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH
    }
}

impl Marshal for Header {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize, util::Error> {
        put_header(
            buf,
            self.padding,
            self.count,
            self.packet_type as u8,
            self.length,
        )?;
        Ok(HEADER_LENGTH)
    }
}

fn put_header(
    mut buf: &mut [u8],
    padding: bool,
    count: u8,
    packet_type: u8,
    length: u16,
) -> Result<(), Error> {
    if count as usize > COUNT_MAX {
        return Err(Error::InvalidHeader);
    }
    if buf.remaining_mut() < HEADER_LENGTH {
        return Err(Error::BufferTooShort);
    }

    let b0 = (RTP_VERSION << VERSION_SHIFT)
        | ((padding as u8) << PADDING_SHIFT)
        | (count << COUNT_SHIFT);

    buf.put_u8(b0);
    buf.put_u8(packet_type);
    buf.put_u16(length);

    Ok(())
}

/// Validates the common header of a whole packet view and returns it along with
/// the trailing padding count.
///
/// The view must hold exactly the number of words the length field declares.
pub(crate) fn parse_common(
    view: &[u8],
    expected: Option<PacketType>,
) -> Result<(Header, u8), Error> {
    let header = Header::parse(view)?;
    if !PACKET_TYPE_RANGE.contains(&view[1]) {
        return Err(Error::InvalidHeader);
    }
    if view.len() % 4 != 0 || (header.length as usize + 1) * 4 != view.len() {
        return Err(Error::InvalidLength);
    }
    if let Some(expected) = expected {
        if header.packet_type != expected {
            return Err(Error::WrongType);
        }
    }

    let padding = if header.padding {
        let p = view[view.len() - 1];
        if p == 0 || p as usize > view.len() - HEADER_LENGTH {
            return Err(Error::WrongPadding);
        }
        p
    } else {
        0
    };

    Ok((header, padding))
}

/// Writes the common header of a packet that occupies `size` octets, plus its
/// trailing padding. The body goes between the two.
pub(crate) fn marshal_header(
    buf: &mut [u8],
    size: usize,
    count: u8,
    packet_type: u8,
    padding: u8,
) -> Result<usize, Error> {
    if buf.len() < size {
        return Err(Error::BufferTooShort);
    }
    if size % 4 != 0 {
        return Err(Error::PaddingNotAligned);
    }
    let length = size / 4 - 1;
    if length > u16::MAX as usize {
        return Err(Error::InvalidLength);
    }

    put_header(buf, padding > 0, count, packet_type, length as u16)?;
    put_padding(&mut buf[size - padding as usize..size], padding as usize);

    Ok(HEADER_LENGTH)
}

/// A zeroed packet of `size` octets with only the common header filled in.
pub(crate) fn empty_view(packet_type: PacketType, count: u8, size: usize) -> BytesMut {
    let mut view = BytesMut::zeroed(size);
    view[0] = (RTP_VERSION << VERSION_SHIFT) | (count & COUNT_MASK);
    view[1] = packet_type as u8;
    (&mut view[2..]).put_u16((size / 4 - 1) as u16);
    view
}

/// Tells RTCP from RTP on a multiplexed port (RFC 5761 4).
pub fn is_rtcp(raw: &[u8]) -> bool {
    raw.len() >= HEADER_LENGTH
        && (raw[0] >> VERSION_SHIFT) & VERSION_MASK == RTP_VERSION
        && PACKET_TYPE_RANGE.contains(&raw[1])
}

/// The packet type of the first packet in `raw`, if it looks like RTCP.
pub fn rtcp_packet_type(raw: &[u8]) -> Option<PacketType> {
    if is_rtcp(raw) {
        Some(PacketType::from(raw[1]))
    } else {
        None
    }
}

/// Size in octets of the first packet in `raw` according to its length field.
pub fn rtcp_length(raw: &[u8]) -> Option<usize> {
    if is_rtcp(raw) {
        Some(((raw[2] as usize) << 8 | raw[3] as usize) * 4 + 4)
    } else {
        None
    }
}
