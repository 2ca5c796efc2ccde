#[cfg(test)]
mod error_test;

use thiserror::Error;
use util::ErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Packet contains an invalid header.
    #[error("Invalid header")]
    InvalidHeader,
    /// Packet contains empty compound.
    #[error("Empty compound packet")]
    EmptyCompound,
    /// Invalid first packet in compound packets. First packet
    /// should either be a SenderReport packet or ReceiverReport
    #[error("First packet in compound must be SR or RR")]
    BadFirstPacket,
    /// CNAME was not defined.
    #[error("Compound missing SourceDescription with CNAME")]
    MissingCname,
    /// Packet was defined before CNAME.
    #[error("Feedback packet seen before CNAME")]
    PacketBeforeCname,
    /// Only the last packet of a compound may be padded.
    #[error("Padded packet is not the last in compound")]
    PaddedPacketNotLast,
    /// Too many reports.
    #[error("Too many reports")]
    TooManyReports,
    /// Too many chunks.
    #[error("Too many chunks")]
    TooManyChunks,
    /// Too many sources.
    #[error("too many sources")]
    TooManySources,
    /// Packet received is too short.
    #[error("Packet too short to be read")]
    PacketTooShort,
    /// Buffer is too short.
    #[error("Buffer too short to be written")]
    BufferTooShort,
    /// Wrong packet type.
    #[error("Wrong packet type")]
    WrongType,
    /// SDES received is too long.
    #[error("SDES must be < 255 octets long")]
    SdesTextTooLong,
    /// SDES type is missing.
    #[error("SDES item missing type")]
    SdesMissingType,
    /// Chunk is not closed by a null octet.
    #[error("SDES chunk missing terminator")]
    MissingTerminator,
    /// Reason is too long.
    #[error("Reason must be < 255 octets long")]
    ReasonTooLong,
    /// Invalid packet version.
    #[error("Invalid packet version")]
    BadVersion,
    /// Invalid padding value.
    #[error("Invalid padding value")]
    WrongPadding,
    /// Padding leaves the packet off a 32-bit boundary.
    #[error("Packet length with padding is not a multiple of 4")]
    PaddingNotAligned,
    /// Declared length disagrees with the bytes available.
    #[error("Invalid packet length")]
    InvalidLength,
    /// Wrong feedback message type.
    #[error("Wrong feedback message type")]
    WrongFeedbackType,
    /// RPSI padding must cover whole octets.
    #[error("RPSI padding bits must be a multiple of 8")]
    InvalidPaddingBits,
    /// NACK item cannot reach a sequence number.
    #[error("NACK sequence numbers spread over more than 17 packets")]
    NackSpreadTooLarge,
    /// NACK item requested for no sequence numbers.
    #[error("NACK item needs at least one sequence number")]
    EmptyNackSequence,
    #[error("Wrong chunk type")]
    WrongChunkType,
    /// Report block does not match the constructing type.
    #[error("Wrong report block type")]
    WrongBlockType,
}

impl Error {
    /// Malformed input is found while parsing, or while checking the layout of
    /// packets already parsed. Invalid state is only found when writing.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHeader
            | Error::EmptyCompound
            | Error::BadFirstPacket
            | Error::MissingCname
            | Error::PacketBeforeCname
            | Error::PaddedPacketNotLast
            | Error::PacketTooShort
            | Error::WrongType
            | Error::MissingTerminator
            | Error::BadVersion
            | Error::WrongPadding
            | Error::InvalidLength
            | Error::WrongFeedbackType
            | Error::InvalidPaddingBits
            | Error::WrongBlockType => ErrorKind::MalformedInput,
            Error::TooManyReports
            | Error::TooManyChunks
            | Error::TooManySources
            | Error::BufferTooShort
            | Error::SdesTextTooLong
            | Error::SdesMissingType
            | Error::ReasonTooLong
            | Error::PaddingNotAligned
            | Error::NackSpreadTooLarge
            | Error::EmptyNackSequence
            | Error::WrongChunkType => ErrorKind::InvalidState,
        }
    }
}

impl From<Error> for util::Error {
    fn from(e: Error) -> Self {
        util::Error::from_std(e)
    }
}

impl PartialEq<util::Error> for Error {
    fn eq(&self, other: &util::Error) -> bool {
        if let Some(down) = other.downcast_ref::<Error>() {
            return self == down;
        }
        false
    }
}
