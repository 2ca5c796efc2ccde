use util::marshal::{Serializable, Unmarshal};

use super::*;
use crate::compound_packet::CompoundPacket;
use crate::goodbye::Goodbye;
use crate::transport_feedbacks::transport_layer_nack::create_nack_item;

#[test]
fn test_error_kind() {
    let tests = vec![
        (Error::InvalidHeader, ErrorKind::MalformedInput),
        (Error::EmptyCompound, ErrorKind::MalformedInput),
        (Error::BadFirstPacket, ErrorKind::MalformedInput),
        (Error::MissingCname, ErrorKind::MalformedInput),
        (Error::PacketBeforeCname, ErrorKind::MalformedInput),
        (Error::PaddedPacketNotLast, ErrorKind::MalformedInput),
        (Error::PacketTooShort, ErrorKind::MalformedInput),
        (Error::WrongType, ErrorKind::MalformedInput),
        (Error::MissingTerminator, ErrorKind::MalformedInput),
        (Error::BadVersion, ErrorKind::MalformedInput),
        (Error::WrongPadding, ErrorKind::MalformedInput),
        (Error::InvalidLength, ErrorKind::MalformedInput),
        (Error::WrongFeedbackType, ErrorKind::MalformedInput),
        (Error::InvalidPaddingBits, ErrorKind::MalformedInput),
        (Error::WrongBlockType, ErrorKind::MalformedInput),
        (Error::TooManyReports, ErrorKind::InvalidState),
        (Error::TooManyChunks, ErrorKind::InvalidState),
        (Error::TooManySources, ErrorKind::InvalidState),
        (Error::BufferTooShort, ErrorKind::InvalidState),
        (Error::SdesTextTooLong, ErrorKind::InvalidState),
        (Error::SdesMissingType, ErrorKind::InvalidState),
        (Error::ReasonTooLong, ErrorKind::InvalidState),
        (Error::PaddingNotAligned, ErrorKind::InvalidState),
        (Error::NackSpreadTooLarge, ErrorKind::InvalidState),
        (Error::EmptyNackSequence, ErrorKind::InvalidState),
        (Error::WrongChunkType, ErrorKind::InvalidState),
    ];

    for (err, want) in tests {
        assert_eq!(err.kind(), want, "{err:?}");
    }
}

fn kind_of(err: &util::Error) -> Option<ErrorKind> {
    err.downcast_ref::<Error>().map(Error::kind)
}

#[test]
fn test_error_kind_from_operations() {
    let padded_not_last = [
        0xa0, 0xc9, 0x00, 0x02, // v=2, p=1, count=0, RR, len=2
        0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
        0x00, 0x00, 0x00, 0x04, // padding=4
        0x81, 0xcb, 0x00, 0x01, // BYE, len=1
        0x90, 0x2f, 0x9e, 0x2e,
    ];
    let err = CompoundPacket::unmarshal_slice(&padded_not_last).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::MalformedInput), "{err:?}");

    let err = CompoundPacket::unmarshal_slice(&[]).unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::MalformedInput), "{err:?}");

    let mut bye = Goodbye::default();
    bye.add_source(1);
    bye.set_reason(&[b'a'; 256]);
    let err = bye.serialize().unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::InvalidState), "{err:?}");

    let err = create_nack_item(&[1, 100]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}
