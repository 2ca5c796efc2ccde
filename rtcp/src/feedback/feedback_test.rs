use bytes::Bytes;
use util::marshal::Serializable;

use super::*;

#[test]
fn test_parse_feedback() {
    let tests = vec![
        (
            "valid",
            vec![
                0x81, 0xce, 0x00, 0x02, // v=2, p=0, FMT=1, PSFB, len=2
                0x00, 0x00, 0x00, 0x00, // sender=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
            ],
            None,
        ),
        (
            "wrong message type",
            vec![
                0x82, 0xce, 0x00, 0x02, // v=2, p=0, FMT=2, PSFB, len=2
                0x00, 0x00, 0x00, 0x00, // sender=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
            ],
            Some(Error::WrongFeedbackType),
        ),
        (
            "wrong packet type",
            vec![
                0x81, 0xcd, 0x00, 0x02, // v=2, p=0, FMT=1, RTPFB, len=2
                0x00, 0x00, 0x00, 0x00, // sender=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
            ],
            Some(Error::WrongType),
        ),
        (
            "missing media ssrc",
            vec![
                0x81, 0xce, 0x00, 0x01, // v=2, p=0, FMT=1, PSFB, len=1
                0x00, 0x00, 0x00, 0x00, // sender=0x0
            ],
            Some(Error::PacketTooShort),
        ),
    ];

    for (name, data, want_error) in tests {
        let got = parse_feedback(&data, PacketType::PayloadSpecificFeedback, FORMAT_PLI);
        assert_eq!(got.err(), want_error, "parse_feedback {name}");
    }
}

#[test]
fn test_raw_feedback_unmarshal() -> Result<()> {
    let data = vec![
        0x8f, 0xce, 0x00, 0x03, // v=2, p=0, FMT=15, PSFB, len=3
        0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
        0x00, 0x00, 0x00, 0x00, // media=0x0
        0x52, 0x45, 0x4d, 0x42, // unique identifier 'R' 'E' 'M' 'B'
    ];
    let fb = RawFeedbackPacket::unmarshal_slice(&data)?;

    assert_eq!(fb.message_type(), FORMAT_AFB);
    assert_eq!(fb.packet_type(), PacketType::PayloadSpecificFeedback);
    assert_eq!(fb.sender_ssrc(), 0x902f9e2e);
    assert_eq!(fb.media_ssrc(), 0);
    assert_eq!(fb.fci(), b"REMB");
    assert_eq!(fb.destination_ssrc(), vec![0]);
    assert_eq!(fb.marshal()?, Bytes::from(data));

    let result = RawFeedbackPacket::unmarshal_slice(&[0x81, 0xc9, 0x00, 0x00]);
    assert_eq!(Error::WrongType, result.unwrap_err());

    let result = RawFeedbackPacket::unmarshal_slice(&[0x81, 0xcd, 0x00, 0x00]);
    assert_eq!(Error::PacketTooShort, result.unwrap_err());

    Ok(())
}

#[test]
fn test_raw_feedback_build() -> Result<()> {
    let mut fb = RawFeedbackPacket::new(PacketType::TransportSpecificFeedback, 31);
    fb.set_sender_ssrc(1);
    fb.set_media_ssrc(2);
    assert!(!fb.needs_serialization());
    assert_eq!(
        fb.view(),
        &[0x9f, 0xcd, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]
    );

    fb.set_fci(&[0xde, 0xad]);
    fb.serialize()?;
    assert_eq!(fb.view().len(), 16);
    assert_eq!(&fb.view()[12..], &[0xde, 0xad, 0x00, 0x00]);
    assert_eq!(fb.header().length, 3);
    assert_eq!(fb.media_ssrc(), 2);

    Ok(())
}
