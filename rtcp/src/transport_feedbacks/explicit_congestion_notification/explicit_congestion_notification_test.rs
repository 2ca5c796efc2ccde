use util::marshal::{PacketPadding, Serializable};

use super::*;

const VALID: [u8; 32] = [
    0x88, 0xcd, 0x00, 0x07, // v=2, p=0, FMT=8, RTPFB, len=7
    0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
    0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
    0x00, 0x01, 0x12, 0x34, // extended highest seq=0x11234
    0x00, 0x00, 0x00, 0x64, // ect0=100
    0x00, 0x00, 0x00, 0x02, // ect1=2
    0x00, 0x03, 0x00, 0x04, // ce=3, not-ect=4
    0x00, 0x05, 0x00, 0x06, // lost=5, dup=6
];

#[test]
fn test_explicit_congestion_notification_unmarshal() {
    let ecn = ExplicitCongestionNotification::unmarshal_slice(&VALID).unwrap();

    assert_eq!(ecn.sender_ssrc(), 0x902f9e2e);
    assert_eq!(ecn.media_ssrc(), 0x4bc4fcb4);
    assert_eq!(ecn.message_type(), FORMAT_ECN);
    assert_eq!(
        ecn.dump(),
        ExplicitCongestionNotificationDump {
            padding: 0,
            sender_ssrc: 0x902f9e2e,
            media_ssrc: 0x4bc4fcb4,
            extended_highest_sequence: 0x11234,
            ect0_counter: 100,
            ect1_counter: 2,
            ecn_ce_counter: 3,
            not_ect_counter: 4,
            lost_packets_counter: 5,
            duplication_counter: 6,
        }
    );
    assert_eq!(ecn.destination_ssrc(), vec![0x4bc4fcb4]);
}

#[test]
fn test_explicit_congestion_notification_unmarshal_errors() {
    let mut short = VALID[..28].to_vec();
    short[3] = 0x06;

    let mut long = VALID.to_vec();
    long.extend_from_slice(&[0, 0, 0, 0]);
    long[3] = 0x08;

    let mut wrong_fmt = VALID.to_vec();
    wrong_fmt[0] = 0x81;

    let mut wrong_type = VALID.to_vec();
    wrong_type[1] = 0xce;

    let tests = vec![
        ("short fci", short, Error::PacketTooShort),
        ("long fci", long, Error::InvalidLength),
        ("wrong fmt", wrong_fmt, Error::WrongFeedbackType),
        ("wrong type", wrong_type, Error::WrongType),
    ];

    for (name, data, want_error) in tests {
        let got = ExplicitCongestionNotification::unmarshal_slice(&data);
        match got {
            Err(err) => assert_eq!(want_error, err, "Unmarshal {name}"),
            Ok(_) => panic!("Unmarshal {name}: want {want_error:?}"),
        }
    }
}

#[test]
fn test_explicit_congestion_notification_setters() -> Result<()> {
    let mut ecn = ExplicitCongestionNotification::new(0x902f9e2e, 0x4bc4fcb4);
    ecn.set_extended_highest_sequence(0x11234);
    ecn.set_ect0_counter(100);
    ecn.set_ect1_counter(2);
    ecn.set_ecn_ce_counter(3);
    ecn.set_not_ect_counter(4);
    ecn.set_lost_packets_counter(5);
    ecn.set_duplication_counter(6);

    assert!(!ecn.needs_serialization());
    assert_eq!(ecn.view(), &VALID[..]);

    ecn.set_padding(4);
    ecn.serialize()?;
    assert!(!ecn.needs_serialization());
    assert_eq!(ecn.view().len(), 36);
    assert_eq!(ecn.view()[0], 0xa8);
    assert_eq!(ecn.view()[3], 0x08);

    let decoded = ExplicitCongestionNotification::unmarshal_slice(ecn.view())?;
    assert_eq!(decoded.padding(), 4);
    assert_eq!(decoded.duplication_counter(), 6);

    Ok(())
}
