use bytes::Bytes;
use util::marshal::Serializable;

use super::*;

#[test]
fn test_picture_loss_indication_unmarshal() {
    let tests = vec![
        (
            "valid",
            Bytes::from_static(&[
                0x81, 0xce, 0x00, 0x02, // v=2, p=0, FMT=1, PSFB, len=2
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
            ]),
            (0x0u32, 0x4bc4fcb4u32),
            None,
        ),
        (
            "packet too short",
            Bytes::from_static(&[0x81, 0xce, 0x00, 0x00]),
            (0, 0),
            Some(Error::PacketTooShort),
        ),
        (
            "invalid header",
            Bytes::from_static(&[
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ]),
            (0, 0),
            Some(Error::BadVersion),
        ),
        (
            "wrong type",
            Bytes::from_static(&[
                0x81, 0xc9, 0x00, 0x02, // v=2, p=0, FMT=1, RR, len=2
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
            ]),
            (0, 0),
            Some(Error::WrongType),
        ),
        (
            "wrong fmt",
            Bytes::from_static(&[
                0x82, 0xce, 0x00, 0x02, // v=2, p=0, FMT=2, PSFB, len=2
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
            ]),
            (0, 0),
            Some(Error::WrongFeedbackType),
        ),
        (
            "with fci",
            Bytes::from_static(&[
                0x81, 0xce, 0x00, 0x03, // v=2, p=0, FMT=1, PSFB, len=3
                0x00, 0x00, 0x00, 0x00, // ssrc=0x0
                0x4b, 0xc4, 0xfc, 0xb4, // ssrc=0x4bc4fcb4
                0x01, 0x02, 0x03, 0x04,
            ]),
            (0, 0),
            Some(Error::InvalidLength),
        ),
    ];

    for (name, data, (sender, media), want_error) in tests {
        let got = PictureLossIndication::unmarshal_slice(&data);

        assert_eq!(
            got.is_err(),
            want_error.is_some(),
            "Unmarshal {name} rr: err = {got:?}, want {want_error:?}"
        );

        match (got, want_error) {
            (Err(got_err), Some(err)) => assert_eq!(
                err, got_err,
                "Unmarshal {name} rr: err = {got_err:?}, want {err:?}",
            ),
            (Ok(pli), None) => {
                assert_eq!(pli.sender_ssrc(), sender, "Unmarshal {name}: sender");
                assert_eq!(pli.media_ssrc(), media, "Unmarshal {name}: media");
                assert_eq!(pli.message_type(), FORMAT_PLI);
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn test_picture_loss_indication_roundtrip() -> Result<()> {
    let tests = vec![
        (
            "valid",
            PictureLossIndication::new(1, 2),
            vec![0x81u8, 0xce, 0x00, 0x02, 0, 0, 0, 1, 0, 0, 0, 2],
        ),
        (
            "also valid",
            PictureLossIndication::new(5000, 6000),
            vec![0x81, 0xce, 0x00, 0x02, 0, 0, 0x13, 0x88, 0, 0, 0x17, 0x70],
        ),
    ];

    for (name, pli, want) in tests {
        let data = pli.marshal()?;
        assert_eq!(&data[..], &want[..], "{name} marshal");

        let decoded = PictureLossIndication::unmarshal_slice(&data)?;
        assert_eq!(decoded, pli, "{name} round trip");
        assert!(!decoded.needs_serialization());
    }

    Ok(())
}

#[test]
fn test_picture_loss_indication_in_place_update() {
    let mut pli = PictureLossIndication::new(1, 2);
    pli.set_media_ssrc(0x4bc4fcb4);

    assert!(!pli.needs_serialization());
    assert_eq!(&pli.view()[8..], &[0x4b, 0xc4, 0xfc, 0xb4]);
    assert_eq!(pli.destination_ssrc(), vec![0x4bc4fcb4]);
    assert_eq!(pli.to_string(), "PictureLossIndication 1 4bc4fcb4");
}
