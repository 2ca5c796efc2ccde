use util::marshal::Serializable;

use super::*;

#[test]
fn test_reference_picture_selection_indication_unmarshal() {
    let tests = vec![
        (
            "valid",
            vec![
                0x83u8, 0xce, 0x00, 0x04, // v=2, p=0, FMT=3, PSFB, len=4
                0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
                0x18, 0x60, 0x12, 0x34, // pb=24, pt=96, bits=12 34 56
                0x56, 0x00, 0x00, 0x00,
            ],
            (24u8, 96u8, vec![0x12u8, 0x34, 0x56]),
            None,
        ),
        (
            "empty bit string",
            vec![
                0x83, 0xce, 0x00, 0x03, // v=2, p=0, FMT=3, PSFB, len=3
                0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
                0x10, 0x61, 0x00, 0x00, // pb=16, pt=97
            ],
            (16, 97, vec![]),
            None,
        ),
        (
            "padding bits not a multiple of 8",
            vec![
                0x83, 0xce, 0x00, 0x03, // v=2, p=0, FMT=3, PSFB, len=3
                0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
                0x04, 0x60, 0x12, 0x30, // pb=4
            ],
            (0, 0, vec![]),
            Some(Error::InvalidPaddingBits),
        ),
        (
            "padding bits beyond the fci",
            vec![
                0x83, 0xce, 0x00, 0x03, // v=2, p=0, FMT=3, PSFB, len=3
                0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
                0x18, 0x60, 0x12, 0x30, // pb=24
            ],
            (0, 0, vec![]),
            Some(Error::InvalidPaddingBits),
        ),
        (
            "no fci",
            vec![
                0x83, 0xce, 0x00, 0x02, // v=2, p=0, FMT=3, PSFB, len=2
                0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
            ],
            (0, 0, vec![]),
            Some(Error::PacketTooShort),
        ),
        (
            "pli",
            vec![
                0x81, 0xce, 0x00, 0x03, // v=2, p=0, FMT=1, PSFB, len=3
                0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
                0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
                0x10, 0x61, 0x00, 0x00,
            ],
            (0, 0, vec![]),
            Some(Error::WrongFeedbackType),
        ),
    ];

    for (name, data, (padding_bits, payload_type, bit_string), want_error) in tests {
        let got = ReferencePictureSelectionIndication::unmarshal_slice(&data);

        assert_eq!(
            got.is_err(),
            want_error.is_some(),
            "Unmarshal {name}: err = {got:?}, want {want_error:?}"
        );

        match (got, want_error) {
            (Err(got_err), Some(err)) => assert_eq!(
                err, got_err,
                "Unmarshal {name}: err = {got_err:?}, want {err:?}",
            ),
            (Ok(rpsi), None) => {
                assert_eq!(rpsi.padding_bits(), padding_bits, "Unmarshal {name}: pb");
                assert_eq!(rpsi.payload_type(), payload_type, "Unmarshal {name}: pt");
                assert_eq!(rpsi.bit_string(), &bit_string[..], "Unmarshal {name}: bits");
                assert_eq!(rpsi.media_ssrc(), 0x4bc4fcb4, "Unmarshal {name}: media");
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn test_reference_picture_selection_indication_serialize() -> Result<()> {
    let mut rpsi = ReferencePictureSelectionIndication::new(0x902f9e2e, 0x4bc4fcb4);
    assert_eq!(rpsi.padding_bits(), 16);
    assert!(rpsi.bit_string().is_empty());

    rpsi.set_payload_type(96);
    rpsi.set_bit_string(&[0x12, 0x34, 0x56]);
    assert!(rpsi.needs_serialization());
    assert_eq!(rpsi.padding_bits(), 24);

    rpsi.serialize()?;
    assert!(!rpsi.needs_serialization());
    assert_eq!(
        rpsi.view(),
        &[
            0x83u8, 0xce, 0x00, 0x04, 0x90, 0x2f, 0x9e, 0x2e, 0x4b, 0xc4, 0xfc, 0xb4, 0x18, 0x60,
            0x12, 0x34, 0x56, 0x00, 0x00, 0x00,
        ][..]
    );
    assert_eq!(rpsi.bit_string(), &[0x12, 0x34, 0x56]);

    rpsi.set_bit_string(&[0xaa, 0xbb]);
    rpsi.serialize()?;
    assert_eq!(rpsi.padding_bits(), 0);
    assert_eq!(rpsi.bit_string(), &[0xaa, 0xbb]);
    assert_eq!(rpsi.marshal_size(), 16);

    Ok(())
}

#[test]
fn test_reference_picture_selection_indication_dump() {
    let rpsi = ReferencePictureSelectionIndication::new(1, 2);
    let dump = serde_json::to_value(rpsi.dump()).unwrap();

    assert_eq!(dump["payload_type"], 0);
    assert_eq!(dump["padding_bits"], 16);
    assert_eq!(dump["media_ssrc"], 2);
    assert_eq!(rpsi.message_type(), FORMAT_RPSI);
}
