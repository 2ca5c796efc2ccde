use util::marshal::Serializable;

use super::*;

const BLOCK: [u8; 24] = [
    // ssrc=0x902f9e2e
    0x90, 0x2f, 0x9e, 0x2e, // fracLost=0x81, totalLost=0xffffff (-1)
    0x81, 0xff, 0xff, 0xff, // lastSeq=0x46e1
    0x00, 0x00, 0x46, 0xe1, // jitter=273
    0x00, 0x00, 0x01, 0x11, // lsr=0x9f36432
    0x09, 0xf3, 0x64, 0x32, // delay=150137
    0x00, 0x02, 0x4a, 0x79,
];

#[test]
fn test_reception_report_unmarshal() {
    let tests = vec![
        ("valid", BLOCK.to_vec(), None),
        ("short", BLOCK[..20].to_vec(), Some(Error::PacketTooShort)),
        ("long", [&BLOCK[..], &[0u8; 4][..]].concat(), Some(Error::InvalidLength)),
    ];

    for (name, data, want_error) in tests {
        let got = ReceptionReport::unmarshal_slice(&data);

        assert_eq!(
            got.is_err(),
            want_error.is_some(),
            "Unmarshal {name}: err = {got:?}, want {want_error:?}"
        );

        if let Some(err) = want_error {
            let got_err = got.err().unwrap();
            assert_eq!(
                err, got_err,
                "Unmarshal {name}: err = {got_err:?}, want {err:?}",
            );
        }
    }
}

#[test]
fn test_reception_report_fields() -> Result<()> {
    let report = ReceptionReport::unmarshal_slice(&BLOCK)?;

    assert_eq!(report.ssrc(), 0x902f9e2e);
    assert_eq!(report.fraction_lost(), 0x81);
    assert_eq!(report.total_lost(), -1);
    assert_eq!(report.last_sequence_number(), 0x46e1);
    assert_eq!(report.jitter(), 273);
    assert_eq!(report.last_sender_report(), 0x9f36432);
    assert_eq!(report.delay(), 150137);
    assert!(!report.needs_serialization());
    assert_eq!(report.marshal()?, &BLOCK[..]);

    Ok(())
}

#[test]
fn test_reception_report_setters_write_in_place() -> Result<()> {
    let mut report = ReceptionReport::new();
    report.set_ssrc(0x902f9e2e);
    report.set_fraction_lost(0x81);
    report.set_total_lost(-1);
    report.set_last_sequence_number(0x46e1);
    report.set_jitter(273);
    report.set_last_sender_report(0x9f36432);
    report.set_delay(150137);

    assert!(!report.needs_serialization());
    assert_eq!(report.view(), &BLOCK[..]);

    report.set_total_lost(1 << 24);
    assert_eq!(report.total_lost(), (1 << 23) - 1);
    report.set_total_lost(i32::MIN);
    assert_eq!(report.total_lost(), -(1 << 23));

    Ok(())
}

#[test]
fn test_parse_reports() {
    let mut raw = vec![0u8; 4];
    raw.extend_from_slice(&BLOCK);
    raw.extend_from_slice(&BLOCK);

    let reports = parse_reports(&raw, 4, 2).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].delay(), 150137);

    assert_eq!(parse_reports(&raw, 4, 3), Err(Error::PacketTooShort));
}

#[test]
fn test_reception_report_dump() -> Result<()> {
    let report = ReceptionReport::unmarshal_slice(&BLOCK)?;
    let json = serde_json::to_value(report.dump()).unwrap();
    assert_eq!(json["total_lost"], -1);
    assert_eq!(json["jitter"], 273);

    Ok(())
}
