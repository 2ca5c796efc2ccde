use bytes::Bytes;
use util::marshal::{PacketPadding, Serializable};

use super::*;

#[test]
fn test_extended_jitter_report_unmarshal() {
    let tests = vec![
        (
            "valid",
            vec![
                0x82, 0xc3, 0x00, 0x02, // v=2, p=0, count=2, IJ, len=2
                0x00, 0x00, 0x01, 0x11, // jitter=273
                0x00, 0x00, 0x00, 0x2a, // jitter=42
            ],
            vec![273u32, 42],
            None,
        ),
        (
            "empty",
            vec![
                0x80, 0xc3, 0x00, 0x00, // v=2, p=0, count=0, IJ, len=0
            ],
            vec![],
            None,
        ),
        (
            "padded",
            vec![
                0xa1, 0xc3, 0x00, 0x02, // v=2, p=1, count=1, IJ, len=2
                0x00, 0x00, 0x01, 0x11, // jitter=273
                0x00, 0x00, 0x00, 0x04, // padding=4
            ],
            vec![273],
            None,
        ),
        (
            "count past the end",
            vec![
                0x82, 0xc3, 0x00, 0x01, // v=2, p=0, count=2, IJ, len=1
                0x00, 0x00, 0x01, 0x11, // jitter=273
            ],
            vec![],
            Some(Error::PacketTooShort),
        ),
        (
            "trailing word",
            vec![
                0x81, 0xc3, 0x00, 0x02, // v=2, p=0, count=1, IJ, len=2
                0x00, 0x00, 0x01, 0x11, // jitter=273
                0x00, 0x00, 0x00, 0x2a,
            ],
            vec![],
            Some(Error::InvalidLength),
        ),
        (
            "wrong type",
            vec![
                0x80, 0xc9, 0x00, 0x00, // v=2, p=0, count=0, RR, len=0
            ],
            vec![],
            Some(Error::WrongType),
        ),
    ];

    for (name, data, want, want_error) in tests {
        let got = ExtendedJitterReport::unmarshal_slice(&data);

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
            (Ok(ij), None) => {
                assert_eq!(ij.jitters(), &want[..], "Unmarshal {name}");
                assert_eq!(ij.marshal().unwrap(), Bytes::from(data), "{name} round trip");
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn test_extended_jitter_report_build() -> Result<()> {
    let mut ij = ExtendedJitterReport::new();
    assert_eq!(ij.view(), &[0x80, 0xc3, 0x00, 0x00]);

    ij.set_jitters(vec![273, 42]);
    ij.serialize()?;
    assert_eq!(
        ij.view(),
        &[0x82, 0xc3, 0x00, 0x02, 0x00, 0x00, 0x01, 0x11, 0x00, 0x00, 0x00, 0x2a]
    );
    assert_eq!(ij.count(), 2);
    assert!(ij.destination_ssrc().is_empty());

    ij.set_padding(4);
    ij.serialize()?;
    assert_eq!(ij.view().len(), 16);
    assert_eq!(ij.view()[0], 0xa2);
    assert_eq!(ij.view()[15], 4);

    ij.set_jitters(vec![0; COUNT_MAX + 1]);
    assert_eq!(Error::TooManyReports, ij.serialize().unwrap_err());

    Ok(())
}
