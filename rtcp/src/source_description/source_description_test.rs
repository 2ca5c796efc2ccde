use bytes::Bytes;
use util::marshal::Serializable;

use super::*;

#[test]
fn test_source_description_unmarshal() {
    let tests: Vec<(&str, Vec<u8>, Vec<(u32, Vec<(SdesType, &[u8])>)>, Option<Error>)> = vec![
        ("nil", vec![], vec![], Some(Error::PacketTooShort)),
        (
            "no chunks",
            vec![
                // v=2, p=0, count=0, SDES, len=0
                0x80, 0xca, 0x00, 0x00,
            ],
            vec![],
            None,
        ),
        (
            "missing type",
            vec![
                // v=2, p=0, count=1, SDES, len=1
                0x81, 0xca, 0x00, 0x01, // ssrc=0x00000000
                0x00, 0x00, 0x00, 0x00,
            ],
            vec![],
            Some(Error::MissingTerminator),
        ),
        (
            "short cname",
            vec![
                // v=2, p=0, count=1, SDES, len=2
                0x81, 0xca, 0x00, 0x02, // ssrc=0x00000000
                0x00, 0x00, 0x00, 0x00, // CNAME, len=5, content cut short
                0x01, 0x05, 0x41, 0x42,
            ],
            vec![],
            Some(Error::PacketTooShort),
        ),
        (
            "no end",
            vec![
                // v=2, p=0, count=1, SDES, len=2
                0x81, 0xca, 0x00, 0x02, // ssrc=0x00000000
                0x00, 0x00, 0x00, 0x00, // CNAME, len=2, content=AB
                0x01, 0x02, 0x41, 0x42,
                // Missing END
            ],
            vec![],
            Some(Error::MissingTerminator),
        ),
        (
            "zero item chunk",
            vec![
                // v=2, p=0, count=1, SDES, len=2
                0x81, 0xca, 0x00, 0x02, // ssrc=0x01020304
                0x01, 0x02, 0x03, 0x04, // END + padding
                0x00, 0x00, 0x00, 0x00,
            ],
            vec![(0x01020304, vec![])],
            None,
        ),
        (
            "wrong type",
            vec![
                // v=2, p=0, count=1, SR, len=2
                0x81, 0xc8, 0x00, 0x02, // ssrc=0x01020304
                0x01, 0x02, 0x03, 0x04, // END + padding
                0x00, 0x00, 0x00, 0x00,
            ],
            vec![],
            Some(Error::WrongType),
        ),
        (
            "bad count in header",
            vec![
                // v=2, p=0, count=1, SDES, len=0
                0x81, 0xca, 0x00, 0x00,
            ],
            vec![],
            Some(Error::PacketTooShort),
        ),
        (
            "leftover chunk",
            vec![
                // v=2, p=0, count=1, SDES, len=4
                0x81, 0xca, 0x00, 0x04, // ssrc=0x01020304
                0x01, 0x02, 0x03, 0x04, // END + padding
                0x00, 0x00, 0x00, 0x00, // ssrc=0x05060708
                0x05, 0x06, 0x07, 0x08, // END + padding
                0x00, 0x00, 0x00, 0x00,
            ],
            vec![],
            Some(Error::InvalidLength),
        ),
        (
            "empty string",
            vec![
                // v=2, p=0, count=1, SDES, len=2
                0x81, 0xca, 0x00, 0x02, // ssrc=0x01020304
                0x01, 0x02, 0x03, 0x04, // CNAME, len=0
                0x01, 0x00, // END + padding
                0x00, 0x00,
            ],
            vec![(0x01020304, vec![(SdesType::SdesCname, &b""[..])])],
            None,
        ),
        (
            "two items",
            vec![
                // v=2, p=0, count=1, SDES, len=3
                0x81, 0xca, 0x00, 0x03, // ssrc=0x10000000
                0x10, 0x00, 0x00, 0x00, // CNAME, len=1, content=A
                0x01, 0x01, 0x41, // PHONE, len=1, content=B
                0x04, 0x01, 0x42, // END + padding
                0x00, 0x00,
            ],
            vec![(
                0x10000000,
                vec![
                    (SdesType::SdesCname, &b"A"[..]),
                    (SdesType::SdesPhone, &b"B"[..]),
                ],
            )],
            None,
        ),
        (
            "two chunks",
            vec![
                // v=2, p=0, count=2, SDES, len=5
                0x82, 0xca, 0x00, 0x05, // ssrc=0x01020304
                0x01, 0x02, 0x03, 0x04, // Chunk 1
                // CNAME, len=1, content=A
                0x01, 0x01, 0x41, // END
                0x00, // Chunk 2
                // SSRC 0x05060708
                0x05, 0x06, 0x07, 0x08, // CNAME, len=3, content=BCD
                0x01, 0x03, 0x42, 0x43, 0x44, // END
                0x00, 0x00, 0x00,
            ],
            vec![
                (0x01020304, vec![(SdesType::SdesCname, &b"A"[..])]),
                (0x05060708, vec![(SdesType::SdesCname, &b"BCD"[..])]),
            ],
            None,
        ),
        (
            "private item type",
            vec![
                // v=2, p=0, count=1, SDES, len=2
                0x81, 0xca, 0x00, 0x02, // ssrc=0x01020304
                0x01, 0x02, 0x03, 0x04, // type=42, len=1, content=Z
                0x2a, 0x01, 0x5a, 0x00, // END
            ],
            vec![(0x01020304, vec![(SdesType::SdesOther(42), &b"Z"[..])])],
            None,
        ),
    ];

    for (name, data, want, want_error) in tests {
        let got = SourceDescription::unmarshal_slice(&data);

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
            (Ok(sdes), None) => {
                let actual: Vec<(u32, Vec<(SdesType, &[u8])>)> = sdes
                    .chunks()
                    .iter()
                    .map(|c| (c.source(), c.items()))
                    .collect();
                assert_eq!(actual, want, "Unmarshal {name}");
                assert_eq!(sdes.marshal().unwrap(), Bytes::from(data), "{name} round trip");
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn test_source_description_round_trip() {
    let too_long_text = vec![b'x'; 1 << 8];
    let too_many_chunks = vec![SourceDescriptionChunk::default(); 1 << 5];

    let mut valid = SourceDescriptionChunk::new(1);
    valid.set_item(SdesType::SdesCname, b"test@example.com");
    let mut multiple = SourceDescriptionChunk::new(2);
    multiple.set_item(SdesType::SdesNote, b"some note");
    multiple.set_item(SdesType::SdesNote, b"another note");
    multiple.add_item(SdesType::SdesEmail, b"");
    let mut too_long = SourceDescriptionChunk::new(3);
    too_long.set_item(SdesType::SdesCname, &too_long_text);
    let mut end_item = SourceDescriptionChunk::new(4);
    end_item.add_item(SdesType::SdesEnd, b"x");

    let tests = vec![
        ("valid", vec![valid.clone()], None),
        ("multiple chunks", vec![valid, multiple], None),
        ("empty", vec![SourceDescriptionChunk::new(1)], None),
        ("text too long", vec![too_long], Some(Error::SdesTextTooLong)),
        ("end item", vec![end_item], Some(Error::SdesMissingType)),
        ("count overflow", too_many_chunks, Some(Error::TooManyChunks)),
    ];

    for (name, chunks, want_error) in tests {
        let mut sdes = SourceDescription::new();
        sdes.set_chunks(chunks.clone());
        let got = sdes.marshal();

        assert_eq!(
            got.is_ok(),
            want_error.is_none(),
            "Marshal {name}: err = {got:?}, want {want_error:?}"
        );

        match (got, want_error) {
            (Err(got_err), Some(err)) => assert_eq!(
                err, got_err,
                "Marshal {name}: err = {got_err:?}, want {err:?}",
            ),
            (Ok(data), None) => {
                assert_eq!(data.len() % 4, 0, "{name}: not word aligned");
                let actual = SourceDescription::unmarshal_slice(&data)
                    .unwrap_or_else(|_| panic!("Unmarshal {name}"));
                assert_eq!(actual.chunks().len(), chunks.len(), "{name} round trip");
                for (got, want) in actual.chunks().iter().zip(chunks.iter()) {
                    assert_eq!(got.source(), want.source(), "{name} round trip: source");
                    assert_eq!(got.items(), want.items(), "{name} round trip: items");
                }
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn test_source_description_chunk_mutation() -> Result<()> {
    let raw = [
        0x81, 0xca, 0x00, 0x03, // v=2, p=0, count=1, SDES, len=3
        0x10, 0x00, 0x00, 0x00, // CNAME, len=1, content=A
        0x01, 0x01, 0x41, // PHONE, len=1, content=B
        0x04, 0x01, 0x42, // END + padding
        0x00, 0x00,
    ];
    let mut sdes = SourceDescription::unmarshal_slice(&raw)?;
    assert_eq!(sdes.cname(), Some(&b"A"[..]));

    sdes.chunks_mut()[0].set_source(0x20000000);
    assert!(sdes.needs_serialization());

    assert!(sdes.chunks_mut()[0].remove_item(SdesType::SdesPhone));
    sdes.chunks_mut()[0].set_item(SdesType::SdesCname, b"abcd");
    assert_eq!(sdes.marshal_size(), 16);

    sdes.serialize()?;
    assert!(!sdes.needs_serialization());
    assert_eq!(
        sdes.view(),
        &[
            0x81, 0xca, 0x00, 0x03, 0x20, 0x00, 0x00, 0x00, 0x01, 0x04, 0x61, 0x62, 0x63, 0x64,
            0x00, 0x00,
        ]
    );
    assert_eq!(sdes.destination_ssrc(), vec![0x20000000]);

    Ok(())
}

#[test]
fn test_source_description_with_cname() -> Result<()> {
    let mut sdes = SourceDescription::with_cname(0x902f9e2e, b"{9c00eb92-1afb-9d49-a47d-91f64eee69f5}");
    sdes.serialize()?;

    assert_eq!(sdes.view().len(), 4 + 4 + 2 + 38 + 4);
    let parsed = SourceDescription::unmarshal_slice(sdes.view())?;
    assert_eq!(parsed.cname(), Some(&b"{9c00eb92-1afb-9d49-a47d-91f64eee69f5}"[..]));
    assert!(parsed.to_string().contains("CNAME={9c00eb92"));

    let dump = serde_json::to_value(parsed.dump()).unwrap();
    assert_eq!(dump["chunks"][0]["items"][0]["sdes_type"], "SdesCname");

    Ok(())
}

#[test]
fn test_sdes_type_conversion() {
    for b in 0..=255u8 {
        assert_eq!(u8::from(SdesType::from(b)), b);
    }
    assert_eq!(SdesType::from(6).to_string(), "TOOL");
}
