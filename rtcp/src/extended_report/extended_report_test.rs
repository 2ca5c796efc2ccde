use bytes::Bytes;

use super::*;

fn decoded_packet() -> ExtendedReport {
    let mut xr = ExtendedReport::new(0x01020304);

    let mut lrle = LossRLEReportBlock::loss();
    lrle.set_thinning(12);
    lrle.set_ssrc(0x12345689);
    lrle.set_begin_seq(5);
    lrle.set_end_seq(12);
    lrle.set_chunks(vec![Chunk(0x4006), Chunk(0x0006), Chunk(0x8765)]);
    xr.add_report(lrle);

    let mut drle = DuplicateRLEReportBlock::duplicate();
    drle.set_thinning(6);
    drle.set_ssrc(0x12345689);
    drle.set_begin_seq(5);
    drle.set_end_seq(12);
    drle.set_chunks(vec![Chunk(0x4123), Chunk(0x3FFF), Chunk(0xFFFF)]);
    xr.add_report(drle);

    let mut prt = PacketReceiptTimesReportBlock::new();
    prt.set_thinning(3);
    prt.set_ssrc(0x98765432);
    prt.set_begin_seq(15432);
    prt.set_end_seq(15577);
    prt.set_receipt_times(vec![
        0x11111111, 0x22222222, 0x33333333, 0x44444444, 0x55555555,
    ]);
    xr.add_report(prt);

    xr.add_report(ReceiverReferenceTimeReportBlock::new(0x0102030405060708));

    let mut dlrr = DLRRReportBlock::new();
    dlrr.add_report(DLRRReport::new(0x88888888, 0x12345678, 0x99999999));
    dlrr.add_report(DLRRReport::new(0x09090909, 0x12345678, 0x99999999));
    dlrr.add_report(DLRRReport::new(0x11223344, 0x12345678, 0x99999999));
    xr.add_report(dlrr);

    let mut ssr = StatisticsSummaryReportBlock::new();
    ssr.set_loss_reports(true);
    ssr.set_duplicate_reports(true);
    ssr.set_jitter_reports(true);
    ssr.set_ttl_or_hop_limit(TTLorHopLimitType::IPv4);
    ssr.set_ssrc(0xFEDCBA98);
    ssr.set_begin_seq(0x1234);
    ssr.set_end_seq(0x5678);
    ssr.set_lost_packets(0x11111111);
    ssr.set_dup_packets(0x22222222);
    ssr.set_min_jitter(0x33333333);
    ssr.set_max_jitter(0x44444444);
    ssr.set_mean_jitter(0x55555555);
    ssr.set_dev_jitter(0x66666666);
    ssr.set_min_ttl_or_hl(0x01);
    ssr.set_max_ttl_or_hl(0x02);
    ssr.set_mean_ttl_or_hl(0x03);
    ssr.set_dev_ttl_or_hl(0x04);
    xr.add_report(ssr);

    let mut vm = VoIPMetricsReportBlock::new();
    vm.set_ssrc(0x89ABCDEF);
    vm.set_loss_rate(0x05);
    vm.set_discard_rate(0x06);
    vm.set_burst_density(0x07);
    vm.set_gap_density(0x08);
    vm.set_burst_duration(0x1111);
    vm.set_gap_duration(0x2222);
    vm.set_round_trip_delay(0x3333);
    vm.set_end_system_delay(0x4444);
    vm.set_signal_level(0x11);
    vm.set_noise_level(0x22);
    vm.set_rerl(0x33);
    vm.set_gmin(0x44);
    vm.set_rfactor(0x55);
    vm.set_ext_rfactor(0x66);
    vm.set_mos_lq(0x77);
    vm.set_mos_cq(0x88);
    vm.set_rx_config(0x99);
    vm.set_jb_nominal(0x1122);
    vm.set_jb_maximum(0x3344);
    vm.set_jb_abs_max(0x5566);
    xr.add_report(vm);

    xr
}

fn encoded_packet() -> Bytes {
    Bytes::from_static(&[
        // RTP Header
        0x80, 0xCF, 0x00, 0x33, // byte 0 - 3
        // Sender SSRC
        0x01, 0x02, 0x03, 0x04, // Loss RLE Report Block
        0x01, 0x0C, 0x00, 0x04, // byte 8 - 11
        // Source SSRC
        0x12, 0x34, 0x56, 0x89, // Begin & End Seq
        0x00, 0x05, 0x00, 0x0C, // byte 16 - 19
        // Chunks
        0x40, 0x06, 0x00, 0x06, 0x87, 0x65, 0x00, 0x00, // byte 24 - 27
        // Duplicate RLE Report Block
        0x02, 0x06, 0x00, 0x04, // Source SSRC
        0x12, 0x34, 0x56, 0x89, // byte 32 - 35
        // Begin & End Seq
        0x00, 0x05, 0x00, 0x0C, // Chunks
        0x41, 0x23, 0x3F, 0xFF, // byte 40 - 43
        0xFF, 0xFF, 0x00, 0x00, // Packet Receipt Times Report Block
        0x03, 0x03, 0x00, 0x07, // byte 48 - 51
        // Source SSRC
        0x98, 0x76, 0x54, 0x32, // Begin & End Seq
        0x3C, 0x48, 0x3C, 0xD9, // byte 56 - 59
        // Receipt times
        0x11, 0x11, 0x11, 0x11, 0x22, 0x22, 0x22, 0x22, // byte 64 - 67
        0x33, 0x33, 0x33, 0x33, 0x44, 0x44, 0x44, 0x44, // byte 72 - 75
        0x55, 0x55, 0x55, 0x55, // Receiver Reference Time Report
        0x04, 0x00, 0x00, 0x02, // byte 80 - 83
        // Timestamp
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // byte 88 - 91
        // DLRR Report
        0x05, 0x00, 0x00, 0x09, // SSRC 1
        0x88, 0x88, 0x88, 0x88, // byte 96 - 99
        // LastRR 1
        0x12, 0x34, 0x56, 0x78, // DLRR 1
        0x99, 0x99, 0x99, 0x99, // byte 104 - 107
        // SSRC 2
        0x09, 0x09, 0x09, 0x09, // LastRR 2
        0x12, 0x34, 0x56, 0x78, // byte 112 - 115
        // DLRR 2
        0x99, 0x99, 0x99, 0x99, // SSRC 3
        0x11, 0x22, 0x33, 0x44, // byte 120 - 123
        // LastRR 3
        0x12, 0x34, 0x56, 0x78, // DLRR 3
        0x99, 0x99, 0x99, 0x99, // byte 128 - 131
        // Statistics Summary Report
        0x06, 0xE8, 0x00, 0x09, // SSRC
        0xFE, 0xDC, 0xBA, 0x98, // byte 136 - 139
        // Various statistics
        0x12, 0x34, 0x56, 0x78, 0x11, 0x11, 0x11, 0x11, // byte 144 - 147
        0x22, 0x22, 0x22, 0x22, 0x33, 0x33, 0x33, 0x33, // byte 152 - 155
        0x44, 0x44, 0x44, 0x44, 0x55, 0x55, 0x55, 0x55, // byte 160 - 163
        0x66, 0x66, 0x66, 0x66, 0x01, 0x02, 0x03, 0x04, // byte 168 - 171
        // VoIP Metrics Report
        0x07, 0x00, 0x00, 0x08, // SSRC
        0x89, 0xAB, 0xCD, 0xEF, // byte 176 - 179
        // Various statistics
        0x05, 0x06, 0x07, 0x08, 0x11, 0x11, 0x22, 0x22, // byte 184 - 187
        0x33, 0x33, 0x44, 0x44, 0x11, 0x22, 0x33, 0x44, // byte 192 - 195
        0x55, 0x66, 0x77, 0x88, 0x99, 0x00, 0x11, 0x22, // byte 200 - 203
        0x33, 0x44, 0x55, 0x66, // byte 204 - 207
    ])
}

#[test]
fn test_encode() -> Result<()> {
    let expected = encoded_packet();
    let packet = decoded_packet();
    assert!(packet.needs_serialization());

    let actual = packet.marshal()?;
    assert_eq!(actual, expected);
    Ok(())
}

#[test]
fn test_decode() -> Result<()> {
    let encoded = encoded_packet();
    let expected = decoded_packet();
    let actual = ExtendedReport::unmarshal_slice(&encoded)?;

    assert!(!actual.needs_serialization());
    assert_eq!(actual.dump(), expected.dump());
    assert_eq!(actual.to_string(), expected.to_string());
    assert_eq!(actual.count(), 0);
    assert_eq!(actual.reports().len(), 7);
    assert_eq!(
        actual
            .reports()
            .iter()
            .map(ReportBlock::block_type)
            .collect::<Vec<_>>(),
        vec![
            BlockType::LossRLE,
            BlockType::DuplicateRLE,
            BlockType::PacketReceiptTimes,
            BlockType::ReceiverReferenceTime,
            BlockType::DLRR,
            BlockType::StatisticsSummary,
            BlockType::VoIPMetrics,
        ]
    );
    assert_eq!(
        actual.destination_ssrc(),
        vec![
            0x12345689, 0x12345689, 0x98765432, 0x88888888, 0x09090909, 0x11223344, 0xFEDCBA98,
            0x89ABCDEF,
        ]
    );
    Ok(())
}

#[test]
fn test_serialize_is_idempotent() -> Result<()> {
    let mut packet = decoded_packet();
    packet.serialize()?;
    let once = packet.view().to_vec();
    packet.serialize()?;

    assert_eq!(packet.view(), &once[..]);
    assert_eq!(packet.view(), &encoded_packet()[..]);
    assert!(!packet.needs_serialization());
    Ok(())
}

#[test]
fn test_rle_chunks() {
    let tests = vec![
        (Chunk(0x4006), ChunkType::RunLength, Ok(1u8), 6u16),
        (Chunk(0x0006), ChunkType::RunLength, Ok(0), 6),
        (Chunk(0x8765), ChunkType::BitVector, Err(Error::WrongChunkType), 0x0765),
        (Chunk(0), ChunkType::TerminatingNull, Err(Error::WrongChunkType), 0),
        (Chunk::run_length(1, 0x3FFF), ChunkType::RunLength, Ok(1), 0x3FFF),
        (Chunk::bit_vector(0x7FFF), ChunkType::BitVector, Err(Error::WrongChunkType), 0x7FFF),
    ];

    for (chunk, chunk_type, run_type, value) in tests {
        assert_eq!(chunk.chunk_type(), chunk_type, "{chunk:?} type");
        assert_eq!(chunk.run_type(), run_type, "{chunk:?} run type");
        assert_eq!(chunk.value(), value, "{chunk:?} value");
    }
}

#[test]
fn test_rle_chunk_list_ends_at_block_end() -> Result<()> {
    let data = [
        0x80u8, 0xCF, 0x00, 0x05, // XR, len=5
        0x01, 0x02, 0x03, 0x04, // ssrc
        0x01, 0x00, 0x00, 0x03, // Loss RLE, len=3
        0x12, 0x34, 0x56, 0x89, // source
        0x00, 0x05, 0x00, 0x0C, // begin=5, end=12
        0x40, 0x06, 0x80, 0x01, // two chunks, no terminator
    ];
    let xr = ExtendedReport::unmarshal_slice(&data)?;

    match &xr.reports()[0] {
        ReportBlock::LossRLE(block) => {
            assert!(block.is_loss_rle());
            assert_eq!(block.chunks(), &[Chunk(0x4006), Chunk(0x8001)]);
        }
        other => panic!("unexpected block {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unknown_and_ecn_blocks() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let data = [
        0x80u8, 0xCF, 0x00, 0x09, // XR, len=9
        0x01, 0x02, 0x03, 0x04, // ssrc
        0x2A, 0x07, 0x00, 0x01, // BT=42, type specific=7, len=1
        0xDE, 0xAD, 0xBE, 0xEF, // opaque body
        0x0D, 0x00, 0x00, 0x05, // BT=13, len=5
        0x4B, 0xC4, 0xFC, 0xB4, // media sender
        0x00, 0x00, 0x00, 0x64, // ect0=100
        0x00, 0x00, 0x00, 0x02, // ect1=2
        0x00, 0x03, 0x00, 0x04, // ce=3, not-ect=4
        0x00, 0x05, 0x00, 0x06, // lost=5, dup=6
    ];
    let mut xr = ExtendedReport::unmarshal_slice(&data)?;

    match &xr.reports()[0] {
        ReportBlock::Unknown(block) => {
            assert_eq!(block.raw_block_type(), 42);
            assert_eq!(block.type_specific(), 7);
            assert_eq!(block.body(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        }
        other => panic!("unexpected block {other:?}"),
    }
    match &xr.reports()[1] {
        ReportBlock::ECNSummary(block) => assert_eq!(
            block.dump(),
            ECNSummaryReportBlockDump {
                ssrc: 0x4BC4FCB4,
                ect0_counter: 100,
                ect1_counter: 2,
                ecn_ce_counter: 3,
                not_ect_counter: 4,
                lost_packets_counter: 5,
                duplication_counter: 6,
            }
        ),
        other => panic!("unexpected block {other:?}"),
    }
    assert_eq!(xr.destination_ssrc(), vec![0x4BC4FCB4]);

    if let ReportBlock::Unknown(block) = &mut xr.reports_mut()[0] {
        block.set_body(&[0x01, 0x02, 0x03, 0x04, 0x05]);
    }
    xr.serialize()?;
    assert_eq!(xr.view().len(), data.len() + 4);
    assert_eq!(&xr.view()[8..20], &[0x2A, 0x07, 0x00, 0x02, 1, 2, 3, 4, 5, 0, 0, 0]);

    Ok(())
}

#[test]
fn test_extended_report_unmarshal_errors() {
    let tests = vec![
        (
            "block overruns packet",
            vec![
                0x80u8, 0xCF, 0x00, 0x03, // XR, len=3
                0x01, 0x02, 0x03, 0x04, // ssrc
                0x04, 0x00, 0x00, 0x02, // RRT, len=2 but only this word left
                0x01, 0x02, 0x03, 0x04,
            ],
            Error::PacketTooShort,
        ),
        (
            "fixed block too short",
            vec![
                0x80, 0xCF, 0x00, 0x04, // XR, len=4
                0x01, 0x02, 0x03, 0x04, // ssrc
                0x04, 0x00, 0x00, 0x01, // RRT, len=1
                0x01, 0x02, 0x03, 0x04, // half a timestamp
                0x05, 0x06, 0x07, 0x08,
            ],
            Error::PacketTooShort,
        ),
        (
            "dlrr not a multiple of sub-reports",
            vec![
                0x80, 0xCF, 0x00, 0x03, // XR, len=3
                0x01, 0x02, 0x03, 0x04, // ssrc
                0x05, 0x00, 0x00, 0x01, // DLRR, len=1
                0x88, 0x88, 0x88, 0x88,
            ],
            Error::InvalidLength,
        ),
        (
            "rle too short",
            vec![
                0x80, 0xCF, 0x00, 0x03, // XR, len=3
                0x01, 0x02, 0x03, 0x04, // ssrc
                0x01, 0x00, 0x00, 0x01, // Loss RLE, len=1
                0x12, 0x34, 0x56, 0x89,
            ],
            Error::PacketTooShort,
        ),
        (
            "no ssrc",
            vec![0x80, 0xCF, 0x00, 0x00],
            Error::PacketTooShort,
        ),
        (
            "wrong type",
            vec![
                0x80, 0xC9, 0x00, 0x01, // RR, len=1
                0x01, 0x02, 0x03, 0x04,
            ],
            Error::WrongType,
        ),
    ];

    for (name, data, want_error) in tests {
        match ExtendedReport::unmarshal_slice(&data) {
            Err(err) => assert_eq!(want_error, err, "Unmarshal {name}"),
            Ok(xr) => panic!("Unmarshal {name}: want {want_error:?}, got {xr:?}"),
        }
    }
}

#[test]
fn test_fixed_block_size_mismatch() {
    let view = BytesMut::from(
        &[
            0x04u8, 0x00, 0x00, 0x03, // RRT, len=3
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x00, 0x00, 0x00, 0x00,
        ][..],
    );
    let got = ReceiverReferenceTimeReportBlock::unmarshal(view);
    assert_eq!(Error::InvalidLength, got.unwrap_err());

    let view = BytesMut::from(&[0x07u8, 0x00, 0x00, 0x02, 0, 0, 0, 0, 0, 0, 0, 0][..]);
    let got = ReceiverReferenceTimeReportBlock::unmarshal(view);
    assert_eq!(Error::WrongBlockType, got.unwrap_err());
}

#[test]
fn test_extended_report_padding() -> Result<()> {
    let data = [
        0xA0u8, 0xCF, 0x00, 0x04, // XR, p=1, len=4
        0x01, 0x02, 0x03, 0x04, // ssrc
        0x04, 0x00, 0x00, 0x02, // RRT, len=2
        0x01, 0x02, 0x03, 0x04, // timestamp, padding=4
        0x00, 0x00, 0x00, 0x04,
    ];
    // RRT needs 12 octets, only 8 are left once the padding is taken off.
    assert_eq!(
        Error::PacketTooShort,
        ExtendedReport::unmarshal_slice(&data).unwrap_err()
    );

    let data = [
        0xA0u8, 0xCF, 0x00, 0x05, // XR, p=1, len=5
        0x01, 0x02, 0x03, 0x04, // ssrc
        0x04, 0x00, 0x00, 0x02, // RRT, len=2
        0x01, 0x02, 0x03, 0x04, // timestamp
        0x05, 0x06, 0x07, 0x08, //
        0x00, 0x00, 0x00, 0x04, // padding=4
    ];
    let mut xr = ExtendedReport::unmarshal_slice(&data)?;
    assert_eq!(xr.padding(), 4);

    xr.set_padding(0);
    assert_eq!(xr.padding(), 4);
    assert!(!xr.needs_serialization());

    xr.add_report(ReceiverReferenceTimeReportBlock::new(1));
    xr.serialize()?;
    assert_eq!(xr.padding(), 4);
    assert_eq!(xr.view().len(), data.len() + 12);
    assert_eq!(xr.view()[0], 0xA0);
    assert_eq!(xr.view()[xr.view().len() - 1], 4);

    let mut fresh = ExtendedReport::new(7);
    fresh.set_padding(3);
    assert_eq!(fresh.padding(), 0);

    Ok(())
}

#[test]
fn test_in_place_block_updates() -> Result<()> {
    let mut xr = ExtendedReport::unmarshal_slice(&encoded_packet())?;
    if let ReportBlock::VoIPMetrics(vm) = &mut xr.reports_mut()[6] {
        vm.set_mos_lq(0x10);
    }
    xr.serialize()?;

    assert_eq!(xr.view()[198], 0x10);
    match &xr.reports()[6] {
        ReportBlock::VoIPMetrics(vm) => assert_eq!(vm.mos_lq(), 0x10),
        other => panic!("unexpected block {other:?}"),
    }
    Ok(())
}

#[test]
fn test_extended_report_dump_json() -> Result<()> {
    let xr = ExtendedReport::unmarshal_slice(&encoded_packet())?;
    let dump = serde_json::to_value(xr.dump()).unwrap();

    assert_eq!(dump["ssrc"], 0x01020304);
    assert_eq!(dump["reports"][0]["block_type"], "LossRLE");
    assert_eq!(dump["reports"][0]["thinning"], 12);
    assert_eq!(dump["reports"][5]["ttl_or_hop_limit"], "IPv4");
    assert_eq!(dump["reports"][4]["reports"][2]["ssrc"], 0x11223344);
    Ok(())
}
