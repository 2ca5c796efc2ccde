use bytes::BytesMut;
use mediawire::rtcp::packet::Packet as RtcpPacket;
use mediawire::util::marshal::Serializable;
use mediawire::{demux, Datagram};

#[test]
fn test_demux_rtp() -> util::Result<()> {
    let raw = [
        0x80u8, 0x60, 0x00, 0x01, // v=2, pt=96, seq=1
        0x00, 0x00, 0x00, 0x0a, // timestamp=10
        0x12, 0x34, 0x56, 0x78, // ssrc
        0xaa, 0xbb, // payload
    ];

    match demux(BytesMut::from(&raw[..]))? {
        Datagram::Rtp(p) => {
            assert_eq!(p.payload_type(), 96);
            assert_eq!(p.sequence_number(), 1);
            assert_eq!(p.ssrc(), 0x12345678);
            assert_eq!(p.payload(), &[0xaa, 0xbb]);
            assert_eq!(p.view(), &raw[..]);
        }
        other => panic!("want RTP, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_demux_rtcp() -> util::Result<()> {
    let raw = [
        0x82u8, 0xcb, 0x00, 0x06, // v=2, p=0, count=2, BYE, len=6
        0x62, 0x42, 0x76, 0xe0, // ssrc=0x624276e0
        0x26, 0x24, 0x67, 0x0e, // ssrc=0x2624670e
        0x0e, 0x48, 0x61, 0x73, // len=14, text=Hasta la vista
        0x74, 0x61, 0x20, 0x6c, 0x61, 0x20, 0x76, 0x69, 0x73, 0x74, 0x61, 0x00,
    ];

    match demux(BytesMut::from(&raw[..]))? {
        Datagram::Rtcp(packets) => {
            assert_eq!(packets.len(), 1);
            match &packets[0] {
                RtcpPacket::Goodbye(bye) => {
                    assert_eq!(bye.sources(), &[0x624276e0, 0x2624670e]);
                    assert_eq!(bye.reason(), Some(&b"Hasta la vista"[..]));
                }
                other => panic!("want BYE, got {other:?}"),
            }
        }
        other => panic!("want RTCP, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_demux_garbage() {
    let _ = env_logger::builder().is_test(true).try_init();

    let result = demux(BytesMut::from(&[0x00u8, 0x01, 0x02, 0x03][..]));
    assert!(result.is_err(), "version 0 is neither RTP nor RTCP");

    let result = demux(BytesMut::from(&[0x80u8][..]));
    assert!(result.is_err(), "too short for either header");
}
