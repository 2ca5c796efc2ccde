use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, Criterion};
use rtp::extension::ExtensionMode;
use rtp::packet::*;
use util::marshal::{Marshal, MarshalSize, Serializable, Unmarshal};

fn benchmark_packet(c: &mut Criterion) {
    let mut pkt = Packet::new();
    pkt.set_csrcs(vec![1, 2]);
    pkt.set_extension_mode(ExtensionMode::TwoBytes);
    pkt.set_extension(1, &[3, 4]);
    pkt.set_extension(2, &[5, 6]);
    pkt.set_payload(&[0xFFu8; 15]);
    pkt.serialize().unwrap();

    let raw = pkt.marshal().unwrap();
    let p = Packet::unmarshal_slice(&raw).unwrap();
    if pkt != p {
        panic!("marshal or unmarshal not correct: \npkt: {pkt:?} \nvs \np: {p:?}");
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////
    let mut buf = BytesMut::with_capacity(pkt.marshal_size());
    buf.resize(pkt.marshal_size(), 0);
    c.bench_function("Benchmark MarshalTo", |b| {
        b.iter(|| {
            let _ = pkt.marshal_to(&mut buf).unwrap();
        })
    });

    c.bench_function("Benchmark Unmarshal", |b| {
        b.iter(|| {
            let _ = Packet::unmarshal(BytesMut::from(&raw[..])).unwrap();
        })
    });

    c.bench_function("Benchmark Serialize", |b| {
        b.iter(|| {
            let mut p = p.clone();
            p.set_payload(&[0xEEu8; 15]);
            p.serialize().unwrap();
        })
    });
}

criterion_group!(benches, benchmark_packet);
criterion_main!(benches);
