// ABOUTME: Benchmark suite for the PDU codec hot paths
// ABOUTME: Measures deserialize/serialize throughput on captured frames

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smppio::datatypes::{CommandId, ParamName};
use smppio::splitter::create_submits;
use smppio::Pdu;

fn from_hex(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("bad hex"))
        .collect()
}

/// deliver_sm carrying a delivery receipt plus two TLVs (215 bytes).
const DELIVER_SM_RECEIPT: &str = "000000D700000005000000000000000300010137393530303839323536\
38000001373737000400000000000001007A69643A63623963343066312D306161312D346233652D616662382D376464\
323464303361373136207375623A30303120646C7672643A303031207375626D697420646174653A3230313032343132\
303520646F6E6520646174653A3230313032343132303620737461743A44454C49565244206572723A303030001E0025\
63623963343066312D306161312D346233652D616662382D376464323464303361373136000427000102";

fn sample_submit() -> Pdu {
    let mut pdu = Pdu::new(CommandId::SubmitSm);
    pdu.set_main(ParamName::SourceAddr, "12345").unwrap();
    pdu.set_main(ParamName::DestinationAddr, "67890").unwrap();
    pdu.set_main(ParamName::ShortMessage, &b"Hello World"[..])
        .unwrap();
    pdu.set_seq(1);
    pdu
}

fn bench_deserialize(c: &mut Criterion) {
    let raw = from_hex(DELIVER_SM_RECEIPT);
    c.bench_function("deserialize_deliver_sm_receipt", |b| {
        b.iter(|| Pdu::deserialize(black_box(&raw)).unwrap())
    });
}

fn bench_serialize(c: &mut Criterion) {
    let pdu = sample_submit();
    c.bench_function("serialize_submit_sm", |b| {
        b.iter(|| black_box(&pdu).serialize())
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let raw = from_hex(DELIVER_SM_RECEIPT);
    c.bench_function("round_trip_deliver_sm_receipt", |b| {
        b.iter(|| {
            let pdu = Pdu::deserialize(black_box(&raw)).unwrap();
            pdu.serialize()
        })
    });
}

fn bench_split_long_text(c: &mut Criterion) {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(12);
    c.bench_function("split_540_char_text", |b| {
        b.iter(|| create_submits(black_box(&text), || 0x4CAC).unwrap())
    });
}

criterion_group!(
    benches,
    bench_deserialize,
    bench_serialize,
    bench_round_trip,
    bench_split_long_text
);
criterion_main!(benches);
