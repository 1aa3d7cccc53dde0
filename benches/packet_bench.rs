use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use sacn_transport::core::{Cid, DataPacket, Packet, UniverseDiscoveryPacket};

#[allow(clippy::unwrap_used)]
fn bench_packet_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_write");
    let slot_counts = [1usize, 24, 128, 512];

    for &slots in &slot_counts {
        let packet = DataPacket::new(Cid::random(), "bench", 1, vec![0xAA; slots]);
        group.throughput(Throughput::Bytes(packet.length() as u64));
        group.bench_function(format!("data_{slots}_slots"), |b| {
            let mut buf = vec![0u8; packet.length()];
            b.iter(|| packet.write_to(&mut buf).unwrap())
        });
    }

    group.bench_function("discovery_full_page", |b| {
        b.iter_batched(
            || (1..=512u16).collect::<Vec<_>>(),
            |universes| {
                let packet = UniverseDiscoveryPacket::new(Cid::default(), "bench", universes);
                let mut buf = vec![0u8; packet.length()];
                packet.write_to(&mut buf).unwrap();
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_packet_write);
criterion_main!(benches);
