use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use toon_temporal::{decode, encode, expand_rrule, merge_availability};

fn calendar_payload(events: usize) -> String {
    let rows: Vec<String> = (0..events)
        .map(|i| {
            format!(
                r#"{{"id":{},"summary":"Event {}","start":"2026-03-{:02}T09:00:00Z","busy":true}}"#,
                i,
                i,
                (i % 28) + 1
            )
        })
        .collect();
    format!(r#"{{"calendar":"work","events":[{}]}}"#, rows.join(","))
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for size in [10, 100, 1000] {
        let payload = calendar_payload(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| encode(black_box(payload)))
        });
    }
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for size in [10, 100, 1000] {
        let toon = encode(&calendar_payload(size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &toon, |b, toon| {
            b.iter(|| decode(black_box(toon)))
        });
    }
    group.finish();
}

fn benchmark_expand_rrule(c: &mut Criterion) {
    c.bench_function("expand_weekly_byday_52", |b| {
        b.iter(|| {
            expand_rrule(
                black_box("FREQ=WEEKLY;COUNT=52;BYDAY=MO,WE,FR"),
                "2026-01-05T09:00:00",
                30,
                "America/New_York",
                None,
                None,
            )
        })
    });
}

fn benchmark_merge(c: &mut Criterion) {
    let streams: Vec<String> = (0..4)
        .map(|s| {
            let events: Vec<String> = (0..50)
                .map(|i| {
                    format!(
                        r#"{{"start":"2026-03-{:02}T{:02}:00:00Z","end":"2026-03-{:02}T{:02}:45:00Z"}}"#,
                        (i % 28) + 1,
                        (i % 12) + 6,
                        (i % 28) + 1,
                        (i % 12) + 6
                    )
                })
                .collect();
            format!(
                r#"{{"stream_id":"cal-{}","events":[{}]}}"#,
                s,
                events.join(",")
            )
        })
        .collect();
    let streams_json = format!("[{}]", streams.join(","));

    c.bench_function("merge_4_streams_200_events", |b| {
        b.iter(|| {
            merge_availability(
                black_box(&streams_json),
                "2026-03-01T00:00:00Z",
                "2026-04-01T00:00:00Z",
                true,
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_encode,
    benchmark_decode,
    benchmark_expand_rrule,
    benchmark_merge
);
criterion_main!(benches);
