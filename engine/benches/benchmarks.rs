//! Performance benchmarks for charger-engine

use charger_engine::{
    apply_window, cursor, paginate, ConnectionArgs, Coordinate, Location, LocationDetails,
    LocationFilter, LocationStore, MemoryStore, NewLocation, Scope, SortDirection, Window,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn details(nid: i64) -> LocationDetails {
    LocationDetails {
        title: format!("Supercharger {nid}"),
        address: format!("{nid} Main Street"),
        city: "Palo Alto".into(),
        country: if nid % 2 == 0 { "United States" } else { "Canada" }.into(),
        region: "north_america".into(),
        location_type: vec!["supercharger".into()],
        geo: Coordinate::new(37.4 + nid as f64 * 0.001, -122.1),
        ..LocationDetails::new(nid)
    }
}

fn locations(count: i64) -> Vec<Location> {
    (1..=count)
        .map(|id| Location::new(id, details(id), id as u64))
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");

    group.bench_function("encode", |b| b.iter(|| cursor::encode(black_box(123_456))));

    let token = cursor::encode(123_456);
    group.bench_function("decode", |b| {
        b.iter(|| cursor::decode(black_box(token.as_str())))
    });

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    let a = details(7);
    let same = a.clone();
    let changed = LocationDetails {
        hours: Some("24/7".into()),
        ..a.clone()
    };

    group.bench_function("equivalent_equal", |b| {
        b.iter(|| black_box(&a).equivalent(black_box(&same)))
    });
    group.bench_function("equivalent_changed", |b| {
        b.iter(|| black_box(&a).equivalent(black_box(&changed)))
    });
    group.bench_function("diff_changed", |b| {
        b.iter(|| black_box(&a).diff(black_box(&changed)))
    });

    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window");

    for size in [10usize, 50, 500] {
        let batch = locations(size as i64 + 1);

        group.bench_with_input(BenchmarkId::new("forward", size), &size, |b, &size| {
            b.iter(|| apply_window(batch.clone(), Window::Forward(size)))
        });
        group.bench_with_input(BenchmarkId::new("backward", size), &size, |b, &size| {
            b.iter(|| apply_window(batch.clone(), Window::Backward(size)))
        });

        let scope = Scope::normalize(ConnectionArgs {
            first: Some(size),
            ..Default::default()
        })
        .expect("valid scope");
        group.bench_with_input(BenchmarkId::new("paginate", size), &size, |b, _| {
            b.iter(|| paginate(batch.clone(), black_box(&scope)))
        });
    }

    group.finish();
}

fn bench_memory_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_store");
    let rt = runtime();

    let store = MemoryStore::new();
    rt.block_on(async {
        for nid in 1..=10_000 {
            store
                .insert(NewLocation::new(details(nid), nid as u64))
                .await
                .expect("insert");
        }
    });

    let plain = Scope::normalize(ConnectionArgs {
        first: Some(50),
        after: Some(cursor::encode(5_000)),
        ..Default::default()
    })
    .expect("valid scope")
    .query();
    group.bench_function("query_page", |b| {
        b.iter(|| rt.block_on(store.query(black_box(&plain))))
    });

    let filtered = Scope::normalize(ConnectionArgs {
        last: Some(50),
        order: Some(SortDirection::Desc),
        filter: LocationFilter {
            country: vec!["Canada".into()],
            ..Default::default()
        },
        ..Default::default()
    })
    .expect("valid scope")
    .query();
    group.bench_function("query_filtered_backward", |b| {
        b.iter(|| rt.block_on(store.query(black_box(&filtered))))
    });

    group.bench_function("find_by_external_id", |b| {
        b.iter(|| rt.block_on(store.find_by_external_id(black_box(7_777))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cursor,
    bench_compare,
    bench_window,
    bench_memory_store
);
criterion_main!(benches);
