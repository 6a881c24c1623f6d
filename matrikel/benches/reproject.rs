//! Benchmarks pour la reprojection et l'extraction de géométrie

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use matrikel::{parse_search_response, ParcelIdentifier, Reprojector};

/// Anneau circulaire de `n` sommets autour de Copenhague (EPSG:25832)
fn ring(n: usize) -> Vec<Coord> {
    let mut coords: Vec<Coord> = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            Coord {
                x: 724352.0 + 50.0 * t.cos(),
                y: 6175804.0 + 50.0 * t.sin(),
            }
        })
        .collect();
    coords.push(coords[0]);
    coords
}

fn bench_transform(c: &mut Criterion) {
    let reproj = Reprojector::utm32_to_lonlat();

    let mut group = c.benchmark_group("transform_multi_polygon");
    for n in [16usize, 256, 4096] {
        let mp = MultiPolygon::new(vec![Polygon::new(LineString::new(ring(n)), vec![])]);
        group.throughput(Throughput::Elements(n as u64 + 1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &mp, |b, mp| {
            b.iter(|| {
                let out = reproj.transform_multi_polygon(black_box(mp)).unwrap();
                black_box(out)
            })
        });
    }
    group.finish();
}

fn bench_parse_response(c: &mut Criterion) {
    let id = ParcelIdentifier::parse("2000174:1695i").unwrap();
    let positions: Vec<[f64; 2]> = ring(1024).iter().map(|c| [c.x, c.y]).collect();
    let body = serde_json::json!([{
        "matrikelnummer": "1695i",
        "geometri": { "type": "MultiPolygon", "coordinates": [[positions]] }
    }])
    .to_string();

    let mut group = c.benchmark_group("parse_search_response");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("1024_vertices", |b| {
        b.iter(|| {
            let mp = parse_search_response(black_box(&body), &id).unwrap();
            black_box(mp)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_transform, bench_parse_response);
criterion_main!(benches);
