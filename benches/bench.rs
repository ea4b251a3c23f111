// Criterion benchmarks for Rally Up

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rally_up::core::{distance::distance_miles, filters::derive_ratings, PlayerSearch};
use rally_up::models::{Geocoordinate, PlayerProfile, SearchCriteria, SkillLevel};
use rally_up::services::Geocoder;
use std::sync::Arc;

const SKILLS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

/// Resolves any five-digit code to a point offset from midtown Manhattan
struct GridGeocoder;

#[async_trait]
impl Geocoder for GridGeocoder {
    async fn resolve(&self, postal_code: &str) -> Option<Geocoordinate> {
        let n: u32 = postal_code.parse().ok()?;
        let offset = (n % 500) as f64 * 0.001;
        Some(Geocoordinate {
            latitude: 40.7128 + offset,
            longitude: -74.0060 + offset,
            city: "New York".to_string(),
            state: "NY".to_string(),
        })
    }
}

fn create_player(id: usize) -> PlayerProfile {
    PlayerProfile {
        id: id.to_string(),
        first_name: format!("Player {}", id),
        skill_level: SKILLS[id % 3].to_string(),
        rating: format!("{:.1}", 1.0 + (id % 60) as f64 * 0.1),
        rating_type: if id % 2 == 0 { "ntrp" } else { "utr" }.to_string(),
        zipcode: format!("{:05}", 10000 + id),
        ..Default::default()
    }
}

fn coord(lat: f64, lon: f64) -> Geocoordinate {
    Geocoordinate {
        latitude: lat,
        longitude: lon,
        city: String::new(),
        state: String::new(),
    }
}

fn bench_distance_miles(c: &mut Criterion) {
    let a = coord(40.7506, -73.9972);
    let b = coord(40.7157, -73.9863);

    c.bench_function("distance_miles", |bench| {
        bench.iter(|| distance_miles(black_box(&a), black_box(&b)));
    });
}

fn bench_derive_ratings(c: &mut Criterion) {
    let player = create_player(7);

    c.bench_function("derive_ratings", |b| {
        b.iter(|| derive_ratings(black_box(&player)));
    });
}

fn bench_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let search = PlayerSearch::new(Arc::new(GridGeocoder));
    let criteria = SearchCriteria {
        skill_level: Some(SkillLevel::Intermediate),
        origin_postal_code: Some("10000".to_string()),
        radius_miles: Some(10.0),
    };

    let mut group = c.benchmark_group("search");

    for roster_size in [10, 100, 1000].iter() {
        let roster: Vec<PlayerProfile> = (0..*roster_size).map(create_player).collect();

        group.bench_with_input(
            BenchmarkId::new("skill_and_radius", roster_size),
            roster_size,
            |b, _| {
                b.iter(|| {
                    runtime.block_on(search.search(black_box(roster.clone()), black_box(&criteria)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_distance_miles, bench_derive_ratings, bench_search);

criterion_main!(benches);
