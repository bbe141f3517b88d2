//! Locality checks: strings sharing many n-grams get close encodings.

use minhash_encoder::{EncoderConfig, MinHashEncoder, StringTable};

fn encode(values: &[&str], n_components: usize) -> Vec<Vec<f32>> {
    let cfg = EncoderConfig::new()
        .with_n_components(n_components)
        .with_ngram_range(2, 4);
    MinHashEncoder::new(cfg)
        .expect("valid config")
        .transform(&StringTable::from_column(values.iter().copied()))
        .expect("transform")
        .rows()
        .map(<[f32]>::to_vec)
        .collect()
}

/// Number of components on which two encodings agree exactly.
fn agreement(a: &[f32], b: &[f32]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x == y).count()
}

fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

#[test]
fn city_scenario_shape() {
    let rows = encode(&["paris, FR", "Paris", "London, UK", "London"], 5);
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.len() == 5));
    assert!(rows.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn same_city_agrees_more_than_different_cities() {
    let rows = encode(&["paris, FR", "Paris", "London, UK", "London"], 256);
    let (paris_fr, paris, london_uk, london) = (&rows[0], &rows[1], &rows[2], &rows[3]);

    let within = agreement(paris_fr, paris).min(agreement(london_uk, london));
    let across = [
        agreement(paris_fr, london_uk),
        agreement(paris_fr, london),
        agreement(paris, london_uk),
        agreement(paris, london),
    ]
    .into_iter()
    .max()
    .unwrap_or(0);
    assert!(within > across + 40, "within={within} across={across}");

    assert!(distance(paris_fr, paris) < distance(paris_fr, london));
    assert!(distance(london_uk, london) < distance(london_uk, paris));
}

#[test]
fn agreement_tracks_overlap() {
    let rows = encode(
        &[
            "international business machines",
            "international business machine",
            "international trade",
            "zebra crossing",
        ],
        512,
    );
    let near = agreement(&rows[0], &rows[1]);
    let mid = agreement(&rows[0], &rows[2]);
    let far = agreement(&rows[0], &rows[3]);
    assert!(near > mid, "near={near} mid={mid}");
    assert!(mid > far, "mid={mid} far={far}");
}
