//! Fuzz target for canonical factor operations.
//!
//! Arbitrary parameters and evidence may be rejected with an error but
//! must never panic, and a failed in-place operation must leave the
//! factor unchanged.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pgm_factors::CanonicalFactor;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Arbitrary)]
struct Input {
    dim: u8,
    k: Vec<f64>,
    h: Vec<f64>,
    g: f64,
    evidence: Vec<(u8, f64)>,
    marginal: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let n = usize::from(input.dim % 4) + 1;
    let scope: Vec<String> = NAMES[..n].iter().map(|s| s.to_string()).collect();
    let k: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| input.k.get(i * n + j).copied().unwrap_or(0.0)).collect())
        .collect();
    let h: Vec<f64> = (0..n).map(|i| input.h.get(i).copied().unwrap_or(0.0)).collect();

    let Ok(mut factor) = CanonicalFactor::from_rows(scope, &k, &h, input.g) else {
        return;
    };

    let evidence: Vec<(&str, f64)> = input
        .evidence
        .iter()
        .map(|(i, v)| (NAMES[usize::from(*i % 4)], *v))
        .collect();
    let before = factor.clone();
    if factor.reduce_in_place(&evidence).is_err() {
        let same_bits = factor
            .k()
            .iter()
            .zip(before.k().iter())
            .all(|(a, b)| a.to_bits() == b.to_bits());
        assert!(same_bits);
        assert_eq!(factor.scope(), before.scope());
    }

    let marginal: Vec<&str> = input.marginal.iter().map(|i| NAMES[usize::from(*i % 4)]).collect();
    let _ = factor.marginalize(&marginal);
    let _ = factor.product(&before);
    let _ = before.divide(&factor);
});
