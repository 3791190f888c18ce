//! Simulated tribute source for demos and training.
//!
//! Produces a plausible percentage record for any code without a backend:
//! ICMS 7–25%, PIS 0.65–2.3%, COFINS 3–10.6% and IPI 0–15%, each rounded to
//! two decimals, plus their total and a product name derived from the code.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

use super::TributeLookup;
use crate::constants::SIMULATED_NAME_PREFIX_LEN;
use crate::record::{FieldValue, TributeRecord};

/// Lookup that invents a record for every code.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLookup {
    /// Artificial latency before each answer.
    latency: Duration,
}

impl SimulatedLookup {
    /// Creates a simulated lookup that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds artificial latency before each answer (`simulated_latency_ms`).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Builds a simulated record for `code` from `rng`.
pub fn simulate(rng: &mut impl Rng, code: &str) -> TributeRecord {
    let icms = rng.random_range(7.0..25.0);
    let pis = rng.random_range(0.65..2.3);
    let cofins = rng.random_range(3.0..10.6);
    let ipi = rng.random_range(0.0..15.0);
    let total = icms + pis + cofins + ipi;

    let name: String = code.chars().take(SIMULATED_NAME_PREFIX_LEN).collect();

    TributeRecord::new(code)
        .with_field("produto", FieldValue::Text(format!("Produto {}", name)))
        .with_field("icms", FieldValue::Number(round2(icms)))
        .with_field("pis", FieldValue::Number(round2(pis)))
        .with_field("cofins", FieldValue::Number(round2(cofins)))
        .with_field("ipi", FieldValue::Number(round2(ipi)))
        .with_field("total", FieldValue::Number(round2(total)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait]
impl TributeLookup for SimulatedLookup {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn lookup(&self, code: &str) -> Result<Option<TributeRecord>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let record = {
            let mut rng = rand::rng();
            simulate(&mut rng, code)
        };
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn number(record: &TributeRecord, field: &str) -> f64 {
        match record.field(field) {
            Some(FieldValue::Number(n)) => *n,
            other => panic!("expected number for {}, got {:?}", field, other),
        }
    }

    #[test]
    fn test_simulated_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let record = simulate(&mut rng, "7891234567890");
            assert!((7.0..=25.0).contains(&number(&record, "icms")));
            assert!((0.65..=2.3).contains(&number(&record, "pis")));
            assert!((3.0..=10.6).contains(&number(&record, "cofins")));
            assert!((0.0..=15.0).contains(&number(&record, "ipi")));
        }
    }

    #[test]
    fn test_simulated_total_is_sum_of_rates() {
        let mut rng = StdRng::seed_from_u64(42);
        let record = simulate(&mut rng, "123");
        let sum = number(&record, "icms")
            + number(&record, "pis")
            + number(&record, "cofins")
            + number(&record, "ipi");
        assert!((number(&record, "total") - sum).abs() < 0.03);
    }

    #[test]
    fn test_simulated_product_name_uses_code_prefix() {
        let mut rng = StdRng::seed_from_u64(1);
        let record = simulate(&mut rng, "7891234567890");
        assert_eq!(
            record.field("produto"),
            Some(&FieldValue::Text("Produto 78912345".into()))
        );
        assert_eq!(record.code, "7891234567890");

        let short = simulate(&mut rng, "42");
        assert_eq!(short.field("produto"), Some(&FieldValue::Text("Produto 42".into())));
    }

    #[tokio::test]
    async fn test_simulated_lookup_always_hits() {
        let lookup = SimulatedLookup::new();
        let record = lookup.lookup("555").await.unwrap().unwrap();
        assert_eq!(record.code, "555");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_answer() {
        let lookup = SimulatedLookup::new().with_latency(Duration::from_millis(300));
        let start = tokio::time::Instant::now();
        lookup.lookup("1").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(18.456), 18.46);
        assert_eq!(round2(0.004), 0.0);
    }
}
