//! Deterministic random number generation.
//!
//! RULE: Nothing in the synthesizer may call any platform RNG.
//! All randomness flows through MetricRng instances derived
//! from the single master seed in the SynthConfig.
//!
//! Each generation stream gets its own RNG, seeded deterministically
//! from (master_seed XOR slot_index * golden-ratio constant). This means:
//!   - Adding a new metric never changes existing metrics' streams.
//!   - Each column's noise is fully reproducible in isolation.

use crate::metrics::Metric;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single generation stream.
pub struct MetricRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl MetricRng {
    /// Create a stream RNG from the master seed and a stable
    /// slot index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Standard normal draw (Box-Muller, cosine branch only).
    /// Consumes exactly two uniforms per call.
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }
}

/// All stream RNGs for a single synthesis, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> MetricRng {
        MetricRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    pub fn for_metric_noise(&self, metric: Metric) -> MetricRng {
        self.for_stream(StreamSlot::noise_for(metric))
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every column's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Engagement = 0,
    VisitsNoise = 1,
    SessionDurationNoise = 2,
    PagesNoise = 3,
    EmailOpenNoise = 4,
    EmailCtrNoise = 5,
    PurchaseFrequencyNoise = 6,
    OrderValueNoise = 7,
    LifetimeValueNoise = 8,
    NpsNoise = 9,
    // Add new streams here, append only.
}

impl StreamSlot {
    pub fn noise_for(metric: Metric) -> Self {
        match metric {
            Metric::VisitsPerMonth => Self::VisitsNoise,
            Metric::AvgSessionDuration => Self::SessionDurationNoise,
            Metric::PagesPerSession => Self::PagesNoise,
            Metric::EmailOpenRate => Self::EmailOpenNoise,
            Metric::EmailCtr => Self::EmailCtrNoise,
            Metric::PurchaseFrequency => Self::PurchaseFrequencyNoise,
            Metric::AverageOrderValue => Self::OrderValueNoise,
            Metric::CustomerLifetimeValue => Self::LifetimeValueNoise,
            Metric::NpsScore => Self::NpsNoise,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Engagement => "engagement",
            Self::VisitsNoise => "visits_noise",
            Self::SessionDurationNoise => "session_duration_noise",
            Self::PagesNoise => "pages_noise",
            Self::EmailOpenNoise => "email_open_noise",
            Self::EmailCtrNoise => "email_ctr_noise",
            Self::PurchaseFrequencyNoise => "purchase_frequency_noise",
            Self::OrderValueNoise => "order_value_noise",
            Self::LifetimeValueNoise => "lifetime_value_noise",
            Self::NpsNoise => "nps_noise",
        }
    }
}
