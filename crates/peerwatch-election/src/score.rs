use rand::Rng;

/// Weight of the uptime component of a ballot score.
pub const UPTIME_WEIGHT: f64 = 0.6;
/// Weight of the (inverted) load component of a ballot score.
pub const LOAD_WEIGHT: f64 = 0.4;
/// Load samples fall in `[0, LOAD_CEILING)`.
pub const LOAD_CEILING: f64 = 10.0;

/// Source of the instantaneous load sample feeding a ballot score.
///
/// Production uses a fresh uniform sample per election, deliberately not
/// synchronized across nodes. Tests inject a fixed source to make ballots
/// reproducible.
pub trait LoadSampler: Send + Sync {
    fn sample(&self) -> f64;
}

/// Uniform random load in `[0, 10)`, drawn fresh on every call.
#[derive(Debug, Default)]
pub struct RandomLoad;

impl LoadSampler for RandomLoad {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..LOAD_CEILING)
    }
}

/// Constant load sample, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedLoad(pub f64);

impl LoadSampler for FixedLoad {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// The fitness score behind every ballot: long-lived, lightly-loaded nodes
/// rank highest.
pub fn ballot_score(uptime_secs: f64, load: f64) -> f64 {
    uptime_secs * UPTIME_WEIGHT + (LOAD_CEILING - load) * LOAD_WEIGHT
}
