//! Piece supply ("unpacker"): a supply policy drawing variant indices from a random source.

use clap::ValueEnum;
use log::error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid generator policy: {0}")]
    InvalidPolicy(String),
    #[error("unknown {kind} policy \"{name}\"")]
    UnknownPolicy { kind: &'static str, name: String },
}

/// Uniform integers in an inclusive range. Callers guarantee `low <= high`.
pub trait RandomSource: fmt::Debug {
    fn next_in_range(&mut self, low: usize, high: usize) -> usize;
}

/// `StdRng`-backed source: seeded for reproducible runs, entropy-seeded for play.
#[derive(Debug, Clone)]
pub struct StdRandomSource {
    rng: StdRng,
}

impl StdRandomSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for StdRandomSource {
    fn next_in_range(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }
}

/// Rule for turning random draws into the next variant index in `0..variant_count`.
pub trait SupplyPolicy: fmt::Debug {
    fn draw(&mut self, source: &mut dyn RandomSource, variant_count: usize) -> usize;
}

/// Independent uniform draws; repeats allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl SupplyPolicy for NoRules {
    fn draw(&mut self, source: &mut dyn RandomSource, variant_count: usize) -> usize {
        source.next_in_range(0, variant_count - 1)
    }
}

/// Every index once per `variant_count` draws, in shuffled order, then refill.
#[derive(Debug, Clone, Default)]
pub struct Bag {
    remaining: Vec<usize>,
}

impl Bag {
    fn refill(&mut self, source: &mut dyn RandomSource, variant_count: usize) {
        self.remaining.extend(0..variant_count);
        // Fisher–Yates shuffle
        for i in (1..self.remaining.len()).rev() {
            let j = source.next_in_range(0, i);
            self.remaining.swap(i, j);
        }
    }
}

impl SupplyPolicy for Bag {
    fn draw(&mut self, source: &mut dyn RandomSource, variant_count: usize) -> usize {
        if self.remaining.is_empty() {
            self.refill(source, variant_count);
        }
        self.remaining.pop().unwrap_or(0)
    }
}

/// Supply policy names accepted on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SupplyKind {
    #[default]
    #[value(name = "no_rules", alias = "no-rules")]
    NoRules,
    Bag,
}

const SUPPLY_NAMES: [(&str, SupplyKind); 3] = [
    ("no_rules", SupplyKind::NoRules),
    ("no-rules", SupplyKind::NoRules),
    ("bag", SupplyKind::Bag),
];

impl FromStr for SupplyKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        SUPPLY_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, kind)| kind)
            .ok_or(GeneratorError::UnknownPolicy {
                kind: "supply",
                name,
            })
    }
}

/// Random source names accepted on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    #[default]
    Entropy,
    Seeded,
}

const SOURCE_NAMES: [(&str, SourceKind); 2] = [
    ("entropy", SourceKind::Entropy),
    ("seeded", SourceKind::Seeded),
];

impl FromStr for SourceKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        SOURCE_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, kind)| kind)
            .ok_or(GeneratorError::UnknownPolicy {
                kind: "random source",
                name,
            })
    }
}

/// Produces the next piece variant index for the session.
#[derive(Debug)]
pub struct Unpacker {
    policy: Box<dyn SupplyPolicy>,
    source: Box<dyn RandomSource>,
    variant_count: usize,
}

impl Unpacker {
    pub fn new(
        policy: Box<dyn SupplyPolicy>,
        source: Box<dyn RandomSource>,
        variant_count: usize,
    ) -> Result<Self, GeneratorError> {
        if variant_count == 0 {
            return Err(GeneratorError::InvalidPolicy(
                "at least one piece variant is required".into(),
            ));
        }
        Ok(Self {
            policy,
            source,
            variant_count,
        })
    }

    /// Build from policy names resolved at startup. `Seeded` requires a seed.
    pub fn from_kinds(
        supply: SupplyKind,
        source: SourceKind,
        seed: Option<u64>,
        variant_count: usize,
    ) -> Result<Self, GeneratorError> {
        let policy: Box<dyn SupplyPolicy> = match supply {
            SupplyKind::NoRules => Box::new(NoRules),
            SupplyKind::Bag => Box::new(Bag::default()),
        };
        let source: Box<dyn RandomSource> = match (source, seed) {
            (SourceKind::Seeded, Some(seed)) => Box::new(StdRandomSource::seeded(seed)),
            (SourceKind::Seeded, None) => {
                return Err(GeneratorError::InvalidPolicy(
                    "seeded random source needs a seed".into(),
                ));
            }
            (SourceKind::Entropy, _) => Box::new(StdRandomSource::from_entropy()),
        };
        Self::new(policy, source, variant_count)
    }

    #[inline]
    pub fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Next variant index, always in `0..variant_count`.
    pub fn spawn_next(&mut self) -> usize {
        let index = self
            .policy
            .draw(self.source.as_mut(), self.variant_count);
        if index >= self.variant_count {
            error!(
                "supply policy {:?} returned {} for {} variants; wrapping",
                self.policy, index, self.variant_count
            );
            return index % self.variant_count;
        }
        index
    }
}
