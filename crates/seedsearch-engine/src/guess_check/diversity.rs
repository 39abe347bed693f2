//! Soft preference hints steering candidates away from explored compounds

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Share of the hints forgotten each round, in percent.
const FORGET_PERCENT: usize = 50;

const HEURISTIC_RULES: &str = "\
#heuristic new_seed(M) : avoidseed(M). [10,false]
#heuristic new_seed(M). [1,false]
";

/// Avoided compounds, updated after every oracle verdict.
#[derive(Debug, Clone)]
pub struct Diversity {
    rng: ChaCha8Rng,
    avoided: Vec<String>,
}

impl Diversity {
    /// A fixed `seed` makes the forget/recall choices reproducible.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            avoided: Vec::new(),
        }
    }

    /// Forget half of the avoided compounds, then avoid half of `seeds`.
    pub fn update(&mut self, seeds: &BTreeSet<String>) {
        self.avoided.shuffle(&mut self.rng);
        let forget = self.avoided.len() * FORGET_PERCENT / 100;
        self.avoided.drain(..forget);

        let mut recalled: Vec<String> = seeds.iter().cloned().collect();
        recalled.shuffle(&mut self.rng);
        let skip = recalled.len() * FORGET_PERCENT / 100;
        for seed in recalled.into_iter().skip(skip) {
            if !self.avoided.contains(&seed) {
                self.avoided.push(seed);
            }
        }
    }

    #[must_use]
    pub fn avoided(&self) -> &[String] {
        &self.avoided
    }

    /// Heuristic rules plus one `avoidseed` fact per avoided compound.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(HEURISTIC_RULES);
        for seed in &self.avoided {
            let _ = writeln!(
                out,
                "avoidseed(\"{}\").",
                seed.replace('\\', "\\\\").replace('"', "\\\"")
            );
        }
        out
    }
}

/// Domain heuristics are only honoured with `--heuristic=Domain`.
pub(crate) fn ensure_domain_heuristic(flags: &mut Vec<String>) {
    if !flags.iter().any(|flag| flag == "--heuristic=Domain") {
        flags.insert(0, "--heuristic=Domain".to_string());
    }
}
