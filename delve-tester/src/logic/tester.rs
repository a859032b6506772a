use anyhow::{Context, Result};
use colored::Colorize;
use delve_game::{CharacterStore, GameConfig, GameEngine};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::policy::Strategy;
use crate::logic::simulation::{RunSummary, SimulationConfig, SimulationSession};

/// Every run for one seed, plus its pass/fail verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResult {
    pub seed: u64,
    pub strategy: Strategy,
    pub passed: bool,
    pub iterations_run: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    pub runs: Vec<RunSummary>,
}

impl SeedResult {
    #[must_use]
    pub fn survivors(&self) -> usize {
        self.runs.iter().filter(|run| run.survived()).count()
    }

    #[must_use]
    pub fn mean_level(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        let total: f64 = self.runs.iter().map(|run| f64::from(run.final_level)).sum();
        total / f64::from(u32::try_from(self.runs.len()).unwrap_or(u32::MAX))
    }
}

pub struct LogicTester {
    strategy: Strategy,
    iterations: usize,
    max_turns: u32,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(strategy: Strategy, iterations: usize, max_turns: u32, verbose: bool) -> Self {
        Self {
            strategy,
            iterations,
            max_turns,
            verbose,
        }
    }

    /// Run every iteration for `seed` against an engine rolled from that seed.
    ///
    /// # Errors
    ///
    /// Fails only when the engine cannot be built from `config`.
    pub fn run_seed<S: CharacterStore>(
        &self,
        config: &GameConfig,
        store: S,
        seed: u64,
    ) -> Result<SeedResult> {
        let engine = GameEngine::with_seed(config.clone(), store, seed)
            .with_context(|| format!("building engine for seed {seed}"))?;

        if self.verbose {
            println!(
                "🧪 Simulating {} (seed {seed}, {} iterations)",
                self.strategy.label().bright_white(),
                self.iterations
            );
        }

        let mut failures = Vec::new();
        let mut runs = Vec::with_capacity(self.iterations);
        let mut durations = Vec::with_capacity(self.iterations);

        for i in 0..self.iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let mut rng = ChaCha20Rng::seed_from_u64(iteration_seed);
            let sim_config =
                SimulationConfig::new(self.strategy, seed, i).with_max_turns(self.max_turns);

            match SimulationSession::new(&engine, sim_config).run(&mut rng) {
                Ok(summary) => {
                    let duration = start_time.elapsed();
                    durations.push(duration);
                    for violation in &summary.violations {
                        failures.push(format!("Iteration {} (seed {seed}): {violation}", i + 1));
                    }
                    if self.verbose {
                        let status = if summary.violations.is_empty() {
                            "✅".to_string()
                        } else {
                            "❌".red().to_string()
                        };
                        println!(
                            "  {status} Iteration {}/{} ({duration:?}) level:{} kills:{} flees:{} turns:{}",
                            i + 1,
                            self.iterations,
                            summary.final_level,
                            summary.kills,
                            summary.flees,
                            summary.turns
                        );
                    }
                    runs.push(summary);
                }
                Err(err) => {
                    log::warn!("seed {seed} iteration {} aborted: {err}", i + 1);
                    failures.push(format!("Iteration {} (seed {seed}) aborted: {err}", i + 1));
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        Ok(SeedResult {
            seed,
            strategy: self.strategy,
            passed: failures.is_empty(),
            iterations_run: self.iterations,
            failures,
            average_duration,
            runs,
        })
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_game::{JsonFileStore, MemoryStore};

    #[test]
    fn seed_result_collects_every_iteration() {
        let tester = LogicTester::new(Strategy::Balanced, 3, 120, false);
        let store = MemoryStore::new();
        let result = tester
            .run_seed(&GameConfig::default(), &store, 1337)
            .unwrap();
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.runs.len(), 3);
        assert!(result.mean_level() >= 1.0);
        assert!(store.is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["strategy"], "balanced");
        assert!(json["average_duration"].is_u64());
    }

    #[test]
    fn invalid_config_is_reported() {
        let tester = LogicTester::new(Strategy::Aggressive, 1, 10, false);
        let config = GameConfig {
            species: Vec::new(),
            ..GameConfig::default()
        };
        let err = tester
            .run_seed(&config, MemoryStore::new(), 1)
            .unwrap_err();
        assert!(format!("{err:#}").contains("seed 1"));
    }

    #[test]
    fn file_store_runs_clean_up_after_themselves() {
        let path = std::env::temp_dir().join(format!(
            "delve-tester-store-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let store = JsonFileStore::new(&path);
        let tester = LogicTester::new(Strategy::Cautious, 2, 60, false);
        let result = tester.run_seed(&GameConfig::default(), &store, 9).unwrap();
        assert!(result.passed, "{:?}", result.failures);
        let document: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(document["characters"], serde_json::json!({}));
        let _ = std::fs::remove_file(path);
    }
}
