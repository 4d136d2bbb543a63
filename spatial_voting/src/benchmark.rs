//! Compares the voting methods over many elections.
//!
//! For every trial, each method picks a winner, the winner is scored with
//! [`Election::election_quality`], and the scores of the trial are rescaled to
//! `[0, 1]` so that trials weigh the same. The reported value of a method is its
//! average rescaled score: 0 means it always found the best winner among the
//! methods, 1 that it always found the worst one.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use snafu::ensure;

use crate::config::*;
use crate::election::Election;

/// Min-max rescaling to `[0, 1]`. If all the values are equal, they all map to 1.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let smallest = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let largest = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if smallest == largest {
        return vec![1.0; values.len()];
    }
    values
        .iter()
        .map(|v| (v - smallest) / (largest - smallest))
        .collect()
}

/// Runs the benchmark described by `config`, drawing everything from `rng`.
///
/// The seed in `config` is ignored here, see [`run_benchmark`].
pub fn benchmark<R: Rng + ?Sized>(
    config: &BenchmarkConfig,
    rng: &mut R,
) -> Result<BenchmarkResult, VotingErrors> {
    ensure!(config.trials > 0, EmptyCollectionSnafu { what: "trials" });
    info!("benchmark: starting with {:?}", config);

    let mut election =
        Election::with_issues(config.candidates, config.voters, config.issues, rng)?;
    let mut totals: Vec<f64> = vec![0.0; VotingMethod::ALL.len()];

    for trial in 0..config.trials {
        if config.regenerate_each_trial && trial > 0 {
            election =
                Election::with_issues(config.candidates, config.voters, config.issues, rng)?;
        }
        let mut qualities: Vec<f64> = Vec::with_capacity(VotingMethod::ALL.len());
        for method in VotingMethod::ALL {
            let winner = election.run(method, rng)?;
            qualities.push(election.election_quality(winner)?);
        }
        let run = normalize(&qualities);
        debug!(
            "benchmark: trial {}: qualities {:?} normalized {:?}",
            trial, qualities, run
        );
        for (total, score) in totals.iter_mut().zip(run.iter()) {
            *total += score;
        }
    }

    let mut scores: Vec<(VotingMethod, f64)> = VotingMethod::ALL
        .iter()
        .zip(totals.iter())
        .map(|(m, total)| (*m, total / config.trials as f64))
        .collect();
    scores.sort_by(|a, b| a.1.total_cmp(&b.1));
    for (method, score) in scores.iter() {
        info!("benchmark: {:>14} {:.4}", method.name(), score);
    }
    Ok(BenchmarkResult {
        trials: config.trials,
        scores,
    })
}

/// Runs the benchmark with a generator seeded from `config.seed`, or with the
/// thread generator if there is no seed.
pub fn run_benchmark(config: &BenchmarkConfig) -> Result<BenchmarkResult, VotingErrors> {
    match config.seed {
        Some(seed) => benchmark(config, &mut ChaCha20Rng::seed_from_u64(seed)),
        None => benchmark(config, &mut rand::rng()),
    }
}

/// The average rescaled quality of every method, for `trials` runs of a single
/// election with the given numbers of candidates and voters.
pub fn compare_methods<R: Rng + ?Sized>(
    trials: usize,
    candidates: usize,
    voters: usize,
    rng: &mut R,
) -> Result<BenchmarkResult, VotingErrors> {
    let config = BenchmarkConfig {
        trials,
        candidates,
        voters,
        ..BenchmarkConfig::DEFAULT
    };
    benchmark(&config, rng)
}
