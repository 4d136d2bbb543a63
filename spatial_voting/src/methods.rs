//! The voting rules.
//!
//! Every rule reads a list of voters and a list of candidates and returns the
//! index of the winning candidate.

use log::{debug, info};
use rand::Rng;
use snafu::{ensure, OptionExt};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::participant::{Participant, ParticipantId};

fn check_not_empty(voters: &[Participant], candidates: &[Participant]) -> Result<(), VotingErrors> {
    ensure!(
        !candidates.is_empty(),
        EmptyCollectionSnafu { what: "candidates" }
    );
    ensure!(!voters.is_empty(), EmptyCollectionSnafu { what: "voters" });
    Ok(())
}

// The candidate with the highest count. The sort is stable, so the lowest index
// wins among equal counts.
fn most_voted(tally: &[u64]) -> usize {
    let mut sorted_tally: Vec<(usize, u64)> = tally.iter().cloned().enumerate().collect();
    sorted_tally.sort_by_key(|(_, count)| Reverse(*count));
    debug!("most_voted: sorted tally: {:?}", sorted_tally);
    sorted_tally.first().map(|(idx, _)| *idx).unwrap_or(0)
}

/// First-past-the-post: every voter votes for the closest candidate.
pub fn plurality(voters: &[Participant], candidates: &[Participant]) -> Result<usize, VotingErrors> {
    check_not_empty(voters, candidates)?;
    let mut tally: Vec<u64> = vec![0; candidates.len()];
    for v in voters.iter() {
        tally[v.choose(candidates)?] += 1;
    }
    let winner = most_voted(&tally);
    info!("plurality: winner {} with {} votes", winner, tally[winner]);
    Ok(winner)
}

/// Every voter votes for all the candidates within its approval threshold.
///
/// Candidates sharing the same identity share one count, kept at their first
/// position: a voter approving such a candidate adds one for every entry.
pub fn approval(voters: &[Participant], candidates: &[Participant]) -> Result<usize, VotingErrors> {
    check_not_empty(voters, candidates)?;
    let mut first_index: HashMap<ParticipantId, usize> = HashMap::new();
    for (idx, c) in candidates.iter().enumerate() {
        first_index.entry(c.id()).or_insert(idx);
    }
    let mut tally: Vec<u64> = vec![0; candidates.len()];
    for v in voters.iter() {
        for idx in v.approved_indices(candidates)? {
            let slot = first_index
                .get(&candidates[idx].id())
                .cloned()
                .unwrap_or(idx);
            tally[slot] += 1;
        }
    }
    let winner = most_voted(&tally);
    info!("approval: winner {} with {} approvals", winner, tally[winner]);
    Ok(winner)
}

/// Instant-runoff voting.
///
/// At each round, every voter gives one vote to the closest remaining candidate,
/// and exactly one candidate is eliminated, until a single one is left.
///
/// The eliminated candidate is found by walking the remaining candidates in
/// their original order, starting from the highest count of the round: any
/// candidate whose count is lower or equal to the current value is selected and
/// its count becomes the new value. With several candidates at the lowest count,
/// the last one in candidate order is eliminated.
///
/// Candidates sharing the same identity are only counted once.
pub fn ranked_choice(
    voters: &[Participant],
    candidates: &[Participant],
) -> Result<RankedChoiceResult, VotingErrors> {
    check_not_empty(voters, candidates)?;

    let mut seen: HashSet<ParticipantId> = HashSet::new();
    let mut remaining: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| seen.insert(c.id()))
        .map(|(idx, _)| idx)
        .collect();

    let mut round_stats: Vec<RoundStats> = Vec::new();
    while remaining.len() > 1 {
        let round = (round_stats.len() + 1) as u32;

        let mut votes: HashMap<ParticipantId, u64> =
            remaining.iter().map(|&idx| (candidates[idx].id(), 0)).collect();
        for v in voters.iter() {
            let ranked = v.rank(remaining.iter().map(|&idx| &candidates[idx]))?;
            let top = ranked
                .first()
                .context(EmptyCollectionSnafu { what: "candidates" })?;
            if let Some(count) = votes.get_mut(&top.id()) {
                *count += 1;
            }
        }

        let tally: Vec<(usize, u64)> = remaining
            .iter()
            .map(|&idx| (idx, votes.get(&candidates[idx].id()).cloned().unwrap_or(0)))
            .collect();
        debug!("ranked_choice: round {} tally: {:?}", round, tally);

        let mut min_val: u64 = tally.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let mut min_pos: usize = 0;
        for (pos, (_, count)) in tally.iter().enumerate() {
            if *count <= min_val {
                min_val = *count;
                min_pos = pos;
            }
        }
        let eliminated = remaining.remove(min_pos);
        debug!(
            "ranked_choice: round {}: eliminating {} with {} votes",
            round, eliminated, min_val
        );
        round_stats.push(RoundStats {
            round,
            tally,
            eliminated,
        });
    }

    let winner = remaining
        .first()
        .cloned()
        .context(EmptyCollectionSnafu { what: "candidates" })?;
    info!(
        "ranked_choice: winner {} after {} rounds",
        winner,
        round_stats.len()
    );
    Ok(RankedChoiceResult {
        winner,
        round_stats,
    })
}

/// Baseline: any candidate, with equal probability. The voters are ignored.
pub fn random<R: Rng + ?Sized>(candidates: &[Participant], rng: &mut R) -> Result<usize, VotingErrors> {
    ensure!(
        !candidates.is_empty(),
        EmptyCollectionSnafu { what: "candidates" }
    );
    Ok(rng.random_range(0..candidates.len()))
}
