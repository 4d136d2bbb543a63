/*!
Spatial election simulator.

Voters and candidates are [`Participant`]s: points in an issue space where each
issue has a location and a magnitude (how much the participant cares about it).
A voter prefers the candidates that are close to it, weighted by its own
magnitudes.

An [`Election`] applies one of the voting methods to its voters and candidates:
- plurality ([`Election::vote`])
- approval ([`Election::approval`])
- instant-runoff ([`Election::ranked_choice`])
- a uniformly random candidate, as a baseline ([`Election::random`])

The winners are compared with [`Election::election_quality`], the total distance
from the voters to the winner. [`benchmark::benchmark`] repeats this over many
trials and reports the average rescaled quality of every method.

```
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use spatial_voting::*;

let mut rng = ChaCha20Rng::seed_from_u64(42);
let election = Election::with_issues(5, 100, 10, &mut rng)?;
let winner = election.ranked_choice()?;
let quality = election.election_quality(winner)?;
assert!(quality >= 0.0);

let result = benchmark::compare_methods(5, 5, 100, &mut rng)?;
assert_eq!(result.scores.len(), 4);
# Ok::<(), VotingErrors>(())
```
*/

pub mod benchmark;
mod config;
mod election;
pub mod methods;
mod participant;

pub use crate::config::*;
pub use crate::election::Election;
pub use crate::participant::{GaussianSource, Participant, ParticipantId, PreferenceSource};
