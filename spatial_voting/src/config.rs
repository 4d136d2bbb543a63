// ********* Input data structures ***********

use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::fmt::Display;

/// The number of issues of a randomly generated participant when nothing else
/// is requested.
pub const DEFAULT_NUMBER_OF_ISSUES: usize = 100;

/// The position of a participant on a single issue.
///
/// `location` is where the participant stands on the issue, `magnitude` is
/// how much the participant cares about it. Both are in `[0, 1]` after
/// construction, unless the participant was later changed with
/// [`crate::Participant::modify`].
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Preference {
    pub location: f64,
    pub magnitude: f64,
}

impl Preference {
    pub fn new(location: f64, magnitude: f64) -> Preference {
        Preference {
            location,
            magnitude,
        }
    }
}

impl From<(f64, f64)> for Preference {
    fn from(p: (f64, f64)) -> Preference {
        Preference::new(p.0, p.1)
    }
}

impl Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.location, self.magnitude)
    }
}

/// Errors that prevent an election from being computed.
#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    #[snafu(display("empty collection: no {what}"))]
    EmptyCollection { what: &'static str },
    #[snafu(display("mismatched issue count: expected {expected}, found {found}"))]
    MismatchedIssueCount { expected: usize, found: usize },
    #[snafu(display("issue index {index} is out of range ({issues} issues)"))]
    IssueOutOfRange { index: usize, issues: usize },
}

// ******** Voting methods *********

/// The voting rules that can be applied to an election.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum VotingMethod {
    /// One vote per voter for the closest candidate.
    #[serde(rename = "vote")]
    Plurality,
    /// One vote per voter for every candidate under the approval threshold.
    #[serde(rename = "approval")]
    Approval,
    /// Instant-runoff: eliminate one candidate per round until one is left.
    #[serde(rename = "ranked_choice")]
    RankedChoice,
    /// Baseline: a candidate picked uniformly at random.
    #[serde(rename = "random")]
    Random,
}

impl VotingMethod {
    /// All the methods, in the order the benchmark runs them.
    pub const ALL: [VotingMethod; 4] = [
        VotingMethod::Plurality,
        VotingMethod::Approval,
        VotingMethod::RankedChoice,
        VotingMethod::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VotingMethod::Plurality => "vote",
            VotingMethod::Approval => "approval",
            VotingMethod::RankedChoice => "ranked_choice",
            VotingMethod::Random => "random",
        }
    }
}

impl Display for VotingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ******** Output data structures *********

/// Statistics for one round of instant-runoff.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct RoundStats {
    pub round: u32,
    /// (candidate index, first-choice votes), in candidate order.
    pub tally: Vec<(usize, u64)>,
    /// The index of the candidate removed at the end of this round.
    pub eliminated: usize,
}

/// The outcome of an instant-runoff election.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct RankedChoiceResult {
    /// Index of the winner in the candidate list.
    pub winner: usize,
    pub round_stats: Vec<RoundStats>,
}

// ********* Configuration **********

/// The parameters of a benchmark run.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkConfig {
    pub trials: usize,
    pub candidates: usize,
    pub voters: usize,
    #[serde(default = "default_issues")]
    pub issues: usize,
    /// If set, the whole run is reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Draw a fresh election for every trial instead of reusing a single one.
    #[serde(default)]
    pub regenerate_each_trial: bool,
}

fn default_issues() -> usize {
    DEFAULT_NUMBER_OF_ISSUES
}

impl BenchmarkConfig {
    pub const DEFAULT: BenchmarkConfig = BenchmarkConfig {
        trials: 100,
        candidates: 25,
        voters: 1000,
        issues: DEFAULT_NUMBER_OF_ISSUES,
        seed: None,
        regenerate_each_trial: false,
    };
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig::DEFAULT
    }
}

/// The average normalized quality of every method, best (lowest) first.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub trials: usize,
    pub scores: Vec<(VotingMethod, f64)>,
}

impl BenchmarkResult {
    pub fn score(&self, method: VotingMethod) -> Option<f64> {
        self.scores
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, s)| *s)
    }
}
