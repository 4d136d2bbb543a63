use log::{debug, info};
use rand::Rng;

use crate::config::*;
use crate::methods;
use crate::participant::Participant;

/// A set of candidates and the voters choosing among them.
///
/// The voting methods always read the current candidates and voters, so they
/// can be replaced between two calls.
#[derive(Debug, Clone)]
pub struct Election {
    candidates: Vec<Participant>,
    voters: Vec<Participant>,
}

impl Election {
    /// An election with random participants, each with
    /// [`DEFAULT_NUMBER_OF_ISSUES`] issues.
    pub fn new<R: Rng + ?Sized>(
        num_candidates: usize,
        num_voters: usize,
        rng: &mut R,
    ) -> Result<Election, VotingErrors> {
        Election::with_issues(num_candidates, num_voters, DEFAULT_NUMBER_OF_ISSUES, rng)
    }

    pub fn with_issues<R: Rng + ?Sized>(
        num_candidates: usize,
        num_voters: usize,
        num_issues: usize,
        rng: &mut R,
    ) -> Result<Election, VotingErrors> {
        let candidates = (0..num_candidates)
            .map(|_| Participant::random(num_issues, rng))
            .collect::<Result<Vec<Participant>, VotingErrors>>()?;
        let voters = (0..num_voters)
            .map(|_| Participant::random(num_issues, rng))
            .collect::<Result<Vec<Participant>, VotingErrors>>()?;
        info!(
            "Election: {} candidates, {} voters, {} issues",
            num_candidates, num_voters, num_issues
        );
        Ok(Election { candidates, voters })
    }

    pub fn from_participants(candidates: Vec<Participant>, voters: Vec<Participant>) -> Election {
        Election { candidates, voters }
    }

    pub fn candidates(&self) -> &[Participant] {
        &self.candidates
    }

    pub fn voters(&self) -> &[Participant] {
        &self.voters
    }

    pub fn set_candidates(&mut self, candidates: Vec<Participant>) {
        debug!("set_candidates: {} candidates", candidates.len());
        self.candidates = candidates;
    }

    pub fn set_voters(&mut self, voters: Vec<Participant>) {
        debug!("set_voters: {} voters", voters.len());
        self.voters = voters;
    }

    /// The sum of the distances from every voter to `winner`. Lower is better.
    pub fn election_quality(&self, winner: &Participant) -> Result<f64, VotingErrors> {
        let mut total = 0.0;
        for v in self.voters.iter() {
            total += v.distance_to(winner)?;
        }
        Ok(total)
    }

    /// Plurality vote.
    pub fn vote(&self) -> Result<&Participant, VotingErrors> {
        let idx = methods::plurality(&self.voters, &self.candidates)?;
        Ok(&self.candidates[idx])
    }

    pub fn approval(&self) -> Result<&Participant, VotingErrors> {
        let idx = methods::approval(&self.voters, &self.candidates)?;
        Ok(&self.candidates[idx])
    }

    pub fn ranked_choice(&self) -> Result<&Participant, VotingErrors> {
        let res = self.ranked_choice_rounds()?;
        Ok(&self.candidates[res.winner])
    }

    /// Instant-runoff, with the statistics of every round.
    pub fn ranked_choice_rounds(&self) -> Result<RankedChoiceResult, VotingErrors> {
        methods::ranked_choice(&self.voters, &self.candidates)
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Participant, VotingErrors> {
        let idx = methods::random(&self.candidates, rng)?;
        Ok(&self.candidates[idx])
    }

    /// Runs the given method. `rng` is only used by [`VotingMethod::Random`].
    pub fn run<R: Rng + ?Sized>(
        &self,
        method: VotingMethod,
        rng: &mut R,
    ) -> Result<&Participant, VotingErrors> {
        match method {
            VotingMethod::Plurality => self.vote(),
            VotingMethod::Approval => self.approval(),
            VotingMethod::RankedChoice => self.ranked_choice(),
            VotingMethod::Random => self.random(rng),
        }
    }
}
