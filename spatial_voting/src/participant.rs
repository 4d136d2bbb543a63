use log::debug;
use rand::Rng;
use snafu::{ensure, OptionExt};
use std::fmt::Display;
use uuid::Uuid;

use crate::config::*;

/// An opaque token that tells two participants apart, even when they share
/// the same preferences.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ParticipantId(Uuid);

/// Something that can draw raw (not yet normalized) preferences.
pub trait PreferenceSource {
    fn sample_preference<R: Rng + ?Sized>(&self, rng: &mut R) -> Preference;
}

/// Draws both the location and the magnitude from a normal distribution.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct GaussianSource {
    pub mean: f64,
    pub std_dev: f64,
}

impl GaussianSource {
    pub const DEFAULT: GaussianSource = GaussianSource {
        mean: 50.0,
        std_dev: 50.0,
    };

    // Box-Muller. The first uniform is moved to (0, 1] so that the log is finite.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u1: f64 = 1.0 - rng.random::<f64>();
        let u2: f64 = rng.random::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        self.mean + self.std_dev * z
    }
}

impl Default for GaussianSource {
    fn default() -> Self {
        GaussianSource::DEFAULT
    }
}

impl PreferenceSource for GaussianSource {
    fn sample_preference<R: Rng + ?Sized>(&self, rng: &mut R) -> Preference {
        let location = self.sample(rng);
        let magnitude = self.sample(rng);
        Preference::new(location, magnitude)
    }
}

/// A point in the issue space. The same type is used for voters and for
/// candidates.
///
/// Equality compares the preferences only. Use [`Participant::id`] when two
/// participants must be told apart.
#[derive(Debug, Clone)]
pub struct Participant {
    preferences: Vec<Preference>,
    approval_threshold: f64,
    id: ParticipantId,
}

impl Participant {
    /// Creates a participant from explicit preferences.
    ///
    /// Locations and magnitudes are rescaled to `[0, 1]` over this participant's
    /// own issues. If either the locations or the magnitudes are all equal, no
    /// rescaling happens at all. When `approval_threshold` is missing, it is drawn
    /// uniformly among the integers of `[0, number of issues)`.
    pub fn new<R: Rng + ?Sized>(
        preferences: Vec<Preference>,
        approval_threshold: Option<f64>,
        rng: &mut R,
    ) -> Result<Participant, VotingErrors> {
        let approval_threshold = match approval_threshold {
            Some(t) => t,
            None if preferences.is_empty() => {
                return Participant::with_threshold(preferences, 0.0);
            }
            None => rng.random_range(0..preferences.len()) as f64,
        };
        Participant::with_threshold(preferences, approval_threshold)
    }

    /// Same as [`Participant::new`] with a known approval threshold.
    pub fn with_threshold(
        preferences: Vec<Preference>,
        approval_threshold: f64,
    ) -> Result<Participant, VotingErrors> {
        ensure!(
            !preferences.is_empty(),
            EmptyCollectionSnafu { what: "issues" }
        );
        Ok(Participant {
            preferences: normalized(preferences),
            approval_threshold,
            id: ParticipantId(Uuid::new_v4()),
        })
    }

    /// A participant with preferences drawn from [`GaussianSource::DEFAULT`].
    pub fn random<R: Rng + ?Sized>(
        number_of_issues: usize,
        rng: &mut R,
    ) -> Result<Participant, VotingErrors> {
        Participant::random_from(&GaussianSource::DEFAULT, number_of_issues, rng)
    }

    pub fn random_from<S: PreferenceSource, R: Rng + ?Sized>(
        source: &S,
        number_of_issues: usize,
        rng: &mut R,
    ) -> Result<Participant, VotingErrors> {
        let preferences: Vec<Preference> = (0..number_of_issues)
            .map(|_| source.sample_preference(rng))
            .collect();
        Participant::new(preferences, None, rng)
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// The (location, magnitude) pairs, one per issue, in issue order.
    pub fn preferences(&self) -> &[Preference] {
        &self.preferences
    }

    pub fn number_of_issues(&self) -> usize {
        self.preferences.len()
    }

    pub fn approval_threshold(&self) -> f64 {
        self.approval_threshold
    }

    /// Distance from this participant to `other`.
    ///
    /// This is the sum over the issues of the location gap, weighted by the
    /// magnitudes of `self` only. It is not symmetric.
    pub fn distance_to(&self, other: &Participant) -> Result<f64, VotingErrors> {
        ensure!(
            self.preferences.len() == other.preferences.len(),
            MismatchedIssueCountSnafu {
                expected: self.preferences.len(),
                found: other.preferences.len(),
            }
        );
        Ok(self
            .preferences
            .iter()
            .zip(other.preferences.iter())
            .map(|(mine, theirs)| (mine.location - theirs.location).abs() * mine.magnitude)
            .sum())
    }

    /// Index of the closest candidate. The first one wins in case of a tie.
    pub fn choose(&self, candidates: &[Participant]) -> Result<usize, VotingErrors> {
        let distances = candidates
            .iter()
            .map(|c| self.distance_to(c))
            .collect::<Result<Vec<f64>, VotingErrors>>()?;
        distances
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
            .context(EmptyCollectionSnafu { what: "candidates" })
    }

    /// The candidates from the closest to the furthest. Equally distant
    /// candidates keep their input order.
    pub fn rank<'a, I>(&self, candidates: I) -> Result<Vec<&'a Participant>, VotingErrors>
    where
        I: IntoIterator<Item = &'a Participant>,
    {
        let mut distances: Vec<(&'a Participant, f64)> = Vec::new();
        for c in candidates {
            distances.push((c, self.distance_to(c)?));
        }
        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(distances.into_iter().map(|(c, _)| c).collect())
    }

    /// The candidates at a distance lower or equal to the approval threshold,
    /// in input order.
    pub fn approve<'a>(
        &self,
        candidates: &'a [Participant],
    ) -> Result<Vec<&'a Participant>, VotingErrors> {
        Ok(self
            .approved_indices(candidates)?
            .into_iter()
            .map(|idx| &candidates[idx])
            .collect())
    }

    pub(crate) fn approved_indices(
        &self,
        candidates: &[Participant],
    ) -> Result<Vec<usize>, VotingErrors> {
        let mut res: Vec<usize> = Vec::new();
        for (idx, c) in candidates.iter().enumerate() {
            if self.distance_to(c)? <= self.approval_threshold {
                res.push(idx);
            }
        }
        Ok(res)
    }

    /// Overwrites the location and/or the magnitude of one issue.
    ///
    /// The preferences are not rescaled afterwards.
    pub fn modify(
        &mut self,
        index: usize,
        location: Option<f64>,
        magnitude: Option<f64>,
    ) -> Result<(), VotingErrors> {
        let issues = self.preferences.len();
        let p = self
            .preferences
            .get_mut(index)
            .context(IssueOutOfRangeSnafu { index, issues })?;
        if let Some(l) = location {
            p.location = l;
        }
        if let Some(m) = magnitude {
            p.magnitude = m;
        }
        Ok(())
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Participant) -> bool {
        self.preferences == other.preferences
    }
}

impl Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Voter: [")?;
        for (idx, p) in self.preferences.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "] Approval Threshold: {}", self.approval_threshold)
    }
}

fn min_max<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

// Both axes are rescaled together or not at all.
fn normalized(mut preferences: Vec<Preference>) -> Vec<Preference> {
    let (min_l, max_l) = min_max(preferences.iter().map(|p| p.location));
    let (min_m, max_m) = min_max(preferences.iter().map(|p| p.magnitude));
    if min_l == max_l || min_m == max_m {
        debug!(
            "normalized: degenerate preferences (locations {}..{}, magnitudes {}..{}), skipping",
            min_l, max_l, min_m, max_m
        );
        return preferences;
    }
    for p in preferences.iter_mut() {
        p.location = (p.location - min_l) / (max_l - min_l);
        p.magnitude = (p.magnitude - min_m) / (max_m - min_m);
    }
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(7)
    }

    fn flat(num_issues: usize, location: f64, magnitude: f64) -> Vec<Preference> {
        (0..num_issues)
            .map(|_| Preference::new(location, magnitude))
            .collect()
    }

    #[test]
    fn random_participant_has_requested_issues() {
        let mut rng = rng();
        let p = Participant::random(10, &mut rng).unwrap();
        assert_eq!(p.number_of_issues(), 10);
        assert!(p.approval_threshold() >= 0.0 && p.approval_threshold() < 10.0);
        assert_eq!(p.approval_threshold().fract(), 0.0);
        for pref in p.preferences() {
            assert!((0.0..=1.0).contains(&pref.location));
            assert!((0.0..=1.0).contains(&pref.magnitude));
        }
    }

    #[test]
    fn normalization_spans_unit_interval() {
        let p = Participant::with_threshold(
            vec![(10.0, 2.0).into(), (20.0, 4.0).into(), (30.0, 3.0).into()],
            0.0,
        )
        .unwrap();
        let prefs = p.preferences();
        assert_eq!(prefs[0], Preference::new(0.0, 0.0));
        assert_eq!(prefs[1], Preference::new(0.5, 1.0));
        assert_eq!(prefs[2], Preference::new(1.0, 0.5));
    }

    #[test]
    fn normalization_skipped_when_one_axis_is_flat() {
        // Locations vary but magnitudes do not: neither axis is rescaled.
        let raw: Vec<Preference> = vec![(-5.0, 3.0).into(), (7.0, 3.0).into()];
        let p = Participant::with_threshold(raw.clone(), 1.0).unwrap();
        assert_eq!(p.preferences(), raw.as_slice());

        let raw: Vec<Preference> = vec![(4.0, 1.0).into(), (4.0, 9.0).into()];
        let p = Participant::with_threshold(raw.clone(), 1.0).unwrap();
        assert_eq!(p.preferences(), raw.as_slice());
    }

    #[test]
    fn empty_preferences_are_rejected() {
        let mut rng = rng();
        assert_eq!(
            Participant::new(vec![], None, &mut rng).unwrap_err(),
            VotingErrors::EmptyCollection { what: "issues" }
        );
        assert_eq!(
            Participant::new(vec![], Some(3.0), &mut rng).unwrap_err(),
            VotingErrors::EmptyCollection { what: "issues" }
        );
        assert!(Participant::random(0, &mut rng).is_err());
    }

    #[test]
    fn explicit_threshold_is_kept() {
        let mut rng = rng();
        let p = Participant::new(flat(5, 1.0, 1.0), Some(1000.0), &mut rng).unwrap();
        assert_eq!(p.approval_threshold(), 1000.0);
    }

    #[test]
    fn distance_to_identical_preferences_is_zero() {
        let mut rng = rng();
        let v = Participant::random(10, &mut rng).unwrap();
        let same = Participant::new(v.preferences().to_vec(), None, &mut rng).unwrap();
        assert_eq!(v, same);
        assert_ne!(v.id(), same.id());
        assert_eq!(v.distance_to(&same).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_linear_in_one_issue() {
        let mut rng = rng();
        let v = Participant::random(10, &mut rng).unwrap();
        let mut different = Participant::new(v.preferences().to_vec(), None, &mut rng).unwrap();
        let loc = different.preferences()[0].location;
        different.modify(0, Some(loc + 1.0), None).unwrap();
        let expected = v.preferences()[0].magnitude;
        assert!((v.distance_to(&different).unwrap() - expected).abs() < 1e-12);

        different.modify(0, Some(loc - 0.25), None).unwrap();
        let expected = 0.25 * v.preferences()[0].magnitude;
        assert!((v.distance_to(&different).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn distance_uses_only_own_magnitudes() {
        let a = Participant::with_threshold(flat(3, 0.0, 2.0), 0.0).unwrap();
        let b = Participant::with_threshold(flat(3, 1.0, 5.0), 0.0).unwrap();
        assert_eq!(a.distance_to(&b).unwrap(), 6.0);
        assert_eq!(b.distance_to(&a).unwrap(), 15.0);
    }

    #[test]
    fn distance_rejects_mismatched_issue_counts() {
        let a = Participant::with_threshold(flat(3, 0.0, 1.0), 0.0).unwrap();
        let b = Participant::with_threshold(flat(4, 0.0, 1.0), 0.0).unwrap();
        assert_eq!(
            a.distance_to(&b).unwrap_err(),
            VotingErrors::MismatchedIssueCount {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn choose_closest_candidate() {
        let mut rng = rng();
        let v = Participant::random(DEFAULT_NUMBER_OF_ISSUES, &mut rng).unwrap();
        let same = Participant::new(v.preferences().to_vec(), None, &mut rng).unwrap();
        let mut candidates: Vec<Participant> = (0..10)
            .map(|_| Participant::random(DEFAULT_NUMBER_OF_ISSUES, &mut rng).unwrap())
            .collect();
        candidates.push(same);
        assert_eq!(v.choose(&candidates).unwrap(), candidates.len() - 1);

        let mut different = Participant::new(v.preferences().to_vec(), None, &mut rng).unwrap();
        let loc = different.preferences()[0].location;
        different.modify(0, Some(loc + 1.0), None).unwrap();
        candidates.pop();
        candidates.push(different);
        assert_eq!(v.choose(&candidates).unwrap(), candidates.len() - 1);
    }

    #[test]
    fn choose_breaks_ties_by_first_occurrence() {
        let v = Participant::with_threshold(flat(4, 1.0, 1.0), 0.0).unwrap();
        let far = Participant::with_threshold(flat(4, 3.0, 1.0), 0.0).unwrap();
        let near_a = Participant::with_threshold(flat(4, 2.0, 1.0), 0.0).unwrap();
        let near_b = near_a.clone();
        let near_c = Participant::with_threshold(flat(4, 0.0, 1.0), 0.0).unwrap();
        assert_eq!(v.choose(&[far.clone(), near_a.clone(), near_b]).unwrap(), 1);
        assert_eq!(v.choose(&[far, near_c, near_a]).unwrap(), 1);
        assert_eq!(
            v.choose(&[]).unwrap_err(),
            VotingErrors::EmptyCollection { what: "candidates" }
        );
    }

    #[test]
    fn rank_orders_by_distance() {
        let v = Participant::with_threshold(flat(10, 1.0, 1.0), 0.0).unwrap();
        let mut candidates: Vec<Participant> = (0..10)
            .map(|_| Participant::with_threshold(v.preferences().to_vec(), 0.0).unwrap())
            .collect();
        for (i, c) in candidates.iter_mut().enumerate() {
            c.modify(0, Some(1.0 + i as f64), None).unwrap();
        }
        let ids: Vec<ParticipantId> = candidates.iter().map(|c| c.id()).collect();
        let ranked: Vec<ParticipantId> = v.rank(&candidates).unwrap().iter().map(|c| c.id()).collect();
        assert_eq!(ranked, ids);

        let n = candidates.len();
        for (i, c) in candidates.iter_mut().rev().enumerate() {
            let loc = c.preferences()[0].location;
            c.modify(0, Some(loc + 5.0 * i as f64), None).unwrap();
        }
        // Distances are now 0+45, 1+40, ..., 9+0: strictly decreasing.
        let ranked: Vec<ParticipantId> = v.rank(&candidates).unwrap().iter().map(|c| c.id()).collect();
        let reversed: Vec<ParticipantId> = ids.iter().rev().cloned().collect();
        assert_eq!(ranked, reversed);
        assert_eq!(ranked.len(), n);
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let v = Participant::with_threshold(flat(2, 0.0, 1.0), 0.0).unwrap();
        let a = Participant::with_threshold(flat(2, 1.0, 1.0), 0.0).unwrap();
        let b = Participant::with_threshold(flat(2, 1.0, 1.0), 0.0).unwrap();
        let close = Participant::with_threshold(flat(2, 0.5, 1.0), 0.0).unwrap();
        let candidates = vec![a.clone(), b.clone(), close.clone()];
        let ranked: Vec<ParticipantId> = v.rank(&candidates).unwrap().iter().map(|c| c.id()).collect();
        assert_eq!(ranked, vec![close.id(), a.id(), b.id()]);
    }

    #[test]
    fn approve_respects_threshold() {
        let mut rng = rng();
        let mut v = Participant::new(flat(10, 0.5, 0.5), Some(1000.0), &mut rng).unwrap();
        let mut candidates: Vec<Participant> = (0..10)
            .map(|_| Participant::new(v.preferences().to_vec(), None, &mut rng).unwrap())
            .collect();
        assert_eq!(v.approve(&candidates).unwrap().len(), candidates.len());

        let loc = candidates[0].preferences()[0].location;
        candidates[0].modify(0, Some(loc + 1001.0), None).unwrap();
        v.modify(0, Some(0.0), Some(1.0)).unwrap();
        let approved = v.approve(&candidates).unwrap();
        assert_eq!(approved.len(), candidates.len() - 1);
        assert!(approved.iter().all(|c| c.id() != candidates[0].id()));
    }

    #[test]
    fn approve_boundary_is_inclusive() {
        let v = Participant::with_threshold(flat(2, 0.0, 1.0), 2.0).unwrap();
        let at = Participant::with_threshold(flat(2, 1.0, 1.0), 0.0).unwrap();
        let beyond = Participant::with_threshold(flat(2, 1.5, 1.0), 0.0).unwrap();
        let candidates = vec![beyond, at.clone()];
        let approved = v.approve(&candidates).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id(), at.id());
    }

    #[test]
    fn approve_zero_threshold_selects_exact_match() {
        let v = Participant::with_threshold(flat(3, 0.25, 1.0), 0.0).unwrap();
        let same = Participant::with_threshold(v.preferences().to_vec(), 0.0).unwrap();
        let other = Participant::with_threshold(flat(3, 0.75, 1.0), 0.0).unwrap();
        let candidates = vec![other, same.clone()];
        assert_eq!(v.approved_indices(&candidates).unwrap(), vec![1]);
    }

    #[test]
    fn modify_does_not_renormalize() {
        let mut p = Participant::with_threshold(flat(3, 0.5, 0.5), 0.0).unwrap();
        p.modify(1, Some(42.0), None).unwrap();
        assert_eq!(p.preferences()[1], Preference::new(42.0, 0.5));
        p.modify(1, None, Some(0.0)).unwrap();
        assert_eq!(p.preferences()[1], Preference::new(42.0, 0.0));
        assert_eq!(
            p.modify(3, Some(1.0), None).unwrap_err(),
            VotingErrors::IssueOutOfRange {
                index: 3,
                issues: 3
            }
        );
    }

    #[test]
    fn clones_share_identity_but_copies_do_not() {
        let p = Participant::with_threshold(flat(2, 0.0, 1.0), 0.0).unwrap();
        let cloned = p.clone();
        let copied = Participant::with_threshold(p.preferences().to_vec(), 0.0).unwrap();
        assert_eq!(p.id(), cloned.id());
        assert_ne!(p.id(), copied.id());
        assert_eq!(p, copied);
    }

    #[test]
    fn display_lists_preferences() {
        let p = Participant::with_threshold(vec![(0.0, 1.0).into(), (1.0, 0.0).into()], 3.0).unwrap();
        assert_eq!(p.to_string(), "Voter: [(0, 1), (1, 0)] Approval Threshold: 3");
    }
}
