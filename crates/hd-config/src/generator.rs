//! Candidate-value generation and baseline bookkeeping.
//!
//! The generator owns the five horizon baselines for a run. For a given
//! parameter it produces discrete candidate values (baseline first, always),
//! materializes full configurations with one candidate applied, and stamps
//! adopted optima back into the baselines, propagating shared parameters to
//! every horizon so they never drift apart.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;

use hd_types::{ConfigError, HdResult, Horizon, ScoringConfig};
use tracing::{debug, info};

use crate::baseline::load_baseline_folder;
use crate::schema::{self, ParamScope};

/// Candidate value sets for one parameter, keyed by scope.
#[derive(Debug, Clone, PartialEq)]
pub enum HorizonCandidates {
    /// Shared parameter: one value set tested across all horizons.
    Shared(Vec<f64>),
    /// Horizon-specific parameter: five independent value sets.
    PerHorizon(HashMap<Horizon, Vec<f64>>),
}

#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    baselines: HashMap<Horizon, ScoringConfig>,
    num_test_values: usize,
}

impl CandidateGenerator {
    /// Requires a baseline for every horizon.
    pub fn new(
        baselines: HashMap<Horizon, ScoringConfig>,
        num_test_values: usize,
    ) -> HdResult<Self> {
        for horizon in Horizon::ALL {
            if !baselines.contains_key(&horizon) {
                return Err(ConfigError::MissingBaseline {
                    horizon: horizon.to_string(),
                }
                .into());
            }
        }
        info!(
            num_test_values,
            "candidate generator initialized with 5 horizon baselines"
        );
        Ok(Self {
            baselines,
            num_test_values,
        })
    }

    /// Load baselines from a checkpoint-layout folder.
    pub fn from_folder(folder: &Path, num_test_values: usize) -> HdResult<Self> {
        let baselines = load_baseline_folder(folder)?;
        Self::new(baselines, num_test_values)
    }

    pub fn num_test_values(&self) -> usize {
        self.num_test_values
    }

    pub fn baseline(&self, horizon: Horizon) -> HdResult<&ScoringConfig> {
        self.baselines
            .get(&horizon)
            .ok_or_else(|| {
                ConfigError::MissingBaseline {
                    horizon: horizon.to_string(),
                }
                .into()
            })
    }

    pub fn baselines(&self) -> &HashMap<Horizon, ScoringConfig> {
        &self.baselines
    }

    /// Whether an update to this parameter must propagate to all horizons.
    pub fn is_shared(&self, param: &str) -> HdResult<bool> {
        Ok(schema::lookup(param)?.scope == ParamScope::Shared)
    }

    /// Candidate values for one parameter against one horizon's baseline.
    ///
    /// The baseline value (rounded onto the parameter's grid) is always the
    /// first element. When the requested test-value count covers the whole
    /// discrete range, every legal value follows in range order; otherwise a
    /// uniform random sample without replacement of the remaining values is
    /// appended.
    pub fn candidate_values<R: Rng>(
        &self,
        rng: &mut R,
        param: &str,
        horizon: Horizon,
    ) -> HdResult<Vec<f64>> {
        let def = schema::lookup(param)?;
        let baseline_config = self.baseline(horizon)?;
        let baseline_value =
            def.precision
                .round(schema::value_of(&baseline_config.parameters, param)?);

        let possible = schema::discrete_range(def);
        let half_step = def.precision.step() / 2.0;
        let remaining: Vec<f64> = possible
            .iter()
            .copied()
            .filter(|v| (v - baseline_value).abs() > half_step)
            .collect();

        let mut values = vec![baseline_value];
        if self.num_test_values >= possible.len() {
            values.extend(remaining);
            debug!(
                param,
                count = values.len(),
                "returning full discrete range, baseline first"
            );
        } else {
            let sample_size = self.num_test_values.min(remaining.len());
            values.extend(remaining.choose_multiple(rng, sample_size).copied());
            debug!(
                param,
                count = values.len(),
                possible = possible.len(),
                "sampled candidate subset"
            );
        }
        Ok(values)
    }

    /// Candidate sets for a parameter across horizons: shared parameters get
    /// one set; horizon-specific parameters get five independent sets.
    pub fn horizon_candidates<R: Rng>(
        &self,
        rng: &mut R,
        param: &str,
    ) -> HdResult<HorizonCandidates> {
        if self.is_shared(param)? {
            Ok(HorizonCandidates::Shared(self.candidate_values(
                rng,
                param,
                Horizon::RestOfSeason,
            )?))
        } else {
            let mut per_horizon = HashMap::new();
            for horizon in Horizon::ALL {
                per_horizon.insert(horizon, self.candidate_values(rng, param, horizon)?);
            }
            Ok(HorizonCandidates::PerHorizon(per_horizon))
        }
    }

    /// A fully independent copy of the horizon's baseline with the single
    /// named parameter overwritten. The baseline itself is never mutated.
    pub fn apply_candidate(
        &self,
        horizon: Horizon,
        param: &str,
        value: f64,
    ) -> HdResult<ScoringConfig> {
        let mut config = self.baseline(horizon)?.clone();
        schema::apply_value(&mut config.parameters, param, value)?;
        Ok(config)
    }

    /// Stamp an adopted optimum back into the baselines. Shared parameters
    /// are written into every horizon; horizon-specific parameters only into
    /// the horizon that won.
    pub fn adopt_value(&mut self, horizon: Horizon, param: &str, value: f64) -> HdResult<()> {
        if self.is_shared(param)? {
            for config in self.baselines.values_mut() {
                schema::apply_value(&mut config.parameters, param, value)?;
            }
            debug!(param, value, "adopted shared value across all horizons");
        } else {
            let config = self.baselines.get_mut(&horizon).ok_or_else(|| {
                ConfigError::MissingBaseline {
                    horizon: horizon.to_string(),
                }
            })?;
            schema::apply_value(&mut config.parameters, param, value)?;
            debug!(param, value, %horizon, "adopted horizon-specific value");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{value_of, PARAMETERS};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn default_baselines() -> HashMap<Horizon, ScoringConfig> {
        Horizon::ALL
            .iter()
            .map(|&h| (h, ScoringConfig::default()))
            .collect()
    }

    fn generator(num_test_values: usize) -> CandidateGenerator {
        CandidateGenerator::new(default_baselines(), num_test_values).unwrap()
    }

    #[test]
    fn missing_horizon_baseline_rejected() {
        let mut baselines = default_baselines();
        baselines.remove(&Horizon::Weeks6To9);
        assert!(CandidateGenerator::new(baselines, 5).is_err());
    }

    #[test]
    fn baseline_always_first_for_every_parameter() {
        let gen = generator(5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for def in &PARAMETERS {
            let baseline = def.precision.round(
                value_of(
                    &gen.baseline(Horizon::RestOfSeason).unwrap().parameters,
                    def.name,
                )
                .unwrap(),
            );
            let values = gen
                .candidate_values(&mut rng, def.name, Horizon::RestOfSeason)
                .unwrap();
            assert_eq!(values[0], baseline, "{}", def.name);
            assert_eq!(values.len(), 6, "{}", def.name);
        }
    }

    #[test]
    fn sampled_values_are_unique_and_in_bounds() {
        let gen = generator(5);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let def = schema::lookup("MATCHUP_IMPACT_SCALE").unwrap();
        for _ in 0..20 {
            let values = gen
                .candidate_values(&mut rng, "MATCHUP_IMPACT_SCALE", Horizon::Weeks1To5)
                .unwrap();
            for v in &values {
                assert!(*v >= def.min && *v <= def.max);
            }
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            sorted.dedup();
            assert_eq!(sorted.len(), values.len(), "duplicate candidate in {values:?}");
        }
    }

    #[test]
    fn large_request_returns_full_range() {
        // DIFF_POS_BYE_WEIGHT at precision 2 over [0, 0.3] has 31 values.
        let gen = generator(31);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let values = gen
            .candidate_values(&mut rng, "DIFF_POS_BYE_WEIGHT", Horizon::RestOfSeason)
            .unwrap();
        assert_eq!(values.len(), 31);
        assert_eq!(values[0], 0.1); // baseline first
        // Remainder follows in range order with the baseline removed.
        assert_eq!(values[1], 0.0);
        assert_eq!(values[2], 0.01);
        assert_eq!(*values.last().unwrap(), 0.3);
    }

    #[test]
    fn unknown_parameter_is_fatal() {
        let gen = generator(5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(gen
            .candidate_values(&mut rng, "NOT_REAL", Horizon::RestOfSeason)
            .is_err());
    }

    #[test]
    fn shared_parameter_gets_single_value_set() {
        let gen = generator(5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        match gen.horizon_candidates(&mut rng, "ADP_SCORING_WEIGHT").unwrap() {
            HorizonCandidates::Shared(values) => assert_eq!(values.len(), 6),
            other => panic!("expected shared candidates, got {other:?}"),
        }
    }

    #[test]
    fn horizon_parameter_gets_five_value_sets() {
        let gen = generator(5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        match gen
            .horizon_candidates(&mut rng, "NORMALIZATION_MAX_SCALE")
            .unwrap()
        {
            HorizonCandidates::PerHorizon(map) => {
                assert_eq!(map.len(), 5);
                for values in map.values() {
                    assert_eq!(values.len(), 6);
                }
            }
            other => panic!("expected per-horizon candidates, got {other:?}"),
        }
    }

    #[test]
    fn apply_candidate_never_mutates_baseline() {
        let gen = generator(5);
        let before = gen.baseline(Horizon::Weeks1To5).unwrap().clone();

        let candidate_a = gen
            .apply_candidate(Horizon::Weeks1To5, "MATCHUP_SCORING_WEIGHT", 3.5)
            .unwrap();
        let candidate_b = gen
            .apply_candidate(Horizon::Weeks1To5, "MATCHUP_SCORING_WEIGHT", 0.25)
            .unwrap();

        assert_eq!(gen.baseline(Horizon::Weeks1To5).unwrap(), &before);
        assert_eq!(
            candidate_a.parameters.weekly.matchup_scoring.weight,
            3.5
        );
        assert_eq!(
            candidate_b.parameters.weekly.matchup_scoring.weight,
            0.25
        );

        // The two candidates differ only at the target parameter.
        for def in &PARAMETERS {
            let a = value_of(&candidate_a.parameters, def.name).unwrap();
            let b = value_of(&candidate_b.parameters, def.name).unwrap();
            if def.name == "MATCHUP_SCORING_WEIGHT" {
                assert_ne!(a, b);
            } else {
                assert_eq!(a, b, "{} drifted", def.name);
            }
        }
    }

    #[test]
    fn adopting_shared_value_propagates_to_all_horizons() {
        let mut gen = generator(5);
        gen.adopt_value(Horizon::Weeks10To13, "PRIMARY_BONUS", 120.0)
            .unwrap();
        for horizon in Horizon::ALL {
            let value = value_of(
                &gen.baseline(horizon).unwrap().parameters,
                "PRIMARY_BONUS",
            )
            .unwrap();
            assert_eq!(value, 120.0, "{horizon} missed the shared update");
        }
    }

    #[test]
    fn adopting_horizon_value_touches_only_that_horizon() {
        let mut gen = generator(5);
        gen.adopt_value(Horizon::Weeks6To9, "NORMALIZATION_MAX_SCALE", 175.0)
            .unwrap();
        for horizon in Horizon::ALL {
            let value = value_of(
                &gen.baseline(horizon).unwrap().parameters,
                "NORMALIZATION_MAX_SCALE",
            )
            .unwrap();
            if horizon == Horizon::Weeks6To9 {
                assert_eq!(value, 175.0);
            } else {
                assert_eq!(value, 100.0, "{horizon} should be untouched");
            }
        }
    }

    #[test]
    fn from_folder_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        crate::baseline::write_baseline_fixture(dir.path());
        let gen = CandidateGenerator::from_folder(dir.path(), 5).unwrap();
        assert_eq!(gen.baselines().len(), 5);
    }
}
