//! A tiny implementation of discrete hidden Markov models.
//!
//! The model is the usual (π, T, E) triple over labeled states and symbols.
//! As a rule of thumb, we do not take logarithm of each field; the tables
//! are kept in raw probability space so that the forward/backward values
//! are the exact joint/conditional probabilities. Raw products underflow on
//! long sequences; that is an accuracy limitation of this representation,
//! not an error.
use crate::error::HmmError;
use crate::prob::{ProbMatrix, ProbVector};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A discrete-state, discrete-observation hidden Markov model.
///
/// Holds the initial distribution π, the state-transition matrix T, and the
/// emission matrix E as dense row-major tables under one canonical order:
/// π's label order for states, E's column order for symbols. Immutable
/// after construction, so one model can serve any number of concurrent
/// decoding calls; each call allocates its own tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiddenMarkovModel {
    states: Vec<String>,
    symbols: Vec<String>,
    /// π, indexed by state.
    init: Vec<f64>,
    /// T, row-major, `trans[i * n + j] = Pr{i -> j}`.
    trans: Vec<f64>,
    /// E, row-major, `emit[i * m + k] = Pr{symbol k | state i}`.
    emit: Vec<f64>,
    symbol_index: HashMap<String, usize>,
}

impl HiddenMarkovModel {
    /// Assemble a model from validated probability tables.
    ///
    /// π's label order becomes the canonical state order. Every state must
    /// have a transition row over exactly the state set and an emission
    /// row; the emission rows share E's column set by `ProbMatrix`
    /// construction. Fails with `UnknownLabel` on any mismatch.
    pub fn new(init: ProbVector, trans: ProbMatrix, emit: ProbMatrix) -> Result<Self, HmmError> {
        let states = init.labels().to_vec();
        if let Some(extra) = trans
            .source_labels()
            .iter()
            .find(|l| init.position(l).is_none())
        {
            return Err(HmmError::UnknownLabel(extra.clone()));
        }
        if let Some(extra) = emit
            .source_labels()
            .iter()
            .find(|l| init.position(l).is_none())
        {
            return Err(HmmError::UnknownLabel(extra.clone()));
        }
        // Transition columns must be exactly the state set; `to_dense`
        // below only catches missing ones.
        if let Some(extra) = trans
            .target_labels()
            .iter()
            .find(|l| init.position(l).is_none())
        {
            return Err(HmmError::UnknownLabel(extra.clone()));
        }
        let symbols = emit.target_labels().to_vec();
        let trans = trans.to_dense(&states, &states)?.concat();
        let emit = emit.to_dense(&states, &symbols)?.concat();
        let symbol_index = symbols
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Ok(Self {
            states,
            symbols,
            init: init.weights().to_vec(),
            trans,
            emit,
            symbol_index,
        })
    }
    /// State labels in canonical order.
    pub fn states(&self) -> &[String] {
        &self.states
    }
    /// Observation symbols in emission-column order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
    pub(crate) fn init_weight(&self, i: usize) -> f64 {
        self.init[i]
    }
    pub(crate) fn trans_weight(&self, i: usize, j: usize) -> f64 {
        self.trans[i * self.states.len() + j]
    }
    pub(crate) fn emit_weight(&self, i: usize, symbol: usize) -> f64 {
        self.emit[i * self.symbols.len() + symbol]
    }
    /// Map observation labels to emission-column indices, validating the
    /// whole sequence up front.
    pub(crate) fn encode<S: AsRef<str>>(&self, obs: &[S]) -> Result<Vec<usize>, HmmError> {
        if obs.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        obs.iter()
            .enumerate()
            .map(|(position, symbol)| {
                let symbol = symbol.as_ref();
                self.symbol_index
                    .get(symbol)
                    .copied()
                    .ok_or_else(|| HmmError::UnknownSymbol {
                        position,
                        symbol: symbol.to_string(),
                    })
            })
            .collect()
    }

    /// Forward algorithm. `alpha[t][i]` is the joint probability of the
    /// observation prefix up to `t` and state `i` at `t`. No per-step
    /// scaling is applied. Inner sums accumulate in ascending state index,
    /// so the table is reproducible bit-for-bit across runs.
    pub fn forward<S: AsRef<str>>(&self, obs: &[S]) -> Result<Vec<Vec<f64>>, HmmError> {
        let obs = self.encode(obs)?;
        Ok(self.alpha(&obs))
    }
    fn alpha(&self, obs: &[usize]) -> Vec<Vec<f64>> {
        let n = self.states.len();
        trace!("forward table: {} x {}", obs.len(), n);
        let mut alpha = Vec::with_capacity(obs.len());
        let first: Vec<_> = (0..n)
            .map(|i| self.init_weight(i) * self.emit_weight(i, obs[0]))
            .collect();
        alpha.push(first);
        for &symbol in &obs[1..] {
            let prev = alpha.last().unwrap();
            let row: Vec<_> = (0..n)
                .map(|j| {
                    let reach: f64 = (0..n).map(|i| prev[i] * self.trans_weight(i, j)).sum();
                    reach * self.emit_weight(j, symbol)
                })
                .collect();
            alpha.push(row);
        }
        alpha
    }

    /// Backward algorithm. `beta[t][i]` is the probability of the
    /// observation suffix after `t` given state `i` at `t`; the last row is
    /// all ones by convention. Independent of `forward`; summation order as
    /// there.
    pub fn backward<S: AsRef<str>>(&self, obs: &[S]) -> Result<Vec<Vec<f64>>, HmmError> {
        let obs = self.encode(obs)?;
        Ok(self.beta(&obs))
    }
    fn beta(&self, obs: &[usize]) -> Vec<Vec<f64>> {
        let n = self.states.len();
        trace!("backward table: {} x {}", obs.len(), n);
        let mut beta = vec![vec![1f64; n]; obs.len()];
        for t in (0..obs.len() - 1).rev() {
            let symbol = obs[t + 1];
            let row: Vec<f64> = (0..n)
                .map(|i| {
                    (0..n)
                        .map(|j| {
                            self.trans_weight(i, j)
                                * self.emit_weight(j, symbol)
                                * beta[t + 1][j]
                        })
                        .sum()
                })
                .collect();
            beta[t] = row;
        }
        beta
    }

    /// Likelihood of the observation sequence, `Pr{O | model}`. It is the
    /// sum of the last forward row.
    pub fn likelihood<S: AsRef<str>>(&self, obs: &[S]) -> Result<f64, HmmError> {
        let alpha = self.forward(obs)?;
        Ok(alpha.last().unwrap().iter().sum())
    }

    /// Per-step posterior marginals, `Pr{state at t = i | O, model}`. Each
    /// row of the result is the element-wise product of the forward and
    /// backward rows, normalized to sum to one.
    pub fn posterior<S: AsRef<str>>(&self, obs: &[S]) -> Result<Vec<Vec<f64>>, HmmError> {
        let obs = self.encode(obs)?;
        let (alpha, beta) = (self.alpha(&obs), self.beta(&obs));
        let posterior = alpha
            .iter()
            .zip(beta.iter())
            .map(|(a, b)| {
                let row: Vec<_> = a.iter().zip(b.iter()).map(|(a, b)| a * b).collect();
                let sum: f64 = row.iter().sum();
                row.iter().map(|x| x / sum).collect()
            })
            .collect();
        Ok(posterior)
    }

    /// Posterior decoding: the most probable state at each time step.
    ///
    /// For each `t` independently, picks the state maximizing
    /// `alpha[t][i] * beta[t][i]`. The shared normalizer `Pr{O | model}` is
    /// constant across states at a fixed `t` and is never computed. Ties go
    /// to the lowest state index. Note this is marginal decoding: adjacent
    /// decoded states may be joined by a low-probability transition, which
    /// is expected, unlike a Viterbi path.
    pub fn uncover<S: AsRef<str>>(&self, obs: &[S]) -> Result<Vec<String>, HmmError> {
        let obs = self.encode(obs)?;
        let (alpha, beta) = (self.alpha(&obs), self.beta(&obs));
        let decoded = alpha
            .iter()
            .zip(beta.iter())
            .map(|(a, b)| {
                let scores = a.iter().zip(b.iter()).map(|(a, b)| a * b);
                // Strictly-greater keeps the first maximum on ties.
                let (mut argmax, mut max) = (0, f64::NEG_INFINITY);
                for (i, score) in scores.enumerate() {
                    if max < score {
                        argmax = i;
                        max = score;
                    }
                }
                self.states[argmax].clone()
            })
            .collect();
        Ok(decoded)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    /// The two-state weather/ice-cream model: hot or cold days, observed
    /// through how many scoops get eaten.
    pub fn weather_model() -> HiddenMarkovModel {
        let init = ProbVector::new(vec![("1H", 0.6), ("2C", 0.4)]).unwrap();
        let trans = ProbMatrix::new(vec![
            ("1H", ProbVector::new(vec![("1H", 0.7), ("2C", 0.3)]).unwrap()),
            ("2C", ProbVector::new(vec![("1H", 0.4), ("2C", 0.6)]).unwrap()),
        ])
        .unwrap();
        let emit = ProbMatrix::new(vec![
            (
                "1H",
                ProbVector::new(vec![("1S", 0.1), ("2M", 0.4), ("3L", 0.5)]).unwrap(),
            ),
            (
                "2C",
                ProbVector::new(vec![("1S", 0.7), ("2M", 0.2), ("3L", 0.1)]).unwrap(),
            ),
        ])
        .unwrap();
        HiddenMarkovModel::new(init, trans, emit).unwrap()
    }
    pub const OBS: [&str; 6] = ["3L", "2M", "1S", "3L", "3L", "3L"];
    #[test]
    fn construction_checks_labels() {
        let model = weather_model();
        assert_eq!(model.states(), ["1H", "2C"]);
        assert_eq!(model.symbols(), ["1S", "2M", "3L"]);
        // A transition matrix over the wrong states is refused.
        let init = ProbVector::new(vec![("1H", 0.6), ("2C", 0.4)]).unwrap();
        let trans = ProbMatrix::new(vec![
            ("1H", ProbVector::new(vec![("1H", 0.7), ("2C", 0.3)]).unwrap()),
            ("3W", ProbVector::new(vec![("1H", 0.4), ("2C", 0.6)]).unwrap()),
        ])
        .unwrap();
        let emit = ProbMatrix::new(vec![
            ("1H", ProbVector::new(vec![("1S", 1.0)]).unwrap()),
            ("2C", ProbVector::new(vec![("1S", 1.0)]).unwrap()),
        ])
        .unwrap();
        let err = HiddenMarkovModel::new(init, trans, emit).unwrap_err();
        assert_eq!(err, HmmError::UnknownLabel("3W".to_string()));
    }
    #[test]
    fn forward_base_and_recurrence() {
        let model = weather_model();
        let alpha = model.forward(&OBS).unwrap();
        assert_eq!(alpha.len(), OBS.len());
        // alpha[0][i] = pi[i] * E[i][3L].
        assert!((alpha[0][0] - 0.6 * 0.5).abs() < 1e-12);
        assert!((alpha[0][1] - 0.4 * 0.1).abs() < 1e-12);
        // One step by hand: alpha[1][j] = (sum_i alpha[0][i] T[i][j]) * E[j][2M].
        let hot = (0.30 * 0.7 + 0.04 * 0.4) * 0.4;
        let cold = (0.30 * 0.3 + 0.04 * 0.6) * 0.2;
        assert!((alpha[1][0] - hot).abs() < 1e-12);
        assert!((alpha[1][1] - cold).abs() < 1e-12);
    }
    #[test]
    fn backward_last_row_is_ones() {
        let model = weather_model();
        for t in 1..=OBS.len() {
            let beta = model.backward(&OBS[..t]).unwrap();
            assert_eq!(beta.last().unwrap(), &vec![1f64; 2]);
        }
    }
    #[test]
    fn backward_one_step_by_hand() {
        let model = weather_model();
        let beta = model.backward(&OBS[..2]).unwrap();
        // beta[0][i] = sum_j T[i][j] * E[j][2M] * 1.
        assert!((beta[0][0] - (0.7 * 0.4 + 0.3 * 0.2)).abs() < 1e-12);
        assert!((beta[0][1] - (0.4 * 0.4 + 0.6 * 0.2)).abs() < 1e-12);
    }
    #[test]
    fn uncover_weather_scenario() {
        let model = weather_model();
        let decoded = model.uncover(&OBS).unwrap();
        assert_eq!(decoded.len(), OBS.len());
        for state in decoded.iter() {
            assert!(model.states().contains(state));
        }
        // The single-scoop day in an otherwise large-scoop run is cold.
        assert_eq!(decoded[2], "2C");
        assert_eq!(decoded[0], "1H");
        assert_eq!(decoded.last().unwrap(), "1H");
    }
    #[test]
    fn uncover_is_deterministic() {
        let model = weather_model();
        let first = model.uncover(&OBS).unwrap();
        let second = model.uncover(&OBS).unwrap();
        assert_eq!(first, second);
    }
    #[test]
    fn uncover_matches_scaled_marginals() {
        // The argmax must not depend on any per-step positive scaling, so
        // it agrees with the argmax of the normalized posterior rows.
        let model = weather_model();
        let decoded = model.uncover(&OBS).unwrap();
        let posterior = model.posterior(&OBS).unwrap();
        for (state, row) in decoded.iter().zip(posterior.iter()) {
            let (mut argmax, mut max) = (0, f64::NEG_INFINITY);
            for (i, &p) in row.iter().enumerate() {
                if max < p {
                    argmax = i;
                    max = p;
                }
            }
            assert_eq!(state, &model.states()[argmax]);
        }
    }
    #[test]
    fn posterior_rows_sum_to_one() {
        let model = weather_model();
        let posterior = model.posterior(&OBS).unwrap();
        for row in posterior.iter() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1f64).abs() < 1e-9);
        }
    }
    #[test]
    fn ties_break_to_lowest_index() {
        // Fully symmetric model: every step is an exact tie.
        let init = ProbVector::new(vec![("a", 0.5), ("b", 0.5)]).unwrap();
        let half = || ProbVector::new(vec![("a", 0.5), ("b", 0.5)]).unwrap();
        let trans = ProbMatrix::new(vec![("a", half()), ("b", half())]).unwrap();
        let erow = ProbVector::new(vec![("x", 1.0)]).unwrap();
        let emit = ProbMatrix::new(vec![("a", erow.clone()), ("b", erow)]).unwrap();
        let model = HiddenMarkovModel::new(init, trans, emit).unwrap();
        let decoded = model.uncover(&["x", "x", "x"]).unwrap();
        assert_eq!(decoded, ["a", "a", "a"]);
    }
    #[test]
    fn rejects_bad_sequences() {
        let model = weather_model();
        let empty: [&str; 0] = [];
        assert_eq!(model.uncover(&empty).unwrap_err(), HmmError::EmptySequence);
        assert_eq!(model.forward(&empty).unwrap_err(), HmmError::EmptySequence);
        assert_eq!(model.backward(&empty).unwrap_err(), HmmError::EmptySequence);
        let err = model.uncover(&["3L", "4XL"]).unwrap_err();
        match err {
            HmmError::UnknownSymbol { position, symbol } => {
                assert_eq!(position, 1);
                assert_eq!(symbol, "4XL");
            }
            other => panic!("{}", other),
        }
    }
    #[test]
    fn single_step_decoding() {
        let model = weather_model();
        assert_eq!(model.uncover(&["1S"]).unwrap(), ["2C"]);
        assert_eq!(model.uncover(&["3L"]).unwrap(), ["1H"]);
    }
    #[test]
    fn model_is_shared_across_threads() {
        use rayon::prelude::*;
        let model = weather_model();
        let decoded: Vec<_> = (0..16)
            .into_par_iter()
            .map(|_| model.uncover(&OBS).unwrap())
            .collect();
        for d in decoded.iter() {
            assert_eq!(d, &decoded[0]);
        }
    }
}
