//! Brute-force scoring of every hidden path, used as a test oracle.
//!
//! These functions enumerate all `N^T` state sequences, so they are only
//! usable for tiny models and short sequences. They exist to cross-check
//! the forward/backward recursions; do not call them from anything that
//! cares about running time.
use crate::error::HmmError;
use crate::hmm::HiddenMarkovModel;

// Pr{path, obs | model} for one fully specified hidden path.
fn score(model: &HiddenMarkovModel, path: &[usize], obs: &[usize]) -> f64 {
    let mut p = model.init_weight(path[0]) * model.emit_weight(path[0], obs[0]);
    for t in 1..path.len() {
        p *= model.trans_weight(path[t - 1], path[t]) * model.emit_weight(path[t], obs[t]);
    }
    p
}

fn paths(n_states: usize, len: usize) -> impl Iterator<Item = Vec<usize>> {
    (0..n_states.pow(len as u32)).map(move |mut code| {
        let path: Vec<_> = (0..len)
            .map(|_| {
                let state = code % n_states;
                code /= n_states;
                state
            })
            .collect();
        path
    })
}

/// Observation likelihood by summing over every hidden path.
pub fn likelihood<S: AsRef<str>>(model: &HiddenMarkovModel, obs: &[S]) -> Result<f64, HmmError> {
    let obs = model.encode(obs)?;
    let n = model.states().len();
    Ok(paths(n, obs.len())
        .map(|path| score(model, &path, &obs))
        .sum())
}

/// Per-step posterior marginals by bucketing every hidden path's score on
/// the (time, state) pairs it visits, then normalizing per step.
pub fn posterior<S: AsRef<str>>(
    model: &HiddenMarkovModel,
    obs: &[S],
) -> Result<Vec<Vec<f64>>, HmmError> {
    let obs = model.encode(obs)?;
    let n = model.states().len();
    let mut marginal = vec![vec![0f64; n]; obs.len()];
    for path in paths(n, obs.len()) {
        let p = score(model, &path, &obs);
        for (t, &state) in path.iter().enumerate() {
            marginal[t][state] += p;
        }
    }
    for row in marginal.iter_mut() {
        let sum: f64 = row.iter().sum();
        row.iter_mut().for_each(|x| *x /= sum);
    }
    Ok(marginal)
}
