//! Posterior decoding for discrete hidden Markov models.
//!
//! Build a [`HiddenMarkovModel`] from labeled probability tables, then call
//! [`HiddenMarkovModel::uncover`] to recover, for each time step
//! independently, the hidden state with the largest posterior marginal
//! given the whole observation sequence. [`gen_seq`] samples synthetic
//! (observation, hidden-state) pairs from a model, and [`exhaustive`]
//! re-derives the same quantities by enumerating every hidden path, for
//! validation on tiny inputs.
pub mod error;
pub mod exhaustive;
pub mod gen_seq;
pub mod hmm;
pub mod prob;

pub use error::HmmError;
pub use hmm::HiddenMarkovModel;
pub use prob::{ProbMatrix, ProbVector};

/// One-shot posterior decoding; see [`HiddenMarkovModel::uncover`].
pub fn uncover<S: AsRef<str>>(
    model: &HiddenMarkovModel,
    obs: &[S],
) -> Result<Vec<String>, HmmError> {
    model.uncover(obs)
}
