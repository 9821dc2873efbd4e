//! This module is to generate some random sequence to assess the decoder.
//! Usually, it would not be used in the real-applications.
use crate::hmm::HiddenMarkovModel;
use rand::seq::SliceRandom;
use rand::Rng;

/// Draw a length-`len` (observations, hidden states) pair from the model.
///
/// The hidden path starts from π and walks T; each step then emits one
/// symbol from the state's emission row. The generator is passed in
/// explicitly so that sampling and decoding are reproducible independently.
/// The ground-truth hidden path is returned for validation; the decoder
/// itself consumes only the observations.
pub fn sample<R: Rng>(
    model: &HiddenMarkovModel,
    len: usize,
    rng: &mut R,
) -> (Vec<String>, Vec<String>) {
    let states: Vec<usize> = (0..model.states().len()).collect();
    let symbols: Vec<usize> = (0..model.symbols().len()).collect();
    let (mut observations, mut hidden) = (Vec::with_capacity(len), Vec::with_capacity(len));
    let mut current = None;
    for _ in 0..len {
        let next = *states
            .choose_weighted(rng, |&j| match current {
                Some(i) => model.trans_weight(i, j),
                None => model.init_weight(j),
            })
            .unwrap();
        let emitted = *symbols
            .choose_weighted(rng, |&k| model.emit_weight(next, k))
            .unwrap();
        hidden.push(model.states()[next].clone());
        observations.push(model.symbols()[emitted].clone());
        current = Some(next);
    }
    (observations, hidden)
}
