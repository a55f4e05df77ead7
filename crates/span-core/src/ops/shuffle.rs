use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::Artifact;

/// Permutación aleatoria de la entrada.
pub fn shuffle<R: Rng + ?Sized>(artifacts: &[Artifact], rng: &mut R) -> Vec<Artifact> {
    let mut out = artifacts.to_vec();
    out.shuffle(rng);
    out
}
