//! Inference engine modules.

pub mod observation;
pub mod posterior;

pub use observation::ObservationSet;
pub use posterior::{
    compute_posterior, infer, EvidenceTerm, InferenceError, PosteriorEntry, PosteriorResult,
};
