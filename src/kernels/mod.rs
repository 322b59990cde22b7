//! Kernel dispatch (§4.3-4.5): ties the edit, alignment, and set/vector
//! kernel families together behind one entry point the engine calls after
//! config merge, validation, and tokenization decisions are made.

pub mod alignment;
pub mod edit;
pub mod setvector;

use crate::config::{Algorithm, Config};
use crate::error::Error;
use crate::text::UnicodeText;

/// The result of running one kernel: a similarity in `[0, 1]` and a
/// distance whose scale is kernel-family-dependent (an edit count for the
/// edit kernels, `1 - similarity` for alignment and most set/vector
/// kernels, a native Lp magnitude for Euclidean/Manhattan/Chebyshev).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelOutcome {
    pub similarity: f64,
    pub distance: f64,
}

/// Run `algorithm` over `s1`/`s2` under `config`. `config` has already
/// passed `Config::validate` by this point.
pub fn run(algorithm: Algorithm, s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> Result<KernelOutcome, Error> {
    match algorithm {
        Algorithm::Levenshtein => {
            let outcome = edit::levenshtein(s1, s2, config);
            Ok(KernelOutcome {
                similarity: outcome.similarity(),
                distance: outcome.distance as f64,
            })
        }
        Algorithm::DamerauLevenshtein => {
            let outcome = edit::damerau_levenshtein(s1, s2, config);
            Ok(KernelOutcome {
                similarity: outcome.similarity(),
                distance: outcome.distance as f64,
            })
        }
        Algorithm::Hamming => {
            let outcome = edit::hamming(s1, s2, config)?;
            Ok(KernelOutcome {
                similarity: outcome.similarity(),
                distance: outcome.distance as f64,
            })
        }
        Algorithm::Jaro => {
            let similarity = alignment::jaro(s1, s2, config);
            Ok(KernelOutcome {
                similarity,
                distance: 1.0 - similarity,
            })
        }
        Algorithm::JaroWinkler => {
            let similarity = alignment::jaro_winkler(s1, s2, config);
            Ok(KernelOutcome {
                similarity,
                distance: 1.0 - similarity,
            })
        }
        Algorithm::Jaccard
        | Algorithm::SorensenDice
        | Algorithm::Overlap
        | Algorithm::Tversky
        | Algorithm::Cosine => {
            let outcome = setvector::compute(algorithm, s1, s2, config)?;
            Ok(KernelOutcome {
                similarity: outcome.similarity,
                distance: 1.0 - outcome.similarity,
            })
        }
        Algorithm::Euclidean | Algorithm::Manhattan | Algorithm::Chebyshev => {
            let outcome = setvector::compute(algorithm, s1, s2, config)?;
            Ok(KernelOutcome {
                similarity: outcome.similarity,
                distance: outcome.real_distance,
            })
        }
    }
}

/// Whether `algorithm`'s distance is defined by `1 - similarity` (true for
/// every kernel except the edit family, which reports a true edit count,
/// and the three Lp kernels, which report a native Lp magnitude). The
/// cache uses this to know it only ever needs to remember `similarity`.
pub fn is_similarity_derived_distance(algorithm: Algorithm) -> bool {
    !matches!(
        algorithm,
        Algorithm::Levenshtein
            | Algorithm::DamerauLevenshtein
            | Algorithm::Hamming
            | Algorithm::Euclidean
            | Algorithm::Manhattan
            | Algorithm::Chebyshev
    )
}
