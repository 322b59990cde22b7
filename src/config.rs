//! Typed configuration, per-algorithm validation, and config merging (§3, §4.6 step 2-3).

use crate::error::Error;

/// The thirteen supported algorithms (§6 tags 0..=12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Levenshtein = 0,
    DamerauLevenshtein = 1,
    Hamming = 2,
    Jaro = 3,
    JaroWinkler = 4,
    Jaccard = 5,
    SorensenDice = 6,
    Overlap = 7,
    Tversky = 8,
    Cosine = 9,
    Euclidean = 10,
    Manhattan = 11,
    Chebyshev = 12,
}

impl Algorithm {
    /// All thirteen algorithms, in tag order. Used by `supported_algorithms`.
    pub const ALL: [Algorithm; 13] = [
        Algorithm::Levenshtein,
        Algorithm::DamerauLevenshtein,
        Algorithm::Hamming,
        Algorithm::Jaro,
        Algorithm::JaroWinkler,
        Algorithm::Jaccard,
        Algorithm::SorensenDice,
        Algorithm::Overlap,
        Algorithm::Tversky,
        Algorithm::Cosine,
        Algorithm::Euclidean,
        Algorithm::Manhattan,
        Algorithm::Chebyshev,
    ];

    /// Integer tag, per §6.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Resolve a tag back to an `Algorithm`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Algorithm::ALL.into_iter().find(|a| a.tag() == tag)
    }

    /// Canonical name, hyphenated where the original is multi-word.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Algorithm::Levenshtein => "levenshtein",
            Algorithm::DamerauLevenshtein => "damerau-levenshtein",
            Algorithm::Hamming => "hamming",
            Algorithm::Jaro => "jaro",
            Algorithm::JaroWinkler => "jaro-winkler",
            Algorithm::Jaccard => "jaccard",
            Algorithm::SorensenDice => "sorensen-dice",
            Algorithm::Overlap => "overlap",
            Algorithm::Tversky => "tversky",
            Algorithm::Cosine => "cosine",
            Algorithm::Euclidean => "euclidean",
            Algorithm::Manhattan => "manhattan",
            Algorithm::Chebyshev => "chebyshev",
        }
    }

    /// Parse a case-insensitive canonical name or alias (`dice` → SorensenDice).
    pub fn parse_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower == "dice" {
            return Some(Algorithm::SorensenDice);
        }
        Algorithm::ALL.into_iter().find(|a| a.canonical_name() == lower)
    }
}

/// Tokenization mode (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preprocessing {
    None = 0,
    #[default]
    Character = 1,
    Word = 2,
    NGram = 3,
}

impl Preprocessing {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Preprocessing::None),
            1 => Some(Preprocessing::Character),
            2 => Some(Preprocessing::Word),
            3 => Some(Preprocessing::NGram),
            _ => None,
        }
    }
}

/// Case sensitivity mode (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    #[default]
    Sensitive = 0,
    Insensitive = 1,
}

impl CaseSensitivity {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(CaseSensitivity::Sensitive),
            1 => Some(CaseSensitivity::Insensitive),
            _ => None,
        }
    }
}

const DEFAULT_NGRAM_SIZE: u32 = 2;
const DEFAULT_JARO_WINKLER_THRESHOLD: f64 = 0.7;
const DEFAULT_PREFIX_WEIGHT: f64 = 0.1;
const DEFAULT_PREFIX_LENGTH: u32 = 4;
const DEFAULT_MAX_STRING_LENGTH: usize = 100_000;

/// A fully-resolved configuration, as validated and handed to a kernel.
///
/// Every optional field in the spec's `Config` record is represented here
/// as `Option<T>` (Open Question 1, §9): a field is "unset" iff it is
/// `None`, never by comparing against a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub algorithm: Algorithm,
    pub preprocessing: Preprocessing,
    pub case_sensitivity: CaseSensitivity,
    pub ngram_size: u32,
    pub threshold: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub prefix_weight: Option<f64>,
    pub prefix_length: Option<u32>,
    pub max_string_length: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Levenshtein,
            preprocessing: Preprocessing::Character,
            case_sensitivity: CaseSensitivity::Sensitive,
            ngram_size: DEFAULT_NGRAM_SIZE,
            threshold: None,
            alpha: None,
            beta: None,
            prefix_weight: None,
            prefix_length: None,
            max_string_length: None,
        }
    }
}

impl Config {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Jaro-Winkler activation floor, defaulting to 0.7 if unset.
    pub fn jaro_winkler_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_JARO_WINKLER_THRESHOLD)
    }

    /// Jaro-Winkler prefix weight, defaulting to 0.1, clamped to [0, 0.25].
    pub fn effective_prefix_weight(&self) -> f64 {
        self.prefix_weight.unwrap_or(DEFAULT_PREFIX_WEIGHT).clamp(0.0, 0.25)
    }

    /// Jaro-Winkler prefix length, defaulting to 4, capped at 4.
    pub fn effective_prefix_length(&self) -> u32 {
        self.prefix_length.unwrap_or(DEFAULT_PREFIX_LENGTH).min(4)
    }

    /// Max accepted input length in UTF-8 bytes, defaulting to 100,000.
    pub fn effective_max_string_length(&self) -> usize {
        self.max_string_length.unwrap_or(DEFAULT_MAX_STRING_LENGTH)
    }

    /// Merge `self` (global) with an optional per-algorithm overlay and a
    /// per-call overlay, per §4.6 step 2. Per-call fields win whenever
    /// present; only genuinely absent (`None`) fields fall through.
    pub fn merged_with(&self, per_algorithm: Option<&ConfigPatch>, per_call: Option<&ConfigPatch>) -> Config {
        let mut merged = self.clone();
        if let Some(p) = per_algorithm {
            p.apply_to(&mut merged);
        }
        if let Some(p) = per_call {
            p.apply_to(&mut merged);
        }
        merged
    }

    /// Validate the merged configuration per §4.6 step 3.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ngram_size == 0 {
            return Err(Error::invalid_configuration("ngram_size must be > 0"));
        }
        if let Some(t) = self.threshold {
            if t < 0.0 {
                return Err(Error::invalid_configuration("threshold must be non-negative"));
            }
        }
        if self.algorithm == Algorithm::Tversky {
            match (self.alpha, self.beta) {
                (Some(a), Some(b)) => {
                    if a < 0.0 || b < 0.0 {
                        return Err(Error::invalid_configuration("alpha and beta must be non-negative"));
                    }
                }
                _ => {
                    return Err(Error::invalid_configuration(
                        "Tversky requires both alpha and beta",
                    ))
                }
            }
        }
        if let Some(w) = self.prefix_weight {
            if !(0.0..=0.25).contains(&w) {
                return Err(Error::invalid_configuration("prefix_weight must be in [0, 0.25]"));
            }
        }
        if let Some(l) = self.prefix_length {
            if l > 4 {
                return Err(Error::invalid_configuration("prefix_length must be <= 4"));
            }
        }
        Ok(())
    }
}

/// A sparse overlay applied on top of a base `Config`. `None` fields are
/// genuinely absent and do not override the base.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub algorithm: Option<Algorithm>,
    pub preprocessing: Option<Preprocessing>,
    pub case_sensitivity: Option<CaseSensitivity>,
    pub ngram_size: Option<u32>,
    pub threshold: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub prefix_weight: Option<f64>,
    pub prefix_length: Option<u32>,
    pub max_string_length: Option<usize>,
}

impl ConfigPatch {
    fn apply_to(&self, base: &mut Config) {
        if let Some(v) = self.algorithm {
            base.algorithm = v;
        }
        if let Some(v) = self.preprocessing {
            base.preprocessing = v;
        }
        if let Some(v) = self.case_sensitivity {
            base.case_sensitivity = v;
        }
        if let Some(v) = self.ngram_size {
            base.ngram_size = v;
        }
        if self.threshold.is_some() {
            base.threshold = self.threshold;
        }
        if self.alpha.is_some() {
            base.alpha = self.alpha;
        }
        if self.beta.is_some() {
            base.beta = self.beta;
        }
        if self.prefix_weight.is_some() {
            base.prefix_weight = self.prefix_weight;
        }
        if self.prefix_length.is_some() {
            base.prefix_length = self.prefix_length;
        }
        if self.max_string_length.is_some() {
            base.max_string_length = self.max_string_length;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips() {
        for algo in Algorithm::ALL {
            assert_eq!(Algorithm::from_tag(algo.tag()), Some(algo));
        }
        assert_eq!(Algorithm::from_tag(13), None);
    }

    #[test]
    fn name_parsing_is_case_insensitive_and_hyphenated() {
        assert_eq!(Algorithm::parse_name("Damerau-Levenshtein"), Some(Algorithm::DamerauLevenshtein));
        assert_eq!(Algorithm::parse_name("JARO-WINKLER"), Some(Algorithm::JaroWinkler));
        assert_eq!(Algorithm::parse_name("sorensen-dice"), Some(Algorithm::SorensenDice));
    }

    #[test]
    fn dice_alias_resolves_to_sorensen_dice() {
        assert_eq!(Algorithm::parse_name("dice"), Some(Algorithm::SorensenDice));
    }

    #[test]
    fn tversky_requires_alpha_and_beta() {
        let cfg = Config::new(Algorithm::Tversky);
        assert!(cfg.validate().is_err());
        let cfg = Config {
            alpha: Some(0.5),
            beta: Some(0.5),
            ..Config::new(Algorithm::Tversky)
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn ngram_size_zero_is_rejected() {
        let cfg = Config {
            ngram_size: 0,
            ..Config::new(Algorithm::Jaccard)
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn per_call_patch_overrides_global_only_where_present() {
        let global = Config::new(Algorithm::Levenshtein);
        let per_call = ConfigPatch {
            case_sensitivity: Some(CaseSensitivity::Insensitive),
            ..Default::default()
        };
        let merged = global.merged_with(None, Some(&per_call));
        assert_eq!(merged.case_sensitivity, CaseSensitivity::Insensitive);
        assert_eq!(merged.preprocessing, Preprocessing::Character);
    }

    #[test]
    fn prefix_weight_out_of_range_is_rejected() {
        let cfg = Config {
            prefix_weight: Some(0.5),
            ..Config::new(Algorithm::JaroWinkler)
        };
        assert!(cfg.validate().is_err());
    }
}
