//! Host boundary value contract (§4.10, §6). This crate stops at the value
//! shapes a host-runtime bridge would marshal; no transport or FFI code
//! lives here.

use crate::config::{Algorithm, ConfigPatch};
use crate::error::{Error, ErrorKind};

/// An algorithm tag in `0..=12`, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmTag(u8);

impl AlgorithmTag {
    pub fn new(tag: u8) -> Option<Self> {
        Algorithm::from_tag(tag).map(|_| Self(tag))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Algorithm::parse_name(name).map(|a| Self(a.tag()))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn algorithm(self) -> Algorithm {
        Algorithm::from_tag(self.0).expect("AlgorithmTag is only constructed from a valid tag")
    }

    pub fn canonical_name(self) -> &'static str {
        self.algorithm().canonical_name()
    }
}

/// `CalculateSimilarity(s1, s2, algorithm, config?)` (§6).
#[derive(Debug, Clone)]
pub struct CalculateSimilarityRequest {
    pub s1: String,
    pub s2: String,
    pub algorithm: AlgorithmTag,
    pub config: Option<ConfigPatch>,
}

/// A payload-level error record, distinct from a host-level type rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    pub message: String,
    pub code: &'static str,
}

impl From<&Error> for ErrorPayload {
    fn from(err: &Error) -> Self {
        Self {
            message: err.message().to_string(),
            code: err.kind().code(),
        }
    }
}

/// `SimilarityResult` (§6): `{success, value?, error?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub success: bool,
    pub value: Option<f64>,
    pub error: Option<ErrorPayload>,
}

impl From<Result<f64, Error>> for SimilarityResult {
    fn from(result: Result<f64, Error>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                value: Some(value),
                error: None,
            },
            Err(err) => Self {
                success: false,
                value: None,
                error: Some(ErrorPayload::from(&err)),
            },
        }
    }
}

/// `DistanceResult` (§6): `{success, value?, error?}`. For vector-family
/// distances the integer is the real distance x1000 rounded; see
/// `Engine::distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceResult {
    pub success: bool,
    pub value: Option<u64>,
    pub error: Option<ErrorPayload>,
}

impl From<Result<u64, Error>> for DistanceResult {
    fn from(result: Result<u64, Error>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                value: Some(value),
                error: None,
            },
            Err(err) => Self {
                success: false,
                value: None,
                error: Some(ErrorPayload::from(&err)),
            },
        }
    }
}

/// `{type, name}` entry for `getSupportedAlgorithms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    pub tag: u8,
    pub name: &'static str,
}

/// `getSupportedAlgorithms` (§6).
pub fn supported_algorithms() -> Vec<AlgorithmDescriptor> {
    Algorithm::ALL
        .iter()
        .map(|a| AlgorithmDescriptor {
            tag: a.tag(),
            name: a.canonical_name(),
        })
        .collect()
}

/// `parseAlgorithmType(name)` (§6): a case-insensitive canonical name or
/// alias to a tag, or `None` if unrecognized.
pub fn parse_algorithm_type(name: &str) -> Option<u8> {
    Algorithm::parse_name(name).map(|a| a.tag())
}

/// `getAlgorithmName(tag)` (§6).
pub fn algorithm_name(tag: u8) -> Option<&'static str> {
    Algorithm::from_tag(tag).map(|a| a.canonical_name())
}

/// An unsuccessful `SimilarityResult` for a tag outside `0..=12`, per §6's
/// "algorithm tag outside 0..12 yields an unsuccessful result whose error
/// code is InvalidConfiguration".
pub fn invalid_algorithm_tag_result(tag: u8) -> SimilarityResult {
    SimilarityResult {
        success: false,
        value: None,
        error: Some(ErrorPayload {
            message: format!("unrecognized algorithm tag: {tag}"),
            code: ErrorKind::InvalidConfiguration.code(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_tag_round_trips_through_name() {
        let tag = AlgorithmTag::from_name("jaro-winkler").unwrap();
        assert_eq!(tag.algorithm(), Algorithm::JaroWinkler);
        assert_eq!(tag.canonical_name(), "jaro-winkler");
    }

    #[test]
    fn out_of_range_tag_is_rejected() {
        assert!(AlgorithmTag::new(13).is_none());
    }

    #[test]
    fn similarity_result_from_ok() {
        let result: SimilarityResult = Ok(0.8).into();
        assert!(result.success);
        assert_eq!(result.value, Some(0.8));
        assert!(result.error.is_none());
    }

    #[test]
    fn similarity_result_from_err_carries_code() {
        let result: SimilarityResult = Err(Error::invalid_configuration("ngram_size must be > 0")).into();
        assert!(!result.success);
        assert_eq!(result.error.unwrap().code, "invalid_configuration");
    }

    #[test]
    fn supported_algorithms_has_thirteen_entries() {
        assert_eq!(supported_algorithms().len(), 13);
    }

    #[test]
    fn invalid_tag_result_uses_invalid_configuration_code() {
        let result = invalid_algorithm_tag_result(99);
        assert!(!result.success);
        assert_eq!(result.error.unwrap().code, "invalid_configuration");
    }
}
