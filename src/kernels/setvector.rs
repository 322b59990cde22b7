//! Set / vector kernels (§4.5): Jaccard, Sørensen-Dice, Overlap, Tversky,
//! Cosine, Euclidean, Manhattan, Chebyshev.

use rustc_hash::FxHashSet;

use crate::config::{Algorithm, CaseSensitivity, Config, Preprocessing};
use crate::error::Error;
use crate::multiset::{multiset_from_tokens, set_from_tokens, Multiset};
use crate::text::UnicodeText;
use crate::tokenizer::tokenize;

/// Raw result of a set/vector kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetVectorOutcome {
    /// Similarity in [0, 1].
    pub similarity: f64,
    /// The un-quantized real distance (`1 - similarity` for similarity-primary
    /// kernels, the native Lp distance for Euclidean/Manhattan/Chebyshev).
    /// Callers scale by 1000 and round for the integer distance API.
    pub real_distance: f64,
}

/// Dispatch one of the eight set/vector algorithms.
pub fn compute(algorithm: Algorithm, s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> Result<SetVectorOutcome, Error> {
    match algorithm {
        Algorithm::Jaccard => Ok(jaccard(s1, s2, config)),
        Algorithm::SorensenDice => Ok(blanket_empty_rule(s1, s2, config, 2, dice_core)),
        Algorithm::Overlap => Ok(blanket_empty_rule(s1, s2, config, 2, overlap_core)),
        Algorithm::Tversky => tversky(s1, s2, config),
        Algorithm::Cosine => Ok(cosine(s1, s2, config)),
        Algorithm::Euclidean => Ok(blanket_empty_rule(s1, s2, config, 2, |a, b, _| lp_core(a, b, 2))),
        Algorithm::Manhattan => Ok(blanket_empty_rule(s1, s2, config, 1, |a, b, _| lp_core(a, b, 1))),
        Algorithm::Chebyshev => Ok(blanket_empty_rule(s1, s2, config, 0, |a, b, _| lp_core(a, b, 0))),
        other => Err(Error::invalid_configuration(format!("{:?} is not a set/vector algorithm", other))),
    }
}

fn case_adjusted_tokens(text: &UnicodeText, config: &Config) -> Vec<UnicodeText> {
    let tokens = tokenize(text, config);
    if config.case_sensitivity == CaseSensitivity::Insensitive {
        tokens.iter().map(|t| t.case_folded()).collect()
    } else {
        tokens
    }
}

fn multisets(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> (Multiset<Vec<u32>>, Multiset<Vec<u32>>) {
    let t1 = case_adjusted_tokens(s1, config);
    let t2 = case_adjusted_tokens(s2, config);
    (multiset_from_tokens(&t1), multiset_from_tokens(&t2))
}

/// Applies §4.5's closing rule — both-empty similarity 1, one-empty
/// similarity 0 — around a kernel-specific core that only needs to handle
/// the genuinely non-empty case. `real_distance` follows as `1 -
/// similarity` unless the core overrides it (Lp kernels do, via the tuple
/// return).
///
/// `p` identifies which Lp norm the one-empty-side distance should use (1 =
/// Manhattan, 2 = Euclidean, anything else = Chebyshev's L-infinity); kernels
/// whose `real_distance` is never read directly (the engine derives their
/// distance as `1 - similarity`) can pass 2 without consequence.
fn blanket_empty_rule(
    s1: &UnicodeText,
    s2: &UnicodeText,
    config: &Config,
    p: u8,
    core: impl Fn(&Multiset<Vec<u32>>, &Multiset<Vec<u32>>, &Config) -> (f64, f64),
) -> SetVectorOutcome {
    let (a, b) = multisets(s1, s2, config);
    let empty_a = a.total_count() == 0;
    let empty_b = b.total_count() == 0;

    if empty_a && empty_b {
        return SetVectorOutcome {
            similarity: 1.0,
            real_distance: 0.0,
        };
    }
    if empty_a || empty_b {
        let non_empty_side = if empty_a { &b } else { &a };
        return SetVectorOutcome {
            similarity: 0.0,
            real_distance: one_sided_lp_distance(non_empty_side, p),
        };
    }

    let (similarity, real_distance) = core(&a, &b, config);
    SetVectorOutcome { similarity, real_distance }
}

/// The Lp distance from `ms` to the zero vector, i.e. the empty-other-side
/// case of `lp_core`: L1 is the sum of counts, L2 is `magnitude()`, and
/// L-infinity is the largest single count.
fn one_sided_lp_distance(ms: &Multiset<Vec<u32>>, p: u8) -> f64 {
    match p {
        1 => ms.total_count() as f64,
        2 => ms.magnitude(),
        _ => ms.max_count() as f64,
    }
}

fn jaccard(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> SetVectorOutcome {
    if config.preprocessing == Preprocessing::Word {
        let t1 = case_adjusted_tokens(s1, config);
        let t2 = case_adjusted_tokens(s2, config);
        let a: FxHashSet<Vec<u32>> = set_from_tokens(&t1);
        let b: FxHashSet<Vec<u32>> = set_from_tokens(&t2);
        if a.is_empty() && b.is_empty() {
            return SetVectorOutcome {
                similarity: 1.0,
                real_distance: 0.0,
            };
        }
        if a.is_empty() || b.is_empty() {
            return SetVectorOutcome {
                similarity: 0.0,
                real_distance: 1.0,
            };
        }
        let inter = a.intersection(&b).count() as f64;
        let union = a.union(&b).count() as f64;
        let similarity = inter / union;
        return SetVectorOutcome {
            similarity,
            real_distance: 1.0 - similarity,
        };
    }

    blanket_empty_rule(s1, s2, config, 2, |a, b, _| {
        let inter = a.intersect(b).total_count() as f64;
        let union = a.union(b).total_count() as f64;
        let similarity = if union == 0.0 { 0.0 } else { inter / union };
        (similarity, 1.0 - similarity)
    })
}

fn dice_core(a: &Multiset<Vec<u32>>, b: &Multiset<Vec<u32>>, _config: &Config) -> (f64, f64) {
    let inter = a.intersect(b).total_count() as f64;
    let denom = (a.total_count() + b.total_count()) as f64;
    let similarity = if denom == 0.0 { 0.0 } else { 2.0 * inter / denom };
    (similarity, 1.0 - similarity)
}

fn overlap_core(a: &Multiset<Vec<u32>>, b: &Multiset<Vec<u32>>, _config: &Config) -> (f64, f64) {
    let inter = a.intersect(b).total_count() as f64;
    let denom = a.total_count().min(b.total_count()) as f64;
    let similarity = if denom == 0.0 { 0.0 } else { inter / denom };
    (similarity, 1.0 - similarity)
}

fn tversky(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> Result<SetVectorOutcome, Error> {
    let (alpha, beta) = match (config.alpha, config.beta) {
        (Some(a), Some(b)) if a >= 0.0 && b >= 0.0 => (a, b),
        _ => return Err(Error::invalid_configuration("Tversky requires non-negative alpha and beta")),
    };
    let (a, b) = multisets(s1, s2, config);
    let c = a.intersect(&b).total_count() as f64;
    let da = a.total_count() as f64 - c;
    let db = b.total_count() as f64 - c;
    let denom = c + alpha * da + beta * db;
    let similarity = if denom == 0.0 { 0.0 } else { c / denom };
    Ok(SetVectorOutcome {
        similarity,
        real_distance: 1.0 - similarity,
    })
}

fn cosine(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> SetVectorOutcome {
    match config.preprocessing {
        Preprocessing::Character | Preprocessing::None => cosine_character(s1, s2, config),
        Preprocessing::Word | Preprocessing::NGram => blanket_empty_rule(s1, s2, config, 2, cosine_vector_core),
    }
}

fn cosine_vector_core(a: &Multiset<Vec<u32>>, b: &Multiset<Vec<u32>>, _config: &Config) -> (f64, f64) {
    if a == b {
        return (1.0, 0.0);
    }
    let dot = a.dot(b);
    let mag_a = a.magnitude();
    let mag_b = b.magnitude();
    let similarity = if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
    };
    (similarity, 1.0 - similarity)
}

fn cosine_character(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> SetVectorOutcome {
    let insensitive = config.case_sensitivity == CaseSensitivity::Insensitive;

    let (inter, size_a, size_b) = if s1.is_ascii() && s2.is_ascii() {
        let mut present_a = [false; 256];
        let mut present_b = [false; 256];
        for &cp in s1.code_points() {
            present_a[ascii_bucket(cp, insensitive) as usize] = true;
        }
        for &cp in s2.code_points() {
            present_b[ascii_bucket(cp, insensitive) as usize] = true;
        }
        let inter = (0..256).filter(|&i| present_a[i] && present_b[i]).count();
        let size_a = present_a.iter().filter(|&&p| p).count();
        let size_b = present_b.iter().filter(|&&p| p).count();
        (inter, size_a, size_b)
    } else {
        let set_a: FxHashSet<u32> = s1
            .code_points()
            .iter()
            .map(|&cp| if insensitive { crate::text::fold_codepoint(cp) } else { cp })
            .collect();
        let set_b: FxHashSet<u32> = s2
            .code_points()
            .iter()
            .map(|&cp| if insensitive { crate::text::fold_codepoint(cp) } else { cp })
            .collect();
        let inter = set_a.intersection(&set_b).count();
        (inter, set_a.len(), set_b.len())
    };

    if size_a == 0 && size_b == 0 {
        return SetVectorOutcome {
            similarity: 1.0,
            real_distance: 0.0,
        };
    }
    if size_a == 0 || size_b == 0 {
        return SetVectorOutcome {
            similarity: 0.0,
            real_distance: 1.0,
        };
    }

    let similarity = inter as f64 / ((size_a as f64) * (size_b as f64)).sqrt();
    SetVectorOutcome {
        similarity,
        real_distance: 1.0 - similarity,
    }
}

fn ascii_bucket(cp: u32, insensitive: bool) -> u8 {
    let b = cp as u8;
    if insensitive && b.is_ascii_uppercase() {
        b.to_ascii_lowercase()
    } else {
        b
    }
}

/// Lp distance over the union of keys of two frequency vectors (§4.5).
/// `p = 2` Euclidean, `p = 1` Manhattan, `p = 0` is used here as the
/// Chebyshev (L∞) sentinel.
fn lp_core(a: &Multiset<Vec<u32>>, b: &Multiset<Vec<u32>>, p: u8) -> (f64, f64) {
    let keys = a.union_of_keys(b);
    let d = match p {
        1 => keys.iter().map(|k| (a.get(k) as f64 - b.get(k) as f64).abs()).sum::<f64>(),
        2 => keys
            .iter()
            .map(|k| {
                let diff = a.get(k) as f64 - b.get(k) as f64;
                diff * diff
            })
            .sum::<f64>()
            .sqrt(),
        _ => keys
            .iter()
            .map(|k| (a.get(k) as f64 - b.get(k) as f64).abs())
            .fold(0.0_f64, f64::max),
    };
    let similarity = match p {
        1 => 1.0 / (1.0 + d),
        _ => (-d).exp(),
    };
    (similarity.clamp(0.0, 1.0), d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;

    fn cfg(algorithm: Algorithm, preprocessing: Preprocessing, ngram_size: u32) -> Config {
        Config {
            preprocessing,
            ngram_size,
            ..Config::new(algorithm)
        }
    }

    #[test]
    fn jaccard_word_preprocessing_uses_set_semantics() {
        let config = cfg(Algorithm::Jaccard, Preprocessing::Word, 2);
        let outcome = jaccard(&UnicodeText::from_str("the cat sat the cat"), &UnicodeText::from_str("the cat"), &config);
        // Sets dedupe: {the, cat, sat} vs {the, cat} -> intersection 2 / union 3
        assert!((outcome.similarity - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn jaccard_character_preprocessing_uses_multiset_semantics() {
        let config = cfg(Algorithm::Jaccard, Preprocessing::Character, 2);
        let outcome = jaccard(&UnicodeText::from_str("aab"), &UnicodeText::from_str("ab"), &config);
        // multiset A={a:2,b:1} total 3, B={a:1,b:1} total 2. intersect={a:1,b:1} total 2. union={a:2,b:1} total 3.
        assert!((outcome.similarity - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_word_preprocessing_identical_multisets_is_one() {
        let config = cfg(Algorithm::Cosine, Preprocessing::Word, 2);
        let outcome = compute(Algorithm::Cosine, &UnicodeText::from_str("hello world"), &UnicodeText::from_str("world hello"), &config).unwrap();
        assert_eq!(outcome.similarity, 1.0);
    }

    #[test]
    fn tversky_alpha_beta_half_collapses_to_dice() {
        let tversky_cfg = Config {
            alpha: Some(0.5),
            beta: Some(0.5),
            ..cfg(Algorithm::Tversky, Preprocessing::NGram, 2)
        };
        let dice_cfg = cfg(Algorithm::SorensenDice, Preprocessing::NGram, 2);
        let s1 = UnicodeText::from_str("hello");
        let s2 = UnicodeText::from_str("hallo");
        let tversky_out = compute(Algorithm::Tversky, &s1, &s2, &tversky_cfg).unwrap();
        let dice_out = compute(Algorithm::SorensenDice, &s1, &s2, &dice_cfg).unwrap();
        assert!((tversky_out.similarity - dice_out.similarity).abs() < 1e-9);
    }

    #[test]
    fn tversky_requires_alpha_and_beta() {
        let config = cfg(Algorithm::Tversky, Preprocessing::NGram, 2);
        let err = compute(Algorithm::Tversky, &UnicodeText::from_str("a"), &UnicodeText::from_str("b"), &config).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn euclidean_similarity_is_exp_neg_distance() {
        let config = cfg(Algorithm::Euclidean, Preprocessing::Character, 2);
        let outcome = compute(Algorithm::Euclidean, &UnicodeText::from_str("abc"), &UnicodeText::from_str("abc"), &config).unwrap();
        assert_eq!(outcome.similarity, 1.0);
        assert_eq!(outcome.real_distance, 0.0);
    }

    #[test]
    fn manhattan_similarity_formula() {
        let config = cfg(Algorithm::Manhattan, Preprocessing::Character, 2);
        let outcome = compute(Algorithm::Manhattan, &UnicodeText::from_str("aab"), &UnicodeText::from_str("ab"), &config).unwrap();
        // A={a:2,b:1}, B={a:1,b:1}: L1 = |2-1|+|1-1| = 1
        assert!((outcome.real_distance - 1.0).abs() < 1e-9);
        assert!((outcome.similarity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn both_empty_bags_give_similarity_one_everywhere() {
        let empty = UnicodeText::from_str("");
        for (algo, pp) in [
            (Algorithm::Jaccard, Preprocessing::Character),
            (Algorithm::SorensenDice, Preprocessing::Character),
            (Algorithm::Overlap, Preprocessing::Character),
            (Algorithm::Euclidean, Preprocessing::Character),
            (Algorithm::Manhattan, Preprocessing::Character),
            (Algorithm::Chebyshev, Preprocessing::Character),
        ] {
            let config = cfg(algo, pp, 2);
            let outcome = compute(algo, &empty, &empty, &config).unwrap();
            assert_eq!(outcome.similarity, 1.0, "{algo:?}");
        }
    }

    #[test]
    fn one_empty_bag_gives_similarity_zero_everywhere() {
        let empty = UnicodeText::from_str("");
        let full = UnicodeText::from_str("hello");
        for (algo, pp) in [
            (Algorithm::Jaccard, Preprocessing::Character),
            (Algorithm::SorensenDice, Preprocessing::Character),
            (Algorithm::Overlap, Preprocessing::Character),
            (Algorithm::Euclidean, Preprocessing::Character),
            (Algorithm::Manhattan, Preprocessing::Character),
            (Algorithm::Chebyshev, Preprocessing::Character),
        ] {
            let config = cfg(algo, pp, 2);
            let outcome = compute(algo, &empty, &full, &config).unwrap();
            assert_eq!(outcome.similarity, 0.0, "{algo:?}");
        }
    }
}
