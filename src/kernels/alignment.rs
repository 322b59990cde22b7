//! Alignment kernels (§4.4): Jaro and Jaro-Winkler.

use crate::config::Config;
use crate::text::{code_points_equal, UnicodeText};

/// Jaro similarity (§4.4). Distance is `1 - similarity`.
pub fn jaro(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> f64 {
    let case = config.case_sensitivity;
    let a = s1.code_points();
    let b = s2.code_points();
    let m1 = a.len();
    let m2 = b.len();

    if m1 == 0 && m2 == 0 {
        return 1.0;
    }
    if m1 == 0 || m2 == 0 {
        return 0.0;
    }

    let window = (m1.max(m2) / 2).saturating_sub(1);

    let mut a_matched = vec![false; m1];
    let mut b_matched = vec![false; m2];
    let mut matches = 0usize;

    for i in 0..m1 {
        let lo = i.saturating_sub(window);
        let hi = (i + window).min(m2 - 1);
        if lo > hi {
            continue;
        }
        for j in lo..=hi {
            if b_matched[j] {
                continue;
            }
            if !code_points_equal(a[i], b[j], case) {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0u64;
    let mut k = 0usize;
    for i in 0..m1 {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if !code_points_equal(a[i], b[k], case) {
            transpositions += 1;
        }
        k += 1;
    }
    let t = transpositions / 2;

    let m = matches as f64;
    let jaro = (m / m1 as f64 + m / m2 as f64 + (m - t as f64) / m) / 3.0;
    jaro.clamp(0.0, 1.0)
}

/// Jaro-Winkler similarity (§4.4): Jaro plus a common-prefix bonus, only
/// applied once Jaro clears `config.threshold` (default 0.7).
pub fn jaro_winkler(s1: &UnicodeText, s2: &UnicodeText, config: &Config) -> f64 {
    let base = jaro(s1, s2, config);
    if base < config.jaro_winkler_threshold() {
        return base;
    }

    let case = config.case_sensitivity;
    let a = s1.code_points();
    let b = s2.code_points();
    let cap = (a.len().min(b.len())).min(config.effective_prefix_length() as usize);

    let mut prefix_len = 0usize;
    for i in 0..cap {
        if code_points_equal(a[i], b[i], case) {
            prefix_len += 1;
        } else {
            break;
        }
    }

    let p = config.effective_prefix_weight();
    (base + prefix_len as f64 * p * (1.0 - base)).clamp(0.0, 1.0)
}
