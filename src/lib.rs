//! Unicode string similarity and distance under a uniform configuration
//! model, across thirteen algorithms in three families: edit-based
//! (Levenshtein, Damerau-Levenshtein/OSA, Hamming), alignment-based (Jaro,
//! Jaro-Winkler), and set/vector-based over token multisets (Jaccard,
//! Sørensen-Dice, Overlap, Tversky, Cosine, Euclidean, Manhattan,
//! Chebyshev).
//!
//! [`Engine`] is the composition root: it merges configuration, probes a
//! similarity cache, dispatches to the right kernel, and exposes
//! synchronous, asynchronous, and batch entry points. Everything else in
//! this crate is a leaf `Engine` builds on.

pub mod cache;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod kernels;
pub mod multiset;
pub mod pool;
pub mod text;
pub mod tokenizer;

pub use config::{Algorithm, CaseSensitivity, Config, ConfigPatch, Preprocessing};
pub use engine::Engine;
pub use error::{Error, ErrorKind, Result};
pub use text::UnicodeText;
