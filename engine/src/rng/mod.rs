//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic random number generation.
//! CRITICAL: All randomness in the engine MUST go through this module, and
//! all event sources MUST share a single generator instance. Giving each
//! source its own generator breaks whole-run reproducibility under a fixed
//! seed.

mod xorshift;

pub use xorshift::RngManager;
