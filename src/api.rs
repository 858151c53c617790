//! Wire-level provider implementations.

pub mod gemini;
