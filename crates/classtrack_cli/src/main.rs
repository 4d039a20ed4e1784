//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `classtrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("classtrack_core version={}", classtrack_core::core_version());
}
