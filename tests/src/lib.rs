//! Cross-crate scenario coverage for the gateway. No public API of its
//! own; see `tests/gateway_scenarios.rs` for the actual test bodies.
