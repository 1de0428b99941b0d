//! Property-based tests for sequence generation
