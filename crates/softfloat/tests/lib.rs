//! Entry point for the integration test suite: property-based tests
//! implementing the testable properties, and fixture-based tests pinned
//! to exact bit-pattern scenarios.

mod scenarios;
