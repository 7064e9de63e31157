//! Integration test suite.

mod store_roundtrip_test;
