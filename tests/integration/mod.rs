//! Integration test modules.

mod config_test;
