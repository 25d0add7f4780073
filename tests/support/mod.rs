//! Shared utilities for critical tests.

pub mod critical_utils;
