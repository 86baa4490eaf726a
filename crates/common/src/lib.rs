//! Shared runtime utilities for the catalog binaries and test harnesses.

pub mod utils;
