//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock ports.  All tests run on the host with no network
//! required.

mod clock_sync_tests;
mod controller_tests;
mod mock_fleet;
