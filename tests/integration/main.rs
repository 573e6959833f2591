//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the node service against
//! mock or simulated adapters. All tests run on the host with no real
//! hardware or network required.

mod adapter_stack_tests;
mod mock_hw;
mod node_service_tests;
