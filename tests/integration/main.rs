//! Integration test driver for the `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against mock
//! port adapters.  Everything runs on the host.

mod maintenance_tests;
mod mock_ports;
mod restore_tests;
mod sensor_tests;
