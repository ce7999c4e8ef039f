pub mod shutdown;
pub mod signal_cycle_controller;
