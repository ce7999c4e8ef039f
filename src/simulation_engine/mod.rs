pub mod arrival_simulator;
