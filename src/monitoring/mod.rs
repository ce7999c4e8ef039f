pub mod admin_cli;
pub mod traffic_report;
