pub mod chart;
pub mod server;
