pub mod histoday;
pub mod types;
