pub mod clear;
pub mod common;
pub mod list;
pub mod status;
