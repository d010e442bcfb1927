pub mod algorithm;
pub mod collision;
pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod report;
pub mod robot;
pub mod scenario;
pub mod schedule;
pub mod simulation;
pub mod stat;
