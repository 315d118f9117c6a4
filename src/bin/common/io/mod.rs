pub mod models;
pub mod readers;
pub mod writers;
