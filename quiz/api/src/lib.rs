#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod database;
pub mod global;

#[cfg(test)]
mod tests;
