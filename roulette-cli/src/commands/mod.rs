pub mod config;
pub mod filter;
pub mod history;
pub mod pool;
pub mod reset;
pub mod spin;

mod connect;
mod render;
