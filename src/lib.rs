#![doc = include_str!("../README.md")]

pub mod config;
pub mod connection;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod event;
pub mod grab;
pub mod input;
pub mod prelude;
pub mod registry;
pub mod session;
pub mod spawn;
pub mod wm;

#[cfg(test)]
mod mock;
