#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Telegram shell around the stockcast engine: watches stock reports posted
//! in a chat and answers each with a forecast of the next one.

mod bot;
mod command;
mod error;
pub mod format;
mod handler;

pub use bot::{SharedHandler, StockBot};
pub use command::Command;
pub use error::{Error, Result};
