//! A tiny interactive command shell.
//!
//! This crate provides the building blocks of a minimal line-oriented shell:
//! a delimiter- and quote-aware word splitter, a bounded command history with
//! on-disk persistence, built-in commands (`exit`, `history`), and discovery
//! and launching of external programs through a search-path list captured
//! from the process environment. It is intentionally small and easy to read.
//!
//! The main entry point is [`Interpreter`], which dispatches input lines to
//! built-ins or external programs using a set of pluggable factories. The
//! public modules [`command`], [`env`] and [`history`] expose the traits and
//! types involved.

mod builtin;
pub mod command;
pub mod env;
mod external;
pub mod history;
mod interpreter;
mod io_adapters;
mod lexer;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
pub use io_adapters::{MemReader, MemWriter};
