//! The `lstk` command-line front end: argument parsing, command wiring, and the inline
//! interactive UI used when attached to a terminal.

pub mod app;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod logging;
pub mod ui;
pub mod version;
pub mod view;
