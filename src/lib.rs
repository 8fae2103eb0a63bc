// Library interface for tailf
// Exposes the tailer core so it can be embedded and tested apart from the CLI

pub mod config;
pub mod follow;
pub mod logging;
pub mod reader;
pub mod signal;
pub mod sink;
pub mod tailer;

#[cfg(test)]
mod test_utils;
