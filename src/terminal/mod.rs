//! Terminal module: A crossterm-backed host for animated labels.

mod host;

pub use host::TerminalHost;
