//! JSON configuration of the command-line tools.
pub mod vertical_lines;
