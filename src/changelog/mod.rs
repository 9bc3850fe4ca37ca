//! Change-log rendering subsystem.

pub mod formatter;

pub use formatter::ChangeLogFormatter;
