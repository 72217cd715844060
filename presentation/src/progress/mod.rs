//! Live consultation progress

pub mod reporter;
