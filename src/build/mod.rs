//! Build-system generation

pub mod cmake;
