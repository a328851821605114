//! Core functionality for notes, their storage, and configuration

pub mod config;
pub mod note;
pub mod storage;
