pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod monorepo;
pub mod ui;

pub use error::{MonobumpError, Result};
