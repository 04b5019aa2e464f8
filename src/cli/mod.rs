//! CLI command handlers

pub mod commands;

pub use commands::{
    analyze, chat, commentary, export, load_analysis, NarrativeArgs, OutputFormat, ProfileArgs,
};
