//! Command-line interface for coursedeck.
//!
//! This module provides the CLI structure for the `coursedeck` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CoursesCommand, ImportCommand, IntroCommand, LessonCommand, ResolveCommand,
    SearchCommand, ShowCommand, StatsCommand,
};

use crate::logging::Verbosity;

/// coursedeck - Browse a course catalog and render its pages
///
/// Lists courses and lessons from the built-in catalog, a JSON file or a
/// `SQLite` store, and renders course introduction pages whose hero images
/// fall back through a list of candidates.
#[derive(Debug, Parser)]
#[command(name = "coursedeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List courses
    Courses(CoursesCommand),

    /// Show a course with its modules and lessons
    Show(ShowCommand),

    /// Print a lesson body
    Lesson(LessonCommand),

    /// Render a course introduction page as HTML
    Intro(IntroCommand),

    /// Find the first loadable image in a candidate list
    Resolve(ResolveCommand),

    /// Import a JSON catalog into the content store
    Import(ImportCommand),

    /// Search lessons
    Search(SearchCommand),

    /// Show content store statistics
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
