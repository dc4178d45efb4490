//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Course listing arguments.
#[derive(Debug, Args)]
pub struct CoursesCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show a single course.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Course slug
    pub slug: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Print a lesson body.
#[derive(Debug, Args)]
pub struct LessonCommand {
    /// Course slug
    pub course: String,

    /// Lesson slug
    pub lesson: String,
}

/// Render a course introduction page.
#[derive(Debug, Args)]
pub struct IntroCommand {
    /// Course slug
    pub slug: String,

    /// Write the HTML to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit the hero's candidate list without checking which one loads
    #[arg(long)]
    pub no_resolve: bool,
}

/// Resolve an image candidate list against the asset root.
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Candidate sources, most preferred first
    #[arg(value_name = "CANDIDATE")]
    pub candidates: Vec<String>,

    /// Alt text for the rendered element
    #[arg(short, long, default_value = "")]
    pub alt: String,

    /// Do not append the configured placeholder
    #[arg(long)]
    pub no_placeholder: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Import a JSON catalog into the `SQLite` store.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Catalog file to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output the import reports as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Search lesson titles and bodies.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text to search for
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show content store statistics.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
