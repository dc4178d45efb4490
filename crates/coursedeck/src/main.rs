//! `coursedeck` - CLI for the course catalog
//!
//! Lists and searches courses, renders introduction pages and resolves image
//! candidate lists against the local asset root.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use coursedeck::cli::{
    Cli, Command, ConfigCommand, CoursesCommand, ImportCommand, IntroCommand, LessonCommand,
    ResolveCommand, SearchCommand, ShowCommand, StatsCommand,
};
use coursedeck::content::{format_duration, CatalogFile};
use coursedeck::resolver::{self, AttemptOutcome, RoutingLoader};
use coursedeck::{
    init_logging, CandidateList, Config, ContentRepository, ImageResolver, LayoutRegistry, Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config subcommands load (or validate) the file themselves
    let config_path = cli.config;
    match cli.command {
        Command::Courses(cmd) => handle_courses(&load_config(config_path)?, &cmd),
        Command::Show(cmd) => handle_show(&load_config(config_path)?, &cmd),
        Command::Lesson(cmd) => handle_lesson(&load_config(config_path)?, &cmd),
        Command::Intro(cmd) => handle_intro(&load_config(config_path)?, cmd).await,
        Command::Resolve(cmd) => handle_resolve(&load_config(config_path)?, cmd).await,
        Command::Import(cmd) => handle_import(&load_config(config_path)?, &cmd),
        Command::Search(cmd) => handle_search(&load_config(config_path)?, &cmd),
        Command::Stats(cmd) => handle_stats(&load_config(config_path)?, &cmd),
        Command::Config(cmd) => handle_config(config_path, cmd),
    }
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    Config::load_from(config_path).context("failed to load configuration")
}

fn open_repository(config: &Config) -> Result<Box<dyn ContentRepository>> {
    config.open_repository().with_context(|| {
        format!(
            "failed to open {} content source",
            config.content.source
        )
    })
}

fn handle_courses(config: &Config, cmd: &CoursesCommand) -> Result<()> {
    let courses = open_repository(config)?.list_courses()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&courses)?);
        return Ok(());
    }

    if courses.is_empty() {
        println!("No courses.");
        return Ok(());
    }
    for course in &courses {
        println!(
            "{:<28} {:<8} {:>3} lessons {:>8}  {}",
            course.slug,
            course.category,
            course.lesson_count,
            format_duration(course.duration_minutes),
            course.title
        );
    }
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> Result<()> {
    let course = open_repository(config)?.require_course(&cmd.slug)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&course)?);
        return Ok(());
    }

    println!("{}", course.title);
    println!("{}", "=".repeat(course.title.chars().count()));
    println!("Category:  {}", course.category());
    println!("Duration:  {}", format_duration(course.duration_minutes()));
    if !course.summary.is_empty() {
        println!();
        println!("{}", course.summary);
    }
    for module in &course.modules {
        println!();
        println!("[{}] {}", module.slug, module.title);
        for lesson in &module.lessons {
            println!(
                "  {:<28} {:>6}  {}",
                lesson.slug,
                format_duration(lesson.duration_minutes),
                lesson.title
            );
        }
    }
    Ok(())
}

fn handle_lesson(config: &Config, cmd: &LessonCommand) -> Result<()> {
    let lesson = open_repository(config)?.require_lesson(&cmd.course, &cmd.lesson)?;
    println!("{}", lesson.body_html);
    Ok(())
}

async fn handle_intro(config: &Config, cmd: IntroCommand) -> Result<()> {
    let course = open_repository(config)?.require_course(&cmd.slug)?;
    let registry = LayoutRegistry::with_defaults();
    let mut page = registry.render_intro(&course, &config.asset_policy());

    if !cmd.no_resolve {
        let loader = RoutingLoader::new(config.asset_root());
        let resolution = resolver::resolve(&mut page.hero, &loader).await;
        if !resolution.is_resolved() {
            warn!(course = %course.slug, "no hero image candidate loaded");
        }
    }

    let html = page.to_html();
    match cmd.output {
        Some(path) => {
            std::fs::write(&path, html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote intro page");
        }
        None => println!("{html}"),
    }
    Ok(())
}

async fn handle_resolve(config: &Config, cmd: ResolveCommand) -> Result<()> {
    let mut candidates = CandidateList::new(cmd.candidates);
    if !cmd.no_placeholder && config.assets.append_placeholder {
        candidates = candidates.with_terminal_fallback(config.assets.placeholder.clone());
    }

    let mut image = ImageResolver::new(candidates, cmd.alt);
    let loader = RoutingLoader::new(config.asset_root());
    let resolution = resolver::resolve(&mut image, &loader).await;

    if cmd.json {
        let output = serde_json::json!({
            "resolution": resolution,
            "element": image.element().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for attempt in &resolution.attempts {
        match &attempt.outcome {
            AttemptOutcome::Loaded { format, byte_len } => println!(
                "[{}] ok      {} ({}, {byte_len} bytes)",
                attempt.index,
                abbreviate(&attempt.source),
                format.mime()
            ),
            AttemptOutcome::Failed { reason } => println!(
                "[{}] failed  {} ({reason})",
                attempt.index,
                abbreviate(&attempt.source)
            ),
        }
    }
    println!("State:   {}", resolution.state);
    println!("Element: {}", image.element());
    Ok(())
}

// Data URIs are too long for a status line
fn abbreviate(source: &str) -> String {
    match source.char_indices().nth(60) {
        Some((cut, _)) => format!("{}...", &source[..cut]),
        None => source.to_string(),
    }
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> Result<()> {
    let catalog = CatalogFile::read(&cmd.file)
        .with_context(|| format!("failed to read catalog {}", cmd.file.display()))?;
    let storage = Storage::open(config.database_path())?;

    let mut reports = Vec::with_capacity(catalog.courses.len());
    for course in &catalog.courses {
        reports.push(
            storage
                .import_course(course)
                .with_context(|| format!("failed to import course {}", course.slug))?,
        );
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in &reports {
        println!(
            "{:<28} +{} ~{} ={} -{}",
            report.course, report.added, report.updated, report.unchanged, report.removed
        );
    }
    println!(
        "Imported {} course(s) into {}",
        reports.len(),
        storage.path().display()
    );
    Ok(())
}

fn handle_search(config: &Config, cmd: &SearchCommand) -> Result<()> {
    let hits = open_repository(config)?.search_lessons(&cmd.query, cmd.limit)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        println!("No lessons match \"{}\".", cmd.query);
        return Ok(());
    }
    for hit in &hits {
        println!("{}/{}  {}", hit.course_slug, hit.lesson_slug, hit.title);
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> Result<()> {
    let storage = Storage::open(config.database_path())?;
    let stats = storage.stats()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Database:      {}", storage.path().display());
    println!("Courses:       {}", stats.courses);
    println!("Lessons:       {}", stats.lessons);
    match stats.last_updated {
        Some(at) => println!("Last updated:  {}", at.to_rfc3339()),
        None => println!("Last updated:  never"),
    }
    println!("Size:          {} bytes", stats.db_size_bytes);
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = &load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Content]");
                println!("  Source:             {}", config.content.source);
                if let Some(path) = &config.content.path {
                    println!("  Catalog path:       {}", path.display());
                }
                println!();
                println!("[Assets]");
                println!("  Root:               {}", config.asset_root().display());
                println!("  Append placeholder: {}", config.assets.append_placeholder);
                println!("  Hero class:         {}", config.assets.hero_class);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        // Validating must not fail early on the file being validated
        ConfigCommand::Validate { file } => return handle_validate(file.or(config_path)),
    }
    Ok(())
}

fn handle_validate(file: Option<PathBuf>) -> Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("configuration is invalid")),
    }
}
