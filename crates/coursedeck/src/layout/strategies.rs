//! Built-in layouts, one per course category.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::page::{IntroPage, OutlineModule, Section};
use super::{AssetPolicy, LayoutStrategy};
use crate::content::{format_duration, Course, CourseCategory};
use crate::html::unescape;

/// Most commands listed on a page.
const MAX_COMMANDS: usize = 12;

fn code_regex() -> &'static Regex {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new(r"(?s)<code[^>]*>(.*?)</code>").expect("code pattern is valid"))
}

/// Distinct command lines inside `<code>` elements of a course's lessons.
pub(crate) fn extract_commands(course: &Course) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut commands = Vec::new();
    for lesson in course.lessons() {
        for capture in code_regex().captures_iter(&lesson.body_html) {
            for line in capture[1].lines() {
                let command = unescape(line).trim().to_string();
                if !command.is_empty() && seen.insert(command.clone()) {
                    commands.push(command);
                }
            }
        }
    }
    commands
}

fn summary(course: &Course) -> Option<Section> {
    (!course.summary.trim().is_empty()).then(|| Section::Paragraph {
        heading: None,
        text: course.summary.trim().to_string(),
    })
}

fn stats(course: &Course, modules_label: &str) -> Section {
    Section::Stats(vec![
        (modules_label.to_string(), course.modules.len().to_string()),
        ("Lessons".to_string(), course.lessons().count().to_string()),
        (
            "Duration".to_string(),
            format_duration(course.duration_minutes()),
        ),
    ])
}

fn page(
    course: &Course,
    category: CourseCategory,
    assets: &AssetPolicy,
    sections: Vec<Section>,
) -> IntroPage {
    IntroPage {
        title: course.title.clone(),
        category,
        hero: assets.hero(course),
        sections,
    }
}

/// Summary, stats and a plain outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLayout;

impl LayoutStrategy for StandardLayout {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn compose(&self, course: &Course, assets: &AssetPolicy) -> IntroPage {
        let mut sections: Vec<Section> = summary(course).into_iter().collect();
        sections.push(stats(course, "Modules"));
        sections.push(Section::Outline {
            heading: "Course outline".to_string(),
            numbered: false,
            modules: course.modules.iter().map(OutlineModule::from_module).collect(),
        });
        page(course, CourseCategory::General, assets, sections)
    }
}

/// Modules presented as numbered roadmap stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoadmapLayout;

impl LayoutStrategy for RoadmapLayout {
    fn name(&self) -> &'static str {
        "roadmap"
    }

    fn compose(&self, course: &Course, assets: &AssetPolicy) -> IntroPage {
        let stages = course
            .modules
            .iter()
            .enumerate()
            .map(|(i, module)| {
                let mut stage = OutlineModule::from_module(module);
                stage.title = format!("Stage {}: {}", i + 1, module.title);
                stage
            })
            .collect();

        let mut sections: Vec<Section> = summary(course).into_iter().collect();
        sections.push(stats(course, "Stages"));
        sections.push(Section::Outline {
            heading: "Roadmap".to_string(),
            numbered: true,
            modules: stages,
        });
        page(course, CourseCategory::DevOps, assets, sections)
    }
}

/// Leads with a reference of the commands the course teaches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandReferenceLayout;

impl LayoutStrategy for CommandReferenceLayout {
    fn name(&self) -> &'static str {
        "command-reference"
    }

    fn compose(&self, course: &Course, assets: &AssetPolicy) -> IntroPage {
        let mut sections: Vec<Section> = summary(course).into_iter().collect();

        let mut commands = extract_commands(course);
        if !commands.is_empty() {
            commands.truncate(MAX_COMMANDS);
            sections.push(Section::Commands {
                heading: "Commands you will learn".to_string(),
                commands,
            });
        }
        sections.push(stats(course, "Modules"));
        sections.push(Section::Outline {
            heading: "Course outline".to_string(),
            numbered: false,
            modules: course.modules.iter().map(OutlineModule::from_module).collect(),
        });
        page(course, CourseCategory::Linux, assets, sections)
    }
}

/// A numbered workflow plus the `git` invocations it uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowLayout;

impl LayoutStrategy for WorkflowLayout {
    fn name(&self) -> &'static str {
        "workflow"
    }

    fn compose(&self, course: &Course, assets: &AssetPolicy) -> IntroPage {
        let mut sections: Vec<Section> = summary(course).into_iter().collect();
        sections.push(Section::Outline {
            heading: "Workflow".to_string(),
            numbered: true,
            modules: course.modules.iter().map(OutlineModule::from_module).collect(),
        });

        let git_commands: Vec<String> = extract_commands(course)
            .into_iter()
            .filter(|c| c.starts_with("git "))
            .take(MAX_COMMANDS)
            .collect();
        if !git_commands.is_empty() {
            sections.push(Section::Commands {
                heading: "Cheat sheet".to_string(),
                commands: git_commands,
            });
        }
        sections.push(stats(course, "Modules"));
        page(course, CourseCategory::Git, assets, sections)
    }
}
