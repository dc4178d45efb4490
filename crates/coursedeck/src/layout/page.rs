//! Composed course introduction pages.

use std::fmt;

use crate::content::{format_duration, CourseCategory, CourseModule};
use crate::html::escape;
use crate::resolver::ImageResolver;

/// A lesson entry in an outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLesson {
    /// Lesson slug, used for the link target.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Estimated time.
    pub duration_minutes: u32,
}

/// A module entry in an outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineModule {
    /// Display title, possibly decorated by the layout.
    pub title: String,
    /// Lessons in teaching order.
    pub lessons: Vec<OutlineLesson>,
}

impl OutlineModule {
    /// Outline entry for a course module, keeping its title.
    #[must_use]
    pub fn from_module(module: &CourseModule) -> Self {
        Self {
            title: module.title.clone(),
            lessons: module
                .lessons
                .iter()
                .map(|l| OutlineLesson {
                    slug: l.slug.clone(),
                    title: l.title.clone(),
                    duration_minutes: l.duration_minutes,
                })
                .collect(),
        }
    }
}

/// One block of an introduction page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Free text under an optional heading.
    Paragraph {
        /// Section heading.
        heading: Option<String>,
        /// Plain text body.
        text: String,
    },
    /// Modules and their lessons.
    Outline {
        /// Section heading.
        heading: String,
        /// Render modules as an ordered list.
        numbered: bool,
        /// Modules in order.
        modules: Vec<OutlineModule>,
    },
    /// Shell commands shown as code.
    Commands {
        /// Section heading.
        heading: String,
        /// One command per entry.
        commands: Vec<String>,
    },
    /// Label/value pairs.
    Stats(Vec<(String, String)>),
}

impl Section {
    /// Short name of the section kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::Outline { .. } => "outline",
            Self::Commands { .. } => "commands",
            Self::Stats(_) => "stats",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph { heading, text } => {
                f.write_str("<section class=\"paragraph\">")?;
                if let Some(heading) = heading {
                    write!(f, "<h2>{}</h2>", escape(heading))?;
                }
                write!(f, "<p>{}</p></section>", escape(text))
            }
            Self::Outline {
                heading,
                numbered,
                modules,
            } => {
                let list = if *numbered { "ol" } else { "ul" };
                write!(f, "<section class=\"outline\"><h2>{}</h2><{list}>", escape(heading))?;
                for module in modules {
                    write!(f, "<li><h3>{}</h3><ul>", escape(&module.title))?;
                    for lesson in &module.lessons {
                        write!(
                            f,
                            "<li data-lesson=\"{}\">{} <span class=\"duration\">{}</span></li>",
                            escape(&lesson.slug),
                            escape(&lesson.title),
                            format_duration(lesson.duration_minutes)
                        )?;
                    }
                    f.write_str("</ul></li>")?;
                }
                write!(f, "</{list}></section>")
            }
            Self::Commands { heading, commands } => {
                write!(f, "<section class=\"commands\"><h2>{}</h2><ul>", escape(heading))?;
                for command in commands {
                    write!(f, "<li><code>{}</code></li>", escape(command))?;
                }
                f.write_str("</ul></section>")
            }
            Self::Stats(stats) => {
                f.write_str("<section class=\"stats\"><dl>")?;
                for (label, value) in stats {
                    write!(f, "<dt>{}</dt><dd>{}</dd>", escape(label), escape(value))?;
                }
                f.write_str("</dl></section>")
            }
        }
    }
}

/// A course introduction page produced by a layout.
#[derive(Debug)]
pub struct IntroPage {
    /// Page heading.
    pub title: String,
    /// Category whose layout composed the page.
    pub category: CourseCategory,
    /// Hero image; the host reports load results to it.
    pub hero: ImageResolver,
    /// Body sections in order.
    pub sections: Vec<Section>,
}

impl IntroPage {
    /// Render the page as an HTML fragment.
    ///
    /// The hero is rendered from its current state, so rendering again after
    /// the host reports load results picks up the new source.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.to_string()
    }

    /// Find the first section of a kind.
    #[must_use]
    pub fn section(&self, kind: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind() == kind)
    }
}

impl fmt::Display for IntroPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<article class=\"course-intro course-{}\"><header><h1>{}</h1>{}</header>",
            self.category,
            escape(&self.title),
            self.hero.element()
        )?;
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        f.write_str("</article>")
    }
}
