//! The catalog shipped with the binary.

use chrono::{DateTime, Utc};

use super::category::CourseCategory;
use super::model::{Course, CourseModule, Lesson};
use crate::resolver::{CandidateList, PLACEHOLDER_SVG};

/// 2024-01-15T00:00:00Z, when the built-in lessons were last revised.
const REVISED_AT: i64 = 1_705_276_800;

fn lesson(slug: &str, title: &str, minutes: u32, body: &str) -> Lesson {
    let mut lesson = Lesson::new(slug, title, minutes, body);
    lesson.updated_at = DateTime::<Utc>::from_timestamp(REVISED_AT, 0).unwrap_or_default();
    lesson
}

fn module(slug: &str, title: &str, lessons: Vec<Lesson>) -> CourseModule {
    CourseModule {
        slug: slug.to_string(),
        title: title.to_string(),
        lessons,
    }
}

fn hero(name: &str) -> CandidateList {
    CandidateList::new([
        format!("/img/courses/{name}.webp"),
        format!("/img/courses/{name}.png"),
        "/img/courses/generic.png".to_string(),
    ])
    .with_terminal_fallback(PLACEHOLDER_SVG)
}

pub(super) fn courses() -> Vec<Course> {
    vec![devops(), linux(), git(), cloud()]
}

fn devops() -> Course {
    Course {
        slug: "devops-foundations".to_string(),
        title: "DevOps Foundations".to_string(),
        category: Some(CourseCategory::DevOps),
        summary: "From a single server to an automated delivery pipeline: \
                  version control, CI, containers and infrastructure as code."
            .to_string(),
        hero: hero("devops"),
        modules: vec![
            module(
                "culture",
                "Culture and Flow",
                vec![
                    lesson(
                        "what-is-devops",
                        "What is DevOps?",
                        15,
                        "<h2>What is DevOps?</h2>\
                         <p>DevOps joins development and operations around a shared goal: \
                         shipping small changes safely and often.</p>\
                         <ul><li>Flow</li><li>Feedback</li><li>Continuous learning</li></ul>",
                    ),
                    lesson(
                        "value-streams",
                        "Mapping a value stream",
                        20,
                        "<h2>Value streams</h2>\
                         <p>Follow one change from commit to production and note every wait.</p>",
                    ),
                ],
            ),
            module(
                "pipelines",
                "Pipelines",
                vec![
                    lesson(
                        "continuous-integration",
                        "Continuous integration",
                        30,
                        "<h2>Continuous integration</h2>\
                         <p>Every push builds and tests the project.</p>\
                         <pre><code>on: [push]\njobs:\n  test:\n    runs-on: ubuntu-latest</code></pre>",
                    ),
                    lesson(
                        "containers",
                        "Packaging with containers",
                        35,
                        "<h2>Containers</h2>\
                         <p>An image bundles the application and its runtime.</p>\
                         <pre><code>docker build -t app:1.0 .\ndocker run -p 8080:8080 app:1.0</code></pre>",
                    ),
                    lesson(
                        "infrastructure-as-code",
                        "Infrastructure as code",
                        40,
                        "<h2>Infrastructure as code</h2>\
                         <p>Servers, networks and DNS described in versioned files.</p>",
                    ),
                ],
            ),
        ],
    }
}

fn linux() -> Course {
    Course {
        slug: "linux-command-line".to_string(),
        title: "The Linux Command Line".to_string(),
        category: Some(CourseCategory::Linux),
        summary: "Navigate the filesystem, manage processes and automate \
                  everyday work from the shell."
            .to_string(),
        hero: hero("linux"),
        modules: vec![
            module(
                "filesystem",
                "Filesystem",
                vec![
                    lesson(
                        "navigation",
                        "Moving around",
                        10,
                        "<h2>Moving around</h2>\
                         <p><code>pwd</code>, <code>ls -la</code> and <code>cd</code> \
                         are the first three commands to learn.</p>",
                    ),
                    lesson(
                        "permissions",
                        "Permissions",
                        25,
                        "<h2>Permissions</h2>\
                         <p>Read, write and execute bits for owner, group and others.</p>\
                         <pre><code>chmod 640 notes.txt\nchown alice:staff notes.txt</code></pre>",
                    ),
                ],
            ),
            module(
                "processes",
                "Processes",
                vec![
                    lesson(
                        "ps-and-top",
                        "Inspecting processes",
                        15,
                        "<h2>Inspecting processes</h2>\
                         <pre><code>ps aux | grep nginx\ntop</code></pre>",
                    ),
                    lesson(
                        "signals",
                        "Signals",
                        15,
                        "<h2>Signals</h2>\
                         <p><code>kill -TERM</code> asks politely, <code>kill -KILL</code> does not.</p>",
                    ),
                ],
            ),
            module(
                "text",
                "Working with Text",
                vec![lesson(
                    "pipes",
                    "Pipes and filters",
                    20,
                    "<h2>Pipes and filters</h2>\
                     <pre><code>cat access.log | cut -d' ' -f1 | sort | uniq -c | sort -rn</code></pre>",
                )],
            ),
        ],
    }
}

fn git() -> Course {
    Course {
        slug: "git-essentials".to_string(),
        title: "Git Essentials".to_string(),
        category: Some(CourseCategory::Git),
        summary: "Track changes, branch with confidence and collaborate \
                  through pull requests."
            .to_string(),
        hero: hero("git"),
        modules: vec![
            module(
                "basics",
                "Basics",
                vec![
                    lesson(
                        "first-repository",
                        "Your first repository",
                        15,
                        "<h2>Your first repository</h2>\
                         <pre><code>git init\ngit add README.md\ngit commit -m \"Initial commit\"</code></pre>",
                    ),
                    lesson(
                        "history",
                        "Reading history",
                        10,
                        "<h2>Reading history</h2>\
                         <pre><code>git log --oneline --graph</code></pre>",
                    ),
                ],
            ),
            module(
                "branching",
                "Branching",
                vec![
                    lesson(
                        "branches",
                        "Branches",
                        20,
                        "<h2>Branches</h2>\
                         <pre><code>git switch -c feature/login</code></pre>",
                    ),
                    lesson(
                        "merging",
                        "Merging and conflicts",
                        30,
                        "<h2>Merging</h2>\
                         <p>A conflict marks the lines both branches changed.</p>",
                    ),
                    lesson(
                        "rebasing",
                        "Rebasing",
                        25,
                        "<h2>Rebasing</h2>\
                         <pre><code>git rebase main</code></pre>",
                    ),
                ],
            ),
        ],
    }
}

// No explicit category: exercises the slug-based inference
fn cloud() -> Course {
    Course {
        slug: "cloud-primer".to_string(),
        title: "Cloud Primer".to_string(),
        category: None,
        summary: "Regions, availability zones and the shared responsibility model.".to_string(),
        hero: hero("cloud"),
        modules: vec![module(
            "concepts",
            "Concepts",
            vec![lesson(
                "regions",
                "Regions and zones",
                15,
                "<h2>Regions and zones</h2>\
                 <p>Spread workloads across zones to survive a data-centre outage.</p>",
            )],
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InMemoryRepository;

    #[test]
    fn test_builtin_catalog_is_valid() {
        assert!(InMemoryRepository::new(courses()).is_ok());
    }

    #[test]
    fn test_every_hero_ends_with_placeholder() {
        for course in courses() {
            assert!(course.hero.has_inline_terminal(), "{}", course.slug);
            assert_eq!(course.hero.last(), Some(PLACEHOLDER_SVG));
        }
    }

    #[test]
    fn test_covers_every_category() {
        let categories: Vec<_> = courses().iter().map(Course::category).collect();
        for category in CourseCategory::ALL {
            assert!(categories.contains(&category), "{category}");
        }
    }

    #[test]
    fn test_lessons_have_fixed_revision_date() {
        for course in courses() {
            for lesson in course.lessons() {
                assert_eq!(lesson.updated_at.timestamp(), REVISED_AT);
            }
        }
    }
}
