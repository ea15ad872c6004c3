//! Markdown export of a note set (the "copy notes" view).

use crate::insights::sanitize::sanitize;
use crate::notes::models::NotesOutput;

const SECTIONS: &[&str] = &["Key Concepts", "Important Points", "Exam Tips"];

/// Renders `# title` followed by one `##` section per list, bullets normalized to `- `.
/// Blank bullets are skipped; empty sections keep their heading.
pub fn render_markdown(notes: &NotesOutput) -> String {
    let mut lines = vec![format!("# {}", notes.title.trim())];

    let lists = [&notes.key_concepts, &notes.important_points, &notes.exam_tips];
    for (heading, items) in SECTIONS.iter().zip(lists) {
        lines.push(String::new());
        lines.push(format!("## {heading}"));
        lines.extend(
            items
                .iter()
                .map(|item| sanitize(item))
                .filter(|item| !item.is_empty())
                .map(|item| format!("- {item}")),
        );
    }

    lines.join("\n")
}
