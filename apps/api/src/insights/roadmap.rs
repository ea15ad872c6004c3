use serde::Serialize;

use crate::insights::sanitize::sanitize_or;
use crate::insights::MAX_ENTRIES;
use crate::notes::models::NotesOutput;

const DEFAULT_DETAIL: &str = "Apply concepts to realistic prompts.";
const LAST_MILESTONE: &str = "Final stretch";

/// (title, milestone) by phase index.
const PHASES: &[(&str, &str)] = &[
    ("Foundation", "Week 1"),
    ("Application", "Week 2"),
    ("Confidence", LAST_MILESTONE),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadmapPhase {
    pub title: String,
    pub detail: String,
    pub milestone: String,
}

fn phase_labels(index: usize) -> (String, &'static str) {
    match PHASES.get(index) {
        Some((title, milestone)) => (title.to_string(), milestone),
        None => (format!("Phase {}", index + 1), LAST_MILESTONE),
    }
}

/// One phase per exam tip, up to three.
pub fn build_roadmap(notes: &NotesOutput) -> Vec<RoadmapPhase> {
    notes
        .exam_tips
        .iter()
        .take(MAX_ENTRIES)
        .enumerate()
        .map(|(i, tip)| {
            let (title, milestone) = phase_labels(i);
            RoadmapPhase {
                title,
                detail: sanitize_or(tip, || DEFAULT_DETAIL.to_string()),
                milestone: milestone.to_string(),
            }
        })
        .collect()
}
