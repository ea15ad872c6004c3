use serde::Serialize;

use crate::insights::sanitize::{sanitize, sanitize_or};
use crate::insights::MAX_ENTRIES;
use crate::notes::models::NotesOutput;

const DEFAULT_ACTION: &str = "Revisit fundamentals with spaced repetition.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkillGapStatus {
    #[serde(rename = "Strength")]
    Strength,
    #[serde(rename = "Needs polish")]
    NeedsPolish,
    #[serde(rename = "Practice more")]
    PracticeMore,
}

/// Status by position; everything past the table is `PracticeMore`.
const STATUS_BY_INDEX: &[SkillGapStatus] = &[SkillGapStatus::Strength, SkillGapStatus::NeedsPolish];

fn status_for(index: usize) -> SkillGapStatus {
    STATUS_BY_INDEX
        .get(index)
        .copied()
        .unwrap_or(SkillGapStatus::PracticeMore)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillGap {
    pub focus: String,
    pub status: SkillGapStatus,
    pub action: String,
}

/// One gap per important point (up to three), paired with the matching exam tip.
pub fn build_skill_gaps(notes: &NotesOutput) -> Vec<SkillGap> {
    notes
        .important_points
        .iter()
        .take(MAX_ENTRIES)
        .enumerate()
        .map(|(i, point)| {
            let action = notes
                .exam_tips
                .get(i)
                .or_else(|| notes.exam_tips.first())
                .map(String::as_str)
                .unwrap_or(DEFAULT_ACTION);

            SkillGap {
                focus: sanitize_or(point, || format!("Focus area {}", i + 1)),
                status: status_for(i),
                action: sanitize(action),
            }
        })
        .collect()
}
