//! Role recommendations derived from the note set's concepts.
//!
//! Source is `key_concepts`, or `important_points` when there are no concepts.
//! Match score: `min(98, 68 + depth_boost(exam_type) + 7 * index)`.

use serde::Serialize;

use crate::insights::sanitize::{sanitize, sanitize_or};
use crate::insights::MAX_ENTRIES;
use crate::notes::models::{ExamType, NotesOutput};

const BASE_MATCH: u32 = 68;
const MATCH_STEP: u32 = 7;
const MAX_MATCH: u32 = 98;
const ROLE_SUFFIX: &str = " Strategist";
const FALLBACK_SKILL: &str = "Structured thinking";

const SCOPE_ORAL: &str = "Excels in real-time articulation and coaching environments.";
const SCOPE_WRITTEN: &str = "High potential for collaborative research and curriculum innovation.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub role: String,
    pub match_percent: u32,
    pub skills: Vec<String>,
    pub future_scope: String,
}

pub fn depth_boost(exam_type: ExamType) -> u32 {
    match exam_type {
        ExamType::Viva => 6,
        ExamType::Final => 10,
        ExamType::Midterm => 4,
    }
}

pub fn match_percent(exam_type: ExamType, index: usize) -> u32 {
    let step = MATCH_STEP.saturating_mul(index as u32);
    (BASE_MATCH + depth_boost(exam_type))
        .saturating_add(step)
        .min(MAX_MATCH)
}

fn future_scope(exam_type: ExamType) -> &'static str {
    match exam_type {
        ExamType::Viva => SCOPE_ORAL,
        ExamType::Final | ExamType::Midterm => SCOPE_WRITTEN,
    }
}

pub fn build_recommendations(notes: &NotesOutput, exam_type: ExamType) -> Vec<Recommendation> {
    let source = if notes.key_concepts.is_empty() {
        &notes.important_points
    } else {
        &notes.key_concepts
    };

    source
        .iter()
        .take(MAX_ENTRIES)
        .enumerate()
        .map(|(i, concept)| {
            let label = sanitize_or(concept, || format!("Opportunity {}", i + 1));

            let companion = notes
                .important_points
                .get(i)
                .or_else(|| notes.exam_tips.get(i))
                .unwrap_or(concept);
            let companion = sanitize_or(companion, || FALLBACK_SKILL.to_string());

            Recommendation {
                role: format!("{label}{ROLE_SUFFIX}"),
                match_percent: match_percent(exam_type, i),
                skills: vec![label, companion],
                future_scope: future_scope(exam_type).to_string(),
            }
        })
        .collect()
}
