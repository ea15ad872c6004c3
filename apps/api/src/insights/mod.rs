//! Career insights — pure, deterministic derivations from a note set.
//! No I/O and no errors: short or odd-shaped notes give shorter collections.

pub mod recommendations;
pub mod roadmap;
pub mod sanitize;
pub mod skill_gaps;
pub mod trends;

use serde::Serialize;

use crate::notes::models::{ExamType, NotesOutput};
use recommendations::{build_recommendations, Recommendation};
use roadmap::{build_roadmap, RoadmapPhase};
use skill_gaps::{build_skill_gaps, SkillGap};
use trends::{build_trends, MarketTrend};

/// Upper bound on recommendations, skill gaps and roadmap phases.
pub const MAX_ENTRIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareerInsights {
    pub recommendations: Vec<Recommendation>,
    pub skill_gaps: Vec<SkillGap>,
    pub roadmap: Vec<RoadmapPhase>,
    pub trends: Vec<MarketTrend>,
}

pub fn synthesize(notes: &NotesOutput, exam_type: ExamType) -> CareerInsights {
    CareerInsights {
        recommendations: build_recommendations(notes, exam_type),
        skill_gaps: build_skill_gaps(notes),
        roadmap: build_roadmap(notes),
        trends: build_trends(exam_type),
    }
}
