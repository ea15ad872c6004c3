use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Midterm,
    Final,
    Viva,
}

impl ExamType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "midterm" => Some(ExamType::Midterm),
            "final" => Some(ExamType::Final),
            "viva" => Some(ExamType::Viva),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Midterm => "midterm",
            ExamType::Final => "final",
            ExamType::Viva => "viva",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Short,
    Medium,
    Detailed,
}

impl Depth {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "short" => Some(Depth::Short),
            "medium" => Some(Depth::Medium),
            "detailed" => Some(Depth::Detailed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Short => "short",
            Depth::Medium => "medium",
            Depth::Detailed => "detailed",
        }
    }
}

/// A validated notes request. `content` is already trimmed.
/// Serializes to the worker's input document: `{content, exam_type, depth}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRequest {
    pub content: String,
    pub exam_type: ExamType,
    pub depth: Depth,
}

/// Typed view over a worker document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotesOutput {
    pub title: String,
    pub key_concepts: Vec<String>,
    pub important_points: Vec<String>,
    pub exam_tips: Vec<String>,
}

impl NotesOutput {
    /// Reads the four known keys out of an arbitrary JSON value.
    /// Missing keys, non-string items and non-object documents degrade to empty values.
    pub fn from_value(value: &Value) -> Self {
        NotesOutput {
            title: value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            key_concepts: string_list(value.get("key_concepts")),
            important_points: string_list(value.get("important_points")),
            exam_tips: string_list(value.get("exam_tips")),
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A well-formed JSON document produced by the worker, kept verbatim
/// next to its typed view.
#[derive(Debug, Clone, PartialEq)]
pub struct NotesDocument {
    raw: Value,
    notes: NotesOutput,
}

impl NotesDocument {
    pub fn new(raw: Value) -> Self {
        let notes = NotesOutput::from_value(&raw);
        Self { raw, notes }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn notes(&self) -> &NotesOutput {
        &self.notes
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}
