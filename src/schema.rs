//! Input schema served to the host at `/input_schema`, describing every field
//! the request normalizer understands.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::request::{AnalysisMode, MAX_TEXT_LENGTH, MIN_TEXT_LENGTH};

#[derive(Debug, Clone, Serialize)]
pub struct InputSchema {
    pub input_data: Vec<InputField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputField {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub data: FieldData,
    pub validations: Vec<Validation>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldData {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub validation: &'static str,
    pub value: String,
}

fn v(validation: &'static str, value: impl ToString) -> Validation {
    Validation {
        validation,
        value: value.to_string(),
    }
}

fn integer_field(id: &'static str, name: &'static str, description: &str, max: usize) -> InputField {
    InputField {
        id,
        kind: "number",
        name,
        data: FieldData {
            description: description.to_string(),
            ..FieldData::default()
        },
        validations: vec![v("min", 1), v("max", max), v("format", "integer")],
    }
}

static SCHEMA: Lazy<InputSchema> = Lazy::new(|| InputSchema {
    input_data: vec![
        InputField {
            id: "analysis_type",
            kind: "option",
            name: "Analysis Type",
            data: FieldData {
                description: "Type of analysis to perform".to_string(),
                values: Some(AnalysisMode::ORDERED.iter().map(|m| m.as_str()).collect()),
                default: Some(AnalysisMode::General.as_str()),
                placeholder: None,
            },
            validations: vec![v("required", true)],
        },
        InputField {
            id: "text",
            kind: "text",
            name: "Text Input",
            data: FieldData {
                description: "Text to analyze (required for every mode except ranking)".to_string(),
                placeholder: Some(format!(
                    "Enter text to analyze ({MIN_TEXT_LENGTH} to {MAX_TEXT_LENGTH} characters)"
                )),
                ..FieldData::default()
            },
            validations: vec![v("min", MIN_TEXT_LENGTH), v("max", MAX_TEXT_LENGTH)],
        },
        InputField {
            id: "user_history",
            kind: "text",
            name: "User Engagement History",
            data: FieldData {
                description: "Required for ranking: JSON array of the user's past engagements"
                    .to_string(),
                placeholder: Some(
                    r#"[{"post_id": "post1", "action": "like", "timestamp": 1734567890}]"#.to_string(),
                ),
                ..FieldData::default()
            },
            validations: Vec::new(),
        },
        InputField {
            id: "candidates",
            kind: "text",
            name: "Candidate Posts",
            data: FieldData {
                description: "Required for ranking: JSON array of posts to rank".to_string(),
                placeholder: Some(
                    r#"[{"post_id": "cand1", "text": "Breaking news about AI", "author_id": "user123", "media_type": "text"}]"#
                        .to_string(),
                ),
                ..FieldData::default()
            },
            validations: Vec::new(),
        },
        integer_field(
            "max_keywords",
            "Maximum Keywords",
            "Maximum number of keywords to extract (1-100, default: 10)",
            100,
        ),
        integer_field(
            "summary_sentences",
            "Summary Sentences",
            "Sentence count below which the text is returned unchanged (1-20, default: 3)",
            20,
        ),
        integer_field(
            "top_k",
            "Top K Recommendations",
            "Number of ranked candidates to return (1-100, default: 10)",
            100,
        ),
    ],
});

pub fn input_schema() -> &'static InputSchema {
    &SCHEMA
}
