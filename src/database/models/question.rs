use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "General";

/// Interview practice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Body of `POST /api/questions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Body of `PUT /api/questions/:id`; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Question {
    pub fn apply(&mut self, patch: QuestionPatch) {
        if let Some(question) = patch.question {
            self.question = question;
        }
        if let Some(answer) = patch.answer {
            self.answer = answer;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}
