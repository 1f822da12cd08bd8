// ── Survey domain types ──
//
// Surveys own an ordered list of questions; answers to individual
// questions are `Response`s, while a whole filled-in survey is a
// `SurveyResponse`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SurveyStatus {
    #[default]
    Draft,
    Published,
    Completed,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    ShortText,
    LongText,
    MultipleChoice,
    Checkbox,
    Dropdown,
    LinearScale,
    Date,
    Time,
}

impl QuestionType {
    /// Whether answers are picked from `options`.
    pub fn has_options(self) -> bool {
        matches!(self, Self::MultipleChoice | Self::Checkbox | Self::Dropdown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: EntityId,
    pub survey_id: EntityId,
    pub text: String,
    pub options: Vec<String>,
    pub question_type: QuestionType,
    pub order: i64,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A survey's question list holds either bare ids or populated questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurveyQuestion {
    Ref(EntityId),
    Inline(Box<Question>),
}

impl SurveyQuestion {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Ref(id) => id,
            Self::Inline(question) => &question.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub questions: Vec<SurveyQuestion>,
    pub status: SurveyStatus,
    pub is_active: bool,
    pub number_of_respondents: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Survey {
    pub fn accepts_responses(&self) -> bool {
        self.status == SurveyStatus::Published && self.is_active
    }
}

/// A single answer to a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: EntityId,
    pub question_id: EntityId,
    pub user_id: EntityId,
    pub value: String,
    pub answered_at: Option<DateTime<Utc>>,
}

/// Optional travel profile a respondent attaches to a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondentProfile {
    pub preferred_destination: Option<String>,
    pub travel_style: Option<String>,
    pub budget: Option<String>,
    pub travel_dates: Option<String>,
    pub group_size: Option<u64>,
    pub interests: Vec<String>,
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    pub question_id: EntityId,
    pub value: String,
}

/// A completed survey submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: EntityId,
    pub survey_id: EntityId,
    pub user_id: EntityId,
    pub user_name: String,
    pub answers: Vec<SurveyAnswer>,
    pub profile: Option<RespondentProfile>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn question_type_wire_names() {
        assert_eq!(QuestionType::LinearScale.to_string(), "linear-scale");
        assert_eq!(
            "multiple-choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert!(QuestionType::Dropdown.has_options());
        assert!(!QuestionType::Date.has_options());
    }
}
