// ── Mutation inputs ──
//
// Typed payloads for create/update operations and auth flows. Each is
// checked by `crate::validate` before it is encoded for the wire by
// `crate::normalize`.

use chrono::NaiveDate;
use secrecy::SecretString;
use tripdesk_api::FilePart;

use crate::model::{EntityId, QuestionType, RespondentProfile, SurveyAnswer, SurveyStatus};

#[derive(Debug, Clone, Default)]
pub struct TripInput {
    pub destination: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price: f64,
    pub reduction: f64,
    pub is_available: bool,
    pub trip_type: String,
    pub image: Option<FilePart>,
}

#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub price: f64,
    pub is_active: bool,
    pub image: Option<FilePart>,
}

#[derive(Debug, Clone, Default)]
pub struct RewardInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub points_required: u64,
    pub discount_percentage: Option<f64>,
    pub event_id: Option<EntityId>,
    pub image: Option<FilePart>,
    /// Set on updates that keep the already uploaded image.
    pub keep_existing_image: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SurveyInput {
    pub title: String,
    pub description: String,
    pub status: Option<SurveyStatus>,
    pub is_active: Option<bool>,
    pub questions: Vec<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionInput {
    pub survey_id: EntityId,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub order: i64,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseInput {
    pub question_id: EntityId,
    pub user_id: EntityId,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct SurveySubmission {
    pub user_id: EntityId,
    pub user_name: String,
    pub answers: Vec<SurveyAnswer>,
    pub profile: Option<RespondentProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub name: String,
    pub lastname: String,
    pub email: String,
    /// Left empty on updates that keep the current password.
    pub password: Option<SecretString>,
    pub travel_preferences: Vec<String>,
    pub profile_image: Option<FilePart>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminInput {
    pub name: String,
    pub email: String,
    pub password: Option<SecretString>,
    pub image: Option<FilePart>,
}

#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: Option<String>,
    pub image: Option<FilePart>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentInput {
    pub text: String,
}

// ── Auth flows ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct OtpVerification {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub email: String,
    pub otp: String,
    pub new_password: SecretString,
}
