// ── Client-side validation ──
//
// Runs before any request is built. A failure never reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::model::QuestionType;
use crate::model::reward::{DISCOUNT_CATEGORY, GIFT_CATEGORY};
use crate::requests::{
    AdminInput, CommentInput, EventInput, ForgotPasswordRequest, LoginRequest, OtpVerification,
    PasswordReset, PostInput, QuestionInput, ResponseInput, RewardInput, SurveyInput,
    SurveySubmission, TripInput, UserInput,
};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_EVENT_PRICE: f64 = 9999.0;

/// Per-field validation messages, keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn require(&mut self, field: &'static str, value: &str, message: &str) {
        self.check(!value.trim().is_empty(), field, message);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checked before an input is sent to the backend.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else {
        errors.check(looks_like_email(email), "email", "Email address is invalid");
    }
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &SecretString) {
    let len = password.expose_secret().chars().count();
    errors.check(
        len >= MIN_PASSWORD_LEN,
        field,
        "Password must be at least 6 characters",
    );
}

// ── Catalogue ───────────────────────────────────────────────────────

impl Validate for TripInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("destination", &self.destination, "Destination is required");
        errors.require("description", &self.description, "Description is required");
        errors.check(self.price > 0.0, "price", "Price must be greater than 0");
        errors.check(
            (0.0..=100.0).contains(&self.reduction),
            "reduction",
            "Reduction must be between 0 and 100",
        );
        errors.check(self.start_date.is_some(), "start_date", "Start date is required");
        errors.check(self.end_date.is_some(), "end_date", "End date is required");
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            errors.check(end > start, "end_date", "End date must be after start date");
        }
        errors.require("trip_type", &self.trip_type, "Trip type is required");
        errors.finish()
    }
}

impl EventInput {
    /// Validate against an explicit "today" (the date must lie after it).
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("description", &self.description, "Description is required");
        if self.location.trim().is_empty() {
            errors.add("location", "Location is required");
        } else {
            errors.check(
                self.location
                    .chars()
                    .all(|c| c.is_alphabetic() || c.is_whitespace()),
                "location",
                "Location must contain only letters",
            );
        }
        errors.check(
            self.price > 0.0 && self.price <= MAX_EVENT_PRICE,
            "price",
            "Price must be between 0 and 9999",
        );
        match self.date {
            None => errors.add("date", "Date is required"),
            Some(date) => errors.check(date > today, "date", "Date must be in the future"),
        }
        errors.require("time", &self.time, "Time is required");
        errors.finish()
    }
}

impl Validate for EventInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

impl Validate for RewardInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("description", &self.description, "Description is required");
        errors.require("category", &self.category, "Category is required");
        errors.check(
            self.points_required > 0,
            "points_required",
            "Points required must be greater than 0",
        );
        errors.check(
            self.image.is_some() || self.keep_existing_image,
            "image",
            "Image is required",
        );
        if self.category.eq_ignore_ascii_case(DISCOUNT_CATEGORY) {
            errors.check(
                self.discount_percentage
                    .is_some_and(|d| (1.0..=100.0).contains(&d)),
                "discount_percentage",
                "Discount must be between 1 and 100",
            );
        }
        if self.category.eq_ignore_ascii_case(GIFT_CATEGORY) {
            errors.check(
                self.event_id.as_ref().is_some_and(|id| !id.is_empty()),
                "event_id",
                "Gift rewards must reference an event",
            );
        }
        errors.finish()
    }
}

// ── Surveys ─────────────────────────────────────────────────────────

impl Validate for SurveyInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.finish()
    }
}

impl Validate for QuestionInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("text", &self.text, "Question text is required");
        errors.require("survey_id", self.survey_id.as_str(), "Survey is required");
        if self.question_type.has_options() {
            errors.check(
                self.options.iter().any(|o| !o.trim().is_empty()),
                "options",
                "At least one option is required",
            );
        }
        if self.question_type == QuestionType::LinearScale {
            if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
                errors.check(min < max, "max_value", "Maximum must be greater than minimum");
            }
            if let Some(step) = self.step {
                errors.check(step > 0.0, "step", "Step must be greater than 0");
            }
        }
        errors.finish()
    }
}

impl Validate for ResponseInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("question_id", self.question_id.as_str(), "Question is required");
        errors.require("user_id", self.user_id.as_str(), "User is required");
        errors.finish()
    }
}

impl Validate for SurveySubmission {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            !self.answers.is_empty(),
            "answers",
            "At least one answer is required",
        );
        errors.check(
            self.answers.iter().all(|a| !a.question_id.is_empty()),
            "answers",
            "Every answer must reference a question",
        );
        errors.finish()
    }
}

// ── Accounts ────────────────────────────────────────────────────────

impl Validate for UserInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "First name is required");
        errors.require("lastname", &self.lastname, "Last name is required");
        check_email(&mut errors, &self.email);
        if let Some(password) = &self.password {
            check_password(&mut errors, "password", password);
        }
        errors.finish()
    }
}

impl Validate for AdminInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Name is required");
        check_email(&mut errors, &self.email);
        if let Some(password) = &self.password {
            check_password(&mut errors, "password", password);
        }
        errors.finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        errors.check(
            !self.password.expose_secret().is_empty(),
            "password",
            "Password is required",
        );
        errors.finish()
    }
}

impl Validate for ForgotPasswordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        errors.finish()
    }
}

fn check_otp(errors: &mut ValidationErrors, otp: &str) {
    let otp = otp.trim();
    if otp.is_empty() {
        errors.add("otp", "Verification code is required");
    } else {
        errors.check(
            otp.chars().all(|c| c.is_ascii_digit()),
            "otp",
            "Verification code must contain only digits",
        );
    }
}

impl Validate for OtpVerification {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        check_otp(&mut errors, &self.otp);
        errors.finish()
    }
}

impl Validate for PasswordReset {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        check_otp(&mut errors, &self.otp);
        check_password(&mut errors, "new_password", &self.new_password);
        errors.finish()
    }
}

// ── Community ───────────────────────────────────────────────────────

impl Validate for PostInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        errors.check(
            has_text || self.image.is_some(),
            "text",
            "A post needs text or an image",
        );
        errors.finish()
    }
}

impl Validate for CommentInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("text", &self.text, "Comment cannot be empty");
        errors.finish()
    }
}
