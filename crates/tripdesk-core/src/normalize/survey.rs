// Surveys, questions and answers.

use serde_json::{Map, Value, json};

use super::NormalizeError;
use super::fields::{Fields, scalar_string};
use crate::model::{
    EntityId, Question, QuestionType, RespondentProfile, Response, Survey, SurveyAnswer,
    SurveyQuestion, SurveyResponse, SurveyStatus,
};
use crate::requests::{QuestionInput, ResponseInput, SurveyInput, SurveySubmission};

pub fn survey(value: &Value) -> Result<Survey, NormalizeError> {
    let f = Fields::of(value, "survey")?;
    let questions = f
        .array("questions")
        .iter()
        .filter_map(|q| match q {
            Value::Object(_) => question(q).ok().map(|q| SurveyQuestion::Inline(Box::new(q))),
            other => scalar_string(other)
                .filter(|s| !s.is_empty())
                .map(|id| SurveyQuestion::Ref(EntityId::from(id))),
        })
        .collect();

    Ok(Survey {
        id: f.id(),
        title: f.string_or("title", "Untitled Survey"),
        description: f.text("description"),
        questions,
        status: f
            .string("status")
            .and_then(|s| s.parse().ok())
            .unwrap_or(SurveyStatus::Draft),
        is_active: f.bool_or("isActive", false),
        number_of_respondents: f.count("numberOfRespondents"),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

pub fn survey_body(input: &SurveyInput) -> Value {
    let mut body = Map::new();
    body.insert("title".into(), json!(input.title.trim()));
    body.insert("description".into(), json!(input.description.trim()));
    if let Some(status) = input.status {
        body.insert("status".into(), json!(status.to_string()));
    }
    if let Some(active) = input.is_active {
        body.insert("isActive".into(), json!(active));
    }
    body.insert(
        "questions".into(),
        json!(input.questions.iter().map(EntityId::as_str).collect::<Vec<_>>()),
    );
    Value::Object(body)
}

pub fn question(value: &Value) -> Result<Question, NormalizeError> {
    let f = Fields::of(value, "question")?;
    Ok(Question {
        id: f.id(),
        survey_id: f.reference("surveyId").unwrap_or_default(),
        text: f.text("text"),
        options: f.strings("options"),
        question_type: f
            .string("type")
            .and_then(|t| t.parse().ok())
            .unwrap_or(QuestionType::ShortText),
        order: f.integer("order"),
        required: f.bool("required"),
        description: f.string("description"),
        min_value: f.number("minValue"),
        max_value: f.number("maxValue"),
        step: f.number("step"),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

pub fn question_body(input: &QuestionInput) -> Value {
    let mut body = Map::new();
    body.insert("surveyId".into(), json!(input.survey_id.as_str()));
    body.insert("text".into(), json!(input.text.trim()));
    body.insert("type".into(), json!(input.question_type.to_string()));
    body.insert("options".into(), json!(input.options));
    body.insert("order".into(), json!(input.order));
    let optional = [
        ("required", input.required.map(Value::from)),
        ("description", input.description.clone().map(Value::from)),
        ("minValue", input.min_value.map(Value::from)),
        ("maxValue", input.max_value.map(Value::from)),
        ("step", input.step.map(Value::from)),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            body.insert(key.into(), value);
        }
    }
    Value::Object(body)
}

/// Answer values are displayed as text; multi-select answers are joined.
fn answer_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_string)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => scalar_string(other).unwrap_or_default(),
        None => String::new(),
    }
}

pub fn response(value: &Value) -> Result<Response, NormalizeError> {
    let f = Fields::of(value, "response")?;
    Ok(Response {
        id: f.id(),
        question_id: f.reference("questionId").unwrap_or_default(),
        user_id: f.reference("userId").unwrap_or_default(),
        value: answer_text(f.get("value")),
        answered_at: f.datetime("answeredAt"),
    })
}

pub fn response_body(input: &ResponseInput) -> Value {
    json!({
        "questionId": input.question_id.as_str(),
        "userId": input.user_id.as_str(),
        "value": input.value,
    })
}

fn profile(f: &Fields<'_>) -> RespondentProfile {
    RespondentProfile {
        preferred_destination: f.string("preferredDestination"),
        travel_style: f.string("travelStyle"),
        budget: f.string("budget"),
        travel_dates: f.string("travelDates"),
        group_size: f.number("groupSize").map(super::fields::to_count),
        interests: f.strings("interests"),
        additional_notes: f.string("additionalNotes"),
    }
}

pub fn survey_response(value: &Value) -> Result<SurveyResponse, NormalizeError> {
    let f = Fields::of(value, "survey response")?;
    let answers = f
        .array("answers")
        .iter()
        .filter_map(|a| Fields::of(a, "answer").ok())
        .map(|a| SurveyAnswer {
            question_id: a.reference("questionId").unwrap_or_default(),
            value: answer_text(a.get("value").or_else(|| a.get("answer"))),
        })
        .collect();

    Ok(SurveyResponse {
        id: f.id(),
        survey_id: f.reference("surveyId").unwrap_or_default(),
        user_id: f.reference("userId").unwrap_or_default(),
        user_name: f.string_or("userName", "Anonymous"),
        answers,
        profile: f.object("metadata").map(|m| profile(&m)),
        submitted_at: f.datetime("submittedAt").or_else(|| f.datetime("createdAt")),
    })
}

pub fn submission_body(input: &SurveySubmission) -> Value {
    let answers: Vec<Value> = input
        .answers
        .iter()
        .map(|a| {
            json!({
                "questionId": a.question_id.as_str(),
                "userId": input.user_id.as_str(),
                "value": a.value,
            })
        })
        .collect();
    let mut body = json!({
        "userId": input.user_id.as_str(),
        "userName": input.user_name,
        "answers": answers,
    });
    if let (Some(profile), Some(map)) = (&input.profile, body.as_object_mut()) {
        map.insert(
            "metadata".into(),
            json!({
                "preferredDestination": profile.preferred_destination,
                "travelStyle": profile.travel_style,
                "budget": profile.budget,
                "travelDates": profile.travel_dates,
                "groupSize": profile.group_size,
                "interests": profile.interests,
                "additionalNotes": profile.additional_notes,
            }),
        );
    }
    body
}
