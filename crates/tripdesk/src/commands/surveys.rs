//! Survey, question and response command handlers.

use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{EntityId, Question, Response, Survey, SurveyResponse};
use tripdesk_core::requests::{QuestionInput, SurveyInput};

use crate::cli::{
    GlobalOpts, QuestionsArgs, QuestionsCommand, ResponsesArgs, ResponsesCommand, SurveysArgs,
    SurveysCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SurveyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Questions")]
    questions: usize,
    #[tabled(rename = "Respondents")]
    respondents: u64,
}

impl From<&Survey> for SurveyRow {
    fn from(s: &Survey) -> Self {
        Self {
            id: s.id.to_string(),
            title: s.title.clone(),
            status: s.status.to_string(),
            questions: s.questions.len(),
            respondents: s.number_of_respondents,
        }
    }
}

fn survey_detail(s: &Survey) -> Vec<(&'static str, String)> {
    vec![
        ("ID", s.id.to_string()),
        ("Title", s.title.clone()),
        ("Description", s.description.clone()),
        ("Status", s.status.to_string()),
        ("Accepting", output::yes_no(s.accepts_responses()).into()),
        (
            "Questions",
            s.questions
                .iter()
                .map(|q| q.id().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        ("Respondents", s.number_of_respondents.to_string()),
    ]
}

#[derive(Tabled)]
struct SubmissionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Answers")]
    answers: usize,
    #[tabled(rename = "Submitted")]
    submitted: String,
}

impl From<&SurveyResponse> for SubmissionRow {
    fn from(r: &SurveyResponse) -> Self {
        Self {
            id: r.id.to_string(),
            user: if r.user_name.is_empty() {
                r.user_id.to_string()
            } else {
                r.user_name.clone()
            },
            answers: r.answers.len(),
            submitted: output::opt(r.submitted_at.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct QuestionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "#")]
    order: i64,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Type")]
    question_type: String,
    #[tabled(rename = "Survey")]
    survey: String,
}

impl From<&Question> for QuestionRow {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.to_string(),
            order: q.order,
            text: q.text.clone(),
            question_type: q.question_type.to_string(),
            survey: q.survey_id.to_string(),
        }
    }
}

fn question_detail(q: &Question) -> Vec<(&'static str, String)> {
    vec![
        ("ID", q.id.to_string()),
        ("Survey", q.survey_id.to_string()),
        ("Text", q.text.clone()),
        ("Type", q.question_type.to_string()),
        ("Options", q.options.join(", ")),
        ("Order", q.order.to_string()),
        ("Required", output::yes_no(q.required.unwrap_or(false)).into()),
    ]
}

#[derive(Tabled)]
struct ResponseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Question")]
    question: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&Response> for ResponseRow {
    fn from(r: &Response) -> Self {
        Self {
            id: r.id.to_string(),
            question: r.question_id.to_string(),
            user: r.user_id.to_string(),
            value: r.value.clone(),
        }
    }
}

fn response_detail(r: &Response) -> Vec<(&'static str, String)> {
    vec![
        ("ID", r.id.to_string()),
        ("Question", r.question_id.to_string()),
        ("User", r.user_id.to_string()),
        ("Value", r.value.clone()),
        ("Answered", output::opt(r.answered_at.as_ref())),
    ]
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_surveys(
    backend: &Backend,
    args: SurveysArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let surveys = backend.surveys();
    match args.command {
        SurveysCommand::List => {
            let list = surveys.list().await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |s| SurveyRow::from(s),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        SurveysCommand::Get { id } => {
            let id = EntityId::from(id);
            let survey = util::found(&surveys.get(&id).await?, "survey", &id, "surveys list")?;
            let out = output::render_single(&global.output, &survey, survey_detail, |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        SurveysCommand::Create {
            title,
            description,
            questions,
        } => {
            let input = SurveyInput {
                title,
                description,
                questions: questions.into_iter().map(EntityId::from).collect(),
                ..SurveyInput::default()
            };
            let created = surveys.create(&input).await?;
            output::saved("Survey", created.as_ref().map(|s| &s.id), "created", global.quiet);
        }

        SurveysCommand::Delete { id } => {
            if !util::confirm(&format!("Delete survey {id}?"), global.yes)? {
                return Ok(());
            }
            surveys.delete(&EntityId::from(id)).await?;
            output::done("Survey deleted", global.quiet);
        }

        SurveysCommand::Publish { id } => {
            let id = EntityId::from(id);
            surveys.publish(&id).await?;
            output::saved("Survey", Some(&id), "published", global.quiet);
        }

        SurveysCommand::Complete { id } => {
            let id = EntityId::from(id);
            surveys.complete(&id).await?;
            output::saved("Survey", Some(&id), "completed", global.quiet);
        }

        SurveysCommand::Responses { id } => {
            let list = surveys.responses(&EntityId::from(id)).await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |r| SubmissionRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

pub async fn handle_questions(
    backend: &Backend,
    args: QuestionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let questions = backend.questions();
    match args.command {
        QuestionsCommand::List { survey } => {
            let list = match survey {
                Some(survey) => questions.list_for_survey(&EntityId::from(survey)).await?,
                None => questions.list().await?,
            };
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |q| QuestionRow::from(q),
                |q| q.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        QuestionsCommand::Get { id } => {
            let id = EntityId::from(id);
            let question =
                util::found(&questions.get(&id).await?, "question", &id, "questions list")?;
            let out = output::render_single(&global.output, &question, question_detail, |q| {
                q.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        QuestionsCommand::Create {
            survey,
            text,
            question_type,
            options,
            order,
            required,
        } => {
            let input = QuestionInput {
                survey_id: EntityId::from(survey),
                text,
                question_type,
                options,
                order,
                required: Some(required),
                ..QuestionInput::default()
            };
            let created = questions.create(&input).await?;
            output::saved("Question", created.as_ref().map(|q| &q.id), "created", global.quiet);
        }

        QuestionsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete question {id}?"), global.yes)? {
                return Ok(());
            }
            questions.delete(&EntityId::from(id)).await?;
            output::done("Question deleted", global.quiet);
        }
    }
    Ok(())
}

pub async fn handle_responses(
    backend: &Backend,
    args: ResponsesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let responses = backend.responses();
    match args.command {
        ResponsesCommand::List {
            survey,
            question,
            user,
        } => {
            let list = match (survey, question, user) {
                (Some(survey), _, _) => responses.list_for_survey(&EntityId::from(survey)).await?,
                (None, Some(question), _) => {
                    responses.list_for_question(&EntityId::from(question)).await?
                }
                (None, None, Some(user)) => responses.list_for_user(&EntityId::from(user)).await?,
                (None, None, None) => responses.list().await?,
            };
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |r| ResponseRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        ResponsesCommand::Get { id } => {
            let id = EntityId::from(id);
            let response =
                util::found(&responses.get(&id).await?, "response", &id, "responses list")?;
            let out = output::render_single(&global.output, &response, response_detail, |r| {
                r.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        ResponsesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete response {id}?"), global.yes)? {
                return Ok(());
            }
            responses.delete(&EntityId::from(id)).await?;
            output::done("Response deleted", global.quiet);
        }
    }
    Ok(())
}
