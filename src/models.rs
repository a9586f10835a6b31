//! Rows that flow between the staging stores and the consolidated store.

use std::borrow::Cow;

/// The slice of a staging question the consolidator needs.
#[derive(Debug, Clone)]
pub struct StagingQuestion {
    pub id: i64,
    pub accepted_answer_id: i64,
    pub owner_user_id: i64,
    pub owner_display_name: Option<String>,
    pub last_activity_date: Option<String>,
    pub title: Option<String>,
    pub tags: Option<String>,
}

/// The slice of a staging answer the consolidator needs.
#[derive(Debug, Clone)]
pub struct StagingAnswer {
    pub body: Option<String>,
    pub owner_user_id: i64,
    pub owner_display_name: Option<String>,
}

/// One question joined with its accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedQuestion {
    pub id: i64,
    pub source: String,
    pub source_id: i64,
    pub date: Option<String>,
    pub tags: String,
    pub question: Option<String>,
    pub question_user: String,
    pub answer: String,
    pub answer_user: String,
    pub reference: String,
}

impl ConsolidatedQuestion {
    /// Raw value of a consolidated column, by column name.
    pub fn field(&self, column: &str) -> Option<Cow<'_, str>> {
        match column {
            "Id" => Some(Cow::Owned(self.id.to_string())),
            "Source" => Some(Cow::Borrowed(&self.source)),
            "SourceId" => Some(Cow::Owned(self.source_id.to_string())),
            "Date" => self.date.as_deref().map(Cow::Borrowed),
            "Tags" => Some(Cow::Borrowed(&self.tags)),
            "Question" => self.question.as_deref().map(Cow::Borrowed),
            "QuestionUser" => Some(Cow::Borrowed(&self.question_user)),
            "Answer" => Some(Cow::Borrowed(&self.answer)),
            "AnswerUser" => Some(Cow::Borrowed(&self.answer_user)),
            "Reference" => Some(Cow::Borrowed(&self.reference)),
            _ => None,
        }
    }
}
