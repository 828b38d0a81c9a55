//! Normalized quiz-result records and the adapters that produce them.
//!
//! A TOPS report reaches us either as a rendered HTML page ([`dom`]) or as the
//! JSON payload behind it ([`json`]). Both are read through the
//! [`ResultSource`] trait so that [`normalize`] is written once.

pub mod dom;
pub mod errors;
pub mod json;
mod normalize;
pub mod summary;

pub use errors::{FieldError, SourceError};
pub use normalize::{ResultSource, normalize};

use indexmap::IndexMap;
use serde::Serialize;

/// Placeholder for any scalar field that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

/// Scalar fields of a [`QuizReport`] that a source can resolve.
///
/// `title` is not listed: it is known before extraction starts and is passed
/// to [`normalize`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Class,
    BookTitle,
    Author,
    AtosLevel,
    QuizNumber,
    QuizDate,
    InterestLevel,
    Twi,
    Type,
    WordCount,
    QuizResult,
    PercentCorrect,
    PointsEarned,
}

impl Field {
    /// Every resolvable field, in output order.
    pub const ALL: [Field; 13] = [
        Field::Class,
        Field::BookTitle,
        Field::Author,
        Field::AtosLevel,
        Field::QuizNumber,
        Field::QuizDate,
        Field::InterestLevel,
        Field::Twi,
        Field::Type,
        Field::WordCount,
        Field::QuizResult,
        Field::PercentCorrect,
        Field::PointsEarned,
    ];

    /// The key this field is serialized under.
    pub fn key(self) -> &'static str {
        match self {
            Field::Class => "class",
            Field::BookTitle => "bookTitle",
            Field::Author => "author",
            Field::AtosLevel => "atosLevel",
            Field::QuizNumber => "quizNumber",
            Field::QuizDate => "quizDate",
            Field::InterestLevel => "interestLevel",
            Field::Twi => "twi",
            Field::Type => "type",
            Field::WordCount => "wordCount",
            Field::QuizResult => "quizResult",
            Field::PercentCorrect => "percentCorrect",
            Field::PointsEarned => "pointsEarned",
        }
    }
}

/// School-year totals shown beside a report, keyed by the label the source uses.
///
/// Keys keep the order in which the source exposed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct YearSummary(IndexMap<String, String>);

impl YearSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing the value of an existing label in place.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A fully extracted report. Every field is present; unreadable ones hold
/// [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReport {
    pub title: String,
    pub class: String,
    pub book_title: String,
    pub author: String,
    pub atos_level: String,
    pub quiz_number: String,
    pub quiz_date: String,
    pub interest_level: String,
    pub twi: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub word_count: String,
    pub quiz_result: String,
    pub percent_correct: String,
    pub points_earned: String,
    pub year_summary: YearSummary,
}

impl QuizReport {
    /// Value of a scalar field by its [`Field`] tag.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Class => &self.class,
            Field::BookTitle => &self.book_title,
            Field::Author => &self.author,
            Field::AtosLevel => &self.atos_level,
            Field::QuizNumber => &self.quiz_number,
            Field::QuizDate => &self.quiz_date,
            Field::InterestLevel => &self.interest_level,
            Field::Twi => &self.twi,
            Field::Type => &self.kind,
            Field::WordCount => &self.word_count,
            Field::QuizResult => &self.quiz_result,
            Field::PercentCorrect => &self.percent_correct,
            Field::PointsEarned => &self.points_earned,
        }
    }
}

/// Placeholder for an item that could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub title: String,
    pub error: String,
}

/// One entry of the output batch.
///
/// Serializes flat: a report as its fifteen keys, a failure as
/// `{"title", "error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QuizRecord {
    Report(QuizReport),
    Failed(FailedItem),
}

impl QuizRecord {
    pub fn failed(title: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failed(FailedItem {
            title: title.into(),
            error: error.into(),
        })
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Report(report) => &report.title,
            Self::Failed(failed) => &failed.title,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn as_report(&self) -> Option<&QuizReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Report(_) => None,
            Self::Failed(failed) => Some(&failed.error),
        }
    }
}
