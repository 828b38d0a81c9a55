//! TOPS report payloads returned by the student-progress API.
//!
//! Fields are read by explicit dotted paths (`book.title`,
//! `quizResults.correct`, ...). An absent key, or `null`, takes the path's
//! default; only a value of the wrong shape is a field error.

use num_format::{Locale, ToFormattedString};
use serde_json::Value;

use super::{Field, FieldError, NOT_AVAILABLE, ResultSource, SourceError, YearSummary};

/// A borrowed TOPS report payload.
pub struct TopsReportJson<'a> {
    payload: &'a Value,
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Group the integer digits of a decimal number with commas.
///
/// `"1234567"` -> `"1,234,567"`, `"-9876.5"` -> `"-9,876.5"`. Text that is not
/// a plain decimal is returned unchanged.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };
    let Ok(int_value) = int_part.parse::<u64>() else {
        return number.to_owned();
    };

    let mut out = format!("{sign}{}", int_value.to_formatted_string(&Locale::en));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Percentage of `correct` over `questions`, rounded half to even; zero when
/// there are no questions.
pub fn percent_correct(correct: f64, questions: f64) -> i64 {
    if questions > 0.0 {
        (correct / questions * 100.0).round_ties_even() as i64
    } else {
        0
    }
}

impl<'a> TopsReportJson<'a> {
    pub fn new(payload: &'a Value) -> Self {
        Self { payload }
    }

    /// Walk a dotted path. Absent keys and `null` resolve to `None`; stepping
    /// through a non-object is a type mismatch.
    fn lookup(&self, path: &str) -> Result<Option<&'a Value>, FieldError> {
        let mut current = self.payload;
        let mut walked = 0;
        for segment in path.split('.') {
            let map = current.as_object().ok_or_else(|| FieldError::TypeMismatch {
                path: path[..walked.max(1) - 1].to_owned(),
                found: kind_of(current),
            })?;
            match map.get(segment) {
                Some(Value::Null) | None => return Ok(None),
                Some(next) => current = next,
            }
            walked += segment.len() + 1;
        }
        Ok(Some(current))
    }

    /// Scalar at `path` rendered as text, or `default` when absent.
    fn text(&self, path: &str, default: &str) -> Result<String, FieldError> {
        match self.lookup(path)? {
            None => Ok(default.to_owned()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(FieldError::TypeMismatch {
                path: path.to_owned(),
                found: kind_of(other),
            }),
        }
    }

    /// Number at `path`, zero when absent. Strings are not coerced.
    fn number(&self, path: &str) -> Result<f64, FieldError> {
        match self.lookup(path)? {
            None => Ok(0.0),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| FieldError::NotNumeric {
                path: path.to_owned(),
                value: n.to_string(),
            }),
            Some(other) => Err(FieldError::NotNumeric {
                path: path.to_owned(),
                value: other.to_string(),
            }),
        }
    }

    fn percent_correct(&self) -> Result<String, FieldError> {
        let questions = self.number("quizResults.questions")?;
        let correct = self.number("quizResults.correct")?;
        Ok(format!("{}%", percent_correct(correct, questions)))
    }

    /// Date portion (first ten characters) of a timestamp-like string.
    fn date_prefix(&self, path: &str) -> Result<String, FieldError> {
        Ok(self.text(path, "")?.chars().take(10).collect())
    }

    fn period(&self) -> Result<String, FieldError> {
        Ok(format!(
            "{} - {}",
            self.date_prefix("schoolYearSummary.dateProgress.startDate")?,
            self.date_prefix("schoolYearSummary.dateProgress.endDate")?
        ))
    }

    fn words_read(&self) -> Result<String, FieldError> {
        let path = "schoolYearSummary.wordsRead";
        match self.lookup(path)? {
            None => Ok("0".to_owned()),
            Some(Value::Number(n)) => Ok(group_thousands(&n.to_string())),
            Some(other) => Err(FieldError::NotNumeric {
                path: path.to_owned(),
                value: other.to_string(),
            }),
        }
    }
}

impl ResultSource for TopsReportJson<'_> {
    fn ensure_ready(&self) -> Result<(), SourceError> {
        let map = self.payload.as_object().ok_or(SourceError::NotAnObject)?;
        if map.contains_key("book") {
            Ok(())
        } else {
            Err(SourceError::MissingBook)
        }
    }

    fn field(&self, field: Field) -> Result<String, FieldError> {
        match field {
            Field::Class => self.text("class", ""),
            Field::BookTitle => self.text("book.title", ""),
            Field::Author => self.text("book.author", ""),
            Field::AtosLevel => self.text("book.atosBookLevel", ""),
            Field::QuizNumber => self.text("book.quizNumber", ""),
            Field::QuizDate => self.text("book.dateTaken", ""),
            Field::InterestLevel => self.text("book.interestLevel", ""),
            Field::Twi => self.text("book.twiType", ""),
            Field::Type => self.text("book.fictionNonfiction", ""),
            Field::WordCount => self.text("book.wordCount", "0"),
            Field::QuizResult => Ok(format!(
                "{} of {} Correct",
                self.text("quizResults.correct", "0")?,
                self.text("quizResults.questions", "0")?
            )),
            Field::PercentCorrect => self.percent_correct(),
            Field::PointsEarned => Ok(format!(
                "{} of {}",
                self.text("quizResults.pointsEarned", "0")?,
                self.text("quizResults.pointsAvailable", "0")?
            )),
        }
    }

    /// Fails only when `schoolYearSummary` itself is not an object. A single
    /// unreadable entry is kept as `"N/A"` so the label set stays stable.
    fn year_summary(&self) -> Result<YearSummary, FieldError> {
        if let Some(section) = self.lookup("schoolYearSummary")?
            && !section.is_object()
        {
            return Err(FieldError::TypeMismatch {
                path: "schoolYearSummary".to_owned(),
                found: kind_of(section),
            });
        }

        let entries = [
            ("period", self.period()),
            (
                "Average % Correct",
                self.text("schoolYearSummary.averagePercentCorrect", "0")
                    .map(|v| format!("{v}%")),
            ),
            (
                "Average ATOS Book Level",
                self.text("schoolYearSummary.averageAtosBookLevel", "0"),
            ),
            (
                "Points Earned",
                self.text("schoolYearSummary.pointsEarned", "0"),
            ),
            (
                "Quizzes Passed",
                self.text("schoolYearSummary.quizzesPassed", "0").and_then(|passed| {
                    let taken = self.text("schoolYearSummary.quizzesTaken", "0")?;
                    Ok(format!("{passed} of {taken}"))
                }),
            ),
            ("Words Read", self.words_read()),
        ];

        let mut summary = YearSummary::new();
        for (label, value) in entries {
            let value = value.unwrap_or_else(|e| {
                tracing::debug!(label, error = %e, "Summary entry unavailable");
                NOT_AVAILABLE.to_owned()
            });
            summary.insert(label, value);
        }
        Ok(summary)
    }
}
