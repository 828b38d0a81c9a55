use tracing::{debug, warn};

use super::{Field, FieldError, NOT_AVAILABLE, QuizRecord, QuizReport, SourceError, YearSummary};

/// Read access to one raw quiz result, whatever its shape.
///
/// Implementations must be pure: repeated calls on the same source return the
/// same values.
pub trait ResultSource {
    /// Gate checked before any field is read. An error here means the item is
    /// unusable as a whole.
    fn ensure_ready(&self) -> Result<(), SourceError>;

    /// Resolve one scalar field to its display text.
    fn field(&self, field: Field) -> Result<String, FieldError>;

    /// Resolve the school-year summary block.
    fn year_summary(&self) -> Result<YearSummary, FieldError>;
}

/// Convert one raw result into exactly one [`QuizRecord`].
///
/// Never fails. A source that is not ready yields a [`QuizRecord::Failed`]
/// carrying `item_title`; otherwise every field is resolved independently and
/// unreadable ones fall back to [`NOT_AVAILABLE`] (or an empty summary).
pub fn normalize<S: ResultSource + ?Sized>(source: &S, item_title: &str) -> QuizRecord {
    if let Err(e) = source.ensure_ready() {
        warn!(title = item_title, error = %e, "Report unreadable, recording failed item");
        return QuizRecord::failed(item_title, e.to_string());
    }

    let resolve = |field: Field| match source.field(field) {
        Ok(value) => value,
        Err(e) => {
            debug!(title = item_title, field = field.key(), error = %e, "Field unavailable");
            NOT_AVAILABLE.to_owned()
        }
    };

    let year_summary = source.year_summary().unwrap_or_else(|e| {
        debug!(title = item_title, error = %e, "Year summary unavailable");
        YearSummary::new()
    });

    QuizRecord::Report(QuizReport {
        title: item_title.to_owned(),
        class: resolve(Field::Class),
        book_title: resolve(Field::BookTitle),
        author: resolve(Field::Author),
        atos_level: resolve(Field::AtosLevel),
        quiz_number: resolve(Field::QuizNumber),
        quiz_date: resolve(Field::QuizDate),
        interest_level: resolve(Field::InterestLevel),
        twi: resolve(Field::Twi),
        kind: resolve(Field::Type),
        word_count: resolve(Field::WordCount),
        quiz_result: resolve(Field::QuizResult),
        percent_correct: resolve(Field::PercentCorrect),
        points_earned: resolve(Field::PointsEarned),
        year_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Source that fails exactly the fields it is told to.
    struct StubSource {
        ready: bool,
        failing: Vec<Field>,
        summary_fails: bool,
        reads: Cell<usize>,
    }

    impl StubSource {
        fn healthy() -> Self {
            Self {
                ready: true,
                failing: Vec::new(),
                summary_fails: false,
                reads: Cell::new(0),
            }
        }
    }

    impl ResultSource for StubSource {
        fn ensure_ready(&self) -> Result<(), SourceError> {
            if self.ready {
                Ok(())
            } else {
                Err(SourceError::PageNotLoaded(".book-article-span-header"))
            }
        }

        fn field(&self, field: Field) -> Result<String, FieldError> {
            self.reads.set(self.reads.get() + 1);
            if self.failing.contains(&field) {
                Err(FieldError::MissingNode("stub"))
            } else {
                Ok(format!("{}-value", field.key()))
            }
        }

        fn year_summary(&self) -> Result<YearSummary, FieldError> {
            if self.summary_fails {
                return Err(FieldError::MissingNode("stub"));
            }
            let mut summary = YearSummary::new();
            summary.insert("Words Read", "12");
            Ok(summary)
        }
    }

    #[test]
    fn test_every_field_resolved_when_source_healthy() {
        let record = normalize(&StubSource::healthy(), "Quiz");
        let report = record.as_report().unwrap();
        assert_eq!(report.title, "Quiz");
        for field in Field::ALL {
            assert_eq!(report.get(field), format!("{}-value", field.key()));
        }
        assert_eq!(report.year_summary.get("Words Read"), Some("12"));
    }

    #[test]
    fn test_failing_field_does_not_affect_siblings() {
        let source = StubSource {
            failing: vec![Field::Author],
            ..StubSource::healthy()
        };
        let report = normalize(&source, "Quiz").as_report().cloned().unwrap();
        assert_eq!(report.author, NOT_AVAILABLE);
        assert_eq!(report.atos_level, "atosLevel-value");
        assert_eq!(report.book_title, "bookTitle-value");
    }

    #[test]
    fn test_failing_summary_degrades_to_empty() {
        let source = StubSource {
            summary_fails: true,
            ..StubSource::healthy()
        };
        let report = normalize(&source, "Quiz").as_report().cloned().unwrap();
        assert!(report.year_summary.is_empty());
        assert_eq!(report.class, "class-value");
    }

    #[test]
    fn test_unready_source_yields_failed_record_without_reading_fields() {
        let source = StubSource {
            ready: false,
            ..StubSource::healthy()
        };
        let record = normalize(&source, "X");
        assert_eq!(
            record,
            QuizRecord::failed(
                "X",
                "report page did not load: `.book-article-span-header` not found"
            )
        );
        assert_eq!(source.reads.get(), 0);
    }

    #[test]
    fn test_normalize_through_trait_object() {
        let source: Box<dyn ResultSource> = Box::new(StubSource::healthy());
        assert!(!normalize(source.as_ref(), "Quiz").is_failed());
    }
}
