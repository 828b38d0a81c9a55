//! End-to-end behavior of record normalization across both source shapes.

use quizreport::batch::{normalize_document, render_batch};
use quizreport::report::dom::TopsReportPage;
use quizreport::report::json::TopsReportJson;
use quizreport::report::{
    Field, FieldError, NOT_AVAILABLE, QuizRecord, ResultSource, SourceError, YearSummary,
    normalize,
};
use serde_json::{Value, json};

fn complete_payload() -> Value {
    json!({
        "class": "Reading 3A",
        "book": {
            "title": "Holes",
            "author": "Louis Sachar",
            "atosBookLevel": 4.6,
            "quizNumber": 6029,
            "dateTaken": "2025-03-14",
            "interestLevel": "MG",
            "twiType": "RI",
            "fictionNonfiction": "Fiction",
            "wordCount": 47079
        },
        "quizResults": {
            "questions": 10,
            "correct": 9,
            "pointsEarned": 3,
            "pointsAvailable": 3
        },
        "schoolYearSummary": {
            "dateProgress": {
                "startDate": "2024-08-01T00:00:00",
                "endDate": "2025-06-30T00:00:00"
            },
            "averagePercentCorrect": 88.5,
            "averageAtosBookLevel": 4.2,
            "pointsEarned": 41.7,
            "quizzesPassed": 14,
            "quizzesTaken": 15,
            "wordsRead": 1234567
        }
    })
}

#[test]
fn test_complete_payload_has_no_missing_fields() {
    let payload = complete_payload();
    let record = normalize(&TopsReportJson::new(&payload), "Holes Quiz");
    let report = record.as_report().expect("report");

    for field in Field::ALL {
        assert_ne!(report.get(field), NOT_AVAILABLE, "{}", field.key());
    }
    assert_eq!(report.year_summary.len(), 6);
    assert!(report.year_summary.labels().all(|label| {
        report.year_summary.get(label) != Some(NOT_AVAILABLE)
    }));
    assert_eq!(report.year_summary.get("Words Read"), Some("1,234,567"));
    assert_eq!(report.year_summary.get("Quizzes Passed"), Some("14 of 15"));
}

#[test]
fn test_holes_payload_scenario() {
    let payload = json!({
        "book": { "title": "Holes", "author": "Louis Sachar", "wordCount": 47000 },
        "quizResults": { "questions": 10, "correct": 9, "pointsEarned": 3, "pointsAvailable": 3 },
        "schoolYearSummary": {}
    });
    let record = normalize(&TopsReportJson::new(&payload), "Holes Quiz");
    let rendered: Value = serde_json::to_value(&record).unwrap();

    assert_eq!(rendered["title"], "Holes Quiz");
    assert_eq!(rendered["bookTitle"], "Holes");
    assert_eq!(rendered["author"], "Louis Sachar");
    assert_eq!(rendered["wordCount"], "47000");
    assert_eq!(rendered["percentCorrect"], "90%");
    assert_eq!(rendered["quizResult"], "9 of 10 Correct");
    assert_eq!(rendered["pointsEarned"], "3 of 3");
    assert_eq!(rendered["class"], "");
    assert_eq!(rendered["yearSummary"]["period"], " - ");
    assert!(rendered.get("error").is_none());
}

#[test]
fn test_single_bad_field_does_not_disturb_others() {
    let mut payload = complete_payload();
    payload["book"]["author"] = json!(["not", "a", "name"]);

    let record = normalize(&TopsReportJson::new(&payload), "Holes Quiz");
    let report = record.as_report().unwrap();
    assert_eq!(report.author, NOT_AVAILABLE);

    let baseline = complete_payload();
    let expected = normalize(&TopsReportJson::new(&baseline), "Holes Quiz");
    let expected = expected.as_report().unwrap();
    for field in Field::ALL {
        if field != Field::Author {
            assert_eq!(report.get(field), expected.get(field), "{}", field.key());
        }
    }
    assert_eq!(report.year_summary, expected.year_summary);
}

#[test]
fn test_normalize_is_idempotent() {
    let payload = complete_payload();
    let source = TopsReportJson::new(&payload);
    assert_eq!(normalize(&source, "Holes"), normalize(&source, "Holes"));
}

#[test]
fn test_batch_preserves_source_order() {
    let sources = [
        (r#"{"book": {"title": "A"}}"#, "first"),
        ("<html><body>still loading</body></html>", "second"),
        (r#"{"book": {"title": "C"}}"#, "third"),
    ];
    let records: Vec<QuizRecord> = sources
        .iter()
        .map(|(content, title)| normalize_document(content, title))
        .collect();

    let titles: Vec<&str> = records.iter().map(QuizRecord::title).collect();
    assert_eq!(titles, ["first", "second", "third"]);
    assert!(records[1].is_failed());
    assert_eq!(records[2].as_report().unwrap().book_title, "C");

    let rendered: Value = serde_json::from_str(&render_batch(&records).unwrap()).unwrap();
    assert_eq!(rendered[0]["title"], "first");
    assert_eq!(rendered[1]["title"], "second");
    assert_eq!(rendered[2]["bookTitle"], "C");
}

#[test]
fn test_percent_is_rounded_and_safe_without_questions() {
    let payload = json!({ "book": {}, "quizResults": { "questions": 20, "correct": 15 } });
    let record = normalize(&TopsReportJson::new(&payload), "q");
    assert_eq!(record.as_report().unwrap().percent_correct, "75%");

    let payload = json!({ "book": {}, "quizResults": { "questions": 0, "correct": 5 } });
    let record = normalize(&TopsReportJson::new(&payload), "q");
    assert_eq!(record.as_report().unwrap().percent_correct, "0%");
}

#[test]
fn test_author_label_claims_line_before_later_labels() {
    let html = r#"<html><body>
        <span class="book-article-span-header">Holes</span>
        <ul class="book-article-list">
            <li>Author, Word Count pending: <span class="bold-text">Louis Sachar</span></li>
        </ul>
    </body></html>"#;
    let record = normalize(&TopsReportPage::parse(html), "Holes Quiz");
    let report = record.as_report().unwrap();
    assert_eq!(report.author, "Louis Sachar");
    assert_eq!(report.word_count, NOT_AVAILABLE);
}

/// A source whose every access fails.
struct BrokenSource;

impl ResultSource for BrokenSource {
    fn ensure_ready(&self) -> Result<(), SourceError> {
        Err(SourceError::NotAnObject)
    }

    fn field(&self, _field: Field) -> Result<String, FieldError> {
        Err(FieldError::MissingNode("body"))
    }

    fn year_summary(&self) -> Result<YearSummary, FieldError> {
        Err(FieldError::MissingNode("body"))
    }
}

#[test]
fn test_broken_source_yields_failed_record() {
    let record = normalize(&BrokenSource, "X");
    let rendered = serde_json::to_value(&record).unwrap();
    assert_eq!(
        rendered,
        json!({ "title": "X", "error": SourceError::NotAnObject.to_string() })
    );
}
