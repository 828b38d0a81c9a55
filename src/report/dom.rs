//! TOPS report pages rendered by the student portal.
//!
//! The page lays out book details and quiz results as `<li>` lines holding a
//! free-text label and an emphasized value, e.g.
//! `<li>Author: <span class="bold-text">Louis Sachar</span></li>`.
//! Lines are matched against an ordered label list; the first label found in
//! a line's text claims it.

use std::sync::LazyLock;

use html_scraper::{ElementRef, Html, Selector};

use super::{Field, FieldError, ResultSource, SourceError, YearSummary};

const REPORT_HEADER: &str = ".book-article-span-header";
const QUIZ_RESULT_HEADER: &str = ".quiz-results-span-header";
const CLASS_COLUMN: &str = ".flex-top-column";
const CLASS_VALUE: &str = ".span-value";
const YEAR_PERIOD: &str = ".school-year-progress";

static REPORT_HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(REPORT_HEADER).unwrap());
static QUIZ_RESULT_HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(QUIZ_RESULT_HEADER).unwrap());
static CLASS_COLUMN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CLASS_COLUMN).unwrap());
static CLASS_VALUE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CLASS_VALUE).unwrap());
static BOOK_LINE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".book-article-list li").unwrap());
static RESULT_LINE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".quiz-result-list li").unwrap());
static BOLD_TEXT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".bold-text").unwrap());
static STRONG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());
static YEAR_PERIOD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(YEAR_PERIOD).unwrap());
static SUMMARY_LINE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".style-year-summary-content li").unwrap());
static SUMMARY_LABEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".style-content-label").unwrap());
static SUMMARY_VALUE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".bold").unwrap());

/// Which descendant of a detail line holds its value.
#[derive(Debug, Clone, Copy)]
enum ValueNode {
    BoldText,
    Strong,
}

impl ValueNode {
    fn selector(self) -> &'static Selector {
        match self {
            ValueNode::BoldText => &BOLD_TEXT_SEL,
            ValueNode::Strong => &STRONG_SEL,
        }
    }
}

/// A label substring and the field it assigns a line to.
type Label = (&'static str, Field, ValueNode);

/// Book-detail labels in priority order. Order matters: a line is claimed by
/// the first label its text contains.
const BOOK_DETAIL_LABELS: &[Label] = &[
    ("Author", Field::Author, ValueNode::BoldText),
    ("ATOS Book Level", Field::AtosLevel, ValueNode::BoldText),
    ("Quiz #", Field::QuizNumber, ValueNode::BoldText),
    ("Quiz Date", Field::QuizDate, ValueNode::BoldText),
    ("Interest Level", Field::InterestLevel, ValueNode::BoldText),
    ("TWI", Field::Twi, ValueNode::BoldText),
    ("Type", Field::Type, ValueNode::BoldText),
    ("Word Count", Field::WordCount, ValueNode::BoldText),
];

const QUIZ_RESULT_LABELS: &[Label] = &[
    ("% Correct", Field::PercentCorrect, ValueNode::BoldText),
    ("Points Earned", Field::PointsEarned, ValueNode::Strong),
];

/// Text content of an element with whitespace runs collapsed and trimmed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First label whose substring occurs in `text`.
fn classify(text: &str, labels: &'static [Label]) -> Option<&'static Label> {
    labels.iter().find(|(needle, _, _)| text.contains(needle))
}

/// A parsed TOPS report page.
pub struct TopsReportPage {
    document: Html,
}

impl TopsReportPage {
    pub fn parse(html: &str) -> Self {
        Self::from_document(Html::parse_document(html))
    }

    pub fn from_document(document: Html) -> Self {
        Self { document }
    }

    fn first_text(&self, selector: &Selector, name: &'static str) -> Result<String, FieldError> {
        self.document
            .select(selector)
            .next()
            .map(element_text)
            .ok_or(FieldError::MissingNode(name))
    }

    /// Scan `lines` for values of `field`. Each line goes to the first label
    /// it matches; lines without a value node are skipped. The last value
    /// found wins.
    fn detail_line(
        &self,
        lines: &Selector,
        labels: &'static [Label],
        field: Field,
    ) -> Result<String, FieldError> {
        let needle = labels
            .iter()
            .find(|(_, f, _)| *f == field)
            .map(|(needle, _, _)| *needle)
            .unwrap_or_else(|| field.key());

        let mut found = None;
        for line in self.document.select(lines) {
            let text = element_text(line);
            let Some((_, claimed, node)) = classify(&text, labels) else {
                continue;
            };
            if *claimed != field {
                continue;
            }
            if let Some(value) = line.select(node.selector()).next() {
                found = Some(element_text(value));
            }
        }

        found.ok_or(FieldError::MissingLine(needle))
    }

    fn class(&self) -> Result<String, FieldError> {
        let column = self
            .document
            .select(&CLASS_COLUMN_SEL)
            .find(|col| element_text(*col).contains("Class"))
            .ok_or(FieldError::MissingNode(CLASS_COLUMN))?;

        column
            .select(&CLASS_VALUE_SEL)
            .next()
            .map(element_text)
            .ok_or(FieldError::MissingNode(CLASS_VALUE))
    }
}

impl ResultSource for TopsReportPage {
    fn ensure_ready(&self) -> Result<(), SourceError> {
        match self.document.select(&REPORT_HEADER_SEL).next() {
            Some(_) => Ok(()),
            None => Err(SourceError::PageNotLoaded(REPORT_HEADER)),
        }
    }

    fn field(&self, field: Field) -> Result<String, FieldError> {
        match field {
            Field::Class => self.class(),
            Field::BookTitle => self.first_text(&REPORT_HEADER_SEL, REPORT_HEADER),
            Field::QuizResult => self.first_text(&QUIZ_RESULT_HEADER_SEL, QUIZ_RESULT_HEADER),
            Field::PercentCorrect | Field::PointsEarned => {
                self.detail_line(&RESULT_LINE_SEL, QUIZ_RESULT_LABELS, field)
            }
            Field::Author
            | Field::AtosLevel
            | Field::QuizNumber
            | Field::QuizDate
            | Field::InterestLevel
            | Field::Twi
            | Field::Type
            | Field::WordCount => self.detail_line(&BOOK_LINE_SEL, BOOK_DETAIL_LABELS, field),
        }
    }

    /// The period line is optional; summary lines missing a label or a value
    /// are skipped. Never fails.
    fn year_summary(&self) -> Result<YearSummary, FieldError> {
        let mut summary = YearSummary::new();

        if let Ok(period) = self.first_text(&YEAR_PERIOD_SEL, YEAR_PERIOD) {
            summary.insert("period", period);
        }

        for line in self.document.select(&SUMMARY_LINE_SEL) {
            let label = line.select(&SUMMARY_LABEL_SEL).next().map(element_text);
            let value = line.select(&SUMMARY_VALUE_SEL).next().map(element_text);
            if let (Some(label), Some(value)) = (label, value) {
                summary.insert(label, value);
            }
        }

        Ok(summary)
    }
}
