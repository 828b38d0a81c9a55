//! Request and response shapes of the assignment-platform endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Assignment states excluded from the student's inbox listing.
const EXCLUDED_STATES: [&str; 4] = ["Rejected", "Pending", "Archived", "Ignore"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub field: &'static str,
    pub values: Vec<Value>,
    pub operator: &'static str,
}

impl Filter {
    fn eq(field: &'static str, value: Value) -> Self {
        Self {
            field,
            values: vec![value],
            operator: "EQ",
        }
    }

    fn not_in_states() -> Self {
        Self {
            field: "State",
            values: EXCLUDED_STATES.iter().map(|s| Value::from(*s)).collect(),
            operator: "NE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub current_page: u32,
    pub page_size: u32,
}

/// Body of `StudentInbox` and `StudentInboxItems` requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboxQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
    pub filters: Vec<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<&'static str>,
}

impl InboxQuery {
    /// Inbox header query for one assignee.
    pub fn inbox(assignee_id: &str) -> Self {
        Self {
            paging: None,
            filters: vec![
                Filter::eq("assigneeId", Value::from(assignee_id)),
                Filter::not_in_states(),
            ],
            sort: Vec::new(),
        }
    }

    /// First page of inbox items for one assignee within a school year.
    pub fn items(assignee_id: &str, school_year_id: &SchoolYearId, page_size: u32) -> Self {
        let mut query = Self::inbox(assignee_id);
        query.paging = Some(Paging {
            current_page: 1,
            page_size,
        });
        query
            .filters
            .push(Filter::eq("schoolYearId", school_year_id.0.clone()));
        query.sort = vec!["+state", "-lastupdated"];
        query
    }
}

/// Opaque school-year identifier, echoed back verbatim in item queries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SchoolYearId(pub Value);

#[derive(Debug, Clone, Deserialize)]
pub struct SchoolYear {
    pub id: SchoolYearId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInbox {
    #[serde(default)]
    pub current_school_year: Option<SchoolYear>,
}

/// Accept ids sent either as strings or as bare numbers.
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboxChild {
    pub name: String,
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboxAssignment {
    #[serde(default)]
    pub children: Vec<InboxChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboxItems {
    #[serde(default)]
    pub data: Vec<InboxAssignment>,
}

/// One quiz to fetch a TOPS report for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    pub name: String,
    pub activity_id: String,
}

impl InboxItems {
    /// Every assignment's children, flattened in listing order.
    pub fn into_quiz_items(self) -> Vec<QuizItem> {
        self.data
            .into_iter()
            .flat_map(|assignment| assignment.children)
            .map(|child| QuizItem {
                name: child.name,
                activity_id: child.id,
            })
            .collect()
    }
}
