//! Report request types, as received on the wire (camelCase JSON).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sql::{JoinType, SortDir};

/// A complete ad-hoc report description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub base_table: String,
    pub attributes: Vec<String>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
    #[serde(default)]
    pub group_by_attributes: Vec<String>,
    #[serde(default)]
    pub aggregate_functions: Vec<AggregateSpec>,
    #[serde(default)]
    pub order_by_columns: Vec<OrderBySpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Signed so that zero and negative values reach validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl ReportRequest {
    pub fn new(base_table: &str) -> Self {
        Self {
            base_table: base_table.into(),
            ..Default::default()
        }
    }

    pub fn attribute(mut self, attribute: &str) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn group_by(mut self, attribute: &str) -> Self {
        self.group_by_attributes.push(attribute.into());
        self
    }

    pub fn aggregate(mut self, function: &str, attribute: &str, alias: &str) -> Self {
        self.aggregate_functions.push(AggregateSpec {
            function: function.into(),
            attribute: attribute.into(),
            alias: alias.into(),
        });
        self
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, attribute: &str, direction: OrderDirection) -> Self {
        self.order_by_columns.push(OrderBySpec {
            attribute: Some(attribute.into()),
            column: None,
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Joins
// ============================================================================

/// One join from the tables already in the report to `target_table`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSpec {
    pub target_table: String,
    /// `column` on the base table, or `table.column`.
    pub source_attribute: String,
    /// `column` on the target table, or `table.column`.
    pub target_attribute: String,
    #[serde(default)]
    pub join_type: JoinKind,
}

impl JoinSpec {
    pub fn new(target_table: &str, source_attribute: &str, target_attribute: &str) -> Self {
        Self {
            target_table: target_table.into(),
            source_attribute: source_attribute.into(),
            target_attribute: target_attribute.into(),
            join_type: JoinKind::default(),
        }
    }

    pub fn with_kind(mut self, join_type: JoinKind) -> Self {
        self.join_type = join_type;
        self
    }
}

/// Join kind. Accepts `LEFT` and `LEFT JOIN` spellings in any case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }
}

impl FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let words: Vec<&str> = upper.split_whitespace().collect();
        let kind = match words.as_slice() {
            [kind] | [kind, "JOIN"] | [kind, "OUTER", "JOIN"] => *kind,
            _ => return Err(format!("unknown join type '{}'", s)),
        };

        match kind {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" => Ok(JoinKind::Left),
            "RIGHT" => Ok(JoinKind::Right),
            "FULL" => Ok(JoinKind::Full),
            _ => Err(format!("unknown join type '{}'", s)),
        }
    }
}

impl TryFrom<String> for JoinKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JoinKind> for String {
    fn from(kind: JoinKind) -> Self {
        kind.as_str().to_string()
    }
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
            JoinKind::Right => JoinType::Right,
            JoinKind::Full => JoinType::Full,
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aggregates, filters, ordering
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSpec {
    /// COUNT, SUM, AVG, MIN, MAX or COUNT_DISTINCT.
    pub function: String,
    pub attribute: String,
    /// Output key, used verbatim.
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub attribute: String,
    pub operator: String,
    /// Scalar, or for IN / NOT IN a list or comma-separated string.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Scalar function applied to the column before comparing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl FilterSpec {
    pub fn new(attribute: &str, operator: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.into(),
            value: value.into(),
            function: None,
        }
    }

    pub fn with_function(mut self, function: &str) -> Self {
        self.function = Some(function.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Older clients send `column`; `attribute` wins when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl OrderBySpec {
    /// The attribute to order by, if any was given.
    pub fn target(&self) -> Option<&str> {
        [self.attribute.as_deref(), self.column.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Sort direction. Accepts `asc`/`desc` in any case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for OrderDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(OrderDirection::Asc),
            "DESC" => Ok(OrderDirection::Desc),
            _ => Err(format!("unknown sort direction '{}'", s)),
        }
    }
}

impl TryFrom<String> for OrderDirection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderDirection> for String {
    fn from(dir: OrderDirection) -> Self {
        match dir {
            OrderDirection::Asc => "ASC".into(),
            OrderDirection::Desc => "DESC".into(),
        }
    }
}

impl From<OrderDirection> for SortDir {
    fn from(dir: OrderDirection) -> Self {
        match dir {
            OrderDirection::Asc => SortDir::Asc,
            OrderDirection::Desc => SortDir::Desc,
        }
    }
}
