//! `(subject, predicate, object)` knowledge-graph edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CortexError, Result};

/// The closed predicate vocabulary. Anything outside this set is a validation error
/// at the Sieve boundary, not a runtime string comparison downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Uses,
    WorksAt,
    LivesIn,
    Knows,
    Manages,
    BelongsTo,
    Created,
    Prefers,
    Studies,
    SkilledIn,
    CollaboratesWith,
    ReportsTo,
    Owns,
    InterestedIn,
    RelatedTo,
    NotUses,
    NotInterestedIn,
    Dislikes,
}

impl Predicate {
    pub fn as_str(self) -> &'static str {
        use Predicate::*;
        match self {
            Uses => "uses",
            WorksAt => "works_at",
            LivesIn => "lives_in",
            Knows => "knows",
            Manages => "manages",
            BelongsTo => "belongs_to",
            Created => "created",
            Prefers => "prefers",
            Studies => "studies",
            SkilledIn => "skilled_in",
            CollaboratesWith => "collaborates_with",
            ReportsTo => "reports_to",
            Owns => "owns",
            InterestedIn => "interested_in",
            RelatedTo => "related_to",
            NotUses => "not_uses",
            NotInterestedIn => "not_interested_in",
            Dislikes => "dislikes",
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Predicate {
    type Err = CortexError;

    fn from_str(s: &str) -> Result<Self> {
        use Predicate::*;
        Ok(match s {
            "uses" => Uses,
            "works_at" => WorksAt,
            "lives_in" => LivesIn,
            "knows" => Knows,
            "manages" => Manages,
            "belongs_to" => BelongsTo,
            "created" => Created,
            "prefers" => Prefers,
            "studies" => Studies,
            "skilled_in" => SkilledIn,
            "collaborates_with" => CollaboratesWith,
            "reports_to" => ReportsTo,
            "owns" => Owns,
            "interested_in" => InterestedIn,
            "related_to" => RelatedTo,
            "not_uses" => NotUses,
            "not_interested_in" => NotInterestedIn,
            "dislikes" => Dislikes,
            other => {
                return Err(CortexError::validation(format!(
                    "unknown predicate: {other}"
                )))
            }
        })
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    pub agent_id: String,
    pub subject: String,
    pub predicate: Predicate,
    pub object: String,
    pub confidence: f64,
    /// Links to the memory this relation was extracted alongside, if any.
    pub memory_id: Option<String>,
    pub expired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRelation {
    pub agent_id: String,
    pub subject: String,
    pub predicate: Predicate,
    pub object: String,
    pub confidence: f64,
    pub memory_id: Option<String>,
}
