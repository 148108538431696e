//! The central entity: `Memory`, plus the closed `Layer` and `Category` enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CortexError, Result};

/// Storage tier. Controls TTL, recall priority weight, and lifecycle visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// 48h TTL by default (`layers.working.ttl`); unpromoted, ephemeral.
    Working,
    /// Permanent until archived or explicitly deleted.
    Core,
    /// 90d TTL by default, then compressed into a `summary` memory or dropped.
    Archive,
}

impl Layer {
    /// Post-fusion scoring weight applied in Gate step 5.
    pub fn score_weight(self) -> f64 {
        match self {
            Layer::Core => 1.0,
            Layer::Working => 0.8,
            Layer::Archive => 0.4,
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Layer::Working => "working",
            Layer::Core => "core",
            Layer::Archive => "archive",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Layer {
    type Err = CortexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "working" => Ok(Layer::Working),
            "core" => Ok(Layer::Core),
            "archive" => Ok(Layer::Archive),
            other => Err(CortexError::validation(format!("unknown layer: {other}"))),
        }
    }
}

/// The broader grouping a [`Category`] belongs to. The writer's cross-family rule
/// (no supersede across families) dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFamily {
    User,
    Operational,
    Agent,
    System,
}

/// The 20-tag closed category set, across three tracks plus a system track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // user
    Identity,
    Preference,
    Decision,
    Fact,
    Entity,
    Correction,
    Todo,
    Skill,
    Relationship,
    Goal,
    Insight,
    ProjectState,
    // operational
    Constraint,
    Policy,
    // agent (self-model)
    AgentPersona,
    AgentRelationship,
    AgentUserHabit,
    AgentSelfImprovement,
    // system
    Context,
    Summary,
}

impl Category {
    pub fn family(self) -> CategoryFamily {
        use Category::*;
        match self {
            Identity | Preference | Decision | Fact | Entity | Correction | Todo
            | Skill | Relationship | Goal | Insight | ProjectState => CategoryFamily::User,
            Constraint | Policy => CategoryFamily::Operational,
            AgentPersona | AgentRelationship | AgentUserHabit | AgentSelfImprovement => {
                CategoryFamily::Agent
            }
            Context | Summary => CategoryFamily::System,
        }
    }

    pub fn as_str(self) -> &'static str {
        use Category::*;
        match self {
            Identity => "identity",
            Preference => "preference",
            Decision => "decision",
            Fact => "fact",
            Entity => "entity",
            Correction => "correction",
            Todo => "todo",
            Skill => "skill",
            Relationship => "relationship",
            Goal => "goal",
            Insight => "insight",
            ProjectState => "project_state",
            Constraint => "constraint",
            Policy => "policy",
            AgentPersona => "agent_persona",
            AgentRelationship => "agent_relationship",
            AgentUserHabit => "agent_user_habit",
            AgentSelfImprovement => "agent_self_improvement",
            Context => "context",
            Summary => "summary",
        }
    }

    /// The restricted fact-like user categories a `correction` extraction is allowed
    /// to match against (§4.3 step 1).
    pub fn is_correction_target(self) -> bool {
        matches!(
            self,
            Category::Identity
                | Category::Preference
                | Category::Fact
                | Category::Entity
                | Category::ProjectState
                | Category::Relationship
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CortexError;

    fn from_str(s: &str) -> Result<Self> {
        use Category::*;
        Ok(match s {
            "identity" => Identity,
            "preference" => Preference,
            "decision" => Decision,
            "fact" => Fact,
            "entity" => Entity,
            "correction" => Correction,
            "todo" => Todo,
            "skill" => Skill,
            "relationship" => Relationship,
            "goal" => Goal,
            "insight" => Insight,
            "project_state" => ProjectState,
            "constraint" => Constraint,
            "policy" => Policy,
            "agent_persona" => AgentPersona,
            "agent_relationship" => AgentRelationship,
            "agent_user_habit" => AgentUserHabit,
            "agent_self_improvement" => AgentSelfImprovement,
            "context" => Context,
            "summary" => Summary,
            other => {
                return Err(CortexError::validation(format!(
                    "unknown category: {other}"
                )))
            }
        })
    }
}

/// The central entity. See the crate's data model documentation for field semantics.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub agent_id: String,
    pub layer: Layer,
    pub category: Category,
    pub content: String,
    pub importance: f64,
    pub confidence: f64,
    pub decay_score: f64,
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub superseded_by: Option<String>,
    pub is_pinned: bool,
    pub source: String,
    /// Free-form structured extras: extraction reasoning, supersede trace.
    pub metadata: serde_json::Value,
}

impl Memory {
    /// `expires_at != null <=> layer == working`. Called before every store write.
    pub fn check_invariants(&self) -> Result<()> {
        let working = matches!(self.layer, Layer::Working);
        if self.expires_at.is_some() != working {
            return Err(CortexError::invariant(
                "expires_at must be set iff layer = working",
            ));
        }
        for (name, v) in [
            ("importance", self.importance),
            ("confidence", self.confidence),
            ("decay_score", self.decay_score),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CortexError::invariant(format!(
                    "{name} out of range [0,1]: {v}"
                )));
            }
        }
        if self.content.trim().chars().count() < 3 {
            return Err(CortexError::invariant("content must be >= 3 chars"));
        }
        Ok(())
    }

    pub fn is_live(&self) -> bool {
        self.superseded_by.is_none()
    }
}

/// Caller-supplied fields for [`Store::insert`](crate::store::Store::insert). The
/// store assigns `id`, timestamps, and derived fields (`layer` routing, `expires_at`).
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub agent_id: String,
    pub category: Category,
    pub content: String,
    pub importance: f64,
    pub confidence: f64,
    pub is_pinned: bool,
    pub source: String,
    pub metadata: serde_json::Value,
    /// When `None`, routed by importance (>= 0.8 -> core, else working) per §4.3.
    pub layer: Option<Layer>,
}

impl NewMemory {
    pub fn new(agent_id: impl Into<String>, category: Category, content: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            category,
            content: content.into(),
            importance: 0.5,
            confidence: 0.7,
            is_pinned: false,
            source: "sieve".to_string(),
            metadata: serde_json::json!({}),
            layer: None,
        }
    }

    pub fn routed_layer(&self) -> Layer {
        self.layer.unwrap_or(if self.importance >= 0.8 {
            Layer::Core
        } else {
            Layer::Working
        })
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
