//! The shared data model: `Memory`, `Relation`, `ExtractionLog`, `Agent`.

mod agent;
mod extraction_log;
mod memory;
mod relation;

pub use agent::Agent;
pub use extraction_log::{Channel, ExtractionLog, ExtractionLogBuilder};
pub use memory::{new_id, Category, CategoryFamily, Layer, Memory, NewMemory};
pub use relation::{NewRelation, Predicate, Relation};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_family_split() {
        assert_eq!(Category::Identity.family(), CategoryFamily::User);
        assert_eq!(Category::Constraint.family(), CategoryFamily::Operational);
        assert_eq!(Category::AgentPersona.family(), CategoryFamily::Agent);
        assert_eq!(Category::Summary.family(), CategoryFamily::System);
    }

    #[test]
    fn category_round_trips_through_str() {
        for c in [
            Category::Identity,
            Category::ProjectState,
            Category::AgentSelfImprovement,
            Category::Summary,
        ] {
            assert_eq!(Category::from_str(c.as_str()).unwrap(), c);
        }
    }

    #[test]
    fn unknown_category_is_validation_error() {
        let err = Category::from_str("not_a_category").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn predicate_round_trips() {
        assert_eq!(
            Predicate::from_str("collaborates_with").unwrap().as_str(),
            "collaborates_with"
        );
        assert!(Predicate::from_str("hates").is_err());
    }
}
