//! Interrupt rules checked between cost accounting and resolution.
//!
//! With no rules registered the stage is a pass-through. Otherwise rules
//! run in registration order and the first to return a reason blocks the
//! action.

use std::sync::Arc;

use witness_actions::Validated;
use witness_types::ActionIntent;

/// A rule that may block an action after it has been paid for.
pub trait InterruptRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// `Some(reason)` blocks the action.
    fn check(&self, intent: &ActionIntent, validated: &Validated) -> Option<String>;
}

/// Run `rules` in order and return the first block, with the rule's name.
pub fn first_block(
    rules: &[Arc<dyn InterruptRule>],
    intent: &ActionIntent,
    validated: &Validated,
) -> Option<(String, String)> {
    rules.iter().find_map(|rule| {
        rule.check(intent, validated)
            .map(|reason| (String::from(rule.name()), reason))
    })
}

#[cfg(test)]
mod tests {
    use witness_actions::RangeLimit;
    use witness_rules::EffectorSet;
    use witness_types::{ActionKind, CommunicationMode, EntityId, Verb};

    use super::*;

    struct Silence;

    impl InterruptRule for Silence {
        fn name(&self) -> &str {
            "silence"
        }

        fn check(&self, intent: &ActionIntent, _validated: &Validated) -> Option<String> {
            (intent.action.verb() == Verb::Communicate)
                .then(|| String::from("a silence spell smothers the words"))
        }
    }

    struct Never;

    impl InterruptRule for Never {
        fn name(&self) -> &str {
            "never"
        }

        fn check(&self, _intent: &ActionIntent, _validated: &Validated) -> Option<String> {
            None
        }
    }

    fn validated() -> Validated {
        Validated {
            target: None,
            distance: None,
            tool: None,
            effectors: EffectorSet::default(),
            range: RangeLimit::Unbounded,
        }
    }

    #[test]
    fn no_rules_pass_through() {
        let intent = ActionIntent::player(EntityId::new(), ActionKind::Inspect);
        assert_eq!(first_block(&[], &intent, &validated()), None);
    }

    #[test]
    fn first_blocking_rule_wins() {
        let rules: Vec<Arc<dyn InterruptRule>> = vec![Arc::new(Never), Arc::new(Silence)];
        let speak =
            ActionIntent::player(EntityId::new(), ActionKind::Communicate(CommunicationMode::Shout));
        let (rule, reason) = first_block(&rules, &speak, &validated()).unwrap_or_default();
        assert_eq!(rule, "silence");
        assert!(reason.contains("silence spell"));

        let walk = ActionIntent::player(EntityId::new(), ActionKind::Move);
        assert_eq!(first_block(&rules, &walk, &validated()), None);
    }
}
