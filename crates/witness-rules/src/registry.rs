//! Static per-verb action definitions.
//!
//! The registry is built once at startup, either from
//! [`ActionRegistry::standard`] or from configuration, and shared read-only
//! behind an `Arc`. A verb with no definition cannot be resolved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use witness_types::{ActionKind, EntityKind, Verb};

use crate::error::RulesError;

/// Placeholder for the actor's name in effect templates.
pub const TEMPLATE_ACTOR: &str = "{actor}";

/// Placeholder for the target's name in effect templates.
pub const TEMPLATE_TARGET: &str = "{target}";

const fn yes() -> bool {
    true
}

/// Static rules for one verb.
#[allow(clippy::struct_excessive_bools)] // Each flag is an independent validation switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// The verb defined.
    pub verb: Verb,
    /// Maximum target distance in tiles; `None` is unbounded.
    #[serde(default)]
    pub target_range: Option<u32>,
    /// Whether a target must be resolved.
    #[serde(default)]
    pub requires_target: bool,
    /// Whether the actor may target itself.
    #[serde(default)]
    pub allow_self_target: bool,
    /// Whether an equipped tool with a matching capability is needed.
    #[serde(default)]
    pub requires_tool: bool,
    /// Whether the actor must be aware of the target.
    #[serde(default)]
    pub requires_awareness: bool,
    /// Legal while turn-based combat is active.
    #[serde(default = "yes")]
    pub usable_in_combat: bool,
    /// Legal outside combat.
    #[serde(default = "yes")]
    pub usable_out_of_combat: bool,
    /// Text rendered for templated verbs (`{actor}` and `{target}` are
    /// substituted).
    #[serde(default)]
    pub effect_template: Option<String>,
    /// Kinds the verb may target; empty means any.
    #[serde(default)]
    pub target_kinds: Vec<EntityKind>,
    /// Range overrides keyed by subtype name.
    #[serde(default)]
    pub subtype_ranges: BTreeMap<String, u32>,
    /// Base CR for rolls made by this verb.
    #[serde(default)]
    pub base_cr: Option<i64>,
}

impl ActionDefinition {
    /// A definition with no requirements, usable in and out of combat.
    pub const fn new(verb: Verb) -> Self {
        Self {
            verb,
            target_range: None,
            requires_target: false,
            allow_self_target: false,
            requires_tool: false,
            requires_awareness: false,
            usable_in_combat: true,
            usable_out_of_combat: true,
            effect_template: None,
            target_kinds: Vec::new(),
            subtype_ranges: BTreeMap::new(),
            base_cr: None,
        }
    }

    /// Set the target range.
    #[must_use]
    pub const fn range(mut self, tiles: u32) -> Self {
        self.target_range = Some(tiles);
        self
    }

    /// Require a target.
    #[must_use]
    pub const fn targeted(mut self) -> Self {
        self.requires_target = true;
        self
    }

    /// Allow self-targeting.
    #[must_use]
    pub const fn self_targetable(mut self) -> Self {
        self.allow_self_target = true;
        self
    }

    /// Require a tool.
    #[must_use]
    pub const fn with_tool(mut self) -> Self {
        self.requires_tool = true;
        self
    }

    /// Require awareness of the target.
    #[must_use]
    pub const fn aware(mut self) -> Self {
        self.requires_awareness = true;
        self
    }

    /// Only legal during combat.
    #[must_use]
    pub const fn combat_only(mut self) -> Self {
        self.usable_out_of_combat = false;
        self
    }

    /// Only legal outside combat.
    #[must_use]
    pub const fn peace_only(mut self) -> Self {
        self.usable_in_combat = false;
        self
    }

    /// Set the effect template.
    #[must_use]
    pub fn template(mut self, template: &str) -> Self {
        self.effect_template = Some(String::from(template));
        self
    }

    /// Restrict targetable kinds.
    #[must_use]
    pub fn kinds(mut self, kinds: &[EntityKind]) -> Self {
        self.target_kinds = kinds.to_vec();
        self
    }

    /// Range override for one subtype.
    #[must_use]
    pub fn subtype_range(mut self, subtype: &str, tiles: u32) -> Self {
        self.subtype_ranges.insert(String::from(subtype), tiles);
        self
    }

    /// The range for a specific kind: the subtype override if present,
    /// otherwise the verb's range.
    pub fn range_for(&self, kind: ActionKind) -> Option<u32> {
        kind.subtype()
            .and_then(|subtype| self.subtype_ranges.get(subtype).copied())
            .or(self.target_range)
    }

    /// Whether the verb may act on an entity of `kind`.
    pub fn allows_kind(&self, kind: EntityKind) -> bool {
        self.target_kinds.is_empty() || self.target_kinds.contains(&kind)
    }

    /// Render the effect template with actor and target names.
    pub fn render(&self, actor: &str, target: Option<&str>) -> Option<String> {
        self.effect_template.as_ref().map(|template| {
            template
                .replace(TEMPLATE_ACTOR, actor)
                .replace(TEMPLATE_TARGET, target.unwrap_or("nothing in particular"))
        })
    }
}

/// Standard definition for a verb.
#[allow(clippy::match_same_arms)] // One arm per verb keeps the table readable.
pub fn standard_definition(verb: Verb) -> ActionDefinition {
    use EntityKind::{Creature, Feature, Item, Npc, Player};

    let def = ActionDefinition::new(verb);
    match verb {
        Verb::Communicate => def
            .range(3)
            .kinds(&[Player, Npc, Creature])
            .subtype_range("WHISPER", 1)
            .subtype_range("NORMAL", 3)
            .subtype_range("SHOUT", 10),
        Verb::Move => def,
        Verb::Use => def.range(1).targeted().with_tool().aware(),
        Verb::Inspect => def.range(10).targeted().self_targetable(),
        Verb::Attack => def
            .range(1)
            .targeted()
            .aware()
            .kinds(&[Player, Npc, Creature])
            .template("{actor} attacks {target}"),
        Verb::Help => def
            .range(1)
            .targeted()
            .kinds(&[Player, Npc, Creature])
            .template("{actor} helps {target}"),
        Verb::Defend => def.template("{actor} takes a defensive stance"),
        Verb::Grapple => def
            .range(1)
            .targeted()
            .aware()
            .kinds(&[Player, Npc, Creature])
            .template("{actor} grapples {target}"),
        Verb::Dodge => def.combat_only().template("{actor} dodges"),
        Verb::Craft => def.peace_only().template("{actor} crafts"),
        Verb::Sleep => def.peace_only().template("{actor} lies down to sleep"),
        Verb::Repair => def
            .range(1)
            .targeted()
            .peace_only()
            .kinds(&[Item, Feature])
            .template("{actor} repairs {target}"),
        Verb::Work => def.peace_only().template("{actor} works"),
        Verb::Guard => def.range(5).template("{actor} guards {target}"),
        Verb::Hold => def.template("{actor} holds position"),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Verb lookup for action definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionRegistry {
    definitions: BTreeMap<Verb, ActionDefinition>,
}

impl ActionRegistry {
    /// The standard definitions for all fifteen verbs.
    pub fn standard() -> Self {
        let definitions = Verb::ALL
            .into_iter()
            .map(|verb| (verb, standard_definition(verb)))
            .collect();
        Self { definitions }
    }

    /// Build from explicit definitions. Verbs without a definition stay
    /// unregistered.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ActionDefinition>,
    ) -> Result<Self, RulesError> {
        let mut registry = Self::default();
        for def in definitions {
            if registry.definitions.contains_key(&def.verb) {
                return Err(RulesError::DuplicateDefinition(def.verb));
            }
            registry.insert(def)?;
        }
        Ok(registry)
    }

    /// Replace standard entries with overrides.
    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = ActionDefinition>,
    ) -> Result<Self, RulesError> {
        for def in overrides {
            debug!(verb = %def.verb, "overriding action definition");
            self.insert(def)?;
        }
        Ok(self)
    }

    fn insert(&mut self, def: ActionDefinition) -> Result<(), RulesError> {
        check_definition(&def)?;
        self.definitions.insert(def.verb, def);
        Ok(())
    }

    /// Definition for a verb.
    pub fn get(&self, verb: Verb) -> Option<&ActionDefinition> {
        self.definitions.get(&verb)
    }

    /// Whether a verb is registered.
    pub fn contains(&self, verb: Verb) -> bool {
        self.definitions.contains_key(&verb)
    }

    /// Registered definitions in verb order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.values()
    }

    /// Number of registered verbs.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn check_definition(def: &ActionDefinition) -> Result<(), RulesError> {
    if !def.verb.is_core() && def.effect_template.is_none() {
        return Err(RulesError::MissingTemplate(def.verb));
    }
    for subtype in def.subtype_ranges.keys() {
        if ActionKind::from_parts(def.verb, Some(subtype)).is_err() {
            return Err(RulesError::UnknownSubtype {
                verb: def.verb,
                subtype: subtype.clone(),
            });
        }
    }
    Ok(())
}
