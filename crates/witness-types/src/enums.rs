//! Enumeration types for the action core.
//!
//! Verbs, action kinds, cost categories, senses, and the lifecycle states an
//! intent moves through. Every enum here is closed: hosts extend behaviour
//! through the registry and the templated verb path, never by inventing
//! new string tags.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

/// The fixed set of verbs an actor can submit.
///
/// Four verbs (`Communicate`, `Move`, `Use`, `Inspect`) have dedicated
/// handlers. The rest resolve through the registry's effect template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verb {
    /// Speak, whisper, shout, or send a telepathic message.
    Communicate,
    /// Move a requested distance or toward a destination.
    Move,
    /// Use an equipped tool (melee strike, thrown or fired projectile).
    Use,
    /// Study a target through the senses.
    Inspect,
    /// Generic attack without a dedicated tool handler.
    Attack,
    /// Assist another entity.
    Help,
    /// Take a defensive stance.
    Defend,
    /// Seize or hold another entity.
    Grapple,
    /// Evade incoming attacks.
    Dodge,
    /// Create an item.
    Craft,
    /// Rest for an extended period.
    Sleep,
    /// Mend an item or structure.
    Repair,
    /// Perform labour.
    Work,
    /// Watch over an entity or area.
    Guard,
    /// Hold position and wait.
    Hold,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Communicate,
        Self::Move,
        Self::Use,
        Self::Inspect,
        Self::Attack,
        Self::Help,
        Self::Defend,
        Self::Grapple,
        Self::Dodge,
        Self::Craft,
        Self::Sleep,
        Self::Repair,
        Self::Work,
        Self::Guard,
        Self::Hold,
    ];

    /// Canonical upper-case name, as used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Communicate => "COMMUNICATE",
            Self::Move => "MOVE",
            Self::Use => "USE",
            Self::Inspect => "INSPECT",
            Self::Attack => "ATTACK",
            Self::Help => "HELP",
            Self::Defend => "DEFEND",
            Self::Grapple => "GRAPPLE",
            Self::Dodge => "DODGE",
            Self::Craft => "CRAFT",
            Self::Sleep => "SLEEP",
            Self::Repair => "REPAIR",
            Self::Work => "WORK",
            Self::Guard => "GUARD",
            Self::Hold => "HOLD",
        }
    }

    /// Whether this verb has a dedicated handler.
    pub const fn is_core(self) -> bool {
        matches!(
            self,
            Self::Communicate | Self::Move | Self::Use | Self::Inspect
        )
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str() == upper)
            .ok_or_else(|| TypeError::UnknownVerb(String::from(s)))
    }
}

// ---------------------------------------------------------------------------
// Subtypes and the closed action kind
// ---------------------------------------------------------------------------

/// How a `COMMUNICATE` action is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationMode {
    /// Audible only to adjacent listeners.
    Whisper,
    /// Ordinary speaking voice.
    Normal,
    /// Raised voice, carries across a room or clearing.
    Shout,
    /// Mind-to-mind; no audible range limit.
    Telepathy,
}

impl CommunicationMode {
    /// Canonical upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Whisper => "WHISPER",
            Self::Normal => "NORMAL",
            Self::Shout => "SHOUT",
            Self::Telepathy => "TELEPATHY",
        }
    }
}

/// Which tool capability a `USE` action exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UseMode {
    /// Single-target melee strike.
    ImpactSingle,
    /// Single-target thrown or fired projectile.
    ProjectileSingle,
}

impl UseMode {
    /// Canonical upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImpactSingle => "IMPACT_SINGLE",
            Self::ProjectileSingle => "PROJECTILE_SINGLE",
        }
    }
}

/// The closed `{verb, subtype}` union an intent carries.
///
/// Core verbs are matched exhaustively; every other verb travels through
/// [`ActionKind::Templated`], which can only be built for non-core verbs.
///
/// On the wire a kind is `{"verb": "USE", "subtype": "IMPACT_SINGLE"}`,
/// with `subtype` omitted when there is none. Deserializing goes through
/// [`ActionKind::from_parts`], so a payload can never template a core verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "KindParts", into = "KindParts")]
pub enum ActionKind {
    /// `COMMUNICATE.<mode>`.
    Communicate(CommunicationMode),
    /// `MOVE`.
    Move,
    /// `USE.<mode>`.
    Use(UseMode),
    /// `INSPECT`.
    Inspect,
    /// Any non-core verb, resolved from its registry effect template.
    Templated(Verb),
}

impl ActionKind {
    /// Build a kind from a verb and an optional subtype name.
    ///
    /// `COMMUNICATE` defaults to `NORMAL` when no subtype is given. `USE`
    /// requires an explicit subtype. Non-core verbs reject subtypes.
    pub fn from_parts(verb: Verb, subtype: Option<&str>) -> Result<Self, TypeError> {
        let subtype = subtype.map(|s| s.trim().to_ascii_uppercase());
        match verb {
            Verb::Communicate => match subtype.as_deref() {
                None | Some("NORMAL") => Ok(Self::Communicate(CommunicationMode::Normal)),
                Some("WHISPER") => Ok(Self::Communicate(CommunicationMode::Whisper)),
                Some("SHOUT") => Ok(Self::Communicate(CommunicationMode::Shout)),
                Some("TELEPATHY") => Ok(Self::Communicate(CommunicationMode::Telepathy)),
                Some(other) => Err(TypeError::UnknownSubtype {
                    verb,
                    subtype: String::from(other),
                }),
            },
            Verb::Use => match subtype.as_deref() {
                Some("IMPACT_SINGLE") => Ok(Self::Use(UseMode::ImpactSingle)),
                Some("PROJECTILE_SINGLE") => Ok(Self::Use(UseMode::ProjectileSingle)),
                Some(other) => Err(TypeError::UnknownSubtype {
                    verb,
                    subtype: String::from(other),
                }),
                None => Err(TypeError::MissingSubtype(verb)),
            },
            Verb::Move | Verb::Inspect => match subtype {
                None => Ok(if verb == Verb::Move { Self::Move } else { Self::Inspect }),
                Some(other) => Err(TypeError::UnknownSubtype {
                    verb,
                    subtype: other,
                }),
            },
            _ => match subtype {
                None => Self::templated(verb),
                Some(other) => Err(TypeError::UnknownSubtype {
                    verb,
                    subtype: other,
                }),
            },
        }
    }

    /// Build the extension-path kind for a non-core verb.
    pub fn templated(verb: Verb) -> Result<Self, TypeError> {
        if verb.is_core() {
            Err(TypeError::CoreVerbNotTemplated(verb))
        } else {
            Ok(Self::Templated(verb))
        }
    }

    /// The verb this kind belongs to.
    pub const fn verb(self) -> Verb {
        match self {
            Self::Communicate(_) => Verb::Communicate,
            Self::Move => Verb::Move,
            Self::Use(_) => Verb::Use,
            Self::Inspect => Verb::Inspect,
            Self::Templated(verb) => verb,
        }
    }

    /// The subtype name, if the kind has one.
    pub const fn subtype(self) -> Option<&'static str> {
        match self {
            Self::Communicate(mode) => Some(mode.as_str()),
            Self::Use(mode) => Some(mode.as_str()),
            Self::Move | Self::Inspect | Self::Templated(_) => None,
        }
    }
}

/// Wire form of an [`ActionKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KindParts {
    verb: Verb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtype: Option<String>,
}

impl TryFrom<KindParts> for ActionKind {
    type Error = TypeError;

    fn try_from(parts: KindParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.verb, parts.subtype.as_deref())
    }
}

impl From<ActionKind> for KindParts {
    fn from(kind: ActionKind) -> Self {
        Self {
            verb: kind.verb(),
            subtype: kind.subtype().map(String::from),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtype() {
            Some(subtype) => write!(f, "{}.{subtype}", self.verb()),
            None => write!(f, "{}", self.verb()),
        }
    }
}

// ---------------------------------------------------------------------------
// Costs, actors, lifecycle
// ---------------------------------------------------------------------------

/// How much of an actor's turn budget an action consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostCategory {
    /// No cost; never touches the ledger.
    Free,
    /// Off-turn response to another action.
    Reaction,
    /// The actor's main action for the turn.
    Full,
    /// Spans more than one turn.
    Extended,
}

/// What kind of entity an actor, target, or observer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A player-controlled character.
    Player,
    /// A non-player character.
    Npc,
    /// A creature without NPC scheduling (animals, monsters).
    Creature,
    /// A loose item lying in the world.
    Item,
    /// A static feature: door, wall, lever, altar.
    Feature,
}

impl EntityKind {
    /// Whether entities of this kind can perceive actions.
    pub const fn is_sentient(self) -> bool {
        matches!(self, Self::Player | Self::Npc | Self::Creature)
    }
}

/// Lifecycle state of an [`ActionIntent`](crate::ActionIntent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Submitted, not yet picked up by the pipeline.
    Pending,
    /// Target resolution and validation are running.
    Validating,
    /// Passed validation, cost, and rules checks.
    Validated,
    /// The handler is producing and applying effects.
    Executing,
    /// Fully resolved. Terminal.
    Executed,
    /// Rejected or aborted at some stage. Terminal.
    Failed,
}

impl IntentStatus {
    /// Whether no further stage may run.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Executed | Self::Failed)
    }
}

/// Which factory produced an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    /// Built directly by the host.
    Generic,
    /// Player input.
    Player,
    /// NPC behaviour.
    Npc,
    /// A reaction to a perceived action.
    Reaction,
}

/// The ordered pipeline stages, recorded on the intent as they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Resolve the actor location and the target.
    TargetResolution,
    /// Fail-fast validation checks.
    Validation,
    /// Turn and ledger checks.
    CostAccounting,
    /// Interrupt rules (reactions, status blocks).
    RulesCheck,
    /// Rolls and effect generation.
    Resolution,
    /// Host applies the effects.
    Application,
    /// Outcome broadcast to observers.
    Perception,
}

impl PipelineStage {
    /// The seven stages in execution order.
    pub const ORDER: [Self; 7] = [
        Self::TargetResolution,
        Self::Validation,
        Self::CostAccounting,
        Self::RulesCheck,
        Self::Resolution,
        Self::Application,
        Self::Perception,
    ];

    /// Stage name as recorded on the intent.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TargetResolution => "target_resolution",
            Self::Validation => "validation",
            Self::CostAccounting => "cost_accounting",
            Self::RulesCheck => "rules_check",
            Self::Resolution => "resolution",
            Self::Application => "application",
            Self::Perception => "perception",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// How far a tool capability reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeCategory {
    /// Adjacent targets only.
    Melee,
    /// The tool itself is the projectile.
    Thrown,
    /// The tool launches separate ammunition.
    Ranged,
}

/// Whether an effector adds to or multiplies a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectorKind {
    /// Additive modifier, summed before scaling.
    Shift,
    /// Multiplicative modifier, applied after all shifts.
    Scale,
}

/// The value an effector modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectorChannel {
    /// The attack or result roll total.
    Roll,
    /// The damage magnitude.
    Potency,
    /// The effective range of a projectile.
    Range,
}

// ---------------------------------------------------------------------------
// Senses
// ---------------------------------------------------------------------------

/// The four canonical senses, in tie-break order.
///
/// The derived `Ord` follows declaration order, which is the fixed
/// enumeration order used to break clarity ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    /// Sight.
    Light,
    /// Sound and vibration.
    Pressure,
    /// Smell.
    Aroma,
    /// Magical or psychic emanation.
    Thaumic,
}

impl Sense {
    /// All senses in tie-break order.
    pub const ALL: [Self; 4] = [Self::Light, Self::Pressure, Self::Aroma, Self::Thaumic];

    /// Only light is directional.
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Light)
    }

    /// Everything but light passes through walls.
    pub const fn penetrates_walls(self) -> bool {
        !matches!(self, Self::Light)
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Light => "light",
            Self::Pressure => "pressure",
            Self::Aroma => "aroma",
            Self::Thaumic => "thaumic",
        };
        f.write_str(name)
    }
}

/// How clearly something is perceived.
///
/// Ordered so that `None < Obscured < Vague < Clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clarity {
    /// Not perceived at all.
    None,
    /// Something is there.
    Obscured,
    /// Rough shape and activity.
    Vague,
    /// Full detail.
    Clear,
}

impl Clarity {
    /// Whether anything was perceived.
    pub const fn is_perceived(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Which of the two broadcasts per action produced a perception event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastPhase {
    /// Before effects apply: the action is seen being attempted.
    Attempt,
    /// After effects apply: the outcome is seen.
    Outcome,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn verb_parses_case_insensitively() {
        assert_eq!("communicate".parse::<Verb>().unwrap(), Verb::Communicate);
        assert_eq!(" GRAPPLE ".parse::<Verb>().unwrap(), Verb::Grapple);
        assert!("teleport".parse::<Verb>().is_err());
    }

    #[test]
    fn verb_names_round_trip() {
        for verb in Verb::ALL {
            assert_eq!(verb.as_str().parse::<Verb>().unwrap(), verb);
        }
    }

    #[test]
    fn communicate_defaults_to_normal() {
        let kind = ActionKind::from_parts(Verb::Communicate, None).unwrap();
        assert_eq!(kind, ActionKind::Communicate(CommunicationMode::Normal));
    }

    #[test]
    fn use_requires_subtype() {
        assert!(matches!(
            ActionKind::from_parts(Verb::Use, None),
            Err(TypeError::MissingSubtype(Verb::Use))
        ));
        let kind = ActionKind::from_parts(Verb::Use, Some("projectile_single")).unwrap();
        assert_eq!(kind, ActionKind::Use(UseMode::ProjectileSingle));
    }

    #[test]
    fn templated_path_rejects_core_verbs() {
        assert!(ActionKind::templated(Verb::Move).is_err());
        assert_eq!(
            ActionKind::templated(Verb::Sleep).unwrap(),
            ActionKind::Templated(Verb::Sleep)
        );
    }

    #[test]
    fn non_core_verbs_reject_subtypes() {
        assert!(ActionKind::from_parts(Verb::Craft, Some("FAST")).is_err());
        assert!(ActionKind::from_parts(Verb::Inspect, Some("CLOSE")).is_err());
    }

    #[test]
    fn kind_wire_form_is_checked() {
        let strike = serde_json::to_value(ActionKind::Use(UseMode::ImpactSingle)).unwrap();
        assert_eq!(
            strike,
            serde_json::json!({"verb": "USE", "subtype": "IMPACT_SINGLE"})
        );
        assert_eq!(
            serde_json::to_value(ActionKind::Templated(Verb::Attack)).unwrap(),
            serde_json::json!({"verb": "ATTACK"})
        );

        let attack: ActionKind = serde_json::from_str(r#"{"verb": "ATTACK"}"#).unwrap();
        assert_eq!(attack, ActionKind::Templated(Verb::Attack));
        let talk: ActionKind = serde_json::from_str(r#"{"verb": "COMMUNICATE"}"#).unwrap();
        assert_eq!(talk, ActionKind::Communicate(CommunicationMode::Normal));

        // A core verb can never arrive on the template path.
        for payload in [
            r#"{"verb": "TEMPLATED", "subtype": "MOVE"}"#,
            r#"{"verb": "MOVE", "subtype": "FAST"}"#,
            r#"{"verb": "USE"}"#,
            r#"{"verb": "CRAFT", "subtype": "QUICK"}"#,
        ] {
            assert!(serde_json::from_str::<ActionKind>(payload).is_err(), "{payload}");
        }
    }

    #[test]
    fn kind_display_includes_subtype() {
        let kind = ActionKind::Use(UseMode::ImpactSingle);
        assert_eq!(kind.to_string(), "USE.IMPACT_SINGLE");
        assert_eq!(ActionKind::Move.to_string(), "MOVE");
    }

    #[test]
    fn sense_order_is_tie_break_order() {
        let mut senses = vec![Sense::Thaumic, Sense::Aroma, Sense::Light, Sense::Pressure];
        senses.sort();
        assert_eq!(senses, Sense::ALL.to_vec());
    }

    #[test]
    fn only_light_is_directional_and_blocked() {
        for sense in Sense::ALL {
            assert_eq!(sense.is_directional(), sense == Sense::Light);
            assert_eq!(sense.penetrates_walls(), sense != Sense::Light);
        }
    }

    #[test]
    fn clarity_tiers_are_ordered() {
        assert!(Clarity::Clear > Clarity::Vague);
        assert!(Clarity::Vague > Clarity::Obscured);
        assert!(Clarity::Obscured > Clarity::None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(IntentStatus::Executed.is_terminal());
        assert!(IntentStatus::Failed.is_terminal());
        assert!(!IntentStatus::Validated.is_terminal());
    }
}
