//! Sensory signatures per action and distance falloff.
//!
//! Each `VERB` or `VERB.SUBTYPE` key maps to zero or more
//! [`SenseBroadcast`]s. Lookups try the exact subtype key first and fall
//! back to the bare verb, so a profile for `USE` covers every `USE.*`
//! without its own entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use witness_types::{ActionKind, CommunicationMode, Sense, SenseBroadcast, Verb};

use crate::error::SenseError;

/// One configured signature, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// The sense carrying the signature.
    pub sense: Sense,
    /// Strength at the source (clamped into 1..=10).
    pub intensity: u8,
    /// Tiles the signature carries.
    pub range: u32,
}

impl From<ProfileEntry> for SenseBroadcast {
    fn from(entry: ProfileEntry) -> Self {
        Self::new(entry.sense, entry.intensity, entry.range)
    }
}

/// Sense profiles keyed by `VERB` or `VERB.SUBTYPE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenseProfiles {
    profiles: BTreeMap<String, Vec<SenseBroadcast>>,
}

impl SenseProfiles {
    /// An empty table: every action is imperceptible.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock profiles.
    pub fn standard() -> Self {
        use Sense::{Aroma, Light, Pressure, Thaumic};

        let table: &[(&str, &[(Sense, u8, u32)])] = &[
            ("COMMUNICATE.WHISPER", &[(Pressure, 2, 1)]),
            ("COMMUNICATE.NORMAL", &[(Pressure, 5, 3)]),
            ("COMMUNICATE.SHOUT", &[(Pressure, 9, 10)]),
            ("COMMUNICATE.TELEPATHY", &[(Thaumic, 4, 30)]),
            ("MOVE", &[(Pressure, 2, 3), (Light, 3, 20)]),
            ("USE.IMPACT_SINGLE", &[(Pressure, 6, 8), (Light, 5, 20)]),
            ("USE.PROJECTILE_SINGLE", &[(Pressure, 4, 6), (Light, 4, 25)]),
            ("INSPECT", &[(Light, 1, 5)]),
            ("ATTACK", &[(Pressure, 6, 8), (Light, 5, 20)]),
            ("HELP", &[(Light, 3, 10)]),
            ("DEFEND", &[(Light, 3, 15)]),
            ("GRAPPLE", &[(Pressure, 5, 5), (Light, 4, 15)]),
            ("DODGE", &[(Light, 3, 15)]),
            ("CRAFT", &[(Pressure, 4, 6), (Aroma, 2, 3)]),
            ("SLEEP", &[(Pressure, 1, 2)]),
            ("REPAIR", &[(Pressure, 5, 8)]),
            ("WORK", &[(Pressure, 3, 5), (Aroma, 2, 2)]),
            ("GUARD", &[(Light, 2, 10)]),
            ("HOLD", &[]),
        ];

        let profiles = table
            .iter()
            .map(|(key, entries)| {
                let broadcasts = entries
                    .iter()
                    .map(|&(sense, intensity, range)| SenseBroadcast::new(sense, intensity, range))
                    .collect();
                (String::from(*key), broadcasts)
            })
            .collect();
        Self { profiles }
    }

    /// Replace or add profiles. Keys are validated as `VERB` or
    /// `VERB.SUBTYPE`.
    pub fn with_overrides(
        mut self,
        overrides: BTreeMap<String, Vec<ProfileEntry>>,
    ) -> Result<Self, SenseError> {
        for (key, entries) in overrides {
            let key = normalize_key(&key)?;
            self.profiles
                .insert(key, entries.into_iter().map(SenseBroadcast::from).collect());
        }
        Ok(self)
    }

    /// Broadcasts for an action: the exact subtype entry, else the verb
    /// entry, else nothing.
    pub fn broadcasts(&self, kind: ActionKind) -> &[SenseBroadcast] {
        self.profiles
            .get(&kind.to_string())
            .or_else(|| self.profiles.get(kind.verb().as_str()))
            .map_or(&[], Vec::as_slice)
    }

    /// The broadcast for one sense, if the action gives one off.
    pub fn broadcast_for(&self, kind: ActionKind, sense: Sense) -> Option<SenseBroadcast> {
        self.broadcasts(kind).iter().copied().find(|b| b.sense == sense)
    }

    /// Largest range of any signature the action gives off; 0 when silent.
    pub fn max_range(&self, kind: ActionKind) -> u32 {
        self.broadcasts(kind)
            .iter()
            .map(|b| b.range)
            .max()
            .unwrap_or(0)
    }

    /// How far a message carries.
    ///
    /// Audibility is the pressure range of the mode's profile. Telepathy is
    /// always unbounded, as is any mode configured without a pressure
    /// signature.
    pub fn communication_range(&self, mode: CommunicationMode) -> Option<u32> {
        if mode == CommunicationMode::Telepathy {
            return None;
        }
        self.broadcast_for(ActionKind::Communicate(mode), Sense::Pressure)
            .map(|b| b.range)
    }
}

/// Upper-case a profile key and check that it names a real action.
fn normalize_key(key: &str) -> Result<String, SenseError> {
    let upper = key.trim().to_ascii_uppercase();
    let (verb, subtype) = match upper.split_once('.') {
        Some((verb, subtype)) => (verb, Some(subtype)),
        None => (upper.as_str(), None),
    };
    let valid = verb
        .parse::<Verb>()
        .is_ok_and(|verb| subtype.is_none() || ActionKind::from_parts(verb, subtype).is_ok());
    if valid {
        Ok(upper)
    } else {
        Err(SenseError::UnknownProfileKey(String::from(key)))
    }
}

// ---------------------------------------------------------------------------
// Falloff
// ---------------------------------------------------------------------------

/// Whether a signature reaches `distance` tiles.
pub fn is_detectable(broadcast: &SenseBroadcast, distance: f64) -> bool {
    distance <= f64::from(broadcast.range)
}

/// Intensity of a signature at `distance` tiles.
///
/// Within range this is `max(1, round(intensity * (1 - d / range)))`, so a
/// signature never fades to nothing before its edge. Beyond range it is 0.
pub fn apparent_intensity(broadcast: &SenseBroadcast, distance: f64) -> u8 {
    if !is_detectable(broadcast, distance) {
        return 0;
    }
    if broadcast.range == 0 {
        return broadcast.intensity;
    }
    let falloff = 1.0 - distance.max(0.0) / f64::from(broadcast.range);
    let scaled = (f64::from(broadcast.intensity) * falloff).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // `scaled` lies in 0..=intensity, which fits in u8.
    let value = scaled as u8;
    value.max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use witness_types::UseMode;

    use super::*;

    #[test]
    fn communication_ranges_follow_pressure() {
        let profiles = SenseProfiles::standard();
        assert_eq!(profiles.communication_range(CommunicationMode::Whisper), Some(1));
        assert_eq!(profiles.communication_range(CommunicationMode::Normal), Some(3));
        assert_eq!(profiles.communication_range(CommunicationMode::Shout), Some(10));
        assert_eq!(profiles.communication_range(CommunicationMode::Telepathy), None);
    }

    #[test]
    fn subtype_falls_back_to_verb() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            String::from("use"),
            vec![ProfileEntry {
                sense: Sense::Pressure,
                intensity: 3,
                range: 4,
            }],
        );
        let profiles = SenseProfiles::empty().with_overrides(overrides).unwrap();
        let impact = profiles.broadcasts(ActionKind::Use(UseMode::ImpactSingle));
        assert_eq!(impact.len(), 1);
        assert_eq!(impact.first().map(|b| b.range), Some(4));
        assert!(profiles.broadcasts(ActionKind::Move).is_empty());
    }

    #[test]
    fn exact_subtype_wins() {
        let profiles = SenseProfiles::standard();
        let shout = profiles.broadcasts(ActionKind::Communicate(CommunicationMode::Shout));
        assert_eq!(shout.len(), 1);
        assert_eq!(shout.first().map(|b| b.intensity), Some(9));
    }

    #[test]
    fn hold_is_silent() {
        let profiles = SenseProfiles::standard();
        let hold = ActionKind::templated(Verb::Hold).unwrap();
        assert!(profiles.broadcasts(hold).is_empty());
        assert_eq!(profiles.max_range(hold), 0);
    }

    #[test]
    fn bad_override_key_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert(String::from("DANCE"), Vec::new());
        assert_eq!(
            SenseProfiles::standard().with_overrides(overrides),
            Err(SenseError::UnknownProfileKey(String::from("DANCE")))
        );

        let mut overrides = BTreeMap::new();
        overrides.insert(String::from("MOVE.FAST"), Vec::new());
        assert!(SenseProfiles::standard().with_overrides(overrides).is_err());
    }

    #[test]
    fn overrides_parse_from_yaml() {
        let yaml = "
COMMUNICATE.WHISPER:
  - sense: pressure
    intensity: 1
    range: 2
";
        let overrides: BTreeMap<String, Vec<ProfileEntry>> = serde_yml::from_str(yaml).unwrap();
        let profiles = SenseProfiles::standard().with_overrides(overrides).unwrap();
        assert_eq!(profiles.communication_range(CommunicationMode::Whisper), Some(2));
    }

    #[test]
    fn falloff_formula() {
        let b = SenseBroadcast::new(Sense::Pressure, 9, 10);
        assert_eq!(apparent_intensity(&b, 0.0), 9);
        assert_eq!(apparent_intensity(&b, 5.0), 5); // round(4.5)
        assert_eq!(apparent_intensity(&b, 9.9), 1); // floor of 1
        assert_eq!(apparent_intensity(&b, 10.0), 1);
        assert_eq!(apparent_intensity(&b, 10.1), 0);
        assert!(is_detectable(&b, 10.0));
        assert!(!is_detectable(&b, 10.5));
    }

    #[test]
    fn falloff_is_non_increasing() {
        let b = SenseBroadcast::new(Sense::Light, 7, 25);
        let mut previous = u8::MAX;
        for step in 0..60 {
            let d = f64::from(step) * 0.5;
            let now = apparent_intensity(&b, d);
            assert!(now <= previous, "d={d}");
            previous = now;
        }
    }

    #[test]
    fn zero_range_only_reaches_own_tile() {
        let b = SenseBroadcast::new(Sense::Aroma, 4, 0);
        assert_eq!(apparent_intensity(&b, 0.0), 4);
        assert_eq!(apparent_intensity(&b, 1.0), 0);
    }
}
