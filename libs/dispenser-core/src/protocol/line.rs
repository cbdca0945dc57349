//! Legacy text protocol: one JSON object per line.
//!
//! The controller sends e.g. `{"pill1":2,"pill3":1}\n`. Keys map to
//! channel indices through an injected name table (deployments differ in
//! whether they send the legacy `pillN` keys or medication labels), and
//! values clamp into `0..=20` before dispatch. Pairs whose key is
//! unknown or whose value is not a number are skipped; `bad_json` is
//! reserved for lines that do not parse as a JSON object at all.
use core::fmt;

use serde::de::{DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use serde_json_core::de::Deserializer;

use crate::{ChannelCounts, CHANNEL_COUNT};

/// Upper bound on cycles one text command may request per channel.
pub const MAX_LINE_COUNT: i32 = 20;

/// Key-to-channel lookup table for the text protocol.
#[derive(Debug, Clone, Copy)]
pub struct ChannelNames {
    names: [&'static str; CHANNEL_COUNT],
}

impl ChannelNames {
    /// Original deployment: channels keyed `pill1`..`pill4`.
    pub const LEGACY: Self = Self::new(["pill1", "pill2", "pill3", "pill4"]);

    /// Alternate deployment keyed by medication label.
    pub const MEDICATION_LABELS: Self =
        Self::new(["Vitamin C", "Fish Oil", "Vitamin B", "Tylenol"]);

    pub const fn new(names: [&'static str; CHANNEL_COUNT]) -> Self {
        Self { names }
    }
}

/// Result of decoding one candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Whitespace only; consumed silently, no acknowledgment owed.
    Blank,
    Counts(ChannelCounts),
    BadJson,
}

/// Proof that a payload is a well-formed JSON object. Entry values may
/// be of any shape; they are validated and discarded.
struct ObjectShape;

impl<'de> Deserialize<'de> for ObjectShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ShapeVisitor;

        impl<'de> Visitor<'de> for ShapeVisitor {
            type Value = ObjectShape;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(ObjectShape)
            }
        }

        deserializer.deserialize_map(ShapeVisitor)
    }
}

/// Extracts the numeric value of a single key, ignoring every other
/// entry. Errs if the first occurrence of the key holds a non-number.
struct KeyProbe<'n> {
    key: &'n str,
}

impl<'de> DeserializeSeed<'de> for KeyProbe<'_> {
    type Value = Option<f64>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for KeyProbe<'_> {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an object containing \"{}\"", self.key)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(key) = map.next_key::<&str>()? {
            if key == self.key {
                // First occurrence wins; the tail of the object was
                // already validated by the shape pass.
                return map.next_value::<f64>().map(Some);
            }
            map.next_value::<IgnoredAny>()?;
        }
        Ok(None)
    }
}

/// Decodes one newline-terminated line (the terminator already stripped).
///
/// The value of each configured key is read in its own pass over the
/// object, so a non-numeric value skips only that channel instead of
/// rejecting the line.
pub fn decode(line: &[u8], names: &ChannelNames) -> LineOutcome {
    let line = line.trim_ascii();
    if line.is_empty() {
        return LineOutcome::Blank;
    }

    if serde_json_core::from_slice::<ObjectShape>(line).is_err() {
        return LineOutcome::BadJson;
    }

    let mut counts: ChannelCounts = [0; CHANNEL_COUNT];
    for (slot, key) in counts.iter_mut().zip(names.names) {
        let mut probe = Deserializer::new(line, None);
        if let Ok(Some(value)) = (KeyProbe { key }).deserialize(&mut probe) {
            *slot = (value as i32).clamp(0, MAX_LINE_COUNT) as u8;
        }
    }
    LineOutcome::Counts(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_legacy_keys() {
        assert_eq!(
            decode(br#"{"pill1":2,"pill3":1}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([2, 0, 1, 0])
        );
    }

    #[test]
    fn decodes_medication_labels() {
        assert_eq!(
            decode(
                br#"{"Fish Oil":3,"Tylenol":1}"#,
                &ChannelNames::MEDICATION_LABELS
            ),
            LineOutcome::Counts([0, 3, 0, 1])
        );
    }

    #[test]
    fn clamps_counts_to_twenty() {
        assert_eq!(
            decode(br#"{"pill1":25}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([20, 0, 0, 0])
        );
    }

    #[test]
    fn clamps_negative_counts_to_zero() {
        assert_eq!(
            decode(br#"{"pill2":-3}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([0, 0, 0, 0])
        );
    }

    #[test]
    fn skips_unknown_keys() {
        assert_eq!(
            decode(br#"{"pill9":5,"pill4":1}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([0, 0, 0, 1])
        );
    }

    #[test]
    fn skips_unknown_key_with_string_value() {
        assert_eq!(
            decode(br#"{"pill1":2,"note":"hi"}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([2, 0, 0, 0])
        );
    }

    #[test]
    fn skips_known_key_with_non_numeric_value() {
        assert_eq!(
            decode(br#"{"pill1":"two","pill2":3}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([0, 3, 0, 0])
        );
    }

    #[test]
    fn skips_bool_and_null_values() {
        assert_eq!(
            decode(
                br#"{"pill1":true,"pill2":null,"pill3":1}"#,
                &ChannelNames::LEGACY
            ),
            LineOutcome::Counts([0, 0, 1, 0])
        );
    }

    #[test]
    fn skips_nested_values() {
        assert_eq!(
            decode(br#"{"meta":{"tags":[1,2]},"pill4":1}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([0, 0, 0, 1])
        );
    }

    #[test]
    fn fractional_count_truncates() {
        assert_eq!(
            decode(br#"{"pill1":2.7}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([2, 0, 0, 0])
        );
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        assert_eq!(
            decode(br#"{"pill1":1,"pill1":5}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([1, 0, 0, 0])
        );
    }

    #[test]
    fn missing_keys_default_to_zero() {
        assert_eq!(
            decode(br#"{}"#, &ChannelNames::LEGACY),
            LineOutcome::Counts([0, 0, 0, 0])
        );
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(decode(b"", &ChannelNames::LEGACY), LineOutcome::Blank);
        assert_eq!(decode(b" \t\r", &ChannelNames::LEGACY), LineOutcome::Blank);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert_eq!(decode(b"not json", &ChannelNames::LEGACY), LineOutcome::BadJson);
        assert_eq!(decode(b"[1,2]", &ChannelNames::LEGACY), LineOutcome::BadJson);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(
            decode(b"  {\"pill1\":1}\r", &ChannelNames::LEGACY),
            LineOutcome::Counts([1, 0, 0, 0])
        );
    }
}
