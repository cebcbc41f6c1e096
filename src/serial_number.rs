//! Serial numbers have the shape `{location}-{category}-{sublocation}-{sequence}`.
//!
//! The sequence is assigned once at registration and carried unchanged through
//! every relocation; only the code segments around it are rewritten.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationError;

/// Minimum width of a freshly assigned sequence; larger counts widen.
pub const SEQUENCE_WIDTH: usize = 3;

/// Used when an existing serial has no usable trailing segment.
pub const DEFAULT_SEQUENCE: &str = "001";

pub const SEGMENT_SEPARATOR: char = '-';

/// Longest code accepted by the registry.
pub const MAX_CODE_LEN: usize = 10;

/// The trailing segment of a serial number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence(String);

impl Sequence {
    /// Sequence for a new asset when `existing` assets already share its
    /// (category, subcategory) pair.
    pub fn next_after(existing: u64) -> Self {
        Sequence(format!(
            "{:0width$}",
            existing.saturating_add(1),
            width = SEQUENCE_WIDTH
        ))
    }

    /// Sequence carried forward from an existing serial number, byte for byte,
    /// even when it is not numeric.
    pub fn carried_from(serial: &str) -> Self {
        match serial.rsplit(SEGMENT_SEPARATOR).next() {
            Some(segment) if !segment.is_empty() => Sequence(segment.to_string()),
            _ => Sequence(DEFAULT_SEQUENCE.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn compose(
        location_code: &str,
        category_code: &str,
        sublocation_code: &str,
        sequence: &Sequence,
    ) -> Self {
        SerialNumber(format!(
            "{}{sep}{}{sep}{}{sep}{}",
            location_code,
            category_code,
            sublocation_code,
            sequence.as_str(),
            sep = SEGMENT_SEPARATOR
        ))
    }

    pub fn sequence(&self) -> Sequence {
        Sequence::carried_from(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

/// String form of [`SerialNumber::compose`].
pub fn generate(
    location_code: &str,
    category_code: &str,
    sublocation_code: &str,
    sequence: &str,
) -> String {
    SerialNumber::compose(
        location_code,
        category_code,
        sublocation_code,
        &Sequence(sequence.to_string()),
    )
    .into_string()
}

/// Registry codes become serial segments and barcode file names, so they are
/// limited to ASCII letters, digits and underscores.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    let well_formed = !code.is_empty()
        && code.len() <= MAX_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("code");
        err.message = Some(
            format!(
                "Code must be 1-{} characters of A-Z, a-z, 0-9 or _",
                MAX_CODE_LEN
            )
            .into(),
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "001")]
    #[case(8, "009")]
    #[case(41, "042")]
    #[case(998, "999")]
    #[case(999, "1000")]
    #[case(12_344, "12345")]
    fn next_after_pads_to_three_and_widens(#[case] existing: u64, #[case] expected: &str) {
        assert_eq!(Sequence::next_after(existing).as_str(), expected);
    }

    #[rstest]
    #[case("HQ-ELEC-RM1-001", "001")]
    #[case("HQ-ELEC-RM1-1000", "1000")]
    #[case("HQ-ELEC-RM1-A7", "A7")]
    #[case("LEGACY42", "LEGACY42")]
    #[case("", DEFAULT_SEQUENCE)]
    #[case("HQ-ELEC-RM1-", DEFAULT_SEQUENCE)]
    fn carried_from_takes_last_segment(#[case] serial: &str, #[case] expected: &str) {
        assert_eq!(Sequence::carried_from(serial).as_str(), expected);
    }

    #[test]
    fn compose_joins_segments_in_order() {
        let serial = SerialNumber::compose("HQ", "ELEC", "RM1", &Sequence::next_after(0));
        assert_eq!(serial.as_str(), "HQ-ELEC-RM1-001");
        assert_eq!(generate("BR2", "ELEC", "RM5", "001"), "BR2-ELEC-RM5-001");
    }

    #[test]
    fn relocation_keeps_sequence_bytes() {
        let original = SerialNumber::compose("HQ", "ELEC", "RM1", &Sequence::next_after(6));
        let moved = SerialNumber::compose("BR2", "ELEC", "RM5", &original.sequence());
        assert_eq!(moved.as_str(), "BR2-ELEC-RM5-007");
    }

    #[rstest]
    #[case("HQ", true)]
    #[case("ELEC_2", true)]
    #[case("ABCDEFGHIJ", true)]
    #[case("", false)]
    #[case("ABCDEFGHIJK", false)]
    #[case("H-Q", false)]
    #[case("../x", false)]
    #[case("RM 1", false)]
    fn code_validation(#[case] code: &str, #[case] ok: bool) {
        assert_eq!(validate_code(code).is_ok(), ok);
    }

    proptest! {
        #[test]
        fn fresh_sequences_parse_back(existing in 0u64..1_000_000) {
            let seq = Sequence::next_after(existing);
            prop_assert!(seq.as_str().len() >= SEQUENCE_WIDTH);
            prop_assert_eq!(seq.as_str().parse::<u64>().unwrap(), existing + 1);
        }

        #[test]
        fn sequence_survives_any_valid_codes(
            loc in "[A-Z0-9_]{1,10}",
            cat in "[A-Z0-9_]{1,10}",
            sub in "[A-Z0-9_]{1,10}",
            existing in 0u64..5_000,
        ) {
            let seq = Sequence::next_after(existing);
            let serial = SerialNumber::compose(&loc, &cat, &sub, &seq);
            prop_assert_eq!(serial.sequence(), seq);
        }
    }
}
