//! Code 128, code set B.
//!
//! Set B covers printable ASCII (0x20..=0x7E), which is everything a serial
//! number can contain. Every symbol is three bars and three spaces spanning
//! eleven modules; the stop symbol adds a final two-module bar.

use super::ArtifactError;

const START_B: u8 = 104;
const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];
const CHECKSUM_MODULUS: u32 = 103;

/// Bar/space widths for symbol values 0..=105, bar first.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3], [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2], [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2], [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2], [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2], [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1], [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3], [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1], [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3], [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1], [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4], [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2], [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1], [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1], [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2], [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1], [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1], [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2], [2, 1, 1, 2, 1, 4], [2, 1, 1, 2, 3, 2],
];

/// Modules per data, start and checksum symbol.
pub const SYMBOL_MODULES: usize = 11;
/// Modules in the stop symbol including its termination bar.
pub const STOP_MODULES: usize = 13;

/// Set B value of a character, if it has one.
fn value_of(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' => Some(ch as u8 - b' '),
        _ => None,
    }
}

/// Weighted modulo-103 checksum over the start symbol and the data values.
pub fn checksum(values: &[u8]) -> u8 {
    let weighted = values
        .iter()
        .enumerate()
        .fold(u32::from(START_B), |acc, (i, v)| {
            (acc + u32::from(*v) * (i as u32 + 1)) % CHECKSUM_MODULUS
        });
    // weighted < 103
    weighted as u8
}

fn push_widths(modules: &mut Vec<bool>, widths: &[u8]) {
    for (i, width) in widths.iter().enumerate() {
        let bar = i % 2 == 0;
        modules.extend(std::iter::repeat(bar).take(usize::from(*width)));
    }
}

/// Encodes `payload` into a run of modules, `true` for bar and `false` for
/// space. Quiet zones are the renderer's concern.
pub fn encode(payload: &str) -> Result<Vec<bool>, ArtifactError> {
    if payload.is_empty() {
        return Err(ArtifactError::EmptyPayload);
    }

    let values = payload
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            value_of(ch).ok_or(ArtifactError::UnsupportedCharacter { ch, position })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let check = checksum(&values);
    let mut modules =
        Vec::with_capacity(SYMBOL_MODULES * (values.len() + 2) + STOP_MODULES);

    push_widths(&mut modules, &PATTERNS[usize::from(START_B)]);
    for value in &values {
        push_widths(&mut modules, &PATTERNS[usize::from(*value)]);
    }
    push_widths(&mut modules, &PATTERNS[usize::from(check)]);
    push_widths(&mut modules, &STOP);

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn every_pattern_spans_eleven_modules() {
        for (value, widths) in PATTERNS.iter().enumerate() {
            let total: u32 = widths.iter().map(|w| u32::from(*w)).sum();
            assert_eq!(total, SYMBOL_MODULES as u32, "pattern {}", value);
        }
        let stop: u32 = STOP.iter().map(|w| u32::from(*w)).sum();
        assert_eq!(stop, STOP_MODULES as u32);
    }

    #[test]
    fn patterns_are_distinct() {
        let unique: std::collections::HashSet<_> = PATTERNS.iter().collect();
        assert_eq!(unique.len(), PATTERNS.len());
    }

    #[test]
    fn patterns_match_published_symbols() {
        let published: [(usize, [u8; 6]); 10] = [
            (0, [2, 1, 2, 2, 2, 2]),
            (13, [1, 2, 2, 1, 3, 2]),
            (33, [1, 1, 1, 3, 2, 3]),
            (40, [2, 3, 1, 1, 1, 3]),
            (63, [1, 1, 1, 2, 2, 4]),
            (64, [1, 1, 1, 4, 2, 2]),
            (102, [4, 1, 1, 1, 3, 1]),
            (103, [2, 1, 1, 4, 1, 2]),
            (104, [2, 1, 1, 2, 1, 4]),
            (105, [2, 1, 1, 2, 3, 2]),
        ];
        for (value, widths) in published {
            assert_eq!(PATTERNS[value], widths, "symbol {}", value);
        }
    }

    #[test]
    fn checksum_matches_known_values() {
        let values = |s: &str| s.chars().filter_map(value_of).collect::<Vec<_>>();
        assert_eq!(checksum(&values("A")), 34);
        assert_eq!(checksum(&values("PJJ123C")), 55);
        assert_eq!(checksum(&values("HQ-ELEC-RM1-001")), 60);
    }

    #[test]
    fn encoded_length_and_framing() {
        let serial = "HQ-ELEC-RM1-001";
        let modules = encode(serial).unwrap();
        assert_eq!(
            modules.len(),
            SYMBOL_MODULES * (serial.len() + 2) + STOP_MODULES
        );
        // Starts on a bar and ends on the termination bar
        assert!(modules[0]);
        assert!(modules[modules.len() - 1]);
        assert!(modules[modules.len() - 2]);
        // Start B is 211214
        assert_eq!(
            &modules[..11],
            &[true, true, false, true, false, false, true, false, false, false, false]
        );
    }

    #[test]
    fn rejects_characters_outside_set_b() {
        assert_matches!(
            encode("HQ-É-001"),
            Err(ArtifactError::UnsupportedCharacter { ch: 'É', position: 3 })
        );
        assert_matches!(encode("tab\there"), Err(ArtifactError::UnsupportedCharacter { .. }));
        assert_matches!(encode(""), Err(ArtifactError::EmptyPayload));
    }
}
