// SPDX-License-Identifier: MIT
//! Restricted alphabets for bit-packed character content
//!
//! Text drawn from a small known character set is written as a sequence of
//! fixed-width codes instead of UTF-8. With an alphabet of `n` characters each
//! character takes `ceil(log2(n + 1))` bits: codes are 1-based positions in
//! the alphabet and the all-zero code terminates the sequence, which also
//! pads the final octet.

use std::collections::{BTreeMap, HashMap};

/// Identifier of the built-in numeric alphabet
pub const NUMERIC_ALPHABET: u8 = 0;

/// Identifier of the built-in date and time alphabet
pub const DATE_TIME_ALPHABET: u8 = 1;

/// Characters of the built-in numeric alphabet
pub const NUMERIC_CHARACTERS: &str = "0123456789-+.E ";

/// Characters of the built-in date and time alphabet
pub const DATE_TIME_CHARACTERS: &str = "0123456789-:TZ ";

/// Errors raised by restricted alphabets and their table
#[derive(Debug, thiserror::Error)]
pub enum AlphabetError {
    #[error("Unknown restricted alphabet: {0}")]
    UnknownAlphabet(u8),

    #[error("Restricted alphabet identifier {0} collides with a built-in alphabet")]
    ReservedIdentifier(u8),

    #[error("Restricted alphabet identifier {0} is already registered")]
    DuplicateRegistration(u8),

    #[error("Restricted alphabet contains {0:?} more than once")]
    DuplicateCharacter(char),

    #[error("Restricted alphabet must contain at least two characters")]
    TooFewCharacters,

    #[error("Character {character:?} is not in restricted alphabet {alphabet}")]
    CharacterNotInAlphabet { alphabet: u8, character: char },

    #[error("Code {code} is outside restricted alphabet {alphabet}")]
    InvalidCode { alphabet: u8, code: u32 },
}

/// An ordered set of distinct characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedAlphabet {
    characters: Vec<char>,
    positions: HashMap<char, u32>,
    bits_per_character: u32,
}

impl RestrictedAlphabet {
    pub fn new(characters: &str) -> Result<Self, AlphabetError> {
        let characters: Vec<char> = characters.chars().collect();
        if characters.len() < 2 {
            return Err(AlphabetError::TooFewCharacters);
        }

        let mut positions = HashMap::with_capacity(characters.len());
        for (i, c) in characters.iter().enumerate() {
            if positions.insert(*c, i as u32 + 1).is_some() {
                return Err(AlphabetError::DuplicateCharacter(*c));
            }
        }

        // Codes 1..=n plus the zero terminator
        let bits_per_character = u32::BITS - (characters.len() as u32).leading_zeros();

        Ok(Self {
            characters,
            positions,
            bits_per_character,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    #[inline]
    pub fn bits_per_character(&self) -> u32 {
        self.bits_per_character
    }

    pub fn characters(&self) -> String {
        self.characters.iter().collect()
    }

    pub fn contains(&self, c: char) -> bool {
        self.positions.contains_key(&c)
    }

    /// Pack `text` into octets; `id` only labels errors
    ///
    /// Nothing is produced if any character is outside the alphabet.
    pub fn encode(&self, id: u8, text: &str) -> Result<Vec<u8>, AlphabetError> {
        let width = self.bits_per_character;
        let mut octets = Vec::with_capacity((text.len() * width as usize).div_ceil(8));
        let mut accumulator: u32 = 0;
        let mut pending_bits = 0;

        for c in text.chars() {
            let code = *self
                .positions
                .get(&c)
                .ok_or(AlphabetError::CharacterNotInAlphabet {
                    alphabet: id,
                    character: c,
                })?;
            accumulator = (accumulator << width) | code;
            pending_bits += width;
            while pending_bits >= 8 {
                pending_bits -= 8;
                octets.push((accumulator >> pending_bits) as u8);
            }
            accumulator &= (1 << pending_bits) - 1;
        }

        if pending_bits > 0 {
            octets.push((accumulator << (8 - pending_bits)) as u8);
        }
        Ok(octets)
    }

    /// Unpack codes until the terminator or the end of the octets
    pub fn decode(&self, id: u8, octets: &[u8]) -> Result<String, AlphabetError> {
        let width = self.bits_per_character;
        let mask = (1u32 << width) - 1;
        let mut text = String::with_capacity(octets.len() * 8 / width as usize);
        let mut accumulator: u32 = 0;
        let mut available = 0;

        for octet in octets {
            accumulator = (accumulator << 8) | *octet as u32;
            available += 8;
            while available >= width {
                available -= width;
                let code = (accumulator >> available) & mask;
                if code == 0 {
                    return Ok(text);
                }
                let c = self
                    .characters
                    .get(code as usize - 1)
                    .ok_or(AlphabetError::InvalidCode { alphabet: id, code })?;
                text.push(*c);
            }
            accumulator &= (1 << available) - 1;
        }
        Ok(text)
    }
}

/// Identifier-indexed restricted alphabets
///
/// Identifiers 0 and 1 are the built-in numeric and date-time alphabets;
/// callers register their own under any other identifier.
#[derive(Debug, Clone)]
pub struct AlphabetTable {
    numeric: RestrictedAlphabet,
    date_time: RestrictedAlphabet,
    registered: BTreeMap<u8, RestrictedAlphabet>,
}

impl AlphabetTable {
    pub fn new() -> Self {
        Self {
            numeric: builtin(NUMERIC_CHARACTERS),
            date_time: builtin(DATE_TIME_CHARACTERS),
            registered: BTreeMap::new(),
        }
    }

    pub fn register_alphabet(&mut self, id: u8, characters: &str) -> Result<(), AlphabetError> {
        if id == NUMERIC_ALPHABET || id == DATE_TIME_ALPHABET {
            return Err(AlphabetError::ReservedIdentifier(id));
        }
        if self.registered.contains_key(&id) {
            return Err(AlphabetError::DuplicateRegistration(id));
        }

        let alphabet = RestrictedAlphabet::new(characters)?;
        tracing::debug!(id, size = alphabet.len(), "registered restricted alphabet");
        self.registered.insert(id, alphabet);
        Ok(())
    }

    pub fn get(&self, id: u8) -> Result<&RestrictedAlphabet, AlphabetError> {
        match id {
            NUMERIC_ALPHABET => Ok(&self.numeric),
            DATE_TIME_ALPHABET => Ok(&self.date_time),
            _ => self
                .registered
                .get(&id)
                .ok_or(AlphabetError::UnknownAlphabet(id)),
        }
    }

    pub fn encode(&self, id: u8, text: &str) -> Result<Vec<u8>, AlphabetError> {
        self.get(id)?.encode(id, text)
    }

    pub fn decode(&self, id: u8, octets: &[u8]) -> Result<String, AlphabetError> {
        self.get(id)?.decode(id, octets)
    }
}

impl Default for AlphabetTable {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin(characters: &str) -> RestrictedAlphabet {
    match RestrictedAlphabet::new(characters) {
        Ok(alphabet) => alphabet,
        Err(_) => unreachable!("built-in alphabets have distinct characters"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_width() {
        assert_eq!(RestrictedAlphabet::new("ab").unwrap().bits_per_character(), 2);
        assert_eq!(RestrictedAlphabet::new("abc").unwrap().bits_per_character(), 2);
        assert_eq!(RestrictedAlphabet::new("abcd").unwrap().bits_per_character(), 3);
        assert_eq!(
            RestrictedAlphabet::new(NUMERIC_CHARACTERS).unwrap().bits_per_character(),
            4
        );
    }

    #[test]
    fn test_numeric_packing() {
        let table = AlphabetTable::new();
        // '1' -> 2, '2' -> 3, '3' -> 4, then zero padding
        let octets = table.encode(NUMERIC_ALPHABET, "123").unwrap();
        assert_eq!(octets, vec![0x23, 0x40]);
        assert_eq!(table.decode(NUMERIC_ALPHABET, &octets).unwrap(), "123");
    }

    #[test]
    fn test_round_trip_odd_widths() {
        let mut table = AlphabetTable::new();
        table.register_alphabet(5, "acgt").unwrap();
        for text in ["", "a", "gattaca", "ttttttttttttttttt"] {
            let octets = table.encode(5, text).unwrap();
            assert_eq!(octets.len(), (text.len() * 3).div_ceil(8));
            assert_eq!(table.decode(5, &octets).unwrap(), text);
        }
    }

    #[test]
    fn test_date_time_round_trip() {
        let table = AlphabetTable::new();
        let text = "2024-02-29T23:59:01Z";
        let octets = table.encode(DATE_TIME_ALPHABET, text).unwrap();
        assert_eq!(octets.len(), 10);
        assert_eq!(table.decode(DATE_TIME_ALPHABET, &octets).unwrap(), text);
    }

    #[test]
    fn test_character_not_in_alphabet() {
        let table = AlphabetTable::new();
        let result = table.encode(NUMERIC_ALPHABET, "12x4");
        assert!(matches!(
            result,
            Err(AlphabetError::CharacterNotInAlphabet {
                alphabet: NUMERIC_ALPHABET,
                character: 'x'
            })
        ));
    }

    #[test]
    fn test_registration_rules() {
        let mut table = AlphabetTable::new();
        assert!(matches!(
            table.register_alphabet(NUMERIC_ALPHABET, "xy"),
            Err(AlphabetError::ReservedIdentifier(0))
        ));
        assert!(matches!(
            table.register_alphabet(DATE_TIME_ALPHABET, "xy"),
            Err(AlphabetError::ReservedIdentifier(1))
        ));
        assert!(matches!(
            table.register_alphabet(7, "xyx"),
            Err(AlphabetError::DuplicateCharacter('x'))
        ));
        table.register_alphabet(7, "xyz").unwrap();
        assert!(matches!(
            table.register_alphabet(7, "pq"),
            Err(AlphabetError::DuplicateRegistration(7))
        ));
        assert!(matches!(table.get(8), Err(AlphabetError::UnknownAlphabet(8))));
    }

    #[test]
    fn test_invalid_code_rejected() {
        let mut table = AlphabetTable::new();
        // 3-bit codes, only 1..=5 map to characters
        table.register_alphabet(4, "abcde").unwrap();
        assert!(matches!(
            table.decode(4, &[0b1110_0000]),
            Err(AlphabetError::InvalidCode { alphabet: 4, code: 7 })
        ));
    }

    #[test]
    fn test_multibyte_characters() {
        let mut table = AlphabetTable::new();
        table.register_alphabet(20, "αβγ").unwrap();
        let octets = table.encode(20, "γαβ").unwrap();
        assert_eq!(table.decode(20, &octets).unwrap(), "γαβ");
    }
}
