//! German five-minute clock phrases
//!
//! Maps a clock reading to the words a German speaker would use to tell the
//! time: "fünf nach zehn", "kurz vor halb elf", "zwölf uhr".

use heapless::Vec;

/// Hour names indexed by the 12-hour wall value. Index 0 and 12 both read
/// "zwölf" (noon and midnight).
const HOUR_NAMES: [&str; 13] = [
    "zwölf", "eins", "zwei", "drei", "vier", "fünf", "sechs", "sieben", "acht", "neun", "zehn",
    "elf", "zwölf",
];

/// Longest phrase the table produces ("kurz vor halb elf").
pub const MAX_TOKENS: usize = 4;

/// Which paint a token is drawn with.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The token naming the hour
    HourWord,
    /// Connectors: "nach", "vor", "halb", "kurz", "uhr", minute words
    FillerWord,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhraseToken {
    pub text: &'static str,
    pub role: Role,
}

impl PhraseToken {
    const fn filler(text: &'static str) -> Self {
        Self {
            text,
            role: Role::FillerWord,
        }
    }

    const fn hour(text: &'static str) -> Self {
        Self {
            text,
            role: Role::HourWord,
        }
    }
}

/// Ordered words for a single frame. Always 2, 3 or 4 tokens long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    tokens: Vec<PhraseToken, MAX_TOKENS>,
}

impl Phrase {
    fn new(tokens: &[PhraseToken]) -> Self {
        debug_assert!((2..=MAX_TOKENS).contains(&tokens.len()));
        Self {
            // The table never builds more than MAX_TOKENS words
            tokens: Vec::from_slice(tokens).unwrap_or_default(),
        }
    }

    pub fn tokens(&self) -> &[PhraseToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Plain words, handy for logging and tests
    pub fn words(&self) -> Vec<&'static str, MAX_TOKENS> {
        self.tokens.iter().map(|token| token.text).collect()
    }
}

/// Name of an hour on a 12-hour dial.
///
/// Hours above 12 wrap around (13 is "eins"), 0 and 12 are both "zwölf".
pub fn hour_name(hour: u32) -> &'static str {
    let hour = hour % 24;
    let index = if hour > 12 { hour - 12 } else { hour };
    HOUR_NAMES[index as usize]
}

/// Translate a clock reading into its German phrase.
///
/// `hour` is the 12-hour wall value, `minute` is 0-59. Minutes outside the
/// eleven five-minute windows (58, 59, 0, 1, 2) read as "<hour> uhr".
pub fn phrase_for(hour: u32, minute: u32) -> Phrase {
    let hour = hour % 24;
    let this_hour = PhraseToken::hour(hour_name(hour));
    let next_hour = PhraseToken::hour(hour_name(hour + 1));
    let f = PhraseToken::filler;

    match minute {
        3..=6 => Phrase::new(&[f("fünf"), f("nach"), this_hour]),
        7..=12 => Phrase::new(&[f("zehn"), f("nach"), this_hour]),
        13..=17 => Phrase::new(&[f("viertel"), f("nach"), this_hour]),
        18..=22 => Phrase::new(&[f("zwanzig"), f("nach"), this_hour]),
        23..=27 => Phrase::new(&[f("kurz"), f("vor"), f("halb"), next_hour]),
        28..=32 => Phrase::new(&[f("halb"), next_hour]),
        33..=37 => Phrase::new(&[f("kurz"), f("nach"), f("halb"), next_hour]),
        38..=42 => Phrase::new(&[f("zwanzig"), f("vor"), next_hour]),
        43..=47 => Phrase::new(&[f("viertel"), f("vor"), next_hour]),
        48..=52 => Phrase::new(&[f("zehn"), f("vor"), next_hour]),
        53..=57 => Phrase::new(&[f("fünf"), f("vor"), next_hour]),
        _ => Phrase::new(&[this_hour, f("uhr")]),
    }
}
