//! Spoken-number normalisation for phone extraction.
//!
//! Callers read phone numbers out digit by digit, in English or Danish. Danish
//! says two-digit numbers ones-first ("fire-og-halvtreds", four-and-fifty, is
//! 54), which the speech recogniser renders as a hyphenated pair such as
//! "four-fifty". Tens words therefore map to their tens digit only, and a
//! hyphenated ones/tens pair is emitted tens digit first.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const DIGITS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("nul", "0"),
    ("one", "1"),
    ("en", "1"),
    ("et", "1"),
    ("two", "2"),
    ("to", "2"),
    ("three", "3"),
    ("tre", "3"),
    ("four", "4"),
    ("fire", "4"),
    ("five", "5"),
    ("fem", "5"),
    ("six", "6"),
    ("seks", "6"),
    ("seven", "7"),
    ("syv", "7"),
    ("eight", "8"),
    ("otte", "8"),
    ("nine", "9"),
    ("ni", "9"),
];

const TEENS: &[(&str, &str)] = &[
    ("ten", "10"),
    ("ti", "10"),
    ("eleven", "11"),
    ("elleve", "11"),
    ("twelve", "12"),
    ("tolv", "12"),
    ("thirteen", "13"),
    ("tretten", "13"),
    ("fourteen", "14"),
    ("fjorten", "14"),
    ("fifteen", "15"),
    ("femten", "15"),
    ("sixteen", "16"),
    ("seksten", "16"),
    ("seventeen", "17"),
    ("sytten", "17"),
    ("eighteen", "18"),
    ("atten", "18"),
    ("nineteen", "19"),
    ("nitten", "19"),
];

const TENS: &[(&str, &str)] = &[
    ("twenty", "2"),
    ("tyve", "2"),
    ("thirty", "3"),
    ("tredive", "3"),
    ("forty", "4"),
    ("fyrre", "4"),
    ("fifty", "5"),
    ("halvtreds", "5"),
    ("sixty", "6"),
    ("tres", "6"),
    ("seventy", "7"),
    ("halvfjerds", "7"),
    ("eighty", "8"),
    ("firs", "8"),
    ("ninety", "9"),
    ("halvfems", "9"),
];

fn number_words() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    DIGITS.iter().chain(TEENS).chain(TENS)
}

fn digits_for(word: &str) -> Option<&'static str> {
    number_words()
        .find(|(w, _)| *w == word)
        .map(|(_, digits)| *digits)
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("built-in number pattern is valid")
}

/// A hyphenated pair followed by up to eight more spoken words.
static SPOKEN_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(\w+)-(\w+)(\s+(?:\w+\s*){1,8})"));
static HYPHEN_PAIR: LazyLock<Regex> = LazyLock::new(|| pattern(r"(\w+)-(\w+)"));
static NUMBER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = number_words()
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join("|");
    pattern(&format!(r"\b(?:{alternation})\b"))
});
static TOKEN: LazyLock<Regex> = LazyLock::new(|| pattern(r"\w+"));
static WORD: LazyLock<Regex> = LazyLock::new(|| pattern(r"(\w+)"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+"));

/// Rewrites spoken number words in `text` as digits. The result is lowercase;
/// digits already present and unrecognised words pass through untouched.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();

    let phrased = SPOKEN_PHRASE.replace_all(&lowered, |caps: &Captures| {
        match (digits_for(&caps[1]), digits_for(&caps[2])) {
            (Some(ones), Some(tens)) => format!("{tens}{ones}{}", respace(&caps[3])),
            _ => caps[0].to_string(),
        }
    });

    let paired = HYPHEN_PAIR.replace_all(&phrased, |caps: &Captures| {
        match (digits_for(&caps[1]), digits_for(&caps[2])) {
            (Some(ones), Some(tens)) => format!("{tens}{ones}"),
            _ => caps[0].to_string(),
        }
    });

    let substituted = NUMBER_WORD.replace_all(&paired, |caps: &Captures| {
        digits_for(&caps[0]).unwrap_or_default().to_string()
    });

    TOKEN
        .replace_all(&substituted, |caps: &Captures| {
            split_fused(&caps[0]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Puts exactly one space around every word of the trailing window.
fn respace(rest: &str) -> String {
    let padded = WORD.replace_all(rest.trim(), " ${1} ");
    WHITESPACE.replace_all(&padded, " ").into_owned()
}

/// "sixseven" -> "6 7". A word fused with itself is left alone.
fn split_fused(token: &str) -> Option<String> {
    number_words().find_map(|(first, first_digits)| {
        let rest = token.strip_prefix(first)?;
        if rest == *first {
            return None;
        }
        digits_for(rest).map(|rest_digits| format!("{first_digits} {rest_digits}"))
    })
}
