//! Number-word constants.
//!
//! `zero` through `nineteen` are plain number constants; the tens words are
//! one-argument builtins adding a ones digit (`twenty(three)` is 23).

/// Words bound directly to number values.
pub(crate) const ONES_WORDS: &[(&str, f64)] = &[
    ("zero", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
    ("thirteen", 13.0),
    ("fourteen", 14.0),
    ("fifteen", 15.0),
    ("sixteen", 16.0),
    ("seventeen", 17.0),
    ("eighteen", 18.0),
    ("nineteen", 19.0),
];

/// Words bound to one-argument builtins: `word(n)` is `base + n`.
pub(crate) const TENS_WORDS: &[(&str, u16)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// The word for a tens base, for display and error messages.
pub(crate) fn tens_word(base: u16) -> &'static str {
    TENS_WORDS
        .iter()
        .find(|(_, b)| *b == base)
        .map_or("tens", |(word, _)| word)
}
