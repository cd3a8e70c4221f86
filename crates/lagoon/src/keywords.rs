//! Keyword tables for the parser collaborator and the root namespace.
//!
//! The `function` keyword accepts any nonempty subsequence of its letters
//! (`fuct`, `uncton`, `fn`, …); the full alias set is precomputed once.

use std::sync::OnceLock;

use ahash::AHashSet;

/// Reserved words preloaded into the root namespace as keyword values.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "class",
    "className",
    "after",
    "const",
    "var",
    "when",
    "if",
    "async",
    "return",
    "delete",
    "await",
    "previous",
    "next",
    "reverse",
    "export",
    "import",
];

/// Every accepted alias of the `function` keyword: all nonempty subsequences
/// of the letters of `function`, plus the bare token `fn`.
pub fn function_keywords() -> &'static AHashSet<Box<str>> {
    static ALIASES: OnceLock<AHashSet<Box<str>>> = OnceLock::new();
    ALIASES.get_or_init(|| {
        const WORD: &[u8] = b"function";
        let mut aliases = AHashSet::new();
        for mask in 1u32..(1 << WORD.len()) {
            let subsequence: String = WORD
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, &c)| c as char)
                .collect();
            aliases.insert(subsequence.into_boxed_str());
        }
        aliases.insert("fn".into());
        aliases
    })
}

/// True when `word` is an accepted way of spelling `function`.
#[must_use]
pub fn is_function_alias(word: &str) -> bool {
    function_keywords().contains(word)
}
