//! Email address rewriting.

use std::collections::BTreeMap;

/// Rewrites email addresses by literal substring.
///
/// Keys are tried in sorted order; the first key found in an address is
/// replaced once and no further keys are applied.
#[derive(Debug, Clone, Default)]
pub struct EmailAliases {
    aliases: BTreeMap<String, String>,
}

impl EmailAliases {
    /// Creates a rewriter from a key → replacement table.
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        let aliases = aliases.into_iter().filter(|(k, _)| !k.is_empty()).collect();
        Self { aliases }
    }

    /// Returns the rewritten address.
    pub fn rewrite(&self, email: &str) -> String {
        self.aliases
            .iter()
            .find(|(from, _)| email.contains(from.as_str()))
            .map_or_else(
                || email.to_string(),
                |(from, to)| email.replacen(from.as_str(), to, 1),
            )
    }
}
