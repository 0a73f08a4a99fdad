//! Name search over a subtree.

use super::Outline;
use crate::error::{OutlineError, OutlineResult};
use crate::model::item::OutlineItem;
use crate::transport::Transport;
use regex::{Regex, RegexBuilder};

/// Search behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Collect every match instead of stopping at the first one.
    pub match_all: bool,
    /// Case-sensitive whole-name equality instead of a regex search.
    pub exact: bool,
}

impl SearchOptions {
    pub fn all() -> Self {
        Self {
            match_all: true,
            exact: false,
        }
    }

    pub fn exact() -> Self {
        Self {
            match_all: false,
            exact: true,
        }
    }
}

enum Matcher<'p> {
    Exact(&'p str),
    Pattern(Regex),
}

impl Matcher<'_> {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => *expected == name,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

impl<T: Transport> Outline<T> {
    /// Searches item names in the subtree rooted at `from`, pre-order.
    ///
    /// Non-exact patterns are case-insensitive regular expressions
    /// matched anywhere in the name. Without `match_all` the first match
    /// wins; a match on `from` itself returns before its children are
    /// visited. No match yields an empty vector.
    ///
    /// # Errors
    /// - `NotFound` when `from` is unknown.
    /// - `Validation` when a non-exact pattern is not a valid regex.
    pub fn search(
        &self,
        from: &str,
        pattern: &str,
        options: SearchOptions,
    ) -> OutlineResult<Vec<&OutlineItem>> {
        let start = self.item(from)?;
        let matcher = if options.exact {
            Matcher::Exact(pattern)
        } else {
            Matcher::Pattern(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| {
                        OutlineError::Validation(format!("invalid search pattern: {err}"))
                    })?,
            )
        };

        let mut matches = Vec::new();
        let mut stack = vec![start];
        while let Some(item) = stack.pop() {
            if matcher.matches(&item.name) {
                matches.push(item);
                if !options.match_all {
                    break;
                }
            }
            stack.extend(
                item.children
                    .iter()
                    .rev()
                    .filter_map(|child_id| self.items.get(child_id)),
            );
        }
        Ok(matches)
    }
}
