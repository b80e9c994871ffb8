//! Fuzzy "RANK NAME" lookup against the roster.
//!
//! Names arrive typed by hand, often with the words reordered ("Tan Wei Ming" vs.
//! "Wei Ming Tan") or slightly misspelled. The rank must match exactly; among rows of that
//! rank, each candidate is scored by the longest common substring between the query and
//! any concatenated permutation of the candidate's name tokens.

use itertools::Itertools;

use crate::roster::RosterTable;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Outcome of matching one query against the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// Exactly one row holds the best score.
    Unique(usize),
    /// Several rows tie for the best score; none is chosen.
    Ambiguous(Vec<usize>),
    NoMatch,
}

impl NameMatch {
    pub fn row(&self) -> Option<usize> {
        match self {
            NameMatch::Unique(row) => Some(*row),
            _ => None,
        }
    }

    /// Boolean mask over roster rows with at most one `true`.
    pub fn to_mask(&self, len: usize) -> Vec<bool> {
        let mut mask = vec![false; len];
        if let NameMatch::Unique(row) = self {
            if let Some(slot) = mask.get_mut(*row) {
                *slot = true;
            }
        }
        mask
    }
}

/// Resolves `query` ("RANK name tokens...") to at most one roster row.
///
/// Scores at or below `score_floor` are too weak to trust and yield `NoMatch`.
pub fn match_name(roster: &RosterTable, query: &str, score_floor: usize) -> NameMatch {
    let mut tokens = query.split_whitespace();
    let Some(rank) = tokens.next() else {
        return NameMatch::NoMatch;
    };
    let rank = rank.to_uppercase();
    let wanted: String = tokens.map(str::to_lowercase).collect();

    let scores: Vec<usize> = roster
        .rows()
        .iter()
        .map(|record| {
            if record.rank == rank {
                candidate_score(&record.name, &wanted)
            } else {
                0
            }
        })
        .collect();

    let best = scores.iter().copied().max().unwrap_or(0);
    if best <= score_floor {
        return NameMatch::NoMatch;
    }

    let winners: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score == best)
        .map(|(row, _)| row)
        .collect();

    match winners.as_slice() {
        [row] => NameMatch::Unique(*row),
        _ => {
            log_warn!("{query}: multiple names matched with score {best}");
            NameMatch::Ambiguous(winners)
        }
    }
}

/// Boolean-vector form of [`match_name`].
pub fn match_mask(roster: &RosterTable, query: &str, score_floor: usize) -> Vec<bool> {
    match_name(roster, query, score_floor).to_mask(roster.len())
}

/// Best longest-common-substring length over every ordering of the candidate's tokens.
///
/// A shared run inside some ordering spans a chain of distinct tokens: it may start inside
/// the first and end inside the last, but covers every token between them whole. So only
/// chains whose interior tokens appear back to back in `wanted` can score higher than their
/// prefixes, and the search stops extending a chain as soon as that fails.
fn candidate_score(candidate: &str, wanted: &str) -> usize {
    let tokens: Vec<String> = candidate
        .split_whitespace()
        .map(str::to_lowercase)
        .sorted()
        .collect();
    if tokens.is_empty() || wanted.is_empty() {
        return 0;
    }

    let total: usize = tokens.iter().map(|token| token.chars().count()).sum();
    let mut search = ChainSearch {
        used: vec![false; tokens.len()],
        tokens: &tokens,
        wanted,
        ceiling: total.min(wanted.chars().count()),
        best: 0,
    };
    search.extend(&mut Vec::new());
    search.best
}

struct ChainSearch<'a> {
    tokens: &'a [String],
    wanted: &'a str,
    /// No ordering can share more than this.
    ceiling: usize,
    used: Vec<bool>,
    best: usize,
}

impl ChainSearch<'_> {
    fn extend(&mut self, chain: &mut Vec<usize>) {
        for idx in 0..self.tokens.len() {
            if self.best >= self.ceiling {
                return;
            }
            // Tokens are sorted; equal tokens are taken in order so each chain is tried once.
            let repeat = idx > 0 && self.tokens[idx] == self.tokens[idx - 1] && !self.used[idx - 1];
            if self.used[idx] || repeat {
                continue;
            }

            chain.push(idx);
            self.used[idx] = true;

            let joined = self.concat(chain);
            self.best = self.best.max(longest_common_substring(&joined, self.wanted));
            let interior = self.concat(&chain[1..]);
            if self.wanted.contains(interior.as_str()) {
                self.extend(chain);
            }

            self.used[idx] = false;
            chain.pop();
        }
    }

    fn concat(&self, chain: &[usize]) -> String {
        chain.iter().map(|&idx| self.tokens[idx].as_str()).join("")
    }
}

/// Length in chars of the longest contiguous run shared by `a` and `b`.
pub fn longest_common_substring(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    let mut best = 0;

    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb { previous[j] + 1 } else { 0 };
            best = best.max(current[j + 1]);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}
