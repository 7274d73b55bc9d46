//! Which of the listed repositories a batch should touch

use crate::git::Repository;

// Guard against inputs such as "1-999999999"
const MAX_RANGE_SPAN: usize = 10_000;

/// Caller's choice over the numbered list of repositories needing attention
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every listed repository
    All,
    /// 1-based positions into the displayed list, first occurrence order
    Indices(Vec<usize>),
    /// Nothing; the batch is not run
    None,
}

impl Selection {
    /// Parses user input such as `all`, `1 3`, `2,4-6` or an empty line
    ///
    /// Returns the selection plus every token that could not be understood.
    pub fn parse(input: &str) -> (Selection, Vec<String>) {
        let trimmed = input.trim().to_lowercase();
        match trimmed.as_str() {
            "a" | "all" | "*" => return (Selection::All, Vec::new()),
            "" | "n" | "no" | "none" | "q" | "quit" => return (Selection::None, Vec::new()),
            _ => {}
        }

        let mut indices: Vec<usize> = Vec::new();
        let mut invalid = Vec::new();

        for token in trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match parse_token(token) {
                Some(values) => {
                    for value in values {
                        if !indices.contains(&value) {
                            indices.push(value);
                        }
                    }
                }
                None => invalid.push(token.to_string()),
            }
        }

        if indices.is_empty() {
            (Selection::None, invalid)
        } else {
            (Selection::Indices(indices), invalid)
        }
    }

    /// Picks the selected repositories out of `candidates`, in selection order
    ///
    /// Indices outside `1..=candidates.len()` are returned as ignored rather
    /// than failing the whole selection.
    pub fn resolve<'a>(&self, candidates: &[&'a Repository]) -> (Vec<&'a Repository>, Vec<usize>) {
        match self {
            Selection::All => (candidates.to_vec(), Vec::new()),
            Selection::None => (Vec::new(), Vec::new()),
            Selection::Indices(indices) => {
                let mut selected = Vec::new();
                let mut ignored = Vec::new();
                for &index in indices {
                    match index.checked_sub(1).and_then(|i| candidates.get(i)) {
                        Some(repo) => selected.push(*repo),
                        None => ignored.push(index),
                    }
                }
                (selected, ignored)
            }
        }
    }
}

fn parse_token(token: &str) -> Option<Vec<usize>> {
    if let Some((start, end)) = token.split_once('-') {
        let start: usize = start.parse().ok()?;
        let end: usize = end.parse().ok()?;
        if start > end || end - start > MAX_RANGE_SPAN {
            return None;
        }
        return Some((start..=end).collect());
    }
    token.parse().ok().map(|value| vec![value])
}
