// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The verb pattern language: literal words, `*` wildcards, and `{name}`
//! captures, compiled to a small AST and matched by hand. No regex engine
//! involved, so no escaping quirks.

use loam_var::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternCompileError {
    #[error("malformed braces in pattern token '{0}'")]
    MalformedBraces(String),
    #[error("empty capture name in pattern token '{0}'")]
    EmptyCaptureName(String),
    #[error("invalid capture name '{0}': word characters only")]
    InvalidCaptureName(String),
    #[error("duplicate capture name '{0}'")]
    DuplicateCaptureName(String),
}

/// One compiled template token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Matched case-insensitively and exactly against one input token.
    Literal(Symbol),
    /// Captures exactly one word token under the given name.
    Capture(String),
    /// `*`: one arbitrary token mid-template, any remainder when final.
    Rest,
}

/// A compiled verb pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbPattern {
    /// Empty source: legacy positional matching; any argument list accepted,
    /// arguments passed through unparsed.
    Positional,
    /// The bare `*` pattern: accepts any input, captures nothing.
    AnyInput,
    /// A token template mixing literals, wildcards and captures.
    Template(Vec<PatternToken>),
}

impl VerbPattern {
    /// Compile a pattern source string. Malformed `{}` usage fails here, at
    /// registration time, never at match time.
    pub fn compile(source: &str) -> Result<Self, PatternCompileError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(VerbPattern::Positional);
        }
        if source == "*" {
            return Ok(VerbPattern::AnyInput);
        }

        let mut tokens = Vec::new();
        let mut seen_captures = HashSet::new();
        for word in source.split_whitespace() {
            if word == "*" {
                tokens.push(PatternToken::Rest);
                continue;
            }
            if word.contains('{') || word.contains('}') {
                let Some(name) = word
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                else {
                    return Err(PatternCompileError::MalformedBraces(word.to_string()));
                };
                if name.contains('{') || name.contains('}') {
                    return Err(PatternCompileError::MalformedBraces(word.to_string()));
                }
                if name.is_empty() {
                    return Err(PatternCompileError::EmptyCaptureName(word.to_string()));
                }
                if !is_word_token(name) {
                    return Err(PatternCompileError::InvalidCaptureName(name.to_string()));
                }
                if !seen_captures.insert(Symbol::mk(name)) {
                    return Err(PatternCompileError::DuplicateCaptureName(name.to_string()));
                }
                tokens.push(PatternToken::Capture(name.to_string()));
                continue;
            }
            tokens.push(PatternToken::Literal(Symbol::mk(word)));
        }
        Ok(VerbPattern::Template(tokens))
    }

    /// Does this pattern bind any `{name}` variables?
    pub fn has_captures(&self) -> bool {
        match self {
            VerbPattern::Template(tokens) => tokens
                .iter()
                .any(|t| matches!(t, PatternToken::Capture(_))),
            _ => false,
        }
    }

    /// Match against an argument token list (the verb name already stripped).
    /// Returns the captured variables on success, `None` on no-match.
    pub fn match_args(&self, args: &[String]) -> Option<BTreeMap<String, String>> {
        let tokens = match self {
            VerbPattern::Positional | VerbPattern::AnyInput => return Some(BTreeMap::new()),
            VerbPattern::Template(tokens) => tokens,
        };

        let mut vars = BTreeMap::new();
        let mut i = 0;
        for (ti, token) in tokens.iter().enumerate() {
            match token {
                PatternToken::Literal(word) => {
                    if args.get(i).map(|a| Symbol::mk(a) == *word) != Some(true) {
                        return None;
                    }
                    i += 1;
                }
                PatternToken::Capture(name) => {
                    let arg = args.get(i)?;
                    if !is_word_token(arg) {
                        return None;
                    }
                    vars.insert(name.clone(), arg.clone());
                    i += 1;
                }
                PatternToken::Rest => {
                    if ti == tokens.len() - 1 {
                        // Trailing * swallows whatever remains, including nothing.
                        return Some(vars);
                    }
                    // Mid-template * consumes exactly one token.
                    args.get(i)?;
                    i += 1;
                }
            }
        }
        if i == args.len() { Some(vars) } else { None }
    }
}

/// A single whitespace-delimited word-character run: what a `{name}` capture
/// is allowed to swallow.
fn is_word_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
