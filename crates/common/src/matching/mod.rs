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

//! Tokenization of raw command input and the verb pattern language.

mod pattern;

pub use pattern::{PatternCompileError, PatternToken, VerbPattern};

/// Split a raw input line into words. Double quotes group words; backslash
/// escapes the next character. Unterminated quotes run to end of line.
pub fn parse_into_words(input: &str) -> Vec<String> {
    let mut in_quotes = false;
    let mut previous_char_was_backslash = false;

    let accumulate_words = |mut acc: Vec<String>, c| {
        if previous_char_was_backslash {
            if let Some(last_word) = acc.last_mut() {
                last_word.push(c);
            } else {
                acc.push(c.to_string());
            }
            previous_char_was_backslash = false;
        } else if c == '\\' {
            previous_char_was_backslash = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if c.is_whitespace() && !in_quotes {
            if let Some(last_word) = acc.last()
                && !last_word.is_empty()
            {
                acc.push(String::new());
            }
        } else if let Some(last_word) = acc.last_mut() {
            last_word.push(c);
        } else {
            acc.push(c.to_string());
        }
        acc
    };

    let words = input.chars().fold(vec![], accumulate_words);

    words.into_iter().filter(|w| !w.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::parse_into_words;

    #[test]
    fn test_parse_into_words_simple() {
        assert_eq!(parse_into_words("give sword to bob"), vec![
            "give", "sword", "to", "bob"
        ]);
    }

    #[test]
    fn test_parse_into_words_quotes() {
        assert_eq!(parse_into_words("say \"hello there\""), vec![
            "say",
            "hello there"
        ]);
    }

    #[test]
    fn test_parse_into_words_backslash() {
        assert_eq!(parse_into_words(r"hello\ world again"), vec![
            "hello world",
            "again"
        ]);
    }

    #[test]
    fn test_parse_into_words_collapses_whitespace() {
        assert_eq!(parse_into_words("  look   at\tmap "), vec![
            "look", "at", "map"
        ]);
    }
}
