//! Delimiter matching with lookahead.
//!
//! Delimiters can span several characters, so deciding whether one starts at
//! the current character may require reading ahead. [`Lookahead`] keeps the
//! characters that turned out not to be part of a delimiter so the next read
//! sees them again, and [`DelimiterMatcher`] picks a matching routine by
//! delimiter length:
//!
//! - one character: plain comparison, no lookahead
//! - two characters: at most one character of lookahead
//! - three or more: lookahead accumulated and replayed in order on mismatch
//!
//! The first-character comparison rejects almost every position, so the
//! common case never touches the pushback queue.

use crate::{Delimiter, Result};
use std::collections::VecDeque;

/// A scalar iterator with a pushback queue.
pub struct Lookahead<I> {
    source: I,
    pushback: VecDeque<char>,
}

impl<I> Lookahead<I>
where
    I: Iterator<Item = Result<char>>,
{
    pub fn new(source: I) -> Self {
        Lookahead {
            source,
            pushback: VecDeque::new(),
        }
    }

    /// Reads the next scalar, replaying pushed-back ones first.
    pub fn next(&mut self) -> Result<Option<char>> {
        match self.pushback.pop_front() {
            Some(ch) => Ok(Some(ch)),
            None => self.source.next().transpose(),
        }
    }

    pub fn source(&self) -> &I {
        &self.source
    }

    /// Puts `chars` back so they are read again, in order, before anything else.
    pub fn unread(&mut self, chars: &[char]) {
        for ch in chars.iter().rev() {
            self.pushback.push_front(*ch);
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.pushback.len()
    }
}

/// Recognizes one delimiter in a scalar stream or a slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DelimiterMatcher {
    Single(char),
    Double(char, char),
    Many(Vec<char>),
}

impl DelimiterMatcher {
    /// Builds the matcher for a validated, non-empty delimiter.
    pub fn new(delimiter: &Delimiter) -> Self {
        match delimiter.as_chars() {
            [a] => DelimiterMatcher::Single(*a),
            [a, b] => DelimiterMatcher::Double(*a, *b),
            chars => DelimiterMatcher::Many(chars.to_vec()),
        }
    }

    /// Returns true if the delimiter starts with `first`, the scalar just
    /// read. On a match the rest of the delimiter has been consumed from
    /// `input`; otherwise `input` is left as it was.
    pub fn matches<I>(&self, first: char, input: &mut Lookahead<I>) -> Result<bool>
    where
        I: Iterator<Item = Result<char>>,
    {
        match self {
            DelimiterMatcher::Single(a) => Ok(first == *a),
            DelimiterMatcher::Double(a, b) => {
                if first != *a {
                    return Ok(false);
                }
                match input.next()? {
                    Some(ch) if ch == *b => Ok(true),
                    Some(ch) => {
                        input.unread(&[ch]);
                        Ok(false)
                    }
                    None => Ok(false),
                }
            }
            DelimiterMatcher::Many(chars) => {
                if first != chars[0] {
                    return Ok(false);
                }
                let mut consumed = Vec::with_capacity(chars.len() - 1);
                for expected in &chars[1..] {
                    match input.next()? {
                        Some(ch) => {
                            consumed.push(ch);
                            if ch != *expected {
                                input.unread(&consumed);
                                return Ok(false);
                            }
                        }
                        None => {
                            input.unread(&consumed);
                            return Ok(false);
                        }
                    }
                }
                Ok(true)
            }
        }
    }

    /// Returns true if the delimiter occurs in `chars` starting at `at`.
    pub fn matches_slice(&self, chars: &[char], at: usize) -> bool {
        match self {
            DelimiterMatcher::Single(a) => chars.get(at) == Some(a),
            DelimiterMatcher::Double(a, b) => {
                chars.get(at) == Some(a) && chars.get(at + 1) == Some(b)
            }
            DelimiterMatcher::Many(delimiter) => chars
                .get(at..)
                .is_some_and(|rest| rest.starts_with(delimiter)),
        }
    }
}
