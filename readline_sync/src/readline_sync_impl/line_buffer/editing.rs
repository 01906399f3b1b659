// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Editing operations. Each one changes `content` and `cursor` inside a single
//! [`LineBuffer::refresh_with()`] so the screen is redrawn once per operation. The
//! operations that can be rejected return `false` without touching anything; the
//! caller rings the bell.
//!
//! A word is a maximal run of non whitespace code points. Cut operations discard the
//! removed text.

use super::core::LineBuffer;
use crate::ok;
use std::io;

fn is_word_break(ch: char) -> bool { ch.is_whitespace() }

impl LineBuffer {
    /// Insert at the cursor and move the cursor past it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn insert(&mut self, ch: char) -> io::Result<()> {
        if self.try_print_appended_glyph(ch)? {
            return ok!();
        }
        self.refresh_with(|it| {
            it.content.insert(it.cursor, ch);
            it.cursor += 1;
        })
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn insert_str(&mut self, text: &str) -> io::Result<()> {
        self.refresh_with(|it| {
            let tail = it.content.split_off(it.cursor);
            it.content.extend(text.chars());
            it.cursor = it.content.len();
            it.content.extend(tail);
        })
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn delete_forward(&mut self) -> io::Result<bool> {
        if self.cursor == self.content.len() {
            return ok!(false);
        }
        self.refresh_with(|it| {
            it.content.remove(it.cursor);
        })?;
        ok!(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn backspace(&mut self) -> io::Result<bool> {
        if self.cursor == 0 {
            return ok!(false);
        }
        self.refresh_with(|it| {
            it.cursor -= 1;
            it.content.remove(it.cursor);
        })?;
        ok!(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn move_backward(&mut self) -> io::Result<bool> {
        if self.cursor == 0 {
            return ok!(false);
        }
        self.refresh_with(|it| it.cursor -= 1)?;
        ok!(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn move_forward(&mut self) -> io::Result<bool> {
        if self.cursor == self.content.len() {
            return ok!(false);
        }
        self.refresh_with(|it| it.cursor += 1)?;
        ok!(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn move_to_line_start(&mut self) -> io::Result<()> {
        if self.cursor == 0 {
            return ok!();
        }
        self.refresh_with(|it| it.cursor = 0)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn move_to_line_end(&mut self) -> io::Result<()> {
        if self.cursor == self.content.len() {
            return ok!();
        }
        self.refresh_with(|it| it.cursor = it.content.len())
    }

    /// Start of the word that begins after `cursor`, or the end of the line.
    fn next_word_start(&self) -> usize {
        (self.cursor + 1..self.content.len())
            .find(|&i| !is_word_break(self.content[i]) && is_word_break(self.content[i - 1]))
            .unwrap_or(self.content.len())
    }

    /// Start of the word that the cursor is in (or that precedes it), or `0`.
    fn prev_word_start(&self) -> usize {
        (1..self.cursor)
            .rev()
            .find(|&i| !is_word_break(self.content[i]) && is_word_break(self.content[i - 1]))
            .unwrap_or(0)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn move_to_next_word(&mut self) -> io::Result<()> {
        let target = self.next_word_start();
        self.refresh_with(|it| it.cursor = target)
    }

    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn move_to_prev_word(&mut self) -> io::Result<()> {
        if self.cursor == 0 {
            return ok!();
        }
        let target = self.prev_word_start();
        self.refresh_with(|it| it.cursor = target)
    }

    /// Delete from the cursor up to where [`LineBuffer::move_to_next_word()`] would
    /// land, so `foo bar` with the cursor on `f` becomes `bar`. The cursor doesn't move.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn delete_word(&mut self) -> io::Result<()> {
        if self.cursor == self.content.len() {
            return ok!();
        }
        let target = self.next_word_start();
        self.refresh_with(|it| {
            it.content.drain(it.cursor..target);
        })
    }

    /// Cut the previous word: delete from the start of the word before the cursor up to
    /// the cursor, and move the cursor there.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn back_escape_word(&mut self) -> io::Result<()> {
        if self.cursor == 0 {
            return ok!();
        }
        let target = self.prev_word_start();
        self.refresh_with(|it| {
            it.content.drain(target..it.cursor);
            it.cursor = target;
        })
    }

    /// Cut to the end of the line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn kill(&mut self) -> io::Result<()> {
        self.refresh_with(|it| it.content.truncate(it.cursor))
    }

    /// Cut to the start of the line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn kill_front(&mut self) -> io::Result<()> {
        self.refresh_with(|it| {
            it.content.drain(..it.cursor);
            it.cursor = 0;
        })
    }

    /// Swap the code points on either side of the cursor and step over them. At the end
    /// of the line the last two are swapped instead. Does nothing at the start of the
    /// line, or with fewer than two code points.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn transpose(&mut self) -> io::Result<()> {
        if self.cursor == 0 || self.content.len() < 2 {
            return ok!();
        }
        self.refresh_with(|it| {
            if it.cursor == it.content.len() {
                let len = it.content.len();
                it.content.swap(len - 2, len - 1);
            } else {
                it.content.swap(it.cursor - 1, it.cursor);
                it.cursor += 1;
            }
        })
    }

    /// Replace the content and the cursor together. The cursor is clamped to the new
    /// content.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn set_with_idx(&mut self, cursor: usize, content: Vec<char>) -> io::Result<()> {
        self.refresh_with(|it| {
            it.cursor = cursor.min(content.len());
            it.content = content;
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{LineBuffer, test_fixtures::StdoutMock};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn line_buffer(content: &str, cursor: usize) -> LineBuffer {
        let mut it = LineBuffer::new("> ", 80, StdoutMock::default().into_safe_raw_terminal());
        it.set_with_idx(cursor, content.chars().collect()).unwrap();
        it
    }

    fn assert_state(buffer: &LineBuffer, content: &str, cursor: usize) {
        assert_eq!(buffer.line(), content);
        assert_eq!(buffer.cursor(), cursor);
    }

    #[test]
    fn test_insert_in_order() {
        let mut buffer = line_buffer("", 0);
        for ch in "héllo 漢字".chars() {
            buffer.insert(ch).unwrap();
        }
        assert_state(&buffer, "héllo 漢字", 8);
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut buffer = line_buffer("ac", 1);
        buffer.insert('b').unwrap();
        assert_state(&buffer, "abc", 2);
    }

    #[test]
    fn test_insert_str() {
        let mut buffer = line_buffer("ad", 1);
        buffer.insert_str("bc").unwrap();
        assert_state(&buffer, "abcd", 3);
    }

    #[test]
    fn test_rejected_at_boundaries() {
        let mut buffer = line_buffer("abc", 0);
        assert!(!buffer.backspace().unwrap());
        assert!(!buffer.move_backward().unwrap());
        assert_state(&buffer, "abc", 0);

        let mut buffer = line_buffer("abc", 3);
        assert!(!buffer.delete_forward().unwrap());
        assert!(!buffer.move_forward().unwrap());
        assert_state(&buffer, "abc", 3);
    }

    #[test]
    fn test_backspace_and_delete_forward() {
        let mut buffer = line_buffer("abcd", 2);
        assert!(buffer.backspace().unwrap());
        assert_state(&buffer, "acd", 1);
        assert!(buffer.delete_forward().unwrap());
        assert_state(&buffer, "ad", 1);
    }

    #[test]
    fn test_move_by_code_point() {
        let mut buffer = line_buffer("ab", 1);
        assert!(buffer.move_forward().unwrap());
        assert_eq!(buffer.cursor(), 2);
        assert!(buffer.move_backward().unwrap());
        assert!(buffer.move_backward().unwrap());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_move_to_line_start_and_end() {
        let mut buffer = line_buffer("abc", 1);
        buffer.move_to_line_end().unwrap();
        assert_eq!(buffer.cursor(), 3);
        buffer.move_to_line_start().unwrap();
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_two_next_words_land_on_third_word() {
        let mut buffer = line_buffer("foo bar  baz", 0);
        buffer.move_to_next_word().unwrap();
        assert_eq!(buffer.cursor(), 4);
        buffer.move_to_next_word().unwrap();
        assert_eq!(buffer.cursor(), 9);
        buffer.move_to_next_word().unwrap();
        assert_eq!(buffer.cursor(), 12);
    }

    #[test_case("foo bar  baz", 12, 9 ; "from end")]
    #[test_case("foo bar  baz", 9, 4 ; "from word start")]
    #[test_case("foo bar  baz", 6, 4 ; "from inside word")]
    #[test_case("foo bar  baz", 8, 4 ; "from whitespace")]
    #[test_case("foo", 2, 0 ; "single word")]
    #[test_case("  foo", 1, 0 ; "leading whitespace")]
    fn test_move_to_prev_word(content: &str, cursor: usize, expected: usize) {
        let mut buffer = line_buffer(content, cursor);
        buffer.move_to_prev_word().unwrap();
        assert_eq!(buffer.cursor(), expected);
    }

    #[test_case("foo bar baz", 0, "bar baz", 0 ; "whole first word")]
    #[test_case("foo bar baz", 1, "fbar baz", 1 ; "rest of word")]
    #[test_case("foo bar baz", 3, "foobar baz", 3 ; "only the whitespace")]
    #[test_case("foo  bar", 3, "foobar", 3 ; "stops at next word")]
    #[test_case("foo bar", 4, "foo ", 4 ; "last word")]
    #[test_case("foo  ", 3, "foo", 3 ; "trailing whitespace")]
    #[test_case("foo", 3, "foo", 3 ; "at end")]
    fn test_delete_word(content: &str, cursor: usize, expected: &str, expected_cursor: usize) {
        let mut buffer = line_buffer(content, cursor);
        buffer.delete_word().unwrap();
        assert_state(&buffer, expected, expected_cursor);
    }

    #[test_case("foo bar", 7, "foo ", 4 ; "last word")]
    #[test_case("foo bar", 5, "foo ar", 4 ; "keeps tail")]
    #[test_case("foo bar  ", 9, "foo ", 4 ; "trailing whitespace")]
    #[test_case("foo", 3, "", 0 ; "only word")]
    #[test_case("foo bar", 0, "foo bar", 0 ; "at start")]
    fn test_back_escape_word(content: &str, cursor: usize, expected: &str, expected_cursor: usize) {
        let mut buffer = line_buffer(content, cursor);
        buffer.back_escape_word().unwrap();
        assert_state(&buffer, expected, expected_cursor);
    }

    #[test]
    fn test_line_start_then_kill_empties_line() {
        let mut buffer = line_buffer("", 0);
        for ch in "abc".chars() {
            buffer.insert(ch).unwrap();
        }
        buffer.move_to_line_start().unwrap();
        buffer.kill().unwrap();
        assert_state(&buffer, "", 0);
    }

    #[test]
    fn test_kill_and_kill_front() {
        let mut buffer = line_buffer("hello world", 5);
        buffer.kill().unwrap();
        assert_state(&buffer, "hello", 5);

        let mut buffer = line_buffer("hello world", 6);
        buffer.kill_front().unwrap();
        assert_state(&buffer, "world", 0);
    }

    #[test_case("ab", 0, "ab", 0 ; "at start")]
    #[test_case("ab", 2, "ba", 2 ; "at end swaps last two")]
    #[test_case("abc", 3, "acb", 3 ; "at end of longer line")]
    #[test_case("a", 1, "a", 1 ; "single code point")]
    #[test_case("abc", 1, "bac", 2 ; "in the middle")]
    #[test_case("abc", 2, "acb", 3 ; "before last")]
    fn test_transpose(content: &str, cursor: usize, expected: &str, expected_cursor: usize) {
        let mut buffer = line_buffer(content, cursor);
        buffer.transpose().unwrap();
        assert_state(&buffer, expected, expected_cursor);
    }

    #[test]
    fn test_set_with_idx_clamps_cursor() {
        let mut buffer = line_buffer("", 0);
        buffer.set_with_idx(99, "abc".chars().collect()).unwrap();
        assert_state(&buffer, "abc", 3);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut buffer = line_buffer("", 0);

        // Walk a fixed pseudo random sequence so the run is deterministic.
        let mut seed: usize = 7;
        for _ in 0..2_000 {
            seed = (seed * 31 + 11) % 1_009;
            match seed % 15 {
                0 => buffer.insert('x').unwrap(),
                1 => {
                    buffer.backspace().unwrap();
                }
                2 => {
                    buffer.delete_forward().unwrap();
                }
                3 => {
                    buffer.move_backward().unwrap();
                }
                4 => {
                    buffer.move_forward().unwrap();
                }
                5 => buffer.move_to_line_start().unwrap(),
                6 => buffer.move_to_line_end().unwrap(),
                7 => buffer.move_to_next_word().unwrap(),
                8 => buffer.move_to_prev_word().unwrap(),
                9 => buffer.delete_word().unwrap(),
                10 => buffer.back_escape_word().unwrap(),
                11 => buffer.kill().unwrap(),
                12 => buffer.kill_front().unwrap(),
                13 => buffer.transpose().unwrap(),
                _ => buffer.insert(' ').unwrap(),
            }
            assert!(buffer.cursor() <= buffer.len(), "{buffer:?}");
        }
    }
}
