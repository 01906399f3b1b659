// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::core::LineBuffer;
use crate::ok;
use crossterm::{QueueableCommand, cursor,
                terminal::{Clear, ClearType}};
use std::io::{self, Write};

impl LineBuffer {
    /// Erase the line from the screen and draw it again.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn refresh(&mut self) -> io::Result<()> { self.refresh_with(|_| ()) }

    /// Erase the line from the screen, run `side_effect`, and draw the line again, as
    /// one unit. The caller holds the lock on the buffer for the whole sequence, so a
    /// concurrent resize or external write can't slip in between.
    ///
    /// `side_effect` may change the buffer, or write to the output device (after the
    /// erase, before the redraw). When the buffer isn't interactive only `side_effect`
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn refresh_with<R>(&mut self, side_effect: impl FnOnce(&mut Self) -> R) -> io::Result<R> {
        if !self.is_interactive {
            return Ok(side_effect(self));
        }

        self.clean()?;
        let it = side_effect(self);
        self.print()?;

        ok!(it)
    }

    /// Erase the on screen rendering of the line, leaving the content alone. Erasing
    /// twice in a row is a no-op, since the caret is already at the start of the line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub fn clean(&mut self) -> io::Result<()> {
        if self.had_clean || !self.is_interactive {
            return ok!();
        }
        self.had_clean = true;

        let rows_above_caret = self.row_of(self.cursor_position());
        let output = self.output.clone();
        let mut term = output.lock().unwrap();
        move_to_beginning(&mut *term, rows_above_caret)?;
        term.queue(Clear(ClearType::FromCursorDown))?;
        term.flush()?;

        ok!()
    }

    /// Store the new width and redraw with it. The erase uses the old width, since that
    /// is what the line on screen was wrapped with.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    pub fn on_width_change(&mut self, new_width: u16) -> io::Result<()> {
        if !self.is_interactive {
            self.width = new_width;
            return ok!();
        }

        self.clean()?;
        self.width = new_width;
        self.print()
    }

    /// Store the new width without drawing anything. For when no line is on screen.
    pub fn set_width(&mut self, new_width: u16) { self.width = new_width; }

    /// Draw the prompt and the content, then walk the caret back from the end of the
    /// line to `cursor`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub(super) fn print(&mut self) -> io::Result<()> {
        self.had_clean = false;

        let rendered = self.render_to_string();
        let end_position = self.end_position();
        let cursor_position = self.cursor_position();
        let submitted = self.content.last() == Some(&'\n');

        let output = self.output.clone();
        let mut term = output.lock().unwrap();
        term.write_all(rendered.as_bytes())?;

        // A trailing line feed leaves the caret on a fresh row, which is where it
        // should stay.
        if submitted {
            return term.flush();
        }

        if self.is_on_row_boundary(end_position) {
            term.write_all(b" \x08")?;
        }

        let rows_up = self.row_of(end_position) - self.row_of(cursor_position);
        if rows_up > 0 {
            term.queue(cursor::MoveUp(to_u16(rows_up)))?;
        }
        if rows_up > 0 || cursor_position != end_position {
            term.queue(cursor::MoveToColumn(to_u16(self.column_of(cursor_position))))?;
        }
        term.flush()?;

        ok!()
    }

    /// Prompt followed by the content, with the mask applied. Line feeds become
    /// `\r\n`, because raw mode turns off the terminal's own translation.
    #[must_use]
    pub fn render_to_string(&self) -> String {
        let mut it = String::with_capacity(self.prompt.len() + self.content.len());
        it.push_str(&self.prompt);
        for ch in &self.content {
            match self.glyph_for(*ch) {
                '\n' => it.push_str("\r\n"),
                glyph => it.push(glyph),
            }
        }
        it
    }

    /// Fast path for typing at the end of the line: only the new glyph is written.
    /// Returns `false` (and draws nothing) if a full redraw is needed instead.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output device fails.
    ///
    /// # Panics
    ///
    /// This will panic if the lock is poisoned.
    #[allow(clippy::unwrap_in_result)] /* This is for lock.unwrap() */
    pub(super) fn try_print_appended_glyph(&mut self, ch: char) -> io::Result<bool> {
        if !self.is_interactive
            || self.had_clean
            || ch == '\n'
            || self.cursor != self.content.len()
        {
            return ok!(false);
        }

        let glyph = self.glyph_for(ch);
        let end_position = self.end_position();
        let new_end_position = end_position + super::core::char_width(glyph);
        if self.width > 0 {
            let width = usize::from(self.width);
            // Wide glyphs that don't fit wrap early, and a glyph that fills the row
            // leaves a pending wrap. Both need the full redraw.
            if self.column_of(end_position) + super::core::char_width(glyph) >= width {
                return ok!(false);
            }
        }
        debug_assert!(!self.is_on_row_boundary(new_end_position));

        self.content.push(ch);
        self.cursor += 1;

        let output = self.output.clone();
        let mut term = output.lock().unwrap();
        let mut encoded = [0; 4];
        term.write_all(glyph.encode_utf8(&mut encoded).as_bytes())?;
        term.flush()?;

        ok!(true)
    }
}

/// Move the caret to the first column of the row the prompt starts on.
fn move_to_beginning(term: &mut dyn Write, rows_above_caret: usize) -> io::Result<()> {
    if rows_above_caret > 0 {
        term.queue(cursor::MoveUp(to_u16(rows_above_caret)))?;
    }
    term.queue(cursor::MoveToColumn(0))?;
    ok!()
}

fn to_u16(value: usize) -> u16 { u16::try_from(value).unwrap_or(u16::MAX) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::StdoutMock;
    use pretty_assertions::assert_eq;

    fn line_buffer(prompt: &str, width: u16) -> (LineBuffer, StdoutMock) {
        let stdout_mock = StdoutMock::default();
        let buffer = LineBuffer::new(prompt, width, stdout_mock.clone().into_safe_raw_terminal());
        (buffer, stdout_mock)
    }

    #[test]
    fn test_refresh_draws_prompt_and_content() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);
        buffer.content = "hello".chars().collect();
        buffer.cursor = 5;

        buffer.refresh().unwrap();

        assert_eq!(stdout_mock.get_copy_of_buffer_as_string_strip_ansi(), "> hello");
        // Erase to the end of the screen.
        assert!(stdout_mock.get_copy_of_buffer_as_string().contains("\x1b[J"));
    }

    #[test]
    fn test_refresh_twice_renders_the_same_bytes() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 10);
        buffer.content = "hello world, again".chars().collect();
        buffer.cursor = 3;

        buffer.refresh().unwrap();
        let first = stdout_mock.get_copy_of_buffer();
        stdout_mock.clear();

        buffer.refresh().unwrap();
        let second = stdout_mock.get_copy_of_buffer();

        assert_eq!(first, second);
    }

    #[test]
    fn test_caret_moves_back_to_cursor() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);
        buffer.content = "hello".chars().collect();
        buffer.cursor = 1;

        buffer.refresh().unwrap();

        // 0 based column 3, CSI columns are 1 based.
        assert!(stdout_mock.get_copy_of_buffer_as_string().ends_with("hello\x1b[4G"));
    }

    #[test]
    fn test_caret_moves_up_across_wrapped_rows() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 5);
        // Ends at position 12, row 2. Cursor at position 3, row 0.
        buffer.content = "abcdefghij".chars().collect();
        buffer.cursor = 1;

        buffer.refresh().unwrap();

        assert!(
            stdout_mock
                .get_copy_of_buffer_as_string()
                .ends_with("abcdefghij\x1b[2A\x1b[4G")
        );
    }

    #[test]
    fn test_row_boundary_forces_wrap() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 5);
        buffer.content = "abc".chars().collect();
        buffer.cursor = 3;

        buffer.refresh().unwrap();

        assert!(stdout_mock.get_copy_of_buffer_as_string().ends_with("abc \x08"));
    }

    #[test]
    fn test_mask_hides_content() {
        let (mut buffer, stdout_mock) = line_buffer("pw: ", 80);
        buffer.set_mask(Some('*'));
        buffer.content = "secret".chars().collect();
        buffer.cursor = 6;

        buffer.refresh().unwrap();

        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert_eq!(output, "pw: ******");
        assert!(!output.contains("secret"));
    }

    #[test]
    fn test_submitted_line_ends_with_crlf() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);
        buffer.content = "x\n".chars().collect();
        buffer.cursor = 2;

        buffer.refresh().unwrap();

        assert!(stdout_mock.get_copy_of_buffer_as_string().ends_with("> x\r\n"));
    }

    #[test]
    fn test_clean_only_once() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);
        buffer.clean().unwrap();
        let first = stdout_mock.get_copy_of_buffer();
        buffer.clean().unwrap();
        assert_eq!(stdout_mock.get_copy_of_buffer(), first);
    }

    #[test]
    fn test_not_interactive_draws_nothing() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);
        buffer.set_interactive(false);

        let it = buffer
            .refresh_with(|it| {
                it.content.push('a');
                it.cursor = 1;
                42
            })
            .unwrap();

        assert_eq!(it, 42);
        assert_eq!(buffer.line(), "a");
        assert!(stdout_mock.get_copy_of_buffer().is_empty());
    }

    #[test]
    fn test_on_width_change_redraws_with_new_width() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);
        buffer.content = "abcdefgh".chars().collect();
        buffer.cursor = 0;

        buffer.on_width_change(4).unwrap();

        assert_eq!(buffer.width(), 4);
        // Position 10 is on row 2; the caret goes back up to row 0, column 2.
        assert!(
            stdout_mock
                .get_copy_of_buffer_as_string()
                .ends_with("abcdefgh\x1b[2A\x1b[3G")
        );
    }

    #[test]
    fn test_appended_glyph_fast_path() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 80);

        assert!(buffer.try_print_appended_glyph('a').unwrap());

        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "a");
        assert_eq!(buffer.line(), "a");
        assert_eq!(buffer.cursor(), 1);
    }

    #[test]
    fn test_appended_glyph_at_row_end_needs_full_redraw() {
        let (mut buffer, stdout_mock) = line_buffer("> ", 4);
        buffer.content = vec!['a'];
        buffer.cursor = 1;

        assert!(!buffer.try_print_appended_glyph('b').unwrap());

        assert!(stdout_mock.get_copy_of_buffer().is_empty());
        assert_eq!(buffer.line(), "a");
    }
}
