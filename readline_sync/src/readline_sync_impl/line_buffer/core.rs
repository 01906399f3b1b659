// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::SafeRawTerminal;
use unicode_width::UnicodeWidthChar;

/// The line that is being edited, and how it is drawn.
///
/// `content` is a sequence of code points, and `cursor` indexes into it. All edits go
/// through methods that keep `0 <= cursor <= content.len()`. The prompt and the mask
/// only affect rendering, never `content`.
///
/// Rendering is relative: the buffer never asks the terminal where the caret is, it
/// only remembers how far it moved it. Positions are counted in display columns from
/// the first column of the prompt, and wrap every `width` columns.
pub struct LineBuffer {
    pub(super) content: Vec<char>,
    pub(super) cursor: usize,
    pub(super) prompt: String,
    /// Width of the prompt with ANSI escape sequences stripped.
    pub(super) prompt_width: usize,
    pub(super) mask: Option<char>,
    /// Terminal columns. `0` disables wrapping.
    pub(super) width: u16,
    /// When `false` nothing is ever drawn; side effects of a refresh still run.
    pub(super) is_interactive: bool,
    /// Set once the on screen rendering has been erased, so it is only erased once.
    pub(super) had_clean: bool,
    pub(super) output: SafeRawTerminal,
}

impl std::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("content", &self.content)
            .field("cursor", &self.cursor)
            .field("prompt", &self.prompt)
            .field("mask", &self.mask)
            .field("width", &self.width)
            .field("is_interactive", &self.is_interactive)
            .finish_non_exhaustive()
    }
}

impl LineBuffer {
    pub fn new(prompt: &str, width: u16, output: SafeRawTerminal) -> Self {
        Self {
            content: vec![],
            cursor: 0,
            prompt: prompt.to_owned(),
            prompt_width: display_width_of_prompt(prompt),
            mask: None,
            width,
            is_interactive: true,
            had_clean: false,
            output,
        }
    }

    #[must_use]
    pub fn content(&self) -> &[char] { &self.content }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn len(&self) -> usize { self.content.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.content.is_empty() }

    /// The content as a `String`.
    #[must_use]
    pub fn line(&self) -> String { self.content.iter().collect() }

    #[must_use]
    pub fn prompt(&self) -> &str { &self.prompt }

    #[must_use]
    pub fn mask(&self) -> Option<char> { self.mask }

    #[must_use]
    pub fn width(&self) -> u16 { self.width }

    #[must_use]
    pub fn is_interactive(&self) -> bool { self.is_interactive }

    #[must_use]
    pub fn output(&self) -> SafeRawTerminal { self.output.clone() }

    /// Does not redraw. Use [`LineBuffer::refresh_with()`] to change the prompt of a line
    /// that is on screen.
    pub fn set_prompt(&mut self, prompt: &str) {
        prompt.clone_into(&mut self.prompt);
        self.prompt_width = display_width_of_prompt(prompt);
    }

    pub fn set_mask(&mut self, mask: Option<char>) { self.mask = mask; }

    pub fn set_interactive(&mut self, is_interactive: bool) {
        self.is_interactive = is_interactive;
    }

    pub fn set_output(&mut self, output: SafeRawTerminal) { self.output = output; }

    /// Hand over the content and start a fresh line. Nothing is drawn or erased.
    pub fn reset(&mut self) -> Vec<char> {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    /// Display column where the glyph at `index` starts, counted from the start of the
    /// prompt. A wide glyph that doesn't fit in what is left of a row is drawn at the
    /// start of the next one, and the column it skips is counted too.
    pub(super) fn position_of(&self, index: usize) -> usize {
        let width = usize::from(self.width);
        self.content[..index]
            .iter()
            .fold(self.prompt_width, |position, ch| {
                let glyph_width = char_width(self.glyph_for(*ch));
                let column = if width > 0 { position % width } else { 0 };
                let skipped = if width > 0 && column > 0 && column + glyph_width > width {
                    width - column
                } else {
                    0
                };
                position + skipped + glyph_width
            })
    }

    pub(super) fn cursor_position(&self) -> usize { self.position_of(self.cursor) }

    pub(super) fn end_position(&self) -> usize { self.position_of(self.content.len()) }

    /// Screen row of a position, relative to the row the prompt starts on.
    pub(super) fn row_of(&self, position: usize) -> usize {
        match self.width {
            0 => 0,
            width => position / usize::from(width),
        }
    }

    pub(super) fn column_of(&self, position: usize) -> usize {
        match self.width {
            0 => position,
            width => position % usize::from(width),
        }
    }

    /// `true` when `position` is the first column of a wrapped row. A terminal leaves
    /// the caret on the last column in that case, until something else is printed.
    pub(super) fn is_on_row_boundary(&self, position: usize) -> bool {
        self.width > 0 && position > 0 && position % usize::from(self.width) == 0
    }

    /// What a glyph looks like on screen.
    pub(super) fn glyph_for(&self, ch: char) -> char {
        match self.mask {
            Some(mask) if ch != '\n' => mask,
            _ => ch,
        }
    }
}

/// Control characters take up no columns. Everything else is measured with
/// `unicode-width` (wide CJK and emoji take two).
#[must_use]
pub fn char_width(ch: char) -> usize {
    if ch.is_control() { 0 } else { ch.width().unwrap_or(0) }
}

/// Prompts may carry colors, which take no room on screen.
#[must_use]
pub fn display_width_of_prompt(prompt: &str) -> usize {
    strip_ansi_escapes::strip_str(prompt).chars().map(char_width).sum()
}
