//! Host editor surface.
//!
//! Columns are counted in characters, not bytes, so multi-byte text on a line
//! does not shift trigger offsets.

use serde::{Deserialize, Serialize};

/// A cursor location: zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// The text buffer the suggester reads from and writes to.
pub trait EditorBuffer {
    /// Full text of a line (without its line break). Out-of-range lines are
    /// empty.
    fn line(&self, line: usize) -> String;

    fn cursor(&self) -> Position;

    /// Replace the text between `start` and `end` with `text`. A cursor at or
    /// after `end` moves with the edit.
    fn replace_range(&mut self, text: &str, start: Position, end: Position);
}

/// In-memory line buffer, used by the CLI to replay typing and by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor: Position,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer {
    /// A buffer holding `text` with the cursor at its very end.
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let last = lines.len() - 1;
        let ch = lines[last].chars().count();
        Self {
            lines,
            cursor: Position::new(last, ch),
        }
    }

    /// Move the cursor, clamping it into the buffer.
    pub fn set_cursor(&mut self, pos: Position) {
        let line = pos.line.min(self.lines.len() - 1);
        let ch = pos.ch.min(self.lines[line].chars().count());
        self.cursor = Position::new(line, ch);
    }

    /// Insert text at the cursor, as if typed, leaving the cursor after it.
    pub fn type_text(&mut self, text: &str) {
        let at = self.cursor;
        self.replace_range(text, at, at);
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Char offset of `pos` in the joined text. Positions past the last
    /// line map to the end of the buffer.
    fn offset(&self, pos: Position) -> usize {
        let last = self.lines.len() - 1;
        let (line, ch) = if pos.line > last {
            (last, usize::MAX)
        } else {
            (pos.line, pos.ch)
        };
        let mut offset = 0;
        for text in self.lines.iter().take(line) {
            offset += text.chars().count() + 1;
        }
        offset + ch.min(self.lines[line].chars().count())
    }

    fn position_at(&self, mut offset: usize) -> Position {
        for (idx, line) in self.lines.iter().enumerate() {
            let width = line.chars().count();
            if offset <= width {
                return Position::new(idx, offset);
            }
            offset -= width + 1;
        }
        let last = self.lines.len() - 1;
        Position::new(last, self.lines[last].chars().count())
    }
}

impl EditorBuffer for TextBuffer {
    fn line(&self, line: usize) -> String {
        self.lines.get(line).cloned().unwrap_or_default()
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn replace_range(&mut self, text: &str, start: Position, end: Position) {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let from = self.offset(start);
        let to = self.offset(end);
        let cursor = self.offset(self.cursor);

        let full: Vec<char> = self.text().chars().collect();
        let mut rebuilt: String = full[..from].iter().collect();
        rebuilt.push_str(text);
        rebuilt.extend(&full[to..]);
        self.lines = rebuilt.split('\n').map(str::to_string).collect();

        let inserted = text.chars().count();
        let new_cursor = if cursor >= to {
            cursor - (to - from) + inserted
        } else if cursor > from {
            from + inserted
        } else {
            cursor
        };
        self.cursor = self.position_at(new_cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_advances_cursor() {
        let mut buf = TextBuffer::default();
        buf.type_text("héllo");
        assert_eq!(buf.cursor(), Position::new(0, 5));
        assert_eq!(buf.line(0), "héllo");
    }

    #[test]
    fn new_places_cursor_at_end() {
        let buf = TextBuffer::new("first\nsecond line");
        assert_eq!(buf.cursor(), Position::new(1, 11));
        assert_eq!(buf.line(1), "second line");
        assert_eq!(buf.line(7), "");
    }

    #[test]
    fn deleting_before_cursor_shifts_it_left() {
        let mut buf = TextBuffer::new("foobar;,");
        buf.replace_range("", Position::new(0, 6), Position::new(0, 8));
        assert_eq!(buf.line(0), "foobar");
        assert_eq!(buf.cursor(), Position::new(0, 6));
    }

    #[test]
    fn replacement_covering_cursor_leaves_cursor_after_insert() {
        let mut buf = TextBuffer::new("See also foo;");
        buf.replace_range("[[foobar]]", Position::new(0, 9), Position::new(0, 13));
        assert_eq!(buf.line(0), "See also [[foobar]]");
        assert_eq!(buf.cursor(), Position::new(0, 19));
    }

    #[test]
    fn edits_on_other_lines_keep_cursor_line() {
        let mut buf = TextBuffer::new("one\ntwo");
        buf.replace_range("ONE", Position::new(0, 0), Position::new(0, 3));
        assert_eq!(buf.text(), "ONE\ntwo");
        assert_eq!(buf.cursor(), Position::new(1, 3));
    }

    #[test]
    fn replace_range_past_last_line_clamps_to_end() {
        let mut buf = TextBuffer::new("abc\nde");
        buf.replace_range("x", Position::new(5, 0), Position::new(5, 0));
        assert_eq!(buf.text(), "abc\ndex");

        buf.replace_range("", Position::new(1, 1), Position::new(9, 9));
        assert_eq!(buf.text(), "abc\nd");
        assert_eq!(buf.cursor(), Position::new(1, 1));
    }

    #[test]
    fn set_cursor_clamps() {
        let mut buf = TextBuffer::new("abc");
        buf.set_cursor(Position::new(4, 10));
        assert_eq!(buf.cursor(), Position::new(0, 3));
    }
}
