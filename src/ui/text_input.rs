use unicode_width::UnicodeWidthStr;

/// Editable text with a cursor measured in characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = value.chars().count();
    }

    pub fn clear(&mut self) {
        self.set("");
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_index(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.value.chars().count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        let (line, _) = self.line_col();
        self.cursor = self.line_start(line);
    }

    pub fn end(&mut self) {
        let (line, _) = self.line_col();
        self.cursor = self.line_start(line) + self.line_len(line);
    }

    /// Move to the previous line, keeping the column where possible.
    pub fn up(&mut self) {
        let (line, col) = self.line_col();
        if line > 0 {
            self.cursor = self.line_start(line - 1) + col.min(self.line_len(line - 1));
        }
    }

    pub fn down(&mut self) {
        let (line, col) = self.line_col();
        if line + 1 < self.value.split('\n').count() {
            self.cursor = self.line_start(line + 1) + col.min(self.line_len(line + 1));
        }
    }

    /// Zero-based (line, column) of the cursor, in characters.
    pub fn line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.value.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Display width of the cursor's line up to the cursor.
    pub fn display_column(&self) -> usize {
        let (line, col) = self.line_col();
        let text = self.value.split('\n').nth(line).unwrap_or("");
        let prefix: String = text.chars().take(col).collect();
        prefix.width()
    }

    fn line_start(&self, line: usize) -> usize {
        self.value
            .split('\n')
            .take(line)
            .map(|l| l.chars().count() + 1)
            .sum()
    }

    fn line_len(&self, line: usize) -> usize {
        self.value.split('\n').nth(line).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_handles_multibyte_text() {
        let mut input = TextInput::new("名称");
        input.left();
        input.insert('x');
        assert_eq!(input.value(), "名x称");
        assert!(input.backspace());
        assert!(input.delete());
        assert_eq!(input.value(), "名");
        assert_eq!(input.display_column(), 2);
    }

    #[test]
    fn vertical_moves_clamp_to_line_length() {
        let mut input = TextInput::new("[sshd]\nenabled = true\nx");
        assert_eq!(input.line_col(), (2, 1));
        input.up();
        assert_eq!(input.line_col(), (1, 1));
        input.end();
        assert_eq!(input.line_col(), (1, 14));
        input.up();
        assert_eq!(input.line_col(), (0, 6));
        input.down();
        input.down();
        assert_eq!(input.line_col(), (2, 1));
        input.home();
        assert_eq!(input.line_col(), (2, 0));
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = TextInput::default();
        assert!(!input.backspace());
        assert!(!input.delete());
    }
}
