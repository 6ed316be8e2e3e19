//! Line-oriented C source writer.

/// Accumulates generated source with a running indent.
///
/// Every line written gets the current indent, loses trailing whitespace and
/// is terminated with `\n`. With `use_tabs`, each 8 columns of indent become
/// a tab.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
    use_tabs: bool,
}

impl CodeWriter {
    #[must_use]
    pub const fn new(use_tabs: bool) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            use_tabs,
        }
    }

    /// Write one or more lines at the current indent.
    pub fn line(&mut self, code: impl AsRef<str>) {
        for line in code.as_ref().lines() {
            let mut text = self.indent_prefix();
            text.push_str(line);
            self.out.push_str(text.trim_end());
            self.out.push('\n');
        }
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write raw text without indent or newline.
    pub fn frag(&mut self, code: &str) {
        self.out.push_str(code);
    }

    pub const fn indent(&mut self, n: usize) {
        self.indent += n;
    }

    pub const fn outdent(&mut self, n: usize) {
        self.indent = self.indent.saturating_sub(n);
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Take output string, consuming the writer.
    #[must_use]
    pub fn take_output(self) -> String {
        self.out
    }

    fn indent_prefix(&self) -> String {
        if self.use_tabs {
            let mut prefix = "\t".repeat(self.indent / 8);
            prefix.push_str(&" ".repeat(self.indent % 8));
            prefix
        } else {
            " ".repeat(self.indent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_and_strip() {
        let mut w = CodeWriter::new(false);
        w.line("{");
        w.indent(4);
        w.line("int x = 1;   ");
        w.line("a;\n\nb;");
        w.outdent(4);
        w.line("}");
        assert_eq!(w.output(), "{\n    int x = 1;\n    a;\n\n    b;\n}\n");
    }

    #[test]
    fn test_tabs() {
        let mut w = CodeWriter::new(true);
        w.indent(12);
        w.line("x");
        assert_eq!(w.output(), "\t    x\n");
    }

    #[test]
    fn test_empty_line_call_writes_nothing() {
        let mut w = CodeWriter::new(false);
        w.line("");
        w.frag("raw");
        w.blank();
        assert_eq!(w.take_output(), "raw\n");
    }

    #[test]
    fn test_outdent_saturates() {
        let mut w = CodeWriter::new(false);
        w.outdent(8);
        w.line("x");
        assert_eq!(w.output(), "x\n");
    }
}
