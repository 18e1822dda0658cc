//! Source window rendering for failure reports.
//!
//! A failure report shows the line before the failing check, the failing line
//! (marked and underlined) and the line after. Real source text is used when
//! the file can be read; otherwise the captured call text stands in for the
//! failing line and its neighbours are left blank.

use std::collections::HashMap;
use std::fs;

use unicode_width::UnicodeWidthStr;

use crate::diagnostic::Diagnostic;

/// Lazily loaded source files, keyed by the path recorded in diagnostics.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line `number` (1-based) of `file`, if the file is readable.
    pub fn line(&mut self, file: &str, number: u32) -> Option<&str> {
        let lines = self.files.entry(file.to_string()).or_insert_with(|| {
            fs::read_to_string(file)
                .ok()
                .map(|text| text.lines().map(str::to_string).collect())
        });
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        lines.as_ref()?.get(idx).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRow {
    pub number: u32,
    pub text: String,
    pub marked: bool,
}

/// The three-line window around a failing check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWindow {
    pub rows: Vec<WindowRow>,
    /// Display column where the underline starts.
    pub underline_start: usize,
    /// Display width of the underline.
    pub underline_width: usize,
}

impl SourceWindow {
    pub fn build(diagnostic: &Diagnostic, mut cache: Option<&mut SourceCache>) -> Self {
        let line = diagnostic.source_line;
        let file = diagnostic.source_file.as_str();
        let mut fetch = |n: u32| -> Option<String> {
            cache
                .as_deref_mut()
                .and_then(|c| c.line(file, n))
                .map(|s| s.trim_end().to_string())
        };

        let marked_text = fetch(line)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| diagnostic.expression_text.clone());

        let mut rows = Vec::with_capacity(3);
        if line > 1 {
            rows.push(WindowRow {
                number: line - 1,
                text: fetch(line - 1).unwrap_or_default(),
                marked: false,
            });
        }
        let indent = marked_text.len() - marked_text.trim_start().len();
        let underline_start = marked_text[..indent].width();
        let underline_width = marked_text.trim().width().max(1);
        rows.push(WindowRow {
            number: line,
            text: marked_text,
            marked: true,
        });
        rows.push(WindowRow {
            number: line + 1,
            text: fetch(line + 1).unwrap_or_default(),
            marked: false,
        });

        Self {
            rows,
            underline_start,
            underline_width,
        }
    }

    /// Width of the widest line number, for gutter alignment.
    pub fn gutter_width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.number.to_string().len())
            .max()
            .unwrap_or(1)
    }

    /// The rendered window, one entry per output line, paired with whether the
    /// line belongs to the marked row (the row itself or its underline).
    pub fn lines(&self) -> impl Iterator<Item = (String, bool)> + '_ {
        let width = self.gutter_width();
        self.rows.iter().flat_map(move |row| {
            let marker = if row.marked { '>' } else { ' ' };
            let line = format!("{marker} {:>width$} | {}", row.number, row.text);
            let underline = row.marked.then(|| (self.underline(width), true));
            std::iter::once((line.trim_end().to_string(), row.marked)).chain(underline)
        })
    }

    /// Uncolored rendering; each line ends with `\n`.
    pub fn render(&self) -> String {
        self.lines().fold(String::new(), |mut out, (line, _)| {
            out.push_str(&line);
            out.push('\n');
            out
        })
    }

    /// The underline row that follows the marked line, without trailing newline.
    pub fn underline(&self, gutter: usize) -> String {
        format!(
            "  {:gutter$} | {}{}",
            "",
            " ".repeat(self.underline_start),
            "^".repeat(self.underline_width)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{CallSite, LabelMode, Severity};
    use std::io::Write;

    fn diagnostic(file: &str, line: u32) -> Diagnostic {
        Diagnostic::new(
            "1".into(),
            Some("2".into()),
            CallSite::new(file.to_string(), line, "check_eq!(a, b, \"m\")", "m"),
            Severity::Recoverable,
            LabelMode::Comparison,
        )
    }

    #[test]
    fn falls_back_to_call_text() {
        let mut cache = SourceCache::new();
        let window = SourceWindow::build(&diagnostic("does/not/exist.rs", 12), Some(&mut cache));
        assert_eq!(
            window.render(),
            "  11 |\n> 12 | check_eq!(a, b, \"m\")\n     | ^^^^^^^^^^^^^^^^^^^^\n  13 |\n"
        );
    }

    #[test]
    fn lines_flag_the_marked_row_and_its_underline() {
        let window = SourceWindow::build(&diagnostic("nowhere.rs", 5), None);
        let marks: Vec<bool> = window.lines().map(|(_, marked)| marked).collect();
        assert_eq!(marks, vec![false, true, true, false]);
        assert!(window.lines().nth(2).unwrap().0.ends_with('^'));
    }

    #[test]
    fn first_line_has_no_predecessor() {
        let window = SourceWindow::build(&diagnostic("nowhere.rs", 1), None);
        let numbers: Vec<_> = window.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn reads_real_source_lines() {
        let path = std::env::temp_dir().join(format!("mtest_window_{}.rs", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "fn body() {{").unwrap();
        writeln!(file, "    check_eq!(t, x, 2, \"m\");").unwrap();
        writeln!(file, "}}").unwrap();
        drop(file);

        let path_str = path.to_string_lossy().to_string();
        let mut cache = SourceCache::new();
        let window = SourceWindow::build(&diagnostic(&path_str, 2), Some(&mut cache));
        let _ = fs::remove_file(&path);

        assert_eq!(window.rows[0].text, "fn body() {");
        assert_eq!(window.rows[1].text, "    check_eq!(t, x, 2, \"m\");");
        assert_eq!(window.rows[2].text, "}");
        assert_eq!(window.underline_start, 4);
        assert_eq!(window.underline_width, "check_eq!(t, x, 2, \"m\");".len());
    }
}
