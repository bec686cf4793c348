//! Box drawn text tables for terminal summaries.
use std::fmt::{self, Display, Write};
use unicode_width::UnicodeWidthStr;

/// A table with an optional title, header and footer above and below the columns.
#[derive(Default, Debug)]
pub struct TablePrinter {
    title: Option<String>,
    header: Option<String>,
    footer: Option<String>,
    column_names: Vec<String>,
    columns: Vec<Vec<String>>,
    fill: String,
}

/// Which horizontal rule to draw, they differ only in the corner and junction characters.
#[derive(Clone, Copy)]
enum Rule {
    Top,
    Middle,
    Bottom,
}

impl Rule {
    fn chars(self) -> (char, char, char) {
        match self {
            Rule::Top => ('\u{250c}', '\u{252c}', '\u{2510}'),
            Rule::Middle => ('\u{251c}', '\u{253c}', '\u{2524}'),
            Rule::Bottom => ('\u{2514}', '\u{2534}', '\u{2518}'),
        }
    }
}

impl TablePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<T>(self, title: T) -> Self
    where
        Option<String>: From<T>,
    {
        Self {
            title: Option::from(title),
            ..self
        }
    }

    pub fn with_header<T>(self, header: T) -> Self
    where
        Option<String>: From<T>,
    {
        Self {
            header: Option::from(header),
            ..self
        }
    }

    pub fn with_footer<T>(self, footer: T) -> Self
    where
        Option<String>: From<T>,
    {
        Self {
            footer: Option::from(footer),
            ..self
        }
    }

    /// Text shown in cells of columns shorter than the longest one.
    pub fn with_fill<T: AsRef<str>>(self, fill_string: T) -> Self {
        Self {
            fill: fill_string.as_ref().to_owned(),
            ..self
        }
    }

    pub fn with_column<T, V>(mut self, col_name: T, col_vals: &[V]) -> Self
    where
        T: Display,
        V: Display,
    {
        self.column_names.push(col_name.to_string());
        self.columns
            .push(col_vals.iter().map(ToString::to_string).collect());
        self
    }

    pub fn add_row(&mut self, row_vals: Vec<String>) {
        debug_assert!(row_vals.len() == self.columns.len());
        for (col, val) in self.columns.iter_mut().zip(row_vals) {
            col.push(val);
        }
    }

    pub fn print(&self) -> Result<(), fmt::Error> {
        self.print_with_min_width(0)
    }

    pub fn print_with_min_width(&self, min_width: usize) -> Result<(), fmt::Error> {
        print!("{}", self.render(min_width)?);
        Ok(())
    }

    /// Draw the table into a string at least `min_width` characters wide between the borders.
    pub fn render(&self, min_width: usize) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(2000);
        writeln!(out)?;

        if self.columns.is_empty() {
            return Ok(out);
        }

        let (table_width, col_widths) = self.calculate_widths(min_width);
        let mut next = Rule::Top;

        if let Some(ref title) = self.title {
            full_rule(&mut out, Rule::Top, table_width)?;
            writeln!(out, "\u{2502}{0:^1$}\u{2502}", title, table_width)?;
            next = Rule::Middle;
        }

        if let Some(ref header) = self.header {
            full_rule(&mut out, next, table_width)?;
            for line in wrapper(header, table_width) {
                writeln!(out, "\u{2502}{0:<1$}\u{2502}", line, table_width)?;
            }
            next = Rule::Middle;
        }

        column_rule(&mut out, next, Rule::Top, &col_widths)?;
        for (name, width) in self.column_names.iter().zip(&col_widths) {
            write!(out, "\u{2502} {0:^1$} ", name, width - 2)?;
        }
        writeln!(out, "\u{2502}")?;
        column_rule(&mut out, Rule::Middle, Rule::Middle, &col_widths)?;

        let num_rows = self.columns.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..num_rows {
            for (column, width) in self.columns.iter().zip(&col_widths) {
                let val = column.get(i).unwrap_or(&self.fill);
                write!(out, "\u{2502} {0:>1$} ", val, width - 2)?;
            }
            writeln!(out, "\u{2502}")?;
        }

        match self.footer {
            Some(ref footer) => {
                column_rule(&mut out, Rule::Middle, Rule::Bottom, &col_widths)?;
                for line in wrapper(footer, table_width) {
                    writeln!(out, "\u{2502}{0:<1$}\u{2502}", line, table_width)?;
                }
                full_rule(&mut out, Rule::Bottom, table_width)?;
            }
            None => column_rule(&mut out, Rule::Bottom, Rule::Bottom, &col_widths)?,
        }

        Ok(out)
    }

    /// Calculate the full table width and the widths of each column.
    fn calculate_widths(&self, min_width: usize) -> (usize, Vec<usize>) {
        let title_width = self
            .title
            .as_ref()
            .map(|title| UnicodeWidthStr::width(title.as_str()) + 2)
            .unwrap_or(0);

        let mut table_width = min_width.max(title_width);

        let mut col_widths: Vec<usize> = self
            .column_names
            .iter()
            .zip(&self.columns)
            .map(|(name, vals)| {
                std::iter::once(name)
                    .chain(vals.iter())
                    .map(|s| UnicodeWidthStr::width(s.as_str()) + 2)
                    .max()
                    .unwrap_or(2)
            })
            .collect();

        let spanned = |widths: &[usize]| widths.iter().sum::<usize>() + widths.len() - 1;

        // Grow the narrowest columns until the columns fill the table.
        while spanned(&col_widths) < table_width {
            let min = col_widths.iter().cloned().min().unwrap_or(0);
            for width in col_widths.iter_mut().filter(|w| **w == min) {
                *width += 1;
            }
        }

        table_width = table_width.max(spanned(&col_widths));

        (table_width, col_widths)
    }
}

/// A rule across the whole table with no column junctions.
fn full_rule(out: &mut String, rule: Rule, width: usize) -> fmt::Result {
    let (left, _, right) = rule.chars();
    writeln!(out, "{}{}{}", left, "\u{2500}".repeat(width), right)
}

/// A rule with a junction at each column boundary, `edges` picks the end characters.
fn column_rule(
    out: &mut String,
    edges: Rule,
    junctions: Rule,
    col_widths: &[usize],
) -> fmt::Result {
    let (left, _, right) = edges.chars();
    let (_, mid, _) = junctions.chars();

    let segments: Vec<String> = col_widths.iter().map(|&w| "\u{2500}".repeat(w)).collect();
    writeln!(out, "{}{}{}", left, segments.join(&mid.to_string()), right)
}

/// Split a header or footer into lines no wider than the table.
fn wrapper(text: &str, table_width: usize) -> Vec<&str> {
    let mut lines: Vec<&str> = vec![];

    let mut remaining = text.trim();
    while remaining.len() > table_width {
        let mut cut = table_width;
        while !remaining.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            break;
        }
        let guess = &remaining[..cut];

        let right_edge = guess
            .find('\n')
            .or_else(|| guess.rfind(char::is_whitespace))
            .filter(|&edge| edge > 0)
            .unwrap_or(cut);
        lines.push(guess[..right_edge].trim_end());
        remaining = remaining[right_edge..].trim_start();
    }

    for line in remaining.lines() {
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_render_simple() {
        let table = TablePrinter::new()
            .with_column("Stn", &["72672", "72476"])
            .with_column("Levels", &[87, 5]);
        let text = table.render(0).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "┌───────┬────────┐");
        assert_eq!(lines[2], "│  Stn  │ Levels │");
        assert_eq!(lines[3], "├───────┼────────┤");
        assert_eq!(lines[4], "│ 72672 │     87 │");
        assert_eq!(lines[5], "│ 72476 │      5 │");
        assert_eq!(lines[6], "└───────┴────────┘");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_title_footer_and_fill() {
        let mut table = TablePrinter::new()
            .with_title("Summary".to_owned())
            .with_footer("done".to_owned())
            .with_fill("-")
            .with_column("A", &["x", "y"])
            .with_column("B", &["z"]);
        table.add_row(vec!["p".to_owned(), "q".to_owned()]);

        let text = table.render(20).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        let width = UnicodeWidthStr::width(lines[1]);
        assert!(lines.iter().skip(1).all(|l| UnicodeWidthStr::width(*l) == width));
        assert_eq!(width, 23);
        assert!(lines[2].contains("Summary"));
        assert!(lines[8].contains(" - "));
        assert!(lines[9].contains('\u{2534}'));
        assert!(lines[10].starts_with("│done"));
        assert!(lines[11].starts_with('└'));
    }

    #[test]
    fn test_wrapper() {
        assert_eq!(wrapper("short", 10), vec!["short"]);
        assert_eq!(
            wrapper("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrapper("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }
}
