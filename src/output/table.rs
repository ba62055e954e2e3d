#![forbid(unsafe_code)]

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    indent: usize,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            aligns: Vec::new(),
            rows: Vec::new(),
            indent: 0,
        }
    }

    #[must_use]
    pub fn align(mut self, column: usize, align: Align) -> Self {
        if self.aligns.len() <= column {
            self.aligns.resize(column + 1, Align::Left);
        }
        self.aligns[column] = align;
        self
    }

    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    pub fn write_csv(&self) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout().lock());
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Header, a rule of `─` under each column, then the rows.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut widths = vec![0usize; self.headers.len()];
        for (i, h) in self.headers.iter().enumerate() {
            widths[i] = widths[i].max(visible_width(h));
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(visible_width(cell));
            }
        }

        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        writeln!(&mut out, "{}", self.format_row(&self.headers, &widths))?;
        writeln!(&mut out, "{}", self.format_row(&rule, &widths))?;
        for row in &self.rows {
            writeln!(&mut out, "{}", self.format_row(row, &widths))?;
        }
        Ok(())
    }

    fn format_row(&self, row: &[String], widths: &[usize]) -> String {
        let mut out = " ".repeat(self.indent);
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let w = widths
                .get(i)
                .copied()
                .unwrap_or_else(|| visible_width(cell));
            let pad = w.saturating_sub(visible_width(cell));
            let (before, after) = match self.aligns.get(i).copied().unwrap_or_default() {
                Align::Left => (0, pad),
                Align::Center => (pad / 2, pad - pad / 2),
            };
            out.push_str(&" ".repeat(before));
            out.push_str(cell);
            out.push_str(&" ".repeat(after));
        }
        out.trim_end().to_owned()
    }
}

fn visible_width(s: &str) -> usize {
    // Best-effort: assume each char is width 1.
    s.chars().count()
}
