use roost_core::enums::DeclineCategory;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Header plus string rows, ready for [`render`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Two-column key/value row.
    pub fn pair(&mut self, key: &str, value: impl ToString) {
        self.rows.push(vec![key.to_string(), value.to_string()]);
    }
}

/// Align columns, right-justifying numbers and shrinking the widest
/// column until the table fits `max_width`.
#[must_use]
pub fn render(table: &Table, options: TableOptions) -> String {
    if table.rows.is_empty() {
        return String::from("(no rows)");
    }

    let mut widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain([header.len()])
                .max()
                .unwrap_or(0)
        })
        .collect();
    shrink_to_fit(&mut widths, &table.headers, options.max_width);

    let header = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| pad(&clip(h, w), w, false))
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![header.clone(), "-".repeat(header.chars().count())];
    for row in &table.rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(col, &w)| {
                let cell = clip(row.get(col).map_or("-", String::as_str), w);
                let padded = pad(&cell, w, is_numeric(&cell));
                if options.color {
                    paint(&padded, cell.trim())
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line);
    }
    lines.join("\n")
}

fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * 2;
    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|&(col, &w)| w > headers[col].len().max(6))
            .max_by_key(|&(_, &w)| w)
            .map(|(col, _)| col);
        let Some(col) = widest else {
            break;
        };
        widths[col] -= 1;
    }
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}

fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

/// Red for the steeper declines, green for increases.
fn paint(padded: &str, cell: &str) -> String {
    let code = match cell {
        c if c == DeclineCategory::DeclineOver75.as_str()
            || c == DeclineCategory::Decline50To75.as_str() =>
        {
            "31"
        }
        c if c == DeclineCategory::Decline25To50.as_str() || c.starts_with("extrapolated") => "33",
        c if c == DeclineCategory::Increase.as_str() => "32",
        _ => return padded.to_string(),
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}
