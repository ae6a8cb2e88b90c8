use std::fmt;

use crate::lib::report::{ReportRow, HEADER};

/// Box-drawn rendering of report rows, one line per month.
pub struct Table<'d> {
    data: &'d [ReportRow],
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    labels: ColFmt,
    columns: Vec<ColFmt>,
}

impl<'d> Table<'d> {
    pub fn from(data: &'d [ReportRow]) -> Self {
        Self { data }
    }

    fn to_formatter(&self) -> GridFmt {
        let cols = HEADER[1..]
            .iter()
            .map(|h| ColFmt::with_label(BoxFmt::from(h.to_string())))
            .collect::<Vec<_>>();
        let mut grid = GridFmt::with_columns(BoxFmt::from(HEADER[0].to_string()), cols);
        for row in self.data {
            grid.push_line(
                BoxFmt::from(row.month.month_label()),
                row.counts().into_iter().map(BoxFmt::count).collect::<Vec<_>>(),
            );
        }
        grid
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    /// Zero counts are left blank so that nonzero ones stand out.
    fn count(n: usize) -> Self {
        if n > 0 {
            Self::from(n.to_string())
        } else {
            Self::from(String::new())
        }
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }
}

impl GridFmt {
    fn with_columns(corner: BoxFmt, columns: Vec<ColFmt>) -> Self {
        Self {
            labels: ColFmt::with_label(corner),
            columns,
        }
    }

    fn push_line(&mut self, label: BoxFmt, boxes: Vec<BoxFmt>) {
        self.labels.push(label);
        for (i, b) in boxes.into_iter().enumerate() {
            self.columns[i].push(b);
        }
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_formatter())
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // upper border
        write!(f, "{}", ULCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", LOJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", URCORNER)?;
        // title line
        write!(f, "{}", VLINE)?;
        self.labels.write_label(f, false)?;
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f, true)?;
        }
        writeln!(f, "{}", VLINE)?;
        // separator
        write!(f, "{}", RTJOIN)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", CROSS)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", LTJOIN)?;

        // main block
        for idx in 0..self.labels.len() {
            write!(f, "{}", VLINE)?;
            self.labels.write_item(f, idx, false)?;
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx, true)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        // lower border
        write!(f, "{}", DLCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", HIJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", DRCORNER)?;
        Ok(())
    }
}

impl ColFmt {
    fn write_label(&self, f: &mut fmt::Formatter, right: bool) -> fmt::Result {
        self.label.write(f, self.width, right)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize, right: bool) -> fmt::Result {
        self.boxes[idx].write(f, self.width, right)
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

impl BoxFmt {
    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        if right {
            write!(f, " {:>w$} ", self.text, w = width)
        } else {
            write!(f, " {:<w$} ", self.text, w = width)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{date::Date, report::Counts};

    fn row(month: &str, annual: Counts, monthly: Counts) -> ReportRow {
        ReportRow {
            month: Date::parse_month(month).unwrap(),
            annual,
            monthly,
            total: Counts {
                new: annual.new + monthly.new,
                active: annual.active + monthly.active,
                lapsed: annual.lapsed + monthly.lapsed,
                lost: annual.lost + monthly.lost,
            },
        }
    }

    #[test]
    fn layout() {
        let rows = vec![
            row("2023-05", Counts { new: 1, active: 1, lapsed: 0, lost: 0 }, Counts::default()),
            row("2023-06", Counts { new: 0, active: 12, lapsed: 3, lost: 0 }, Counts { new: 0, active: 0, lapsed: 0, lost: 1 }),
        ];
        let text = Table::from(&rows).to_string();
        let lines = text.lines().collect::<Vec<_>>();
        // borders, header, separator and one line per month.
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("┌─────────┬"));
        assert!(lines[1].starts_with("│ Month   │ Annual New │ Annual Active │"));
        assert!(lines[1].ends_with("│ Total Lost │"));
        assert!(lines[3].starts_with("│ 2023-05 │          1 │             1 │"));
        assert!(lines[4].starts_with("│ 2023-06 │            │            12 │"));
        assert!(lines[5].starts_with("└"));
        // every line has the same display width
        let widths = lines.iter().map(|l| l.chars().count()).collect::<Vec<_>>();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }
}
