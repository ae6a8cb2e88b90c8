use std::path::Path;

use svg::{
    node::{
        self,
        element::{path::Data, Line, Path as SvgPath, Rectangle, Text},
    },
    Document,
};

use crate::lib::{date::Date, report::ReportRow};

/// Stacked area chart of the Total columns of a report.
pub struct Plotter<'d> {
    data: &'d [ReportRow],
}

impl<'d> Plotter<'d> {
    pub fn from(data: &'d [ReportRow]) -> Self {
        Self { data }
    }

    pub fn save(&self, file: &Path) -> std::io::Result<()> {
        svg::save(file, &self.document())
    }

    fn document(&self) -> Document {
        self.stacked_plot().to_range_group_drawer().render()
    }

    fn stacked_plot(&self) -> Plot<(Date, Date), StackedEntry<usize>> {
        let mut plot = Plot::new();
        for row in self.data {
            let t = row.total;
            // `active` already includes `new`
            let bands = vec![t.new, t.active - t.new, t.lapsed, t.lost];
            plot.push((row.month, row.month.round_month_up()), StackedEntry::stack(bands));
        }
        plot
    }
}

#[derive(Debug)]
pub struct Plot<X, Y> {
    data: Vec<(X, Y)>,
}

impl<X, Y> Plot<X, Y> {
    fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn push(&mut self, x: X, y: Y) {
        self.data.push((x, y));
    }
}

/// Band heights turned into band boundaries, starting from zero.
#[derive(Debug)]
struct StackedEntry<Y> {
    points: Vec<Y>,
}

impl<Y> StackedEntry<Y>
where
    Y: std::ops::Add<Output = Y> + Default + Clone,
{
    fn stack(bands: Vec<Y>) -> Self {
        let mut points = vec![Y::default()];
        for b in bands {
            let top = points[points.len() - 1].clone() + b;
            points.push(top);
        }
        Self { points }
    }
}

pub trait Scalar {
    fn to_scalar(&self) -> i64;
}
pub trait ScalarRange {
    fn to_range(&self) -> (i64, i64);
}
pub trait ScalarGroup {
    fn to_group(&self) -> Vec<i64>;
}

impl Scalar for usize {
    fn to_scalar(&self) -> i64 {
        *self as i64
    }
}

impl Scalar for Date {
    fn to_scalar(&self) -> i64 {
        self.index() as i64
    }
}

impl<T> ScalarRange for (T, T)
where T: Scalar {
    fn to_range(&self) -> (i64, i64) {
        (self.0.to_scalar(), self.1.to_scalar())
    }
}

impl<Y> ScalarGroup for StackedEntry<Y>
where
    Y: Scalar,
{
    fn to_group(&self) -> Vec<i64> {
        self.points
            .iter()
            .map(|p| p.to_scalar())
            .collect::<Vec<_>>()
    }
}

impl<X, Y> Plot<X, Y>
where
    X: ScalarRange,
    Y: ScalarGroup,
{
    fn to_range_group_drawer(&self) -> RangeGroupDrawer {
        RangeGroupDrawer {
            points: self.data.iter()
            .map(|(x, y)| (x.to_range(), y.to_group()))
            .collect::<Vec<_>>(),
        }
    }
}

#[derive(Debug)]
struct RangeGroupDrawer {
    points: Vec<((i64, i64), Vec<i64>)>,
}

impl RangeGroupDrawer {
    fn render(&self) -> Document {
        let fheight = 700.0;
        let fwidth = 1000.0;
        let stroke_width = 2.0;
        let margin = 20.0;
        let legend = 140.0;
        let mut document = Document::new()
            .set("viewBox", (-margin, -margin, fwidth + legend + 2.0 * margin, fheight + 2.0 * margin));
        if self.points.is_empty() {
            return document;
        }
        let (xmin, ymin, width, height) = {
            let mut xmin = i64::MAX;
            let mut ymin = 0;
            let mut xmax = i64::MIN;
            let mut ymax = i64::MIN;
            for ((start, end), points) in &self.points {
                xmin = xmin.min(*start).min(*end);
                xmax = xmax.max(*start).max(*end);
                for pt in points {
                    ymin = ymin.min(*pt);
                    ymax = ymax.max(*pt);
                }
            }
            // a flat chart still needs a nonzero scale
            (xmin, ymin, (xmax - xmin).max(1), (ymax - ymin).max(1))
        };
        let resize_x = |x| {
            (x - xmin) as f64 / width as f64 * fwidth
        };
        let resize_y = |y| {
            (height - (y - ymin)) as f64 / height as f64 * fheight
        };
        let group_size = self.points[0].1.len();
        let mut groups = Vec::new();
        for i in 0..group_size-1 {
            groups.push(Data::new().move_to((resize_x(self.points[0].0.0), resize_y(self.points[0].1[i]))));
        }
        // lower boundary left to right, then upper boundary right to left
        let groups = self.points.iter()
            .fold(groups, |gr, ((start, end), points)| {
                gr.into_iter()
                    .enumerate()
                    .map(|(i, gr)| gr.line_to((resize_x(*start), resize_y(points[i])))
                                .line_to((resize_x(*end), resize_y(points[i])))
                    )
                    .collect::<Vec<_>>()
            });
        let groups = self.points.iter().rev()
            .fold(groups, |gr, ((start, end), points)| {
                gr.into_iter()
                    .enumerate()
                    .map(|(i, gr)| gr.line_to((resize_x(*end), resize_y(points[i+1])))
                        .line_to((resize_x(*start), resize_y(points[i+1])))
                        )
                    .collect::<Vec<_>>()
            });
        for (i, gr) in groups.into_iter().enumerate() {
            document = document.add(SvgPath::new()
                .set("fill", COLORS[i % COLORS.len()])
                .set("d", gr.close()));
        }
        let yaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", 0.0)
            .set("y1", 0.0)
            .set("y2", fheight)
            .set("stroke", "black")
            .set("stroke-width", stroke_width);
        let xaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", fwidth)
            .set("y1", resize_y(0))
            .set("y2", resize_y(0))
            .set("stroke", "black")
            .set("stroke-width", stroke_width);
        document = document.add(yaxis).add(xaxis);
        for (i, label) in BANDS.iter().enumerate().take(group_size - 1) {
            let y = 30.0 * i as f64;
            document = document
                .add(Rectangle::new()
                    .set("x", fwidth + margin)
                    .set("y", y)
                    .set("width", 20.0)
                    .set("height", 20.0)
                    .set("fill", COLORS[i % COLORS.len()]))
                .add(Text::new()
                    .set("x", fwidth + margin + 30.0)
                    .set("y", y + 15.0)
                    .add(node::Text::new(*label)));
        }
        document
    }
}

const BANDS: &[&str] = &["New", "Active", "Lapsed", "Lost"];

const COLORS: &[&str] = &[
    "green",
    "blue",
    "orange",
    "red",
];

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::report::Counts;

    fn row(month: &str, total: Counts) -> ReportRow {
        ReportRow {
            month: Date::parse_month(month).unwrap(),
            annual: total,
            monthly: Counts::default(),
            total,
        }
    }

    #[test]
    fn stacking() {
        let s = StackedEntry::stack(vec![1usize, 2, 0, 4]);
        assert_eq!(s.points, vec![0, 1, 3, 3, 7]);
    }

    #[test]
    fn bands_exclude_new_from_active() {
        let rows = vec![row("2023-06", Counts { new: 2, active: 5, lapsed: 1, lost: 1 })];
        let plot = Plotter::from(&rows).stacked_plot();
        assert_eq!(plot.data[0].1.points, vec![0, 2, 5, 6, 7]);
        assert_eq!(plot.data[0].0.1, Date::parse_month("2023-07").unwrap());
    }

    #[test]
    fn document_has_one_area_per_band() {
        let rows = vec![
            row("2023-05", Counts { new: 1, active: 1, lapsed: 0, lost: 0 }),
            row("2023-06", Counts { new: 0, active: 3, lapsed: 2, lost: 1 }),
        ];
        let svg = Plotter::from(&rows).document().to_string();
        assert_eq!(svg.matches("<path").count(), 4);
        assert!(svg.contains("Lapsed"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn all_zero_report_is_drawable() {
        let rows = vec![row("2023-05", Counts::default())];
        let svg = Plotter::from(&rows).document().to_string();
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.svg");
        let rows = vec![row("2023-05", Counts { new: 1, active: 1, lapsed: 0, lost: 0 })];
        Plotter::from(&rows).save(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
