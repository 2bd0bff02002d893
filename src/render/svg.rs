use std::fmt::{self, Display, Write};

use chrono::NaiveDate;

use crate::{
    insights::parser::ActivitySeries,
    level::{Level, Leveler},
    utils::time::date_to_key,
};

use super::grid::{CalendarGrid, DAYS_IN_WEEK};

/// GitHub-like palette, light to dark, indexed by [Level].
pub const PALETTE: [&str; Level::COUNT] = ["#ebedf0", "#9be9a8", "#40c463", "#30a14e", "#216e39"];
/// Fill of padding days outside of the requested window.
pub const BLANK_FILL: &str = "#ffffff";

const FONT_FAMILY: &str =
    "system-ui, -apple-system, Segoe UI, Roboto, Ubuntu, Cantarell, Noto Sans, Arial";

const CELL: u32 = 11;
const GAP: u32 = 2;
const RADIUS: u32 = 2;
const STEP: u32 = CELL + GAP;
const ORIGIN_X: u32 = 36;
const ORIGIN_Y: u32 = 76;
const RIGHT_PADDING: u32 = 20;
const LEGEND_HEIGHT: u32 = 34;
const LEGEND_SWATCH_STEP: u32 = CELL + 4;
const LEGEND_LABEL_WIDTH: u32 = 30;
const LEGEND_WIDTH: u32 = LEGEND_LABEL_WIDTH * 2 + LEGEND_SWATCH_STEP * Level::COUNT as u32 + 6;

const WEEKDAY_LABELS: [(usize, &str); 3] = [(1, "Mon"), (3, "Wed"), (5, "Fri")];

pub fn level_color(level: Level) -> &'static str {
    PALETTE[level.index()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellFill {
    /// Padding day, never colored by data.
    Blank,
    Level(Level),
}

impl CellFill {
    pub fn color(&self) -> &'static str {
        match self {
            CellFill::Blank => BLANK_FILL,
            CellFill::Level(level) => level_color(*level),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub date: NaiveDate,
    pub x: u32,
    pub y: u32,
    pub seconds: f64,
    pub fill: CellFill,
}

impl Cell {
    pub fn tooltip(&self) -> String {
        format!("{}: {:.2}h", date_to_key(self.date), self.seconds / 3600.)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: u32,
    pub y: u32,
    pub text: String,
    pub anchor: Anchor,
}

/// Positioned heatmap, independent of the output format. [Display] renders it as SVG.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub subtitle: String,
    pub cells: Vec<Cell>,
    pub weekday_labels: Vec<Label>,
    pub month_labels: Vec<Label>,
    pub legend_x: u32,
    pub legend_y: u32,
}

impl Heatmap {
    pub fn build(
        series: &ActivitySeries,
        grid: &CalendarGrid,
        leveler: &Leveler,
        title: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Self {
        let weeks = grid.week_count() as u32;
        let grid_height = DAYS_IN_WEEK as u32 * STEP;
        let width = ORIGIN_X + (weeks * STEP).max(LEGEND_WIDTH) + RIGHT_PADDING;
        let height = ORIGIN_Y + grid_height + LEGEND_HEIGHT;

        let cells = grid
            .weeks()
            .iter()
            .enumerate()
            .flat_map(|(column, week)| {
                week.iter().enumerate().map(move |(row, date)| (column, row, *date))
            })
            .map(|(column, row, date)| {
                let in_window = grid.in_window(date);
                let seconds = if in_window { series.seconds(date) } else { 0. };
                let fill = if in_window {
                    CellFill::Level(leveler.level(seconds))
                } else {
                    CellFill::Blank
                };
                Cell {
                    date,
                    x: ORIGIN_X + column as u32 * STEP,
                    y: ORIGIN_Y + row as u32 * STEP,
                    seconds,
                    fill,
                }
            })
            .collect();

        let weekday_labels = WEEKDAY_LABELS
            .iter()
            .map(|(row, text)| Label {
                x: ORIGIN_X - 6,
                y: ORIGIN_Y + *row as u32 * STEP + CELL - 2,
                text: text.to_string(),
                anchor: Anchor::End,
            })
            .collect();

        let month_labels = grid
            .month_starts()
            .into_iter()
            .map(|(column, date)| Label {
                x: ORIGIN_X + column as u32 * STEP,
                y: ORIGIN_Y - 8,
                text: date.format("%b").to_string(),
                anchor: Anchor::Start,
            })
            .collect();

        Self {
            width,
            height,
            title: title.into(),
            subtitle: subtitle.into(),
            cells,
            weekday_labels,
            month_labels,
            legend_x: ORIGIN_X,
            legend_y: ORIGIN_Y + grid_height + 18,
        }
    }
}

#[cfg(test)]
impl Heatmap {
    fn cell(&self, date: NaiveDate) -> Option<&Cell> {
        self.cells.iter().find(|c| c.date == date)
    }
}

/// Escapes text for use inside xml content and attribute values.
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_label(f: &mut impl Write, label: &Label, size: u32, color: &str) -> fmt::Result {
    let anchor = match label.anchor {
        Anchor::Start => "",
        Anchor::End => r#" text-anchor="end""#,
    };
    writeln!(
        f,
        r#"<text x="{}" y="{}"{anchor} font-family="{FONT_FAMILY}" font-size="{size}" fill="{color}">{}</text>"#,
        label.x,
        label.y,
        escape_xml(&label.text)
    )
}

impl Display for Heatmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = escape_xml(&self.title);
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" role="img" aria-label="{title}">"#,
            self.width, self.height, self.width, self.height
        )?;
        writeln!(f, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            f,
            r##"<text x="20" y="24" font-family="{FONT_FAMILY}" font-size="16" fill="#111">{title}</text>"##
        )?;
        writeln!(
            f,
            r##"<text x="20" y="44" font-family="{FONT_FAMILY}" font-size="12" fill="#666">{}</text>"##,
            escape_xml(&self.subtitle)
        )?;

        for label in &self.month_labels {
            write_label(f, label, 10, "#888")?;
        }
        for label in &self.weekday_labels {
            write_label(f, label, 10, "#888")?;
        }

        for cell in &self.cells {
            let rect = format!(
                r#"<rect x="{}" y="{}" width="{CELL}" height="{CELL}" rx="{RADIUS}" ry="{RADIUS}" fill="{}" data-date="{}""#,
                cell.x,
                cell.y,
                cell.fill.color(),
                date_to_key(cell.date)
            );
            match cell.fill {
                CellFill::Blank => writeln!(f, "{rect}/>")?,
                CellFill::Level(level) => writeln!(
                    f,
                    r#"{rect} data-level="{level}"><title>{}</title></rect>"#,
                    escape_xml(&cell.tooltip())
                )?,
            }
        }

        let legend = Label {
            x: self.legend_x,
            y: self.legend_y,
            text: "Less".into(),
            anchor: Anchor::Start,
        };
        write_label(f, &legend, 10, "#666")?;
        for level in Level::all() {
            writeln!(
                f,
                r#"<rect x="{}" y="{}" width="{CELL}" height="{CELL}" rx="{RADIUS}" ry="{RADIUS}" fill="{}"/>"#,
                self.legend_x + LEGEND_LABEL_WIDTH + level.index() as u32 * LEGEND_SWATCH_STEP,
                self.legend_y - 10,
                level_color(level)
            )?;
        }
        let legend = Label {
            x: self.legend_x + LEGEND_LABEL_WIDTH + Level::COUNT as u32 * LEGEND_SWATCH_STEP + 6,
            text: "More".into(),
            ..legend
        };
        write_label(f, &legend, 10, "#666")?;

        writeln!(f, "</svg>")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        insights::parser::{ActivitySeries, DayRecord},
        level::{Level, LevelStrategy, Leveler},
        render::grid::CalendarGrid,
    };

    use super::{escape_xml, CellFill, Heatmap, BLANK_FILL, PALETTE};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(values: &[(NaiveDate, f64)]) -> ActivitySeries {
        values
            .iter()
            .map(|(date, total_seconds)| DayRecord {
                date: *date,
                total_seconds: *total_seconds,
            })
            .collect()
    }

    fn build(series: &ActivitySeries, start: NaiveDate, end: NaiveDate, strategy: LevelStrategy) -> Heatmap {
        let grid = CalendarGrid::new(start, end).unwrap();
        let leveler = Leveler::from_series(strategy, series);
        Heatmap::build(series, &grid, &leveler, "title", "subtitle")
    }

    #[test]
    fn two_day_window() {
        let series = series(&[(day(2024, 6, 1), 7200.), (day(2024, 6, 2), 0.)]);
        for strategy in [LevelStrategy::Log, LevelStrategy::Quantile] {
            let heatmap = build(&series, day(2024, 6, 1), day(2024, 6, 2), strategy);

            assert_eq!(heatmap.cells.len(), 14);
            let in_window = heatmap
                .cells
                .iter()
                .filter(|c| c.fill != CellFill::Blank)
                .collect::<Vec<_>>();
            assert_eq!(in_window.len(), 2);

            let first = heatmap.cell(day(2024, 6, 1)).unwrap();
            assert!(matches!(first.fill, CellFill::Level(level) if level > Level::ZERO));
            let second = heatmap.cell(day(2024, 6, 2)).unwrap();
            assert_eq!(second.fill, CellFill::Level(Level::ZERO));
            assert_eq!(first.tooltip(), "2024-06-01: 2.00h");
        }
    }

    #[test]
    fn padding_days_are_blank_regardless_of_data() {
        // 2024-05-31 has data but lies before the window
        let series = series(&[(day(2024, 5, 31), 36_000.), (day(2024, 6, 3), 600.)]);
        let heatmap = build(&series, day(2024, 6, 1), day(2024, 6, 30), LevelStrategy::Log);

        for cell in &heatmap.cells {
            let outside = cell.date < day(2024, 6, 1) || cell.date > day(2024, 6, 30);
            assert_eq!(outside, cell.fill == CellFill::Blank, "{}", cell.date);
        }
        let before = heatmap.cell(day(2024, 5, 31)).unwrap();
        assert_eq!(before.fill.color(), BLANK_FILL);
    }

    #[test]
    fn canvas_grows_with_weeks() {
        let empty = ActivitySeries::default();
        let short = build(&empty, day(2024, 1, 1), day(2024, 3, 31), LevelStrategy::Log);
        let long = build(&empty, day(2024, 1, 1), day(2024, 12, 31), LevelStrategy::Log);
        assert!(long.width > short.width);
        assert_eq!(long.height, short.height);
        assert_eq!(long.width - short.width, (53 - 14) * 13);
    }

    #[test]
    fn month_and_weekday_labels() {
        let heatmap = build(
            &ActivitySeries::default(),
            day(2024, 1, 1),
            day(2024, 12, 31),
            LevelStrategy::Quantile,
        );
        let months = heatmap
            .month_labels
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            months,
            ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
        );
        assert_eq!(heatmap.month_labels[0].x, heatmap.cell(day(2024, 1, 1)).unwrap().x);
        assert_eq!(
            heatmap.weekday_labels.iter().map(|l| l.text.as_str()).collect::<Vec<_>>(),
            ["Mon", "Wed", "Fri"]
        );
    }

    #[test]
    fn svg_document() {
        let series = series(&[(day(2024, 6, 1), 7200.)]);
        let svg = build(&series, day(2024, 6, 1), day(2024, 6, 2), LevelStrategy::Log).to_string();

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"data-date="2024-06-01" data-level="4"><title>2024-06-01: 2.00h</title>"#));
        assert!(svg.contains(r#"data-date="2024-06-02" data-level="0"><title>2024-06-02: 0.00h</title>"#));
        assert!(svg.contains(r##"fill="#ffffff" data-date="2024-05-26"/>"##));
        assert!(svg.contains(">Less</text>") && svg.contains(">More</text>"));
        for color in PALETTE {
            assert!(svg.contains(color));
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let series = series(&[(day(2024, 2, 10), 1234.), (day(2024, 3, 1), 99.)]);
        let a = build(&series, day(2024, 1, 1), day(2024, 12, 31), LevelStrategy::Quantile);
        let b = build(&series, day(2024, 1, 1), day(2024, 12, 31), LevelStrategy::Quantile);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn escapes_text() {
        assert_eq!(escape_xml(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
    }
}
