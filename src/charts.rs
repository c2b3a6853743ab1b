use crate::join::JoinIndex;
use crate::models::{Category, Exercise, Session};
use crate::ui::{ChartHandle, ChartRenderer};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const PAIN_CANVAS: &str = "painLineChart";
pub const CATEGORY_CANVAS: &str = "categoryPieChart";

/// Trailing window of the progress series, today included.
pub const PROGRESS_DAYS: u32 = 30;

const PALETTE: [&str; 7] = [
    "54,162,235",
    "255,99,132",
    "255,206,86",
    "75,192,192",
    "153,102,255",
    "255,159,64",
    "201,203,207",
];

fn chart_color(idx: usize, alpha: f32) -> String {
    format!("rgba({},{alpha})", PALETTE[idx % PALETTE.len()])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PainPoint {
    pub x: String,
    pub y: i64,
    pub date: String,
}

/// One point per session with a recorded pain value, ordered by exercise
/// label and then by date.
pub fn pain_trend(sessions: &[Session], index: &JoinIndex) -> Vec<PainPoint> {
    let mut points: Vec<PainPoint> = sessions
        .iter()
        .filter_map(|session| {
            session.pain_0_10.map(|pain| PainPoint {
                x: index.chart_label(session.exercise_id),
                y: pain,
                date: session.date.clone(),
            })
        })
        .collect();
    points.sort_by(|a, b| a.x.cmp(&b.x).then_with(|| a.date.cmp(&b.date)));
    points
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub strength: usize,
    pub mobility: usize,
    pub balance: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Strength => self.strength,
            Category::Mobility => self.mobility,
            Category::Balance => self.balance,
        }
    }

    pub fn total(&self) -> usize {
        self.strength + self.mobility + self.balance
    }

    /// Slices in the fixed category order, zero counts included.
    pub fn slices(&self) -> [(Category, usize); 3] {
        Category::ALL.map(|category| (category, self.get(category)))
    }
}

pub fn category_distribution(exercises: &[Exercise]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for exercise in exercises {
        match exercise.category_kind() {
            Some(Category::Strength) => counts.strength += 1,
            Some(Category::Mobility) => counts.mobility += 1,
            Some(Category::Balance) => counts.balance += 1,
            None => {}
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyAdherence {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub scheduled_count: u32,
    pub completed_count: u32,
    pub adherence_pct: f64,
}

pub fn weekly_adherence(exercises: &[Exercise], sessions: &[Session]) -> WeeklyAdherence {
    weekly_adherence_at(Local::now().date_naive(), exercises, sessions)
}

/// Scheduled vs. logged sessions for the Monday..Sunday week holding `today`.
/// Schedules use 0 = Sunday.
pub fn weekly_adherence_at(
    today: NaiveDate,
    exercises: &[Exercise],
    sessions: &[Session],
) -> WeeklyAdherence {
    let start = week_start(today);
    let end = start + Duration::days(6);

    let mut scheduled_count = 0u32;
    for exercise in exercises {
        let days = exercise.schedule_days();
        for offset in 0..7 {
            let date = start + Duration::days(offset);
            let dow = date.weekday().num_days_from_sunday() as u8;
            if days.contains(&dow) {
                scheduled_count += 1;
            }
        }
    }

    let completed_count = sessions
        .iter()
        .filter_map(|session| NaiveDate::parse_from_str(&session.date, "%Y-%m-%d").ok())
        .filter(|date| *date >= start && *date <= end)
        .count() as u32;

    let adherence_pct = if scheduled_count == 0 {
        0.0
    } else {
        let raw = 100.0 * f64::from(completed_count) / f64::from(scheduled_count);
        (raw * 100.0).round() / 100.0
    };

    WeeklyAdherence {
        week_start: start,
        week_end: end,
        scheduled_count,
        completed_count,
        adherence_pct,
    }
}

/// Session measurement tracked over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressMetric {
    #[serde(rename = "rom_deg")]
    Rom,
    #[serde(rename = "pain_0_10")]
    Pain,
}

impl ProgressMetric {
    pub const ALL: [Self; 2] = [Self::Rom, Self::Pain];

    pub fn title(self) -> &'static str {
        match self {
            Self::Rom => "ROM (degrees)",
            Self::Pain => "Pain (0-10)",
        }
    }

    fn value(self, session: &Session) -> Option<i64> {
        match self {
            Self::Rom => session.rom_deg,
            Self::Pain => session.pain_0_10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    /// Mean of the day's recorded values, `None` when nothing was recorded.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSeries {
    pub metric: ProgressMetric,
    pub points: Vec<ProgressPoint>,
}

impl ProgressSeries {
    /// Points that carry a value.
    pub fn recorded(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|point| point.value.map(|value| (point.date, value)))
    }
}

pub fn progress_series(sessions: &[Session], metric: ProgressMetric, days: u32) -> ProgressSeries {
    progress_series_at(Local::now().date_naive(), sessions, metric, days)
}

/// One point per day of the `days` days ending at `today`, oldest first.
pub fn progress_series_at(
    today: NaiveDate,
    sessions: &[Session],
    metric: ProgressMetric,
    days: u32,
) -> ProgressSeries {
    let start = today - Duration::days(i64::from(days) - 1);

    let mut per_day: BTreeMap<NaiveDate, (i64, u32)> = BTreeMap::new();
    for session in sessions {
        let Some(value) = metric.value(session) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(&session.date, "%Y-%m-%d") else {
            continue;
        };
        if date < start || date > today {
            continue;
        }
        let (sum, count) = per_day.entry(date).or_default();
        *sum += value;
        *count += 1;
    }

    let points = (0..i64::from(days))
        .map(|offset| {
            let date = start + Duration::days(offset);
            let value = per_day
                .get(&date)
                .map(|(sum, count)| *sum as f64 / f64::from(*count));
            ProgressPoint { date, value }
        })
        .collect();

    ProgressSeries { metric, points }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Pie,
}

/// Declarative chart description handed to a [`ChartRenderer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<i64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    /// Tooltip title per data point.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: String,
    pub show_legend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<(i64, i64)>,
}

pub fn pain_chart(points: &[PainPoint]) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels: points.iter().map(|p| p.x.clone()).collect(),
            datasets: vec![Dataset {
                label: Some("Pain (0-10) per Session".to_string()),
                data: points.iter().map(|p| p.y).collect(),
                background_color: vec![chart_color(0, 0.2)],
                border_color: vec![chart_color(0, 1.0)],
                tooltips: points
                    .iter()
                    .map(|p| format!("{} ({})", p.x, p.date))
                    .collect(),
            }],
        },
        options: ChartOptions {
            title: "Pain (0-10) per Exercise".to_string(),
            show_legend: false,
            x_title: Some("Exercise".to_string()),
            y_title: Some("Pain (0-10)".to_string()),
            y_range: Some((0, 10)),
        },
    }
}

pub fn category_chart(counts: &CategoryCounts) -> ChartConfig {
    // strength, mobility, balance map to blue, yellow, teal
    let colors = [0usize, 2, 3];
    let slices = counts.slices();
    ChartConfig {
        kind: ChartKind::Pie,
        data: ChartData {
            labels: slices.iter().map(|(c, _)| c.title().to_string()).collect(),
            datasets: vec![Dataset {
                label: None,
                data: slices.iter().map(|(_, n)| *n as i64).collect(),
                background_color: colors.iter().map(|i| chart_color(*i, 0.7)).collect(),
                border_color: colors.iter().map(|i| chart_color(*i, 1.0)).collect(),
                tooltips: Vec::new(),
            }],
        },
        options: ChartOptions {
            title: "Exercise Category Distribution".to_string(),
            show_legend: true,
            x_title: None,
            y_title: None,
            y_range: None,
        },
    }
}

/// Holds at most one live chart instance for a canvas.
#[derive(Debug)]
pub struct ChartSlot {
    canvas: &'static str,
    live: Option<ChartHandle>,
}

impl ChartSlot {
    pub const fn new(canvas: &'static str) -> Self {
        Self { canvas, live: None }
    }

    pub fn canvas(&self) -> &'static str {
        self.canvas
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Releases the previous instance, then draws the new one.
    pub fn render<R: ChartRenderer + ?Sized>(&mut self, renderer: &mut R, config: &ChartConfig) {
        self.release(renderer);
        self.live = renderer.draw(self.canvas, config);
        debug!(canvas = self.canvas, drawn = self.live.is_some(), "chart rendered");
    }

    pub fn release<R: ChartRenderer + ?Sized>(&mut self, renderer: &mut R) {
        if let Some(handle) = self.live.take() {
            renderer.destroy(handle);
        }
    }
}
