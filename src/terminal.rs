//! Line-oriented terminal front end: renders the dashboard with comfy-table
//! and turns parsed commands into dashboard calls.

use crate::charts::{self, ChartConfig, ChartKind, ProgressSeries};
use crate::commands::{self, Command, HELP};
use crate::dashboard::Dashboard;
use crate::errors::ClientError;
use crate::forms::{EntityForm, FormController};
use crate::models::EntityKind;
use crate::tables::{ExerciseTable, RowCommand, SessionTable, TableRow};
use crate::ui::{ChartHandle, ChartRenderer, Prompt};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// Keeps the text rendering of every live chart, keyed by handle.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    next_handle: u64,
    live: BTreeMap<u64, (String, ChartConfig)>,
}

impl TerminalRenderer {
    /// Live charts in canvas order.
    pub fn charts(&self) -> Vec<(&str, &ChartConfig)> {
        let mut charts: Vec<_> = self
            .live
            .values()
            .map(|(canvas, config)| (canvas.as_str(), config))
            .collect();
        charts.sort_by(|a, b| a.0.cmp(b.0));
        charts
    }
}

impl ChartRenderer for TerminalRenderer {
    fn draw(&mut self, canvas: &str, config: &ChartConfig) -> Option<ChartHandle> {
        self.next_handle += 1;
        self.live
            .insert(self.next_handle, (canvas.to_string(), config.clone()));
        Some(ChartHandle(self.next_handle))
    }

    fn destroy(&mut self, handle: ChartHandle) {
        self.live.remove(&handle.0);
    }
}

/// Confirmations read `y`/`n` from stdin; alerts go to stdout.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if let Err(err) = io::stdout().flush() {
            warn!("failed to flush prompt: {err}");
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn alert(&mut self, message: &str) {
        println!("! {message}");
    }
}

pub fn render_rows(headers: &[&str], rows: &[TableRow]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|header| Cell::new(header).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
    for row in rows {
        table.add_row(row.cells.iter().map(Cell::new).collect::<Vec<_>>());
    }
    table.to_string()
}

pub fn render_chart(config: &ChartConfig) -> String {
    let mut out = format!("{}\n", config.options.title);
    let Some(dataset) = config.data.datasets.first() else {
        return out;
    };
    if dataset.data.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    for (idx, value) in dataset.data.iter().enumerate() {
        let label = match config.kind {
            ChartKind::Line => dataset
                .tooltips
                .get(idx)
                .cloned()
                .unwrap_or_else(|| config.data.labels[idx].clone()),
            ChartKind::Pie => config.data.labels[idx].clone(),
        };
        let bar = "█".repeat(usize::try_from(*value).unwrap_or(0));
        out.push_str(&format!("  {label:<32} {bar} {value}\n"));
    }
    out
}

/// Days with recorded values only; empty days are left out.
pub fn render_progress(series: &ProgressSeries) -> String {
    let mut out = format!(
        "{}, daily average over {} days\n",
        series.metric.title(),
        series.points.len()
    );
    let mut any = false;
    for (date, value) in series.recorded() {
        any = true;
        out.push_str(&format!("  {date}  {value:.1}\n"));
    }
    if !any {
        out.push_str("  (no data)\n");
    }
    out
}

fn render_form<F: EntityForm>(title: &str, form: &FormController<F>, fields: String) -> String {
    let mode = match form.editing_id() {
        Some(id) => format!("editing #{id}"),
        None => "new".to_string(),
    };
    let mut out = format!("{title} [{mode}] {fields}\n  submit: {}", form.submit_label());
    if !form.message().is_empty() {
        out.push_str(&format!("  | {}", form.message()));
    }
    out
}

pub fn render_dashboard<P: Prompt>(dashboard: &Dashboard<TerminalRenderer, P>) -> String {
    let mut out = String::new();
    out.push_str("Exercises\n");
    out.push_str(&render_rows(
        &ExerciseTable::HEADERS,
        dashboard.exercise_table().rows(),
    ));
    out.push_str("\n\nSessions\n");
    out.push_str(&render_rows(
        &SessionTable::HEADERS,
        dashboard.session_table().rows(),
    ));
    out.push_str("\n\n");

    for (_, config) in dashboard.renderer().charts() {
        out.push_str(&render_chart(config));
        out.push('\n');
    }

    if let Some(summary) = dashboard.adherence() {
        out.push_str(&format!(
            "Week {} .. {}: {} of {} scheduled sessions logged ({:.2}%)\n\n",
            summary.week_start,
            summary.week_end,
            summary.completed_count,
            summary.scheduled_count,
            summary.adherence_pct
        ));
    }

    for series in dashboard.progress() {
        out.push_str(&render_progress(series));
        out.push('\n');
    }

    let exercise = &dashboard.exercise_form().fields;
    let days: Vec<String> = exercise.schedule_dow.iter().map(u8::to_string).collect();
    out.push_str(&render_form(
        "Exercise form",
        dashboard.exercise_form(),
        format!(
            "name={:?} side={:?} category={:?} sets={:?} reps={:?} hold={:?} days=[{}]",
            exercise.name,
            exercise.side,
            exercise.category,
            exercise.target_sets,
            exercise.target_reps,
            exercise.target_hold_sec,
            days.join(",")
        ),
    ));
    out.push('\n');

    let session = &dashboard.session_form().fields;
    let options: Vec<String> = dashboard
        .exercise_options()
        .iter()
        .map(|option| format!("{}={}", option.id, option.name))
        .collect();
    out.push_str(&render_form(
        "Session form",
        dashboard.session_form(),
        format!(
            "exercise={:?} date={:?} sets={:?} reps={:?} hold={:?} pain={:?} rom={:?}",
            session.exercise_id,
            session.date,
            session.sets,
            session.reps,
            session.hold_sec,
            session.pain_0_10,
            session.rom_deg
        ),
    ));
    out.push_str(&format!("\n  exercises: {}\n", options.join(", ")));
    out
}

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Redraw,
    Quit,
}

/// Applies one command. Failures have already been surfaced through the
/// prompt or the form message, so they only get logged here.
pub async fn execute<R: ChartRenderer, P: Prompt>(
    dashboard: &mut Dashboard<R, P>,
    command: Command,
) -> Flow {
    let result = match command {
        Command::Show => return Flow::Redraw,
        Command::Quit => return Flow::Quit,
        Command::Help => {
            println!("{HELP}");
            return Flow::Continue;
        }
        Command::Json => {
            print_chart_json(dashboard);
            return Flow::Continue;
        }
        Command::Set { kind, field, value } => {
            let applied = match kind {
                EntityKind::Exercise => {
                    let fields = &mut dashboard.exercise_form_mut().fields;
                    commands::apply_exercise_field(fields, &field, &value)
                }
                EntityKind::Session => {
                    let fields = &mut dashboard.session_form_mut().fields;
                    commands::apply_session_field(fields, &field, &value)
                }
            };
            if let Err(err) = applied {
                dashboard.prompt_mut().alert(&err.to_string());
            }
            return Flow::Redraw;
        }
        Command::ToggleDay(day) => {
            dashboard.exercise_form_mut().fields.toggle_day(day);
            return Flow::Redraw;
        }
        Command::Cancel(kind) => {
            dashboard.cancel(kind);
            return Flow::Redraw;
        }
        Command::Submit(EntityKind::Exercise) => {
            let values = dashboard.exercise_form().fields.clone();
            dashboard.submit_exercise_form(values).await.map(|_| ())
        }
        Command::Submit(EntityKind::Session) => {
            let values = dashboard.session_form().fields.clone();
            dashboard.submit_session_form(values).await.map(|_| ())
        }
        Command::Edit(kind, id) => run_row_action(dashboard, kind, id, RowCommand::Edit).await,
        Command::Delete(kind, id) => {
            run_row_action(dashboard, kind, id, RowCommand::Delete).await
        }
    };
    if let Err(err) = result {
        debug!("command failed: {err}");
    }
    Flow::Redraw
}

/// Row actions only run through a binding of the current render.
async fn run_row_action<R: ChartRenderer, P: Prompt>(
    dashboard: &mut Dashboard<R, P>,
    kind: EntityKind,
    id: i64,
    command: RowCommand,
) -> Result<(), ClientError> {
    match dashboard.binding(kind, id, command) {
        Some(binding) => dashboard.dispatch(binding).await,
        None => {
            dashboard
                .prompt_mut()
                .alert(&format!("no {kind} #{id} in the current table"));
            Ok(())
        }
    }
}

fn print_chart_json<R: ChartRenderer, P: Prompt>(dashboard: &Dashboard<R, P>) {
    let configs = [
        charts::category_chart(&dashboard.category_counts()),
        charts::pain_chart(dashboard.pain_points()),
    ];
    match serde_json::to_string_pretty(&configs) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!("failed to encode chart configs: {err}"),
    }
}
