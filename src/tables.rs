use crate::client::ResourceClient;
use crate::errors::ClientError;
use crate::join::JoinIndex;
use crate::models::{EntityKind, Exercise, Session};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCommand {
    Edit,
    Delete,
}

/// An action wired to one rendered row. Bindings only live as long as the
/// render that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBinding {
    pub kind: EntityKind,
    pub command: RowCommand,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<String>,
    pub actions: Vec<RowBinding>,
}

impl TableRow {
    fn new(kind: EntityKind, id: i64, cells: Vec<String>) -> Self {
        let actions = [RowCommand::Edit, RowCommand::Delete]
            .into_iter()
            .map(|command| RowBinding { kind, command, id })
            .collect();
        Self { id, cells, actions }
    }
}

fn find_binding(rows: &[TableRow], id: i64, command: RowCommand) -> Option<RowBinding> {
    rows.iter()
        .find(|row| row.id == id)
        .and_then(|row| row.actions.iter().find(|action| action.command == command))
        .copied()
}

/// Entry of the session form's exercise selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseOption {
    pub id: i64,
    pub name: String,
}

pub fn exercise_options(exercises: &[Exercise]) -> Vec<ExerciseOption> {
    exercises
        .iter()
        .map(|exercise| ExerciseOption {
            id: exercise.id,
            name: exercise.name.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseTable {
    rows: Vec<TableRow>,
}

impl ExerciseTable {
    pub const HEADERS: [&'static str; 6] = ["ID", "Name", "Side", "Category", "Targets", "Schedule"];

    /// Fetches the collection and replaces every row. The fetched records are
    /// returned for the views derived from them.
    pub async fn refresh(&mut self, client: &ResourceClient) -> Result<Vec<Exercise>, ClientError> {
        let exercises = client.list::<Exercise>().await?;
        self.render(&exercises);
        Ok(exercises)
    }

    pub fn render(&mut self, exercises: &[Exercise]) {
        self.rows = exercises.iter().map(exercise_row).collect();
        debug!(rows = self.rows.len(), "exercise table rendered");
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn binding(&self, id: i64, command: RowCommand) -> Option<RowBinding> {
        find_binding(&self.rows, id, command)
    }
}

fn exercise_row(exercise: &Exercise) -> TableRow {
    let cells = vec![
        exercise.id.to_string(),
        exercise.name.clone(),
        exercise.side.clone(),
        exercise.category.clone(),
        format_targets(exercise),
        format_schedule(exercise),
    ];
    TableRow::new(EntityKind::Exercise, exercise.id, cells)
}

pub fn format_targets(exercise: &Exercise) -> String {
    let or_dash = |value: Option<i64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "{}×{} @ {}s",
        or_dash(exercise.target_sets),
        or_dash(exercise.target_reps),
        exercise.target_hold_sec.unwrap_or(0)
    )
}

pub fn format_schedule(exercise: &Exercise) -> String {
    exercise
        .schedule_days()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sessions and the exercises they were joined against, from one refresh.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub sessions: Vec<Session>,
    pub exercises: Vec<Exercise>,
    pub index: JoinIndex,
}

#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    rows: Vec<TableRow>,
}

impl SessionTable {
    pub const HEADERS: [&'static str; 7] =
        ["Date", "Exercise", "Sets", "Reps", "Hold (s)", "Pain", "ROM"];

    pub async fn refresh(&mut self, client: &ResourceClient) -> Result<SessionSnapshot, ClientError> {
        let sessions = client.list::<Session>().await?;
        let exercises = client.list::<Exercise>().await?;
        let index = JoinIndex::build(&exercises);
        self.render(&sessions, &index);
        Ok(SessionSnapshot {
            sessions,
            exercises,
            index,
        })
    }

    pub fn render(&mut self, sessions: &[Session], index: &JoinIndex) {
        self.rows = sessions
            .iter()
            .map(|session| session_row(session, index))
            .collect();
        debug!(rows = self.rows.len(), "session table rendered");
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn binding(&self, id: i64, command: RowCommand) -> Option<RowBinding> {
        find_binding(&self.rows, id, command)
    }
}

fn session_row(session: &Session, index: &JoinIndex) -> TableRow {
    let cells = vec![
        session.date.clone(),
        index.label(session.exercise_id),
        optional_cell(session.sets),
        optional_cell(session.reps),
        optional_cell(session.hold_sec),
        optional_cell(session.pain_0_10),
        optional_cell(session.rom_deg),
    ];
    TableRow::new(EntityKind::Session, session.id, cells)
}

fn optional_cell(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
