//! Create/update forms with an owned edit target.
//!
//! A [`FormController`] holds the raw value slots of one entity form plus the
//! id of the record being edited, if any. While an id is set, submission
//! updates that record with only the fields the user filled in; otherwise it
//! creates a new record with every field.

use crate::client::{Resource, ResourceClient};
use crate::errors::ClientError;
use crate::models::{Exercise, ExercisePatch, NewExercise, NewSession, Session, SessionPatch};
use crate::ui::Prompt;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Field set and payload rules of one entity form.
pub trait EntityForm: Default + Clone {
    type Record: Resource;
    type Create: Serialize;
    type Patch: Serialize;

    const CREATE_LABEL: &'static str;
    const UPDATE_LABEL: &'static str;
    const CREATED_MESSAGE: &'static str;
    const UPDATED_MESSAGE: &'static str;

    /// Value slots for an existing record; absent optionals become "".
    fn from_record(record: &Self::Record) -> Self;

    fn validate(&self) -> Result<(), ClientError>;

    fn to_create(&self) -> Result<Self::Create, ClientError>;

    /// Patch carrying only non-empty fields.
    fn to_patch(&self) -> Result<Self::Patch, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i64),
    Updated(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
}

/// Marks a submit as in flight until dropped, so a cancelled submit future
/// still re-enables the form.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormController<F: EntityForm> {
    pub fields: F,
    editing_id: Option<i64>,
    message: String,
    submitting: bool,
}

impl<F: EntityForm> FormController<F> {
    pub fn new() -> Self {
        Self {
            fields: F::default(),
            editing_id: None,
            message: String::new(),
            submitting: false,
        }
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            F::UPDATE_LABEL
        } else {
            F::CREATE_LABEL
        }
    }

    /// False while a submit request is in flight.
    pub fn submit_enabled(&self) -> bool {
        !self.submitting
    }

    /// Loads a record into the form and switches to update mode. On failure
    /// nothing changes.
    pub async fn begin_edit(&mut self, client: &ResourceClient, id: i64) -> Result<(), ClientError> {
        let record: F::Record = client.get(id).await?;
        self.fields = F::from_record(&record);
        self.editing_id = Some(id);
        self.message = format!("Editing #{id}");
        debug!(kind = %F::Record::KIND, id, "edit started");
        Ok(())
    }

    /// Creates or updates depending on the edit target. On success the form
    /// is blanked and back in create mode; the caller refreshes dependent
    /// views and then calls [`FormController::acknowledge`]. On failure the
    /// fields and edit target are kept and the error text is shown inline.
    pub async fn submit(&mut self, client: &ResourceClient) -> Result<SubmitOutcome, ClientError> {
        if self.submitting {
            return Err(ClientError::Busy);
        }
        if let Err(err) = self.fields.validate() {
            self.message = format!("Error: {err}");
            return Err(err);
        }

        let result = {
            let _in_flight = InFlight::enter(&mut self.submitting);
            Self::send(&self.fields, self.editing_id, client).await
        };

        match result {
            Ok(outcome) => {
                self.clear();
                Ok(outcome)
            }
            Err(err) => {
                self.message = format!("Error: {err}");
                Err(err)
            }
        }
    }

    async fn send(
        fields: &F,
        editing_id: Option<i64>,
        client: &ResourceClient,
    ) -> Result<SubmitOutcome, ClientError> {
        match editing_id {
            Some(id) => {
                let patch = fields.to_patch()?;
                let updated: F::Record = client.update(id, &patch).await?;
                Ok(SubmitOutcome::Updated(updated.id()))
            }
            None => {
                let body = fields.to_create()?;
                let created: F::Record = client.create(&body).await?;
                Ok(SubmitOutcome::Created(created.id()))
            }
        }
    }

    pub fn acknowledge(&mut self, outcome: SubmitOutcome) {
        self.message = match outcome {
            SubmitOutcome::Created(_) => F::CREATED_MESSAGE,
            SubmitOutcome::Updated(_) => F::UPDATED_MESSAGE,
        }
        .to_string();
    }

    /// Back to a blank create form, whatever the current state.
    pub fn reset(&mut self) {
        self.clear();
    }

    pub fn cancel(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.fields = F::default();
        self.editing_id = None;
        self.message.clear();
    }

    /// Deletes a record after confirmation. Declining makes no request.
    pub async fn delete<P: Prompt + ?Sized>(
        &mut self,
        client: &ResourceClient,
        prompt: &mut P,
        id: i64,
    ) -> Result<DeleteOutcome, ClientError> {
        let kind = F::Record::KIND;
        if !prompt.confirm(&format!("Delete {kind} #{id}?")) {
            debug!(%kind, id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }
        client.remove(kind, id).await?;
        if self.editing_id == Some(id) {
            info!(%kind, id, "record under edit was deleted, leaving edit mode");
            self.clear();
        }
        Ok(DeleteOutcome::Deleted)
    }
}

fn trimmed_or_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_optional_int(label: &str, raw: &str) -> Result<Option<i64>, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ClientError::validation(format!("{label} must be a whole number")))
}

fn parse_optional_positive(label: &str, raw: &str) -> Result<Option<i64>, ClientError> {
    match parse_optional_int(label, raw)? {
        Some(value) if value <= 0 => Err(ClientError::validation(format!(
            "{label} must be a positive whole number"
        ))),
        other => Ok(other),
    }
}

fn parse_pain(raw: &str) -> Result<Option<i64>, ClientError> {
    match parse_optional_int("pain", raw)? {
        Some(value) if !(0..=10).contains(&value) => {
            Err(ClientError::validation("pain must be between 0 and 10"))
        }
        other => Ok(other),
    }
}

fn parse_rom(raw: &str) -> Result<Option<i64>, ClientError> {
    match parse_optional_int("ROM", raw)? {
        Some(value) if !(0..=180).contains(&value) => {
            Err(ClientError::validation("ROM must be between 0 and 180 degrees"))
        }
        other => Ok(other),
    }
}

fn optional_slot(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseFields {
    pub name: String,
    pub side: String,
    pub category: String,
    pub target_sets: String,
    pub target_reps: String,
    pub target_hold_sec: String,
    /// Checked days of week, 0 = Sunday.
    pub schedule_dow: BTreeSet<u8>,
}

impl Default for ExerciseFields {
    // A blank exercise is a mobility drill of 3×12 with a 2 s hold.
    fn default() -> Self {
        Self {
            name: String::new(),
            side: "left".to_string(),
            category: "mobility".to_string(),
            target_sets: "3".to_string(),
            target_reps: "12".to_string(),
            target_hold_sec: "2".to_string(),
            schedule_dow: BTreeSet::new(),
        }
    }
}

impl ExerciseFields {
    /// Checks or unchecks a day. Days outside 0..=6 are ignored.
    pub fn toggle_day(&mut self, day: u8) {
        if day > 6 {
            return;
        }
        if !self.schedule_dow.remove(&day) {
            self.schedule_dow.insert(day);
        }
    }

    fn targets(&self) -> Result<(Option<i64>, Option<i64>, Option<i64>), ClientError> {
        Ok((
            parse_optional_positive("target sets", &self.target_sets)?,
            parse_optional_positive("target reps", &self.target_reps)?,
            parse_optional_positive("target hold", &self.target_hold_sec)?,
        ))
    }
}

impl EntityForm for ExerciseFields {
    type Record = Exercise;
    type Create = NewExercise;
    type Patch = ExercisePatch;

    const CREATE_LABEL: &'static str = "Add Exercise";
    const UPDATE_LABEL: &'static str = "Update Exercise";
    const CREATED_MESSAGE: &'static str = "Saved ✓";
    const UPDATED_MESSAGE: &'static str = "Updated ✓";

    fn from_record(record: &Exercise) -> Self {
        Self {
            name: record.name.clone(),
            side: record.side.clone(),
            category: record.category.clone(),
            target_sets: optional_slot(record.target_sets),
            target_reps: optional_slot(record.target_reps),
            target_hold_sec: optional_slot(record.target_hold_sec),
            schedule_dow: record.schedule_days(),
        }
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("name is required"));
        }
        self.targets().map(|_| ())
    }

    fn to_create(&self) -> Result<NewExercise, ClientError> {
        let (target_sets, target_reps, target_hold_sec) = self.targets()?;
        Ok(NewExercise {
            name: self.name.trim().to_string(),
            side: self.side.trim().to_string(),
            category: self.category.trim().to_string(),
            target_sets,
            target_reps,
            target_hold_sec,
            schedule_dow: self.schedule_dow.iter().copied().collect(),
        })
    }

    fn to_patch(&self) -> Result<ExercisePatch, ClientError> {
        let (target_sets, target_reps, target_hold_sec) = self.targets()?;
        Ok(ExercisePatch {
            name: trimmed_or_none(&self.name),
            side: trimmed_or_none(&self.side),
            category: trimmed_or_none(&self.category),
            target_sets,
            target_reps,
            target_hold_sec,
            schedule_dow: (!self.schedule_dow.is_empty())
                .then(|| self.schedule_dow.iter().copied().collect()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFields {
    pub exercise_id: String,
    pub date: String,
    pub sets: String,
    pub reps: String,
    pub hold_sec: String,
    pub pain_0_10: String,
    /// Range of motion in degrees.
    pub rom_deg: String,
}

struct ParsedSession {
    exercise_id: i64,
    date: String,
    sets: Option<i64>,
    reps: Option<i64>,
    hold_sec: Option<i64>,
    pain_0_10: Option<i64>,
    rom_deg: Option<i64>,
}

impl SessionFields {
    fn parse(&self) -> Result<ParsedSession, ClientError> {
        let exercise_id = match parse_optional_int("exercise", &self.exercise_id)? {
            Some(id) if id > 0 => id,
            _ => return Err(ClientError::validation("choose an exercise")),
        };
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ClientError::validation("date must be YYYY-MM-DD"))?;
        Ok(ParsedSession {
            exercise_id,
            date: date.format("%Y-%m-%d").to_string(),
            sets: parse_optional_positive("sets", &self.sets)?,
            reps: parse_optional_positive("reps", &self.reps)?,
            hold_sec: parse_optional_positive("hold", &self.hold_sec)?,
            pain_0_10: parse_pain(&self.pain_0_10)?,
            rom_deg: parse_rom(&self.rom_deg)?,
        })
    }
}

impl EntityForm for SessionFields {
    type Record = Session;
    type Create = NewSession;
    type Patch = SessionPatch;

    const CREATE_LABEL: &'static str = "Log Session";
    const UPDATE_LABEL: &'static str = "Update Session";
    const CREATED_MESSAGE: &'static str = "Session entry added ✓";
    const UPDATED_MESSAGE: &'static str = "Session updated ✓";

    fn from_record(record: &Session) -> Self {
        Self {
            exercise_id: record.exercise_id.to_string(),
            date: record.date.clone(),
            sets: optional_slot(record.sets),
            reps: optional_slot(record.reps),
            hold_sec: optional_slot(record.hold_sec),
            pain_0_10: optional_slot(record.pain_0_10),
            rom_deg: optional_slot(record.rom_deg),
        }
    }

    fn validate(&self) -> Result<(), ClientError> {
        self.parse().map(|_| ())
    }

    fn to_create(&self) -> Result<NewSession, ClientError> {
        let parsed = self.parse()?;
        Ok(NewSession {
            exercise_id: parsed.exercise_id,
            date: parsed.date,
            sets: parsed.sets,
            reps: parsed.reps,
            hold_sec: parsed.hold_sec,
            pain_0_10: parsed.pain_0_10,
            rom_deg: parsed.rom_deg,
        })
    }

    fn to_patch(&self) -> Result<SessionPatch, ClientError> {
        let parsed = self.parse()?;
        Ok(SessionPatch {
            exercise_id: Some(parsed.exercise_id),
            date: Some(parsed.date),
            sets: parsed.sets,
            reps: parsed.reps,
            hold_sec: parsed.hold_sec,
            pain_0_10: parsed.pain_0_10,
            rom_deg: parsed.rom_deg,
        })
    }
}

pub type ExerciseForm = FormController<ExerciseFields>;
pub type SessionForm = FormController<SessionFields>;
