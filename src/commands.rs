use crate::forms::{ExerciseFields, SessionFields};
use crate::models::EntityKind;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  show                              redraw tables, forms and charts
  json                              print chart configs as JSON
  edit <exercise|session> <id>      load a row into its form
  set <exercise|session> <field> [value]
      exercise fields: name side category sets reps hold
      session fields:  exercise date sets reps hold pain rom
  day <0-6>                         toggle a scheduled day (0 = Sunday)
  submit <exercise|session>         create, or update while editing
  cancel <exercise|session>         clear the form and leave edit mode
  delete <exercise|session> <id>
  help
  quit";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CommandError(String);

impl CommandError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Json,
    Help,
    Quit,
    Edit(EntityKind, i64),
    Set {
        kind: EntityKind,
        field: String,
        value: String,
    },
    ToggleDay(u8),
    Submit(EntityKind),
    Cancel(EntityKind),
    Delete(EntityKind, i64),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = split_word(line);

    let command = match verb.to_ascii_lowercase().as_str() {
        "show" | "ls" => Command::Show,
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "edit" => {
            let (kind, id) = kind_and_id(rest)?;
            Command::Edit(kind, id)
        }
        "delete" | "rm" => {
            let (kind, id) = kind_and_id(rest)?;
            Command::Delete(kind, id)
        }
        "submit" => Command::Submit(kind_only(rest)?),
        "cancel" | "reset" => Command::Cancel(kind_only(rest)?),
        "set" => {
            let (kind, rest) = split_word(rest);
            let kind = parse_kind(kind)?;
            let (field, value) = split_word(rest);
            if field.is_empty() {
                return Err(CommandError::new("usage: set <exercise|session> <field> [value]"));
            }
            Command::Set {
                kind,
                field: field.to_ascii_lowercase(),
                value: value.to_string(),
            }
        }
        "day" => {
            let day = rest
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|day| *day <= 6)
                .ok_or_else(|| CommandError::new("usage: day <0-6>"))?;
            Command::ToggleDay(day)
        }
        other => return Err(CommandError::new(format!("unknown command '{other}', try 'help'"))),
    };
    Ok(Some(command))
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn parse_kind(raw: &str) -> Result<EntityKind, CommandError> {
    EntityKind::parse(raw)
        .ok_or_else(|| CommandError::new(format!("expected 'exercise' or 'session', got '{raw}'")))
}

fn kind_only(rest: &str) -> Result<EntityKind, CommandError> {
    let (kind, _) = split_word(rest);
    parse_kind(kind)
}

fn kind_and_id(rest: &str) -> Result<(EntityKind, i64), CommandError> {
    let (kind, rest) = split_word(rest);
    let kind = parse_kind(kind)?;
    let id = rest
        .trim()
        .parse::<i64>()
        .map_err(|_| CommandError::new(format!("expected a numeric id, got '{}'", rest.trim())))?;
    Ok((kind, id))
}

/// Writes a value slot of the exercise form. An empty value clears it.
pub fn apply_exercise_field(
    fields: &mut ExerciseFields,
    field: &str,
    value: &str,
) -> Result<(), CommandError> {
    let slot = match field {
        "name" => &mut fields.name,
        "side" => &mut fields.side,
        "category" => &mut fields.category,
        "sets" | "target_sets" => &mut fields.target_sets,
        "reps" | "target_reps" => &mut fields.target_reps,
        "hold" | "target_hold_sec" => &mut fields.target_hold_sec,
        other => return Err(CommandError::new(format!("unknown exercise field '{other}'"))),
    };
    *slot = value.to_string();
    Ok(())
}

pub fn apply_session_field(
    fields: &mut SessionFields,
    field: &str,
    value: &str,
) -> Result<(), CommandError> {
    let slot = match field {
        "exercise" | "exercise_id" => &mut fields.exercise_id,
        "date" => &mut fields.date,
        "sets" => &mut fields.sets,
        "reps" => &mut fields.reps,
        "hold" | "hold_sec" => &mut fields.hold_sec,
        "pain" | "pain_0_10" => &mut fields.pain_0_10,
        "rom" | "rom_deg" => &mut fields.rom_deg,
        other => return Err(CommandError::new(format!("unknown session field '{other}'"))),
    };
    *slot = value.to_string();
    Ok(())
}
