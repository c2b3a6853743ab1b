use crate::models::Exercise;
use std::collections::BTreeMap;

/// Exercise lookup by id, rebuilt from scratch on every exercise fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinIndex {
    by_id: BTreeMap<i64, Exercise>,
}

impl JoinIndex {
    pub fn build(exercises: &[Exercise]) -> Self {
        let by_id = exercises
            .iter()
            .map(|exercise| (exercise.id, exercise.clone()))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: i64) -> Option<&Exercise> {
        self.by_id.get(&id)
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.get(id).map(|exercise| exercise.name.as_str())
    }

    /// Display label for an exercise reference; unknown ids show as the raw id.
    pub fn label(&self, id: i64) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => id.to_string(),
        }
    }

    /// Chart label for an exercise reference; unknown ids read `Exercise {id}`.
    pub fn chart_label(&self, id: i64) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => format!("Exercise {id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
