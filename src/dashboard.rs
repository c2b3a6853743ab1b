use crate::charts::{
    self, CATEGORY_CANVAS, CategoryCounts, ChartSlot, PAIN_CANVAS, PROGRESS_DAYS, PainPoint,
    ProgressMetric, ProgressSeries, WeeklyAdherence,
};
use crate::client::ResourceClient;
use crate::errors::ClientError;
use crate::forms::{
    DeleteOutcome, ExerciseFields, ExerciseForm, SessionFields, SessionForm, SubmitOutcome,
};
use crate::models::EntityKind;
use crate::tables::{self, ExerciseOption, ExerciseTable, RowBinding, RowCommand, SessionTable};
use crate::ui::{ChartRenderer, Prompt};
use tracing::{debug, info, warn};

/// Owns every view of the two collections and the commands that mutate them.
///
/// Each command runs its refresh cascade to completion before returning, so
/// a success message is never shown next to pre-mutation data.
pub struct Dashboard<R, P> {
    client: ResourceClient,
    renderer: R,
    prompt: P,
    exercise_table: ExerciseTable,
    session_table: SessionTable,
    exercise_form: ExerciseForm,
    session_form: SessionForm,
    exercise_options: Vec<ExerciseOption>,
    category_counts: CategoryCounts,
    pain_points: Vec<PainPoint>,
    adherence: Option<WeeklyAdherence>,
    progress: Vec<ProgressSeries>,
    category_chart: ChartSlot,
    pain_chart: ChartSlot,
}

impl<R: ChartRenderer, P: Prompt> Dashboard<R, P> {
    pub fn new(client: ResourceClient, renderer: R, prompt: P) -> Self {
        Self {
            client,
            renderer,
            prompt,
            exercise_table: ExerciseTable::default(),
            session_table: SessionTable::default(),
            exercise_form: ExerciseForm::new(),
            session_form: SessionForm::new(),
            exercise_options: Vec::new(),
            category_counts: CategoryCounts::default(),
            pain_points: Vec::new(),
            adherence: None,
            progress: Vec::new(),
            category_chart: ChartSlot::new(CATEGORY_CANVAS),
            pain_chart: ChartSlot::new(PAIN_CANVAS),
        }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    pub fn exercise_table(&self) -> &ExerciseTable {
        &self.exercise_table
    }

    pub fn session_table(&self) -> &SessionTable {
        &self.session_table
    }

    pub fn exercise_form(&self) -> &ExerciseForm {
        &self.exercise_form
    }

    pub fn exercise_form_mut(&mut self) -> &mut ExerciseForm {
        &mut self.exercise_form
    }

    pub fn session_form(&self) -> &SessionForm {
        &self.session_form
    }

    pub fn session_form_mut(&mut self) -> &mut SessionForm {
        &mut self.session_form
    }

    pub fn exercise_options(&self) -> &[ExerciseOption] {
        &self.exercise_options
    }

    pub fn category_counts(&self) -> CategoryCounts {
        self.category_counts
    }

    pub fn pain_points(&self) -> &[PainPoint] {
        &self.pain_points
    }

    pub fn adherence(&self) -> Option<&WeeklyAdherence> {
        self.adherence.as_ref()
    }

    /// Daily ROM and pain averages over the trailing window.
    pub fn progress(&self) -> &[ProgressSeries] {
        &self.progress
    }

    /// Looks up a row action in the current render of a table.
    pub fn binding(&self, kind: EntityKind, id: i64, command: RowCommand) -> Option<RowBinding> {
        match kind {
            EntityKind::Exercise => self.exercise_table.binding(id, command),
            EntityKind::Session => self.session_table.binding(id, command),
        }
    }

    /// Initial population of every view.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        info!(api = self.client.base_url(), "loading dashboard");
        self.refresh_exercise_views().await
    }

    pub async fn submit_exercise_form(
        &mut self,
        values: ExerciseFields,
    ) -> Result<SubmitOutcome, ClientError> {
        self.exercise_form.fields = values;
        let outcome = self.exercise_form.submit(&self.client).await?;
        self.run_cascade(EntityKind::Exercise).await?;
        self.exercise_form.acknowledge(outcome);
        Ok(outcome)
    }

    pub async fn submit_session_form(
        &mut self,
        values: SessionFields,
    ) -> Result<SubmitOutcome, ClientError> {
        self.session_form.fields = values;
        let outcome = self.session_form.submit(&self.client).await?;
        self.run_cascade(EntityKind::Session).await?;
        self.session_form.acknowledge(outcome);
        Ok(outcome)
    }

    /// Puts the matching form into update mode. A failed fetch is alerted and
    /// leaves the form as it was.
    pub async fn begin_edit(&mut self, kind: EntityKind, id: i64) -> Result<(), ClientError> {
        let result = match kind {
            EntityKind::Exercise => self.exercise_form.begin_edit(&self.client, id).await,
            EntityKind::Session => self.session_form.begin_edit(&self.client, id).await,
        };
        if let Err(err) = &result {
            self.prompt.alert(&err.to_string());
        }
        result
    }

    pub fn cancel(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Exercise => self.exercise_form.cancel(),
            EntityKind::Session => self.session_form.cancel(),
        }
    }

    pub async fn request_delete(
        &mut self,
        kind: EntityKind,
        id: i64,
    ) -> Result<DeleteOutcome, ClientError> {
        let result = match kind {
            EntityKind::Exercise => {
                self.exercise_form
                    .delete(&self.client, &mut self.prompt, id)
                    .await
            }
            EntityKind::Session => {
                self.session_form
                    .delete(&self.client, &mut self.prompt, id)
                    .await
            }
        };
        match result {
            Ok(DeleteOutcome::Deleted) => {
                self.run_cascade(kind).await?;
                Ok(DeleteOutcome::Deleted)
            }
            Ok(DeleteOutcome::Declined) => Ok(DeleteOutcome::Declined),
            Err(err) => {
                self.prompt.alert(&err.to_string());
                Err(err)
            }
        }
    }

    /// Runs a row action from the current table render.
    pub async fn dispatch(&mut self, binding: RowBinding) -> Result<(), ClientError> {
        match binding.command {
            RowCommand::Edit => self.begin_edit(binding.kind, binding.id).await,
            RowCommand::Delete => self.request_delete(binding.kind, binding.id).await.map(|_| ()),
        }
    }

    async fn run_cascade(&mut self, kind: EntityKind) -> Result<(), ClientError> {
        debug!(%kind, "running refresh cascade");
        let result = match kind {
            EntityKind::Exercise => self.refresh_exercise_views().await,
            EntityKind::Session => self.refresh_session_views().await,
        };
        if let Err(err) = &result {
            warn!(%kind, "refresh cascade failed: {err}");
            self.prompt.alert(&format!("Refresh failed: {err}"));
        }
        result
    }

    /// Exercise table, selector options and category chart, then everything
    /// that shows exercise names.
    async fn refresh_exercise_views(&mut self) -> Result<(), ClientError> {
        let exercises = self.exercise_table.refresh(&self.client).await?;
        self.exercise_options = tables::exercise_options(&exercises);
        self.category_counts = charts::category_distribution(&exercises);
        self.category_chart.render(
            &mut self.renderer,
            &charts::category_chart(&self.category_counts),
        );
        self.refresh_session_views().await
    }

    async fn refresh_session_views(&mut self) -> Result<(), ClientError> {
        let snapshot = self.session_table.refresh(&self.client).await?;
        self.pain_points = charts::pain_trend(&snapshot.sessions, &snapshot.index);
        self.pain_chart
            .render(&mut self.renderer, &charts::pain_chart(&self.pain_points));
        self.adherence = Some(charts::weekly_adherence(
            &snapshot.exercises,
            &snapshot.sessions,
        ));
        self.progress = ProgressMetric::ALL
            .into_iter()
            .map(|metric| charts::progress_series(&snapshot.sessions, metric, PROGRESS_DAYS))
            .collect();
        Ok(())
    }
}
