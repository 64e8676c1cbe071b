//! Annotation session: the editing state for one open image.
//!
//! A [`Session`] owns the live annotation set, the drawing buffer, the history
//! ledger and the selection. Switching images is the single reset point for all
//! of them, so history never spans images.
//!
//! Every create, update and delete is a two-phase commit: the request goes to
//! the [`AnnotationStore`] first, local state changes only once the store has
//! accepted it, and the history entry is recorded last. Undo and redo take the
//! same route. Because each of these operations borrows the session mutably for
//! its whole duration, overlapping undo/redo/record calls cannot happen.


use crate::config::EditorConfig;
use crate::drawing::DrawingState;
use crate::error::{EditorError, Operation};
use crate::history::{HistoryAction, HistoryConfig, HistoryLedger};
use crate::keybindings::InputCommand;
use crate::model::{
    Annotation, AnnotationClass, AnnotationId, AnnotationPatch, ClassId, CommitRules, Geometry,
    ImageId, NewAnnotation, Point,
};
use crate::store::{AnnotationStore, StoreError};
use crate::tool::Tool;

/// Editing session bound to at most one image at a time.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    rules: CommitRules,
    annotations: Vec<Annotation>,
    classes: Vec<AnnotationClass>,
    selected_annotation_id: Option<AnnotationId>,
    selected_class_id: Option<ClassId>,
    current_image_id: Option<ImageId>,
    drawing: DrawingState,
    history: HistoryLedger,
    history_config: HistoryConfig,
    loading: bool,
    error: Option<String>,
}

impl<S: AnnotationStore> Session<S> {
    /// Create a session with default commit rules and history size.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, CommitRules::default(), HistoryConfig::default())
    }

    /// Create a session from an editor configuration.
    pub fn with_config(store: S, config: &EditorConfig) -> Self {
        let mut session = Self::with_settings(store, config.commit, config.history);
        session.set_classes(config.classes.clone());
        session
    }

    pub fn with_settings(store: S, rules: CommitRules, history_config: HistoryConfig) -> Self {
        Self {
            store,
            rules,
            annotations: Vec::new(),
            classes: Vec::new(),
            selected_annotation_id: None,
            selected_class_id: None,
            current_image_id: None,
            drawing: DrawingState::new(),
            history: HistoryLedger::with_config(history_config),
            history_config,
            loading: false,
            error: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &CommitRules {
        &self.rules
    }

    /// Live annotations of the open image.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == Some(id))
    }

    pub fn classes(&self) -> &[AnnotationClass] {
        &self.classes
    }

    pub fn class_by_id(&self, id: ClassId) -> Option<&AnnotationClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn current_image_id(&self) -> Option<ImageId> {
        self.current_image_id
    }

    pub fn selected_annotation_id(&self) -> Option<AnnotationId> {
        self.selected_annotation_id
    }

    /// The selected annotation, looked up in the live set.
    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected_annotation_id.and_then(|id| self.annotation(id))
    }

    pub fn selected_class_id(&self) -> Option<ClassId> {
        self.selected_class_id
    }

    /// The selected class, looked up in the class list.
    pub fn selected_class(&self) -> Option<&AnnotationClass> {
        self.selected_class_id.and_then(|id| self.class_by_id(id))
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether a persistence request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // ========================================================================
    // Classes and selection
    // ========================================================================

    /// Replace the class list; selects the first class if none is selected.
    pub fn set_classes(&mut self, classes: Vec<AnnotationClass>) {
        self.classes = classes;
        if self.selected_class_id.is_none() {
            self.selected_class_id = self.classes.first().map(|c| c.id);
        }
    }

    pub fn select_class(&mut self, class_id: ClassId) {
        self.selected_class_id = Some(class_id);
    }

    pub fn select_annotation(&mut self, id: Option<AnnotationId>) {
        self.selected_annotation_id = id;
    }

    // ========================================================================
    // Image lifecycle
    // ========================================================================

    /// Switch to an image and load its annotations.
    ///
    /// Drawing state, selection and history are reset before loading. If the
    /// load fails the session stays on the new image with an empty set.
    pub async fn open_image(&mut self, image_id: ImageId) -> Result<(), EditorError> {
        log::info!("Opening image {image_id}");
        self.begin_image(image_id);
        self.error = None;

        let result = tracked(&mut self.loading, self.store.list(image_id)).await;

        let annotations =
            result.map_err(|e| self.fail(EditorError::store(Operation::LoadAnnotations, e)))?;
        log::debug!("Loaded {} annotations for image {image_id}", annotations.len());
        self.annotations = annotations;
        Ok(())
    }

    /// Clear all per-image state, including the current image.
    pub fn reset(&mut self) {
        self.annotations.clear();
        self.selected_annotation_id = None;
        self.current_image_id = None;
        self.drawing.reset();
        self.history = HistoryLedger::with_config(self.history_config);
        self.loading = false;
        self.error = None;
    }

    fn begin_image(&mut self, image_id: ImageId) {
        self.annotations.clear();
        self.selected_annotation_id = None;
        self.drawing.reset();
        self.history = HistoryLedger::with_config(self.history_config);
        self.current_image_id = Some(image_id);
        self.loading = false;
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Switch tools; any unfinished drawing is discarded.
    pub fn set_current_tool(&mut self, tool: Option<Tool>) {
        self.drawing.set_current_tool(tool);
    }

    pub fn start_drawing(&mut self, point: Point) {
        self.drawing.start(point);
    }

    pub fn update_drawing(&mut self, point: Point) {
        self.drawing.update(point);
    }

    /// Add a polygon vertex; ignored for other tools.
    pub fn add_point(&mut self, point: Point) -> bool {
        self.drawing.add_point(point)
    }

    /// Hand over renderer-computed brush or skeleton geometry.
    pub fn supply_geometry(&mut self, geometry: Geometry) -> bool {
        self.drawing.supply_geometry(geometry)
    }

    pub fn cancel_drawing(&mut self) {
        self.drawing.cancel();
    }

    /// Commit the current drawing.
    ///
    /// Without an open image or a selected class this is a no-op. Candidates
    /// below the commit thresholds are discarded silently. Returns the id of
    /// the created annotation, if one was created.
    pub async fn finish_drawing(&mut self) -> Result<Option<AnnotationId>, EditorError> {
        let (Some(_), Some(class_id)) = (self.current_image_id, self.selected_class_id) else {
            log::debug!("Finish ignored: no open image or no selected class");
            return Ok(None);
        };
        let Some(geometry) = self.drawing.finish() else {
            return Ok(None);
        };
        if let Err(rejection) = self.rules.check(&geometry) {
            log::debug!("Discarding {} drawing: {rejection}", geometry.kind());
            return Ok(None);
        }
        self.create_annotation(class_id, geometry).await.map(Some)
    }

    // ========================================================================
    // Create / update / delete
    // ========================================================================

    /// Persist a new annotation on the open image and select it.
    pub async fn create_annotation(
        &mut self,
        class_id: ClassId,
        geometry: Geometry,
    ) -> Result<AnnotationId, EditorError> {
        const OP: Operation = Operation::Create;
        let image_id = self.require_image(OP)?;
        self.error = None;

        let result =
            tracked(&mut self.loading, self.store.create(image_id, class_id, geometry)).await;

        let created = result.map_err(|e| self.fail(EditorError::store(OP, e)))?;
        let id = persisted_id(&created, OP).map_err(|e| self.fail(e))?;

        self.annotations.push(created.clone());
        self.selected_annotation_id = Some(id);
        self.history.record(HistoryAction::Create {
            annotation: created,
        });
        Ok(id)
    }

    /// Apply a partial update to an annotation in the live set.
    pub async fn update_annotation(
        &mut self,
        id: AnnotationId,
        patch: AnnotationPatch,
    ) -> Result<(), EditorError> {
        const OP: Operation = Operation::Update;
        self.error = None;
        let Some(previous) = self.annotation(id).cloned() else {
            return Err(self.fail(EditorError::NotFound { operation: OP, id }));
        };

        let result = tracked(&mut self.loading, self.store.update(id, patch)).await;

        let updated = result.map_err(|e| self.fail(EditorError::store(OP, e)))?;
        self.replace_local(updated.clone());
        self.history.record(HistoryAction::Update {
            previous,
            annotation: updated,
        });
        Ok(())
    }

    /// Delete an annotation from the live set.
    pub async fn delete_annotation(&mut self, id: AnnotationId) -> Result<(), EditorError> {
        const OP: Operation = Operation::Delete;
        self.error = None;
        let Some(snapshot) = self.annotation(id).cloned() else {
            return Err(self.fail(EditorError::NotFound { operation: OP, id }));
        };

        let result = tracked(&mut self.loading, self.store.delete(id)).await;

        result.map_err(|e| self.fail(EditorError::store(OP, e)))?;
        self.remove_local(id);
        self.history.record(HistoryAction::Delete {
            annotation: snapshot,
        });
        Ok(())
    }

    /// Persist several annotations on the open image in one request.
    ///
    /// Entries below the commit thresholds are dropped. Each created
    /// annotation gets its own history entry.
    pub async fn import_annotations(
        &mut self,
        entries: Vec<NewAnnotation>,
    ) -> Result<Vec<AnnotationId>, EditorError> {
        const OP: Operation = Operation::Import;
        let image_id = self.require_image(OP)?;
        self.error = None;

        let entries: Vec<NewAnnotation> = entries
            .into_iter()
            .filter(|entry| match self.rules.check(&entry.geometry) {
                Ok(()) => true,
                Err(rejection) => {
                    log::debug!("Skipping imported {}: {rejection}", entry.geometry.kind());
                    false
                }
            })
            .collect();
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let result = tracked(&mut self.loading, self.store.batch_create(image_id, entries)).await;

        let created = result.map_err(|e| self.fail(EditorError::store(OP, e)))?;
        // Nothing is applied unless every returned record carries an id.
        let ids = created
            .iter()
            .map(|annotation| persisted_id(annotation, OP))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.fail(e))?;
        for annotation in created {
            self.annotations.push(annotation.clone());
            self.history.record(HistoryAction::Create { annotation });
        }
        log::info!("Imported {} annotations into image {image_id}", ids.len());
        Ok(ids)
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Revert the last applied action through the store.
    ///
    /// The cursor only moves once the compensating request succeeded, so a
    /// failed undo can simply be retried.
    pub async fn undo(&mut self) -> Result<(), EditorError> {
        let Some(action) = self.history.undo_target().cloned() else {
            return Ok(());
        };
        log::debug!("Undo: '{}'", action.description());
        self.error = None;

        match self.compensate(&action).await {
            Ok(()) => {
                self.history.step_back();
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Re-apply the next undone action through the store.
    ///
    /// The cursor advances first and is rolled back if the request fails.
    pub async fn redo(&mut self) -> Result<(), EditorError> {
        let Some(action) = self.history.advance() else {
            return Ok(());
        };
        log::debug!("Redo: '{}'", action.description());
        self.error = None;

        self.reapply(&action).await.map_err(|err| {
            self.history.step_back();
            self.fail(err)
        })
    }

    /// Dispatch a command from the input-mapping layer.
    pub async fn handle_input(&mut self, command: InputCommand) -> Result<(), EditorError> {
        match command {
            InputCommand::SetTool(tool) => {
                self.set_current_tool(tool);
                Ok(())
            }
            InputCommand::Undo => self.undo().await,
            InputCommand::Redo => self.redo().await,
        }
    }

    async fn compensate(&mut self, action: &HistoryAction) -> Result<(), EditorError> {
        const OP: Operation = Operation::Undo;
        match action {
            HistoryAction::Create { annotation } => {
                let id = self.local_target(annotation, OP)?;
                tracked(&mut self.loading, self.store.delete(id))
                    .await
                    .map_err(|e| EditorError::store(OP, e))?;
                self.remove_local(id);
            }
            HistoryAction::Update { previous, .. } => {
                let id = self.local_target(previous, OP)?;
                let restored =
                    tracked(&mut self.loading, self.store.update(id, previous.to_patch()))
                        .await
                        .map_err(|e| EditorError::store(OP, e))?;
                self.replace_local(restored);
            }
            HistoryAction::Delete { annotation } => {
                self.recreate(annotation, OP).await?;
            }
        }
        Ok(())
    }

    async fn reapply(&mut self, action: &HistoryAction) -> Result<(), EditorError> {
        const OP: Operation = Operation::Redo;
        match action {
            HistoryAction::Create { annotation } => {
                let id = self.recreate(annotation, OP).await?;
                self.selected_annotation_id = Some(id);
            }
            HistoryAction::Update { annotation, .. } => {
                let id = self.local_target(annotation, OP)?;
                let updated =
                    tracked(&mut self.loading, self.store.update(id, annotation.to_patch()))
                        .await
                        .map_err(|e| EditorError::store(OP, e))?;
                self.replace_local(updated);
            }
            HistoryAction::Delete { annotation } => {
                let id = self.local_target(annotation, OP)?;
                tracked(&mut self.loading, self.store.delete(id))
                    .await
                    .map_err(|e| EditorError::store(OP, e))?;
                self.remove_local(id);
            }
        }
        Ok(())
    }

    /// Create a snapshot again; the store assigns a new identity.
    async fn recreate(
        &mut self,
        snapshot: &Annotation,
        operation: Operation,
    ) -> Result<AnnotationId, EditorError> {
        let request =
            self.store.create(snapshot.image_id, snapshot.class_id, snapshot.geometry.clone());
        let created = tracked(&mut self.loading, request)
            .await
            .map_err(|e| EditorError::store(operation, e))?;
        let new_id = persisted_id(&created, operation)?;
        if let Some(old_id) = snapshot.id {
            self.history.rebind_id(old_id, new_id);
        }
        self.annotations.push(created);
        Ok(new_id)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Id of a snapshot whose annotation is still in the live set.
    fn local_target(
        &self,
        snapshot: &Annotation,
        operation: Operation,
    ) -> Result<AnnotationId, EditorError> {
        let Some(id) = snapshot.id else {
            return Err(EditorError::store(
                operation,
                StoreError::transport("history snapshot has no id"),
            ));
        };
        match self.annotation(id) {
            Some(_) => Ok(id),
            None => Err(EditorError::NotFound { operation, id }),
        }
    }

    fn require_image(&mut self, operation: Operation) -> Result<ImageId, EditorError> {
        match self.current_image_id {
            Some(image_id) => Ok(image_id),
            None => Err(self.fail(EditorError::NoActiveImage { operation })),
        }
    }

    fn replace_local(&mut self, annotation: Annotation) {
        if let Some(slot) = self.annotations.iter_mut().find(|a| a.id == annotation.id) {
            *slot = annotation;
        }
    }

    fn remove_local(&mut self, id: AnnotationId) {
        self.annotations.retain(|a| a.id != Some(id));
        if self.selected_annotation_id == Some(id) {
            self.selected_annotation_id = None;
        }
    }

    /// Record an error in the session error field and hand it back.
    fn fail(&mut self, err: EditorError) -> EditorError {
        log::error!("{err}");
        self.error = Some(err.to_string());
        err
    }
}

/// The id a store assigned to a record it returned.
fn persisted_id(
    annotation: &Annotation,
    operation: Operation,
) -> Result<AnnotationId, EditorError> {
    annotation.id.ok_or_else(|| {
        EditorError::store(
            operation,
            StoreError::transport("store returned an annotation without an id"),
        )
    })
}

/// Raises the loading flag until dropped, including when the request future
/// is dropped before it completes.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Await a store request with the loading flag raised.
async fn tracked<T>(loading: &mut bool, request: impl Future<Output = T>) -> T {
    let _guard = LoadingGuard::new(loading);
    request.await
}
