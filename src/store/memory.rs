//! In-memory annotation store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{AnnotationStore, StoreError};
use crate::model::{Annotation, AnnotationId, AnnotationPatch, ClassId, Geometry, ImageId, NewAnnotation};

/// Annotation store backed by a vector, with sequential ids.
///
/// A failure can be queued with [`MemoryStore::fail_next`]; the next request of
/// any kind then fails with a transport error and leaves the data untouched.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: Vec<Annotation>,
    next_id: AnnotationId,
    pending_failure: Option<String>,
    requests: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a store whose first assigned id is `first_id`.
    pub fn starting_at(first_id: AnnotationId) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: Vec::new(),
                next_id: first_id,
                pending_failure: None,
                requests: 0,
            }),
        }
    }

    /// Seed the store with existing records, keeping their ids.
    pub fn with_records(records: Vec<Annotation>) -> Self {
        let next_id = records.iter().filter_map(|a| a.id).max().map_or(1, |id| id + 1);
        let store = Self::starting_at(next_id);
        if let Ok(mut inner) = store.inner.lock() {
            inner.records = records;
        }
        store
    }

    /// Make the next request fail with the given message.
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending_failure = Some(message.into());
        }
    }

    /// Look up a stored record.
    pub fn get(&self, id: AnnotationId) -> Option<Annotation> {
        let inner = self.inner.lock().ok()?;
        inner.records.iter().find(|a| a.id == Some(id)).cloned()
    }

    /// Number of stored records across all images.
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of requests received, including failed ones.
    pub fn request_count(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.requests)
    }

    /// Lock the data and consume a queued failure, if any.
    fn begin(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::transport("store lock poisoned"))?;
        inner.requests += 1;
        match inner.pending_failure.take() {
            Some(message) => Err(StoreError::Transport(message)),
            None => Ok(inner),
        }
    }
}

impl Inner {
    fn insert(&mut self, image_id: ImageId, class_id: ClassId, geometry: Geometry) -> Annotation {
        let id = self.next_id;
        self.next_id += 1;
        let annotation = Annotation::new(image_id, class_id, geometry).with_id(id);
        self.records.push(annotation.clone());
        annotation
    }
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn create(
        &self,
        image_id: ImageId,
        class_id: ClassId,
        geometry: Geometry,
    ) -> Result<Annotation, StoreError> {
        let mut inner = self.begin()?;
        Ok(inner.insert(image_id, class_id, geometry))
    }

    async fn list(&self, image_id: ImageId) -> Result<Vec<Annotation>, StoreError> {
        let inner = self.begin()?;
        Ok(inner
            .records
            .iter()
            .filter(|a| a.image_id == image_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: AnnotationId,
        patch: AnnotationPatch,
    ) -> Result<Annotation, StoreError> {
        let mut inner = self.begin()?;
        let record = inner
            .records
            .iter_mut()
            .find(|a| a.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        record.apply(&patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: AnnotationId) -> Result<(), StoreError> {
        let mut inner = self.begin()?;
        let index = inner
            .records
            .iter()
            .position(|a| a.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        inner.records.remove(index);
        Ok(())
    }

    async fn batch_create(
        &self,
        image_id: ImageId,
        annotations: Vec<NewAnnotation>,
    ) -> Result<Vec<Annotation>, StoreError> {
        let mut inner = self.begin()?;
        Ok(annotations
            .into_iter()
            .map(|a| inner.insert(image_id, a.class_id, a.geometry))
            .collect())
    }
}
