use crate::{GeneratedRecord, GeneratingTask, TaskId};
use chrono::Utc;
use scene::ShapeId;
use services::models::{
    default_model, seedream_aspect_label, GeminiImageSize, ImageModel, Provider,
    DEFAULT_GEMINI_ASPECT_RATIO, DEFAULT_SEEDREAM_SIZE,
};
use services::GenerateImageParams;
use std::collections::HashMap;
use std::fmt;

/// Maximum simultaneously in-flight generation tasks. Admission is
/// counted: starting a sixth task is rejected, nothing queues.
pub const MAX_CONCURRENT_TASKS: usize = 5;

/// Error type for store transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The admission cap is reached; retry after a task finishes.
    TaskLimitReached { max: usize },
    /// The task id is not in flight (already finished, or never began).
    UnknownTask(TaskId),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskLimitReached { max } => {
                write!(f, "At most {} images can be generated at once", max)
            }
            Self::UnknownTask(id) => write!(f, "No generating task {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// State behind the prompt panel.
pub struct WorkflowStore {
    prompt: String,
    model: &'static ImageModel,
    gemini_aspect_ratio: String,
    gemini_image_size: GeminiImageSize,
    seedream_size: String,
    tasks: HashMap<TaskId, GeneratingTask>,
    history: Vec<GeneratedRecord>,
    error: Option<String>,
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: default_model(),
            gemini_aspect_ratio: DEFAULT_GEMINI_ASPECT_RATIO.to_string(),
            gemini_image_size: GeminiImageSize::default(),
            seedream_size: DEFAULT_SEEDREAM_SIZE.to_string(),
            tasks: HashMap::new(),
            history: Vec::new(),
            error: None,
        }
    }
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn model(&self) -> &'static ImageModel {
        self.model
    }

    pub fn set_model(&mut self, model: &'static ImageModel) {
        self.model = model;
    }

    pub fn set_gemini_aspect_ratio(&mut self, ratio: impl Into<String>) {
        self.gemini_aspect_ratio = ratio.into();
    }

    pub fn set_gemini_image_size(&mut self, size: GeminiImageSize) {
        self.gemini_image_size = size;
    }

    pub fn set_seedream_size(&mut self, size: impl Into<String>) {
        self.seedream_size = size.into();
    }

    pub fn is_generating(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn generating_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn can_start_task(&self) -> bool {
        self.tasks.len() < MAX_CONCURRENT_TASKS
    }

    pub fn tasks(&self) -> impl Iterator<Item = &GeneratingTask> {
        self.tasks.values()
    }

    pub fn history(&self) -> &[GeneratedRecord] {
        &self.history
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Admit a new generation task, capturing the current model and
    /// size options for display.
    pub fn begin(
        &mut self,
        shape_id: Option<ShapeId>,
        prompt: impl Into<String>,
    ) -> Result<TaskId, StoreError> {
        if !self.can_start_task() {
            return Err(StoreError::TaskLimitReached {
                max: MAX_CONCURRENT_TASKS,
            });
        }

        let (aspect_ratio, image_size) = match self.model.provider {
            Provider::Gemini => (
                self.gemini_aspect_ratio.clone(),
                self.gemini_image_size.to_string(),
            ),
            Provider::Seedream => (
                seedream_aspect_label(&self.seedream_size)
                    .unwrap_or("1:1")
                    .to_string(),
                self.seedream_size.clone(),
            ),
        };

        let task = GeneratingTask {
            id: TaskId::new(),
            shape_id,
            prompt: prompt.into(),
            model_id: self.model.id.to_string(),
            model_name: self.model.name.to_string(),
            aspect_ratio,
            image_size,
            started_at: Utc::now(),
        };
        let id = task.id;
        self.tasks.insert(id, task);
        Ok(id)
    }

    /// Finish a task successfully: drop it and prepend the result to
    /// the history.
    pub fn complete(
        &mut self,
        task_id: TaskId,
        data_url: impl Into<String>,
    ) -> Result<(), StoreError> {
        let task = self
            .tasks
            .remove(&task_id)
            .ok_or(StoreError::UnknownTask(task_id))?;
        self.history.insert(
            0,
            GeneratedRecord {
                task: task.id,
                data_url: data_url.into(),
                prompt: task.prompt,
                model_id: task.model_id,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Finish a task with an error: drop it (releasing its admission
    /// slot) and record the message.
    pub fn fail(&mut self, task_id: TaskId, message: impl Into<String>) -> Result<(), StoreError> {
        self.tasks
            .remove(&task_id)
            .ok_or(StoreError::UnknownTask(task_id))?;
        self.error = Some(message.into());
        Ok(())
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Generation parameters for the current model and size options.
    /// Gemini models send aspect ratio + resolution tier; Seedream
    /// models send pixel dimensions.
    pub fn generation_params(
        &self,
        prompt: impl Into<String>,
        reference_images: Vec<String>,
    ) -> GenerateImageParams {
        let gemini = self.model.provider == Provider::Gemini;
        GenerateImageParams {
            prompt: prompt.into(),
            negative_prompt: None,
            model_id: Some(self.model.id.to_string()),
            reference_images,
            aspect_ratio: gemini.then(|| self.gemini_aspect_ratio.clone()),
            image_size: gemini.then_some(self.gemini_image_size),
            size: (!gemini).then(|| self.seedream_size.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::find_model;

    #[test]
    fn admission_rejects_the_sixth_task() {
        let mut store = WorkflowStore::new();
        let mut ids = Vec::new();
        for i in 0..MAX_CONCURRENT_TASKS {
            ids.push(store.begin(None, format!("prompt {}", i)).unwrap());
        }
        assert!(!store.can_start_task());

        let err = store.begin(None, "one too many").unwrap_err();
        assert_eq!(err, StoreError::TaskLimitReached { max: 5 });

        // A failure releases its slot; admission opens back up.
        store.fail(ids[0], "boom").unwrap();
        assert!(store.can_start_task());
        store.begin(None, "retry").unwrap();
        assert_eq!(store.generating_count(), MAX_CONCURRENT_TASKS);
    }

    #[test]
    fn complete_moves_the_task_into_history_newest_first() {
        let mut store = WorkflowStore::new();
        let first = store.begin(None, "a cat").unwrap();
        let second = store.begin(None, "a dog").unwrap();
        assert!(store.is_generating());

        store.complete(first, "data:image/png;base64,cat").unwrap();
        store.complete(second, "data:image/png;base64,dog").unwrap();

        assert!(!store.is_generating());
        let history = store.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].prompt, "a dog");
        assert_eq!(history[1].prompt, "a cat");
        assert_eq!(history[0].model_id, "gemini-2.5-flash-image");

        store.clear_history();
        assert!(store.history().is_empty());
    }

    #[test]
    fn finishing_an_unknown_task_is_an_error() {
        let mut store = WorkflowStore::new();
        let ghost = TaskId::from_u128(99);
        assert_eq!(
            store.complete(ghost, "data:").unwrap_err(),
            StoreError::UnknownTask(ghost)
        );
        assert_eq!(
            store.fail(ghost, "boom").unwrap_err(),
            StoreError::UnknownTask(ghost)
        );
    }

    #[test]
    fn fail_records_the_error_until_cleared() {
        let mut store = WorkflowStore::new();
        let task = store.begin(None, "a fox").unwrap();
        store.fail(task, "Nebula API error: quota").unwrap();

        assert_eq!(store.error(), Some("Nebula API error: quota"));
        store.clear_error();
        assert_eq!(store.error(), None);
    }

    #[test]
    fn tasks_capture_gemini_options_at_admission() {
        let mut store = WorkflowStore::new();
        store.set_gemini_aspect_ratio("16:9");
        store.set_gemini_image_size(GeminiImageSize::FourK);

        let id = store.begin(None, "wide shot").unwrap();
        let task = store.tasks().find(|t| t.id == id).unwrap();
        assert_eq!(task.model_name, "Nano Banana");
        assert_eq!(task.aspect_ratio, "16:9");
        assert_eq!(task.image_size, "4K");
    }

    #[test]
    fn tasks_capture_seedream_options_at_admission() {
        let mut store = WorkflowStore::new();
        store.set_model(find_model("doubao-seedream-4-5-251128").unwrap());
        store.set_seedream_size("2560x1440");

        let id = store.begin(None, "wide shot").unwrap();
        let task = store.tasks().find(|t| t.id == id).unwrap();
        assert_eq!(task.aspect_ratio, "16:9");
        assert_eq!(task.image_size, "2560x1440");
    }

    #[test]
    fn generation_params_follow_the_provider() {
        let mut store = WorkflowStore::new();
        store.set_gemini_aspect_ratio("3:2");
        let params = store.generation_params("a cat", vec!["data:a".into()]);
        assert_eq!(params.model_id.as_deref(), Some("gemini-2.5-flash-image"));
        assert_eq!(params.aspect_ratio.as_deref(), Some("3:2"));
        assert_eq!(params.image_size, Some(GeminiImageSize::OneK));
        assert_eq!(params.size, None);
        assert_eq!(params.reference_images, vec!["data:a".to_string()]);

        store.set_model(find_model("doubao-seedream-3-0-t2i-250415").unwrap());
        let params = store.generation_params("a cat", Vec::new());
        assert_eq!(params.aspect_ratio, None);
        assert_eq!(params.image_size, None);
        assert_eq!(params.size.as_deref(), Some("2048x2048"));
    }
}
