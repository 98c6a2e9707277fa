use chrono::{DateTime, Utc};
use scene::ShapeId;
use std::fmt;

/// Unique identifier for a generation task.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(uuid::Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a TaskId from a u128 (useful for tests).
    pub fn from_u128(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", &self.0.to_string()[..8])
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Bookkeeping for one in-flight generation request.
///
/// The display fields (model name, aspect ratio, image size) are
/// captured at admission time so the panel can describe the task even
/// if the user changes the pickers while it runs.
#[derive(Clone, Debug)]
pub struct GeneratingTask {
    pub id: TaskId,
    /// Placeholder shape on the canvas, when the caller created one.
    pub shape_id: Option<ShapeId>,
    pub prompt: String,
    pub model_id: String,
    pub model_name: String,
    /// Aspect-ratio label (Gemini ratio, or the Seedream size's label).
    pub aspect_ratio: String,
    /// Resolution tier (Gemini) or pixel dimensions (Seedream).
    pub image_size: String,
    pub started_at: DateTime<Utc>,
}

/// A finished generation kept in the history list.
#[derive(Clone, Debug)]
pub struct GeneratedRecord {
    /// The task that produced this image.
    pub task: TaskId,
    pub data_url: String,
    pub prompt: String,
    pub model_id: String,
    pub created_at: DateTime<Utc>,
}
