use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance tag attached to every generated recipe
pub const RECIPE_TYPE: &str = "video_recipe";

/// Task description shared by every dataset example
pub const INSTRUCTION: &str = "Convert this cooking video transcript into a structured recipe.";

/// One scraped transcript, stored on disk as `{"<id>": "<text>"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    pub id: String,
    pub text: String,
}

impl TranscriptRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Serialize as a single-key JSON object, without the trailing newline
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut object = Map::with_capacity(1);
        object.insert(self.id.clone(), Value::String(self.text.clone()));
        serde_json::to_string(&object)
    }
}

/// A transcript paired with the recipe the completion API produced for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub video_id: String,
    pub transcript: String,
    pub structured_recipe: String,
    pub recipe_type: String,
}

impl RecipeRecord {
    pub fn new(transcript: &TranscriptRecord, structured_recipe: String) -> Self {
        Self {
            video_id: transcript.id.clone(),
            transcript: transcript.text.clone(),
            structured_recipe,
            recipe_type: RECIPE_TYPE.to_string(),
        }
    }
}

/// Instruction-tuning example, one line of the output dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionExample {
    pub instruction: String,
    pub input: String,
    pub output: String,
}

impl From<&RecipeRecord> for InstructionExample {
    fn from(record: &RecipeRecord) -> Self {
        Self {
            instruction: INSTRUCTION.to_string(),
            input: record.transcript.clone(),
            output: record.structured_recipe.clone(),
        }
    }
}
