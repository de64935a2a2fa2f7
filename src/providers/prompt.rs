/// System message sent with every recipe request.
pub const RECIPE_SYSTEM_PROMPT: &str = "You are an expert chef and dataset curator.";

/// The user prompt template for turning a transcript into a recipe.
///
/// Loaded from `prompt.txt` at compile time. The `{transcript}` placeholder
/// is replaced with the transcript text.
pub const RECIPE_PROMPT_TEMPLATE: &str = include_str!("prompt.txt");

const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// Build the user prompt for one transcript.
pub fn build_recipe_prompt(transcript: &str) -> String {
    RECIPE_PROMPT_TEMPLATE.replacen(TRANSCRIPT_PLACEHOLDER, transcript, 1)
}
