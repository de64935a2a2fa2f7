use indicatif::ProgressBar;
use log::{error, info};

use crate::config::GeneratorConfig;
use crate::error::{ItemFailure, PipelineError};
use crate::jsonl::{load_transcripts, write_dataset};
use crate::model::{InstructionExample, RecipeRecord, TranscriptRecord};
use crate::pacing::{Pace, Pacer};
use crate::providers::{build_recipe_prompt, LlmProvider, RECIPE_SYSTEM_PROMPT};

/// Map recipe records to instruction-tuning examples, one to one
pub fn convert_to_instruction_format(records: &[RecipeRecord]) -> Vec<InstructionExample> {
    records.iter().map(InstructionExample::from).collect()
}

/// Result of a generation pass
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Successfully generated recipes, in input order
    pub records: Vec<RecipeRecord>,
    /// Transcripts that were dropped, keyed by video id
    pub failures: Vec<ItemFailure>,
}

/// Turns transcripts into structured recipes through a completion API
pub struct RecipeGenerator {
    provider: Box<dyn LlmProvider>,
    pacer: Box<dyn Pacer>,
}

impl RecipeGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, pacer: Box<dyn Pacer>) -> Self {
        Self { provider, pacer }
    }

    /// Ask the completion API for a structured recipe and return it trimmed
    pub async fn generate_structured_recipe(
        &self,
        transcript: &str,
    ) -> Result<String, PipelineError> {
        let prompt = build_recipe_prompt(transcript);
        let recipe = self
            .provider
            .complete(RECIPE_SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| match e {
                PipelineError::Generation(_) => e,
                other => PipelineError::Generation(other.to_string()),
            })?;
        Ok(recipe.trim().to_string())
    }

    /// Generate a recipe for every transcript, in order
    ///
    /// Failed transcripts are logged, recorded and left out of the result;
    /// there is no retry.
    pub async fn run(
        &self,
        transcripts: &[TranscriptRecord],
        progress: &ProgressBar,
    ) -> GenerateReport {
        let mut report = GenerateReport::default();
        progress.set_length(transcripts.len() as u64);

        for transcript in transcripts {
            progress.set_message(transcript.id.clone());

            let pace = match self.generate_structured_recipe(&transcript.text).await {
                Ok(recipe) => {
                    info!("[OK] {}", transcript.id);
                    report.records.push(RecipeRecord::new(transcript, recipe));
                    Pace::Success
                }
                Err(e) => {
                    error!("[ERROR] {}: {}", transcript.id, e);
                    report.failures.push(ItemFailure::new(transcript.id.as_str(), &e));
                    Pace::Failure
                }
            };

            progress.inc(1);
            self.pacer.pause(pace).await;
        }

        progress.finish_and_clear();
        report
    }

    /// Load the transcript file, generate every recipe and write the dataset
    ///
    /// The dataset is written once, after the whole batch has been processed.
    pub async fn generate_dataset(
        &self,
        config: &GeneratorConfig,
        progress: &ProgressBar,
    ) -> Result<GenerateReport, PipelineError> {
        let transcripts = load_transcripts(&config.input_path)?;
        info!(
            "Generating recipes for {} transcripts from {}",
            transcripts.len(),
            config.input_path.display()
        );

        let report = self.run(&transcripts, progress).await;
        let examples = convert_to_instruction_format(&report.records);
        write_dataset(&config.output_path, &examples)?;

        info!(
            "Wrote {} examples to {} ({} failed)",
            examples.len(),
            config.output_path.display(),
            report.failures.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::INSTRUCTION;
    use crate::pacing::NoPacer;
    use async_trait::async_trait;

    /// Echoes a canned recipe, failing for transcripts containing "will fail"
    struct ScriptedProvider;

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, system: &str, prompt: &str) -> Result<String, PipelineError> {
            assert_eq!(system, RECIPE_SYSTEM_PROMPT);
            assert!(prompt.starts_with("Convert the following cooking video transcript"));
            if prompt.contains("will fail") {
                return Err(PipelineError::Generation("rate limited".to_string()));
            }
            Ok("  \n**Recipe**\n* 1 onion\n\n".to_string())
        }
    }

    #[test]
    fn test_convert_to_instruction_format() {
        let records = vec![
            RecipeRecord::new(&TranscriptRecord::new("a", "T"), "R".to_string()),
            RecipeRecord::new(&TranscriptRecord::new("b", ""), String::new()),
        ];

        let examples = convert_to_instruction_format(&records);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].instruction, INSTRUCTION);
        assert_eq!(examples[0].input, "T");
        assert_eq!(examples[0].output, "R");
        assert_eq!(examples[1].instruction, INSTRUCTION);
        assert_eq!(examples[1].input, "");
        assert_eq!(examples[1].output, "");
    }

    #[tokio::test]
    async fn test_generate_structured_recipe_trims() {
        let generator = RecipeGenerator::new(Box::new(ScriptedProvider), Box::new(NoPacer));
        let recipe = generator
            .generate_structured_recipe("chop onions")
            .await
            .unwrap();
        assert_eq!(recipe, "**Recipe**\n* 1 onion");
    }

    #[tokio::test]
    async fn test_run_drops_failed_transcripts() {
        let generator = RecipeGenerator::new(Box::new(ScriptedProvider), Box::new(NoPacer));
        let transcripts = vec![
            TranscriptRecord::new("a", "boil pasta"),
            TranscriptRecord::new("b", "this one will fail"),
            TranscriptRecord::new("c", "toss with butter"),
        ];

        let report = generator.run(&transcripts, &ProgressBar::hidden()).await;

        let ids: Vec<&str> = report.records.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, "b");
        assert!(report.failures[0].reason.contains("rate limited"));
    }
}
