pub mod collector;
pub mod config;
pub mod error;
pub mod generator;
pub mod jsonl;
pub mod model;
pub mod pacing;
pub mod providers;

pub use collector::{extract_identifier, CollectReport, Collector, TranscriptFetcher};
pub use config::{load_config, CollectorConfig, GeneratorConfig, PipelineConfig, ProviderConfig};
pub use error::{ItemFailure, PipelineError};
pub use generator::{convert_to_instruction_format, GenerateReport, RecipeGenerator};
pub use jsonl::{load_processed_ids, load_transcripts, ParsedLine, ProcessedIds};
pub use model::{InstructionExample, RecipeRecord, TranscriptRecord};
pub use pacing::{FixedPacer, NoPacer, Pace, Pacer};
pub use providers::{LlmProvider, ProviderFactory};
