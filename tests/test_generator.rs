use async_trait::async_trait;
use mockito::{Matcher, Server};
use serde_json::Value;
use std::fs;
use std::sync::{Arc, Mutex};
use transcript_recipes::model::INSTRUCTION;
use transcript_recipes::providers::OpenAIProvider;
use transcript_recipes::{GeneratorConfig, NoPacer, Pace, Pacer, PipelineError, RecipeGenerator};

/// Remembers every pause instead of sleeping
#[derive(Clone, Default)]
struct RecordingPacer(Arc<Mutex<Vec<Pace>>>);

impl RecordingPacer {
    fn pauses(&self) -> Vec<Pace> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, outcome: Pace) {
        self.0.lock().unwrap().push(outcome);
    }
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{
            "message": {"role": "assistant", "content": content}
        }]
    })
    .to_string()
}

fn generator_with(server_url: String, pacer: Box<dyn Pacer>) -> RecipeGenerator {
    let provider = OpenAIProvider::with_base_url(
        "test_key".to_string(),
        server_url,
        "deepseek-chat".to_string(),
    );
    RecipeGenerator::new(Box::new(provider), pacer)
}

fn generator_for(server_url: String) -> RecipeGenerator {
    generator_with(server_url, Box::new(NoPacer))
}

fn read_lines(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_single_transcript_becomes_one_example() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        input_path: dir.path().join("transcript.jsonl"),
        output_path: dir.path().join("recipe_dataset.jsonl"),
        ..GeneratorConfig::default()
    };
    fs::write(&config.input_path, "{\"abc123\": \"chop onions dice garlic\"}\n").unwrap();

    let recipe = "**Onion Garlic Base**\n\n**Ingredients:**\n* 1 onion\n* 3 cloves garlic";
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("chop onions dice garlic".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(&format!("\n  {recipe}\n\n")))
        .expect(1)
        .create_async()
        .await;

    let report = generator_for(server.url())
        .generate_dataset(&config, &indicatif::ProgressBar::hidden())
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].video_id, "abc123");
    assert_eq!(report.records[0].recipe_type, "video_recipe");

    let lines = read_lines(&config.output_path);
    assert_eq!(lines.len(), 1);
    let example = lines[0].as_object().unwrap();
    assert_eq!(example.len(), 3);
    assert!(!example.contains_key("video_id"));
    assert_eq!(example["instruction"], INSTRUCTION);
    assert_eq!(example["input"], "chop onions dice garlic");
    assert_eq!(example["output"], recipe);
}

#[tokio::test]
async fn test_failed_generation_is_dropped() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        input_path: dir.path().join("transcript.jsonl"),
        output_path: dir.path().join("recipe_dataset.jsonl"),
        ..GeneratorConfig::default()
    };
    fs::write(
        &config.input_path,
        concat!(
            "{\"first\": \"boil the pasta\"}\n",
            "{\"second\": \"burnt toast incident\"}\n",
            "{\"third\": \"toss with butter\"}\n",
        ),
    )
    .unwrap();

    let ok = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("boil the pasta|toss with butter".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("**Buttered Pasta**"))
        .expect(2)
        .create_async()
        .await;
    let failing = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("burnt toast incident".to_string()))
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;

    let pacer = RecordingPacer::default();
    let report = generator_with(server.url(), Box::new(pacer.clone()))
        .generate_dataset(&config, &indicatif::ProgressBar::hidden())
        .await
        .unwrap();
    ok.assert_async().await;
    failing.assert_async().await;

    assert_eq!(
        pacer.pauses(),
        vec![Pace::Success, Pace::Failure, Pace::Success]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key, "second");

    let lines = read_lines(&config.output_path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["input"], "boil the pasta");
    assert_eq!(lines[1]["input"], "toss with butter");
    assert!(lines
        .iter()
        .all(|line| line["input"] != "burnt toast incident"));
}

#[tokio::test]
async fn test_malformed_transcript_file_aborts_before_any_call() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        input_path: dir.path().join("transcript.jsonl"),
        output_path: dir.path().join("recipe_dataset.jsonl"),
        ..GeneratorConfig::default()
    };
    fs::write(&config.input_path, "{\"ok\": \"fine\"}\nnot json at all\n").unwrap();

    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let result = generator_for(server.url())
        .generate_dataset(&config, &indicatif::ProgressBar::hidden())
        .await;

    assert!(matches!(result, Err(PipelineError::Parse { line: 2, .. })));
    assert!(!config.output_path.exists());
    mock.assert_async().await;
}
