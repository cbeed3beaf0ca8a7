//! Integration tests for a full run
//!
//! These tests drive the public API end to end: configuration, the built-in
//! suite, scripted models and the JSON/console reporters.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tempfile::TempDir;
use toolbench_core::eval::{ScriptedProvider, select_cases};
use toolbench_core::prelude::*;

fn prompt_of(id: &str) -> String {
    builtin_suite()
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.prompt.clone())
        .expect("case exists")
}

fn call(name: &str, args: Value) -> LLMResponse {
    LLMResponse {
        tool_calls: vec![ToolCallRequest {
            id: "call_0".to_string(),
            name: name.to_string(),
            arguments: args,
        }],
        ..Default::default()
    }
}

/// A model that answers the weather and no-tool cases correctly
fn weather_model() -> ScriptedProvider {
    ScriptedProvider::new()
        .with_fallback(LLMResponse::text("I can answer that directly."))
        .respond(
            prompt_of("weather-fixed-date"),
            call("weatherInSfTool", json!({"date": "2025-07-13"})),
        )
        .respond(
            prompt_of("weather-invalid-date"),
            call("weatherInSfTool", json!({"date": "2025-13-01"})),
        )
}

/// Reporter that records the order of calls it receives
#[derive(Clone, Default)]
struct OrderReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl Reporter for OrderReporter {
    fn report_model(&mut self, model: &str, results: &[CaseResult], _: &ModelSummary) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", model, results.len()));
        Ok(())
    }

    fn report_aggregate(&mut self, aggregate: &Aggregate) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("aggregate:{}", aggregate.len()));
        Ok(())
    }
}

#[tokio::test]
async fn test_full_run_writes_result_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out = temp_dir.path().join("results");

    let runner = EvalRunner::new(builtin_suite().to_vec(), Arc::new(ToolRegistry::builtin()))
        .expect("suite is valid");
    let models = vec![
        CandidateModel::new("weather-model", Arc::new(weather_model())).with_reasoning(true),
        CandidateModel::new("silent-model", Arc::new(ScriptedProvider::new())),
    ];

    let order = OrderReporter::default();
    let mut reporters: Vec<Box<dyn Reporter>> = vec![
        Box::new(order.clone()),
        Box::new(JsonFileReporter::new(&out)),
    ];
    let aggregate = runner
        .run_all(&models, &mut reporters)
        .await
        .expect("run completes");

    assert_eq!(
        *order.events.lock().unwrap(),
        vec!["weather-model:10", "silent-model:10", "aggregate:2"]
    );
    assert_eq!(aggregate.get("weather-model"), Some(&ModelSummary { passed: 5, total: 10 }));
    assert_eq!(aggregate.get("silent-model"), Some(&ModelSummary { passed: 0, total: 10 }));

    let per_model: Vec<Value> = serde_json::from_str(
        &std::fs::read_to_string(out.join("weather-model.json")).expect("model file written"),
    )
    .expect("valid json");
    assert_eq!(per_model.len(), 10);
    assert_eq!(per_model[1]["id"], "weather-fixed-date");
    assert_eq!(per_model[1]["passed"], true);
    assert_eq!(
        per_model[1]["actualCalls"],
        json!([{"toolName": "weatherInSfTool", "args": {"date": "2025-07-13"}}])
    );
    assert_eq!(per_model[0]["reason"], "Expected 1 tool calls, got 0");

    let silent: Vec<CaseResult> = serde_json::from_str(
        &std::fs::read_to_string(out.join("silent-model.json")).expect("model file written"),
    )
    .expect("valid json");
    assert!(silent.iter().all(|r| !r.passed));
    assert!(
        silent
            .iter()
            .all(|r| r.reason.as_deref().unwrap().contains("No scripted response"))
    );

    let summary = std::fs::read_to_string(out.join("summary.json")).expect("summary written");
    let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, Value>>(&summary)
        .expect("valid json")
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys.len(), 2);
    assert!(summary.find("weather-model").unwrap() < summary.find("silent-model").unwrap());
}

#[tokio::test]
async fn test_invalid_date_call_still_recorded() {
    // The weather tool rejects the date, but the call itself is what gets judged.
    let suite = select_cases(builtin_suite(), &["weather-invalid-date".to_string()]).unwrap();
    let runner = EvalRunner::new(suite, Arc::new(ToolRegistry::builtin())).unwrap();
    let provider = Arc::new(weather_model());

    let results = runner
        .run_model(&CandidateModel::new("m", provider.clone()))
        .await;
    assert!(results[0].passed);

    let second_request = &provider.requests()[1];
    let tool_reply = second_request.messages.last().unwrap();
    assert_eq!(tool_reply.role, MessageRole::Tool);
    assert!(tool_reply.content.contains("\"success\":false"));
}

#[tokio::test]
async fn test_console_reporter_lines() {
    let suite = select_cases(builtin_suite(), &["control-no-tool-needed".to_string()]).unwrap();
    let runner = EvalRunner::new(suite, Arc::new(ToolRegistry::builtin())).unwrap();
    let provider = ScriptedProvider::new().respond(
        prompt_of("control-no-tool-needed"),
        call("searchTool", json!({"query": "sky blue"})),
    );

    let results = runner
        .run_model(&CandidateModel::new("eager", Arc::new(provider)))
        .await;
    let summary = summarize(&results);

    let mut console = ConsoleReporter::new(Vec::new());
    console.report_model("eager", &results, &summary).unwrap();
    let text = String::from_utf8(console.into_inner()).unwrap();

    assert!(text.contains("❌ control-no-tool-needed: Expected 0 tool calls, got 1"));
    assert!(text.contains("searchTool"));
    assert!(text.contains("eager: 0/1 (0.00%)"));
}

#[test]
fn test_config_file_to_candidates() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bench.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[llm]
provider = "openrouter"
api_key = "test-key"
request_timeout = "45s"

[run]
max_steps = 3
write_files = false

[[models]]
name = "mini"
model = "openai/o4-mini"
reasoning = true

[[models]]
name = "flash"
model = "google/gemini-2.0-flash-001"
provider_options = {{ temperature = 0 }}
"#
    )
    .unwrap();

    let config = BenchConfig::from_file(&path).unwrap();
    assert_eq!(config.run.max_steps, 3);
    assert!(!config.run.write_files);

    let candidates: Vec<CandidateModel> = config
        .select_models(&["flash".to_string(), "mini".to_string()])
        .unwrap()
        .iter()
        .map(|m| CandidateModel::from_config(&config.llm, m))
        .collect::<Result<_>>()
        .unwrap();

    let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["mini", "flash"]);
    assert!(candidates[0].reasoning);
    assert_eq!(candidates[1].provider_options, Some(json!({"temperature": 0})));
    assert_eq!(candidates[0].provider.model_info().model_name, "openai/o4-mini");

    let options = RunOptions::from_config(&config);
    assert_eq!(options.max_steps, 3);
}

#[test]
fn test_unknown_model_is_configuration_error() {
    let err = BenchConfig::default()
        .select_models(&["gpt-99".to_string()])
        .unwrap_err();
    assert!(matches!(err, BenchError::Configuration(_)));
}
