/// Integration tests for the dispatch + aggregation path
///
/// These tests verify:
/// 1. The Judge0 client speaks the synchronous submission protocol
/// 2. Transport failures stay distinct from execution outcomes
/// 3. The aggregator keeps one ordered result per test case
/// 4. Harness rejections fail only their own test case

#[cfg(test)]
mod judge0_client_tests {
    use crate::config::LanguageTable;
    use crate::engine::{ExecutionBackend, Judge0Client};
    use crate::error::{GradeError, TransportError};
    use axum::extract::{Query, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use base64::{engine::general_purpose, Engine as _};
    use grader_common::config::JudgeConfig;
    use grader_common::types::{ExecutionOutcome, Language};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Captured {
        query: HashMap<String, String>,
        headers: HeaderMap,
        body: Value,
    }

    #[derive(Clone)]
    struct MockState {
        status: StatusCode,
        reply: String,
        captured: Arc<Mutex<Vec<Captured>>>,
    }

    async fn submissions(
        State(state): State<MockState>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
        state.captured.lock().unwrap().push(Captured {
            query,
            headers,
            body,
        });
        (
            state.status,
            [(header::CONTENT_TYPE, "application/json")],
            state.reply.clone(),
        )
    }

    /// Spawn a fake Judge0 on an ephemeral port that always answers with `reply`
    async fn spawn_judge0(status: StatusCode, reply: &str) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            reply: reply.to_string(),
            captured: captured.clone(),
        };
        let app = Router::new()
            .route("/submissions", post(submissions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn client(config: JudgeConfig) -> Judge0Client {
        Judge0Client::new(config, LanguageTable::builtin()).unwrap()
    }

    fn self_hosted(base_url: &str) -> JudgeConfig {
        JudgeConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_synchronous_submission() {
        let reply = json!({
            "stdout": "[0,1]\n",
            "stderr": null,
            "compile_output": null,
            "status": {"id": 3, "description": "Accepted"},
            "time": "0.041",
            "memory": 9120
        });
        let (url, captured) = spawn_judge0(StatusCode::CREATED, &reply.to_string()).await;
        let mut config = self_hosted(&url);
        config.api_key = Some("secret-token".to_string());

        let outcome = client(config)
            .dispatch("console.log(JSON.stringify([0,1]));", Language::JavaScript)
            .await
            .unwrap();

        match outcome {
            ExecutionOutcome::Accepted(run) => {
                assert_eq!(run.stdout, "[0,1]\n");
                assert_eq!(run.time.as_deref(), Some("0.041"));
                assert_eq!(run.memory, Some(9120));
            }
            other => panic!("expected Accepted, got {:?}", other),
        }

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let request = &captured[0];
        assert_eq!(request.query.get("wait").map(String::as_str), Some("true"));
        assert_eq!(request.query.get("base64_encoded").map(String::as_str), Some("false"));
        assert_eq!(request.body["language_id"], json!(63));
        assert_eq!(request.body["stdin"], json!(""));
        assert_eq!(
            request.body["source_code"],
            json!("console.log(JSON.stringify([0,1]));")
        );
        assert_eq!(request.headers.get("x-auth-token").unwrap(), "secret-token");
        assert!(request.headers.get("x-rapidapi-key").is_none());
    }

    #[tokio::test]
    async fn test_rapidapi_headers() {
        let reply = json!({"status": {"id": 5, "description": "Time Limit Exceeded"}});
        let (url, captured) = spawn_judge0(StatusCode::OK, &reply.to_string()).await;
        let mut config = self_hosted(&url);
        config.api_key = Some("rapid-key".to_string());
        config.host = Some("judge0-ce.p.rapidapi.com".to_string());

        let outcome = client(config).dispatch("print(1)", Language::Python).await.unwrap();
        assert_eq!(outcome, ExecutionOutcome::TimeExceeded);

        let captured = captured.lock().unwrap();
        let headers = &captured[0].headers;
        assert_eq!(headers.get("x-rapidapi-key").unwrap(), "rapid-key");
        assert_eq!(headers.get("x-rapidapi-host").unwrap(), "judge0-ce.p.rapidapi.com");
        assert_eq!(captured[0].body["language_id"], json!(71));
    }

    #[tokio::test]
    async fn test_missing_credentials_never_calls_service() {
        let (url, captured) = spawn_judge0(StatusCode::OK, "{}").await;
        let mut config = self_hosted(&url);
        config.host = Some("judge0-ce.p.rapidapi.com".to_string());

        let err = client(config).dispatch("x", Language::Java).await.unwrap_err();
        assert!(matches!(
            err,
            GradeError::Transport(TransportError::MissingCredentials)
        ));
        assert!(captured.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_failure() {
        let (url, _) = spawn_judge0(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid API key"}"#,
        )
        .await;

        let err = client(self_hosted(&url))
            .dispatch("x", Language::Java)
            .await
            .unwrap_err();
        match err {
            GradeError::Transport(TransportError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_transport_failure() {
        let (url, _) = spawn_judge0(StatusCode::OK, "<html>gateway</html>").await;
        let err = client(self_hosted(&url))
            .dispatch("x", Language::Java)
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::Transport(TransportError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(self_hosted(&format!("http://{}", addr)))
            .dispatch("x", Language::Python)
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::Transport(TransportError::Connection(_))));
    }

    #[tokio::test]
    async fn test_base64_mode() {
        let reply = json!({
            "stdout": general_purpose::STANDARD.encode("tr\u{fc}e\n"),
            "status": {"id": 3, "description": "Accepted"}
        });
        let (url, captured) = spawn_judge0(StatusCode::CREATED, &reply.to_string()).await;
        let mut config = self_hosted(&url);
        config.base64_encoded = true;

        let outcome = client(config).dispatch("print('x')", Language::Python).await.unwrap();
        match outcome {
            ExecutionOutcome::Accepted(run) => assert_eq!(run.stdout, "tr\u{fc}e\n"),
            other => panic!("expected Accepted, got {:?}", other),
        }

        let captured = captured.lock().unwrap();
        assert_eq!(captured[0].query.get("base64_encoded").map(String::as_str), Some("true"));
        assert_eq!(
            captured[0].body["source_code"],
            json!(general_purpose::STANDARD.encode("print('x')"))
        );
    }

    #[tokio::test]
    async fn test_language_missing_from_table() {
        let table = LanguageTable::from_entries([(Language::Python, "Python 3", 71)]);
        let client = Judge0Client::new(self_hosted("http://127.0.0.1:9"), table).unwrap();
        assert!(!client.supports(Language::Java));
        let err = client.dispatch("x", Language::Java).await.unwrap_err();
        assert!(matches!(err, GradeError::UnsupportedLanguage(ref l) if l == "java"));
    }

    #[tokio::test]
    async fn test_unconfigured_service_rejects_request_up_front() {
        use crate::executor::Grader;
        use grader_common::types::{ProblemSignature, TestCase};

        // RapidAPI gateway without a key
        let grader = Grader::new(Arc::new(client(JudgeConfig::default())));

        let err = grader
            .run("", Language::Python, Some(ProblemSignature::TwoSum), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::Transport(TransportError::MissingCredentials)));

        // Missing `target` would fail in the harness before any dispatch
        let cases = [TestCase {
            input: json!({"nums": [1, 2]}),
            output: json!([0, 1]),
            explanation: None,
        }];
        let err = grader
            .run("class Solution: pass", Language::Python, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::Transport(TransportError::MissingCredentials)));

        let configured = Grader::new(Arc::new(client(self_hosted("http://127.0.0.1:9"))));
        let report = configured
            .run("", Language::Python, None, &[])
            .await
            .unwrap();
        assert_eq!(report.total, 0);
    }
}

#[cfg(test)]
mod grader_tests {
    use crate::engine::ExecutionBackend;
    use crate::error::{GradeError, TransportError};
    use crate::executor::{Grader, GraderOptions};
    use async_trait::async_trait;
    use grader_common::types::{
        ExecutionOutcome, Language, ProblemSignature, RunOutput, TestCase, TestStatus,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const TWO_SUM_JS: &str = "var twoSum = function(nums, target) { return [0, 1]; };";

    enum Reply {
        Outcome(ExecutionOutcome),
        TransportDown,
    }

    struct Rule {
        marker: String,
        delay_ms: u64,
        reply: Reply,
    }

    /// Answers each dispatched program with the first rule whose marker it contains
    struct ScriptedBackend {
        supported: Vec<Language>,
        rules: Vec<Rule>,
        programs: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(rules: Vec<Rule>) -> Self {
            Self {
                supported: Language::ALL.to_vec(),
                rules,
                programs: Mutex::new(Vec::new()),
            }
        }

        fn dispatched(&self) -> Vec<String> {
            self.programs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutionBackend for ScriptedBackend {
        fn supports(&self, language: Language) -> bool {
            self.supported.contains(&language)
        }

        async fn dispatch(
            &self,
            program: &str,
            _language: Language,
        ) -> Result<ExecutionOutcome, GradeError> {
            self.programs.lock().unwrap().push(program.to_string());
            let Some(rule) = self.rules.iter().find(|r| program.contains(&r.marker)) else {
                return Ok(ExecutionOutcome::OtherFailure("unscripted".to_string()));
            };
            if rule.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(rule.delay_ms)).await;
            }
            match &rule.reply {
                Reply::Outcome(outcome) => Ok(outcome.clone()),
                Reply::TransportDown => Err(GradeError::Transport(TransportError::Status {
                    status: 503,
                    body: "upstream unavailable".to_string(),
                })),
            }
        }
    }

    fn on_target(target: i64, reply: Reply) -> Rule {
        Rule {
            marker: format!("\"target\":{}", target),
            delay_ms: 0,
            reply,
        }
    }

    fn accepted(stdout: &str) -> Reply {
        Reply::Outcome(ExecutionOutcome::Accepted(RunOutput::from_stdout(stdout)))
    }

    fn two_sum_case(nums: Value, target: i64, output: Value) -> TestCase {
        TestCase {
            input: json!({"nums": nums, "target": target}),
            output,
            explanation: None,
        }
    }

    fn grader(backend: &Arc<ScriptedBackend>) -> Grader {
        Grader::new(backend.clone())
    }

    #[tokio::test]
    async fn test_correct_two_sum_passes() {
        let backend = Arc::new(ScriptedBackend::new(vec![on_target(9, accepted("[0,1]\n"))]));
        let cases = [two_sum_case(json!([2, 7, 11, 15]), 9, json!([0, 1]))];

        let report = grader(&backend)
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.passed, 1);
        assert!(report.results[0].passed);
        assert_eq!(report.results[0].test_case, 1);
        assert_eq!(report.results[0].actual, json!([0, 1]));

        let programs = backend.dispatched();
        assert!(programs[0].starts_with(TWO_SUM_JS));
        assert!(programs[0].contains("twoSum(__input[\"nums\"], __input[\"target\"])"));
    }

    #[tokio::test]
    async fn test_wrong_answer_reports_actual() {
        let backend = Arc::new(ScriptedBackend::new(vec![on_target(9, accepted("[1,2]"))]));
        let cases = [two_sum_case(json!([2, 7, 11, 15]), 9, json!([0, 1]))];

        let report = grader(&backend)
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        let result = &report.results[0];
        assert!(!result.passed);
        assert_eq!(result.status, TestStatus::WrongAnswer);
        assert_eq!(result.actual, json!([1, 2]));
        assert_eq!(result.expected, json!([0, 1]));
    }

    #[tokio::test]
    async fn test_raising_solution_is_runtime_error() {
        // Python embeds the input as an escaped string literal
        let backend = Arc::new(ScriptedBackend::new(vec![Rule {
            marker: "raise Exception('boom')".to_string(),
            delay_ms: 0,
            reply: Reply::Outcome(ExecutionOutcome::RuntimeError(
                "{\"error\": \"Exception: boom\"}".to_string(),
            )),
        }]));
        let source = "class Solution:\n    def twoSum(self, nums, target):\n        raise Exception('boom')\n";
        let cases = [two_sum_case(json!([2, 7]), 9, json!([0, 1]))];

        let report = grader(&backend)
            .run(source, Language::Python, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        let result = &report.results[0];
        assert!(!result.passed);
        assert_eq!(result.status, TestStatus::RuntimeError);
        assert_eq!(result.actual, json!("Runtime error: Exception: boom"));
    }

    #[tokio::test]
    async fn test_unsupported_language_rejected_before_dispatch() {
        let mut backend = ScriptedBackend::new(vec![]);
        backend.supported = vec![Language::Python];
        let backend = Arc::new(backend);
        let cases = [two_sum_case(json!([1]), 1, json!([]))];

        let err = grader(&backend)
            .run("class Solution {}", Language::Java, None, &cases)
            .await
            .unwrap_err();

        assert!(matches!(err, GradeError::UnsupportedLanguage(ref l) if l == "java"));
        assert!(backend.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_compile_error_diagnostic() {
        let backend = Arc::new(ScriptedBackend::new(vec![Rule {
            marker: "int target = 9;".to_string(),
            delay_ms: 0,
            reply: Reply::Outcome(ExecutionOutcome::CompileError(
                "Main.java:4: error: missing return statement".to_string(),
            )),
        }]));
        let cases = [two_sum_case(json!([2, 7]), 9, json!([0, 1]))];

        let report = grader(&backend)
            .run("class Solution {}", Language::Java, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        let result = &report.results[0];
        assert!(!result.passed);
        assert_eq!(result.status, TestStatus::CompileError);
        assert!(result
            .actual
            .as_str()
            .unwrap()
            .contains("Main.java:4: error: missing return statement"));
    }

    #[tokio::test]
    async fn test_harness_failure_isolated() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            on_target(9, accepted("[0,1]")),
            on_target(6, accepted("[1,2]")),
        ]));
        let cases = [
            two_sum_case(json!([2, 7, 11, 15]), 9, json!([0, 1])),
            TestCase {
                input: json!({"nums": [3, 3]}),
                output: json!([0, 1]),
                explanation: None,
            },
            two_sum_case(json!([3, 2, 4]), 6, json!([1, 2])),
        ];

        let report = grader(&backend)
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 2);
        assert_eq!(report.results[1].status, TestStatus::HarnessError);
        assert!(report.results[1].actual.as_str().unwrap().contains("target"));
        assert_eq!(backend.dispatched().len(), 2);
        for (i, result) in report.results.iter().enumerate() {
            assert_eq!(result.test_case, i + 1);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_request() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            on_target(9, accepted("[0,1]")),
            on_target(6, Reply::TransportDown),
        ]));
        let cases = [
            two_sum_case(json!([2, 7]), 9, json!([0, 1])),
            two_sum_case(json!([3, 3]), 6, json!([0, 1])),
        ];

        let err = grader(&backend)
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GradeError::Transport(TransportError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_keeps_input_order() {
        // Earlier cases finish last
        let rules = (1..=4)
            .map(|target| Rule {
                marker: format!("\"target\":{}", target),
                delay_ms: (5 - target as u64) * 20,
                reply: accepted(&format!("[{}]", target)),
            })
            .collect();
        let backend = Arc::new(ScriptedBackend::new(rules));
        let cases: Vec<TestCase> = (1..=4)
            .map(|target| two_sum_case(json!([target]), target, json!([target])))
            .collect();

        let grader = Grader::with_options(backend.clone(), GraderOptions { concurrency: 4 });
        let report = grader
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        assert_eq!(report.passed, 4);
        for (i, result) in report.results.iter().enumerate() {
            assert_eq!(result.test_case, i + 1);
            assert_eq!(result.actual, json!([i + 1]));
        }
    }

    #[tokio::test]
    async fn test_repeated_runs_agree() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            on_target(9, accepted("[0,1]")),
            on_target(6, accepted("[0,2]")),
        ]));
        let cases = [
            two_sum_case(json!([2, 7]), 9, json!([0, 1])),
            two_sum_case(json!([3, 2, 4]), 6, json!([1, 2])),
        ];
        let grader = grader(&backend);

        let first = grader
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();
        let second = grader
            .run(TWO_SUM_JS, Language::JavaScript, Some(ProblemSignature::TwoSum), &cases)
            .await
            .unwrap();

        let passed = |r: &grader_common::types::GradingReport| {
            r.results.iter().map(|t| t.passed).collect::<Vec<_>>()
        };
        assert_eq!(passed(&first), vec![true, false]);
        assert_eq!(passed(&first), passed(&second));
    }

    #[tokio::test]
    async fn test_signature_inferred_from_input() {
        let backend = Arc::new(ScriptedBackend::new(vec![on_target(9, accepted("[0,1]"))]));
        let cases = [two_sum_case(json!([2, 7]), 9, json!([0, 1]))];

        let report = grader(&backend)
            .run(TWO_SUM_JS, Language::JavaScript, None, &cases)
            .await
            .unwrap();
        assert!(report.all_passed());
    }

    #[tokio::test]
    async fn test_unresolved_signature_is_request_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let cases = [TestCase {
            input: json!({"nums": [1, 1]}),
            output: json!(true),
            explanation: None,
        }];

        let err = grader(&backend)
            .run("function solve(nums) {}", Language::JavaScript, None, &cases)
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::UnresolvedSignature(_)));
        assert!(backend.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_empty_test_cases() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let report = grader(&backend)
            .run(TWO_SUM_JS, Language::JavaScript, None, &[])
            .await
            .unwrap();
        assert_eq!(report.total, 0);
        assert!(report.results.is_empty());
    }
}
