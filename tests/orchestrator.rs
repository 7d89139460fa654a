use anyhow::anyhow;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use textsift::config::Ocr;
use textsift::error::ExtractError;
use textsift::ocr::{DocumentLocation, JobStatus, StatusPage, TextDetection};
use textsift::orchestrator::Orchestrator;

struct ScriptedService {
    start_result: Mutex<Option<anyhow::Result<String>>>,
    responses: Mutex<VecDeque<anyhow::Result<StatusPage>>>,
    tokens_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedService {
    fn new(responses: Vec<anyhow::Result<StatusPage>>) -> Self {
        Self {
            start_result: Mutex::new(None),
            responses: Mutex::new(responses.into_iter().collect()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    fn with_start_error(msg: &str) -> Self {
        let svc = Self::new(Vec::new());
        *svc.start_result.lock().unwrap() = Some(Err(anyhow!("{msg}")));
        svc
    }

    fn tokens(&self) -> Vec<Option<String>> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

impl TextDetection for &ScriptedService {
    async fn start_job(&self, _location: &DocumentLocation) -> anyhow::Result<String> {
        self.start_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok("job-1".to_string()))
    }

    async fn job_status(
        &self,
        _job_id: &str,
        next_token: Option<&str>,
    ) -> anyhow::Result<StatusPage> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(next_token.map(|s| s.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

fn in_progress() -> anyhow::Result<StatusPage> {
    Ok(StatusPage {
        status: JobStatus::InProgress,
        lines: Vec::new(),
        next_token: None,
        failure_reason: None,
    })
}

fn succeeded(lines: &[&str], next_token: Option<&str>) -> anyhow::Result<StatusPage> {
    Ok(StatusPage {
        status: JobStatus::Succeeded,
        lines: lines.iter().map(|s| s.to_string()).collect(),
        next_token: next_token.map(|s| s.to_string()),
        failure_reason: None,
    })
}

fn failed(reason: &str) -> anyhow::Result<StatusPage> {
    Ok(StatusPage {
        status: JobStatus::Failed,
        lines: Vec::new(),
        next_token: None,
        failure_reason: Some(reason.to_string()),
    })
}

fn cfg(max_poll_attempts: u32) -> Ocr {
    Ocr {
        poll_interval_seconds: 5,
        max_poll_attempts,
        request_timeout_seconds: 60,
    }
}

fn location() -> DocumentLocation {
    DocumentLocation {
        bucket: "bucket".into(),
        key: "reports/doc.pdf".into(),
    }
}

#[tokio::test(start_paused = true)]
async fn aggregates_lines_across_result_pages_in_order() {
    let svc = ScriptedService::new(vec![
        in_progress(),
        in_progress(),
        succeeded(&["A", "B"], Some("t1")),
        succeeded(&["C"], None),
    ]);
    let orch = Orchestrator::new(&cfg(60), &svc).unwrap();

    let outcome = orch.extract(&location()).await.unwrap();

    assert_eq!(outcome.text, "A\nB\nC");
    assert_eq!(outcome.line_count, 3);
    assert_eq!(outcome.result_pages, 2);
    assert_eq!(outcome.status_queries, 4);
    // Pagination issues exactly one follow-up query carrying the token.
    assert_eq!(
        svc.tokens(),
        vec![None, None, None, Some("t1".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn pending_job_times_out_after_the_full_budget() {
    let svc = ScriptedService::new((0..60).map(|_| in_progress()).collect());
    let orch = Orchestrator::new(&cfg(60), &svc).unwrap();

    let start = tokio::time::Instant::now();
    let err = orch.poll_until_complete("job-1").await.unwrap_err();

    assert!(matches!(err, ExtractError::JobTimeout { attempts: 60 }));
    assert_eq!(svc.tokens().len(), 60);
    // 60 polls at 5s each on virtual time.
    assert_eq!(start.elapsed(), Duration::from_secs(300));
}

#[tokio::test(start_paused = true)]
async fn failed_job_carries_the_service_reason() {
    let svc = ScriptedService::new(vec![in_progress(), failed("document too blurry")]);
    let orch = Orchestrator::new(&cfg(60), &svc).unwrap();

    let err = orch.poll_until_complete("job-1").await.unwrap_err();

    match err {
        ExtractError::JobFailed { reason } => assert_eq!(reason, "document too blurry"),
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn transient_query_errors_consume_attempts_and_retry() {
    let svc = ScriptedService::new(vec![
        Err(anyhow!("connection reset")),
        in_progress(),
        Err(anyhow!("throttled")),
        succeeded(&["only line"], None),
    ]);
    let orch = Orchestrator::new(&cfg(60), &svc).unwrap();

    let outcome = orch.poll_until_complete("job-1").await.unwrap();
    assert_eq!(outcome.text, "only line");
    assert_eq!(outcome.status_queries, 4);
}

#[tokio::test(start_paused = true)]
async fn transient_error_on_final_attempt_is_a_polling_error() {
    let svc = ScriptedService::new(vec![
        Err(anyhow!("connection reset")),
        Err(anyhow!("connection reset again")),
    ]);
    let orch = Orchestrator::new(&cfg(2), &svc).unwrap();

    let err = orch.poll_until_complete("job-1").await.unwrap_err();
    assert!(matches!(err, ExtractError::Polling { attempts: 2, .. }));
}

#[tokio::test(start_paused = true)]
async fn pagination_retries_the_same_token_without_losing_lines() {
    let svc = ScriptedService::new(vec![
        succeeded(&["A"], Some("t1")),
        Err(anyhow!("socket closed")),
        succeeded(&["B"], None),
    ]);
    let orch = Orchestrator::new(&cfg(60), &svc).unwrap();

    let outcome = orch.poll_until_complete("job-1").await.unwrap();

    assert_eq!(outcome.text, "A\nB");
    assert_eq!(
        svc.tokens(),
        vec![None, Some("t1".to_string()), Some("t1".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_is_surfaced_immediately() {
    let svc = ScriptedService::with_start_error("quota exceeded");
    let orch = Orchestrator::new(&cfg(60), &svc).unwrap();

    let err = orch.extract(&location()).await.unwrap_err();
    assert!(matches!(err, ExtractError::Submission { .. }));
    assert!(svc.tokens().is_empty());
}

#[test]
fn zero_attempt_budget_is_rejected_at_construction() {
    let svc = ScriptedService::new(Vec::new());
    assert!(Orchestrator::new(&cfg(0), &svc).is_err());
}
