//! The process-count template, run through the supervisor.

use pipechain_kernel::{
    ExitPolicy, PipelineInput, PipelineOutput, ProcessCountTemplate, StageSpec, StageStatus,
    Supervisor, SupervisorConfig,
};

/// True if `program` resolves to a file somewhere on PATH.
fn on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

/// Template over a fixed listing instead of the live process table.
fn fixed_listing() -> ProcessCountTemplate {
    ProcessCountTemplate::default().with_list(StageSpec::new(
        "printf",
        ["root 1 init\\nuser 42 editor notes.txt\\nuser 43 editor todo.txt\\n"],
    ))
}

fn count(supervisor: &Supervisor, report: &pipechain_kernel::PipelineReport) -> u64 {
    assert_eq!(report.stages.len(), 3, "{}: three stages", supervisor.config().name);
    report.captured_trimmed().unwrap().parse().unwrap()
}

#[tokio::test]
async fn fixed_listing_counts_matches() {
    let supervisor = Supervisor::new(SupervisorConfig::captured().with_template(fixed_listing()));
    let report = supervisor.run("editor").await.unwrap();

    assert_eq!(count(&supervisor, &report), 2);
    assert_eq!(supervisor.exit_code(&report), 0);
}

#[tokio::test]
async fn fixed_listing_no_match_exits_cleanly() {
    let supervisor = Supervisor::new(SupervisorConfig::captured().with_template(fixed_listing()));
    let report = supervisor.run("5b0c2f7e-91d4-4f0a-8e36-3c2d7a9b1e60").await.unwrap();

    assert_eq!(count(&supervisor, &report), 0);
    assert_eq!(report.stages[1].status, StageStatus::Exited(1));
    assert_eq!(supervisor.exit_code(&report), 0);
}

#[tokio::test]
async fn pipefail_policy_reports_the_filter() {
    let config = SupervisorConfig::captured()
        .with_template(fixed_listing())
        .with_exit_policy(ExitPolicy::Pipefail);
    let supervisor = Supervisor::new(config);
    let report = supervisor.run("nobody-runs-this").await.unwrap();

    assert_eq!(count(&supervisor, &report), 0);
    assert_eq!(supervisor.exit_code(&report), 1);
}

#[tokio::test]
async fn pipefail_config_fails_on_a_filter_miss_but_not_a_match() {
    let supervisor = Supervisor::new(SupervisorConfig {
        stdin: PipelineInput::Null,
        stdout: PipelineOutput::Capture,
        template: fixed_listing(),
        ..SupervisorConfig::pipefail()
    });
    assert_eq!(supervisor.config().name, "pipefail");
    assert_eq!(supervisor.config().exit_policy, ExitPolicy::Pipefail);

    let hit = supervisor.run("editor").await.unwrap();
    assert_eq!(count(&supervisor, &hit), 2);
    assert_eq!(supervisor.exit_code(&hit), 0);

    let miss = supervisor.run("nobody-runs-this").await.unwrap();
    assert_eq!(count(&supervisor, &miss), 0);
    assert_eq!(supervisor.exit_code(&miss), 1);
}

#[tokio::test]
async fn term_is_passed_verbatim() {
    let supervisor = Supervisor::new(SupervisorConfig::captured().with_template(fixed_listing()));

    // One argument containing a space: only "user 42" matches.
    let report = supervisor.run("user 42").await.unwrap();
    assert_eq!(count(&supervisor, &report), 1);
    assert_eq!(report.stages[1].command, "grep user 42");
}

#[tokio::test]
async fn missing_filter_is_reported_by_stage() {
    let template = fixed_listing().with_filter(StageSpec::bare("definitely_not_a_real_grep_12345"));
    let supervisor = Supervisor::new(SupervisorConfig::captured().with_template(template));
    let report = supervisor.run("editor").await.unwrap();

    assert_eq!(count(&supervisor, &report), 0);
    // The listing may also die of SIGPIPE, depending on timing.
    let failed: Vec<_> = report
        .failures()
        .filter(|s| s.status.never_started())
        .map(|s| s.program())
        .collect();
    assert_eq!(failed, vec!["definitely_not_a_real_grep_12345"]);
    assert_eq!(report.stages[1].status.code(), 127);
}

#[test]
fn default_builder_is_ps_grep_wc() {
    let supervisor = Supervisor::default();
    let builder = supervisor.builder("sshd").unwrap();
    let rendered: Vec<_> = builder.stages().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["ps aux", "grep sshd", "wc -l"]);
    assert_eq!(supervisor.config().exit_policy, ExitPolicy::Terminal);
}

// ============================================================================
// Live process table
// ============================================================================

#[tokio::test]
async fn own_pid_is_found_in_process_table() {
    if !on_path("ps") {
        eprintln!("skipping: ps not on PATH");
        return;
    }

    let supervisor = Supervisor::new(SupervisorConfig::captured());
    let pid = std::process::id().to_string();

    for _ in 0..3 {
        let report = supervisor.run(&pid).await.unwrap();
        assert!(count(&supervisor, &report) >= 1, "own pid {} not listed: {:?}", pid, report);
        assert_eq!(supervisor.exit_code(&report), 0);
    }
}
