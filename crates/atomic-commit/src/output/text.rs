use std::fmt::Write;
use std::path::PathBuf;

use atomic_core::{AnalysisResult, AtomicCommitGroup};
use atomic_operations::StageTiming;
use atomic_operations::operations::{CommitReport, StashOutcome};

pub(crate) fn format_plan(result: &AnalysisResult, timings: Option<&[StageTiming]>) -> String {
    let mut out = String::new();
    if result.groups.is_empty() {
        out.push_str("No changes to commit.\n");
        format_file_list(&mut out, "Excluded", &result.excluded_files);
        return out;
    }

    let _ = writeln!(
        out,
        "Mode: {} ({} files, {} groups, ~{}s)",
        result.mode,
        result.total_files,
        result.groups.len(),
        result.estimated_time_secs
    );
    for group in &result.groups {
        out.push('\n');
        format_group(&mut out, group);
    }

    if !result.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &result.warnings {
            let _ = writeln!(out, "  {warning}");
        }
    }
    format_file_list(&mut out, "Excluded", &result.excluded_files);

    if let Some(timings) = timings {
        out.push_str("\nTimings:\n");
        for timing in timings {
            let _ = writeln!(
                out,
                "  {:<10} {:.2}ms",
                timing.stage,
                timing.duration.as_secs_f64() * 1000.0
            );
        }
    }
    out
}

fn format_group(out: &mut String, group: &AtomicCommitGroup) {
    let _ = write!(out, "{} [risk: {}]", group.id, group.estimated_risk);
    if !group.dependencies.is_empty() {
        let _ = write!(out, " after {}", group.dependencies.join(", "));
    }
    out.push('\n');
    let _ = writeln!(out, "  {}", group.description);
    for file in &group.files {
        let _ = writeln!(out, "    {}", file.display());
    }
}

fn format_file_list(out: &mut String, title: &str, files: &[PathBuf]) {
    if !files.is_empty() {
        let _ = writeln!(out, "\n{title}:");
        for file in files {
            let _ = writeln!(out, "  {}", file.display());
        }
    }
}

pub(crate) fn format_report(report: &CommitReport) -> String {
    let mut out = String::new();
    if report.dry_run {
        out.push_str("Dry run, nothing was committed.\n");
    }
    if report.results.is_empty() {
        out.push_str("No changes to commit.\n");
    }

    for result in &report.results {
        let status = if result.validation_passed { "✓" } else { "✗" };
        let _ = writeln!(out, "{status} {} {}", short_sha(&result.commit_id), result.message);
    }

    match &report.stash {
        StashOutcome::Restored { id } => {
            let _ = writeln!(out, "\nRestored stashed changes ({}).", short_sha(id));
        }
        StashOutcome::Stashed { id } => {
            let _ = writeln!(
                out,
                "\nUnrelated changes are still stashed ({}); run `git stash pop` to restore them.",
                short_sha(id)
            );
        }
        StashOutcome::Disabled | StashOutcome::Skipped | StashOutcome::NothingToStash => {}
    }

    if let Some(failure) = &report.halted {
        let _ = writeln!(
            out,
            "\nValidation failed in {}: `{}` (exit code {})",
            failure.group,
            failure.command,
            failure
                .exit_code
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        );
        for line in failure.output.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

fn short_sha(id: &str) -> &str {
    if id.len() > 12 && id.chars().all(|c| c.is_ascii_hexdigit()) {
        &id[..12]
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_core::{AnalysisMode, CommitResult, GroupKind, RiskLevel};
    use atomic_operations::operations::ValidationFailure;
    use std::time::Duration;

    fn group(id: &str, deps: &[&str]) -> AtomicCommitGroup {
        AtomicCommitGroup {
            id: id.to_string(),
            priority: 0,
            files: vec![PathBuf::from("src/a.ts")],
            description: "update src/a.ts".to_string(),
            dependencies: deps.iter().map(ToString::to_string).collect(),
            validation_commands: Vec::new(),
            estimated_risk: RiskLevel::Medium,
            can_parallelize: deps.is_empty(),
            kind: GroupKind::Dependent,
        }
    }

    fn result(groups: Vec<AtomicCommitGroup>) -> AnalysisResult {
        AnalysisResult {
            mode: AnalysisMode::Simple,
            total_files: groups.len(),
            groups,
            warnings: vec!["failed to analyze src/b.ts: content looks binary".to_string()],
            estimated_time_secs: 6,
            excluded_files: vec![PathBuf::from("Cargo.lock")],
            changes: Vec::new(),
        }
    }

    #[test]
    fn plan_lists_groups_warnings_and_exclusions() {
        let text = format_plan(
            &result(vec![group("g01-dependent", &[]), group("g02-dependent", &["g01-dependent"])]),
            None,
        );

        assert!(text.starts_with("Mode: simple (2 files, 2 groups, ~6s)"));
        assert!(text.contains("g01-dependent [risk: medium]\n  update src/a.ts\n    src/a.ts"));
        assert!(text.contains("g02-dependent [risk: medium] after g01-dependent"));
        assert!(text.contains("Warnings:\n  failed to analyze src/b.ts"));
        assert!(text.contains("Excluded:\n  Cargo.lock"));
        assert!(!text.contains("Timings"));
    }

    #[test]
    fn plan_includes_timings_when_profiled() {
        let timings = [StageTiming {
            stage: "analysis",
            duration: Duration::from_millis(3),
        }];

        let text = format_plan(&result(vec![group("g01-dependent", &[])]), Some(&timings));

        assert!(text.contains("Timings:\n  analysis"));
        assert!(text.contains("3.00ms"));
    }

    #[test]
    fn empty_plan_says_so() {
        let text = format_plan(&result(Vec::new()), None);

        assert!(text.starts_with("No changes to commit."));
    }

    #[test]
    fn report_marks_failed_validation() {
        let report = CommitReport {
            results: vec![CommitResult {
                group: group("g01-dependent", &[]),
                commit_id: "0123456789abcdef0123".to_string(),
                message: "fix: update src/a.ts".to_string(),
                validation_passed: false,
            }],
            base_commit: None,
            stash: StashOutcome::Restored {
                id: "fedcba9876543210fedc".to_string(),
            },
            halted: Some(ValidationFailure {
                group: "g01-dependent".to_string(),
                command: "npm test".to_string(),
                exit_code: Some(2),
                output: "1 failing".to_string(),
            }),
            dry_run: false,
        };

        let text = format_report(&report);

        assert!(text.contains("✗ 0123456789ab fix: update src/a.ts"));
        assert!(text.contains("Restored stashed changes (fedcba987654)"));
        assert!(text.contains("Validation failed in g01-dependent: `npm test` (exit code 2)"));
        assert!(text.contains("  1 failing"));
    }

    #[test]
    fn dry_run_report_keeps_synthetic_ids() {
        let report = CommitReport {
            results: vec![CommitResult {
                group: group("g01-dependent", &[]),
                commit_id: "dry-run-1".to_string(),
                message: "update src/a.ts".to_string(),
                validation_passed: true,
            }],
            base_commit: Some("abc".to_string()),
            stash: StashOutcome::Skipped,
            halted: None,
            dry_run: true,
        };

        let text = format_report(&report);

        assert!(text.starts_with("Dry run"));
        assert!(text.contains("✓ dry-run-1 update src/a.ts"));
    }
}
