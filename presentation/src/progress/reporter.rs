//! Progress reporting for debate runs

use colored::Colorize;
use debate_application::DebateProgressNotifier;
use debate_domain::{AgentId, SessionOutcome, SessionReport, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one bar per running session and a run total
pub struct ProgressReporter {
    multi: MultiProgress,
    run_bar: ProgressBar,
    session_bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new(total_sessions: usize) -> Self {
        let multi = MultiProgress::new();
        let run_bar = multi.add(ProgressBar::new(total_sessions as u64));
        run_bar.set_style(Self::run_style());
        run_bar.set_prefix("Debates");
        Self {
            multi,
            run_bar,
            session_bars: Mutex::new(HashMap::new()),
        }
    }

    fn run_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn session_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold} [{bar:20.green/white}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, problem_id: &str, f: impl FnOnce(&ProgressBar)) {
        if let Ok(bars) = self.session_bars.lock()
            && let Some(bar) = bars.get(problem_id)
        {
            f(bar);
        }
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::RoleAssessment => "Stage 1: Role assessment",
        Stage::Solve => "Stage 2: Solve",
        Stage::PeerReview => "Stage 3: Peer review",
        Stage::Refine => "Stage 4: Refine",
        Stage::Judge => "Stage 5: Judge",
    }
}

fn outcome_line(report: &SessionReport) -> String {
    match &report.outcome {
        SessionOutcome::Complete {
            winner,
            winner_agent,
            final_answer,
            ..
        } => {
            let verdict = match report.matches_ground_truth() {
                Some(true) => "correct".green(),
                Some(false) => "incorrect".yellow(),
                None => "unchecked".dimmed(),
            };
            format!(
                "{} {} ({}) answered {:?} [{}]",
                "v".green(),
                winner,
                winner_agent,
                final_answer,
                verdict
            )
        }
        SessionOutcome::Aborted { stage, reason } => {
            format!("{} aborted in {}: {}", "x".red(), stage, reason)
        }
        SessionOutcome::Cancelled => format!("{} cancelled", "-".dimmed()),
    }
}

impl DebateProgressNotifier for ProgressReporter {
    fn on_session_start(&self, problem_id: &str) {
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(Self::session_style());
        bar.set_prefix(problem_id.to_string());
        bar.set_message("Starting...");
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut bars) = self.session_bars.lock() {
            bars.insert(problem_id.to_string(), bar);
        }
    }

    fn on_stage_start(&self, problem_id: &str, stage: Stage, total_units: usize) {
        self.with_bar(problem_id, |bar| {
            bar.set_length(total_units as u64);
            bar.set_position(0);
            bar.set_message(stage_label(stage));
        });
    }

    fn on_unit_complete(&self, problem_id: &str, stage: Stage, agent: &AgentId, success: bool) {
        self.with_bar(problem_id, |bar| {
            let mark = if success { "v".green() } else { "x".red() };
            bar.set_message(format!("{} {} {}", stage_label(stage), mark, agent));
            bar.inc(1);
        });
    }

    fn on_stage_complete(&self, problem_id: &str, stage: Stage) {
        self.with_bar(problem_id, |bar| {
            bar.set_message(format!("{} {}", stage_label(stage), "done".green()));
        });
    }

    fn on_heartbeat(&self, problem_id: &str, stage: Stage, agent: &AgentId, elapsed: Duration) {
        self.with_bar(problem_id, |bar| {
            bar.set_message(format!(
                "{} waiting on {} ({}s)",
                stage_label(stage),
                agent,
                elapsed.as_secs()
            ));
        });
    }

    fn on_session_finished(&self, report: &SessionReport) {
        let bar = self
            .session_bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(&report.problem_id));
        match bar {
            Some(bar) => bar.finish_with_message(outcome_line(report)),
            None => {
                let _ = self
                    .multi
                    .println(format!("{} {}", report.problem_id.bold(), outcome_line(report)));
            }
        }
        self.run_bar.inc(1);
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.run_bar.finish();
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DebateProgressNotifier for SimpleProgress {
    fn on_session_start(&self, problem_id: &str) {
        println!("{} {}", "->".cyan(), problem_id.bold());
    }

    fn on_stage_start(&self, problem_id: &str, stage: Stage, total_units: usize) {
        println!(
            "  [{}] {} ({} units)",
            problem_id,
            stage_label(stage).bold(),
            total_units
        );
    }

    fn on_unit_complete(&self, problem_id: &str, _stage: Stage, agent: &AgentId, success: bool) {
        if success {
            println!("  [{}]   {} {}", problem_id, "v".green(), agent);
        } else {
            println!("  [{}]   {} {} (failed)", problem_id, "x".red(), agent);
        }
    }

    fn on_stage_complete(&self, _problem_id: &str, _stage: Stage) {}

    fn on_session_finished(&self, report: &SessionReport) {
        println!("{} {} {}", "<-".cyan(), report.problem_id.bold(), outcome_line(report));
    }
}
