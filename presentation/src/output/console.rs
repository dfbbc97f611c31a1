//! Console output formatter for debate runs

use colored::Colorize;
use debate_domain::{OutputFormat, RunReport, SessionOutcome, SessionReport};

/// Formats run reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn render(report: &RunReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Summary => Self::format_summary(report),
            OutputFormat::Full => Self::format(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Format every session with roles, outcome and excluded units
    pub fn format(report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Debate Results"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Run:".cyan().bold(), report.run_id));
        output.push_str(&format!(
            "{} {}\n",
            "Started:".cyan().bold(),
            report.started_at
        ));

        for session in &report.sessions {
            output.push_str(&Self::section_header(&format!("Problem {}", session.problem_id)));
            output.push_str(&Self::session_detail(session));
        }

        output.push_str(&Self::section_header("Totals"));
        output.push_str(&Self::totals(report));
        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line per problem plus totals
    pub fn format_summary(report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("=== Debate run {} ===", report.run_id).cyan().bold()
        ));

        for session in &report.sessions {
            output.push_str(&format!(
                "  {:<16} {}\n",
                session.problem_id,
                Self::outcome_summary(session)
            ));
        }
        output.push('\n');
        output.push_str(&Self::totals(report));
        output
    }

    fn outcome_summary(session: &SessionReport) -> String {
        match &session.outcome {
            SessionOutcome::Complete {
                winner,
                final_answer,
                ..
            } => {
                let mark = match session.matches_ground_truth() {
                    Some(true) => "v".green(),
                    Some(false) => "x".yellow(),
                    None => "?".dimmed(),
                };
                format!("{} {} -> {}", mark, winner, Self::truncate(final_answer, 60))
            }
            SessionOutcome::Aborted { stage, .. } => {
                format!("{} aborted in {}", "!".red(), stage)
            }
            SessionOutcome::Cancelled => format!("{}", "- cancelled".dimmed()),
        }
    }

    fn session_detail(session: &SessionReport) -> String {
        let mut output = String::new();

        if let Some(assignment) = &session.assignment {
            output.push_str(&format!("{} {}\n", "Judge:".bold(), assignment.judge));
            for (slot, agent) in assignment.solver_slots() {
                output.push_str(&format!("{} {}\n", format!("{}:", slot).bold(), agent));
            }
        }

        match &session.outcome {
            SessionOutcome::Complete {
                winner,
                winner_agent,
                final_answer,
                answers_changed,
                ..
            } => {
                output.push_str(&format!(
                    "{} {} ({})\n",
                    "Winner:".green().bold(),
                    winner,
                    winner_agent
                ));
                output.push_str(&format!("{}\n", "Answer:".green().bold()));
                output.push_str(&Self::indent(final_answer, "  "));
                output.push('\n');
                if let Some(truth) = &session.ground_answer {
                    let verdict = if session.matches_ground_truth() == Some(true) {
                        "match".green()
                    } else {
                        "mismatch".yellow()
                    };
                    output.push_str(&format!(
                        "{} {} [{}]\n",
                        "Ground truth:".bold(),
                        truth,
                        verdict
                    ));
                }
                output.push_str(&format!(
                    "{} {}\n",
                    "Answers changed by refinement:".dimmed(),
                    answers_changed
                ));
            }
            SessionOutcome::Aborted { stage, reason } => {
                output.push_str(&format!(
                    "{} in {}: {}\n",
                    "Aborted".red().bold(),
                    stage,
                    reason
                ));
            }
            SessionOutcome::Cancelled => {
                output.push_str(&format!("{}\n", "Cancelled before start".dimmed()));
            }
        }

        if !session.failures.is_empty() {
            output.push_str(&format!("{}\n", "Excluded units:".yellow().bold()));
            for failure in &session.failures {
                output.push_str(&format!(
                    "  * {} {} ({}): {}\n",
                    failure.stage, failure.agent_id, failure.error_kind, failure.message
                ));
            }
        }

        for slot in &session.refinement_skipped {
            output.push_str(&format!(
                "{} {} received no reviews\n",
                "Refinement skipped:".yellow(),
                slot
            ));
        }

        output.push_str(&format!(
            "{} {:.1}s\n",
            "Elapsed:".dimmed(),
            session.elapsed_sec
        ));
        output
    }

    fn totals(report: &RunReport) -> String {
        format!(
            "{} {}  {} {}  {} {}  {} {}/{}\n",
            "Completed:".green().bold(),
            report.completed(),
            "Aborted:".red().bold(),
            report.aborted(),
            "Cancelled:".dimmed(),
            report.cancelled(),
            "Correct:".cyan().bold(),
            report.correct(),
            report.completed()
        )
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if single_line.chars().count() <= max_chars {
            single_line
        } else {
            let cut: String = single_line.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
