//! Terminal presentation of receipts: styled lines and a busy spinner.
//!
//! [`ReceiptRenderer`] is fed job snapshots and prints only what is new
//! since the last call, so it can be fed every store update.

use std::collections::HashMap;
use std::time::Duration;

use console::{Alignment, Style, pad_str};
use indicatif::{ProgressBar, ProgressStyle};

use receipt_matic::formatter::{LineKind, classify_line};
use receipt_matic::state_machine::{Job, JobId, JobState};

pub struct ReceiptRenderer {
    width: usize,
    // Lines already printed and last state seen, per job.
    printed: HashMap<JobId, (usize, JobState)>,
    spinner: Option<ProgressBar>,
    bold: Style,
    dim: Style,
    green: Style,
}

impl ReceiptRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            printed: HashMap::new(),
            spinner: None,
            bold: Style::new().bold(),
            dim: Style::new().dim(),
            green: Style::new().green().bold(),
        }
    }

    /// Print every line revealed since the previous call.
    pub fn render(&mut self, jobs: &[Job]) {
        for job in jobs {
            let (done, last_state) = self
                .printed
                .get(&job.id)
                .copied()
                .unwrap_or((0, JobState::Assembling));

            for (index, line) in job.revealed_lines().iter().enumerate().skip(done) {
                let styled = self.style_line(index, line, job.total_lines());
                self.emit(&styled);
            }
            if job.state == JobState::Settled && last_state != JobState::Settled {
                self.emit(&self.tear_off());
            }

            self.printed.insert(job.id, (job.revealed, job.state));
        }
    }

    /// Show or hide the PRINTING... spinner.
    pub fn set_busy(&mut self, busy: bool) {
        match (busy, self.spinner.take()) {
            (true, None) => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
                {
                    pb.set_style(style);
                }
                pb.set_message("PRINTING...");
                pb.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(pb);
            }
            (true, Some(pb)) => self.spinner = Some(pb),
            (false, Some(pb)) => pb.finish_and_clear(),
            (false, None) => {}
        }
    }

    pub fn ready_prompt(&self) -> String {
        format!("{} ", self.green.apply_to("READY>"))
    }

    /// Pretty JSON dump of a job record.
    pub fn print_record(&self, job: &Job) {
        println!();
        println!("{}", self.dim.apply_to("─── Job Record ───"));
        println!("{}", serde_json::to_string_pretty(job).unwrap_or_default());
    }

    fn style_line(&self, index: usize, line: &str, total: usize) -> String {
        let centered = |text: &str| pad_str(text, self.width, Alignment::Center, None).into_owned();
        match classify_line(index, line, total) {
            LineKind::Title => self.bold.apply_to(centered(line)).to_string(),
            LineKind::Timestamp | LineKind::ClosingMarker => {
                self.dim.apply_to(centered(line)).to_string()
            }
            LineKind::Separator => self.dim.apply_to("┄".repeat(self.width)).to_string(),
            LineKind::Footer => self.bold.apply_to(centered(line)).to_string(),
            LineKind::Body => centered(line),
        }
    }

    fn tear_off(&self) -> String {
        let rule = "- ".repeat(self.width / 2);
        format!("{}{}", self.dim.apply_to("✂ "), self.dim.apply_to(rule.trim_end()))
    }

    fn emit(&self, line: &str) {
        match &self.spinner {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}
