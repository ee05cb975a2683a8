use colored::*;
use fingerprinter_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::io::{self, Write};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Ingest phase: bar over the files of one release tree
/// - Match phase: a live `Version <v> [<m>/<t> <p>% matches]` line while the
///   version is scanned
///
/// Results (the final line per version and verbose URL matches) are written to
/// `out`, stdout by default. indicatif hides its bars when stderr is not a
/// terminal, so results never go through the bar.
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
    out: RefCell<Box<dyn Write>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            bar: RefCell::new(None),
            out: RefCell::new(out),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Some(old) = self.bar.borrow_mut().replace(pb) {
            old.finish_and_clear();
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            f(pb);
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.borrow_mut().take()
    }

    /// Write one result line, keeping any live bar out of the way.
    fn emit(&self, line: &str) {
        let write = || {
            let mut out = self.out.borrow_mut();
            // A closed pipe only loses output, never the scan.
            let _ = writeln!(out, "{}", line).and_then(|_| out.flush());
        };
        match self.bar.borrow().as_ref() {
            Some(pb) => pb.suspend(write),
            None => write(),
        }
    }
}

fn version_line(version: &str, matches: usize, total: usize, percent: f64) -> String {
    format!("Version {} [{}/{} {}% matches]", version, matches, total, percent)
}

impl ProgressReporter for CliReporter {
    fn on_ingest_start(&self, version: &str, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} {prefix} [{bar:30.cyan/dim}] {pos}/{len} files",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.set_prefix(format!("Fingerprinting {}", version));
        self.set_bar(pb);
    }

    fn on_file_fingerprinted(&self, files_done: usize, _path: &str) {
        self.with_bar(|pb| pb.set_position(files_done as u64));
    }

    fn on_ingest_complete(&self, version: &str, fingerprints: usize, duration_secs: f64) {
        if let Some(pb) = self.take_bar() {
            pb.finish_and_clear();
        }
        eprintln!(
            "  {} {}: {} fingerprints in {:.2}s",
            "✓".green(),
            version,
            fingerprints,
            duration_secs
        );
    }

    fn on_version_start(&self, version: &str, total: usize) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            pb.set_style(style);
        }
        pb.set_message(version_line(version, 0, total, 0.0));
        self.set_bar(pb);
    }

    fn on_candidate_checked(&self, version: &str, matches: usize, total: usize, percent: f64) {
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(version_line(version, matches, total, percent));
        });
    }

    fn on_candidate_match(&self, url: &str, version: &str) {
        self.emit(&format!("{} matches v{}", url, version));
    }

    fn on_version_complete(&self, version: &str, matches: usize, total: usize, percent: f64) {
        if let Some(pb) = self.take_bar() {
            pb.finish_and_clear();
        }
        self.emit(&version_line(version, matches, total, percent));
    }
}
