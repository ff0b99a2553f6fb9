// Copyright @yucwang 2026

use std::sync::Mutex;

use console::style;
use indicatif::{ ProgressBar, ProgressStyle };
use log::info;

use crate::core::reporter::ProgressReporter;
use crate::math::constants::Float;

const BAR_LENGTH: u64 = 1000;

/// Terminal progress bar. Messages go to the log.
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for ConsoleReporter {
    fn begin(&self) {
        info!("{}", style("Render started.").bold());
    }

    fn new_stage(&self, name: &str) {
        let bar = ProgressBar::new(BAR_LENGTH);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {prefix} {bar:40.cyan/blue} {percent}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_prefix(name.to_string());
        let mut slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = slot.replace(bar) {
            old.finish_and_clear();
        }
    }

    fn progress(&self, percent: Float) {
        let slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = slot.as_ref() {
            let pos = (percent.clamp(0.0, 100.0) / 100.0 * BAR_LENGTH as Float) as u64;
            bar.set_position(pos);
        }
    }

    fn message(&self, text: &str) {
        let slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(bar) => bar.suspend(|| info!("{}", text)),
            None => info!("{}", text),
        }
    }

    fn end_stage(&self) {
        let mut slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }

    fn end(&self) {
        self.end_stage();
        info!("{}", style("Render finished.").bold().green());
    }
}
