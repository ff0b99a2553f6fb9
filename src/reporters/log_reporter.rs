// Copyright @yucwang 2026

use std::sync::Mutex;

use log::{ debug, info };

use crate::core::reporter::ProgressReporter;
use crate::math::constants::Float;

/// Headless reporter that logs each stage and every tenth of progress.
#[derive(Default)]
pub struct LogReporter {
    last_decile: Mutex<i32>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for LogReporter {
    fn begin(&self) {
        info!("Render started.");
    }

    fn new_stage(&self, name: &str) {
        *self.last_decile.lock().unwrap_or_else(|e| e.into_inner()) = -1;
        info!("Stage: {}.", name);
    }

    fn progress(&self, percent: Float) {
        let decile = (percent.clamp(0.0, 100.0) / 10.0) as i32;
        let mut last = self.last_decile.lock().unwrap_or_else(|e| e.into_inner());
        if decile > *last {
            *last = decile;
            debug!("Progress: {:.0}%.", percent);
        }
    }

    fn message(&self, text: &str) {
        info!("{}", text);
    }

    fn end_stage(&self) {}

    fn end(&self) {
        info!("Render finished.");
    }
}
