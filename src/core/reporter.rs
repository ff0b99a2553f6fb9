// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Render progress sink. Calls are fire-and-forget and may come from any worker.
pub trait ProgressReporter: Send + Sync {
    fn begin(&self);
    fn new_stage(&self, name: &str);
    /// `percent` lies in `[0, 100]`.
    fn progress(&self, percent: Float);
    fn message(&self, text: &str);
    fn end_stage(&self);
    fn end(&self);
}
