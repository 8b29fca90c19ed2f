use scopeguard::ScopeGuard;

/// Value of the final progress report
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// Optional progress sink wrapper used during a run
pub(crate) struct ProgressReporter<'a> {
    sink: Option<&'a mut dyn FnMut(f64)>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: Option<&'a mut dyn FnMut(f64)>) -> Self {
        Self { sink }
    }

    pub(crate) fn report(&mut self, percent: f64) {
        if let Some(sink) = self.sink.as_mut() {
            sink(percent.clamp(0.0, PROGRESS_COMPLETE));
        }
    }

    /// Progress observed at the start of item `index` out of `total`
    pub(crate) fn report_position(&mut self, index: usize, total: usize) {
        if total > 0 {
            self.report(index as f64 / total as f64 * 100.0);
        }
    }

    pub(crate) fn complete(&mut self) {
        self.report(PROGRESS_COMPLETE);
    }
}

/// Reporter that sends the final 100 when dropped, on every exit path
pub(crate) fn guarded<'a>(
    sink: Option<&'a mut dyn FnMut(f64)>,
) -> ScopeGuard<ProgressReporter<'a>, impl FnOnce(ProgressReporter<'a>)> {
    scopeguard::guard(ProgressReporter::new(sink), |mut reporter| {
        reporter.complete()
    })
}
