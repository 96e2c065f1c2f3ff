/// Write-only sink for human readable progress and warning messages of a running algorithm.
pub trait Feedback {
    fn push_info(&mut self, msg: &str);
    fn report_error(&mut self, msg: &str);

    fn is_canceled(&self) -> bool {
        false
    }
}

/// Forwards all feedback to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn push_info(&mut self, msg: &str) {
        log::info!("{msg}");
    }

    fn report_error(&mut self, msg: &str) {
        log::warn!("{msg}");
    }
}
