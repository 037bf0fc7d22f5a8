//! User-facing notification seams.
//!
//! A GUI shell backs these with dialogs; the CLI backs them with terminal
//! output; tests back them with recorders. All reporting is
//! fire-and-forget: the core never consumes a return value.

use tracing::{error, info, warn};

/// Error/warning/info surface.
pub trait Messenger {
    fn report_error(&self, title: &str, message: &str);
    fn report_warning(&self, title: &str, message: &str);
    fn report_info(&self, title: &str, message: &str);
}

/// Yes/no confirmation before destructive operations.
pub trait ConfirmPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Messenger that mirrors every report onto the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn report_error(&self, title: &str, message: &str) {
        error!("{title}: {message}");
    }

    fn report_warning(&self, title: &str, message: &str) {
        warn!("{title}: {message}");
    }

    fn report_info(&self, title: &str, message: &str) {
        info!("{title}: {message}");
    }
}

/// Prompt with a fixed answer. `AutoConfirm(true)` backs `--yes` style
/// flags; `AutoConfirm(false)` refuses everything.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.0
    }
}
