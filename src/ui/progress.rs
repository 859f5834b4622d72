//! Spinner shown while the gateway talks to Jenkins
//!
//! Plain rendering writes one line per transition to stderr so a piped
//! stdout stays clean; silent rendering writes nothing.

use super::context::{Rendering, UiContext};
use crate::error::GatewayResult;
use console::style;
use std::future::Future;

/// A spinner that degrades to log lines outside a terminal
pub struct TaskSpinner {
    rendering: Rendering,
    bar: Option<cliclack::ProgressBar>,
}

impl TaskSpinner {
    /// Nothing is drawn until [`start`](Self::start)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            rendering: ctx.rendering(),
            bar: None,
        }
    }

    pub fn start(&mut self, message: &str) {
        match self.rendering {
            Rendering::Fancy => {
                let bar = cliclack::spinner();
                bar.start(message);
                self.bar = Some(bar);
            }
            Rendering::Plain => eprintln!("{} {}", style("...").dim(), message),
            Rendering::Silent => {}
        }
    }

    /// Replace the running message; plain rendering skips updates
    pub fn update(&mut self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.start(message);
        }
    }

    pub fn succeed(&mut self, message: &str) {
        match self.bar.take() {
            Some(bar) => bar.stop(message),
            None if self.rendering == Rendering::Plain => {
                eprintln!("{} {}", style("[OK]").green(), message)
            }
            None => {}
        }
    }

    pub fn fail(&mut self, message: &str) {
        match self.bar.take() {
            Some(bar) => bar.error(message),
            None if self.rendering == Rendering::Plain => {
                eprintln!("{} {}", style("[FAIL]").red(), message)
            }
            None => {}
        }
    }

    /// Remove the spinner without a closing line
    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.clear();
        }
    }
}

/// Await `task` behind a spinner.
///
/// The spinner is cleared on success so the result can be printed in its
/// place; on failure it is closed with `failure` and the error is returned.
pub async fn with_spinner<T, F>(
    ctx: &UiContext,
    message: &str,
    failure: &str,
    task: F,
) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(message);
    match task.await {
        Ok(value) => {
            spinner.clear();
            Ok(value)
        }
        Err(e) => {
            spinner.fail(failure);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, GatewayError};

    #[test]
    fn plain_spinner_lifecycle() {
        let mut spinner = TaskSpinner::new(&UiContext::non_interactive());
        spinner.start("Fetching builds...");
        spinner.update("Still fetching...");
        spinner.succeed("Done");
        spinner.clear();
    }

    #[tokio::test]
    async fn with_spinner_passes_results_through() {
        let ctx = UiContext::non_interactive().machine_readable(true);
        let value = with_spinner(&ctx, "Working...", "Failed", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = with_spinner(&ctx, "Working...", "Failed", async {
            Err::<(), _>(GatewayError::NotFound("job 'x'".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
