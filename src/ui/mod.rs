//! Terminal output for the CLI
//!
//! `cliclack` spinners and prompts in interactive terminals, tagged plain
//! lines in CI, and no progress chatter at all for JSON or plain formats.
//!
//! ```rust,ignore
//! use jenkins_gateway::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect();
//! let status = ui::with_spinner(&ctx, "Resolving lastBuild...", "Lookup failed", fetch).await?;
//! ui::heading(&ctx, "team/app #42", Some(status.source));
//! ui::field(&ctx, "Result", "SUCCESS");
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::{Rendering, UiContext};
pub use output::{
    check, field, format_duration, heading, info, note, result_style, section, success, warning,
};
pub use progress::{with_spinner, TaskSpinner};
pub use prompts::confirm;
