//! Human-readable output
//!
//! Interactive terminals get cliclack's framed log lines. Everything else
//! gets bracketed tags that stay greppable in CI logs.

use super::context::UiContext;
use crate::cache::Source;
use console::{style, StyledObject};
use std::time::Duration;

const KEY_WIDTH: usize = 14;

/// Title of a result block, tagged when the data came from the cache
pub fn heading(ctx: &UiContext, title: &str, source: Option<Source>) {
    let tag = match source {
        Some(Source::Cache) => format!(" {}", style("(cached)").dim()),
        _ => String::new(),
    };
    if ctx.is_fancy() {
        cliclack::intro(format!("{}{}", style(title).blue().bold(), tag)).ok();
    } else {
        println!("{}{}", style(title).bold(), tag);
        println!();
    }
}

pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.is_fancy() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

/// One aligned `key value` line
pub fn field(ctx: &UiContext, key: &str, value: &str) {
    let key = format!("{:<width$}", key, width = KEY_WIDTH);
    if ctx.is_fancy() {
        println!("  {} {}", style(key).dim(), value);
    } else {
        println!("  {} {}", key, value);
    }
}

/// A field colored by whether it is healthy
pub fn check(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let key = format!("{:<width$}", key, width = KEY_WIDTH);
    if ctx.is_fancy() {
        let value = if ok {
            style(value).green()
        } else {
            style(value).yellow()
        };
        println!("  {} {}", style(key).dim(), value);
    } else {
        let tag = if ok { "[OK]  " } else { "[WARN]" };
        println!("  {} {} {}", tag, key, value);
    }
}

pub fn success(ctx: &UiContext, message: &str, detail: Option<&str>) {
    let line = match detail {
        Some(detail) => format!("{} ({})", message, style(detail).dim()),
        None => message.to_string(),
    };
    if ctx.is_fancy() {
        cliclack::log::success(line).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), line);
    }
}

pub fn warning(ctx: &UiContext, message: &str, hint: Option<&str>) {
    let line = match hint {
        Some(hint) => format!("{} - {}", message, style(hint).dim()),
        None => message.to_string(),
    };
    if ctx.is_fancy() {
        cliclack::log::warning(line).ok();
    } else {
        println!("  {} {}", style("[WARN]").yellow(), line);
    }
}

pub fn info(ctx: &UiContext, message: &str) {
    if ctx.is_fancy() {
        cliclack::log::info(message).ok();
    } else {
        println!("  {} {}", style("[INFO]").cyan(), message);
    }
}

/// Dimmed trailing remark, e.g. a link to the full resource
pub fn note(ctx: &UiContext, message: &str) {
    if ctx.is_fancy() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Color a build result label
pub fn result_style(label: &str) -> StyledObject<&str> {
    match label {
        "SUCCESS" => style(label).green(),
        "FAILURE" => style(label).red(),
        "UNSTABLE" | "ABORTED" => style(label).yellow(),
        "BUILDING" => style(label).cyan(),
        _ => style(label).dim(),
    }
}

/// `1h 02m`, `3m 07s` or `12s`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("{}s", s),
        (0, m, s) => format!("{}m {:02}s", m, s),
        (h, m, _) => format!("{}h {:02}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_does_not_panic() {
        let ctx = UiContext::non_interactive();
        heading(&ctx, "team/app #7", Some(Source::Cache));
        field(&ctx, "Result", "SUCCESS");
        check(&ctx, "User", "admin", true);
        success(&ctx, "Triggered team/app", Some("queue item 12"));
        warning(&ctx, "Not deleting team/app", None);
        note(&ctx, "Full log: https://ci/job/team/job/app/7/consoleText");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_secs(12)), "12s");
        assert_eq!(format_duration(Duration::from_secs(187)), "3m 07s");
        assert_eq!(format_duration(Duration::from_secs(3720)), "1h 02m");
    }
}
