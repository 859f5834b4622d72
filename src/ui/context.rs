//! Output mode detection

use std::io::IsTerminal;

/// Variables set by common CI services.
///
/// `JENKINS_URL` is left out because it doubles as our own server setting;
/// Jenkins agents are recognized by `BUILD_ID` instead.
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
    "BUILD_ID",
];

/// How progress and status lines are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// cliclack spinners and framed log lines
    Fancy,
    /// Bracketed tags, one line per event
    Plain,
    /// No progress output; stdout carries only the payload
    Silent,
}

/// Where output goes and whether prompts can be answered
#[derive(Debug, Clone)]
pub struct UiContext {
    rendering: Rendering,
    interactive: bool,
    auto_yes: bool,
}

impl UiContext {
    /// Inspect the terminal and CI environment
    pub fn detect() -> Self {
        let interactive = attached_to_terminal() && !running_in_ci();
        Self {
            rendering: if interactive {
                Rendering::Fancy
            } else {
                Rendering::Plain
            },
            interactive,
            auto_yes: false,
        }
    }

    /// Plain rendering with no prompts
    pub fn non_interactive() -> Self {
        Self {
            rendering: Rendering::Plain,
            interactive: false,
            auto_yes: false,
        }
    }

    /// Silence progress output when stdout is consumed by a program
    pub fn machine_readable(mut self, machine: bool) -> Self {
        if machine {
            self.rendering = Rendering::Silent;
        }
        self
    }

    /// Answer every confirmation with yes (`--yes`)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn rendering(&self) -> Rendering {
        self.rendering
    }

    pub fn is_fancy(&self) -> bool {
        self.rendering == Rendering::Fancy
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }
}

fn attached_to_terminal() -> bool {
    std::io::stdout().is_terminal() && std::io::stdin().is_terminal()
}

fn running_in_ci() -> bool {
    CI_ENV_VARS
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}
