use colored::*;
use lanwake_common::status::{ProbeResult, Verdict};
use lanwake_common::wake::WakeOutcome;

use crate::terminal::colors;

pub fn verdict(verdict: Verdict) -> ColoredString {
    let label: &str = verdict.as_str();
    match verdict {
        Verdict::Online => label.color(colors::ONLINE).bold(),
        Verdict::Offline => label.color(colors::OFFLINE).bold(),
        Verdict::Unknown => label.color(colors::UNKNOWN),
    }
}

pub fn probe_signal(result: &ProbeResult) -> ColoredString {
    let state: ColoredString = if result.success {
        "open".color(colors::ONLINE)
    } else {
        "no answer".color(colors::SEPARATOR)
    };
    format!("{} {}", state, elapsed_ms(result.elapsed_ms)).normal()
}

pub fn outcome(outcome: &WakeOutcome) -> ColoredString {
    match outcome {
        WakeOutcome::Success => "sent".color(colors::ONLINE).bold(),
        WakeOutcome::Failure { detail, .. } => detail.as_str().color(colors::OFFLINE),
    }
}

pub fn elapsed_ms(ms: u64) -> ColoredString {
    format!("({}ms)", ms).color(colors::SEPARATOR)
}

pub fn changed_marker(changed: bool) -> ColoredString {
    if changed {
        "changed".color(colors::ACCENT)
    } else {
        "".normal()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_should_keep_plain_label() {
        colored::control::set_override(false);
        assert_eq!(verdict(Verdict::Online).to_string(), "online");
        assert_eq!(verdict(Verdict::Unknown).to_string(), "unknown");
    }
}
