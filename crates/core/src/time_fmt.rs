// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! Compact elapsed-time formatting for status lines.

/// Format elapsed seconds as a single coarse unit: "45s", "2m", "1h", "3d".
pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

/// Format elapsed milliseconds, keeping sub-minute precision: "250ms",
/// "1.5s", "42s", then coarse units via [`format_elapsed`].
pub fn format_elapsed_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 10_000 {
        let tenths = (ms % 1000) / 100;
        if tenths == 0 {
            format!("{}s", ms / 1000)
        } else {
            format!("{}.{}s", ms / 1000, tenths)
        }
    } else {
        format_elapsed(ms / 1000)
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
