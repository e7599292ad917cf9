//! Report rendering and privacy redaction
//!
//! Pure formatting over already-collected data; nothing here can fail.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::tasks::TaskResult;
use crate::types::ProfileSnapshot;

/// Redact a display name: first character kept, the rest starred.
#[must_use]
pub fn mask_display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let hidden = chars.count();
            format!("{first}{}", "*".repeat(hidden))
        }
        None => String::new(),
    }
}

/// Redact a numeric identifier.
///
/// Five or more characters keep the first two and last two; short ids
/// (2-4 characters) keep only the first and last; a single character
/// becomes `*`. The masked middle is computed with saturating
/// arithmetic, so it can never go negative.
#[must_use]
pub fn mask_user_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => "*".to_string(),
        n @ 2..=4 => {
            let middle = "*".repeat(n.saturating_sub(2));
            format!("{}{middle}{}", chars[0], chars[n - 1])
        }
        n => {
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[n - 2..].iter().collect();
            format!("{head}{}{tail}", "*".repeat(n - 4))
        }
    }
}

/// Render the final human-readable report.
///
/// One line per task in execution order; the account section is only
/// present when a snapshot was obtained.
#[must_use]
pub fn render_report(
    results: &IndexMap<String, TaskResult>,
    snapshot: Option<&ProfileSnapshot>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== task results ===");
    for (name, result) in results {
        if result.succeeded {
            let _ = writeln!(out, "{name}: succeeded");
        } else {
            let detail = result.detail.as_deref().unwrap_or("unknown error");
            let _ = writeln!(out, "{name}: failed, reason: {detail}");
        }
    }

    if let Some(snapshot) = snapshot {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== account ===");
        let _ = writeln!(out, "name: {}", mask_display_name(&snapshot.display_name));
        let _ = writeln!(out, "uid: {}", mask_user_id(&snapshot.user_id.to_string()));
        let _ = writeln!(out, "level: {}", snapshot.level);
        let _ = writeln!(out, "exp: {}", snapshot.experience);
        let _ = writeln!(out, "coins: {}", snapshot.coin_balance);
    }

    out
}
