//! Display formatting for dashboard values.
//!
//! Pure, stateless mappings from payload values to display strings and from
//! categorical values to style classes.

/// Placeholder shown for missing numeric values.
pub const PLACEHOLDER: &str = "-";

/// Round half away from zero to `decimals` places.
///
/// `format!("{:.1}", x)` rounds exact ties to even, which would render
/// `87.25` as `87.2`.
fn round_half_away(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Format a percentage with one decimal and a `%` suffix.
///
/// ```
/// use eduvision::format::percent;
///
/// assert_eq!(percent(Some(87.25)), "87.3%");
/// assert_eq!(percent(None), "-");
/// ```
#[must_use]
pub fn percent(value: Option<f64>) -> String {
    match present(value) {
        Some(v) => format!("{:.1}%", round_half_away(v, 1)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Format a grade-point average with two decimals.
#[must_use]
pub fn sgpa(value: Option<f64>) -> String {
    match present(value) {
        Some(v) => format!("{:.2}", round_half_away(v, 2)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Format a rank as an English ordinal (`1st`, `2nd`, `11th`, `21st`).
///
/// A missing or zero rank renders as the placeholder.
#[must_use]
pub fn ordinal(value: Option<u32>) -> String {
    let Some(n) = value.filter(|n| *n > 0) else {
        return PLACEHOLDER.to_string();
    };

    let suffix = match (n % 10, n % 100) {
        (1, m) if m != 11 => "st",
        (2, m) if m != 12 => "nd",
        (3, m) if m != 13 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Plain numeric display: whole numbers without a fraction.
#[must_use]
pub fn number(value: f64) -> String {
    if value.is_nan() {
        return PLACEHOLDER.to_string();
    }
    format!("{value}")
}

/// [`number`] for values that may be missing.
#[must_use]
pub fn optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), number)
}

/// Avatar initials for a student name.
#[must_use]
pub fn initials(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => "ST".to_string(),
        [only] => only.chars().take(2).collect::<String>().to_uppercase(),
        [first, second, ..] => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}

/// Replace the first underscore with a space (`needs_focus` → `needs focus`).
#[must_use]
pub fn humanize(status: &str) -> String {
    status.replacen('_', " ", 1)
}

/// Badge classes for a letter grade.
#[must_use]
pub fn grade_badge_class(grade: &str) -> &'static str {
    match grade {
        "A+" | "A" => "bg-emerald-100 text-emerald-700",
        "B+" | "B" => "bg-blue-100 text-blue-700",
        "C+" | "C" => "bg-amber-100 text-amber-700",
        _ => "bg-rose-100 text-rose-700",
    }
}

/// Pill classes for a recommendation or focus-area priority.
#[must_use]
pub fn priority_pill_class(priority: &str) -> &'static str {
    match priority {
        "high" => "bg-rose-100 text-rose-700",
        "medium" => "bg-amber-100 text-amber-700",
        _ => "bg-slate-100 text-slate-700",
    }
}

/// Chip classes for a subject status.
#[must_use]
pub fn status_chip_class(status: &str) -> &'static str {
    match status {
        "strong" => "bg-emerald-100 text-emerald-700",
        "stable" => "bg-blue-100 text-blue-700",
        _ => "bg-rose-100 text-rose-700",
    }
}

/// Chip classes for a goal status.
#[must_use]
pub fn goal_status_chip_class(status: &str) -> &'static str {
    match status {
        "on_track" => "bg-emerald-100 text-emerald-700",
        _ => "bg-amber-100 text-amber-700",
    }
}

/// Text and classes describing the SGPA change since the previous semester.
#[must_use]
pub fn sgpa_change(change: Option<f64>) -> (String, &'static str) {
    match present(change) {
        None => (
            "No previous semester to compare".to_string(),
            "mt-2 text-sm text-slate-500",
        ),
        Some(delta) if delta >= 0.0 => (
            format!("+{:.2} from previous semester", round_half_away(delta, 2)),
            "mt-2 text-sm text-emerald-600",
        ),
        Some(delta) => (
            format!("{:.2} from previous semester", round_half_away(delta, 2)),
            "mt-2 text-sm text-rose-600",
        ),
    }
}
