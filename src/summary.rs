use serde::{Deserialize, Serialize};

/// One attendance row as returned by the backend, snake_case on the wire.
/// Fields the aggregation does not use (lecture id, course id, timestamps,
/// ...) ride along in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub is_present: bool,
    #[serde(default)]
    pub medical_approved: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub percentage: f64,
    pub present: u32,
    pub total: u32,
    pub absent: u32,
    pub medical_approved: u32,
}

/// Half-up rounding to two decimals: `floor(100*x + 0.5) / 100`.
pub fn round2(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Reduce attendance rows into counts and a percentage.
///
/// Each record lands in exactly one bucket: present, medical-approved
/// absence, or plain absence. A rejected or still-pending certificate counts
/// as a plain absence here; the pending/rejected distinction is a display
/// concern. Missing fields deserialize as absent rather than erroring.
pub fn summarize(records: &[AttendanceRecord], include_medical_approved: bool) -> AttendanceSummary {
    let mut present = 0u32;
    let mut absent = 0u32;
    let mut medical_approved = 0u32;

    for r in records {
        if r.is_present {
            present += 1;
        } else if r.medical_approved == Some(true) {
            medical_approved += 1;
        } else {
            absent += 1;
        }
    }

    let total = records.len() as u32;
    let numerator = if include_medical_approved {
        present + medical_approved
    } else {
        present
    };
    let percentage = if total > 0 {
        round2(f64::from(numerator) / f64::from(total) * 100.0)
    } else {
        0.0
    };

    AttendanceSummary {
        percentage,
        present,
        total,
        absent,
        medical_approved,
    }
}

/// Status label at the 90/85/75 boundaries, first match high-to-low.
pub fn status_label(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "Excellent"
    } else if percentage >= 85.0 {
        "Good"
    } else if percentage >= 75.0 {
        "Satisfactory"
    } else {
        "Critical"
    }
}

/// Foreground color tier. Same partition as the label; kept as its own
/// mapping because the UI binds it separately.
pub fn status_color(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "green"
    } else if percentage >= 85.0 {
        "blue"
    } else if percentage >= 75.0 {
        "yellow"
    } else {
        "red"
    }
}

/// Background color tier.
pub fn status_bg_color(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "green"
    } else if percentage >= 85.0 {
        "blue"
    } else if percentage >= 75.0 {
        "yellow"
    } else {
        "red"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Up,
    Flat,
    Down,
}

/// Trend arrow for the percentage card. Three tiers only (90/75); this is a
/// different affordance from the four-tier status partition and must not be
/// folded into it.
pub fn trend(percentage: f64) -> Trend {
    if percentage >= 90.0 {
        Trend::Up
    } else if percentage >= 75.0 {
        Trend::Flat
    } else {
        Trend::Down
    }
}

/// Smallest number of future lectures, all assumed attended, that lifts
/// `present/total` to `target_percentage`. Zero history projects to zero.
///
/// Precondition: `target_percentage < 100` (the closed form divides by
/// `100 - target`); callers own that check.
pub fn lectures_needed_for_target(
    current_present: u32,
    current_total: u32,
    target_percentage: f64,
) -> u32 {
    if current_total == 0 {
        return 0;
    }
    let current = f64::from(current_present) / f64::from(current_total) * 100.0;
    if current >= target_percentage {
        return 0;
    }

    // (present + x) / (total + x) >= target/100, solved for integer x.
    let needed = ((target_percentage * f64::from(current_total)
        - 100.0 * f64::from(current_present))
        / (100.0 - target_percentage))
        .ceil();
    if needed > 0.0 {
        needed as u32
    } else {
        0
    }
}
