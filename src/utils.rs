/// Round to two decimals (drop-set weight progression).
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal (week-over-week percentage change).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
