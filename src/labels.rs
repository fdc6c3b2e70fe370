pub const UNKNOWN_LABEL: &str = "Unknown Type";
pub const GENERIC_TIP: &str = "Protect your skin from sun exposure";

const SKIN_TONE_LABELS: [&str; 6] = [
    "Very Light (Type I)",
    "Light (Type II)",
    "Medium (Type III)",
    "Olive (Type IV)",
    "Brown (Type V)",
    "Dark (Type VI)",
];

const CARE_TIPS: [&str; 6] = [
    "Use SPF 50+ daily, avoid peak sun hours",
    "Use SPF 30-50 daily, moisturize regularly",
    "Use SPF 15-30, consider vitamin C serums",
    "Use SPF 15-30, may tan easily",
    "Use SPF 15-30, focus on hydration",
    "Use SPF 15-30, may need extra moisture",
];

pub fn label_for(class_id: i64) -> &'static str {
    usize::try_from(class_id)
        .ok()
        .and_then(|i| SKIN_TONE_LABELS.get(i))
        .copied()
        .unwrap_or(UNKNOWN_LABEL)
}

pub fn tip_for(class_id: i64) -> &'static str {
    usize::try_from(class_id)
        .ok()
        .and_then(|i| CARE_TIPS.get(i))
        .copied()
        .unwrap_or(GENERIC_TIP)
}

/// Renders a model confidence in `[0, 1]` as a percentage with one decimal
/// place, e.g. `93.4%`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}
