/// Formats a number the way JavaScript's `Number#toString()` does (`82.74`, `3`, `0.5`).
pub fn js_number(v: f64) -> String {
    let mut buf = ryu_js::Buffer::new();
    buf.format(v).to_string()
}

/// Attribute-friendly number: no `-0`, no float noise next to integers, non-finite as `0`.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    js_number(v)
}
