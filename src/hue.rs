// Hue model used by color groups. Hue is a scalar in [0, 3) with the primaries at
// red = 0, green = 1, blue = 2, rather than a 360 degree wheel.

use crate::common::{ColorValue, MAX_COLOR_VALUE};

/// Hue returned for achromatic colors (r == g == b).
pub const ACHROMATIC_HUE: f64 = 2.5;

pub fn rgb_to_hue(r: f64, g: f64, b: f64) -> f64 {
    let lo = r.min(g).min(b);
    let hi = r.max(g).max(b);
    if hi == lo {
        return ACHROMATIC_HUE;
    }
    let span = hi - lo;
    if r == hi {
        if b == lo {
            (g - lo) / span / 2.0
        } else {
            3.0 - (b - lo) / span / 2.0
        }
    } else if g == hi {
        if r == lo {
            1.0 + (b - lo) / span / 2.0
        } else {
            1.0 - (r - lo) / span / 2.0
        }
    } else if g == lo {
        2.0 + (r - lo) / span / 2.0
    } else {
        2.0 - (g - lo) / span / 2.0
    }
}

/// Unit hue direction, each channel in [0, 1].
pub fn hue_to_rgb(hue: f64) -> [f64; 3] {
    if hue < 0.0 {
        [0.0, 0.0, 0.0]
    } else if hue <= 0.5 {
        [1.0, 2.0 * hue, 0.0]
    } else if hue <= 1.0 {
        [2.0 * (1.0 - hue), 1.0, 0.0]
    } else if hue <= 1.5 {
        [0.0, 1.0, 2.0 * (hue - 1.0)]
    } else if hue <= 2.0 {
        [0.0, 2.0 * (2.0 - hue), 1.0]
    } else if hue <= 2.5 {
        [2.0 * (hue - 2.0), 0.0, 1.0]
    } else if hue <= 3.0 {
        [1.0, 0.0, 2.0 * (3.0 - hue)]
    } else {
        [1.0, 1.0, 1.0]
    }
}

/// Circular addition on [0, 3).
pub fn hue_sum(a: f64, b: f64) -> f64 {
    ((a + b) % 3.0 + 3.0) % 3.0
}

pub fn float_to_five(x: f64) -> ColorValue {
    let n = (31.0 * x + 0.5).floor();
    if n.is_nan() {
        return 0;
    }
    n.clamp(0.0, MAX_COLOR_VALUE as f64) as ColorValue
}
