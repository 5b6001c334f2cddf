use crate::state::Color;

pub type ColorRGB = [u8; 3];

pub fn scale_color(c: u8) -> u8 {
    ((c as u16) * 255 / 31) as u8
}

pub fn color_to_rgb8(c: Color) -> ColorRGB {
    [scale_color(c.r), scale_color(c.g), scale_color(c.b)]
}

pub fn alpha_blend(bg: ColorRGB, fg: ColorRGB, alpha: f32) -> ColorRGB {
    let gamma = 2.2;
    let mut out: ColorRGB = [0, 0, 0];
    for i in 0..3 {
        out[i] = f32::powf(
            (1.0 - alpha) * f32::powf(bg[i] as f32, gamma) + alpha * f32::powf(fg[i] as f32, gamma),
            1.0 / gamma,
        )
        .round() as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_color() {
        assert_eq!(scale_color(0), 0);
        assert_eq!(scale_color(31), 255);
        assert_eq!(scale_color(16), 131);
    }

    #[test]
    fn test_alpha_blend_endpoints() {
        let bg = [10, 200, 30];
        let fg = [250, 0, 90];
        assert_eq!(alpha_blend(bg, fg, 0.0), bg);
        assert_eq!(alpha_blend(bg, fg, 1.0), fg);
    }
}
