//! 颜色换算：快照存 hex，恢复时展开为 RGB 分量。

/// `#RRGGBB` / `RRGGBB` → RGB 分量。
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    // 非 ASCII 输入直接拒绝，避免按字节切片切在字符边界上。
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let red = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let green = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let blue = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((red, green, blue))
}

/// RGB 分量 → `#rrggbb`。
pub fn rgb_to_hex(red: u8, green: u8, blue: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", red, green, blue)
}

/// HSV → `#rrggbb`。hue 为角度（0-360），saturation/value 为 0-1。
pub fn hsv_to_hex(hue: f64, saturation: f64, value: f64) -> String {
    let hue = hue.rem_euclid(360.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);

    let chroma = value * saturation;
    let side = (hue / 60.0) % 2.0 - 1.0;
    let x = chroma * (1.0 - side.abs());
    let (r1, g1, b1) = match hue {
        h if h < 60.0 => (chroma, x, 0.0),
        h if h < 120.0 => (x, chroma, 0.0),
        h if h < 180.0 => (0.0, chroma, x),
        h if h < 240.0 => (0.0, x, chroma),
        h if h < 300.0 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let to_byte = |component: f64| ((component + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    rgb_to_hex(to_byte(r1), to_byte(g1), to_byte(b1))
}
