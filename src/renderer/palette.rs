//! Colors for game elements

/// Linear RGBA, components in 0..=1
pub type Rgba = [f32; 4];

pub const BACKGROUND: Rgba = [0.06, 0.06, 0.12, 1.0];
pub const GRID_LINE: Rgba = [1.0, 1.0, 1.0, 0.02];
pub const PADDLE_TOP: u32 = 0xe94560;
pub const PADDLE_BOTTOM: u32 = 0xc73652;
pub const BALL_CORE: u32 = 0xff8080;
pub const BALL_RIM: u32 = 0xcc0000;
/// Full-screen tint while the phase is `Dead`
pub const LOSS_FLASH: Rgba = [233.0 / 255.0, 69.0 / 255.0, 96.0 / 255.0, 0.15];

/// How much brighter the top of a brick gradient is, per channel (0..=255)
pub const BRICK_HIGHLIGHT: u8 = 30;

/// Convert 0xRRGGBB to RGBA
pub fn from_hex(rgb: u32, alpha: f32) -> Rgba {
    let [_, r, g, b] = rgb.to_be_bytes();
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, alpha]
}

/// Add `amount` to every channel of 0xRRGGBB, saturating at 255
pub fn lighten(rgb: u32, amount: u8) -> u32 {
    let [_, r, g, b] = rgb.to_be_bytes();
    u32::from_be_bytes([
        0,
        r.saturating_add(amount),
        g.saturating_add(amount),
        b.saturating_add(amount),
    ])
}

/// CSS color string (`rgba(r,g,b,a)`) for canvas-style back ends
pub fn css(color: Rgba) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}
