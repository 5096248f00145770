//! Sequential and diverging colour scales for the heatmap.

use image::Rgba;
use serde::{Deserialize, Serialize};

// ColorBrewer YlGnBu, 9 classes (light -> dark).
const YL_GN_BU: [[u8; 3]; 9] = [
    [0xff, 0xff, 0xd9],
    [0xed, 0xf8, 0xb1],
    [0xc7, 0xe9, 0xb4],
    [0x7f, 0xcd, 0xbb],
    [0x41, 0xb6, 0xc4],
    [0x1d, 0x91, 0xc0],
    [0x22, 0x5e, 0xa8],
    [0x25, 0x34, 0x94],
    [0x08, 0x1d, 0x58],
];

// ColorBrewer RdBu, 11 classes (red -> blue).
const RD_BU: [[u8; 3]; 11] = [
    [0x67, 0x00, 0x1f],
    [0xb2, 0x18, 0x2b],
    [0xd6, 0x60, 0x4d],
    [0xf4, 0xa5, 0x82],
    [0xfd, 0xdb, 0xc7],
    [0xf7, 0xf7, 0xf7],
    [0xd1, 0xe5, 0xf0],
    [0x92, 0xc5, 0xde],
    [0x43, 0x93, 0xc3],
    [0x21, 0x66, 0xac],
    [0x05, 0x30, 0x61],
];

pub const DARK_TEXT: Rgba<u8> = Rgba([0x26, 0x26, 0x26, 0xff]);
pub const LIGHT_TEXT: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Luminance above which a cell gets dark annotation text.
pub const LUMINANCE_SPLIT: f64 = 0.408;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colormap {
    YlGnBu,
    RdBu,
}

impl Colormap {
    fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            Self::YlGnBu => &YL_GN_BU,
            Self::RdBu => &RD_BU,
        }
    }

    /// Sample at t in [0, 1]; t outside is clamped, NaN maps to the low end.
    pub fn sample(&self, t: f64) -> Rgba<u8> {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f64;
        let lo = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - lo as f64;
        let (a, b) = (stops[lo], stops[lo + 1]);
        let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * frac).round() as u8;
        Rgba([mix(0), mix(1), mix(2), 0xff])
    }

    /// Colour for `value` on the scale [vmin, vmax].
    pub fn color_for(&self, value: f64, vmin: f64, vmax: f64) -> Rgba<u8> {
        let span = vmax - vmin;
        if span <= 0.0 {
            return self.sample(0.5);
        }
        self.sample((value - vmin) / span)
    }
}

/// WCAG relative luminance of an sRGB colour, in [0, 1].
pub fn relative_luminance(color: Rgba<u8>) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(color[0]) + 0.7152 * linear(color[1]) + 0.0722 * linear(color[2])
}

/// Annotation colour that stays legible on `background`.
pub fn contrasting_text(background: Rgba<u8>) -> Rgba<u8> {
    if relative_luminance(background) > LUMINANCE_SPLIT {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}
