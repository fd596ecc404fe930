use crate::{Error, Result};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{io::Cursor, sync::LazyLock};
use strum::{Display, EnumString};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
        .unwrap_or_else(|e| panic!("invalid color pattern: {e}"))
});

/// Layers that can be laid over a satellite image for comparison.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum Layer {
    #[serde(rename = "bw")]
    #[strum(serialize = "bw")]
    BlackAndWhite,
    #[serde(rename = "pt")]
    #[strum(serialize = "pt")]
    PseudoThermal,
}

/// Colors the darkest and brightest tones of a pseudo-thermal layer map to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThermalColors {
    pub dark: [u8; 3],
    pub light: [u8; 3],
}

impl Default for ThermalColors {
    fn default() -> Self {
        ThermalColors {
            dark: [0x00, 0x00, 0x00],
            light: [0xFF, 0x00, 0x00],
        }
    }
}

impl ThermalColors {
    pub fn parse(dark: Option<&str>, light: Option<&str>) -> Result<ThermalColors> {
        let default = ThermalColors::default();
        Ok(ThermalColors {
            dark: dark.map(parse_hex_color).transpose()?.unwrap_or(default.dark),
            light: light.map(parse_hex_color).transpose()?.unwrap_or(default.light),
        })
    }
}

pub fn parse_hex_color(color: &str) -> Result<[u8; 3]> {
    let captures = HEX_COLOR
        .captures(color.trim())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid color: {color}")))?;
    let mut res = [0u8; 3];
    for (i, channel) in res.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&captures[i + 1], 16)
            .map_err(|_| Error::InvalidInput(format!("Invalid color: {color}")))?;
    }
    Ok(res)
}

/// Decodes `bytes`, applies the layer and encodes the result as PNG.
pub fn apply(bytes: &[u8], layer: Layer, colors: &ThermalColors) -> Result<Vec<u8>> {
    let gray = decode_gray(bytes)?;
    match layer {
        Layer::BlackAndWhite => encode_png(DynamicImage::ImageLuma8(gray)),
        Layer::PseudoThermal => encode_png(DynamicImage::ImageRgb8(colorize(&gray, colors))),
    }
}

fn decode_gray(bytes: &[u8]) -> Result<GrayImage> {
    if bytes.is_empty() {
        return Err(Error::InvalidInput("Image is empty".into()));
    }
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([luma(rgb.get_pixel(x, y))])
    }))
}

/// ITU-R 601-2 luma, `L = R * 299/1000 + G * 587/1000 + B * 114/1000`.
fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0.map(u32::from);
    ((r * 299 + g * 587 + b * 114) / 1000) as u8
}

/// Linear ramp from `dark` at luma 0 to `light` at luma 255.
fn colorize(gray: &GrayImage, colors: &ThermalColors) -> RgbImage {
    let channel = |dark: u8, light: u8, luma: u8| -> u8 {
        let dark = dark as i32;
        let light = light as i32;
        (dark + ((light - dark) * luma as i32).div_euclid(255)) as u8
    };
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let luma = gray.get_pixel(x, y).0[0];
        Rgb([
            channel(colors.dark[0], colors.light[0], luma),
            channel(colors.dark[1], colors.light[1], luma),
            channel(colors.dark[2], colors.light[2], luma),
        ])
    })
}

fn encode_png(img: DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
