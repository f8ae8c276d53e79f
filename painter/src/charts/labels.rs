use ab_glyph::ScaleFont;
use ab_glyph::{Font, PxScale};

use super::constants::*;
use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

/// Where a label sits relative to its anchor pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
    LeftOf,
    RightOf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabel {
    pub anchor: (i32, i32),
    pub text: String,
    pub color: Rgb<u8>,
    pub placement: Placement,
    pub scale: PxScale,
    pub background: Option<Rgb<u8>>,
}

// Gap between the anchor point and the label box.
const LABEL_OFFSET: i32 = 8;

pub fn draw_labels(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    font: &impl Font,
    labels: &[ChartLabel],
) -> anyhow::Result<()> {
    for label in labels {
        let (text_width, text_height) = text_size(label.scale, font, &label.text);
        let (w, h) = (text_width as i32, text_height as i32);
        let (ax, ay) = label.anchor;

        let (x, y) = match label.placement {
            Placement::Above => (ax - w / 2, ay - LABEL_OFFSET - h),
            Placement::Below => (ax - w / 2, ay + LABEL_OFFSET),
            Placement::LeftOf => (ax - LABEL_OFFSET - w, ay - h / 2),
            Placement::RightOf => (ax + LABEL_OFFSET, ay - h / 2),
        };

        draw_label(
            img,
            font,
            &label.text,
            x.max(0) as f32,
            y.max(0) as f32,
            label.scale,
            label.color,
            label.background,
        )?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn draw_label<F: Font>(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    font: &F,
    text: &str,
    x: f32,
    y: f32,
    scale: PxScale,
    color: Rgb<u8>,
    background_color: Option<Rgb<u8>>,
) -> anyhow::Result<Rect> {
    let font_metrics = font.as_scaled(scale);
    let (text_width, text_height) = text_size(scale, font, text);
    if text_width == 0 || text_height == 0 {
        anyhow::bail!("Label '{text}' has no visible glyphs");
    }
    let padding = 2f32 * scale.x / text_height as f32;
    let bounding_rect = Rect::at(x as i32, y as i32).of_size(
        text_width + 2 * padding as u32,
        text_height + 2 * padding as u32,
    );

    if let Some(background_color) = background_color {
        draw_filled_rect_mut(img, bounding_rect, background_color);
    };

    draw_text_mut(
        img,
        color,
        (x + padding) as i32,
        (y + padding + font_metrics.descent() / text_height as f32 * scale.y * 0.6) as i32,
        scale,
        font,
        text,
    );

    Ok(bounding_rect)
}

/// Outlined badge, used for the LIVE marker.
#[allow(clippy::too_many_arguments)]
pub fn draw_hallow_label<F: Font>(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    font: &F,
    text: &str,
    x: f32,
    y: f32,
    scale: PxScale,
    font_color: Rgb<u8>,
    border_color: Rgb<u8>,
) -> anyhow::Result<Rect> {
    let font_metrics = font.as_scaled(scale);
    let (text_width, text_height) = text_size(scale, font, text);
    if text_width == 0 || text_height == 0 {
        anyhow::bail!("Label '{text}' has no visible glyphs");
    }
    let padding = 2f32 * scale.x / text_height as f32;

    let rect = Rect::at(x as i32, y as i32).of_size(
        text_width + 2 * padding as u32,
        text_height + 2 * padding as u32,
    );
    draw_filled_rect_mut(img, rect, LABEL_BG_COLOR);
    draw_hollow_rect_mut(img, rect, border_color);

    draw_text_mut(
        img,
        font_color,
        (x + padding) as i32,
        (y + padding + font_metrics.descent() / text_height as f32 * scale.y * 0.6) as i32,
        scale,
        font,
        text,
    );

    Ok(rect)
}
