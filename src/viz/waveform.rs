//! Waveform widget for ratatui

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// Oscilloscope view of analyser bytes (128 = silence)
pub struct Waveform<'a> {
    samples: &'a [u8],
    style: Style,
    block: Option<Block<'a>>,
}

impl<'a> Waveform<'a> {
    pub fn new(samples: &'a [u8]) -> Self {
        Self {
            samples,
            style: Style::default(),
            block: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Lowest and highest level in column `x` of `width`, in -1..=1
    fn column_range(&self, x: usize, width: usize) -> Option<(f32, f32)> {
        let len = self.samples.len();
        let start = x * len / width;
        let end = ((x + 1) * len / width).max(start + 1).min(len);
        let column = self.samples.get(start..end)?;

        let (lo, hi) = column
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &b| (lo.min(b), hi.max(b)));
        Some((level(lo), level(hi)))
    }

    fn render_waveform(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.samples.is_empty() {
            return;
        }

        let width = area.width as usize;
        let half_height = (area.height.saturating_sub(1) / 2) as f32;
        let center_y = area.y + area.height / 2;
        let row = |level: f32| -> u16 {
            let offset = (level * half_height).round() as i32;
            (center_y as i32 - offset).clamp(area.y as i32, (area.bottom() - 1) as i32) as u16
        };

        // Center line first so the trace draws over it
        for x in area.left()..area.right() {
            buf.set_string(x, center_y, "─", Style::default());
        }

        for x in 0..width {
            let Some((lo, hi)) = self.column_range(x, width) else {
                continue;
            };
            let screen_x = area.x + x as u16;
            // Higher levels sit on lower rows
            let (top, bottom) = (row(hi), row(lo));
            let glyph = if top == bottom { "•" } else { "│" };
            for y in top..=bottom {
                buf.set_string(screen_x, y, glyph, self.style);
            }
        }
    }
}

/// Map an analyser byte to -1..=1
fn level(byte: u8) -> f32 {
    (byte as f32 - 128.0) / 128.0
}

impl Widget for Waveform<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_waveform(inner_area, buf);
    }
}
