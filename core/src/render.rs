//! Heatmap rendering.
//!
//! LAYOUT (fixed canvas, grid sized to fit):
//!   - title band across the top
//!   - y tick labels in the left margin, right-aligned against the grid
//!   - x tick labels under the grid, rotated about their right end
//!   - colour bar with ticks and a vertical caption to the right
//!
//! The canvas is always exactly `width x height`. The number of matrix
//! rows only changes the cell size, never the image size.

use crate::{
    colormap::{contrasting_text, Colormap, DARK_TEXT},
    correlation::CorrelationMatrix,
    error::{ChartError, ChartResult},
};
use ab_glyph::{FontRef, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_text_mut, text_size},
    geometric_transformations::{rotate_about_center, Interpolation},
    rect::Rect,
};
use serde::{Deserialize, Serialize};

const REGULAR_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const BOLD_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

pub const BACKGROUND: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

const OUTER_PAD: u32 = 8;
const TITLE_GAP: u32 = 12;
const TICK_GAP: u32 = 5;
const TICK_LEN: u32 = 3;
const COLORBAR_GAP: u32 = 14;
const COLORBAR_WIDTH: u32 = 14;
const COLORBAR_SHRINK: f32 = 0.8;
const COLORBAR_TICKS: usize = 5;

const TITLE_PX: f32 = 18.0;
const LABEL_PX: f32 = 11.0;
const ANNOTATION_PX: f32 = 11.0;
const MIN_FONT_PX: f32 = 6.0;

/// Tick labels may take at most this share of the canvas width.
const MAX_LABEL_SHARE: f32 = 0.35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapStyle {
    pub colormap: Colormap,
    pub annotate: bool,
    pub decimals: usize,
    /// Hide the upper triangle and the diagonal.
    pub mask_upper: bool,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub colorbar_label: String,
    pub vmin: f64,
    pub vmax: f64,
    pub grid_line_width: u32,
    pub x_label_rotation_deg: f32,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            colormap: Colormap::YlGnBu,
            annotate: true,
            decimals: 2,
            mask_upper: true,
            width: 512,
            height: 512,
            title: "Customer Engagement Metric Correlation Matrix".into(),
            colorbar_label: "Pearson Correlation".into(),
            vmin: -1.0,
            vmax: 1.0,
            grid_line_width: 1,
            x_label_rotation_deg: 45.0,
        }
    }
}

/// Placement of the cell grid on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub origin_x: u32,
    pub origin_y: u32,
    pub cell: u32,
    pub n: usize,
}

impl GridLayout {
    pub fn side(&self) -> u32 {
        self.cell * self.n as u32
    }

    /// Top-left pixel of cell (row, col).
    pub fn cell_origin(&self, row: usize, col: usize) -> (u32, u32) {
        (
            self.origin_x + col as u32 * self.cell,
            self.origin_y + row as u32 * self.cell,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorbarLayout {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A rendered chart, ready for the writer.
pub struct Figure {
    image: RgbaImage,
    grid: GridLayout,
    colorbar: ColorbarLayout,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn grid(&self) -> GridLayout {
        self.grid
    }

    pub fn colorbar(&self) -> ColorbarLayout {
        self.colorbar
    }
}

struct Fonts {
    regular: FontRef<'static>,
    bold: FontRef<'static>,
}

impl Fonts {
    fn load() -> ChartResult<Self> {
        let regular = FontRef::try_from_slice(REGULAR_FONT)
            .map_err(|e| ChartError::Font(format!("regular face: {e}")))?;
        let bold = FontRef::try_from_slice(BOLD_FONT)
            .map_err(|e| ChartError::Font(format!("bold face: {e}")))?;
        Ok(Self { regular, bold })
    }
}

/// Everything the draw pass needs, resolved before touching pixels.
struct Layout {
    title_scale: PxScale,
    label_scale: PxScale,
    annotation_scale: PxScale,
    grid: GridLayout,
    colorbar: ColorbarLayout,
    tick_labels: Vec<String>,
}

pub struct HeatmapRenderer {
    style: HeatmapStyle,
    fonts: Fonts,
}

impl HeatmapRenderer {
    pub fn new(style: HeatmapStyle) -> ChartResult<Self> {
        Ok(Self {
            style,
            fonts: Fonts::load()?,
        })
    }

    pub fn render(&self, matrix: &CorrelationMatrix) -> ChartResult<Figure> {
        let layout = self.layout(matrix)?;
        let style = &self.style;
        let mut canvas = RgbaImage::from_pixel(style.width, style.height, BACKGROUND);

        self.draw_title(&mut canvas, &layout);
        self.draw_cells(&mut canvas, matrix, &layout);
        self.draw_y_labels(&mut canvas, matrix, &layout);
        self.draw_x_labels(&mut canvas, matrix, &layout);
        self.draw_colorbar(&mut canvas, &layout);

        log::debug!(
            "rendered {}x{} heatmap: {} cells of {}px at ({}, {})",
            style.width,
            style.height,
            layout.grid.n,
            layout.grid.cell,
            layout.grid.origin_x,
            layout.grid.origin_y
        );

        Ok(Figure {
            image: canvas,
            grid: layout.grid,
            colorbar: layout.colorbar,
        })
    }

    fn layout_error(&self, reason: impl Into<String>) -> ChartError {
        ChartError::Layout {
            width: self.style.width,
            height: self.style.height,
            reason: reason.into(),
        }
    }

    fn layout(&self, matrix: &CorrelationMatrix) -> ChartResult<Layout> {
        let style = &self.style;
        let n = matrix.size();
        if n == 0 {
            return Err(self.layout_error("matrix is empty"));
        }
        if style.width <= 2 * OUTER_PAD || style.height <= 2 * OUTER_PAD {
            return Err(self.layout_error("canvas smaller than its padding"));
        }

        let inner_width = style.width - 2 * OUTER_PAD;
        let title_scale = fit_scale(&self.fonts.bold, &style.title, inner_width, TITLE_PX);
        let title_height = if style.title.is_empty() {
            0
        } else {
            text_size(title_scale, &self.fonts.bold, &style.title).1 + TITLE_GAP
        };

        let label_budget = (style.width as f32 * MAX_LABEL_SHARE) as u32;
        let label_scale = matrix
            .labels()
            .iter()
            .map(|l| fit_scale(&self.fonts.regular, l, label_budget, LABEL_PX))
            .fold(PxScale::from(LABEL_PX), |acc, s| if s.y < acc.y { s } else { acc });
        let (max_label_w, label_h) = matrix.labels().iter().fold((0, 0), |(w, h), l| {
            let (lw, lh) = text_size(label_scale, &self.fonts.regular, l);
            (w.max(lw), h.max(lh))
        });

        let theta = style.x_label_rotation_deg.clamp(0.0, 90.0).to_radians();
        let rotated_depth =
            (max_label_w as f32 * theta.sin() + label_h as f32 * theta.cos()).ceil() as u32;

        let tick_labels = colorbar_ticks(style.vmin, style.vmax)
            .into_iter()
            .map(|v| format!("{v:.1}"))
            .collect::<Vec<_>>();
        let tick_label_w = tick_labels
            .iter()
            .map(|t| text_size(label_scale, &self.fonts.regular, t).0)
            .max()
            .unwrap_or(0);
        let caption_h = if style.colorbar_label.is_empty() {
            0
        } else {
            text_size(label_scale, &self.fonts.regular, &style.colorbar_label).1 + TICK_GAP
        };

        let left = OUTER_PAD + max_label_w + TICK_GAP;
        let right = COLORBAR_GAP + COLORBAR_WIDTH + TICK_LEN + 2 + tick_label_w + TICK_GAP
            + caption_h
            + OUTER_PAD;
        let top = OUTER_PAD + title_height;
        let bottom = TICK_GAP + rotated_depth + OUTER_PAD;

        let avail_w = style
            .width
            .checked_sub(left + right)
            .ok_or_else(|| self.layout_error("labels and colour bar exceed the width"))?;
        let avail_h = style
            .height
            .checked_sub(top + bottom)
            .ok_or_else(|| self.layout_error("title and labels exceed the height"))?;

        let cell = avail_w.min(avail_h) / n as u32;
        if cell < 2 {
            return Err(self.layout_error(format!("{n} cells leave less than 2px each")));
        }
        let side = cell * n as u32;
        let grid = GridLayout {
            origin_x: left + (avail_w - side) / 2,
            origin_y: top + (avail_h - side) / 2,
            cell,
            n,
        };

        let bar_height = ((side as f32 * COLORBAR_SHRINK).round() as u32).max(2);
        let colorbar = ColorbarLayout {
            x: grid.origin_x + side + COLORBAR_GAP,
            y: grid.origin_y + (side - bar_height.min(side)) / 2,
            width: COLORBAR_WIDTH,
            height: bar_height.min(side),
        };

        let widest = format!("{:.*}", style.decimals, -0.88_f64);
        let annotation_px = ANNOTATION_PX.min(cell as f32 * 0.45);
        let annotation_scale = fit_scale(
            &self.fonts.regular,
            &widest,
            cell.saturating_sub(4),
            annotation_px,
        );

        Ok(Layout {
            title_scale,
            label_scale,
            annotation_scale,
            grid,
            colorbar,
            tick_labels,
        })
    }

    fn draw_title(&self, canvas: &mut RgbaImage, layout: &Layout) {
        let title = &self.style.title;
        if title.is_empty() {
            return;
        }
        let (w, _) = text_size(layout.title_scale, &self.fonts.bold, title);
        let x = self.style.width.saturating_sub(w) / 2;
        draw_text_mut(
            canvas,
            DARK_TEXT,
            x as i32,
            OUTER_PAD as i32,
            layout.title_scale,
            &self.fonts.bold,
            title,
        );
    }

    fn draw_cells(&self, canvas: &mut RgbaImage, matrix: &CorrelationMatrix, layout: &Layout) {
        let style = &self.style;
        let grid = layout.grid;
        let line = if style.grid_line_width < grid.cell {
            style.grid_line_width
        } else {
            0
        };
        let fill = grid.cell - line;

        for row in 0..grid.n {
            for col in 0..grid.n {
                if style.mask_upper && col >= row {
                    continue;
                }
                let value = matrix.get(row, col);
                let color = style.colormap.color_for(value, style.vmin, style.vmax);
                let (x, y) = grid.cell_origin(row, col);
                draw_filled_rect_mut(canvas, Rect::at(x as i32, y as i32).of_size(fill, fill), color);

                if style.annotate {
                    let text = format!("{:.*}", style.decimals, value);
                    let (tw, th) = text_size(layout.annotation_scale, &self.fonts.regular, &text);
                    let tx = x as i32 + (fill as i32 - tw as i32) / 2;
                    let ty = y as i32 + (fill as i32 - th as i32) / 2;
                    draw_text_mut(
                        canvas,
                        contrasting_text(color),
                        tx,
                        ty,
                        layout.annotation_scale,
                        &self.fonts.regular,
                        &text,
                    );
                }
            }
        }
    }

    fn draw_y_labels(&self, canvas: &mut RgbaImage, matrix: &CorrelationMatrix, layout: &Layout) {
        let grid = layout.grid;
        for (row, label) in matrix.labels().iter().enumerate() {
            let (w, h) = text_size(layout.label_scale, &self.fonts.regular, label);
            let x = grid.origin_x as i32 - TICK_GAP as i32 - w as i32;
            let (_, cell_y) = grid.cell_origin(row, 0);
            let y = cell_y as i32 + (grid.cell as i32 - h as i32) / 2;
            draw_text_mut(
                canvas,
                DARK_TEXT,
                x,
                y,
                layout.label_scale,
                &self.fonts.regular,
                label,
            );
        }
    }

    /// Each label is drawn into its own sprite, rotated about its right
    /// end and composited so that end sits under the column centre.
    fn draw_x_labels(&self, canvas: &mut RgbaImage, matrix: &CorrelationMatrix, layout: &Layout) {
        let grid = layout.grid;
        let theta = self.style.x_label_rotation_deg.clamp(0.0, 90.0).to_radians();
        let anchor_y = (grid.origin_y + grid.side() + TICK_GAP) as i64;

        for (col, label) in matrix.labels().iter().enumerate() {
            let sprite = text_sprite(&self.fonts.regular, layout.label_scale, label);
            let (sw, sh) = sprite.dimensions();
            let (cell_x, _) = grid.cell_origin(0, col);
            let anchor_x = (cell_x + grid.cell / 2) as i64;

            if theta == 0.0 {
                imageops::overlay(canvas, &sprite, anchor_x - sw as i64 / 2, anchor_y);
                continue;
            }

            let radius = sw + sh;
            let mut holder = RgbaImage::from_pixel(2 * radius, 2 * radius, TRANSPARENT);
            imageops::overlay(
                &mut holder,
                &sprite,
                (radius - sw) as i64,
                (radius - sh / 2) as i64,
            );
            // rotate_about_center turns clockwise; labels read upward.
            let rotated = rotate_about_center(&holder, -theta, Interpolation::Bilinear, TRANSPARENT);
            imageops::overlay(
                canvas,
                &rotated,
                anchor_x - radius as i64,
                anchor_y - radius as i64,
            );
        }
    }

    fn draw_colorbar(&self, canvas: &mut RgbaImage, layout: &Layout) {
        let style = &self.style;
        let bar = layout.colorbar;
        let span = (bar.height - 1).max(1) as f64;

        for offset in 0..bar.height {
            let t = 1.0 - offset as f64 / span;
            let value = style.vmin + t * (style.vmax - style.vmin);
            let color = style.colormap.color_for(value, style.vmin, style.vmax);
            draw_filled_rect_mut(
                canvas,
                Rect::at(bar.x as i32, (bar.y + offset) as i32).of_size(bar.width, 1),
                color,
            );
        }

        let tick_x = bar.x + bar.width;
        let mut text_right = tick_x + TICK_LEN + 2;
        for (i, label) in layout.tick_labels.iter().enumerate() {
            let t = i as f64 / (COLORBAR_TICKS - 1) as f64;
            let y = bar.y + ((1.0 - t) * span).round() as u32;
            draw_filled_rect_mut(
                canvas,
                Rect::at(tick_x as i32, y as i32).of_size(TICK_LEN, 1),
                DARK_TEXT,
            );
            let (w, h) = text_size(layout.label_scale, &self.fonts.regular, label);
            draw_text_mut(
                canvas,
                DARK_TEXT,
                (tick_x + TICK_LEN + 2) as i32,
                y as i32 - h as i32 / 2,
                layout.label_scale,
                &self.fonts.regular,
                label,
            );
            text_right = text_right.max(tick_x + TICK_LEN + 2 + w);
        }

        if style.colorbar_label.is_empty() {
            return;
        }
        let caption = imageops::rotate270(&text_sprite(
            &self.fonts.regular,
            layout.label_scale,
            &style.colorbar_label,
        ));
        let x = (text_right + TICK_GAP) as i64;
        let y = bar.y as i64 + (bar.height as i64 - caption.height() as i64) / 2;
        imageops::overlay(canvas, &caption, x, y);
    }
}

/// Largest scale, at most `preferred_px`, at which `text` fits `max_width`.
fn fit_scale(font: &FontRef<'_>, text: &str, max_width: u32, preferred_px: f32) -> PxScale {
    let mut px = preferred_px.max(MIN_FONT_PX);
    while px > MIN_FONT_PX && text_size(PxScale::from(px), font, text).0 > max_width {
        px -= 0.5;
    }
    PxScale::from(px.max(MIN_FONT_PX))
}

/// Text drawn onto a transparent canvas with a 1px margin.
fn text_sprite(font: &FontRef<'_>, scale: PxScale, text: &str) -> RgbaImage {
    let (w, h) = text_size(scale, font, text);
    let mut sprite = RgbaImage::from_pixel(w + 2, h + 2, TRANSPARENT);
    draw_text_mut(&mut sprite, DARK_TEXT, 1, 1, scale, font, text);
    sprite
}

fn colorbar_ticks(vmin: f64, vmax: f64) -> Vec<f64> {
    (0..COLORBAR_TICKS)
        .map(|i| vmin + (vmax - vmin) * i as f64 / (COLORBAR_TICKS - 1) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_of(n: usize) -> CorrelationMatrix {
        let columns: Vec<(String, Vec<f64>)> = (0..n)
            .map(|k| {
                let values = (0..40)
                    .map(|r| ((r * (k + 3)) % 7) as f64 + r as f64 * 0.1 * (k % 3) as f64)
                    .collect();
                (format!("Metric {k}"), values)
            })
            .collect();
        let refs: Vec<(&str, &[f64])> = columns
            .iter()
            .map(|(name, v)| (name.as_str(), v.as_slice()))
            .collect();
        CorrelationMatrix::from_columns(&refs).unwrap()
    }

    #[test]
    fn canvas_size_is_fixed_regardless_of_matrix_size() {
        let renderer = HeatmapRenderer::new(HeatmapStyle::default()).unwrap();
        for n in [2, 5, 9, 16] {
            let figure = renderer.render(&matrix_of(n)).unwrap();
            assert_eq!((figure.width(), figure.height()), (512, 512), "n = {n}");
            let grid = figure.grid();
            assert!(grid.origin_x + grid.side() <= 512);
            assert!(grid.origin_y + grid.side() <= 512);
        }
    }

    #[test]
    fn visible_cells_use_the_colormap_and_masked_cells_stay_blank() {
        let style = HeatmapStyle {
            annotate: false,
            ..HeatmapStyle::default()
        };
        let renderer = HeatmapRenderer::new(style.clone()).unwrap();
        let matrix = matrix_of(4);
        let figure = renderer.render(&matrix).unwrap();
        let grid = figure.grid();

        let (x, y) = grid.cell_origin(2, 1);
        let expected = style.colormap.color_for(matrix.get(2, 1), -1.0, 1.0);
        assert_eq!(*figure.image().get_pixel(x + 1, y + 1), expected);

        // Diagonal and upper triangle are masked.
        for (row, col) in [(0, 0), (1, 3), (2, 2)] {
            let (x, y) = grid.cell_origin(row, col);
            assert_eq!(*figure.image().get_pixel(x + 1, y + 1), BACKGROUND);
        }
    }

    fn cell_pixels(figure: &Figure, row: usize, col: usize) -> Vec<Rgba<u8>> {
        let grid = figure.grid();
        let (x, y) = grid.cell_origin(row, col);
        let fill = grid.cell - 1;
        (y..y + fill)
            .flat_map(|py| (x..x + fill).map(move |px| (px, py)))
            .map(|(px, py)| *figure.image().get_pixel(px, py))
            .collect()
    }

    fn distance(a: Rgba<u8>, b: Rgba<u8>) -> i32 {
        (0..3).map(|k| (a[k] as i32 - b[k] as i32).abs()).sum()
    }

    #[test]
    fn annotations_write_values_in_contrasting_text() {
        let matrix = matrix_of(9);
        let plain_style = HeatmapStyle {
            annotate: false,
            ..HeatmapStyle::default()
        };
        let annotated = HeatmapRenderer::new(HeatmapStyle::default())
            .unwrap()
            .render(&matrix)
            .unwrap();
        let plain = HeatmapRenderer::new(plain_style.clone())
            .unwrap()
            .render(&matrix)
            .unwrap();
        assert_eq!(annotated.grid(), plain.grid());

        let fill = plain_style.colormap.color_for(matrix.get(5, 4), -1.0, 1.0);
        let text = contrasting_text(fill);
        let with_text = cell_pixels(&annotated, 5, 4);
        let without_text = cell_pixels(&plain, 5, 4);

        assert!(without_text.iter().all(|&p| p == fill));
        let changed = with_text.iter().zip(&without_text).filter(|(a, b)| a != b).count();
        assert!(changed > 0, "annotated cell has no text pixels");
        let inked = with_text
            .iter()
            .filter(|&&p| distance(p, text) * 2 < distance(fill, text))
            .count();
        assert!(inked > 0, "no pixel leans toward the annotation colour");

        // Masked cells carry no annotation.
        assert_eq!(cell_pixels(&annotated, 2, 6), cell_pixels(&plain, 2, 6));
    }

    #[test]
    fn unmasked_style_paints_the_diagonal() {
        let style = HeatmapStyle {
            annotate: false,
            mask_upper: false,
            ..HeatmapStyle::default()
        };
        let renderer = HeatmapRenderer::new(style.clone()).unwrap();
        let figure = renderer.render(&matrix_of(3)).unwrap();
        let (x, y) = figure.grid().cell_origin(1, 1);
        assert_eq!(
            *figure.image().get_pixel(x + 1, y + 1),
            style.colormap.color_for(1.0, -1.0, 1.0)
        );
    }

    #[test]
    fn colorbar_runs_from_vmax_at_top_to_vmin_at_bottom() {
        let style = HeatmapStyle::default();
        let renderer = HeatmapRenderer::new(style.clone()).unwrap();
        let figure = renderer.render(&matrix_of(9)).unwrap();
        let bar = figure.colorbar();

        let top = *figure.image().get_pixel(bar.x + bar.width / 2, bar.y);
        let bottom = *figure.image().get_pixel(bar.x + bar.width / 2, bar.y + bar.height - 1);
        assert_eq!(top, style.colormap.sample(1.0));
        assert_eq!(bottom, style.colormap.sample(0.0));
        assert!(bar.x + bar.width < 512);
    }

    #[test]
    fn tiny_canvas_is_a_layout_error() {
        let style = HeatmapStyle {
            width: 64,
            height: 64,
            ..HeatmapStyle::default()
        };
        let renderer = HeatmapRenderer::new(style).unwrap();
        let err = renderer.render(&matrix_of(9)).err().expect("layout should fail");
        assert!(matches!(err, ChartError::Layout { width: 64, height: 64, .. }));
    }

    #[test]
    fn empty_matrix_is_a_layout_error() {
        let renderer = HeatmapRenderer::new(HeatmapStyle::default()).unwrap();
        let empty = CorrelationMatrix::from_columns::<&str>(&[]).unwrap();
        assert!(matches!(renderer.render(&empty), Err(ChartError::Layout { .. })));
    }

    #[test]
    fn fit_scale_shrinks_long_text() {
        let fonts = Fonts::load().unwrap();
        let text = "A deliberately long label that cannot fit";
        let scale = fit_scale(&fonts.regular, text, 80, 14.0);
        assert!(scale.y < 14.0);
        assert!(scale.y >= MIN_FONT_PX);
        assert_eq!(fit_scale(&fonts.regular, "ok", 80, 14.0).y, 14.0);
    }
}
