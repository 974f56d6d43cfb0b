//! Full-screen ER-diagram viewer.
//!
//! The image is fetched each time the view opens, decoded with the
//! `image` crate and drawn with upper-half-block cells: the foreground is
//! the top pixel, the background the bottom one.

use image::imageops::FilterType;
use image::RgbaImage;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use dbstudio_core::canvas::ZoomLevel;

use crate::effects::{Command, ER_DIAGRAM_LOAD_FAILED};
use crate::ui::shell::panel_block;

pub const VIEW_TITLE: &str = "ER Diagram";
pub const ZOOM_HINT: &str = "Use Ctrl + Mouse Wheel to zoom. Drag to pan.";
pub const LOADING: &str = "Loading ER Diagram...";

/// Toolbar buttons of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErButton {
    ZoomIn,
    ZoomOut,
    Reset,
    Back,
}

impl ErButton {
    pub const ALL: [ErButton; 4] = [
        ErButton::ZoomIn,
        ErButton::ZoomOut,
        ErButton::Reset,
        ErButton::Back,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ZoomIn => "[+]",
            Self::ZoomOut => "[-]",
            Self::Reset => "[Reset]",
            Self::Back => "[Back]",
        }
    }
}

#[derive(Debug, Default)]
enum ErImage {
    #[default]
    Closed,
    Loading,
    Ready(RgbaImage),
    Failed(String),
}

#[derive(Debug)]
pub struct ErDiagramScreen {
    image: ErImage,
    zoom: ZoomLevel,
    /// Top-left visible cell of the scaled image.
    scroll: (u16, u16),
    scaled: Option<RgbaImage>,
    canvas: Rect,
    toolbar: Vec<(Rect, ErButton)>,
}

impl Default for ErDiagramScreen {
    fn default() -> Self {
        Self {
            image: ErImage::Closed,
            zoom: ZoomLevel::er_diagram(),
            scroll: (0, 0),
            scaled: None,
            canvas: Rect::default(),
            toolbar: Vec::new(),
        }
    }
}

impl ErDiagramScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the view: reset zoom and request the image.
    pub fn open(&mut self) -> Command {
        *self = Self {
            image: ErImage::Loading,
            ..Self::default()
        };
        Command::LoadErDiagram
    }

    /// Leave the view and drop the decoded image.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.image, ErImage::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.image, ErImage::Ready(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.image {
            ErImage::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn scroll(&self) -> (u16, u16) {
        self.scroll
    }

    /// Accept a fetched image. Ignored unless a fetch is pending.
    pub fn receive(&mut self, result: Result<Vec<u8>, String>) {
        if !self.is_loading() {
            tracing::debug!("Dropping ER diagram for a closed view");
            return;
        }
        self.image = match result {
            Ok(bytes) => match image::load_from_memory(&bytes) {
                Ok(decoded) => ErImage::Ready(decoded.to_rgba8()),
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot decode ER diagram");
                    ErImage::Failed(ER_DIAGRAM_LOAD_FAILED.to_string())
                }
            },
            Err(reason) => {
                tracing::warn!(%reason, "ER diagram fetch failed");
                ErImage::Failed(ER_DIAGRAM_LOAD_FAILED.to_string())
            }
        };
        self.scaled = None;
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    pub fn apply_wheel(&mut self, delta_y: f64) {
        self.zoom.apply_wheel(delta_y);
    }

    pub fn reset_view(&mut self) {
        self.zoom.reset();
        self.scroll = (0, 0);
    }

    pub fn set_scroll(&mut self, scroll: (u16, u16)) {
        self.scroll = scroll;
    }

    pub fn pan_by(&mut self, columns: i32, rows: i32) {
        let shift =
            |value: u16, delta: i32| (i32::from(value) + delta).clamp(0, i32::from(u16::MAX)) as u16;
        self.scroll = (shift(self.scroll.0, columns), shift(self.scroll.1, rows));
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.canvas.contains(pos)
    }

    pub fn button_at(&self, pos: Position) -> Option<ErButton> {
        self.toolbar
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, button)| *button)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = panel_block(VIEW_TITLE, true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.toolbar.clear();
        let mut x = inner.x;
        let mut spans = Vec::new();
        for button in ErButton::ALL {
            let width = button.label().chars().count() as u16;
            if x + width > inner.right() || inner.height == 0 {
                break;
            }
            self.toolbar.push((Rect::new(x, inner.y, width, 1), button));
            spans.push(Span::styled(button.label(), Style::default().fg(Color::LightCyan)));
            spans.push(Span::raw(" "));
            x += width + 1;
        }
        spans.push(Span::styled(
            format!(" {:.0}%  {ZOOM_HINT}", self.zoom.scale() * 100.0),
            Style::default().fg(Color::DarkGray),
        ));
        let toolbar_row = Rect {
            height: inner.height.min(1),
            ..inner
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), toolbar_row);

        self.canvas = Rect::new(
            inner.x,
            inner.y.saturating_add(1),
            inner.width,
            inner.height.saturating_sub(1),
        );
        let status = match &self.image {
            ErImage::Closed | ErImage::Loading => Some((LOADING.to_string(), Color::DarkGray)),
            ErImage::Failed(message) => Some((message.clone(), Color::LightRed)),
            ErImage::Ready(_) => None,
        };
        if let Some((text, color)) = status {
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(color)),
                self.canvas,
            );
            return;
        }

        self.rescale();
        let canvas = self.canvas;
        let scroll = self.scroll;
        if let Some(scaled) = &self.scaled {
            draw_half_blocks(frame.buffer_mut(), canvas, scaled, scroll);
        }
    }

    /// Resize the decoded image to the current canvas width and zoom,
    /// reusing the previous result when nothing changed.
    fn rescale(&mut self) {
        let ErImage::Ready(source) = &self.image else {
            return;
        };
        if source.width() == 0 || source.height() == 0 || self.canvas.width == 0 {
            self.scaled = None;
            return;
        }
        let width = ((f64::from(self.canvas.width) * self.zoom.scale()).round() as u32).max(1);
        let height = ((f64::from(source.height()) * f64::from(width) / f64::from(source.width()))
            .round() as u32)
            .max(1);

        let stale = self
            .scaled
            .as_ref()
            .map_or(true, |img| img.dimensions() != (width, height));
        if stale {
            self.scaled = Some(image::imageops::resize(source, width, height, FilterType::Triangle));
        }

        // keep the scroll inside the scaled image
        let rows = height.div_ceil(2);
        let max_x = width.saturating_sub(u32::from(self.canvas.width));
        let max_y = rows.saturating_sub(u32::from(self.canvas.height));
        self.scroll = (
            u32::from(self.scroll.0).min(max_x) as u16,
            u32::from(self.scroll.1).min(max_y) as u16,
        );
    }
}

fn pixel_color(image: &RgbaImage, x: u32, y: u32) -> Color {
    if x >= image.width() || y >= image.height() {
        return Color::Reset;
    }
    let [r, g, b, a] = image.get_pixel(x, y).0;
    if a < 128 {
        Color::Reset
    } else {
        Color::Rgb(r, g, b)
    }
}

fn draw_half_blocks(buf: &mut Buffer, canvas: Rect, image: &RgbaImage, scroll: (u16, u16)) {
    for row in 0..canvas.height {
        let top = (u32::from(scroll.1) + u32::from(row)) * 2;
        if top >= image.height() {
            break;
        }
        for col in 0..canvas.width {
            let x = u32::from(scroll.0) + u32::from(col);
            if x >= image.width() {
                break;
            }
            if let Some(cell) = buf.cell_mut((canvas.x + col, canvas.y + row)) {
                cell.set_symbol("▀")
                    .set_fg(pixel_color(image, x, top))
                    .set_bg(pixel_color(image, x, top + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |_, y| {
            if y < height / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn open_requests_the_image_once_per_visit() {
        let mut screen = ErDiagramScreen::new();
        assert_eq!(screen.open(), Command::LoadErDiagram);
        assert!(screen.is_loading());

        screen.receive(Ok(png(4, 4)));
        assert!(screen.is_ready());

        screen.close();
        screen.receive(Ok(png(4, 4)));
        assert!(!screen.is_ready());
    }

    #[test]
    fn failures_show_fixed_message() {
        let mut screen = ErDiagramScreen::new();
        screen.open();
        screen.receive(Err("Backend returned 500".into()));
        assert_eq!(screen.error(), Some(ER_DIAGRAM_LOAD_FAILED));

        screen.open();
        screen.receive(Ok(b"not an image".to_vec()));
        assert_eq!(screen.error(), Some(ER_DIAGRAM_LOAD_FAILED));
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut screen = ErDiagramScreen::new();
        for _ in 0..40 {
            screen.apply_wheel(-1.0);
        }
        assert_eq!(screen.scale(), 3.0);
        for _ in 0..40 {
            screen.apply_wheel(1.0);
        }
        assert_eq!(screen.scale(), 0.5);
        screen.reset_view();
        assert_eq!(screen.scale(), 1.0);
    }

    #[test]
    fn image_is_drawn_with_half_blocks() {
        let mut screen = ErDiagramScreen::new();
        screen.open();
        screen.receive(Ok(png(20, 8)));

        let mut terminal = Terminal::new(TestBackend::new(22, 8)).unwrap();
        terminal.draw(|frame| screen.render(frame, frame.area())).unwrap();

        // canvas starts below the toolbar at (1, 2); image scaled to 20x8
        let buffer = terminal.backend().buffer();
        let top = &buffer[(1u16, 2u16)];
        assert_eq!(top.symbol(), "▀");
        assert_eq!(top.fg, Color::Rgb(255, 0, 0));
        assert_eq!(top.bg, Color::Rgb(255, 0, 0));
        let bottom = &buffer[(1u16, 5u16)];
        assert_eq!(bottom.fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn scroll_is_kept_inside_the_image() {
        let mut screen = ErDiagramScreen::new();
        screen.open();
        screen.receive(Ok(png(20, 8)));
        screen.pan_by(100, 100);

        let mut terminal = Terminal::new(TestBackend::new(22, 8)).unwrap();
        terminal.draw(|frame| screen.render(frame, frame.area())).unwrap();
        assert_eq!(screen.scroll(), (0, 0));
    }
}
