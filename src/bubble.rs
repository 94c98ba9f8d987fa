//! The floating translation bubble: a singleton overlay owning its own
//! geometry, theme and font state. `BubbleController` is the headless state
//! machine; `BubbleApp` is the thin egui layer that feeds pointer and button
//! events into it.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::geometry::{
    self, Point, Pos, Size, SnapRules, Viewport,
};
use crate::service::Mediator;
use crate::settings::{
    BubbleSettings, Theme, FONT_STEP, MAX_FONT, MIN_FONT, SAFE_MARGIN, SAFE_TOP, SNAP_DISTANCE,
};

/// How long the copy button shows its confirmation glyph.
pub const COPY_FLASH: Duration = Duration::from_millis(800);

/// Languages offered by the selector.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
];

fn snap_rules() -> SnapRules {
    SnapRules {
        safe_margin: SAFE_MARGIN,
        safe_top: SAFE_TOP,
        snap_distance: SNAP_DISTANCE,
    }
}

/// Active pointer gesture. A single enum, so a drag and a resize can never
/// run at the same time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging {
        offset: Point,
    },
    Resizing {
        start_pointer: Point,
        start_size: Size,
    },
}

#[derive(Debug)]
pub struct BubbleState {
    pub text: String,
    pub pos: Pos,
    pub size: Size,
    pub theme: Theme,
    pub font_size: i32,
    pub target_language: String,
    pub gesture: Gesture,
    pub error: Option<String>,
    pub retranslating: bool,
    /// Geometry stashed while full screen; `Some` means full screen is
    /// active. Never persisted.
    stashed: Option<(Pos, Size)>,
    copied_at: Option<Instant>,
}

impl BubbleState {
    pub fn is_full_screen(&self) -> bool {
        self.stashed.is_some()
    }
}

/// Owns the (at most one) bubble and mediates between the geometry engine,
/// the settings service and the render layer.
pub struct BubbleController {
    mediator: Mediator,
    bubble: Option<BubbleState>,
}

impl BubbleController {
    pub fn new(mediator: Mediator) -> Self {
        Self {
            mediator,
            bubble: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bubble.is_some()
    }

    pub fn state(&self) -> Option<&BubbleState> {
        self.bubble.as_ref()
    }

    /// Show the bubble with `text`. If an instance already exists only the
    /// displayed text is replaced; geometry, theme and font stay untouched.
    pub fn show(&mut self, text: &str, viewport: Viewport) {
        if let Some(b) = self.bubble.as_mut() {
            b.text = text.to_string();
            return;
        }

        let stored = self.mediator.get_settings();
        let size = Size {
            width: stored.width,
            height: stored.height,
        };
        let pos = geometry::compute_initial_position(
            stored.left,
            stored.top,
            size,
            viewport,
            snap_rules(),
        );
        self.bubble = Some(BubbleState {
            text: text.to_string(),
            pos,
            size,
            theme: stored.theme,
            font_size: stored.font_size,
            target_language: stored.target_language,
            gesture: Gesture::Idle,
            error: None,
            retranslating: false,
            stashed: None,
            copied_at: None,
        });
    }

    pub fn close(&mut self) {
        self.bubble = None;
    }

    /// Escape exits full screen first; without full screen it closes the
    /// bubble.
    pub fn handle_escape(&mut self) {
        let Some(b) = self.bubble.as_mut() else { return };
        if let Some((pos, size)) = b.stashed.take() {
            b.pos = pos;
            b.size = size;
        } else {
            self.bubble = None;
        }
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        let Some(b) = self.bubble.as_mut() else { return };
        if b.gesture != Gesture::Idle || b.is_full_screen() {
            return;
        }
        b.gesture = Gesture::Dragging {
            offset: Point {
                x: pointer.x - b.pos.left,
                y: pointer.y - b.pos.top,
            },
        };
    }

    pub fn drag_to(&mut self, pointer: Point, viewport: Viewport) {
        let Some(b) = self.bubble.as_mut() else { return };
        if let Gesture::Dragging { offset } = b.gesture {
            b.pos = geometry::compute_drag_position(pointer, offset, b.size, viewport, snap_rules());
        }
    }

    pub fn end_drag(&mut self, viewport: Viewport) {
        let Some(b) = self.bubble.as_mut() else { return };
        if !matches!(b.gesture, Gesture::Dragging { .. }) {
            return;
        }
        b.gesture = Gesture::Idle;
        b.pos = geometry::snap_to_edges(b.pos, b.size, viewport, snap_rules());
        self.persist();
    }

    pub fn begin_resize(&mut self, pointer: Point) {
        let Some(b) = self.bubble.as_mut() else { return };
        if b.gesture != Gesture::Idle || b.is_full_screen() {
            return;
        }
        b.gesture = Gesture::Resizing {
            start_pointer: pointer,
            start_size: b.size,
        };
    }

    pub fn resize_to(&mut self, pointer: Point) {
        let Some(b) = self.bubble.as_mut() else { return };
        if let Gesture::Resizing {
            start_pointer,
            start_size,
        } = b.gesture
        {
            b.size = geometry::compute_resized_size(pointer, start_pointer, start_size);
        }
    }

    pub fn end_resize(&mut self) {
        let Some(b) = self.bubble.as_mut() else { return };
        if !matches!(b.gesture, Gesture::Resizing { .. }) {
            return;
        }
        b.gesture = Gesture::Idle;
        self.persist();
    }

    pub fn increase_font(&mut self) {
        let Some(b) = self.bubble.as_mut() else { return };
        if b.font_size < MAX_FONT {
            b.font_size += FONT_STEP;
            self.persist();
        }
    }

    pub fn decrease_font(&mut self) {
        let Some(b) = self.bubble.as_mut() else { return };
        if b.font_size > MIN_FONT {
            b.font_size -= FONT_STEP;
            self.persist();
        }
    }

    pub fn toggle_theme(&mut self) {
        let Some(b) = self.bubble.as_mut() else { return };
        b.theme = b.theme.toggled();
        self.persist();
    }

    /// Empty the displayed text. Not persisted.
    pub fn clear_text(&mut self) {
        if let Some(b) = self.bubble.as_mut() {
            b.text.clear();
        }
    }

    pub fn mark_copied(&mut self, now: Instant) {
        if let Some(b) = self.bubble.as_mut() {
            b.copied_at = Some(now);
        }
    }

    pub fn copy_glyph(&self, now: Instant) -> &'static str {
        match self.bubble.as_ref().and_then(|b| b.copied_at) {
            Some(at) if now.duration_since(at) < COPY_FLASH => "✔",
            _ => "📋",
        }
    }

    /// Toggle full screen: stash the current geometry and fill the viewport,
    /// or restore the stash. The stash is never persisted.
    pub fn toggle_full_screen(&mut self, viewport: Viewport) {
        let Some(b) = self.bubble.as_mut() else { return };
        b.gesture = Gesture::Idle;
        if let Some((pos, size)) = b.stashed.take() {
            b.pos = pos;
            b.size = size;
        } else {
            b.stashed = Some((b.pos, b.size));
            b.pos = Pos { left: 0.0, top: 0.0 };
            b.size = Size {
                width: viewport.width,
                height: viewport.height,
            };
        }
    }

    /// Persist the chosen language, then ask the background service for a
    /// fresh translation of the displayed text.
    pub fn set_language(&mut self, language: String) {
        let Some(b) = self.bubble.as_mut() else { return };
        if b.target_language == language {
            return;
        }
        b.target_language = language.clone();
        b.retranslating = true;
        b.error = None;
        let text = b.text.clone();
        self.persist();
        self.mediator.retranslate(text, language);
    }

    /// Pick up a completed retranslate round trip, if any. Success swaps the
    /// displayed text; failure shows the inline error banner.
    pub fn poll(&mut self) {
        let Some(out) = self.mediator.take_retranslate() else { return };
        let Some(b) = self.bubble.as_mut() else { return };
        b.retranslating = false;
        match out.result {
            Ok(translated) => {
                b.text = translated;
                b.error = None;
            }
            Err(message) => b.error = Some(message),
        }
    }

    /// Save the full merged settings record. While full screen the stashed
    /// geometry is the one worth keeping.
    fn persist(&mut self) {
        let Some(b) = self.bubble.as_ref() else { return };
        let (pos, size) = b.stashed.unwrap_or((b.pos, b.size));
        let data = BubbleSettings {
            theme: b.theme,
            font_size: b.font_size,
            width: size.width,
            height: size.height,
            left: pos.left,
            top: pos.top,
            target_language: b.target_language.clone(),
        };
        if !self.mediator.save_settings(data) {
            tracing::warn!("settings were not saved");
        }
    }
}

struct Palette {
    bg: egui::Color32,
    fg: egui::Color32,
    header_bg: egui::Color32,
    border: egui::Color32,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: egui::Color32::from_rgb(0x0f, 0x11, 0x15),
                fg: egui::Color32::WHITE,
                header_bg: egui::Color32::from_rgb(0x16, 0x1a, 0x22),
                border: egui::Color32::from_rgb(0x33, 0x33, 0x33),
            },
            Theme::Light => Self {
                bg: egui::Color32::from_rgb(0xf2, 0xf2, 0xf2),
                fg: egui::Color32::BLACK,
                header_bg: egui::Color32::from_rgb(0xe4, 0xe4, 0xe4),
                border: egui::Color32::from_rgb(0xbb, 0xbb, 0xbb),
            },
        }
    }
}

const HEADER_HEIGHT: f32 = 32.0;
const RESIZE_HANDLE: f32 = 14.0;

/// egui front end for the bubble. Gathers widget and pointer events each
/// frame and applies them to the controller afterwards.
pub struct BubbleApp {
    controller: BubbleController,
    initial_text: Option<String>,
}

impl BubbleApp {
    pub fn new(mediator: Mediator, text: String) -> Self {
        Self {
            controller: BubbleController::new(mediator),
            initial_text: Some(text),
        }
    }

    fn draw_bubble(&mut self, ctx: &egui::Context, viewport: Viewport) {
        use egui::*;

        let Some(b) = self.controller.state() else { return };
        let pos = b.pos;
        let size = b.size;
        let full_screen = b.is_full_screen();
        let retranslating = b.retranslating;
        let font_size = b.font_size;
        let language = b.target_language.clone();
        let error = b.error.clone();
        let text = b.text.clone();
        let palette = Palette::for_theme(b.theme);
        let copy_glyph = self.controller.copy_glyph(Instant::now());

        let bubble_rect = Rect::from_min_size(
            pos2(pos.left, pos.top),
            vec2(size.width, size.height),
        );
        let hovered = ctx
            .pointer_hover_pos()
            .map_or(false, |p| bubble_rect.contains(p));

        let mut close = false;
        let mut copy = false;
        let mut clear = false;
        let mut theme_toggle = false;
        let mut font_plus = false;
        let mut font_minus = false;
        let mut full_screen_toggle = false;
        let mut picked_language: Option<String> = None;
        let mut drag_begin: Option<Point> = None;
        let mut drag_move: Option<Point> = None;
        let mut drag_end = false;
        let mut resize_begin: Option<Point> = None;
        let mut resize_move: Option<Point> = None;
        let mut resize_end = false;

        Area::new(Id::new("translator-bubble"))
            .order(Order::Foreground)
            .fixed_pos(bubble_rect.min)
            .show(ctx, |ui| {
                let painter = ui.painter().clone();
                painter.rect(
                    bubble_rect,
                    Rounding::same(10.0),
                    palette.bg,
                    Stroke::new(1.0, palette.border),
                );
                let header_rect =
                    Rect::from_min_size(bubble_rect.min, vec2(size.width, HEADER_HEIGHT));
                painter.rect_filled(
                    header_rect,
                    Rounding {
                        nw: 10.0,
                        ne: 10.0,
                        sw: 0.0,
                        se: 0.0,
                    },
                    palette.header_bg,
                );

                // Drag zone sits under the header controls; the widgets
                // added afterwards take pointer priority.
                let drag_resp = ui.interact(header_rect, ui.id().with("drag"), Sense::drag());
                if drag_resp.drag_started() {
                    drag_begin = drag_resp.interact_pointer_pos().map(to_point);
                }
                if drag_resp.dragged() {
                    drag_move = drag_resp.interact_pointer_pos().map(to_point);
                }
                if drag_resp.drag_stopped() {
                    drag_end = true;
                }

                ui.allocate_ui_at_rect(header_rect.shrink2(vec2(10.0, 4.0)), |ui| {
                    ui.horizontal_centered(|ui| {
                        ui.colored_label(palette.fg, RichText::new("Translator").strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button("✕").clicked() {
                                close = true;
                            }
                            if ui.button(copy_glyph).clicked() {
                                copy = true;
                            }
                            if ui.button("⛶").clicked() {
                                full_screen_toggle = true;
                            }
                            if hovered {
                                if ui.button("🌗").clicked() {
                                    theme_toggle = true;
                                }
                                if ui.button("🧹").clicked() {
                                    clear = true;
                                }
                                if ui.button("A+").clicked() {
                                    font_plus = true;
                                }
                                if ui.button("A−").clicked() {
                                    font_minus = true;
                                }
                            }
                            ComboBox::from_id_source("tb-language")
                                .selected_text(language_label(&language))
                                .width(96.0)
                                .show_ui(ui, |ui| {
                                    for (code, name) in LANGUAGES {
                                        if ui
                                            .selectable_label(language == *code, *name)
                                            .clicked()
                                        {
                                            picked_language = Some(code.to_string());
                                        }
                                    }
                                });
                        });
                    });
                });

                let content_rect = Rect::from_min_max(
                    pos2(bubble_rect.min.x, header_rect.max.y),
                    bubble_rect.max,
                );
                ui.allocate_ui_at_rect(content_rect.shrink(10.0), |ui| {
                    if let Some(err) = &error {
                        ui.colored_label(Color32::RED, err);
                    }
                    if retranslating {
                        ui.colored_label(palette.fg, "Translating…");
                    }
                    ScrollArea::vertical().show(ui, |ui| {
                        ui.label(
                            RichText::new(&text)
                                .color(palette.fg)
                                .size(font_size as f32),
                        );
                    });
                });

                if !full_screen {
                    let handle_rect = Rect::from_min_size(
                        bubble_rect.max - vec2(RESIZE_HANDLE + 2.0, RESIZE_HANDLE + 2.0),
                        vec2(RESIZE_HANDLE, RESIZE_HANDLE),
                    );
                    let resize_resp =
                        ui.interact(handle_rect, ui.id().with("resize"), Sense::drag());
                    if resize_resp.drag_started() {
                        resize_begin = resize_resp.interact_pointer_pos().map(to_point);
                    }
                    if resize_resp.dragged() {
                        resize_move = resize_resp.interact_pointer_pos().map(to_point);
                    }
                    if resize_resp.drag_stopped() {
                        resize_end = true;
                    }
                    if resize_resp.hovered() {
                        ctx.set_cursor_icon(CursorIcon::ResizeNwSe);
                    }
                    painter.line_segment(
                        [
                            handle_rect.left_bottom() + vec2(3.0, -1.0),
                            handle_rect.right_top() + vec2(-1.0, 3.0),
                        ],
                        Stroke::new(1.5, palette.border),
                    );
                    painter.line_segment(
                        [
                            handle_rect.left_bottom() + vec2(8.0, -1.0),
                            handle_rect.right_top() + vec2(-1.0, 8.0),
                        ],
                        Stroke::new(1.5, palette.border),
                    );
                }
            });

        if close {
            self.controller.close();
        }
        if clear {
            self.controller.clear_text();
        }
        if theme_toggle {
            self.controller.toggle_theme();
        }
        if font_plus {
            self.controller.increase_font();
        }
        if font_minus {
            self.controller.decrease_font();
        }
        if full_screen_toggle {
            self.controller.toggle_full_screen(viewport);
        }
        if copy {
            match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
                Ok(()) => {
                    self.controller.mark_copied(Instant::now());
                    ctx.request_repaint_after(COPY_FLASH);
                }
                Err(e) => tracing::warn!("clipboard write failed: {e}"),
            }
        }
        if let Some(code) = picked_language {
            self.controller.set_language(code);
        }
        if let Some(p) = drag_begin {
            self.controller.begin_drag(p);
        }
        if let Some(p) = drag_move {
            self.controller.drag_to(p, viewport);
        }
        if drag_end {
            self.controller.end_drag(viewport);
        }
        if let Some(p) = resize_begin {
            self.controller.begin_resize(p);
        }
        if let Some(p) = resize_move {
            self.controller.resize_to(p);
        }
        if resize_end {
            self.controller.end_resize();
        }
    }
}

fn to_point(p: egui::Pos2) -> Point {
    Point { x: p.x, y: p.y }
}

fn language_label(code: &str) -> String {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

impl eframe::App for BubbleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let screen = ctx.screen_rect();
        let viewport = Viewport {
            width: screen.width(),
            height: screen.height(),
        };

        if let Some(text) = self.initial_text.take() {
            self.controller.show(&text, viewport);
        }

        self.controller.poll();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.handle_escape();
        }

        if !self.controller.is_visible() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.draw_bubble(ctx, viewport);

        let waiting = self
            .controller
            .state()
            .map_or(false, |b| b.retranslating || b.copied_at.is_some());
        if waiting {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
