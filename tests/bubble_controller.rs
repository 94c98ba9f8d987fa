use std::time::{Duration, Instant};

use tempfile::TempDir;
use translator_bubble::bubble::{BubbleController, Gesture};
use translator_bubble::geometry::{Point, Viewport};
use translator_bubble::service::Mediator;
use translator_bubble::settings::{BubbleSettings, Theme};

const VIEWPORT: Viewport = Viewport {
    width: 1920.0,
    height: 1080.0,
};

/// Controller backed by a fresh settings file and an endpoint nothing
/// listens on, so no test ever reaches the network successfully.
fn controller(dir: &TempDir) -> (BubbleController, String) {
    let path = dir
        .path()
        .join("bubble_settings.json")
        .to_str()
        .unwrap()
        .to_string();
    let mediator = Mediator::spawn_with_endpoint(path.clone(), "http://127.0.0.1:9/translate");
    (BubbleController::new(mediator), path)
}

#[test]
fn first_show_uses_clamped_defaults() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);

    c.show("Hello", VIEWPORT);
    let b = c.state().unwrap();
    assert_eq!((b.pos.left, b.pos.top), (80.0, 80.0));
    assert_eq!((b.size.width, b.size.height), (320.0, 180.0));
    assert_eq!(b.font_size, 14);
    assert_eq!(b.theme, Theme::Dark);
    assert_eq!(b.text, "Hello");
}

#[test]
fn second_show_replaces_only_the_text() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);

    c.show("first", VIEWPORT);
    c.begin_drag(Point { x: 100.0, y: 100.0 });
    c.drag_to(Point { x: 500.0, y: 400.0 }, VIEWPORT);
    c.end_drag(VIEWPORT);
    let before = {
        let b = c.state().unwrap();
        (b.pos, b.size, b.theme, b.font_size)
    };

    c.show("second", VIEWPORT);
    let b = c.state().unwrap();
    assert_eq!(b.text, "second");
    assert_eq!((b.pos, b.size, b.theme, b.font_size), before);
}

#[test]
fn stored_geometry_is_clamped_on_show() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    BubbleSettings {
        left: 5000.0,
        top: -50.0,
        ..BubbleSettings::default()
    }
    .save(&path)
    .unwrap();

    c.show("hi", VIEWPORT);
    let b = c.state().unwrap();
    assert_eq!(b.pos.left, 1920.0 - 320.0 - 10.0);
    assert_eq!(b.pos.top, 40.0);
}

#[test]
fn font_increase_clamps_at_the_maximum() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);
    c.show("hi", VIEWPORT);

    let mut seen = Vec::new();
    for _ in 0..5 {
        c.increase_font();
        seen.push(c.state().unwrap().font_size);
    }
    assert_eq!(seen, vec![16, 18, 20, 20, 20]);
}

#[test]
fn font_decrease_clamps_at_the_minimum() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);
    c.show("hi", VIEWPORT);

    for _ in 0..5 {
        c.decrease_font();
    }
    assert_eq!(c.state().unwrap().font_size, 12);
}

#[test]
fn drag_release_snaps_to_the_left_margin() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    c.show("hi", VIEWPORT);

    // Grab the header at its top-left corner and drag towards the edge.
    c.begin_drag(Point { x: 80.0, y: 80.0 });
    c.drag_to(Point { x: 15.0, y: 300.0 }, VIEWPORT);
    assert_eq!(c.state().unwrap().pos.left, 15.0);
    c.end_drag(VIEWPORT);

    let b = c.state().unwrap();
    assert_eq!(b.pos.left, 10.0);
    assert_eq!(b.gesture, Gesture::Idle);

    // Release persisted the full merged record.
    let stored = BubbleSettings::load(&path).unwrap();
    assert_eq!(stored.left, 10.0);
    assert_eq!(stored.top, 300.0);
    assert_eq!(stored.width, 320.0);
    assert_eq!(stored.font_size, 14);
}

#[test]
fn resize_is_floored_and_persisted_on_release() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    c.show("hi", VIEWPORT);

    c.begin_resize(Point { x: 400.0, y: 260.0 });
    c.resize_to(Point { x: 0.0, y: 0.0 });
    let b = c.state().unwrap();
    assert_eq!((b.size.width, b.size.height), (200.0, 100.0));
    c.end_resize();

    let stored = BubbleSettings::load(&path).unwrap();
    assert_eq!((stored.width, stored.height), (200.0, 100.0));
}

#[test]
fn drag_and_resize_cannot_run_at_once() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);
    c.show("hi", VIEWPORT);

    c.begin_drag(Point { x: 100.0, y: 100.0 });
    c.begin_resize(Point { x: 400.0, y: 260.0 });
    assert!(matches!(c.state().unwrap().gesture, Gesture::Dragging { .. }));

    // A resize motion during the drag changes nothing.
    c.resize_to(Point { x: 900.0, y: 900.0 });
    assert_eq!(c.state().unwrap().size.width, 320.0);
}

#[test]
fn full_screen_fills_the_viewport_and_restores() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);
    c.show("hi", VIEWPORT);

    c.toggle_full_screen(VIEWPORT);
    let b = c.state().unwrap();
    assert!(b.is_full_screen());
    assert_eq!((b.pos.left, b.pos.top), (0.0, 0.0));
    assert_eq!((b.size.width, b.size.height), (1920.0, 1080.0));

    // Gestures are ignored while full screen.
    c.begin_drag(Point { x: 10.0, y: 10.0 });
    assert_eq!(c.state().unwrap().gesture, Gesture::Idle);

    c.toggle_full_screen(VIEWPORT);
    let b = c.state().unwrap();
    assert!(!b.is_full_screen());
    assert_eq!((b.pos.left, b.pos.top), (80.0, 80.0));
    assert_eq!((b.size.width, b.size.height), (320.0, 180.0));
}

#[test]
fn full_screen_geometry_is_never_persisted() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    c.show("hi", VIEWPORT);

    c.toggle_full_screen(VIEWPORT);
    // Toggling the theme while full screen saves the stashed geometry.
    c.toggle_theme();

    let stored = BubbleSettings::load(&path).unwrap();
    assert_eq!(stored.theme, Theme::Light);
    assert_eq!((stored.width, stored.height), (320.0, 180.0));
    assert_eq!((stored.left, stored.top), (80.0, 80.0));
}

#[test]
fn escape_leaves_full_screen_before_closing() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);
    c.show("hi", VIEWPORT);

    c.toggle_full_screen(VIEWPORT);
    c.handle_escape();
    assert!(c.is_visible());
    assert!(!c.state().unwrap().is_full_screen());

    c.handle_escape();
    assert!(!c.is_visible());
}

#[test]
fn clear_empties_the_text_without_saving() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    c.show("hi", VIEWPORT);

    c.clear_text();
    assert_eq!(c.state().unwrap().text, "");
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn copy_glyph_reverts_after_the_flash_window() {
    let dir = TempDir::new().unwrap();
    let (mut c, _) = controller(&dir);
    c.show("hi", VIEWPORT);

    let now = Instant::now();
    assert_eq!(c.copy_glyph(now), "📋");
    c.mark_copied(now);
    assert_eq!(c.copy_glyph(now + Duration::from_millis(500)), "✔");
    assert_eq!(c.copy_glyph(now + Duration::from_millis(900)), "📋");
}

#[test]
fn language_change_persists_and_surfaces_a_retranslate_failure() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    c.show("Hola", VIEWPORT);

    c.set_language("fr".into());
    assert!(c.state().unwrap().retranslating);
    assert_eq!(BubbleSettings::load(&path).unwrap().target_language, "fr");

    // The endpoint is unreachable, so the round trip ends in the banner.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        c.poll();
        let b = c.state().unwrap();
        if b.error.is_some() {
            assert!(!b.retranslating);
            assert_eq!(b.text, "Hola");
            break;
        }
        assert!(Instant::now() < deadline, "no retranslate outcome arrived");
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn unchanged_language_does_not_retranslate() {
    let dir = TempDir::new().unwrap();
    let (mut c, path) = controller(&dir);
    c.show("hi", VIEWPORT);

    let lang = c.state().unwrap().target_language.clone();
    c.set_language(lang);
    assert!(!c.state().unwrap().retranslating);
    assert!(!std::path::Path::new(&path).exists());
}
