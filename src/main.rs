use eframe::egui;

use translator_bubble::bubble::BubbleApp;
use translator_bubble::logging;
use translator_bubble::service::Mediator;
use translator_bubble::settings::SETTINGS_FILE;
use translator_bubble::translate;

fn main() -> anyhow::Result<()> {
    logging::init(
        std::env::var("TB_DEBUG").is_ok(),
        std::env::var("TB_LOG_FILE").ok().map(Into::into),
    );

    // The "selection": first CLI argument, or whatever is on the clipboard.
    let Some(text) = selection_text()? else {
        tracing::debug!("empty selection; nothing to translate");
        return Ok(());
    };

    let mediator = Mediator::spawn(SETTINGS_FILE);
    let stored = mediator.get_settings();

    let translated = match translate::translate(&text, &stored.target_language) {
        Ok(t) => t,
        Err(e) => {
            mediator.notify_error(e.to_string());
            return Ok(());
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 700.0])
            .with_always_on_top(),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        "Translator",
        native_options,
        Box::new(move |_cc| Box::new(BubbleApp::new(mediator, translated))),
    ) {
        tracing::error!("ui error: {e}");
    }
    Ok(())
}

/// Selected text to translate, trimmed. `None` for a whitespace-only
/// selection, which aborts silently before any network call.
fn selection_text() -> anyhow::Result<Option<String>> {
    let raw = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => arboard::Clipboard::new()?.get_text().unwrap_or_default(),
    };
    Ok(translate::normalize_selection(&raw))
}
