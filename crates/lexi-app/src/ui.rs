use kanal::AsyncReceiver;
use lexi_types::{PopupSide, PopupView, UiEvent};
use tokio_util::sync::CancellationToken;

/// Plain-text rendering of the definition popup
pub fn render_popup(view: &PopupView) -> String {
    let entry = &view.entry;
    let mut out = String::new();

    let side = match view.placement.side {
        PopupSide::Below => "below",
        PopupSide::Above => "above",
    };
    out.push_str(&format!(
        "┌ {} ({side} marker at {:.0},{:.0}{})\n",
        entry.lemma,
        view.placement.left,
        view.placement.top,
        if view.pinned { ", pinned" } else { "" }
    ));
    if !entry.phonetic.is_empty() {
        out.push_str(&format!("│ {}\n", entry.phonetic));
    }
    if view.key != entry.lemma {
        out.push_str(&format!("│ form of '{}': {}\n", entry.lemma, view.key));
    }
    if !entry.definition_primary.is_empty() {
        out.push_str(&format!("│ {}\n", entry.definition_primary));
    }
    if !entry.definition_secondary.is_empty() {
        out.push_str(&format!("│ {}\n", entry.definition_secondary));
    }
    for example in &entry.example_sentences {
        out.push_str(&format!("│ • {}\n", example.primary));
        if !example.secondary.is_empty() {
            out.push_str(&format!("│   {}\n", example.secondary));
        }
    }
    out.push('└');
    out
}

pub async fn ui_loop(
    cancel: CancellationToken,
    app_to_ui_rx: AsyncReceiver<UiEvent>,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => event?,
        };

        match event {
            UiEvent::ShowPopup(view) => println!("{}", render_popup(&view)),
            UiEvent::HidePopup => println!("(popup closed)"),
            UiEvent::Highlights { markers, snapshot } => {
                println!("--- page ({markers} highlighted) ---");
                print!("{snapshot}");
                if !snapshot.ends_with('\n') {
                    println!();
                }
                println!("---");
            }
            UiEvent::Status(message) => println!("» {message}"),
        }
    }
    Ok(())
}
