use kanal::{AsyncReceiver, AsyncSender};
use lexi_types::{
    AppEvent, ClickTarget, HostEvent, Key, NodeId, PageEdit, Rect, StorageChange, Viewport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Console hosts have no layout; markers are laid out one per line
pub fn marker_anchor(ordinal: usize) -> Rect {
    Rect::new(40.0, 60.0 + 24.0 * ordinal as f32, 120.0, 20.0)
}

/// Translate one console line into an app event
pub fn parse_command(line: &str) -> Result<Option<AppEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(command) = line.strip_prefix(':') else {
        return Ok(Some(AppEvent::Host(HostEvent::Edit(PageEdit::AppendElement {
            parent: None,
            tag: "p".into(),
            attributes: Vec::new(),
            text: line.to_string(),
        }))));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));

    let event = match name {
        "on" => AppEvent::SetClueMode(true),
        "off" => AppEvent::SetClueMode(false),
        "click" => {
            let ordinal: usize = rest
                .parse()
                .map_err(|_| format!("usage: :click N (got '{rest}')"))?;
            AppEvent::Host(HostEvent::ClickMarker {
                ordinal,
                anchor: marker_anchor(ordinal),
            })
        }
        // Click on the body, outside any marker
        "away" => AppEvent::Host(HostEvent::Click {
            target: ClickTarget::Page(NodeId(0)),
            anchor: Rect::default(),
        }),
        "esc" => AppEvent::Host(HostEvent::KeyDown(Key::Escape)),
        "scroll" => AppEvent::Host(HostEvent::Scroll),
        "pin" => AppEvent::Host(HostEvent::TogglePin),
        "resize" => {
            let mut dims = rest.split_whitespace().map(str::parse::<f32>);
            match (dims.next(), dims.next()) {
                (Some(Ok(width)), Some(Ok(height))) => {
                    AppEvent::Host(HostEvent::Resize(Viewport { width, height }))
                }
                _ => return Err("usage: :resize WIDTH HEIGHT".into()),
            }
        }
        "add" if !rest.is_empty() => AppEvent::AddToVocabulary(rest.to_string()),
        "remove" if !rest.is_empty() => AppEvent::RemoveFromVocabulary(rest.to_string()),
        "add" | "remove" => return Err(format!("usage: :{name} WORD")),
        "clear" => AppEvent::ClearVocabulary,
        "quit" => AppEvent::Shutdown,
        other => return Err(format!("unknown command ':{other}'")),
    };
    Ok(Some(event))
}

/// Read commands and page text from stdin
pub async fn console_io(
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Console host ready");

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::info!("Console input closed");
            event_tx.send(AppEvent::Shutdown).await?;
            break;
        };

        match parse_command(&line) {
            Ok(Some(event)) => event_tx.send(event).await?,
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }

    Ok(())
}

/// Forward store notifications into the event loop
pub async fn storage_io(
    cancel: CancellationToken,
    changes: AsyncReceiver<StorageChange>,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            change = changes.recv() => {
                let Ok(change) = change else {
                    tracing::warn!("Store notifications closed");
                    break;
                };
                tracing::debug!("Store key '{}' changed", change.key);
                event_tx.send(AppEvent::StorageChanged(change)).await?;
            }
        }
    }
    Ok(())
}
