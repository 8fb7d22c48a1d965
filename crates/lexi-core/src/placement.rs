use lexi_config::popup::PopupConfig;
use lexi_types::{Placement, PopupSide, Rect, Viewport};

/// Position a popup next to `anchor`, inside the viewport
///
/// Centred horizontally on the anchor; below it unless there is not enough
/// room below and more room above.
pub fn place_popup(anchor: Rect, viewport: Viewport, config: &PopupConfig) -> Placement {
    let half = config.width / 2.0;
    let mut center = anchor.center_x();
    if center - half < config.margin {
        center = half + config.margin;
    } else if center + half > viewport.width - config.margin {
        center = viewport.width - half - config.margin;
    }

    let space_below = viewport.height - anchor.bottom() - config.gap - config.margin;
    let space_above = anchor.top() - config.gap - config.margin;

    let (top, side) = if space_below < config.max_height && space_above > space_below {
        (
            (anchor.top() - config.max_height - config.gap).max(config.margin),
            PopupSide::Above,
        )
    } else {
        (
            (anchor.bottom() + config.gap)
                .min(viewport.height - config.max_height - config.margin),
            PopupSide::Below,
        )
    };

    Placement {
        left: center - half,
        top: top.max(config.margin),
        width: config.width,
        side,
    }
}
