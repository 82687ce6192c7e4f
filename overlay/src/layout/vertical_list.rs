//! Vertical list layout: one row per marker group, nearest first.
//!
//! Each row starts with the countdown to the group, followed by the group's
//! action icons and then any text labels. Icons that do not fit collapse into
//! a trailing `+N` counter.

use cadence_types::formatting::format_countdown;

use super::{LayoutContext, LayoutFrame, TextAlign};

/// Width of the countdown column in font-size units
const TIME_COLUMN_EMS: f32 = 3.5;

pub(crate) fn layout(ctx: &LayoutContext<'_>, frame: &mut LayoutFrame) {
    let m = ctx.metrics;
    let width = ctx.viewport.width;
    let row_height = m.icon + m.gap;

    let top = m.padding + m.font + m.gap;
    let fit_rows = ((ctx.viewport.height - top - m.padding + m.gap) / row_height).floor();
    let max_rows = (fit_rows.max(0.0) as usize).min(usize::from(ctx.config.max_list_rows));

    let icons_x = m.padding + m.font * TIME_COLUMN_EMS;
    let capacity = (((width - icons_x - m.padding + m.gap) / row_height).floor().max(1.0)) as usize;

    for (row, group) in ctx.groups().iter().take(max_rows).enumerate() {
        let center_y = top + row as f32 * row_height + m.icon / 2.0;
        let baseline = center_y + m.font / 3.0;

        let remaining = group.anchor_secs - ctx.view.current_time;
        frame.texts.push(ctx.text(
            format_countdown(remaining, "Now", ctx.european()),
            m.padding,
            baseline,
            TextAlign::Left,
        ));

        let actions: Vec<_> = group.markers.iter().filter(|mk| mk.is_action()).collect();
        let overflow = actions.len() > capacity;
        let shown = if overflow { capacity - 1 } else { actions.len() };

        let mut x = icons_x;
        for marker in actions.iter().take(shown) {
            if let Some(placed) = ctx.place_action(marker, x + m.icon / 2.0, center_y) {
                frame.markers.push(placed);
            }
            x += row_height;
        }
        if overflow {
            let hidden = actions.len() - shown;
            frame.texts.push(ctx.text(
                format!("+{}", hidden),
                x + m.icon / 2.0,
                baseline,
                TextAlign::Center,
            ));
            x += row_height;
        }

        let labels: Vec<&str> = group.markers.iter().filter_map(|mk| mk.label()).collect();
        if !labels.is_empty() {
            frame
                .texts
                .push(ctx.text(labels.join(" / "), x, baseline, TextAlign::Left));
        }
    }
}
