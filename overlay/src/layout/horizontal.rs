//! Horizontal layout: markers scroll right to left toward a vertical
//! judgement line near the left edge. Group members spread vertically.

use super::lanes::assign_lanes;
use super::{DurationBand, JudgementLine, LayoutContext, LayoutFrame, TextAlign};

pub(crate) fn layout(ctx: &LayoutContext<'_>, frame: &mut LayoutFrame, hide_markers: bool) {
    let m = ctx.metrics;
    let width = ctx.viewport.width;
    let height = ctx.viewport.height;

    let top = m.padding + m.font + m.gap;
    let bottom = (height - m.padding).max(top + m.icon);
    let line_x = m.padding + m.icon;
    let right = (width - m.padding - m.icon / 2.0).max(line_x + 1.0);
    let px_per_sec = (right - line_x) / ctx.look_ahead;
    let center_y = (top + bottom) / 2.0;
    let spacing = m.icon + m.gap;

    frame.judgement_line = Some(JudgementLine {
        x0: line_x,
        y0: top,
        x1: line_x,
        y1: bottom,
        thickness: m.line,
        color: ctx.config.judgement_line_color,
    });

    if hide_markers {
        return;
    }

    let x_at = |time_until: f32| line_x + time_until * px_per_sec;
    let band_right = width - m.padding;

    // Bands already crossing the line sit on the center lane
    for marker in &ctx.view.active_bands {
        let Some(action) = marker.as_action() else {
            continue;
        };
        let x1 = x_at(marker.end_secs() - ctx.view.current_time).min(band_right);
        if x1 > line_x {
            frame.bands.push(DurationBand {
                x: line_x,
                y: center_y - m.band / 2.0,
                width: x1 - line_x,
                height: m.band,
                color: action.duration_color,
            });
        }
    }

    let max_lanes = (((bottom - top) / spacing).floor() as usize).max(1);
    let min_gap_secs = spacing / px_per_sec.max(f32::EPSILON);
    let groups = ctx.groups();

    for (marker, slot) in assign_lanes(&groups, max_lanes, min_gap_secs) {
        let x = x_at(ctx.time_until(marker));
        let y = center_y + slot as f32 * spacing;

        match ctx.place_action(marker, x, y) {
            Some(placed) => {
                let duration = marker.duration_secs();
                if duration > 0.0
                    && let Some(action) = marker.as_action()
                {
                    let x1 = (x + duration * px_per_sec).min(band_right);
                    frame.bands.push(DurationBand {
                        x,
                        y: y - m.band / 2.0,
                        width: (x1 - x).max(0.0),
                        height: m.band,
                        color: action.duration_color,
                    });
                }
                if let Some(caption) = ctx.caption(marker) {
                    frame.texts.push(ctx.text(
                        caption,
                        x,
                        y + m.icon / 2.0 + m.font,
                        TextAlign::Center,
                    ));
                }
                frame.markers.push(placed);
            }
            None => {
                if let Some(label) = marker.label() {
                    frame
                        .texts
                        .push(ctx.text(label, x, y + m.font / 3.0, TextAlign::Center));
                }
            }
        }
    }
}
