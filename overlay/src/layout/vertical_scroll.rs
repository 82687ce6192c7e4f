//! Vertical scroll layout: markers fall from the top toward a horizontal
//! judgement line near the bottom edge. Group members spread horizontally.

use super::lanes::assign_lanes;
use super::{DurationBand, JudgementLine, LayoutContext, LayoutFrame, TextAlign};

pub(crate) fn layout(ctx: &LayoutContext<'_>, frame: &mut LayoutFrame, hide_markers: bool) {
    let m = ctx.metrics;
    let width = ctx.viewport.width;
    let height = ctx.viewport.height;

    let top = m.padding + m.font + m.gap + m.icon / 2.0;
    let line_y = (height - m.padding - m.icon / 2.0).max(top + 1.0);
    let px_per_sec = (line_y - top) / ctx.look_ahead;
    let center_x = width / 2.0;
    let spacing = m.icon + m.gap;

    frame.judgement_line = Some(JudgementLine {
        x0: m.padding,
        y0: line_y,
        x1: width - m.padding,
        y1: line_y,
        thickness: m.line,
        color: ctx.config.judgement_line_color,
    });

    if hide_markers {
        return;
    }

    let y_at = |time_until: f32| line_y - time_until * px_per_sec;
    let band_top = m.padding + m.font + m.gap;

    for marker in &ctx.view.active_bands {
        let Some(action) = marker.as_action() else {
            continue;
        };
        let y1 = y_at(marker.end_secs() - ctx.view.current_time).max(band_top);
        if y1 < line_y {
            frame.bands.push(DurationBand {
                x: center_x - m.band / 2.0,
                y: y1,
                width: m.band,
                height: line_y - y1,
                color: action.duration_color,
            });
        }
    }

    let usable = (width - 2.0 * m.padding).max(m.icon);
    let max_lanes = ((usable / spacing).floor() as usize).max(1);
    let min_gap_secs = spacing / px_per_sec.max(f32::EPSILON);
    let groups = ctx.groups();

    for (marker, slot) in assign_lanes(&groups, max_lanes, min_gap_secs) {
        let x = center_x + slot as f32 * spacing;
        let y = y_at(ctx.time_until(marker));

        match ctx.place_action(marker, x, y) {
            Some(placed) => {
                let duration = marker.duration_secs();
                if duration > 0.0
                    && let Some(action) = marker.as_action()
                {
                    let y1 = (y - duration * px_per_sec).max(band_top);
                    frame.bands.push(DurationBand {
                        x: x - m.band / 2.0,
                        y: y1,
                        width: m.band,
                        height: (y - y1).max(0.0),
                        color: action.duration_color,
                    });
                }
                if let Some(caption) = ctx.caption(marker) {
                    frame.texts.push(ctx.text(
                        caption,
                        x + m.icon / 2.0 + m.gap,
                        y + m.font / 3.0,
                        TextAlign::Left,
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
