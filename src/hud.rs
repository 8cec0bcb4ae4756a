use crate::config::Settings;
use crate::model::PlantState;
use crate::sim::{current_rate, eta, Eta};
use crate::stages::{remaining_growth, stage_index, stage_name, stage_progress, STAGES};
use crate::term::{Cell, CellBuffer, BG};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use crossterm::style::Color;

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg: BG });
    }
}

pub(crate) fn bar(value01: f64, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f64 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

pub(crate) fn format_duration(d: ChronoDuration) -> String {
    let secs = d.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h >= 24 {
        format!("{}d {}h", h / 24, h % 24)
    } else if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

pub(crate) fn describe_eta(e: Eta) -> String {
    match e {
        Eta::Maxed => "fully grown".to_string(),
        Eta::NeedsCare => "stalled, needs care".to_string(),
        Eta::Remaining(d) => format_duration(d),
    }
}

/// Status lines shared by the side panel and `--snapshot`.
pub(crate) fn status_lines(
    plant: &PlantState,
    now: DateTime<Utc>,
    settings: &Settings,
) -> Vec<String> {
    let stage = stage_index(plant.growth);
    let rate = current_rate(plant, now);
    let wall_eta = eta(plant, now).wall_clock(settings.time_scale());

    let mut lines = vec![
        format!("Stage   {}/{} {}", stage + 1, STAGES.len(), stage_name(stage)),
        format!(
            "Growth  {} {:>6.1}",
            bar(stage_progress(plant.growth), 12),
            plant.growth
        ),
        format!("Water   {} {:>6.1}", bar(plant.hydration / 100.0, 12), plant.hydration),
        format!("Health  {} {:>6.1}", bar(plant.health / 100.0, 12), plant.health),
        format!("Rate    {rate:.2} pts/h"),
        format!("Next    {}", describe_eta(wall_eta)),
    ];

    if let Some(left) = remaining_growth(plant.growth) {
        lines.push(format!("To go   {left:.1} pts"));
    }

    if plant.boost_active(now) {
        lines.push(format!(
            "Sun     boosted, {} left",
            format_duration(plant.sunlight_boost_until - now)
        ));
    } else {
        lines.push("Sun     -".to_string());
    }
    if settings.fast_mode {
        lines.push(format!("Time    fast x{:.0}", settings.time_scale()));
    } else {
        lines.push("Time    real".to_string());
    }
    lines
}

pub(crate) const KEY_LEGEND: &str =
    "w water | s sun | r reset | t text/pixel | f fast | h help | q quit";

pub(crate) fn draw_status_panel(
    buf: &mut CellBuffer,
    plant: &PlantState,
    now: DateTime<Utc>,
    settings: &Settings,
) {
    draw_text(buf, 1, 0, "Sprout", Color::Green);
    for (i, line) in status_lines(plant, now, settings).iter().enumerate() {
        let fg = if line.contains("needs care") {
            Color::Yellow
        } else {
            Color::White
        };
        draw_text(buf, 1, 2 + i as u16, line, fg);
    }
    draw_text(buf, 1, buf.h.saturating_sub(1), KEY_LEGEND, Color::DarkGrey);
}

pub(crate) const HELP_TEXT: &str = "Keep your plant watered and healthy so it grows.\n\
Water drains steadily; health drifts toward how wet the soil is.\n\n\
W Water: +25 water, +4 health.\n\
S Sunlight: +2 health and 35% faster growth for 30 minutes.\n\
R Reset: start over with a new seed.\n\
T Toggle pixel art / ASCII.\n\
F Toggle fast mode (one simulated hour per real minute).\n\n\
Esc or H to close help.";

fn border(buf: &mut CellBuffer, x: u16, y: u16, ch: char) {
    buf.set(
        x,
        y,
        Cell {
            ch,
            fg: Color::White,
            bg: BG,
        },
    );
}

pub(crate) fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let w = buf.w;
    let h = buf.h;

    let bw = w.saturating_sub(4).min(64);
    let bh = h.saturating_sub(4).min(16);
    if bw < 4 || bh < 4 {
        return;
    }

    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            buf.set(x, y, Cell::default());
        }
    }
    for x in x0..x0 + bw {
        border(buf, x, y0, '─');
        border(buf, x, y0 + bh - 1, '─');
    }
    for y in y0..y0 + bh {
        border(buf, x0, y, '│');
        border(buf, x0 + bw - 1, y, '│');
    }
    border(buf, x0, y0, '┌');
    border(buf, x0 + bw - 1, y0, '┐');
    border(buf, x0, y0 + bh - 1, '└');
    border(buf, x0 + bw - 1, y0 + bh - 1, '┘');

    draw_text(buf, x0 + 2, y0 + 1, title, Color::White);

    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        let clipped: String = line.chars().take((bw - 4) as usize).collect();
        draw_text(buf, x0 + 2, yy, &clipped, Color::White);
        yy += 1;
    }
}
