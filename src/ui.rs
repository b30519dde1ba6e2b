pub mod arena;
pub mod charting;
pub mod screen;

use std::rc::Rc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};
use tapr::{difficulty::Difficulty, game::Snapshot, session::ROUND_SECS};

use crate::App;
use arena::ArenaWidget;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Scoreboard, arena block, legend
fn round_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area)
}

fn arena_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Cells that make up the playable arena for a given terminal area
pub fn arena_rect(area: Rect) -> Rect {
    arena_block().inner(round_layout(area)[1])
}

fn format_accuracy(accuracy: Option<f64>) -> String {
    accuracy.map_or_else(|| "-".to_string(), |a| format!("{a:.1}%"))
}

fn format_reaction(avg: Option<f64>, spread: Option<f64>) -> String {
    match (avg, spread) {
        (Some(avg), Some(sd)) => format!("{avg:.0} ±{sd:.0} ms"),
        (Some(avg), None) => format!("{avg:.0} ms"),
        _ => "-".to_string(),
    }
}

pub fn render_round(app: &App, area: Rect, buf: &mut Buffer) {
    let view = &app.view;
    let chunks = round_layout(area);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let time_style = if view.time_left <= 5 {
        bold_style.fg(Color::Red)
    } else {
        bold_style
    };

    let scoreboard = Paragraph::new(Line::from(vec![
        Span::styled("score ", dim_style),
        Span::styled(view.score.to_string(), bold_style.fg(Color::Green)),
        Span::raw("   "),
        Span::styled("time ", dim_style),
        Span::styled(format!("{}s", view.time_left), time_style),
        Span::raw("   "),
        Span::styled("misses ", dim_style),
        Span::styled(view.misses.to_string(), bold_style.fg(Color::Red)),
        Span::raw("   "),
        Span::styled("acc ", dim_style),
        Span::styled(format_accuracy(view.accuracy), bold_style),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" tapr · {} ", view.difficulty)),
    );
    scoreboard.render(chunks[0], buf);

    let block = arena_block();
    let inner = block.inner(chunks[1]);
    block.render(chunks[1], buf);
    ArenaWidget::new(&view.live_targets).render(inner, buf);

    let legend = Paragraph::new(Span::styled(
        "(click) hit targets / (esc) end round / (ctrl+c) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    legend.render(chunks[2], buf);
}

fn difficulty_selector(selected: Difficulty) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, d) in Difficulty::ALL.into_iter().enumerate() {
        let label = format!(" {} {} ", idx + 1, d);
        if d == selected {
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
        }
        spans.push(Span::raw("  "));
    }
    spans.pop();
    Line::from(spans)
}

fn result_line(view: &Snapshot) -> String {
    format!(
        "last round ({}): {} hits  {} misses  {} acc  reaction {}",
        view.difficulty,
        view.score,
        view.misses,
        format_accuracy(view.accuracy),
        format_reaction(view.avg_reaction_ms, view.reaction_spread_ms),
    )
}

pub fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let view = &app.view;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let show_result = view.round > 0;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(2), // selector
            Constraint::Length(2), // profile
            Constraint::Length(1), // last result
            Constraint::Min(0),    // reaction chart
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "tapr: hit the targets before they vanish",
        bold_style.fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(difficulty_selector(app.selected))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let profile = app.selected.profile();
    Paragraph::new(Span::styled(
        format!(
            "{}s round · a target every {:.1}s · each lasts {:.1}s",
            ROUND_SECS,
            profile.spawn_interval_ms as f64 / 1000.0,
            profile.target_lifetime_ms as f64 / 1000.0,
        ),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    if show_result {
        Paragraph::new(Span::styled(result_line(view), bold_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let reactions = app.game.reactions();
        if !reactions.is_empty() && chunks[4].height >= 5 {
            render_reaction_chart(app, chunks[4], buf);
        }
    }

    Paragraph::new(Span::styled(
        "(enter) start / (1-3, ←→) difficulty / (q) quit",
        italic_style,
    ))
    .render(chunks[5], buf);
}

fn render_reaction_chart(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let (overall_duration, ceiling) =
        charting::compute_chart_params(app.game.reactions(), ROUND_SECS as f64);

    let tuples: Vec<(f64, f64)> = app.game.reactions().iter().copied().map(Into::into).collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Scatter)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .bounds([0.0, ceiling])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(ceiling), bold_style),
                ]),
        );

    chart.render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapr::config::Config;

    fn rendered(app: &App, playing: bool) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        if playing {
            render_round(app, area, &mut buffer);
        } else {
            render_menu(app, area, &mut buffer);
        }
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn app() -> App {
        App::new(&Config {
            seed: Some(3),
            ..Config::default()
        })
    }

    #[test]
    fn menu_shows_selector_and_hides_result_before_first_round() {
        let app = app();
        let content = rendered(&app, false);
        assert!(content.contains("1 easy"));
        assert!(content.contains("2 medium"));
        assert!(content.contains("3 hard"));
        assert!(!content.contains("last round"));
    }

    #[test]
    fn round_screen_shows_scoreboard() {
        let mut app = app();
        app.resize(Rect::new(0, 0, 80, 24));
        app.game.start_round(app.selected);
        app.sync();
        let content = rendered(&app, true);
        assert!(content.contains("score"));
        assert!(content.contains("30s"));
        assert!(content.contains("misses"));
    }

    #[test]
    fn menu_shows_last_result_after_a_round() {
        let mut app = app();
        app.game.start_round(Difficulty::Hard);
        app.game.advance(30_000);
        app.sync();
        let content = rendered(&app, false);
        assert!(content.contains("last round (hard)"));
        assert!(content.contains("reaction -"));
    }

    #[test]
    fn result_line_shows_reaction_mean_and_spread() {
        let mut app = app();
        app.game.start_round(Difficulty::Hard);
        app.game.advance_to(900);
        let first = app.game.targets()[0].id;
        app.game.hit_target(first);
        app.game.advance_to(1800);
        let second = app.game.targets()[0].id;
        app.game.hit_target(second);
        app.game.advance_to(30_000);
        app.sync();
        let content = rendered(&app, false);
        assert!(content.contains("2 hits"));
        assert!(content.contains("reaction 150 ±50 ms"));
    }

    #[test]
    fn arena_rect_sits_inside_the_round_layout() {
        let area = Rect::new(0, 0, 80, 24);
        let arena = arena_rect(area);
        assert_eq!(arena.x, HORIZONTAL_MARGIN + 1);
        assert_eq!(arena.y, 4);
        assert_eq!(arena.width, 80 - 2 * HORIZONTAL_MARGIN - 2);
        assert_eq!(arena.height, 24 - 3 - 1 - 2);
    }
}
