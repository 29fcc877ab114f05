//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::state::{AddField, App, AppMode, ConfirmAction};
use crate::models::Entry;
use crate::projection::Summary;
use components::{render_dialog_framework, render_input_widget};
use layouts::centered_rect;

/// 渲染 UI
pub fn render<S, G>(frame: &mut Frame, app: &App<S, G>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Length(3), // 搜索
            Constraint::Min(5),    // 清单
            Constraint::Length(3), // 统计
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_list(frame, app, chunks[2]);
    render_summary(frame, app, chunks[3]);
    render_help(frame, app, chunks[4]);

    // 渲染弹窗
    match &app.mode {
        AppMode::Adding(field) => render_add_dialog(frame, app, *field),
        AppMode::Confirm(action) => render_confirm_dialog(frame, app, action),
        AppMode::Normal | AppMode::Searching => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("🛒 购物清单")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_search<S, G>(frame: &mut Frame, app: &App<S, G>, area: Rect) {
    let active = app.mode == AppMode::Searching;
    let text = if app.search.is_empty() && !active {
        "按 '/' 搜索".to_string()
    } else {
        app.search.clone()
    };
    render_input_widget(frame, area, "🔍 搜索", &text, active, Color::Yellow);
}

fn entry_line(entry: &Entry, selected: bool) -> Line<'static> {
    let mut base = if entry.purchased {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };
    if selected {
        base = base.fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }

    let mut spans = vec![
        Span::styled(entry.name.clone(), base.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" ({}) [{}]", entry.quantity, entry.category), base),
    ];
    if entry.urgent {
        spans.push(Span::styled(" 🔥 紧急", Style::default().fg(Color::Red)));
    }
    if entry.favorite {
        spans.push(Span::raw(" ⭐"));
    }
    Line::from(spans)
}

fn render_list<S, G>(frame: &mut Frame, app: &App<S, G>, area: Rect) {
    let items: Vec<ListItem> = app
        .display_list
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            app.store
                .items()
                .get(*id)
                .map(|entry| ListItem::new(entry_line(entry, i == app.selected_index)))
        })
        .collect();

    let title = if app.search.is_empty() {
        "清单".to_string()
    } else {
        format!("清单（{} 条匹配）", app.display_list.len())
    };

    if items.is_empty() {
        let hint = if app.store.items().is_empty() {
            "清单为空，按 'a' 添加第一个条目"
        } else {
            "没有匹配的条目"
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let list_widget = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list_widget, area, &mut state);
}

fn render_summary<S, G>(frame: &mut Frame, app: &App<S, G>, area: Rect) {
    let summary = Summary::of(app.store.items());
    let text = format!(
        "总计: {}  已购买: {}  待购买: {}  收藏: {}",
        summary.total, summary.purchased, summary.pending, summary.favorites
    );
    let widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Green))
        .block(Block::default().title("统计").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_help<S, G>(frame: &mut Frame, app: &App<S, G>, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[a] 添加  [space] 已购买  [f] 收藏  [d] 删除  [C] 清空  [/] 搜索  [j/k] 导航  [q] 退出"
        }
        AppMode::Adding(_) => "[Tab] 切换字段  [←/→] 分类  [space] 紧急  [Enter] 添加  [Esc] 关闭",
        AppMode::Searching => "输入关键字  [Enter] 保留过滤  [Esc] 清除",
        AppMode::Confirm(_) => "[y] 确认  [n] 取消",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_add_dialog<S, G>(frame: &mut Frame, app: &App<S, G>, field: AddField) {
    let area = centered_rect(60, 60, frame.area());
    let inner = render_dialog_framework(frame, area, "添加条目");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let draft = &app.draft;
    render_input_widget(
        frame,
        chunks[0],
        "名称",
        &draft.name,
        field == AddField::Name,
        Color::Yellow,
    );
    render_input_widget(
        frame,
        chunks[1],
        "数量",
        &draft.quantity,
        field == AddField::Quantity,
        Color::Yellow,
    );
    render_input_widget(
        frame,
        chunks[2],
        "分类",
        &format!("◀ {} ▶", draft.category),
        field == AddField::Category,
        Color::Yellow,
    );
    render_input_widget(
        frame,
        chunks[3],
        "紧急",
        if draft.urgent { "[x] 🔥" } else { "[ ]" },
        field == AddField::Urgent,
        Color::Yellow,
    );

    let hint = match field {
        AddField::Name => "输入名称",
        AddField::Quantity => "只接受数字，留空视为 1",
        AddField::Category => "←/→ 选择分类（添加后保留）",
        AddField::Urgent => "按空格切换",
    };
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::Gray)),
        chunks[4],
    );
}

fn render_confirm_dialog<S, G>(frame: &mut Frame, app: &App<S, G>, action: &ConfirmAction) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let message = match action {
        ConfirmAction::Delete(id) => {
            let name = app
                .store
                .items()
                .get(*id)
                .map(|e| e.name.as_str())
                .unwrap_or("?");
            format!("确认删除 \"{}\"？", name)
        }
        ConfirmAction::ClearAll => format!("确认清空全部 {} 个条目？", app.store.items().len()),
    };

    let dialog = Paragraph::new(format!("{}\n\n[y] 确认  [n] 取消", message))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("⚠️ 确认操作").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}
