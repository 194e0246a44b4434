use chrono::{DateTime, Utc};
use colored::Colorize;
use scv::model::{CardKey, CardPayload};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const KEY_WIDTH: usize = 12;
const TIME_WIDTH: usize = 16;
const SELECTED_MARKER: &str = "▸";

/// One printable card line.
pub(super) struct CardRow {
    pub key: CardKey,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub selected: bool,
}

pub(super) fn print_success(message: impl AsRef<str>) {
    println!("{}", message.as_ref().green());
}

pub(super) fn print_info(message: impl AsRef<str>) {
    println!("{}", message.as_ref().dimmed());
}

pub(super) fn print_cards(rows: &[CardRow]) {
    if rows.is_empty() {
        println!("No cards yet.");
        return;
    }

    for row in rows {
        let marker = if row.selected { SELECTED_MARKER } else { " " };
        let key = format!("{:<width$}", row.key.to_string(), width = KEY_WIDTH);

        let title_text = if row.text.is_empty() {
            row.title.clone()
        } else {
            format!("{}  {}", row.title, row.text)
        };
        let fixed = 2 + KEY_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let shown = truncate_to_width(&title_text, available);
        let padding = available.saturating_sub(shown.width());

        let title = if row.selected {
            shown.bold()
        } else {
            shown.normal()
        };

        println!(
            "{} {}{}{}{}",
            marker.cyan(),
            key.yellow(),
            title,
            " ".repeat(padding),
            format_time_ago(row.created_at).dimmed()
        );
    }
}

pub(super) fn print_card_detail(row: &CardRow, payload: &CardPayload) {
    println!("{} {}", row.key.to_string().yellow(), row.title.bold());
    println!("--------------------------------");
    match payload {
        CardPayload::Search { query, results } => {
            println!("query:     {}", query);
            let cached = if results.is_some() { "yes" } else { "no" };
            println!("cached:    {}", cached);
        }
        CardPayload::Sutta { reference } => println!("reference: {}", reference),
    }
    println!(
        "created:   {}",
        row.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if row.selected {
        println!("{}", "selected".cyan());
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if flat.width() <= max_width {
        return flat;
    }

    // Reserve one column for the ellipsis.
    let budget = max_width.saturating_sub(1);
    let mut result = String::new();
    let mut current_width = 0;
    for c in flat.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > budget {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
