//! Table rendering shared by the read-only commands.

use chrono::{DateTime, Local, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use roulette_core::{DateIndex, Eligibility, Participant, SelectionSession};

fn table_with_header(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

pub fn eligibility_label(eligibility: Eligibility) -> &'static str {
    match eligibility {
        Eligibility::Eligible => "eligible",
        Eligibility::OutsideFilter => "other filter",
        Eligibility::AlreadySelected => "picked",
        Eligibility::Excluded => "skipped",
    }
}

fn eligibility_cell(eligibility: Eligibility) -> Cell {
    let cell = Cell::new(eligibility_label(eligibility));
    match eligibility {
        Eligibility::Eligible => cell.fg(Color::Green),
        Eligibility::AlreadySelected => cell.fg(Color::DarkGrey),
        Eligibility::Excluded => cell.fg(Color::Yellow),
        Eligibility::OutsideFilter => cell,
    }
}

pub fn format_last_selected(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn tag_list(participant: &Participant) -> String {
    participant
        .tags()
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One row per pool member, with its status under the session filter.
pub fn pool_table(session: &SelectionSession) -> Table {
    let mut table = table_with_header(&["Name", "Tags", "Status", "Last picked"]);
    for participant in session.pool() {
        table.add_row(vec![
            Cell::new(participant.name()),
            Cell::new(tag_list(participant)),
            eligibility_cell(session.classify(participant)),
            Cell::new(format_last_selected(participant.last_selected_at())),
        ]);
    }
    table
}

/// One row per day, oldest first.
pub fn history_table(index: &DateIndex) -> Table {
    let mut table = table_with_header(&["Date", "Picked"]);
    for (day, names) in index.iter() {
        table.add_row(vec![
            Cell::new(day.format("%Y-%m-%d")),
            Cell::new(names.join(", ")),
        ]);
    }
    table
}
