//! Terminal control row for extended mobile layouts.

use crate::models::{Key, Layout, Row};

/// Builds the row of Tab, Ctrl, Alt and arrow keys.
pub fn terminal_row() -> Row {
    Row::new(vec![
        Key::keyval("0xff09").with_label("Tab").with_width(2.0),
        Key::modifier("0xffe3").with_label("Ctrl").with_width(2.0),
        Key::modifier("0xffe9").with_label("Alt").with_width(2.0),
        Key::keyval("0xff51")
            .with_icon("go-previous-symbolic")
            .with_width(1.0),
        Key::keyval("0xff52").with_icon("go-up-symbolic").with_width(1.0),
        Key::keyval("0xff54")
            .with_icon("go-down-symbolic")
            .with_width(1.0),
        Key::keyval("0xff53").with_icon("go-next-symbolic").with_width(1.0),
    ])
}

/// Inserts the terminal row as the first row of every level.
pub fn apply_terminal_row(layout: &mut Layout) {
    let row = terminal_row();
    for level in &mut layout.levels {
        level.rows.insert(0, row.clone());
    }
}

/// Returns `layout` with the terminal row added, leaving it untouched.
pub fn to_extended(layout: &Layout) -> Layout {
    let mut extended = layout.clone();
    apply_terminal_row(&mut extended);
    extended
}
