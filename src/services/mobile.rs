//! Touchscreen layout derivation.
//!
//! The mobile variant of a layout adds shift, delete, level-switch, emoji,
//! space and enter keys to the letter and symbol levels, and reshuffles a few
//! symbols between `opt` and `opt+shift`. Every edit is positional and
//! assumes the row shape of CLDR android layouts (four rows: top letter row,
//! home row, shift row, bottom row). Edits on one row run in the listed
//! order because each relies on the positions left by the previous one.

use thiserror::Error;

use crate::models::{
    Key, KeyAction, Layout, Level, Row, RowEdit, RowEditError, KEYVAL_RETURN, LEVEL_DEFAULT,
    LEVEL_OPT, LEVEL_OPT_SHIFT, LEVEL_SHIFT,
};

/// Level-switch targets, by position in a CLDR android layout.
const TARGET_DEFAULT: usize = 0;
const TARGET_SHIFT: usize = 1;
const TARGET_OPT: usize = 2;
const TARGET_OPT_SHIFT: usize = 3;

/// Second row: receives symbols moved between the symbol levels.
const HOME_ROW: usize = 1;
/// Third row: gains the shift and delete keys.
const SHIFT_ROW: usize = 2;
/// Fourth row: gains switch, emoji, space and enter keys.
const BOTTOM_ROW: usize = 3;

/// The layout does not have the shape the mobile edits assume.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A required level is absent
    #[error("layout has no '{0}' level")]
    MissingLevel(String),
    /// A level has fewer rows than needed
    #[error("level '{level}' has no row {row}")]
    MissingRow {
        /// Level tag
        level: String,
        /// Row index
        row: usize,
    },
    /// A row is too short for an edit
    #[error("level '{level}' row {row}: {source}")]
    RowTooShort {
        /// Level tag
        level: String,
        /// Row index
        row: usize,
        /// Failed edit
        #[source]
        source: RowEditError,
    },
}

fn shift_key(target: usize) -> Key {
    Key::level_switch(target)
        .with_icon("keyboard-shift-symbolic")
        .with_width(1.5)
}

fn switch_key(target: usize, label: &str) -> Key {
    Key::level_switch(target).with_label(label).with_width(1.5)
}

fn delete_key() -> Key {
    Key::action(KeyAction::Delete)
        .with_icon("edit-clear-symbolic")
        .with_width(1.5)
}

fn emoji_key() -> Key {
    Key::action(KeyAction::Emoji)
        .with_icon("smile-symbolic")
        .with_width(1.0)
}

fn space_key() -> Key {
    Key::text(" ").with_width(4.0)
}

fn enter_key() -> Key {
    Key::keyval(KEYVAL_RETURN)
        .with_icon("keyboard-enter-symbolic")
        .with_width(1.5)
}

/// Runs `edit` on one row of `level`, attributing failures to that row.
fn on_row<T>(
    level: &mut Level,
    row: usize,
    edit: impl FnOnce(&mut Row) -> Result<T, RowEditError>,
) -> Result<T, TransformError> {
    let Some(target) = level.rows.get_mut(row) else {
        return Err(TransformError::MissingRow {
            level: level.tag.clone(),
            row,
        });
    };
    edit(target).map_err(|source| TransformError::RowTooShort {
        level: level.tag.clone(),
        row,
        source,
    })
}

/// Applies `edit` to one row of `level`.
fn edit_row(level: &mut Level, row: usize, edit: RowEdit) -> Result<(), TransformError> {
    on_row(level, row, |target| target.apply(edit)).map(|_| ())
}

/// Applies edits to one row in order.
fn edit_row_all(
    level: &mut Level,
    row: usize,
    edits: impl IntoIterator<Item = RowEdit>,
) -> Result<(), TransformError> {
    for edit in edits {
        edit_row(level, row, edit)?;
    }
    Ok(())
}

/// Removes the key at `index` of a row.
fn take_key(level: &mut Level, row: usize, index: usize) -> Result<Key, TransformError> {
    on_row(level, row, |target| target.remove_at(index))
}

/// Replaces the key at `index` of a row, returning the old one.
fn swap_key(level: &mut Level, row: usize, index: usize, key: Key) -> Result<Key, TransformError> {
    on_row(level, row, |target| target.replace_at(index, key))
}

/// Edits shared by the unmodified and shift levels.
///
/// `toggle` is the level the shift key switches to.
fn transform_letter_level(level: &mut Level, toggle: usize) -> Result<(), TransformError> {
    edit_row_all(
        level,
        SHIFT_ROW,
        [
            RowEdit::InsertAt(0, shift_key(toggle)),
            RowEdit::Append(delete_key()),
        ],
    )?;
    edit_row_all(
        level,
        BOTTOM_ROW,
        [
            RowEdit::InsertAt(0, switch_key(TARGET_OPT, "123")),
            RowEdit::InsertAt(1, emoji_key()),
            RowEdit::ReplaceAt(3, space_key()),
            RowEdit::Append(enter_key()),
        ],
    )
}

/// Edits of the two symbol levels, including the keys they exchange.
fn transform_symbol_levels(opt: &mut Level, opt_shift: &mut Level) -> Result<(), TransformError> {
    edit_row_all(
        opt,
        SHIFT_ROW,
        [
            RowEdit::InsertAt(0, switch_key(TARGET_OPT_SHIFT, "=/<")),
            RowEdit::Append(delete_key()),
        ],
    )?;

    // Remove ° so that - in opt can be _ in opt+shift
    let underscore = take_key(opt, BOTTOM_ROW, 0)?;
    let degree = swap_key(opt_shift, HOME_ROW, 5, underscore)?;

    // Move / to the last free entry of the home row
    let slash = take_key(opt, BOTTOM_ROW, 0)?;
    edit_row(opt, HOME_ROW, RowEdit::Append(slash))?;

    edit_row_all(
        opt,
        BOTTOM_ROW,
        [
            RowEdit::InsertAt(0, switch_key(TARGET_DEFAULT, "ABC")),
            RowEdit::InsertAt(1, emoji_key()),
            RowEdit::RemoveAt(2),
            RowEdit::InsertAt(3, space_key()),
            RowEdit::Append(enter_key()),
        ],
    )?;

    // Move \ to the last free entry of the home row
    let backslash = take_key(opt_shift, SHIFT_ROW, 0)?;
    edit_row(opt_shift, HOME_ROW, RowEdit::Append(backslash))?;

    edit_row_all(
        opt_shift,
        SHIFT_ROW,
        [
            RowEdit::InsertAt(0, degree),
            RowEdit::InsertAt(0, switch_key(TARGET_OPT, "123")),
            RowEdit::Append(delete_key()),
        ],
    )?;
    edit_row_all(
        opt_shift,
        BOTTOM_ROW,
        [
            RowEdit::RemoveAt(3),
            RowEdit::RemoveAt(3),
            RowEdit::InsertAt(0, switch_key(TARGET_DEFAULT, "ABC")),
            RowEdit::InsertAt(1, emoji_key()),
            RowEdit::RemoveAt(4),
            RowEdit::InsertAt(3, space_key()),
            RowEdit::Append(enter_key()),
        ],
    )
}

/// Borrows two distinct levels mutably.
fn two_levels_mut(levels: &mut [Level], first: usize, second: usize) -> (&mut Level, &mut Level) {
    if first < second {
        let (head, tail) = levels.split_at_mut(second);
        (&mut head[first], &mut tail[0])
    } else {
        let (head, tail) = levels.split_at_mut(first);
        (&mut tail[0], &mut head[second])
    }
}

/// Rewrites `layout` in place into its mobile variant.
///
/// The unmodified level is required. The shift level is optional, and the
/// `opt`/`opt+shift` levels are optional as a pair. On error the layout may
/// be partially edited and should be discarded.
pub fn apply_mobile(layout: &mut Layout) -> Result<(), TransformError> {
    let lower = layout
        .level_mut(LEVEL_DEFAULT)
        .ok_or_else(|| TransformError::MissingLevel(LEVEL_DEFAULT.to_string()))?;
    transform_letter_level(lower, TARGET_SHIFT)?;

    if let Some(upper) = layout.level_mut(LEVEL_SHIFT) {
        transform_letter_level(upper, TARGET_DEFAULT)?;
    }

    match (
        layout.level_index(LEVEL_OPT),
        layout.level_index(LEVEL_OPT_SHIFT),
    ) {
        (Some(opt), Some(opt_shift)) => {
            let (opt, opt_shift) = two_levels_mut(&mut layout.levels, opt, opt_shift);
            transform_symbol_levels(opt, opt_shift)
        }
        (None, None) => Ok(()),
        (Some(_), None) => Err(TransformError::MissingLevel(LEVEL_OPT_SHIFT.to_string())),
        (None, Some(_)) => Err(TransformError::MissingLevel(LEVEL_OPT.to_string())),
    }
}

/// Returns the mobile variant of `layout`, leaving it untouched.
pub fn to_mobile(layout: &Layout) -> Result<Layout, TransformError> {
    let mut mobile = layout.clone();
    apply_mobile(&mut mobile)?;
    Ok(mobile)
}
