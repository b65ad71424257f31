//! Focus-cursor arithmetic shared by the pair and the slave timeline.
//!
//! The cursor tracks "the Nth-from-top row I was looking at": an
//! insertion at the head advances it by one so it keeps pointing at the
//! same row, except when it already sits on the last row, where it stays
//! put (the view scrolled underneath it).

/// Focus after one insertion at the head of a view of `next_len` rows.
#[must_use]
pub(crate) fn next_focus_index(focus: Option<usize>, next_len: usize) -> Option<usize> {
    match focus {
        None => None,
        Some(_) if next_len == 0 => None,
        Some(index) if index == next_len - 1 => Some(index),
        Some(index) => Some(index + 1),
    }
}

/// Coarse focus recomputation after arbitrary removal: clamp into range
/// or clear. Deliberately does not re-anchor to the previously focused
/// row; see DESIGN.md.
#[must_use]
pub(crate) fn clamp_focus(focus: Option<usize>, len: usize) -> Option<usize> {
    match focus {
        Some(_) if len == 0 => None,
        Some(index) => Some(index.min(len - 1)),
        None => None,
    }
}
