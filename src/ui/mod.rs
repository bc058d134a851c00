//! Terminal rendering of the navigation drawer.
//!
//! Rendering never touches the library or preferences; it only reads an
//! immutable [`NavListSnapshot`](crate::drawer::NavListSnapshot).

mod nav_list;

pub use nav_list::{
    buffer_lines, render_to_buffer, row_line, NavListView, NavStyles, RenderContext,
};
