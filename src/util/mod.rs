//! Utility functions for common operations.
//!
//! - **Text**: Unicode-aware width calculation, truncation and count formatting
//! - **Files**: Atomic writes for persisted preferences
//!
//! # Examples
//!
//! ```
//! use podnav::util::{format_count, truncate_to_width};
//!
//! assert_eq!(format_count(12_345), "12,345");
//! assert_eq!(truncate_to_width("Playback History", 10), "Playbac...");
//! ```

mod fs;
mod text;

pub use fs::atomic_write;
pub use text::{display_width, format_count, strip_control_chars, truncate_to_width};
