//! # TUI Components
//!
//! ## Stateless Components (Props-Based Rendering)
//!
//! - `StatusBar`: one-line header with gesture feedback
//! - `Bubble`: a single message bubble, placed within its row band
//!
//! ## Stateful Components
//!
//! - `BubbleList`: scrollable conversation with layout caching and hit
//!   testing. Its persistent half, `BubbleListState`, lives in `TuiState`.
//!
//! ```text
//! components/
//! ├── mod.rs          (this file)
//! ├── status_bar.rs   (top line)
//! ├── bubble.rs       (single bubble)
//! └── bubble_list.rs  (scrollable bubble container)
//! ```

pub mod bubble;
pub mod bubble_list;
mod status_bar;

pub use bubble::{Bubble, BubbleSize};
pub use bubble_list::{BubbleList, BubbleListState};
pub use status_bar::StatusBar;
