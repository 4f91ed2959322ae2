//! Configuration options for TOON encoding.
//!
//! The grammar itself is fixed (two-space indentation, comma-separated
//! table rows); the only tunable is the soft width budget that decides
//! when a sequence of scalars renders inline instead of one element per
//! line.
//!
//! ## Examples
//!
//! ```rust
//! use toon_temporal::{from_str, to_string_with_options, ToonOptions};
//!
//! let value = from_str("nums: [1, 2, 3]").unwrap();
//!
//! // A tiny budget forces the list layout.
//! let options = ToonOptions::new().with_width_budget(8);
//! let toon = to_string_with_options(&value, &options).unwrap();
//! assert!(toon.contains("- 1"));
//! ```

/// The default soft width budget, in columns, for inline sequences.
pub const DEFAULT_WIDTH_BUDGET: usize = 80;

/// Configuration options for TOON encoding.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::ToonOptions;
///
/// let options = ToonOptions::new();
/// assert_eq!(options.width_budget, 80);
///
/// let narrow = ToonOptions::new().with_width_budget(40);
/// assert_eq!(narrow.width_budget, 40);
/// ```
#[derive(Clone, Debug)]
pub struct ToonOptions {
    /// A sequence of scalars renders inline as `[v1, v2, v3]` only when
    /// the whole line (indentation and key included) fits this budget.
    pub width_budget: usize,
}

impl Default for ToonOptions {
    fn default() -> Self {
        ToonOptions {
            width_budget: DEFAULT_WIDTH_BUDGET,
        }
    }
}

impl ToonOptions {
    /// Creates the default options (80-column inline budget).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the soft width budget for inline sequences.
    #[must_use]
    pub fn with_width_budget(mut self, width_budget: usize) -> Self {
        self.width_budget = width_budget;
        self
    }
}
