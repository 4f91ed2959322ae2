//! TOON Format Reference
//!
//! This module documents the TOON text form as implemented by this
//! library. TOON is a minimalist rendering of JSON-shaped data designed
//! for token-efficient LLM prompts: indentation replaces braces, quotes
//! appear only when a string would otherwise be ambiguous, and uniform
//! object sequences collapse into tables.
//!
//! The encoder and decoder are exact inverses: for every value tree `v`,
//! `from_str(to_string(v))` reproduces `v` including object entry order
//! and the integer/float distinction.
//!
//! # Objects
//!
//! Newline-delimited `key: value` pairs; nested objects indent two
//! spaces per level:
//!
//! ```text
//! name: Alice
//! account:
//!   id: 42
//!   active: true
//! ```
//!
//! Keys are unquoted unless they would be ambiguous (see Strings); a
//! quoted key follows the same escape rules as a quoted string. An empty
//! object value renders inline as `key: {}`. The top-level empty object
//! renders as the empty string, and the decoder accepts both `""` and
//! `{}` for it.
//!
//! # Primitives
//!
//! | Type | Syntax | Example |
//! |------|--------|---------|
//! | Null | `null` | `value: null` |
//! | Boolean | `true` / `false` | `active: true` |
//! | Integer | decimal digits, optional sign | `count: 42` |
//! | Float | shortest roundtrip decimal | `price: 19.99` |
//! | String | unquoted or `"quoted"` | `name: Alice` |
//!
//! A float with no fractional part keeps a trailing `.0` (`limit: 3.0`)
//! so decoding restores the same numeric kind. The decoder prefers
//! integers for bare digit runs and widens to float only on i64
//! overflow.
//!
//! # Strings
//!
//! Strings are unquoted by default. Quoting (JSON-style, with the usual
//! escapes plus `\uXXXX`) is required when the string:
//!
//! - is empty, or has leading/trailing whitespace
//! - equals `true`, `false`, or `null`
//! - reads as a number (`"42"`, `"-3.5"`, `"1e6"`)
//! - contains `:`, `,`, `"`, `\`, a control character, or a bracket
//!   character that would read as structure
//! - starts with `-` or `#`
//!
//! # Sequences
//!
//! Scalar sequences render inline while the line fits the width budget
//! (80 columns by default):
//!
//! ```text
//! scores: [95, 87, 92]
//! ```
//!
//! Longer or non-scalar sequences use list form, one `- ` element per
//! line; an element that is itself an object or sequence puts a bare `-`
//! on its own line with the element's block one level deeper:
//!
//! ```text
//! items:
//!   -
//!     name: Widget
//!     price: 9.99
//!   - standalone
//! ```
//!
//! An empty sequence renders inline as `key: []`.
//!
//! # Tables
//!
//! A sequence of two or more objects with identical key sets in
//! identical order and only scalar values compresses to a table. The
//! header sits on the parent key line; each row is one line of
//! comma-separated cells, one level deeper:
//!
//! ```text
//! users[3]{id,name,email}:
//!   1,Alice,alice@example.com
//!   2,Bob,bob@example.com
//!   3,Cara,cara@example.com
//! ```
//!
//! The declared length is load-bearing: the decoder requires exactly
//! that many rows, each with exactly as many cells as headers. Cells
//! containing commas are quoted. At the root (or under a bare `-`), the
//! header is keyless: `[3]{id,name,email}:`.
//!
//! # Indentation
//!
//! Two spaces per level, always. Tabs in indentation are rejected, as
//! are odd indents and jumps past the next level. The decoder never
//! guesses: a line that fits no open scope is an error, not a warning.
//!
//! # Comparison
//!
//! **JSON** (123 chars):
//! ```json
//! [{"id":1,"name":"Alice","active":true},{"id":2,"name":"Bob","active":true}]
//! ```
//!
//! **TOON** (58 chars):
//! ```text
//! [2]{id,name,active}:
//!   1,Alice,true
//!   2,Bob,true
//! ```

// This module contains only documentation; no implementation code
