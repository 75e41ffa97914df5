//! # Commands
//!
//! The command grammar layered over markdown:
//!
//! - **Special** commands bind the comment or set metadata (`\entity`, `\group`, ...)
//! - **Section** commands open a named block (`\effects`, `\returns`, ...)
//! - **Inline** commands document a sub-part (`\param`, `\tparam`, `\base`)
//!
//! Recognition is configurable per command through [`CommandPatterns`].

pub mod kinds;
pub mod patterns;

pub use kinds::{Command, InlineCommand, SpecialCommand};
pub use patterns::{CommandPatterns, MERGE_PREFIX, PatternError};
