//! Layout result types
//!
//! Produced by the resolver's layout walk, consumed by the report writer.
//! Kept here so rendering does not depend on the resolution machinery.

use serde::{Deserialize, Serialize};

use crate::issue::Issue;

/// One laid-out report row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPlacement {
    /// 1-based spreadsheet row; the first data row is 3
    pub row: u32,
    /// Indent units applied to the subject cell
    pub indent: u16,
    /// Directly matched by the filter query; untargeted ancestors render
    /// with a shaded subject cell
    pub is_target: bool,
    pub issue: Issue,
}
