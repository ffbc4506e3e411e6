//! Accepted column headers and reserved sheet names for tabular import.
//!
//! Each logical column has an ordered alias list: the localized header first,
//! then the English fallback. The first alias with a non-empty cell in a row wins.

use crate::locale::{Locale, Labels};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    OldRank,
    NewRank,
}

impl Column {
    fn header(self, labels: &Labels) -> &'static str {
        match self {
            Column::Name => labels.name_header,
            Column::OldRank => labels.old_rank_header,
            Column::NewRank => labels.new_rank_header,
        }
    }

    /// Header aliases in priority order.
    pub fn aliases(self) -> Vec<&'static str> {
        Locale::all()
            .iter()
            .map(|locale| self.header(locale.labels()))
            .collect()
    }
}

/// Summary sheet names of every locale. Group sheets must avoid all of them.
pub fn reserved_sheet_names() -> Vec<&'static str> {
    Locale::all()
        .iter()
        .flat_map(|locale| {
            let labels = locale.labels();
            [labels.detail_sheet, labels.summary_sheet]
        })
        .collect()
}

/// Summary sheets written by the exporter in any locale; never read back as groups.
pub fn is_reserved_sheet(name: &str) -> bool {
    reserved_sheet_names().contains(&name)
}
