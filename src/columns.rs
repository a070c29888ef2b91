use crate::parse::clean_text;

/// Header labels of one table, lower-cased and whitespace-normalized.
///
/// Keys keep the order in which they first appear; a repeated label points at
/// its last position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    entries: Vec<(String, usize)>,
}

impl HeaderIndex {
    pub fn build<S: AsRef<str>>(header_cells: &[S]) -> Self {
        let mut entries: Vec<(String, usize)> = Vec::with_capacity(header_cells.len());
        for (index, cell) in header_cells.iter().enumerate() {
            let label = clean_text(cell.as_ref()).to_lowercase();
            match entries.iter_mut().find(|(key, _)| *key == label) {
                Some(entry) => entry.1 = index,
                None => entries.push((label, index)),
            }
        }
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, index)| *index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a logical column. Variants are tried in order; each tries an
    /// exact label first, then the first label containing it.
    pub fn resolve(&self, variants: &[&str]) -> Option<usize> {
        variants.iter().find_map(|variant| {
            let variant = variant.to_lowercase();
            self.get(&variant).or_else(|| {
                self.entries
                    .iter()
                    .find(|(key, _)| key.contains(variant.as_str()))
                    .map(|(_, index)| *index)
            })
        })
    }
}

/// Logical columns of the coin table with the header spellings seen for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalColumn {
    Rank,
    Name,
    Price,
    Change1h,
    Change24h,
    Change7d,
    Change30d,
    Change90d,
}

impl LogicalColumn {
    pub fn variants(self) -> &'static [&'static str] {
        match self {
            LogicalColumn::Rank => &["#", "rank"],
            LogicalColumn::Name => &["name", "coin", "asset"],
            LogicalColumn::Price => &["price"],
            LogicalColumn::Change1h => &["1h", "1 h", "1 hour"],
            LogicalColumn::Change24h => &["24h", "24 h", "24 hour"],
            LogicalColumn::Change7d => &["7d", "7 d", "7 day"],
            LogicalColumn::Change30d => &["30d", "30 d", "30 day"],
            LogicalColumn::Change90d => &["90d", "90 d", "90 day"],
        }
    }
}

/// Header positions for every logical column of one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub rank: Option<usize>,
    pub name: Option<usize>,
    pub price: Option<usize>,
    pub change_1h: Option<usize>,
    pub change_24h: Option<usize>,
    pub change_7d: Option<usize>,
    pub change_30d: Option<usize>,
    pub change_90d: Option<usize>,
}

impl ColumnMap {
    pub fn from_index(index: &HeaderIndex) -> Self {
        let resolve = |column: LogicalColumn| index.resolve(column.variants());
        Self {
            rank: resolve(LogicalColumn::Rank),
            name: resolve(LogicalColumn::Name),
            price: resolve(LogicalColumn::Price),
            change_1h: resolve(LogicalColumn::Change1h),
            change_24h: resolve(LogicalColumn::Change24h),
            change_7d: resolve(LogicalColumn::Change7d),
            change_30d: resolve(LogicalColumn::Change30d),
            change_90d: resolve(LogicalColumn::Change90d),
        }
    }
}
