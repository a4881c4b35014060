use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::error::SheetError;
use crate::style::StyleDescriptor;

/// Index of a style in a [`StyleTable`]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StyleId(u32);

impl StyleId {
    /// The style every cell starts with
    pub const DEFAULT: StyleId = StyleId(0);

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn is_default(&self) -> bool {
        *self == StyleId::DEFAULT
    }
}

/// Deduplicating table of style descriptors.
///
/// Identical descriptors share one id, mirroring the cell-format table of a
/// spreadsheet file. Entry 0 is the default style and is always present.
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: Vec<StyleDescriptor>,
    lookup: HashMap<StyleDescriptor, StyleId>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTable {
    /// Excel's limit on distinct cell formats per workbook
    pub const MAX_STYLES: usize = 64_000;

    /// Create a table whose default style is [`StyleDescriptor::default`]
    pub fn new() -> Self {
        Self::with_default(StyleDescriptor::default())
    }

    /// Create a table with a custom default style (e.g. the first cell format of a file)
    pub fn with_default(default: StyleDescriptor) -> Self {
        let mut lookup = HashMap::new();
        lookup.insert(default.clone(), StyleId::DEFAULT);
        Self {
            styles: vec![default],
            lookup,
        }
    }

    /// Return the id of `style`, adding it to the table if it is new
    pub fn intern(&mut self, style: &StyleDescriptor) -> Result<StyleId, SheetError> {
        if let Some(id) = self.lookup.get(style) {
            return Ok(*id);
        }
        if self.styles.len() >= Self::MAX_STYLES {
            return Err(SheetError::StyleTableFull {
                limit: Self::MAX_STYLES,
            });
        }

        let id = StyleId(self.styles.len() as u32);
        self.styles.push(style.clone());
        self.lookup.insert(style.clone(), id);
        Ok(id)
    }

    /// Look up a style by id
    pub fn get(&self, id: StyleId) -> Option<&StyleDescriptor> {
        self.styles.get(id.index())
    }

    /// The default style (entry 0)
    pub fn default_style(&self) -> &StyleDescriptor {
        &self.styles[0]
    }

    /// Number of distinct styles, including the default
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Always false: the default entry cannot be removed
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &StyleDescriptor)> {
        self.styles
            .iter()
            .enumerate()
            .map(|(idx, style)| (StyleId(idx as u32), style))
    }
}

// Serialized as the plain list of descriptors; the lookup map is rebuilt on load
impl Serialize for StyleTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.styles.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StyleTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let styles = Vec::<StyleDescriptor>::deserialize(deserializer)?;
        let mut iter = styles.into_iter();
        let mut table = StyleTable::with_default(iter.next().unwrap_or_default());

        // Keep positions stable even if the list holds duplicates
        for style in iter {
            let id = StyleId(table.styles.len() as u32);
            table.lookup.entry(style.clone()).or_insert(id);
            table.styles.push(style);
        }
        Ok(table)
    }
}
