// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The active category set and category-id normalization.

use crate::models::Category;

pub const OTHER: &str = "Other";

const BASIC: [(&str, &str, &str); 5] = [
    ("Food", "🍔", "#FF6B6B"),
    ("Transport", "🚗", "#4ECDC4"),
    ("Shopping", "🛍️", "#45B7D1"),
    ("Bills", "📄", "#FFA07A"),
    ("Other", "📦", "#98D8C8"),
];

const EXTENDED: [(&str, &str, &str); 2] = [
    ("Entertainment", "🎬", "#DDA0DD"),
    ("Health", "💊", "#90EE90"),
];

/// Colors handed out to categories the registry does not know about.
pub const PALETTE: [&str; 8] = [
    "#8884D8", "#82CA9D", "#FFC658", "#FF8042", "#0088FE", "#00C49F", "#FFBB28", "#A28EFF",
];

const FALLBACK_ICON: &str = "🏷️";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::basic()
    }
}

impl CategoryRegistry {
    /// Food, Transport, Shopping, Bills, Other.
    pub fn basic() -> Self {
        Self {
            categories: BASIC
                .iter()
                .map(|(name, icon, color)| Category::new(name, name, icon, color))
                .collect(),
        }
    }

    /// The basic set plus Entertainment and Health, with Other kept last.
    pub fn extended() -> Self {
        let mut reg = Self::basic();
        let other = reg.categories.pop();
        reg.categories.extend(
            EXTENDED
                .iter()
                .map(|(name, icon, color)| Category::new(name, name, icon, color)),
        );
        reg.categories.extend(other);
        reg
    }

    /// `basic` or `extended`; anything else falls back to `basic`.
    pub fn named(set: &str) -> Self {
        match set.trim().to_ascii_lowercase().as_str() {
            "extended" => Self::extended(),
            _ => Self::basic(),
        }
    }

    /// Merge user-defined categories into the set. An entry whose id or name
    /// matches an existing category overrides its icon and color; anything
    /// else is appended.
    pub fn with_custom<I>(mut self, custom: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        for c in custom {
            let id = c.id.trim();
            if id.is_empty() {
                continue;
            }
            match self.position(id).or_else(|| self.position(c.name.trim())) {
                Some(i) => {
                    let existing = &mut self.categories[i];
                    if !c.icon.trim().is_empty() {
                        existing.icon = c.icon;
                    }
                    if !c.color.trim().is_empty() {
                        existing.color = c.color;
                    }
                }
                None => {
                    let name = if c.name.trim().is_empty() {
                        id.to_string()
                    } else {
                        c.name.trim().to_string()
                    };
                    let fallback = fallback_style(id);
                    self.categories.push(Category {
                        id: id.to_string(),
                        name,
                        icon: non_empty_or(c.icon, fallback.icon),
                        color: non_empty_or(c.color, fallback.color),
                    });
                }
            }
        }
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn position(&self, raw: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| c.id.eq_ignore_ascii_case(raw) || c.name.eq_ignore_ascii_case(raw))
    }

    /// Canonical id for a raw category string.
    ///
    /// Blank or missing values are `Other`. Values matching a known id or
    /// display name (ignoring case) map to that id. Anything else passes
    /// through trimmed, as an ad-hoc category.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        let trimmed = raw.map(str::trim).unwrap_or("");
        if trimmed.is_empty() {
            return OTHER.to_string();
        }
        match self.position(trimmed) {
            Some(i) => self.categories[i].id.clone(),
            None => trimmed.to_string(),
        }
    }

    /// Display details for an id, falling back to a palette entry for
    /// categories outside the registry.
    pub fn style(&self, id: &str) -> Category {
        match self.get(id) {
            Some(c) => c.clone(),
            None => fallback_style(id),
        }
    }
}

fn non_empty_or(v: String, fallback: String) -> String {
    if v.trim().is_empty() { fallback } else { v }
}

/// Stable palette slot for an id: same id, same color, every run.
pub fn palette_index(id: &str) -> usize {
    let sum: usize = id.bytes().map(usize::from).sum();
    sum % PALETTE.len()
}

fn fallback_style(id: &str) -> Category {
    Category::new(id, id, FALLBACK_ICON, PALETTE[palette_index(id)])
}
