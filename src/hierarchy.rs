//! Folder-scoped listings over a flat catalog snapshot
//!
//! The catalog carries no parent pointers: the tree is implied by
//! `/`-delimited path prefixes. An item is a direct child of a prefix when
//! its path is `prefix + "/" + leaf` with no further `/` in `leaf` (or, at
//! the root, when its path has no `/` at all).
//!
//! Recursion into sub-folders is capped at [`MAX_LISTING_DEPTH`] so that
//! arbitrarily deep path strings cannot cause unbounded recursion.

use crate::remote::{Catalog, CatalogItem};
use std::collections::{HashMap, HashSet};

/// Deepest folder level visited below the listing root (0 = direct children)
pub const MAX_LISTING_DEPTH: usize = 10;

/// Scope and depth of a listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingQuery {
    pub folder_prefix: Option<String>,
    pub recursive: bool,
}

impl ListingQuery {
    /// Build a query; `""`, `"/"` and outer slashes are normalized away
    pub fn new(folder_prefix: Option<&str>, recursive: bool) -> Self {
        let folder_prefix = folder_prefix
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            folder_prefix,
            recursive,
        }
    }

    /// Deepest level this query may visit
    pub fn depth_bound(&self) -> usize {
        if self.recursive {
            MAX_LISTING_DEPTH
        } else {
            0
        }
    }

    /// Deterministic cache key covering every input that affects the result
    pub fn cache_key(&self) -> String {
        format!(
            "jobs:{}:{}",
            self.folder_prefix.as_deref().unwrap_or(""),
            self.recursive
        )
    }
}

/// Resolve a listing against one catalog snapshot.
///
/// Returns the descendants of `query.folder_prefix` within the allowed
/// depth, deduplicated by `full_path` in first-seen order. A prefix that is
/// not in the catalog yields an empty listing.
pub fn resolve(catalog: &Catalog, query: &ListingQuery) -> Vec<CatalogItem> {
    let children = index_children(catalog);
    let mut visited = Vec::new();
    collect(
        &children,
        query.folder_prefix.as_deref(),
        0,
        query.depth_bound(),
        &mut visited,
    );

    let mut seen = HashSet::new();
    let mut listing = Vec::with_capacity(visited.len());
    for item in visited {
        if seen.insert(item.full_path.as_str()) {
            listing.push(item.clone());
        }
    }
    listing
}

/// Group items under their parent path, keeping catalog order
fn index_children(catalog: &Catalog) -> HashMap<Option<&str>, Vec<&CatalogItem>> {
    let mut children: HashMap<Option<&str>, Vec<&CatalogItem>> = HashMap::new();
    for item in catalog.items() {
        children.entry(item.parent()).or_default().push(item);
    }
    children
}

fn collect<'a>(
    children: &HashMap<Option<&str>, Vec<&'a CatalogItem>>,
    prefix: Option<&str>,
    depth: usize,
    bound: usize,
    out: &mut Vec<&'a CatalogItem>,
) {
    let Some(direct) = children.get(&prefix) else {
        return;
    };

    for &item in direct {
        out.push(item);
        if item.is_folder && depth < bound {
            collect(children, Some(item.full_path.as_str()), depth + 1, bound, out);
        }
    }
}
