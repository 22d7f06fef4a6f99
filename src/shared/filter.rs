//! Post Filtering and Sorting
//!
//! The active filter is a pure projection over the canonical post list. It is
//! recomputed on every render and never stored as a second mutable copy of
//! the data.

use crate::shared::post::{Post, PostCategory};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Category selection for the post list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// Show every category
    #[default]
    All,
    /// Show a single category
    Category(PostCategory),
}

/// Sort key for the post list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Newest first (under the default descending order)
    #[default]
    CreatedAt,
    /// Most viewed
    ViewCount,
    /// Highest net score
    Popular,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter vocabulary accepted by the post list endpoint.
///
/// `author_only` is applied client-side only and is never sent on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostFilter {
    pub category: CategoryFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub search: Option<String>,
    pub author_only: bool,
}

impl PostFilter {
    /// Whether a post passes this filter for the given viewer.
    pub fn matches(&self, post: &Post, viewer_id: Uuid) -> bool {
        if let CategoryFilter::Category(category) = self.category {
            if post.category != category {
                return false;
            }
        }
        if self.author_only && post.author.id != viewer_id {
            return false;
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !post.title.to_lowercase().contains(&needle)
                && !post.body.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Relative ordering of two posts under this filter's sort key.
    ///
    /// Pinned-first ordering is applied by the store projection, not here.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let ordering = match self.sort_by {
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            SortBy::ViewCount => a.view_count.cmp(&b.view_count),
            SortBy::Popular => a.tally.score.cmp(&b.tally.score),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Query parameters for the list endpoint.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let CategoryFilter::Category(category) = self.category {
            // serde emits the snake_case name in quotes; strip them
            let name = serde_json::to_string(&category)
                .unwrap_or_default()
                .trim_matches('"')
                .to_string();
            query.push(("category", name));
        }
        let sort_by = match self.sort_by {
            SortBy::CreatedAt => "created_at",
            SortBy::ViewCount => "view_count",
            SortBy::Popular => "popular",
        };
        query.push(("sort_by", sort_by.to_string()));
        let sort_order = match self.sort_order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        query.push(("sort_order", sort_order.to_string()));
        if let Some(search) = self.search.as_deref() {
            if !search.trim().is_empty() {
                query.push(("search", search.trim().to_string()));
            }
        }
        query
    }
}
