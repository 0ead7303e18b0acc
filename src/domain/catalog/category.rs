use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use super::variant::MAX_IMAGE_URL_LENGTH;
use crate::primitives::{Clock, EntityId, IdGenerator};
use crate::validation::{patterns, rules, ValidationErrors};

// ============================================================================
// Product Category Entity
// ============================================================================
//
// Categories form a tree addressed by materialised paths such as
// `/electronics/audio/headphones`. The root sits at level 0.
//
// ============================================================================

pub const MAX_CATEGORY_LEVEL: u32 = 5;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 200;
pub const MAX_CATEGORY_PATH_LENGTH: usize = 500;
pub const MAX_SEO_TITLE_LENGTH: usize = 200;
pub const MAX_SEO_DESCRIPTION_LENGTH: usize = 300;
pub const MAX_SEO_KEYWORDS_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<EntityId>,
    pub level: u32,
    pub path: String,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of `move_to_parent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryMove {
    Unchanged,
    /// Descendants still carry `old_path` as their prefix and need
    /// `rebase_path` applied by whoever loads them.
    Moved {
        old_path: String,
        new_path: String,
        level_shift: i64,
    },
}

impl CategoryMove {
    pub fn descendants_need_reindex(&self) -> bool {
        matches!(self, CategoryMove::Moved { .. })
    }
}

/// URL-safe path segment derived from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '/') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

impl ProductCategory {
    pub fn create_root(
        name: impl Into<String>,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let path = format!("/{}", slugify(&name));
        Self::build(name, None, 0, path, ids, clock)
    }

    pub fn create_child(
        parent: &ProductCategory,
        name: impl Into<String>,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, CatalogError> {
        if !parent.can_have_children() {
            return Err(CatalogError::DepthLimit { max: MAX_CATEGORY_LEVEL });
        }
        let name = name.into();
        let path = format!("{}/{}", parent.path, slugify(&name));
        Self::build(name, Some(parent.id), parent.level + 1, path, ids, clock)
    }

    fn build(
        name: String,
        parent_id: Option<EntityId>,
        level: u32,
        path: String,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Self, CatalogError> {
        let now = clock.now();
        let category = Self {
            id: ids.next_id(),
            name,
            description: None,
            parent_id,
            level,
            path,
            image_url: None,
            sort_order: 0,
            is_active: true,
            seo_title: None,
            seo_description: None,
            seo_keywords: None,
            created_at: now,
            updated_at: now,
        };
        category.validate()?;
        Ok(category)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut errors = ValidationErrors::new();
        rules::non_nil(&mut errors, "id", self.id);

        rules::required_text(&mut errors, "name", &self.name, MAX_CATEGORY_NAME_LENGTH);
        if !self.name.trim().is_empty() {
            rules::matches_pattern(
                &mut errors,
                "name",
                &self.name,
                &patterns::CATEGORY_NAME,
                "may only contain letters, digits, spaces, '-', '_' and '/'",
            );
        }

        errors.ensure(
            self.level <= MAX_CATEGORY_LEVEL,
            "level",
            format!("must not exceed {}", MAX_CATEGORY_LEVEL),
        );

        validate_path(&mut errors, &self.path);

        if self.is_root() {
            errors.ensure(self.parent_id.is_none(), "parent_id", "root categories have no parent");
            errors.ensure(!self.path.is_empty(), "path", "root categories need a path");
        } else {
            errors.ensure(self.parent_id.is_some(), "parent_id", "non-root categories need a parent");
        }
        if let Some(parent) = self.parent_id {
            rules::non_nil(&mut errors, "parent_id", parent);
            errors.ensure(parent != self.id, "parent_id", "a category cannot be its own parent");
        }

        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            rules::optional_text(&mut errors, "image_url", Some(url), MAX_IMAGE_URL_LENGTH);
            rules::matches_pattern(
                &mut errors,
                "image_url",
                url,
                &patterns::IMAGE_URL,
                "must be an http(s) link to a .jpg, .jpeg, .png, .gif, .webp or .svg image",
            );
        }

        rules::optional_text(&mut errors, "seo_title", self.seo_title.as_deref(), MAX_SEO_TITLE_LENGTH);
        rules::optional_text(
            &mut errors,
            "seo_description",
            self.seo_description.as_deref(),
            MAX_SEO_DESCRIPTION_LENGTH,
        );
        rules::optional_text(&mut errors, "seo_keywords", self.seo_keywords.as_deref(), MAX_SEO_KEYWORDS_LENGTH);

        errors.into_result().map_err(CatalogError::from)
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub fn can_have_children(&self) -> bool {
        self.level < MAX_CATEGORY_LEVEL
    }

    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Whether `other` lives somewhere below this category
    pub fn is_ancestor_of(&self, other: &ProductCategory) -> bool {
        other.path.len() > self.path.len()
            && other.path.starts_with(&self.path)
            && other.path[self.path.len()..].starts_with('/')
    }

    /// Re-home this category. A changed parent is reported as
    /// `CategoryMove::Moved` so the caller can rebase descendants.
    pub fn move_to_parent(
        &mut self,
        parent: Option<&ProductCategory>,
        clock: &dyn Clock,
    ) -> Result<CategoryMove, CatalogError> {
        if parent.map(|p| p.id) == self.parent_id {
            return Ok(CategoryMove::Unchanged);
        }

        let slug = self.path_segments().last().map(str::to_string).unwrap_or_else(|| slugify(&self.name));
        let (parent_id, level, path) = match parent {
            None => (None, 0, format!("/{}", slug)),
            Some(p) => {
                if p.id == self.id {
                    return Err(CatalogError::SelfParent(self.id));
                }
                if self.is_ancestor_of(p) {
                    return Err(CatalogError::CyclicParent {
                        category: self.id,
                        parent: p.id,
                    });
                }
                if !p.can_have_children() {
                    return Err(CatalogError::DepthLimit { max: MAX_CATEGORY_LEVEL });
                }
                (Some(p.id), p.level + 1, format!("{}/{}", p.path, slug))
            }
        };

        let mut candidate = self.clone();
        candidate.parent_id = parent_id;
        candidate.level = level;
        candidate.path = path;
        candidate.validate()?;
        candidate.updated_at = clock.now();

        let outcome = CategoryMove::Moved {
            old_path: self.path.clone(),
            new_path: candidate.path.clone(),
            level_shift: i64::from(candidate.level) - i64::from(self.level),
        };
        *self = candidate;
        Ok(outcome)
    }

    /// Follow-up for a descendant of a moved category
    pub fn rebase_path(&mut self, moved: &CategoryMove, clock: &dyn Clock) -> Result<bool, CatalogError> {
        let CategoryMove::Moved { old_path, new_path, level_shift } = moved else {
            return Ok(false);
        };
        let Some(rest) = self.path.strip_prefix(old_path.as_str()).filter(|r| r.starts_with('/')) else {
            return Ok(false);
        };

        let level = i64::from(self.level) + level_shift;
        let level = u32::try_from(level)
            .map_err(|_| CatalogError::InvalidArgument(format!("level {} out of range", level)))?;

        let mut candidate = self.clone();
        candidate.path = format!("{}{}", new_path, rest);
        candidate.level = level;
        candidate.validate()?;
        candidate.updated_at = clock.now();
        *self = candidate;
        Ok(true)
    }
}

fn validate_path(errors: &mut ValidationErrors, path: &str) {
    if path.is_empty() {
        return;
    }
    if path.chars().count() > MAX_CATEGORY_PATH_LENGTH {
        errors.add("path", format!("must be at most {} characters", MAX_CATEGORY_PATH_LENGTH));
    }
    if !path.starts_with('/') {
        errors.add("path", "must start with '/'");
    }
    if path.len() > 1 && path.ends_with('/') || path == "/" {
        errors.add("path", "must not end with '/'");
    }
    let bad_segment = path
        .split('/')
        .skip(1)
        .any(|segment| !segment.is_empty() && !patterns::PATH_SEGMENT.is_match(segment));
    let empty_inner = path.trim_end_matches('/').split('/').skip(1).any(str::is_empty);
    if bad_segment || empty_inner {
        errors.add("path", "segments may only contain letters, digits, '-' and '_'");
    }
}
