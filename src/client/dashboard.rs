use thiserror::Error;

use crate::model::{BackupPayload, Category, Link, SaveRequest, SiteSettings, Snapshot};

#[derive(Error, Debug, PartialEq)]
pub enum DashboardError {
    #[error("link not found: {0}")]
    LinkNotFound(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
}

/// Fields the user edits when adding or changing a link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub category_id: String,
    pub pinned: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: String,
    pub password: Option<String>,
}

/// In-memory copy of the snapshot the user is editing.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub links: Vec<Link>,
    pub categories: Vec<Category>,
    pub settings: SiteSettings,
    pub timestamp: i64,
}

impl From<Snapshot> for Dashboard {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            links: snapshot.links,
            categories: snapshot.categories,
            settings: snapshot.settings,
            timestamp: snapshot.timestamp,
        }
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_lowercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Dashboard {
    /// The full state as posted back to the storage endpoint. The server picks
    /// the timestamp.
    pub fn to_save_request(&self) -> SaveRequest {
        SaveRequest {
            links: self.links.clone(),
            categories: self.categories.clone(),
            settings: Some(self.settings.clone()),
            ai_config: None,
            search_engines: None,
            timestamp: None,
        }
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    fn link_mut(&mut self, id: &str) -> Result<&mut Link, DashboardError> {
        self.links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| DashboardError::LinkNotFound(id.to_string()))
    }

    fn next_id(&self, now: i64) -> String {
        let mut candidate = now;
        while self.links.iter().any(|l| l.id == candidate.to_string())
            || self.categories.iter().any(|c| c.id == candidate.to_string())
        {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn next_pinned_order(&self) -> i64 {
        self.links
            .iter()
            .filter(|l| l.is_pinned())
            .filter_map(|l| l.pinned_order)
            .max()
            .map_or(0, |max| max + 1)
    }

    pub fn add_link(&mut self, draft: LinkDraft, now: i64) -> String {
        let id = self.next_id(now);
        let pinned_order = draft.pinned.then(|| self.next_pinned_order());
        self.links.push(Link {
            id: id.clone(),
            title: draft.title,
            url: draft.url,
            icon: non_empty(draft.icon),
            description: non_empty(draft.description),
            category_id: draft.category_id,
            created_at: now,
            pinned: draft.pinned.then_some(true),
            pinned_order,
        });
        id
    }

    /// Replaces the editable fields of a link. `createdAt` is kept; pin order is
    /// kept while the link stays pinned.
    pub fn update_link(&mut self, id: &str, draft: LinkDraft) -> Result<(), DashboardError> {
        let next_order = self.next_pinned_order();
        let link = self.link_mut(id)?;
        let pinned_order = match (link.is_pinned(), draft.pinned) {
            (_, false) => None,
            (true, true) => link.pinned_order.or(Some(next_order)),
            (false, true) => Some(next_order),
        };

        link.title = draft.title;
        link.url = draft.url;
        if let Some(icon) = non_empty(draft.icon) {
            link.icon = Some(icon);
        }
        link.description = non_empty(draft.description);
        link.category_id = draft.category_id;
        link.pinned = draft.pinned.then_some(true);
        link.pinned_order = pinned_order;
        Ok(())
    }

    pub fn delete_link(&mut self, id: &str) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l.id != id);
        self.links.len() != before
    }

    pub fn set_link_icon(&mut self, id: &str, icon: Option<String>) -> Result<(), DashboardError> {
        self.link_mut(id)?.icon = non_empty(icon);
        Ok(())
    }

    /// Flips the pin flag and returns the new state.
    pub fn toggle_pin(&mut self, id: &str) -> Result<bool, DashboardError> {
        let next_order = self.next_pinned_order();
        let link = self.link_mut(id)?;
        if link.is_pinned() {
            link.pinned = None;
            link.pinned_order = None;
            Ok(false)
        } else {
            link.pinned = Some(true);
            link.pinned_order = Some(next_order);
            Ok(true)
        }
    }

    /// Pinned links in display order: explicit order first, then by creation.
    pub fn pinned_links(&self) -> Vec<&Link> {
        let mut pinned: Vec<&Link> = self.links.iter().filter(|l| l.is_pinned()).collect();
        pinned.sort_by_key(|l| (l.pinned_order.is_none(), l.pinned_order, l.created_at));
        pinned
    }

    pub fn links_in_category(&self, category_id: &str) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| l.category_id == category_id)
            .collect()
    }

    /// Advisory duplicate check; saving a duplicate is still allowed.
    pub fn find_duplicate(&self, url: &str, exclude_id: Option<&str>) -> Option<&Link> {
        let wanted = normalize_url(url);
        if wanted.is_empty() {
            return None;
        }
        self.links
            .iter()
            .filter(|l| Some(l.id.as_str()) != exclude_id)
            .find(|l| normalize_url(&l.url) == wanted)
    }

    pub fn add_category(&mut self, draft: CategoryDraft, now: i64) -> String {
        let id = self.next_id(now);
        self.categories.push(Category {
            id: id.clone(),
            name: draft.name,
            icon: draft.icon,
            password: non_empty(draft.password),
        });
        id
    }

    pub fn update_category(&mut self, id: &str, draft: CategoryDraft) -> Result<(), DashboardError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DashboardError::CategoryNotFound(id.to_string()))?;
        category.name = draft.name;
        category.icon = draft.icon;
        category.password = non_empty(draft.password);
        Ok(())
    }

    /// Removes the category only. Links that point at it are left as they are.
    pub fn delete_category(&mut self, id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        self.categories.len() != before
    }

    /// Soft gate for password-protected categories.
    pub fn unlock_category(&self, id: &str, password: &str) -> Result<bool, DashboardError> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DashboardError::CategoryNotFound(id.to_string()))?;
        Ok(match &category.password {
            Some(expected) => expected == password,
            None => true,
        })
    }

    pub fn backup_payload(&self) -> BackupPayload {
        BackupPayload {
            links: self.links.clone(),
            categories: self.categories.clone(),
        }
    }

    pub fn restore(&mut self, backup: BackupPayload) {
        self.links = backup.links;
        self.categories = backup.categories;
    }
}
