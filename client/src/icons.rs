use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use serde::Deserialize;

use floormap_shared::LocationKind;

/// One icon descriptor as served by `GET /api/icons/{category}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IconEntry {
    pub url: String,
    pub name: String,
}

#[derive(Deserialize)]
struct IconListing {
    #[serde(default)]
    icons: Vec<IconEntry>,
}

static ICON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_icons_once(message: &str) {
    if ICON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        web_sys::console::warn_1(&message.into());
    }
}

/// Per-category icon listing cache, owned by the app root and shared through
/// context so markers never fetch individually.
///
/// Entries are write-once per category for the cache's lifetime: a second
/// `ensure()` for a category that is cached or in flight is a no-op. A failed
/// fetch caches an empty list for that category without blocking the others.
pub struct IconCache {
    entries: RefCell<HashMap<String, Vec<IconEntry>>>,
    in_flight: RefCell<HashSet<String>>,
    loading: RwSignal<u32>,
}

impl IconCache {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashSet::new()),
            loading: RwSignal::new(0),
        }
    }

    /// Cached entries for a category, if the fetch has completed.
    pub fn get(&self, category: &str) -> Option<Vec<IconEntry>> {
        self.entries.borrow().get(category).cloned()
    }

    /// Combined loading flag across all categories (reactive).
    pub fn is_loading(&self) -> bool {
        self.loading.get() > 0
    }

    /// Claim a category for fetching. Returns `false` when it is already
    /// cached or in flight — the memoization point.
    fn begin(&self, category: &str) -> bool {
        if self.entries.borrow().contains_key(category) {
            return false;
        }
        if !self.in_flight.borrow_mut().insert(category.to_string()) {
            return false;
        }
        self.loading.update(|n| *n += 1);
        true
    }

    fn complete(&self, category: &str, entries: Vec<IconEntry>) {
        self.entries
            .borrow_mut()
            .insert(category.to_string(), entries);
        self.in_flight.borrow_mut().remove(category);
        self.loading.update(|n| *n = n.saturating_sub(1));
    }

}

/// Fetch a category listing unless it is already cached or in flight.
pub fn ensure_category(cache: &Rc<IconCache>, category: &str) {
    if !cache.begin(category) {
        return;
    }
    let cache = cache.clone();
    let category = category.to_string();
    wasm_bindgen_futures::spawn_local(async move {
        let url = format!("/api/icons/{category}");
        let entries = match gloo_net::http::Request::get(&url).send().await {
            Ok(resp) if resp.ok() => resp
                .json::<IconListing>()
                .await
                .map(|listing| listing.icons)
                .unwrap_or_default(),
            _ => {
                warn_icons_once(&format!("icon listing fetch failed for {category}"));
                Vec::new()
            }
        };
        cache.complete(&category, entries);
    });
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Category path for a location kind. Workstation icons are split into
/// status-derived subfolders (`user/activ` vs `user/inactiv`).
pub fn icon_category(kind: LocationKind, status: Option<&str>) -> String {
    match kind {
        LocationKind::Workstation => {
            let sub = match status {
                Some(s) if s.eq_ignore_ascii_case("available") => "activ",
                _ => "inactiv",
            };
            format!("user/{sub}")
        }
        LocationKind::MeetingRoom => "meeting".to_string(),
        LocationKind::Socket => "socket".to_string(),
        LocationKind::Equipment => "equipment".to_string(),
        LocationKind::Camera => "camera".to_string(),
        LocationKind::Ac => "ac".to_string(),
        LocationKind::CommonArea => "common".to_string(),
        LocationKind::Other => "misc".to_string(),
    }
}
