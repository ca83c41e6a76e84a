use std::collections::HashSet;
use std::rc::Rc;

use gloo_storage::Storage;
use leptos::prelude::*;

use floormap_shared::{Location, filter_locations};

use crate::canvas::MarkerCanvas;
use crate::cluster::RenderItem;
use crate::floor::{FloorImage, FloorImageCache, load_floor_image};
use crate::icons::{IconCache, ensure_category, icon_category};
use crate::locations::{Floor, load_floors, load_locations};
use crate::sidebar::Sidebar;
use crate::viewport::Viewport;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

/// Newtype wrappers so signals of the same inner type stay distinct in Leptos
/// context. (Without wrappers, `provide_context` overwrites one with the other.)
#[derive(Clone, Copy)]
pub(crate) struct Found(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct Highlighted(pub RwSignal<HashSet<String>>);
#[derive(Clone, Copy)]
pub(crate) struct SidebarOpen(pub RwSignal<bool>);
/// The search-filtered location set — the clustering stage's input.
#[derive(Clone, Copy)]
pub(crate) struct VisibleLocations(pub RwSignal<Vec<Location>>);
/// What the last render pass actually drew, published for the list UI.
#[derive(Clone, Copy)]
pub(crate) struct VisibleItems(pub RwSignal<Vec<RenderItem>>);

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    sidebar_open: bool,
    floor: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            floor: String::new(),
        }
    }
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get("floormap_settings").unwrap_or_default();

    // Global signals
    let locations: RwSignal<Vec<Location>> = RwSignal::new(Vec::new());
    let visible_locations: RwSignal<Vec<Location>> = RwSignal::new(Vec::new());
    let visible_items: RwSignal<Vec<RenderItem>> = RwSignal::new(Vec::new());
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let search_query: RwSignal<String> = RwSignal::new(String::new());
    let found: RwSignal<Option<String>> = RwSignal::new(None);
    let highlighted: RwSignal<HashSet<String>> = RwSignal::new(HashSet::new());
    let sidebar_open: RwSignal<bool> = RwSignal::new(saved.sidebar_open);

    let floors: RwSignal<Vec<Floor>> = RwSignal::new(Vec::new());
    let floor: RwSignal<String> = RwSignal::new(saved.floor);
    let floor_image: RwSignal<Option<FloorImage>> = RwSignal::new(None);
    let floor_url: RwSignal<String> = RwSignal::new(String::new());

    let image_cache = Rc::new(FloorImageCache::new());
    let icon_cache = Rc::new(IconCache::new());

    // Provide via context so children can access
    provide_context(viewport);
    provide_context(search_query);
    provide_context(floor_image);
    provide_context(Found(found));
    provide_context(Highlighted(highlighted));
    provide_context(SidebarOpen(sidebar_open));
    provide_context(VisibleLocations(visible_locations));
    provide_context(VisibleItems(visible_items));

    // Persist settings to localStorage on any change
    Effect::new(move || {
        let settings = Settings {
            sidebar_open: sidebar_open.get(),
            floor: floor.get(),
        };
        let _ = gloo_storage::LocalStorage::set("floormap_settings", &settings);
    });

    // Fetch the floor list on mount.
    Effect::new(move || {
        load_floors(floors);
    });

    // Adopt the first floor once the list arrives, unless a saved floor is
    // still present in it.
    Effect::new(move || {
        floors.with(|list| {
            if list.is_empty() {
                return;
            }
            let current = floor.get_untracked();
            if !list.iter().any(|f| f.id == current) {
                floor.set(list[0].id.clone());
            }
        });
    });

    // Floor switch: restart the image decode and the location fetch, and
    // drop marker state belonging to the previous floor. Also tracks the
    // floor list so a floor saved from a previous session loads once the
    // list arrives.
    let image_cache_floor = image_cache.clone();
    Effect::new(move || {
        let id = floor.get();
        if id.is_empty() {
            return;
        }
        let Some(url) = floors.with(|list| {
            list.iter()
                .find(|f| f.id == id)
                .map(|f| f.image_url.clone())
        }) else {
            return;
        };
        found.set(None);
        viewport.set(Viewport::default());
        floor_url.set(url.clone());
        load_floor_image(image_cache_floor.clone(), url, floor_image, floor_url);
        load_locations(id, locations);
    });

    // Search stage: the render pipeline only ever sees the filtered set.
    // Non-empty queries also drive the highlight rings.
    Effect::new(move || {
        let query = search_query.get();
        locations.with(|locs| {
            let filtered = filter_locations(locs, &query);
            if query.trim().is_empty() {
                highlighted.set(HashSet::new());
            } else {
                highlighted.set(filtered.iter().map(|l| l.id.clone()).collect());
            }
            if filtered.is_empty() {
                // Canvas unmounts on an empty set; clear the list mirror too.
                visible_items.set(Vec::new());
            }
            visible_locations.set(filtered);
        });
    });

    // Warm the icon cache for every category the current floor needs.
    let icon_cache_warm = icon_cache.clone();
    Effect::new(move || {
        locations.with(|locs| {
            for loc in locs {
                ensure_category(&icon_cache_warm, &icon_category(loc.kind, loc.status.as_deref()));
            }
        });
    });

    let toggle_sidebar = move |_| sidebar_open.update(|open| *open = !*open);
    let icon_cache_header = icon_cache.clone();

    view! {
        <div style="display: flex; width: 100vw; height: 100vh; background: #11131d; font-family: 'Inter', system-ui, sans-serif;">
            <Sidebar />
            <div style="flex: 1; display: flex; flex-direction: column; min-width: 0;">
                <div style="display: flex; align-items: center; gap: 8px; padding: 8px 12px; background: #1a1d2a; border-bottom: 1px solid #282c3e;">
                    <button
                        style="padding: 6px 10px; background: #11131d; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; cursor: pointer;"
                        on:click=toggle_sidebar
                    >
                        {move || if sidebar_open.get() { "Hide list" } else { "Show list" }}
                    </button>
                    <For
                        each=move || floors.get()
                        key=|f| f.id.clone()
                        children=move |f: Floor| {
                            let id = f.id.clone();
                            let id_style = f.id.clone();
                            let style = move || {
                                let active = floor.get() == id_style;
                                let (bg, fg) = if active {
                                    ("#3b70ca", "#ffffff")
                                } else {
                                    ("#11131d", "#8a8fa3")
                                };
                                format!(
                                    "padding: 6px 10px; background: {bg}; border: 1px solid #282c3e; border-radius: 6px; color: {fg}; cursor: pointer;"
                                )
                            };
                            view! {
                                <button style=style on:click=move |_| floor.set(id.clone())>
                                    {f.name.clone()}
                                </button>
                            }
                        }
                    />
                    {
                        let cache = send_wrapper::SendWrapper::new(icon_cache_header.clone());
                        move || {
                            cache.is_loading().then(|| {
                                view! {
                                    <span style="margin-left: auto; color: #8a8fa3; font-size: 0.8rem;">
                                        "Loading icons..."
                                    </span>
                                }
                            })
                        }
                    }
                </div>
                <div style="flex: 1; position: relative; min-height: 0;">
                    <MarkerCanvas />
                </div>
            </div>
        </div>
    }
}
