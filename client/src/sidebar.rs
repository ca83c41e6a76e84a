use leptos::prelude::*;
use wasm_bindgen::JsCast;

use floormap_shared::{resolve_color, Location, LocationKind};

use crate::app::{canvas_dimensions, Found, SidebarOpen, VisibleItems};
use crate::cluster::RenderItem;
use crate::colors::rgb_css;
use crate::floor::FloorImage;
use crate::viewport::Viewport;

/// Sidebar with search and the location list. The list mirrors exactly what
/// the last render pass drew — markers and cluster bubbles alike — so the
/// map and the list never disagree.
#[component]
pub fn Sidebar() -> impl IntoView {
    let SidebarOpen(sidebar_open) = expect_context();

    move || {
        sidebar_open.get().then(|| {
            view! {
                <div style="display: flex; flex-direction: column; width: 300px; height: 100%; background: #1a1d2a; border-right: 1px solid #282c3e; overflow: hidden;">
                    <SearchBar />
                    <ItemList />
                </div>
            }
        })
    }
}

#[component]
fn SearchBar() -> impl IntoView {
    let search_query: RwSignal<String> = expect_context();

    let on_input = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        search_query.set(input.value());
    };

    view! {
        <div style="padding: 10px;">
            <input
                style="width: 100%; padding: 8px 12px; background: #11131d; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-size: 0.9rem; outline: none;"
                type="text"
                placeholder="Search by name or department..."
                prop:value=move || search_query.get()
                on:input=on_input
            />
        </div>
    }
}

#[component]
fn ItemList() -> impl IntoView {
    let VisibleItems(visible_items) = expect_context();

    view! {
        <div style="flex: 1; overflow-y: auto; padding: 0 6px 10px 6px;">
            <For
                each=move || visible_items.get()
                key=|item| item.key().to_string()
                children=|item| match item {
                    RenderItem::Marker(loc) => view! { <LocationRow loc /> }.into_any(),
                    RenderItem::Cluster(c) => view! {
                        <div style="padding: 8px 10px; margin: 2px 0; border-radius: 6px; color: #8a8fa3; font-size: 0.82rem;">
                            {format!("{} locations (zoom in to expand)", c.count)}
                        </div>
                    }
                    .into_any(),
                }
            />
        </div>
    }
}

#[component]
fn LocationRow(loc: Location) -> impl IntoView {
    let Found(found) = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();
    let floor_image: RwSignal<Option<FloorImage>> = expect_context();

    let id = loc.id.clone();
    let (x_pct, y_pct) = (loc.x_pct(), loc.y_pct());
    let (r, g, b) = resolve_color(&loc).rgb();
    let title = if loc.name.is_empty() {
        loc.id.clone()
    } else {
        loc.name.clone()
    };
    let subtitle = match loc.kind {
        // Sockets have no assignee; show the port and the last switch poll.
        LocationKind::Socket => {
            let sync = loc
                .custom_fields
                .status_last_sync()
                .map(|dt| format!("synced {}", dt.format("%Y-%m-%d %H:%M")));
            match (loc.custom_fields.port.clone(), sync) {
                (Some(port), Some(sync)) => Some(format!("{port}, {sync}")),
                (Some(port), None) => Some(port),
                (None, sync) => sync,
            }
        }
        _ => loc.employee.clone().or_else(|| loc.department.clone()),
    };

    // The find action: highlight the marker and pan the map to it.
    let on_find = move |_| {
        found.set(Some(id.clone()));
        if let Some(image) = floor_image.get_untracked() {
            let (w, h) = canvas_dimensions();
            viewport.update(|vp| {
                vp.center_on(
                    image.width * x_pct / 100.0,
                    image.height * y_pct / 100.0,
                    w,
                    h,
                )
            });
        }
    };

    let row_style = move || {
        let active = found.get().as_deref() == Some(loc.id.as_str());
        let background = if active { "#282c3e" } else { "transparent" };
        format!(
            "display: flex; align-items: center; gap: 8px; padding: 8px 10px; margin: 2px 0; border-radius: 6px; cursor: pointer; background: {background};"
        )
    };

    view! {
        <div style=row_style on:click=on_find>
            <span style=format!(
                "width: 10px; height: 10px; border-radius: 50%; flex-shrink: 0; background: {};",
                rgb_css(r, g, b)
            ) />
            <div style="min-width: 0;">
                <div style="color: #e2e0d8; font-size: 0.88rem; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;">
                    {title}
                </div>
                {subtitle.map(|s| view! {
                    <div style="color: #8a8fa3; font-size: 0.75rem; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;">
                        {s}
                    </div>
                })}
            </div>
        </div>
    }
}
