use leptos::prelude::*;
use serde::Deserialize;
use wasm_bindgen_futures::spawn_local;

use floormap_shared::Location;

/// One floor as served by `GET /api/floors`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Floor {
    pub id: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

pub async fn fetch_floors() -> Result<Vec<Floor>, String> {
    let resp = gloo_net::http::Request::get("/api/floors")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<Floor>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

pub fn load_floors(store: RwSignal<Vec<Floor>>) {
    spawn_local(async move {
        match fetch_floors().await {
            Ok(floors) => store.set(floors),
            Err(e) => {
                web_sys::console::warn_1(&format!("floor list fetch failed: {e}").into());
            }
        }
    });
}

/// Fetch the location set for a floor.
pub async fn fetch_floor_locations(floor_id: &str) -> Result<Vec<Location>, String> {
    let url = format!(
        "/api/locations?floor={}",
        js_sys::encode_uri_component(floor_id)
            .as_string()
            .unwrap_or_default()
    );
    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<Location>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Load a floor's locations into the store signal. A transient failure
/// degrades to an empty set; the map simply renders without markers until
/// the next refresh.
pub fn load_locations(floor_id: String, store: RwSignal<Vec<Location>>) {
    spawn_local(async move {
        match fetch_floor_locations(&floor_id).await {
            Ok(locations) => store.set(locations),
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("location fetch failed for floor {floor_id}: {e}").into(),
                );
                store.set(Vec::new());
            }
        }
    });
}
