use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use web_sys::HtmlImageElement;

/// A decoded floor-plan image with its intrinsic size. No marker is drawn
/// until the active floor's image has finished decoding.
#[derive(Clone)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub struct FloorImage {
    pub url: String,
    pub image: HtmlImageElement,
    pub width: f64,
    pub height: f64,
}

static FLOOR_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_floor_once(message: &str) {
    if FLOOR_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        web_sys::console::warn_1(&message.into());
    }
}

/// Write-once decode cache keyed by image URL, owned by the app root.
/// Switching back to an already-visited floor reuses the decoded image
/// instead of refetching it.
#[derive(Default)]
pub struct FloorImageCache {
    decoded: RefCell<HashMap<String, FloorImage>>,
}

impl FloorImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, url: &str) -> Option<FloorImage> {
        self.decoded.borrow().get(url).cloned()
    }

    fn insert(&self, image: FloorImage) {
        self.decoded.borrow_mut().insert(image.url.clone(), image);
    }
}

/// Load (or recall) the floor image for `url` into `slot`. Decodes are not
/// cancelable; a completion for a floor the user already navigated away from
/// still lands in the cache but never overwrites the slot.
pub fn load_floor_image(
    cache: Rc<FloorImageCache>,
    url: String,
    slot: RwSignal<Option<FloorImage>>,
    current_url: RwSignal<String>,
) {
    slot.set(None);
    if let Some(image) = cache.get(&url) {
        slot.set(Some(image));
        return;
    }
    wasm_bindgen_futures::spawn_local(async move {
        let Ok(image) = HtmlImageElement::new() else {
            warn_floor_once("Failed to create floor image element.");
            return;
        };
        image.set_src(&url);
        match wasm_bindgen_futures::JsFuture::from(image.decode()).await {
            Ok(_) => {
                let decoded = FloorImage {
                    url: url.clone(),
                    width: image.natural_width() as f64,
                    height: image.natural_height() as f64,
                    image,
                };
                cache.insert(decoded.clone());
                // Stale completion after a floor switch: cache it, skip the slot.
                if current_url.get_untracked() == url {
                    slot.set(Some(decoded));
                }
            }
            Err(err) => {
                warn_floor_once(&format!("Failed to decode floor image {url}: {err:?}"));
            }
        }
    });
}
