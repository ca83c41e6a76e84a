use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};

use crate::app::{Found, Highlighted, VisibleItems, VisibleLocations};
use crate::cluster::{self, ClusterIndex, RenderItem};
use crate::colors::rgb_css;
use crate::floor::FloorImage;
use crate::paint::{self, PaintOp};
use crate::render_loop::RenderScheduler;
use crate::viewport::Viewport;

const CLICK_SLOP_PX: f64 = 5.0;
const RING_STROKE_WIDTH: f64 = 3.0;
const CLUSTER_ZOOM_STEP: f64 = -400.0;

/// Marker rendering pipeline host. Renders nothing at all — no canvas
/// element — until the floor image has decoded and the filtered location
/// set is non-empty; this holds across re-mounts.
#[component]
pub fn MarkerCanvas() -> impl IntoView {
    let floor_image: RwSignal<Option<FloorImage>> = expect_context();
    let VisibleLocations(locations) = expect_context();

    move || {
        let ready = floor_image.with(|f| f.is_some()) && locations.with(|l| !l.is_empty());
        ready.then(|| view! { <MarkerSurface /> })
    }
}

/// The single shared drawing surface. One canvas replaces per-marker DOM
/// nodes; every pass fully clears and repaints under the current viewport
/// transform.
#[component]
fn MarkerSurface() -> impl IntoView {
    let floor_image: RwSignal<Option<FloorImage>> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();
    let VisibleLocations(locations) = expect_context();
    let Highlighted(highlighted) = expect_context();
    let Found(found) = expect_context();
    let VisibleItems(visible_items) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Track drag state
    let is_dragging = Rc::new(Cell::new(false));
    let drag_start_x = Rc::new(Cell::new(0.0f64));
    let drag_start_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    // Spatial index over the current location set. Rebuilt in full when the
    // set changes; scale changes only re-query it.
    let index: Rc<RefCell<Option<ClusterIndex>>> = Rc::new(RefCell::new(None));

    // Last pass's paint ops, kept for click hit-testing.
    let painted_ops: Rc<RefCell<Vec<PaintOp>>> = Rc::new(RefCell::new(Vec::new()));
    let ops_for_click = painted_ops.clone();

    // Fit the floor image once on the first drawable pass.
    let fitted = Rc::new(Cell::new(false));

    let index_render = index.clone();
    let fitted_render = fitted.clone();
    let scheduler = RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;

        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let Some(image) = floor_image.get_untracked() else {
            return;
        };

        // Resize the backing store to the container with DPR supersampling.
        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let device_w = (w * dpr).round().max(1.0) as u32;
        let device_h = (h * dpr).round().max(1.0) as u32;
        if canvas.width() != device_w || canvas.height() != device_h {
            canvas.set_width(device_w);
            canvas.set_height(device_h);
        }

        if !fitted_render.get() {
            fitted_render.set(true);
            viewport.update(|vp| vp.fit_image(image.width, image.height, w, h));
        }
        let vp = viewport.get_untracked();

        // Clustering stage: fresh item list from the current set and scale.
        let items: Vec<RenderItem> = locations.with_untracked(|locs| {
            if cluster::clustering_active(vp.scale) {
                match &*index_render.borrow() {
                    Some(ix) => ix.items_at(locs, cluster::zoom_for_scale(vp.scale)),
                    // Index construction failed — degrade to raw markers.
                    None => locs.iter().cloned().map(RenderItem::Marker).collect(),
                }
            } else {
                locs.iter().cloned().map(RenderItem::Marker).collect()
            }
        });

        let hl: HashSet<String> = highlighted.get_untracked();
        let found_id = found.get_untracked();
        let ops = paint::plan(&items, image.width, image.height, &hl, found_id.as_deref());

        // Publish what this pass draws so list UI stays in sync with the map.
        visible_items.set(items);

        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            return;
        };

        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, device_w as f64, device_h as f64);

        ctx.save();
        let _ = ctx.scale(dpr, dpr);
        let _ = ctx.translate(vp.offset_x, vp.offset_y);
        let _ = ctx.scale(vp.scale, vp.scale);

        let _ = ctx.draw_image_with_html_image_element(&image.image, 0.0, 0.0);

        for op in &ops {
            match op {
                PaintOp::Marker(m) => draw_marker(&ctx, m),
                PaintOp::Cluster(c) => draw_cluster(&ctx, c),
            }
        }

        // Revert the transform so nothing leaks into the next pass.
        ctx.restore();

        *painted_ops.borrow_mut() = ops;
    });
    let scheduler = Rc::new(scheduler);

    // Rebuild the cluster index whenever the location set changes.
    let sched_index = scheduler.clone();
    let index_effect = index.clone();
    Effect::new(move || {
        locations.with(|locs| {
            *index_effect.borrow_mut() = ClusterIndex::build(locs).ok();
        });
        sched_index.mark_dirty();
    });

    // Highlight/found/image changes repaint without an index rebuild.
    let sched_state = scheduler.clone();
    Effect::new(move || {
        highlighted.track();
        found.track();
        floor_image.track();
        sched_state.mark_dirty();
    });

    // Pan/zoom changes re-query the existing index.
    let sched_vp = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        sched_vp.mark_dirty();
    });

    // Track the container across window resizes.
    if let Some(window) = web_sys::window() {
        let sched_resize = scheduler.clone();
        let closure = Rc::new(Closure::<dyn Fn()>::new(move || sched_resize.mark_dirty()));
        let _ =
            window.add_event_listener_with_callback("resize", (*closure).as_ref().unchecked_ref());
        let closure_cleanup = send_wrapper::SendWrapper::new(closure.clone());
        on_cleanup(move || {
            if let Some(window) = web_sys::window() {
                let _ = window.remove_event_listener_with_callback(
                    "resize",
                    (**closure_cleanup).as_ref().unchecked_ref(),
                );
            }
        });
    }

    // --- Input handlers ---

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let delta = e.delta_y();
        let x = e.offset_x() as f64;
        let y = e.offset_y() as f64;
        viewport.update(|vp| vp.zoom_at(delta, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            drag_start_x.set(e.client_x() as f64);
            drag_start_y.set(e.client_y() as f64);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                viewport.update(|vp| vp.pan(dx, dy));
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_click = {
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        move |e: MouseEvent| {
            let dx = (e.client_x() as f64 - drag_start_x.get()).abs();
            let dy = (e.client_y() as f64 - drag_start_y.get()).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let local = canvas_ref
                .get_untracked()
                .map(|el| {
                    let rect = el.get_bounding_client_rect();
                    (
                        e.client_x() as f64 - rect.left(),
                        e.client_y() as f64 - rect.top(),
                    )
                })
                .unwrap_or((e.offset_x() as f64, e.offset_y() as f64));
            let vp = viewport.get_untracked();
            let (wx, wy) = vp.screen_to_world(local.0, local.1);

            enum Hit {
                Marker(String),
                Cluster(f64, f64),
                None,
            }
            let hit = match paint::hit_test(&ops_for_click.borrow(), wx, wy) {
                Some(PaintOp::Marker(m)) => Hit::Marker(m.id.clone()),
                Some(PaintOp::Cluster(c)) => Hit::Cluster(c.x, c.y),
                None => Hit::None,
            };
            match hit {
                Hit::Marker(id) => {
                    if found.get_untracked().as_deref() != Some(id.as_str()) {
                        found.set(Some(id));
                    }
                }
                // Zoom one step toward a cluster; the next pass re-queries
                // the index at the new zoom level.
                Hit::Cluster(cx, cy) => {
                    let (sx, sy) = vp.world_to_screen(cx, cy);
                    viewport.update(|v| v.zoom_at(CLUSTER_ZOOM_STEP, sx, sy));
                }
                Hit::None => {
                    if found.get_untracked().is_some() {
                        found.set(None);
                    }
                }
            }
        }
    };

    view! {
        <div
            style="position: relative; width: 100%; height: 100%; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}

fn draw_marker(ctx: &CanvasRenderingContext2d, m: &paint::MarkerPaint) {
    if let Some((r, g, b)) = m.ring {
        ctx.begin_path();
        let _ = ctx.arc(m.x, m.y, m.radius + paint::RING_EXTRA, 0.0, TAU);
        ctx.set_stroke_style_str(&rgb_css(r, g, b));
        ctx.set_line_width(RING_STROKE_WIDTH);
        ctx.stroke();
    }

    ctx.begin_path();
    let _ = ctx.arc(m.x, m.y, m.radius, 0.0, TAU);
    let (r, g, b) = m.fill;
    ctx.set_fill_style_str(&rgb_css(r, g, b));
    ctx.fill();
    ctx.set_stroke_style_str("#ffffff");
    ctx.set_line_width(paint::MARKER_STROKE_WIDTH);
    ctx.stroke();

    if let Some(label) = &m.label
        && !label.is_empty()
    {
        ctx.set_font("10px 'Inter', system-ui, sans-serif");
        ctx.set_text_align("center");
        ctx.set_fill_style_str("#ffffff");
        let _ = ctx.fill_text(label, m.x, m.y + 3.5);
    }
}

fn draw_cluster(ctx: &CanvasRenderingContext2d, c: &paint::ClusterPaint) {
    ctx.begin_path();
    let _ = ctx.arc(c.x, c.y, c.radius, 0.0, TAU);
    let (r, g, b) = paint::CLUSTER_FILL;
    ctx.set_fill_style_str(&rgb_css(r, g, b));
    ctx.fill();
    ctx.set_stroke_style_str("#ffffff");
    ctx.set_line_width(paint::MARKER_STROKE_WIDTH);
    ctx.stroke();

    ctx.set_font("bold 12px 'Inter', system-ui, sans-serif");
    ctx.set_text_align("center");
    ctx.set_fill_style_str("#ffffff");
    let _ = ctx.fill_text(&c.count.to_string(), c.x, c.y + 4.0);
}
