//! Browser bindings: a `requestAnimationFrame` scheduler and a render
//! adapter that forwards draw calls to JavaScript.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::animation::FrameScheduler;
use crate::graph::{Edge, NodeId};
use crate::layout::Vec2;
use crate::render::{Preview, RenderAdapter, SpatialRenderer, SpriteSet};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Request id returned when the browser refused a frame; never delivered.
const NO_FRAME: i32 = -1;

// =============================================================================
// Frame Scheduling
// =============================================================================

/// [`FrameScheduler`] over `window.requestAnimationFrame`.
///
/// The browser calls back with a timestamp only, so the scheduler remembers
/// the id it last requested and hands that to the installed callback.
pub struct RafScheduler {
    window: Option<Window>,
    callback: FrameCallback,
    requested: Rc<Cell<Option<i32>>>,
}

impl RafScheduler {
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
            callback: Rc::new(RefCell::new(None)),
            requested: Rc::new(Cell::new(None)),
        }
    }

    /// Install the function run on every delivered frame. It receives the
    /// request id the frame was scheduled under.
    pub fn set_callback(&self, mut on_frame: impl FnMut(i32) + 'static) {
        let requested = Rc::clone(&self.requested);
        let closure = Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Some(frame) = requested.take() {
                on_frame(frame);
            }
        }) as Box<dyn FnMut(f64)>);
        *self.callback.borrow_mut() = Some(closure);
    }
}

impl Default for RafScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> i32 {
        let Some(window) = &self.window else {
            warn!("no window; animation frame not requested");
            return NO_FRAME;
        };
        let callback = self.callback.borrow();
        let Some(closure) = callback.as_ref() else {
            warn!("no frame callback installed");
            return NO_FRAME;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => {
                self.requested.set(Some(id));
                id
            }
            Err(err) => {
                warn!(?err, "requestAnimationFrame failed");
                NO_FRAME
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        if self.requested.get() == Some(handle) {
            self.requested.set(None);
        }
        if handle == NO_FRAME {
            return;
        }
        if let Some(window) = &self.window {
            if let Err(err) = window.cancel_animation_frame(handle) {
                warn!(?err, "cancelAnimationFrame failed");
            }
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// One instruction for the JavaScript renderer.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand<'a> {
    Node {
        key: &'a str,
        id: u32,
        x: f64,
        y: f64,
        radius: f64,
    },
    Edge {
        key: &'a str,
        id: u32,
        from: u32,
        to: u32,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Preview {
        key: &'a str,
        #[serde(flatten)]
        preview: &'a Preview,
    },
    Release {
        key: &'a str,
    },
}

/// Per-object handles: the hit-testing sprites plus the key JavaScript
/// knows the object by.
#[derive(Debug, Default)]
pub struct JsHandles {
    sprites: SpriteSet,
    key: Option<String>,
}

/// Render adapter that serializes every draw into a [`DrawCommand`] and
/// passes it to a JavaScript callback. Hit testing stays on the Rust side.
pub struct JsRenderAdapter {
    hits: SpatialRenderer,
    draw: Option<Function>,
    next_preview: u32,
}

impl JsRenderAdapter {
    pub fn new(radius: f64) -> Self {
        Self {
            hits: SpatialRenderer::new(radius),
            draw: None,
            next_preview: 0,
        }
    }

    pub fn set_draw_callback(&mut self, draw: Option<Function>) {
        self.draw = draw;
    }

    fn emit(&self, command: &DrawCommand<'_>) {
        let Some(draw) = &self.draw else {
            return;
        };
        match serde_wasm_bindgen::to_value(command) {
            Ok(value) => {
                if let Err(err) = draw.call1(&JsValue::NULL, &value) {
                    warn!(?err, "draw callback threw");
                }
            }
            Err(err) => warn!(%err, "draw command not serializable"),
        }
    }
}

impl RenderAdapter for JsRenderAdapter {
    type Handles = JsHandles;

    fn draw_node(&mut self, node: NodeId, position: Vec2, handles: &mut JsHandles) {
        self.hits.draw_node(node, position, &mut handles.sprites);
        let key = handles
            .key
            .get_or_insert_with(|| format!("node:{}", node.0))
            .as_str();
        self.emit(&DrawCommand::Node {
            key,
            id: node.0,
            x: position.x,
            y: position.y,
            radius: self.hits.radius(),
        });
    }

    fn draw_edge(&mut self, edge: &Edge, from: Vec2, to: Vec2, handles: &mut JsHandles) {
        self.hits.draw_edge(edge, from, to, &mut handles.sprites);
        let key = handles
            .key
            .get_or_insert_with(|| format!("edge:{}", edge.id.0))
            .as_str();
        self.emit(&DrawCommand::Edge {
            key,
            id: edge.id.0,
            from: edge.from.0,
            to: edge.to.0,
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
        });
    }

    fn draw_preview(&mut self, preview: &Preview, handles: &mut JsHandles) {
        self.hits.draw_preview(preview, &mut handles.sprites);
        if handles.key.is_none() {
            handles.key = Some(format!("preview:{}", self.next_preview));
            self.next_preview = self.next_preview.wrapping_add(1);
        }
        if let Some(key) = &handles.key {
            self.emit(&DrawCommand::Preview {
                key: key.as_str(),
                preview,
            });
        }
    }

    fn release(&mut self, handles: JsHandles) {
        if let Some(key) = &handles.key {
            self.emit(&DrawCommand::Release { key: key.as_str() });
        }
        self.hits.release(handles.sprites);
    }

    fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.hits.hit_test(x, y)
    }
}
