//! Graph Sketch - interactive force-directed graph editing
//!
//! The core keeps an editable directed graph laid out by a continuously
//! running spring/repulsion simulation, and a multi-pointer gesture
//! controller that turns mouse and touch drags into graph edits. Pixels are
//! somebody else's job: drawing and hit testing go through a
//! [`render::RenderAdapter`] supplied by the host. The crate compiles to
//! WebAssembly and exposes [`GraphSketchWasm`] to JavaScript.
//!
//! # Architecture
//!
//! - `graph`: Directed multigraph over petgraph's StableGraph
//! - `layout`: Force-directed layout engine and initial placement
//! - `render`: Render adapter boundary and the headless spatial renderer
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `animation`: Frame-driven step loop
//! - `canvas`: The composition of all of the above
//! - `gesture`: Pointer drag state machine and editing behaviors
//! - `web`: requestAnimationFrame scheduler and JavaScript render adapter

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use js_sys::Function;
use tracing::warn;
use wasm_bindgen::prelude::*;

pub mod animation;
pub mod canvas;
pub mod error;
pub mod gesture;
pub mod graph;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod web;

use canvas::{CanvasOptions, GraphCanvas};
use error::GraphError;
use gesture::{GestureController, MouseKey, PointerEvent, PointerKind, TouchId, Tool};
use graph::{EdgeId, NodeId};
use layout::{ForceConfig, Viewport};
use web::{JsRenderAdapter, RafScheduler};

type WebCanvas = GraphCanvas<JsRenderAdapter, RafScheduler>;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for JavaScript.
///
/// Owns the canvas and one gesture controller each for the mouse and for
/// touches, both driven by the currently selected tool.
#[wasm_bindgen]
pub struct GraphSketchWasm {
    canvas: Rc<RefCell<WebCanvas>>,
    tool: Tool,
    mouse: GestureController<MouseKey, Tool>,
    touch: GestureController<TouchId, Tool>,
}

#[wasm_bindgen]
impl GraphSketchWasm {
    /// Create an empty canvas.
    ///
    /// # Arguments
    ///
    /// * `draw` - Called with one draw command object per node, edge or
    ///   preview draw, and with `{ kind: "release", key }` on removal
    /// * `options` - Partial `CanvasOptions`; `undefined` for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(draw: Option<Function>, options: JsValue) -> Result<GraphSketchWasm, JsError> {
        let options: CanvasOptions = if options.is_undefined() || options.is_null() {
            CanvasOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        if !(options.hit_radius.is_finite() && options.hit_radius > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "hit_radius must be positive, got {}",
                options.hit_radius
            ))
            .into());
        }

        let mut renderer = JsRenderAdapter::new(options.hit_radius);
        renderer.set_draw_callback(draw);
        let canvas = GraphCanvas::with_options(renderer, RafScheduler::new(), &options)?;
        let canvas = Rc::new(RefCell::new(canvas));

        let weak = Rc::downgrade(&canvas);
        canvas
            .borrow()
            .animation()
            .scheduler()
            .set_callback(move |frame| {
                let Some(canvas) = weak.upgrade() else {
                    return;
                };
                match canvas.try_borrow_mut() {
                    Ok(mut canvas) => {
                        canvas.on_animation_frame(frame);
                    }
                    Err(_) => warn!(frame, "canvas busy; animation frame dropped"),
                };
            });

        let tool = Tool::default();
        Ok(Self {
            canvas,
            tool,
            mouse: GestureController::new(tool),
            touch: GestureController::new(tool),
        })
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Create and place a node. Returns its id.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self) -> Result<u32, JsError> {
        Ok(self.canvas()?.add_node()?.0)
    }

    /// Remove a node and every edge touching it.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> Result<(), JsError> {
        self.canvas()?.remove_node(NodeId(node_id))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> Result<u32, JsError> {
        Ok(self.canvas()?.graph().node_count() as u32)
    }

    /// Ids of nodes sharing an edge with this one, either direction.
    pub fn neighbors(&self, node_id: u32) -> Result<Vec<u32>, JsError> {
        let neighbors = self.canvas()?.graph().neighbors(NodeId(node_id))?;
        Ok(neighbors.into_iter().map(|n| n.0).collect())
    }

    /// A node's position as `[x, y]`.
    #[wasm_bindgen(js_name = positionOf)]
    pub fn position_of(&self, node_id: u32) -> Result<Vec<f64>, JsError> {
        let position = self.canvas()?.position_of(NodeId(node_id))?;
        Ok(vec![position.x, position.y])
    }

    /// Move a node, zero its velocity and redraw it at the new spot.
    #[wasm_bindgen(js_name = setCoords)]
    pub fn set_coords(&mut self, node_id: u32, x: f64, y: f64) -> Result<(), JsError> {
        self.canvas()?.set_coords(NodeId(node_id), x, y)?;
        Ok(())
    }

    /// Pin a node in place (or release it).
    #[wasm_bindgen(js_name = setNodeLocked)]
    pub fn set_node_locked(&mut self, node_id: u32, locked: bool) -> Result<(), JsError> {
        self.canvas()?.set_locked(NodeId(node_id), locked)?;
        Ok(())
    }

    /// The node drawn under (x, y), if any.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f64, y: f64) -> Result<Option<u32>, JsError> {
        Ok(self.canvas()?.node_at(x, y).map(|n| n.0))
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect two existing nodes. Returns the edge id.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, from: u32, to: u32) -> Result<u32, JsError> {
        Ok(self.canvas()?.add_edge(NodeId(from), NodeId(to))?.id.0)
    }

    /// Remove one edge; its endpoints stay.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> Result<(), JsError> {
        self.canvas()?.remove_edge(EdgeId(edge_id))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> Result<u32, JsError> {
        Ok(self.canvas()?.graph().edge_count() as u32)
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) -> Result<(), JsError> {
        self.canvas()?.clear();
        Ok(())
    }

    /// Replace the graph with the built-in demo graph.
    #[wasm_bindgen(js_name = loadSample)]
    pub fn load_sample(&mut self) -> Result<Vec<u32>, JsError> {
        let mut canvas = self.canvas()?;
        canvas.clear();
        let nodes = canvas.load_sample()?;
        Ok(nodes.into_iter().map(|n| n.0).collect())
    }

    // =========================================================================
    // Layout & Animation
    // =========================================================================

    /// Run one simulation step and redraw.
    pub fn step(&mut self) -> Result<(), JsError> {
        self.canvas()?.step();
        Ok(())
    }

    #[wasm_bindgen(js_name = setRestLength)]
    pub fn set_rest_length(&mut self, rest_length: f64) -> Result<(), JsError> {
        self.canvas()?.set_rest_length(rest_length)?;
        Ok(())
    }

    /// Replace the force configuration. Missing fields take their defaults.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: ForceConfig = serde_wasm_bindgen::from_value(config)?;
        self.canvas()?.set_force_config(config)?;
        Ok(())
    }

    /// Bound initial placement to a width x height area.
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Result<(), JsError> {
        self.canvas()?.set_viewport(Some(Viewport::new(width, height)));
        Ok(())
    }

    #[wasm_bindgen(js_name = setAnimationEnabled)]
    pub fn set_animation_enabled(&mut self, enabled: bool) -> Result<(), JsError> {
        self.canvas()?.set_animation_enabled(enabled);
        Ok(())
    }

    #[wasm_bindgen(js_name = isAnimationEnabled)]
    pub fn is_animation_enabled(&self) -> Result<bool, JsError> {
        Ok(self.canvas()?.is_animation_enabled())
    }

    /// Call once the canvas element is in the document.
    pub fn mount(&mut self) -> Result<(), JsError> {
        self.canvas()?.mount();
        Ok(())
    }

    /// Call when the canvas element goes away. Stops the frame loop.
    pub fn unmount(&mut self) -> Result<(), JsError> {
        self.canvas()?.unmount();
        Ok(())
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Select the tool by name: `move_node`, `connect_existing` or
    /// `create_and_connect`. Drags in progress are cancelled.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsError> {
        let tool: Tool = name.parse()?;
        let mut canvas = busy(self.canvas.try_borrow_mut())?;
        if self.mouse.is_attached() {
            self.mouse.release(&mut *canvas)?;
        }
        if self.touch.is_attached() {
            self.touch.release(&mut *canvas)?;
        }
        self.tool = tool;
        self.mouse = GestureController::new(tool);
        self.touch = GestureController::new(tool);
        Ok(())
    }

    pub fn tool(&self) -> String {
        self.tool.name().to_string()
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        self.mouse_event(PointerKind::Down, x, y)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        self.mouse_event(PointerKind::Move, x, y)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        self.mouse_event(PointerKind::Up, x, y)
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        self.mouse_event(PointerKind::Cancel, x, y)
    }

    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, id: i32, x: f64, y: f64) -> Result<bool, JsError> {
        self.touch_event(id, PointerKind::Down, x, y)
    }

    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, id: i32, x: f64, y: f64) -> Result<bool, JsError> {
        self.touch_event(id, PointerKind::Move, x, y)
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, id: i32, x: f64, y: f64) -> Result<bool, JsError> {
        self.touch_event(id, PointerKind::Up, x, y)
    }

    #[wasm_bindgen(js_name = touchCancel)]
    pub fn touch_cancel(&mut self, id: i32, x: f64, y: f64) -> Result<bool, JsError> {
        self.touch_event(id, PointerKind::Cancel, x, y)
    }
}

impl GraphSketchWasm {
    fn canvas(&self) -> Result<RefMut<'_, WebCanvas>, JsError> {
        busy(self.canvas.try_borrow_mut())
    }

    fn mouse_event(&mut self, kind: PointerKind, x: f64, y: f64) -> Result<bool, JsError> {
        let mut canvas = busy(self.canvas.try_borrow_mut())?;
        let event = PointerEvent::new(MouseKey, kind, x, y);
        Ok(self.mouse.handle(&mut *canvas, event))
    }

    fn touch_event(&mut self, id: i32, kind: PointerKind, x: f64, y: f64) -> Result<bool, JsError> {
        let mut canvas = busy(self.canvas.try_borrow_mut())?;
        let event = PointerEvent::new(TouchId(id), kind, x, y);
        Ok(self.touch.handle(&mut *canvas, event))
    }
}

/// Gestures and frames are serialized by the event loop; a failed borrow
/// means JavaScript re-entered from inside a draw callback.
fn busy<T>(borrow: Result<T, std::cell::BorrowMutError>) -> Result<T, JsError> {
    borrow.map_err(|_| JsError::new("canvas is busy"))
}

impl Drop for GraphSketchWasm {
    fn drop(&mut self) {
        if let Ok(mut canvas) = self.canvas.try_borrow_mut() {
            canvas.unmount();
        }
    }
}
