//! Decoded-image cache for media cards.
//!
//! `HtmlImageElement`s decode asynchronously. The cache keeps one
//! element per media card (plus one per highlighter overlay), tracks
//! per-image settle state, and queues decoded aspect ratios for the
//! controller to fold back into the board on the next render. Failed
//! loads settle too, so preview capture never waits on a dead image.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use cb_core::model::ItemId;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlImageElement;

struct CachedImage {
    element: HtmlImageElement,
    /// Load finished, successfully or not.
    settled: Rc<Cell<bool>>,
}

pub struct ImageCache {
    base: HashMap<ItemId, CachedImage>,
    overlay: HashMap<ItemId, CachedImage>,
    /// `(item, width/height)` pairs reported by onload callbacks,
    /// drained by the controller.
    decoded: Rc<RefCell<Vec<(ItemId, f64)>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self {
            base: HashMap::new(),
            overlay: HashMap::new(),
            decoded: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Start decoding a card's image unless it is already cached.
    pub fn ensure_base(&mut self, id: ItemId, src: &str) {
        if self.base.contains_key(&id) {
            return;
        }
        if let Some(entry) = Self::start_load(id, src, Some(Rc::clone(&self.decoded))) {
            self.base.insert(id, entry);
        }
    }

    /// Start decoding a highlighter overlay unless it is already cached.
    pub fn ensure_overlay(&mut self, id: ItemId, src: &str) {
        if self.overlay.contains_key(&id) {
            return;
        }
        if let Some(entry) = Self::start_load(id, src, None) {
            self.overlay.insert(id, entry);
        }
    }

    fn start_load(
        id: ItemId,
        src: &str,
        report: Option<Rc<RefCell<Vec<(ItemId, f64)>>>>,
    ) -> Option<CachedImage> {
        let Ok(element) = HtmlImageElement::new() else {
            log::error!("image element creation failed for item {id}");
            return None;
        };
        let settled = Rc::new(Cell::new(false));

        let flag = Rc::clone(&settled);
        let img = element.clone();
        let onload = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            flag.set(true);
            if let Some(queue) = &report {
                let width = f64::from(img.natural_width());
                let height = f64::from(img.natural_height());
                if height > 0.0 {
                    queue.borrow_mut().push((id, width / height));
                }
            }
        }));
        element.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let flag = Rc::clone(&settled);
        let onerror = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            log::warn!("image for item {id} failed to decode");
            flag.set(true);
        }));
        element.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        element.set_src(src);
        Some(CachedImage { element, settled })
    }

    /// The card's image, once it decoded to real pixels.
    pub fn loaded_base(&self, id: ItemId) -> Option<&HtmlImageElement> {
        self.base
            .get(&id)
            .filter(|c| c.settled.get() && c.element.natural_width() > 0)
            .map(|c| &c.element)
    }

    pub fn loaded_overlay(&self, id: ItemId) -> Option<&HtmlImageElement> {
        self.overlay
            .get(&id)
            .filter(|c| c.settled.get() && c.element.natural_width() > 0)
            .map(|c| &c.element)
    }

    /// Whether a load for this item is still in flight.
    pub fn is_pending(&self, id: ItemId) -> bool {
        self.base.get(&id).is_some_and(|c| !c.settled.get())
    }

    pub fn remove(&mut self, id: ItemId) {
        self.base.remove(&id);
        self.overlay.remove(&id);
    }

    pub fn drop_overlay(&mut self, id: ItemId) {
        self.overlay.remove(&id);
    }

    pub fn clear(&mut self) {
        self.base.clear();
        self.overlay.clear();
        self.decoded.borrow_mut().clear();
    }

    /// Hand over the aspect ratios that arrived since the last drain.
    pub fn take_decoded(&mut self) -> Vec<(ItemId, f64)> {
        std::mem::take(&mut *self.decoded.borrow_mut())
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}
