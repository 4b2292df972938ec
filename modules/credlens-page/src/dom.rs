use std::collections::BTreeMap;

// =============================================================================
// Element
// =============================================================================

/// Stable handle to an element within one `Document`. Handles from one
/// document must not be used against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// Rendered box of an element, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub width: f32,
    pub height: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(width: f32, height: f32, top: f32) -> Self {
        Self {
            width,
            height,
            top,
            bottom: top + height,
        }
    }
}

/// The slice of computed style the eligibility and overlay rules read.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f32,
    pub position: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            position: "static".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    rect: Rect,
    computed: ComputedStyle,
    inline_style: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    detached: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: String::new(),
            rect: Rect::default(),
            computed: ComputedStyle::default(),
            inline_style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            detached: false,
        }
    }

    // --- builders ---

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text_content(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn computed(mut self, computed: ComputedStyle) -> Self {
        self.computed = computed;
        self
    }

    pub fn inline(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.inline_style.insert(property.into(), value.into());
        self
    }

    // --- accessors ---

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn computed_style(&self) -> &ComputedStyle {
        &self.computed
    }

    /// Explicit inline style value, as authored. Empty result means the
    /// property was never set inline.
    pub fn inline_style(&self, property: &str) -> Option<&str> {
        self.inline_style.get(property).map(String::as_str)
    }

    pub fn set_inline_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        // Inline styles win over computed; mirror the override locally so
        // later reads observe the effective position.
        if property == "position" {
            self.computed.position = value.clone();
        }
        self.inline_style.insert(property, value);
    }

    pub fn remove_inline_style(&mut self, property: &str) {
        self.inline_style.remove(property);
        if property == "position" {
            self.computed.position = "static".to_string();
        }
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

// =============================================================================
// Document
// =============================================================================

/// Arena-backed element tree plus the page context the scan rules need
/// (origin, scheme, viewport height). Elements are appended in document
/// order; removal detaches a subtree without invalidating other handles.
#[derive(Debug, Clone)]
pub struct Document {
    origin: String,
    scheme: String,
    viewport_height: f32,
    nodes: Vec<Element>,
}

const DEFAULT_VIEWPORT_HEIGHT: f32 = 900.0;

impl Document {
    /// `origin` is scheme + host, e.g. `https://example.com`.
    pub fn new(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/').to_string();
        let scheme = match url::Url::parse(&origin) {
            Ok(parsed) => format!("{}:", parsed.scheme()),
            Err(_) => "https:".to_string(),
        };
        Self {
            origin,
            scheme,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            nodes: Vec::new(),
        }
    }

    pub fn with_viewport_height(mut self, height: f32) -> Self {
        self.viewport_height = height;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Page scheme including the trailing colon, e.g. `https:`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Append an element, optionally under a parent. Returns its handle.
    pub fn append(&mut self, parent: Option<ElementId>, mut element: Element) -> ElementId {
        let id = ElementId(self.nodes.len());
        element.parent = parent;
        self.nodes.push(element);
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent_id.0) {
                parent_node.children.push(id);
            }
        }
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0).filter(|n| !n.detached)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).filter(|n| !n.detached)
    }

    /// Attached elements in document order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.detached)
            .map(|(i, n)| (ElementId(i), n))
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        match self.nodes.get(id.0) {
            Some(node) => node
                .children
                .iter()
                .copied()
                .filter(|c| !self.nodes[c.0].detached)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn find_all(&self, tag: &str) -> Vec<ElementId> {
        self.iter()
            .filter(|(_, n)| n.tag == tag)
            .map(|(id, _)| id)
            .collect()
    }

    /// Detach an element and its descendants. Handles stay valid but resolve
    /// to nothing afterwards.
    pub fn remove(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0) {
                if node.detached {
                    continue;
                }
                node.detached = true;
                stack.extend(node.children.iter().copied());
            }
        }
        // Unlink from the parent's child list.
        if let Some(parent) = self.nodes.get(id.0).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent.0) {
                parent_node.children.retain(|c| *c != id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_derived_from_origin() {
        let doc = Document::new("https://example.com/");
        assert_eq!(doc.origin(), "https://example.com");
        assert_eq!(doc.scheme(), "https:");

        let doc = Document::new("http://localhost:8080");
        assert_eq!(doc.scheme(), "http:");
    }

    #[test]
    fn append_and_children() {
        let mut doc = Document::new("https://example.com");
        let video = doc.append(None, Element::new("video"));
        let source = doc.append(Some(video), Element::new("source").attr("src", "/clip.mp4"));

        assert_eq!(doc.children(video), vec![source]);
        assert_eq!(doc.element(source).unwrap().parent(), Some(video));
    }

    #[test]
    fn remove_detaches_subtree() {
        let mut doc = Document::new("https://example.com");
        let video = doc.append(None, Element::new("video"));
        let source = doc.append(Some(video), Element::new("source"));

        doc.remove(video);
        assert!(doc.element(video).is_none());
        assert!(doc.element(source).is_none());
        assert_eq!(doc.iter().count(), 0);
    }

    #[test]
    fn inline_position_overrides_computed() {
        let mut element = Element::new("img");
        assert_eq!(element.computed_style().position, "static");

        element.set_inline_style("position", "relative");
        assert_eq!(element.computed_style().position, "relative");
        assert_eq!(element.inline_style("position"), Some("relative"));

        element.remove_inline_style("position");
        assert_eq!(element.computed_style().position, "static");
        assert_eq!(element.inline_style("position"), None);
    }
}
