use async_trait::async_trait;
use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};
use std::cell::{Cell, RefCell};
use unbanner_core::{Document, DomError, ElementState};

use crate::style::InlineStyle;

const DEFAULT_WIDTH: f64 = 100.0;
const DEFAULT_HEIGHT: f64 = 20.0;

/// Handle into a [`StaticDocument`]. Goes stale when the whole tree is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticElement {
    node: NodeId,
    generation: u64,
}

/// What a recorded click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickedElement {
    pub tag: String,
    pub id: Option<String>,
    pub text: String,
}

/// In-memory page parsed with `scraper`.
///
/// Layout is approximated from inline styles: `display:none` or `hidden` on the
/// element or an ancestor collapses its box, `visibility` inherits from the
/// nearest declaring ancestor, `opacity` is the element's own.
pub struct StaticDocument {
    html: RefCell<Html>,
    url: Option<String>,
    generation: Cell<u64>,
    clicks: RefCell<Vec<ClickedElement>>,
    failing_clicks: Cell<bool>,
}

impl StaticDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: RefCell::new(Html::parse_document(html)),
            url: None,
            generation: Cell::new(0),
            clicks: RefCell::new(Vec::new()),
            failing_clicks: Cell::new(false),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Swap in a new tree, as a host script rewriting the page would.
    ///
    /// Invalidates every handle handed out so far. Returns how many more
    /// elements the new tree has than the old one.
    pub fn replace(&self, html: &str) -> usize {
        let next = Html::parse_document(html);
        let added = element_count(&next.tree).saturating_sub(element_count(&self.html.borrow().tree));
        *self.html.borrow_mut() = next;
        self.generation.set(self.generation.get() + 1);
        added
    }

    /// Parse `fragment` and append it to the body. Returns the number of inserted elements.
    pub fn append_html(&self, fragment: &str) -> Result<usize, DomError> {
        let parsed = Html::parse_fragment(fragment);
        let mut html = self.html.borrow_mut();
        let body = body_of(&html)?;
        let source = parsed.root_element();
        Ok(copy_children(*source, &mut html.tree, body))
    }

    /// Make every subsequent click fail, like a page handler that throws.
    pub fn fail_clicks(&self, fail: bool) {
        self.failing_clicks.set(fail);
    }

    pub fn clicks(&self) -> Vec<ClickedElement> {
        self.clicks.borrow().clone()
    }

    fn resolve<'a>(&self, html: &'a Html, element: &StaticElement) -> Result<ElementRef<'a>, DomError> {
        if element.generation != self.generation.get() {
            return Err(DomError::detached("element belongs to a replaced document"));
        }
        html.tree
            .get(element.node)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| DomError::detached("element no longer in the document"))
    }

    fn handle(&self, element: ElementRef<'_>) -> StaticElement {
        StaticElement {
            node: element.id(),
            generation: self.generation.get(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|e| DomError::invalid_selector(selector, e))
}

fn body_of(html: &Html) -> Result<NodeId, DomError> {
    let body = parse_selector("body")?;
    Ok(html
        .select(&body)
        .next()
        .unwrap_or_else(|| html.root_element())
        .id())
}

fn element_count(tree: &Tree<Node>) -> usize {
    tree.nodes().filter(|node| node.value().is_element()).count()
}

fn copy_children(source: NodeRef<'_, Node>, tree: &mut Tree<Node>, parent: NodeId) -> usize {
    let mut inserted = 0;
    for child in source.children() {
        let Some(mut target) = tree.get_mut(parent) else {
            break;
        };
        let copied = target.append(child.value().clone()).id();
        if child.value().is_element() {
            inserted += 1;
        }
        inserted += copy_children(child, tree, copied);
    }
    inserted
}

fn computed_state(element: ElementRef<'_>) -> ElementState {
    let own = InlineStyle::of(element.value());
    let ancestors: Vec<InlineStyle> = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|ancestor| InlineStyle::of(ancestor.value()))
        .collect();

    let collapsed = own.hides_subtree() || ancestors.iter().any(InlineStyle::hides_subtree);
    let visibility = own
        .visibility
        .clone()
        .or_else(|| ancestors.iter().find_map(|a| a.visibility.clone()))
        .unwrap_or_else(|| "visible".to_string());

    let (width, height) = if collapsed {
        (0.0, 0.0)
    } else {
        (own.width.unwrap_or(DEFAULT_WIDTH), own.height.unwrap_or(DEFAULT_HEIGHT))
    };

    ElementState {
        width,
        height,
        display: own.display.unwrap_or_else(|| "block".to_string()),
        visibility,
        opacity: own.opacity.unwrap_or_else(|| "1".to_string()),
    }
}

#[async_trait(?Send)]
impl Document for StaticDocument {
    type Element = StaticElement;

    async fn query_first(&self, selector: &str) -> Result<Option<StaticElement>, DomError> {
        let selector = parse_selector(selector)?;
        let html = self.html.borrow();
        Ok(html.select(&selector).next().map(|el| self.handle(el)))
    }

    async fn query_all(
        &self,
        scope: Option<&StaticElement>,
        selector: &str,
    ) -> Result<Vec<StaticElement>, DomError> {
        let selector = parse_selector(selector)?;
        let html = self.html.borrow();
        let root = match scope {
            Some(scope) => self.resolve(&html, scope)?,
            None => {
                let body = body_of(&html)?;
                self.resolve(&html, &StaticElement { node: body, generation: self.generation.get() })?
            }
        };
        Ok(root.select(&selector).map(|el| self.handle(el)).collect())
    }

    async fn element_state(&self, element: &StaticElement) -> Result<ElementState, DomError> {
        let html = self.html.borrow();
        Ok(computed_state(self.resolve(&html, element)?))
    }

    async fn text_or_value(&self, element: &StaticElement) -> Result<String, DomError> {
        let html = self.html.borrow();
        let element = self.resolve(&html, element)?;
        let text: String = element.text().collect();
        if text.is_empty() {
            return Ok(element.value().attr("value").unwrap_or_default().to_string());
        }
        Ok(text)
    }

    async fn click(&self, element: &StaticElement) -> Result<(), DomError> {
        if self.failing_clicks.get() {
            return Err(DomError::dispatch_error("click handler threw"));
        }
        let html = self.html.borrow();
        let element = self.resolve(&html, element)?;
        self.clicks.borrow_mut().push(ClickedElement {
            tag: element.value().name().to_string(),
            id: element.value().id().map(str::to_string),
            text: element.text().collect::<String>().trim().to_string(),
        });
        Ok(())
    }

    async fn location(&self) -> Option<String> {
        self.url.clone()
    }
}
