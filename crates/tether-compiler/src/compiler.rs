//! Template compilation.
//!
//! # Pass structure
//!
//! 1. Resolve the mount selector (hard error when missing).
//! 2. Move the mount element's children into a detached fragment.
//! 3. Walk the fragment in document order. Elements have their attributes
//!    dispatched by name; text nodes with a `{{ }}` placeholder become
//!    binding sites. An element's child list is read after its directives
//!    have painted it.
//! 4. Append the fragment's children back under the mount element. This
//!    happens even when step 3 fails, so a failed compile never loses nodes.
//!
//! # Invariants
//!
//! 1. Each binding site is painted exactly once at compile time, then once
//!    per effective write, through the same [`Paint`] function.
//! 2. Directive attributes are removed after processing; other attributes
//!    stay in place.
//! 3. An element's children are walked as they stand after its directives
//!    run. Children replaced by a paint are never bound.
//! 4. Listeners hold the context, the store, and the target weakly.

use std::rc::{Rc, Weak};

use tether_dom::{Event, Listener, ListenerError, NodeId, NodeKind, RenderTarget};
use tether_reactive::{Binding, BindingScope, ReactiveObject, Value};
use tracing::{debug, debug_span, trace};

use crate::context::CompileContext;
use crate::directive::Directive;
use crate::error::CompileError;
use crate::interpolation;
use crate::paint::Paint;

/// The result of compiling one mount point.
///
/// Owns the bindings created during compilation; dropping it (or its
/// [`BindingScope`]) disconnects the template from the store.
#[derive(Debug)]
pub struct Compiled {
    root: NodeId,
    scope: BindingScope,
    listeners: usize,
}

impl Compiled {
    /// The mount element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn scope(&self) -> &BindingScope {
        &self.scope
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.scope.binding_count()
    }

    /// Listeners attached for `@<event>` and `x-model`.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
    }

    #[must_use]
    pub fn into_scope(self) -> BindingScope {
        self.scope
    }
}

/// Compiles one mount point against a [`CompileContext`].
pub struct TemplateCompiler<'a, R: RenderTarget, C: CompileContext> {
    target: &'a R,
    context: Weak<C>,
    data: ReactiveObject,
    scope: BindingScope,
    listeners: usize,
}

impl<'a, R: RenderTarget, C: CompileContext> TemplateCompiler<'a, R, C> {
    /// Compile the subtree under `selector` on `target`.
    pub fn compile(
        target: &'a R,
        selector: &str,
        context: &Rc<C>,
    ) -> Result<Compiled, CompileError> {
        let _span = debug_span!("compile", selector).entered();
        let root = target
            .query(selector)
            .ok_or_else(|| CompileError::MountNotFound {
                selector: selector.to_owned(),
            })?;

        let fragment = target.detach_children(root)?;
        let mut pass = Self {
            target,
            context: Rc::downgrade(context),
            data: context.data(),
            scope: BindingScope::new(),
            listeners: 0,
        };
        let walked = pass.compile_children(fragment);
        target.append(root, fragment)?;
        walked?;

        debug!(
            bindings = pass.scope.binding_count(),
            listeners = pass.listeners,
            "template compiled"
        );
        Ok(Compiled {
            root,
            scope: std::mem::take(&mut pass.scope),
            listeners: pass.listeners,
        })
    }

    fn compile_children(&mut self, parent: NodeId) -> Result<(), CompileError> {
        for child in self.target.children(parent)? {
            self.compile_node(child)?;
        }
        Ok(())
    }

    fn compile_node(&mut self, node: NodeId) -> Result<(), CompileError> {
        match self.target.kind(node)? {
            NodeKind::Element => {
                self.compile_element(node)?;
                for child in self.target.children(node)? {
                    self.compile_node(child)?;
                }
            }
            NodeKind::Text => {
                let text = self.target.text(node)?;
                if let Some(expr) = interpolation::extract(&text) {
                    self.bind(node, expr, Paint::Text)?;
                }
            }
            NodeKind::Fragment => self.compile_children(node)?,
            NodeKind::Comment => {}
        }
        Ok(())
    }

    fn compile_element(&mut self, node: NodeId) -> Result<(), CompileError> {
        for attr in self.target.attributes(node)? {
            let Some(directive) = Directive::parse(&attr.name) else {
                debug!(%node, attribute = %attr.name, "attribute left in place");
                continue;
            };
            if let Some(paint) = directive.paint() {
                self.bind(node, &attr.value, paint)?;
            }
            match directive {
                Directive::Html => {}
                Directive::Model => self.listen_model(node, &attr.value)?,
                Directive::Event(event) => self.listen_method(node, event, &attr.value)?,
            }
            self.target.remove_attribute(node, &attr.name)?;
        }
        Ok(())
    }

    /// Paint `node` with the current value of `expr`, then keep it painted.
    fn bind(&mut self, node: NodeId, expr: &str, paint: Paint) -> Result<(), CompileError> {
        paint.apply(self.target, node, &self.data.get(expr))?;
        let target = self.target.clone();
        let binding = Binding::new(&self.data, expr, move |value: &Value| {
            Ok(paint.apply(&target, node, value)?)
        });
        trace!(%node, expr, ?paint, "binding site");
        self.scope.hold(binding);
        Ok(())
    }

    /// Write the element's value back into the store on `change`.
    fn listen_model(&mut self, node: NodeId, key: &str) -> Result<(), CompileError> {
        let object = self.data.downgrade();
        let target = self.target.downgrade();
        let key = key.to_owned();
        let listener: Listener = Rc::new(move |event: &Event| -> Result<(), ListenerError> {
            let (Some(object), Some(target)) = (object.upgrade(), R::upgrade(&target)) else {
                return Ok(());
            };
            let value = target.value(event.target())?;
            object.set(&key, value)?;
            Ok(())
        });
        self.target.listen(node, "change", listener)?;
        self.listeners += 1;
        Ok(())
    }

    /// Invoke `method` on the context whenever `event` fires on `node`.
    fn listen_method(
        &mut self,
        node: NodeId,
        event: &str,
        method: &str,
    ) -> Result<(), CompileError> {
        let context = Weak::clone(&self.context);
        let method = method.to_owned();
        let listener: Listener = Rc::new(move |event: &Event| -> Result<(), ListenerError> {
            match context.upgrade() {
                Some(context) => context.invoke(&method, event),
                None => Ok(()),
            }
        });
        self.target.listen(node, event, listener)?;
        self.listeners += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use tether_dom::{Attribute, Document, DomError, WeakDocument};
    use tether_reactive::ReactiveStore;
    use tracing_test::traced_test;

    #[derive(Debug, thiserror::Error)]
    #[error("no method `{0}`")]
    struct NoMethod(String);

    struct TestContext {
        store: ReactiveStore,
        calls: RefCell<Vec<(String, String)>>,
        methods: Vec<&'static str>,
    }

    impl TestContext {
        fn new(data: serde_json::Value, methods: &[&'static str]) -> Rc<Self> {
            Rc::new(Self {
                store: ReactiveStore::new(data),
                calls: RefCell::new(Vec::new()),
                methods: methods.to_vec(),
            })
        }
    }

    impl CompileContext for TestContext {
        fn data(&self) -> ReactiveObject {
            self.store.root().clone()
        }

        fn invoke(&self, method: &str, event: &Event) -> Result<(), ListenerError> {
            if !self.methods.contains(&method) {
                return Err(Box::new(NoMethod(method.to_owned())));
            }
            self.calls
                .borrow_mut()
                .push((method.to_owned(), event.kind().to_owned()));
            Ok(())
        }
    }

    /// Document wrapper that records every paint.
    #[derive(Clone)]
    struct Recording {
        doc: Document,
        paints: Rc<RefCell<Vec<(NodeId, String)>>>,
    }

    impl Recording {
        fn parse(markup: &str) -> Self {
            Self {
                doc: Document::parse(markup).unwrap(),
                paints: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn paint_count(&self) -> usize {
            self.paints.borrow().len()
        }
    }

    impl RenderTarget for Recording {
        type Weak = (WeakDocument, Weak<RefCell<Vec<(NodeId, String)>>>);

        fn downgrade(&self) -> Self::Weak {
            (self.doc.downgrade(), Rc::downgrade(&self.paints))
        }

        fn upgrade(weak: &Self::Weak) -> Option<Self> {
            Some(Self {
                doc: weak.0.upgrade()?,
                paints: weak.1.upgrade()?,
            })
        }

        fn query(&self, selector: &str) -> Option<NodeId> {
            self.doc.query(selector)
        }

        fn kind(&self, node: NodeId) -> Result<NodeKind, DomError> {
            RenderTarget::kind(&self.doc, node)
        }

        fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
            self.doc.children(node)
        }

        fn attributes(&self, node: NodeId) -> Result<Vec<Attribute>, DomError> {
            RenderTarget::attributes(&self.doc, node)
        }

        fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError> {
            RenderTarget::remove_attribute(&self.doc, node, name)
        }

        fn text(&self, node: NodeId) -> Result<String, DomError> {
            self.doc.text(node)
        }

        fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
            self.paints.borrow_mut().push((node, text.to_owned()));
            self.doc.set_text(node, text)
        }

        fn value(&self, node: NodeId) -> Result<String, DomError> {
            RenderTarget::value(&self.doc, node)
        }

        fn set_value(&self, node: NodeId, value: &str) -> Result<(), DomError> {
            self.paints.borrow_mut().push((node, value.to_owned()));
            RenderTarget::set_value(&self.doc, node, value)
        }

        fn listen(&self, node: NodeId, event: &str, listener: Listener) -> Result<(), DomError> {
            self.doc.listen(node, event, listener)
        }

        fn detach_children(&self, node: NodeId) -> Result<NodeId, DomError> {
            RenderTarget::detach_children(&self.doc, node)
        }

        fn append(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
            self.doc.append(parent, child)
        }
    }

    #[test]
    fn interpolation_replaces_text() {
        let doc = Document::parse(r#"<div id="demo"><p>{{ test }}</p></div>"#).unwrap();
        let ctx = TestContext::new(json!({"test": "hi"}), &[]);
        let compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();

        let demo = compiled.root();
        assert_eq!(doc.inner_html(demo).unwrap(), "<p>hi</p>");
        assert_eq!(compiled.binding_count(), 1);
        assert_eq!(ctx.store.root().subscriber_count("test"), 1);

        ctx.store.set("test", "bye").unwrap();
        assert_eq!(doc.inner_html(demo).unwrap(), "<p>bye</p>");
    }

    #[test]
    fn whole_text_node_is_replaced() {
        let doc = Document::parse(r#"<p id="a">Hello {{ name }} and {{ other }}!</p>"#).unwrap();
        let ctx = TestContext::new(json!({"name": "jack"}), &[]);
        let _compiled = TemplateCompiler::compile(&doc, "#a", &ctx).unwrap();
        let a = doc.query_selector("#a").unwrap();
        assert_eq!(doc.text_content(a).unwrap(), "jack");
    }

    #[test]
    fn unknown_expression_renders_undefined() {
        let doc = Document::parse(r#"<p id="a">{{ nope }}</p>"#).unwrap();
        let ctx = TestContext::new(json!({}), &[]);
        let compiled = TemplateCompiler::compile(&doc, "#a", &ctx).unwrap();
        assert_eq!(doc.text_content(compiled.root()).unwrap(), "undefined");
        assert_eq!(ctx.store.root().subscriber_count("nope"), 0);
    }

    #[test]
    fn directives_are_stripped_and_others_kept() {
        let doc = Document::parse(
            r#"<div id="demo"><p x-html="name" class="c"></p><input x-model="test"><button @click="go" type="button">x</button></div>"#,
        )
        .unwrap();
        let ctx = TestContext::new(json!({"name": "jack", "test": "hi"}), &["go"]);
        let compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();

        assert_eq!(
            doc.inner_html(compiled.root()).unwrap(),
            r#"<p class="c">jack</p><input><button type="button">x</button>"#
        );
        let input = doc.query_selector("input").unwrap();
        assert_eq!(doc.value(input).unwrap(), "hi");
        assert_eq!(compiled.binding_count(), 2);
        assert_eq!(compiled.listener_count(), 2);
    }

    #[test]
    fn paint_runs_once_at_compile_and_once_per_write() {
        let target = Recording::parse(r#"<div id="demo"><p>{{ test }}</p><input x-model="test"></div>"#);
        let ctx = TestContext::new(json!({"test": "hi"}), &[]);
        let _compiled = TemplateCompiler::compile(&target, "#demo", &ctx).unwrap();
        assert_eq!(target.paint_count(), 2);

        ctx.store.set("test", "hi").unwrap();
        assert_eq!(target.paint_count(), 2);

        ctx.store.set("test", "bye").unwrap();
        assert_eq!(target.paint_count(), 4);
        let painted: Vec<String> = target.paints.borrow()[2..]
            .iter()
            .map(|(_, text)| text.clone())
            .collect();
        assert_eq!(painted, vec!["bye", "bye"]);
    }

    #[test]
    fn model_change_writes_back() {
        let doc = Document::parse(r#"<div id="demo"><input x-model="test"><p>{{ test }}</p></div>"#)
            .unwrap();
        let ctx = TestContext::new(json!({"test": "hi"}), &[]);
        let _compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();

        let input = doc.query_selector("input").unwrap();
        let p = doc.query_selector("p").unwrap();
        doc.set_value(input, "typed").unwrap();
        doc.dispatch(input, "change").unwrap();

        assert_eq!(ctx.store.get("test"), Value::from("typed"));
        assert_eq!(doc.text_content(p).unwrap(), "typed");
    }

    #[test]
    fn event_invokes_method_lazily() {
        let doc = Document::parse(r#"<div id="demo"><button @click="missing">x</button><a @click="go">y</a></div>"#)
            .unwrap();
        let ctx = TestContext::new(json!({}), &["go"]);
        let _compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();

        let a = doc.query_selector("a").unwrap();
        assert_eq!(doc.dispatch(a, "click").unwrap(), 1);
        assert_eq!(
            *ctx.calls.borrow(),
            vec![("go".to_owned(), "click".to_owned())]
        );

        let button = doc.query_selector("button").unwrap();
        match doc.dispatch(button, "click") {
            Err(DomError::Listener { source, .. }) => {
                assert!(source.downcast_ref::<NoMethod>().is_some());
            }
            other => panic!("expected a listener error, got {other:?}"),
        }
    }

    #[test]
    fn missing_mount_is_an_error() {
        let doc = Document::parse("<div></div>").unwrap();
        let ctx = TestContext::new(json!({}), &[]);
        let err = TemplateCompiler::compile(&doc, "#nope", &ctx).unwrap_err();
        assert!(matches!(err, CompileError::MountNotFound { ref selector } if selector == "#nope"));
        assert_eq!(err.to_string(), "mount element `#nope` not found");
    }

    #[test]
    fn nested_elements_are_walked() {
        let doc = Document::parse(
            r#"<div id="demo"><section><ul><li>{{ a }}</li><li><em x-html="b"></em></li></ul></section><!--{{ c }}--></div>"#,
        )
        .unwrap();
        let ctx = TestContext::new(json!({"a": 1, "b": true, "c": "no"}), &[]);
        let compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();
        assert_eq!(
            doc.inner_html(compiled.root()).unwrap(),
            "<section><ul><li>1</li><li><em>true</em></li></ul></section><!--{{ c }}-->"
        );
        assert_eq!(compiled.binding_count(), 2);
    }

    #[test]
    fn replaced_children_are_not_bound() {
        let doc = Document::parse(r#"<div id="demo"><p x-html="name">{{ test }}</p></div>"#)
            .unwrap();
        let ctx = TestContext::new(json!({"name": "jack", "test": "hi"}), &[]);
        let compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();

        assert_eq!(doc.inner_html(compiled.root()).unwrap(), "<p>jack</p>");
        assert_eq!(compiled.binding_count(), 1);
        assert_eq!(ctx.store.root().subscriber_count("test"), 0);

        ctx.store.set("test", "bye").unwrap();
        assert_eq!(doc.inner_html(compiled.root()).unwrap(), "<p>jack</p>");
    }

    #[test]
    fn painted_content_is_walked() {
        let doc = Document::parse(r#"<div id="demo"><p x-html="raw"></p></div>"#).unwrap();
        let ctx = TestContext::new(json!({"raw": "{{ secret }}", "secret": "shown"}), &[]);
        let compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();
        assert_eq!(doc.inner_html(compiled.root()).unwrap(), "<p>shown</p>");
        assert_eq!(compiled.binding_count(), 2);
        assert_eq!(ctx.store.root().subscriber_count("secret"), 1);
    }

    #[test]
    fn dropping_compiled_disconnects() {
        let doc = Document::parse(r#"<p id="a">{{ test }}</p>"#).unwrap();
        let ctx = TestContext::new(json!({"test": "hi"}), &[]);
        let compiled = TemplateCompiler::compile(&doc, "#a", &ctx).unwrap();
        drop(compiled);
        ctx.store.set("test", "bye").unwrap();
        let a = doc.query_selector("#a").unwrap();
        assert_eq!(doc.text_content(a).unwrap(), "hi");
    }

    #[test]
    fn listeners_ignore_dropped_context() {
        let doc = Document::parse(r#"<div id="demo"><button @click="go">x</button></div>"#).unwrap();
        let ctx = TestContext::new(json!({}), &[]);
        let _compiled = TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();
        let button = doc.query_selector("button").unwrap();
        drop(ctx);
        assert_eq!(doc.dispatch(button, "click").unwrap(), 1);
    }

    #[traced_test]
    #[test]
    fn ordinary_attributes_are_logged() {
        let doc = Document::parse(r#"<div id="demo"><p title="t">x</p></div>"#).unwrap();
        let ctx = TestContext::new(json!({}), &[]);
        TemplateCompiler::compile(&doc, "#demo", &ctx).unwrap();
        assert!(logs_contain("attribute left in place"));
        assert!(logs_contain("template compiled"));
    }
}
