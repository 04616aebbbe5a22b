//! End-to-end behavior of a mounted app against the in-memory document.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tether::compiler::CompileError;
use tether::dom::DomError;
use tether::prelude::*;

const DEMO: &str = r#"<div id="demo"><p>{{ test }}</p><p x-html="name"></p><input x-model="test"><button @click="onConfirm">confirm</button></div>"#;

fn demo_options() -> Options {
    Options::new("#demo")
        .data(json!({
            "test": "hi",
            "ok": "ok",
            "name": "jack",
            "foo": {"bar": "bar"}
        }))
        .method("onConfirm", |app, _| {
            app.set("test", "11")?;
            Ok(())
        })
}

fn mount_demo() -> (Document, App) {
    let doc = Document::parse(DEMO).unwrap();
    let app = App::mount(doc.clone(), demo_options()).unwrap();
    (doc, app)
}

fn rendered(doc: &Document, app: &App) -> String {
    doc.inner_html(app.root().unwrap()).unwrap()
}

#[test]
fn initial_render() {
    let (doc, app) = mount_demo();
    assert_eq!(
        rendered(&doc, &app),
        "<p>hi</p><p>jack</p><input><button>confirm</button>"
    );
    let input = doc.query_selector("input").unwrap();
    assert_eq!(doc.value(input).unwrap(), "hi");
}

#[test]
fn one_registration_per_binding_site() {
    let (_doc, app) = mount_demo();
    assert_eq!(app.data().subscriber_count("test"), 2);
    assert_eq!(app.data().subscriber_count("name"), 1);
    assert_eq!(app.data().subscriber_count("ok"), 0);
    assert_eq!(app.binding_count(), 3);
}

#[test]
fn writes_propagate_synchronously() {
    let (doc, app) = mount_demo();
    assert!(app.set("test", "hello").unwrap());
    assert_eq!(
        rendered(&doc, &app),
        "<p>hello</p><p>jack</p><input><button>confirm</button>"
    );
    let input = doc.query_selector("input").unwrap();
    assert_eq!(doc.value(input).unwrap(), "hello");
}

#[test]
fn identical_write_is_a_no_op() {
    let doc = Document::parse(DEMO).unwrap();
    let paints = Rc::new(RefCell::new(0));
    let app = App::mount(doc.clone(), demo_options()).unwrap();
    let counter = Rc::clone(&paints);
    let _watcher = Binding::new(app.data(), "test", move |_: &Value| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    assert!(!app.set("test", "hi").unwrap());
    assert_eq!(*paints.borrow(), 0);
    assert!(app.set("test", "bye").unwrap());
    assert_eq!(*paints.borrow(), 1);
}

#[test]
fn two_way_sync_through_change_events() {
    let (doc, app) = mount_demo();
    let input = doc.query_selector("input").unwrap();

    doc.set_value(input, "typed").unwrap();
    assert_eq!(app.get("test"), Value::from("hi"));
    doc.dispatch(input, "change").unwrap();

    assert_eq!(app.get("test"), Value::from("typed"));
    assert_eq!(
        rendered(&doc, &app),
        "<p>typed</p><p>jack</p><input><button>confirm</button>"
    );
}

#[test]
fn nested_objects_are_reactive() {
    let (_doc, app) = mount_demo();
    let foo = app.get("foo");
    let foo = foo.as_object().unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _binding = Binding::new(foo, "bar", move |v: &Value| {
        sink.borrow_mut().push(v.to_string());
        Ok(())
    });

    foo.set("bar", "baz").unwrap();
    assert_eq!(*seen.borrow(), vec!["baz"]);
    assert_eq!(app.data().to_json()["foo"], json!({"bar": "baz"}));
}

#[test]
fn click_runs_method() {
    let (doc, app) = mount_demo();
    let button = doc.query_selector("button").unwrap();
    assert_eq!(doc.dispatch(button, "click").unwrap(), 1);
    assert_eq!(app.get("test"), Value::from("11"));
    assert_eq!(
        rendered(&doc, &app),
        "<p>11</p><p>jack</p><input><button>confirm</button>"
    );
}

#[test]
fn unknown_method_fails_at_dispatch_not_mount() {
    let doc = Document::parse(r#"<div id="demo"><button @click="nope">x</button></div>"#).unwrap();
    let app = App::mount(doc.clone(), Options::new("#demo")).unwrap();
    let button = doc.query_selector("button").unwrap();

    match doc.dispatch(button, "click") {
        Err(DomError::Listener { event, source, .. }) => {
            assert_eq!(event, "click");
            assert!(matches!(
                source.downcast_ref::<AppError>(),
                Some(AppError::MethodNotFound { name }) if name == "nope"
            ));
        }
        other => panic!("expected a listener error, got {other:?}"),
    }
    assert_eq!(app.binding_count(), 0);
}

#[test]
fn missing_mount_element() {
    let doc = Document::parse("<main></main>").unwrap();
    let err = App::mount(doc, Options::new("#demo")).unwrap_err();
    assert!(matches!(
        err,
        AppError::Compile(CompileError::MountNotFound { ref selector }) if selector == "#demo"
    ));
}

#[test]
fn non_object_data_mounts_empty() {
    let doc = Document::parse(r#"<div id="demo"><p>{{ test }}</p></div>"#).unwrap();
    let app = App::mount(doc.clone(), Options::new("#demo").data(json!([1, 2]))).unwrap();
    assert!(app.data().is_empty());
    assert_eq!(rendered(&doc, &app), "<p>undefined</p>");
}

#[test]
fn created_runs_after_compile() {
    let doc = Document::parse(DEMO).unwrap();
    let observed = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&observed);
    let options = demo_options().created(move |app| {
        let root = app.root().ok_or("not mounted")?;
        *sink.borrow_mut() = app.target().inner_html(root)?;
        app.set("test", "hi world")?;
        Ok(())
    });
    let app = App::mount(doc.clone(), options).unwrap();

    assert_eq!(
        *observed.borrow(),
        "<p>hi</p><p>jack</p><input><button>confirm</button>"
    );
    assert_eq!(
        rendered(&doc, &app),
        "<p>hi world</p><p>jack</p><input><button>confirm</button>"
    );
}

#[test]
fn html_directive_renders_text() {
    let (doc, app) = mount_demo();
    app.set("name", "<em>jill</em>").unwrap();
    assert_eq!(
        rendered(&doc, &app),
        "<p>hi</p><p>&lt;em&gt;jill&lt;/em&gt;</p><input><button>confirm</button>"
    );
}

#[test]
fn options_from_json_mount() {
    let doc = Document::parse(r#"<div id="demo">{{ greeting }}</div>"#).unwrap();
    let options = Options::from_json(r##"{"el": "#demo", "data": {"greeting": "hello"}}"##)
        .unwrap();
    let app = App::mount(doc.clone(), options).unwrap();
    assert_eq!(rendered(&doc, &app), "hello");
    app.set("greeting", 42).unwrap();
    assert_eq!(rendered(&doc, &app), "42");
}
