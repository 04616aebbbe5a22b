#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::json;
use tether::prelude::*;

const KEYS: [&str; 4] = ["test", "name", "foo", "missing"];

#[derive(Arbitrary, Debug)]
enum FuzzNode {
    Text(String),
    Interpolation(u8),
    Html(u8, Vec<FuzzNode>),
    Model(u8),
    Click(u8),
    Plain(Vec<FuzzNode>),
}

impl FuzzNode {
    fn write(&self, out: &mut String, depth: usize) {
        if depth > 8 || out.len() > 4096 {
            return;
        }
        let key = |k: &u8| KEYS[usize::from(*k) % KEYS.len()];
        match self {
            FuzzNode::Text(text) => out.extend(text.chars().filter(|c| !matches!(c, '<' | '&'))),
            FuzzNode::Interpolation(k) => out.push_str(&format!("{{{{ {} }}}}", key(k))),
            FuzzNode::Html(k, children) => {
                out.push_str(&format!(r#"<p x-html="{}">"#, key(k)));
                children.iter().for_each(|c| c.write(out, depth + 1));
                out.push_str("</p>");
            }
            FuzzNode::Model(k) => out.push_str(&format!(r#"<input x-model="{}">"#, key(k))),
            FuzzNode::Click(k) => out.push_str(&format!(r#"<button @click="{}">b</button>"#, key(k))),
            FuzzNode::Plain(children) => {
                out.push_str("<div>");
                children.iter().for_each(|c| c.write(out, depth + 1));
                out.push_str("</div>");
            }
        }
    }
}

fuzz_target!(|input: (Vec<FuzzNode>, Vec<(u8, String)>)| {
    let (nodes, writes) = input;
    let mut markup = String::from(r#"<main id="app">"#);
    for node in &nodes {
        node.write(&mut markup, 0);
    }
    markup.push_str("</main>");

    let Ok(doc) = Document::parse(&markup) else {
        return;
    };
    let options = Options::new("#app")
        .data(json!({"test": "hi", "name": "jack", "foo": {"bar": 1}}))
        .method("test", |app, _| {
            app.set("name", "clicked")?;
            Ok(())
        });
    let Ok(app) = App::mount(doc.clone(), options) else {
        return;
    };
    for (k, value) in writes.iter().take(16) {
        let _ = app.set(KEYS[usize::from(*k) % KEYS.len()], value.as_str());
    }
    let _ = doc.inner_html(doc.root());
});
