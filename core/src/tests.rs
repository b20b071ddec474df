use core::time::Duration;
use std::cell::RefCell;
use std::rc::Rc;

use smol::Timer;

use crate::{
    Context, Engine, EngineConfig, Error, ExprKind, Hooks, Node, Pending, Plugin, Rejection,
    Template, component, component_named, deferred, fragment, raw, tag,
};

fn render(engine: &Engine, node: impl Into<Node>) -> Result<String, Error> {
    smol::block_on(engine.render_html(node, &Context::new()))
}

fn render_ok(node: impl Into<Node>) -> String {
    render(&Engine::new(), node).expect("render succeeds")
}

fn delayed(ms: u64, text: &'static str) -> Node {
    Node::future(async move {
        Timer::after(Duration::from_millis(ms)).await;
        Ok::<_, Rejection>(text)
    })
}

fn nested(depth: usize) -> Node {
    Node::future(async move {
        let next = if depth == 0 {
            Node::from("done")
        } else {
            nested(depth - 1)
        };
        Ok::<_, Rejection>(next)
    })
}

#[test]
fn text_is_escaped_and_raw_is_not() {
    let node = tag("p").append([Node::from("<b>&</b>"), raw("<i>trusted</i>").into()]);
    assert_eq!(render_ok(node), "<p>&lt;b&gt;&amp;&lt;/b&gt;<i>trusted</i></p>");
}

#[test]
fn ignorable_primitives_render_nothing_but_zero_does() {
    let list = vec![
        Node::from(false),
        Node::null(),
        Node::undefined(),
        Node::from(0),
        Node::from(true),
        Node::from(""),
        Node::from(f64::NAN),
    ];
    assert_eq!(render_ok(list), "0");
}

#[test]
fn template_children_render_in_order() {
    let item = tag("li");
    let node = tag("ul").with_children(Template::new(
        ["", "\n  ", ""],
        [
            Node::from(vec![item.append(["a"]), item.append(["b"])]),
            Node::from(item.append([1.5])),
        ],
    ));
    assert_eq!(render_ok(node), "<ul><li>a</li><li>b</li><li>1.5</li></ul>");
}

#[test]
fn attributes_are_normalized() {
    let node = tag("input").with_attributes([
        ("type", serde_json::json!("checkbox")),
        ("checked", serde_json::json!(true)),
        ("disabled", serde_json::json!(false)),
        ("className", serde_json::json!(["a", {"b": true, "c": false}])),
        ("title", serde_json::json!("say \"hi\"")),
    ]);
    assert_eq!(
        render_ok(node),
        r#"<input type="checkbox" checked class="a b" title='say "hi"' />"#
    );
}

#[test]
fn void_tags_ignore_children() {
    assert_eq!(render_ok(tag("br").append(["lost"])), "<br />");
}

#[test]
fn component_id_is_stable_across_placements() {
    let stamp = component_named("Stamp", |_, _, cx| {
        Ok(cx.component().map(|id| id.to_string()).unwrap_or_default())
    });
    let id = stamp.id();
    let node = fragment([
        Node::from(stamp.clone()),
        stamp.with_attribute("variant", "b").into(),
        stamp.into(),
    ]);
    assert_eq!(render_ok(node), format!("{id}{id}{id}"));
}

#[test]
fn components_receive_props_and_children() {
    let card = component_named("Card", |props, children, _| {
        let title = props.get("title").and_then(|v| v.as_str()).unwrap_or("untitled");
        Ok(tag("section")
            .append([tag("h2").append([title])])
            .append(children.to_vec()))
    });
    let node = card
        .with_default_props([("title", "Default")])
        .with_attribute("title", "Chosen")
        .append(["body"]);
    assert_eq!(render_ok(node), "<section><h2>Chosen</h2>body</section>");
}

#[test]
fn deferred_functions_see_the_user_context() {
    #[derive(Debug)]
    struct Locale(&'static str);

    let node = tag("span").append([deferred(|cx| {
        Ok(cx.get::<Locale>().map_or("none", |locale| locale.0))
    })]);
    let cx = Context::new().with(Locale("fr"));
    let rendered = smol::block_on(Engine::new().render(node.into(), &cx)).expect("render");
    assert_eq!(rendered.html, "<span>fr</span>");
}

#[test]
fn render_html_passes_the_user_context_through() {
    #[derive(Debug)]
    struct Theme(&'static str);

    let themed = component_named("Themed", |_, _, _| {
        Ok(deferred(|cx| {
            Ok(cx.get::<Theme>().map_or("unset", |theme| theme.0))
        }))
    });
    let cx = Context::new().with(Theme("dark"));
    let html = smol::block_on(Engine::new().render_html(tag("body").append([themed]), &cx))
        .expect("render");
    assert_eq!(html, "<body>dark</body>");
}

#[test]
fn futures_resolve_in_document_order_regardless_of_timing() {
    let node = tag("div").append([delayed(30, "a"), delayed(10, "b"), delayed(0, "c")]);
    assert_eq!(render_ok(node), "<div>abc</div>");
}

#[test]
fn rejections_only_affect_their_own_marker() {
    let node = fragment([
        Node::from(Pending::resolved("ok")),
        Pending::rejected("boom").into(),
        "tail".into(),
    ]);
    assert_eq!(render_ok(node), "ok<!-- core-async-error: boom -->tail");
}

#[test]
fn failures_while_rendering_a_settled_value_become_error_comments() {
    let failing = component_named("Broken", |_, _, _| -> anyhow::Result<()> {
        anyhow::bail!("no data")
    });
    let node = fragment([Node::from(Pending::resolved(failing)), "after".into()]);
    assert_eq!(
        render_ok(node),
        "<!-- core-async-error: component `Broken` failed to render: no data -->after"
    );
}

#[test]
fn nested_futures_drain_to_completion() {
    assert_eq!(render_ok(tag("p").append([nested(4)])), "<p>done</p>");
}

#[test]
fn shared_pending_values_resolve_everywhere() {
    let shared = Pending::new(async {
        Timer::after(Duration::from_millis(5)).await;
        Ok::<_, Rejection>("x")
    });
    let node = fragment([Node::from(shared.clone()), "-".into(), shared.into()]);
    assert_eq!(render_ok(node), "x-x");
}

#[test]
fn futures_inside_components_keep_the_component_scope() {
    let widget = component(|_, _, _| {
        Ok(Pending::resolved(deferred(|cx| {
            Ok(cx.component().is_some().to_string())
        })))
    });
    assert_eq!(render_ok(widget), "true");
}

#[test]
fn drain_limit_stops_runaway_chains() {
    let engine = Engine::with_config(EngineConfig::new().drain_limit(2));
    let error = render(&engine, nested(5)).expect_err("limit is hit");
    assert!(matches!(error, Error::DrainLimit(2)));

    let roomy = Engine::with_config(EngineConfig::new().drain_limit(10));
    assert_eq!(render(&roomy, nested(5)).expect("fits"), "done");
}

#[test]
fn strict_mode_rejects_unmatched_values() {
    let engine = Engine::with_config(EngineConfig::new().strict(true));
    let error = render(&engine, Node::opaque(42)).expect_err("strict");
    assert!(matches!(error, Error::Unmatched("opaque")));
}

#[test]
fn component_errors_propagate() {
    let failing = component_named("Profile", |_, _, _| -> anyhow::Result<()> {
        anyhow::bail!("user not found")
    });
    let error = render_ok_err(tag("main").append([failing]));
    assert_eq!(
        error.to_string(),
        "component `Profile` failed to render: user not found"
    );
}

fn render_ok_err(node: impl Into<Node>) -> Error {
    render(&Engine::new(), node).expect_err("render fails")
}

struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl Plugin for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
        let name = self.name;
        let log = Rc::clone(&self.log);
        hooks.before(ExprKind::Tag, move |node| {
            log.borrow_mut().push(format!("{name}:before"));
            let Node::Tag(tag) = node else {
                return Ok(None);
            };
            let seen = tag
                .attribute("data-seen")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            Ok(Some(tag.with_attribute("data-seen", format!("{seen}{name}")).into()))
        });
        hooks.after(ExprKind::Tag, move |_, html| Ok(Some(format!("{html}[{name}]"))));
        Ok(())
    }

    fn render_before(&self, _root: &Node) -> anyhow::Result<Option<Node>> {
        self.log.borrow_mut().push(format!("{}:render_before", self.name));
        Ok(None)
    }

    fn render_after(&self, _root: &Node, html: &str) -> anyhow::Result<Option<String>> {
        self.log.borrow_mut().push(format!("{}:render_after", self.name));
        Ok(Some(format!("{html}<!-- {} -->", self.name)))
    }
}

#[test]
fn hooks_compose_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let html = smol::block_on(async {
        let mut engine = Engine::new();
        engine
            .use_plugin(Recorder { name: "a", log: Rc::clone(&log) })
            .await
            .expect("register a");
        engine
            .use_plugin(Recorder { name: "b", log: Rc::clone(&log) })
            .await
            .expect("register b");
        engine.render_html(tag("hr"), &Context::new()).await
    })
    .expect("render");

    assert_eq!(html, r#"<hr data-seen="ab" />[a][b]<!-- a --><!-- b -->"#);
    assert_eq!(
        *log.borrow(),
        [
            "a:render_before",
            "b:render_before",
            "a:before",
            "b:before",
            "a:render_after",
            "b:render_after",
        ]
    );
}

#[test]
fn duplicate_plugin_names_fail_fast() {
    let log = Rc::new(RefCell::new(Vec::new()));
    smol::block_on(async {
        let mut engine = Engine::new();
        engine
            .use_plugin(Recorder { name: "dup", log: Rc::clone(&log) })
            .await
            .expect("first registration");
        let error = engine
            .use_plugin(Recorder { name: "dup", log: Rc::clone(&log) })
            .await
            .expect_err("second registration");
        assert!(matches!(error, Error::DuplicatePlugin(ref name) if name == "dup"));
        assert_eq!(engine.plugin_names().count(), 1);
    });
}

#[test]
fn before_hook_kind_change_is_dispatched_again() {
    struct Swap;

    impl Plugin for Swap {
        fn name(&self) -> &str {
            "swap"
        }

        fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
            hooks.before(ExprKind::Text, |node| {
                Ok((node.as_str() == Some("rule")).then(|| raw("<hr>").into()))
            });
            Ok(())
        }
    }

    let html = smol::block_on(async {
        let mut engine = Engine::new();
        engine.use_plugin(Swap).await.expect("register");
        engine
            .render_html(fragment(["rule", "<text>"]), &Context::new())
            .await
    })
    .expect("render");
    assert_eq!(html, "<hr>&lt;text&gt;");
}

#[test]
fn hooks_that_swap_kinds_forever_fail_instead_of_recursing() {
    struct PingPong;

    impl Plugin for PingPong {
        fn name(&self) -> &str {
            "ping-pong"
        }

        fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
            hooks.before(ExprKind::Text, |node| {
                Ok(node.as_str().map(|text| raw(text).into()))
            });
            hooks.before(ExprKind::Raw, |node| {
                let Node::Raw(markup) = node else {
                    return Ok(None);
                };
                Ok(Some(markup.as_str().into()))
            });
            Ok(())
        }
    }

    let error = smol::block_on(async {
        let mut engine = Engine::new();
        engine.use_plugin(PingPong).await.expect("register");
        engine
            .render_html(tag("p").append(["loop"]), &Context::new())
            .await
            .expect_err("kind keeps changing")
    });
    assert!(matches!(error, Error::Redispatch(crate::engine::REDISPATCH_LIMIT)));
}

#[test]
fn async_prepare_is_awaited_during_registration() {
    struct Slow {
        ready: Rc<RefCell<bool>>,
    }

    impl Plugin for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn prepare(&self) -> futures::future::LocalBoxFuture<'_, anyhow::Result<()>> {
            Box::pin(async move {
                Timer::after(Duration::from_millis(5)).await;
                *self.ready.borrow_mut() = true;
                Ok(())
            })
        }
    }

    let ready = Rc::new(RefCell::new(false));
    smol::block_on(async {
        let mut engine = Engine::new();
        engine
            .use_plugin(Slow { ready: Rc::clone(&ready) })
            .await
            .expect("register");
    });
    assert!(*ready.borrow());
}

#[test]
fn hook_errors_abort_the_render() {
    struct Deny;

    impl Plugin for Deny {
        fn name(&self) -> &str {
            "deny"
        }

        fn setup(&self, hooks: &mut Hooks) -> anyhow::Result<()> {
            hooks.before(ExprKind::Component, |_| anyhow::bail!("components disabled"));
            Ok(())
        }
    }

    let error = smol::block_on(async {
        let mut engine = Engine::new();
        engine.use_plugin(Deny).await.expect("register");
        engine
            .render_html(component(|_, _, _| Ok("never")), &Context::new())
            .await
            .expect_err("hook fails")
    });
    assert_eq!(
        error.to_string(),
        "before `component` hook of plugin `deny` failed: components disabled"
    );
}
