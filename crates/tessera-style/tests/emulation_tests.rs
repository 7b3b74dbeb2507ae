//! Tests for runtime pseudo-class emulation on live components.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::Switch;
use parking_lot::Mutex;
use tessera_core::Document;
use tessera_style::{
    Component, ComponentEvent, DefinitionValue, PseudoClassEmulator, PseudoClassParameter,
    PseudoClassRegistry, SetupState, Style, StyleDefinition, StyleSheet, Styler, Transitions,
    Widget,
};

fn styler() -> Styler {
    common::init_tracing();
    Styler::new(Arc::new(StyleSheet::new()))
}

fn color(widget: &Widget) -> Option<String> {
    widget
        .current_style()
        .and_then(|style| style.css().get("color").map(str::to_string))
}

fn colored(key: &str, value: &str) -> (String, DefinitionValue) {
    (
        format!("$${key}"),
        StyleDefinition::new().with("color", value).into(),
    )
}

fn definition(base: &str, groups: Vec<(String, DefinitionValue)>) -> StyleDefinition {
    let mut definition = StyleDefinition::new().with("color", base);
    for (key, value) in groups {
        definition.insert(key, value);
    }
    definition
}

#[test]
fn test_selection_prefers_the_most_specific_variant() {
    common::init_tracing();
    let hover = Switch::new();
    let focus = Switch::new();
    let checked = Switch::new();
    let mut registry = PseudoClassRegistry::empty();
    registry.add_pseudo_class("hover", hover.clone()).unwrap();
    registry.add_pseudo_class("focus", focus.clone()).unwrap();
    registry.add_pseudo_class("checked", checked.clone()).unwrap();
    let styler = Styler::new(Arc::new(StyleSheet::new())).with_registry(registry);

    let style = styler
        .style(&definition(
            "black",
            vec![
                colored("hover", "red"),
                colored("focus", "blue"),
                colored("checked", "green"),
                colored("focus:hover", "purple"),
            ],
        ))
        .unwrap();

    let document = Document::new();
    let widget = Widget::new(&document, "div");
    widget.apply_style(&style);
    assert_eq!(widget.current_style(), Some(style.clone()));

    hover.set(true);
    assert_eq!(widget.current_style(), style.variant("hover"));
    assert_eq!(color(&widget).as_deref(), Some("red"));

    focus.set(true);
    assert_eq!(widget.current_style(), style.variant("focus:hover"));
    assert_eq!(color(&widget).as_deref(), Some("purple"));

    checked.set(true);
    let all = style.variant("checked:focus:hover").unwrap();
    assert_eq!(widget.current_style(), Some(all.clone()));
    // The explicit `focus:hover` is the most specific contributor.
    assert_eq!(all.css().get("color"), Some("purple"));

    hover.set(false);
    assert_eq!(widget.current_style(), style.variant("checked:focus"));
    assert_eq!(color(&widget).as_deref(), Some("green"));

    focus.set(false);
    checked.set(false);
    assert_eq!(widget.current_style(), Some(style.clone()));

    // The same inputs always select the same variant.
    for _ in 0..3 {
        hover.set(true);
        checked.set(true);
        assert_eq!(widget.current_style(), style.variant("checked:hover"));
        hover.set(false);
        checked.set(false);
        assert_eq!(widget.current_style(), Some(style.clone()));
    }
}

#[test]
fn test_initial_state_comes_from_check() {
    common::init_tracing();
    let focus = Switch::new();
    let mut registry = PseudoClassRegistry::empty();
    registry.add_pseudo_class("focus", focus.clone()).unwrap();
    let styler = Styler::new(Arc::new(StyleSheet::new())).with_registry(registry);
    let style = styler
        .style(&definition("black", vec![colored("focus", "blue")]))
        .unwrap();

    focus.set(true);
    let document = Document::new();
    let widget = Widget::new(&document, "div");
    widget.apply_style(&style);
    assert_eq!(widget.current_style(), style.variant("focus"));

    let state = style.pseudo_class_state(widget.id()).unwrap();
    assert_eq!(state.flags(), &[true]);
    assert!(style.is_attached(widget.id()));
}

#[test]
fn test_hover_follows_the_pointer() {
    let styler = styler();
    let style = styler
        .style(&definition("black", vec![colored("hover", "red")]))
        .unwrap();

    let document = Document::new();
    let button = Widget::new(&document, "button");
    let icon = Widget::new(&document, "span");
    let elsewhere = Widget::new(&document, "div");
    button.add(&icon).unwrap();
    button.apply_style(&style);

    document.set_hovered(Some(button.dom_node()));
    assert_eq!(color(&button).as_deref(), Some("red"));

    // Moving onto a descendant keeps the hover.
    document.set_hovered(Some(icon.dom_node()));
    assert_eq!(color(&button).as_deref(), Some("red"));

    document.set_hovered(Some(elsewhere.dom_node()));
    assert_eq!(color(&button).as_deref(), Some("black"));

    document.set_hovered(Some(icon.dom_node()));
    assert_eq!(color(&button).as_deref(), Some("red"));
    document.set_hovered(None);
    assert_eq!(button.current_style(), Some(style));
}

#[test]
fn test_checked_follows_the_value() {
    let styler = styler();
    let style = styler
        .style(&definition("black", vec![colored("checked", "green")]))
        .unwrap();

    let document = Document::new();
    let checkbox = Widget::new(&document, "input");
    checkbox.apply_style(&style);
    assert_eq!(color(&checkbox).as_deref(), Some("black"));

    checkbox.set_val(true);
    assert_eq!(color(&checkbox).as_deref(), Some("green"));
    checkbox.set_val("yes");
    assert_eq!(color(&checkbox).as_deref(), Some("green"));
    checkbox.set_val(false);
    assert_eq!(color(&checkbox).as_deref(), Some("black"));
    checkbox.set_val("");
    assert_eq!(color(&checkbox).as_deref(), Some("black"));
}

#[test]
fn test_required_follows_the_attribute() {
    let styler = styler();
    let style = styler
        .style(&definition("black", vec![colored("required", "orange")]))
        .unwrap();

    let document = Document::new();
    let input = Widget::new(&document, "input");
    input.apply_style(&style);
    assert_eq!(color(&input).as_deref(), Some("black"));

    input.set_attr("required", "").unwrap();
    assert_eq!(color(&input).as_deref(), Some("orange"));
    input.set_attr("placeholder", "name").unwrap();
    assert_eq!(color(&input).as_deref(), Some("orange"));
    input.remove_attr("required").unwrap();
    assert_eq!(color(&input).as_deref(), Some("black"));
}

#[test]
fn test_last_child_follows_parent_migration() {
    let styler = styler();
    let style = styler
        .style(&definition("black", vec![colored("last-child", "blue")]))
        .unwrap();

    let document = Document::new();
    let first_list = Widget::new(&document, "ul");
    let second_list = Widget::new(&document, "ul");
    let x = Widget::new(&document, "li");
    let y = Widget::new(&document, "li");
    let z = Widget::new(&document, "li");
    first_list.add(&x).unwrap();
    first_list.add(&y).unwrap();
    second_list.add(&z).unwrap();
    for item in [&x, &y, &z] {
        item.apply_style(&style);
    }
    assert_eq!(color(&x).as_deref(), Some("black"));
    assert_eq!(color(&y).as_deref(), Some("blue"));
    assert_eq!(color(&z).as_deref(), Some("blue"));

    second_list.add(&y).unwrap();
    assert_eq!(color(&x).as_deref(), Some("blue"));
    assert_eq!(color(&y).as_deref(), Some("blue"));
    assert_eq!(color(&z).as_deref(), Some("black"));

    second_list.add(&x).unwrap();
    assert_eq!(color(&x).as_deref(), Some("blue"));
    assert_eq!(color(&y).as_deref(), Some("black"));
    assert!(first_list.dom_node().children().is_empty());

    // Detached components are nobody's last child, and keep listening for
    // a new parent.
    x.detach().unwrap();
    assert_eq!(color(&x).as_deref(), Some("black"));
    assert_eq!(color(&y).as_deref(), Some("blue"));
    first_list.add(&x).unwrap();
    assert_eq!(color(&x).as_deref(), Some("blue"));
}

#[test]
fn test_nth_child_reevaluates_on_sibling_changes() {
    let styler = styler();
    let style = styler
        .style(&definition(
            "black",
            vec![colored("nth-child(2n+1)", "red"), colored("nth-child(3)", "blue")],
        ))
        .unwrap();

    let document = Document::new();
    let list = Widget::new(&document, "ul");
    let items: Vec<Arc<Widget>> = (0..5).map(|_| Widget::new(&document, "li")).collect();
    for item in &items {
        list.add(item).unwrap();
        item.apply_style(&style);
    }

    let colors = |items: &[Arc<Widget>]| -> Vec<Option<String>> {
        items.iter().map(|item| color(item)).collect()
    };
    let expected = |values: &[&str]| -> Vec<Option<String>> {
        values.iter().map(|value| Some(value.to_string())).collect()
    };

    // Third child matches both, and the later-declared group wins.
    assert_eq!(
        colors(&items),
        expected(&["red", "black", "blue", "black", "red"])
    );
    assert_eq!(
        items[2].current_style(),
        style.variant("nth-child(3):nth-child(2n+1)")
    );

    list.remove(&items[0]).unwrap();
    assert_eq!(color(&items[0]).as_deref(), Some("black"));
    assert_eq!(
        colors(&items[1..]),
        expected(&["red", "black", "blue", "black"])
    );
}

/// Keeps every `Transitions` it hands out so tests can fire stale ones.
#[derive(Clone, Default)]
struct Stash {
    active: Arc<AtomicBool>,
    handed_out: Arc<Mutex<Vec<Transitions>>>,
}

impl Stash {
    fn fire(&self, index: usize, active: bool) {
        self.active.store(active, Ordering::SeqCst);
        let transitions = self.handed_out.lock()[index].clone();
        transitions.set(active);
    }

    fn count(&self) -> usize {
        self.handed_out.lock().len()
    }
}

impl PseudoClassEmulator for Stash {
    fn check(&self, _: &dyn Component, _: &PseudoClassParameter) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn setup(
        &self,
        _: &Arc<dyn Component>,
        transitions: Transitions,
        _: &PseudoClassParameter,
    ) -> SetupState {
        self.handed_out.lock().push(transitions);
        Box::new(())
    }

    fn kill(&self, _: &dyn Component, _: SetupState) {}
}

#[test]
fn test_released_state_ignores_late_transitions() {
    common::init_tracing();
    let stash = Stash::default();
    let mut styler = Styler::new(Arc::new(StyleSheet::new()));
    styler.add_pseudo_class("pressed", stash.clone()).unwrap();
    let style = styler
        .style(&definition("black", vec![colored("pressed", "gray")]))
        .unwrap();

    let document = Document::new();
    let widget = Widget::new(&document, "button");
    widget.apply_style(&style);
    assert_eq!(stash.count(), 1);

    stash.fire(0, true);
    assert_eq!(color(&widget).as_deref(), Some("gray"));
    // Swapping to the variant re-attached with fresh callbacks.
    assert_eq!(stash.count(), 2);

    // The first callbacks belong to a released state.
    stash.fire(0, false);
    assert_eq!(color(&widget).as_deref(), Some("gray"));

    widget.clear_style();
    stash.fire(1, false);
    stash.fire(1, true);
    assert_eq!(widget.current_style(), None);
    assert!(!style.is_attached(widget.id()));
}

#[test]
fn test_detach_releases_every_setup_exactly_once() {
    common::init_tracing();
    let switches = [Switch::new(), Switch::new(), Switch::new()];
    let mut registry = PseudoClassRegistry::empty();
    for (name, switch) in ["a", "b", "c"].into_iter().zip(&switches) {
        registry.add_pseudo_class(name, switch.clone()).unwrap();
    }
    let styler = Styler::new(Arc::new(StyleSheet::new())).with_registry(registry);
    let style = styler
        .style(&definition(
            "black",
            vec![colored("a", "red"), colored("b", "green"), colored("c", "blue")],
        ))
        .unwrap();

    let document = Document::new();
    let widget = Widget::new(&document, "div");
    widget.apply_style(&style);
    for switch in &switches {
        assert_eq!(switch.setups(), 1);
        assert_eq!(switch.live(), 1);
    }

    switches[0].set(true);
    switches[2].set(true);
    switches[0].set(false);
    assert_eq!(widget.current_style(), style.variant("c"));

    widget.clear_style();
    for switch in &switches {
        assert_eq!(switch.live(), 0);
        assert_eq!(switch.kills(), switch.setups());
        assert_eq!(switch.foreign_kills(), 0);
    }
    assert!(!style.is_attached(widget.id()));
    assert!(style.pseudo_class_state(widget.id()).is_none());

    // Detaching again is a logged no-op.
    style.kill(widget.as_ref());
    for switch in &switches {
        assert_eq!(switch.kills(), switch.setups());
    }
}

#[test]
fn test_clearing_a_style_leaves_no_listeners() {
    let styler = styler();
    let style = styler
        .style(&definition(
            "black",
            vec![
                colored("hover", "red"),
                colored("checked", "green"),
                colored("required", "orange"),
                colored("last-child", "blue"),
                colored("nth-child(odd)", "gray"),
            ],
        ))
        .unwrap();

    let document = Document::new();
    let list = Widget::new(&document, "ul");
    let item = Widget::new(&document, "li");
    list.add(&item).unwrap();
    item.apply_style(&style);

    assert!(item.listener_count(ComponentEvent::Change) > 0);
    assert!(item.listener_count(ComponentEvent::NewParent) > 0);
    assert!(item.dom_node().listener_count("mouseover") > 0);
    assert!(document.active_observer_count() > 0);

    item.set_val(true);
    document.set_hovered(Some(item.dom_node()));
    item.set_attr("required", "").unwrap();
    assert_eq!(
        item.current_style(),
        style.variant("checked:hover:last-child:nth-child(odd):required")
    );

    item.clear_style();
    for event in [
        ComponentEvent::NewParent,
        ComponentEvent::ParentRemoved,
        ComponentEvent::Change,
    ] {
        assert_eq!(item.listener_count(event), 0);
    }
    assert_eq!(item.dom_node().listener_count("mouseover"), 0);
    assert_eq!(item.dom_node().listener_count("mouseout"), 0);
    assert_eq!(document.active_observer_count(), 0);

    // Later changes no longer restyle the component.
    item.set_val(false);
    list.remove(&item).unwrap();
    assert_eq!(item.current_style(), None);
}

#[test]
fn test_restyling_detaches_the_previous_family() {
    let styler = styler();
    let first = styler
        .style(&definition("black", vec![colored("checked", "green")]))
        .unwrap();
    let second = styler
        .style(&definition("white", vec![colored("checked", "red")]))
        .unwrap();

    let document = Document::new();
    let checkbox = Widget::new(&document, "input");
    checkbox.apply_style(&first);
    checkbox.set_val(true);
    assert_eq!(color(&checkbox).as_deref(), Some("green"));

    checkbox.apply_style(&second);
    assert!(!first.is_attached(checkbox.id()));
    assert!(second.is_attached(checkbox.id()));
    assert_eq!(checkbox.current_style(), second.variant("checked"));
    assert_eq!(checkbox.listener_count(ComponentEvent::Change), 1);

    checkbox.set_val(false);
    assert_eq!(checkbox.current_style(), Some(second));
}

#[test]
fn test_hooks_wrap_the_emulation_stage() {
    common::init_tracing();
    let switch = Switch::new();
    let mut registry = PseudoClassRegistry::empty();
    registry.add_pseudo_class("focus", switch.clone()).unwrap();
    let styler = Styler::new(Arc::new(StyleSheet::new())).with_registry(registry);

    let log = Arc::new(Mutex::new(Vec::new()));
    let setup = {
        let log = log.clone();
        let switch = switch.clone();
        DefinitionValue::hook(move |component| {
            log.lock().push(format!("setup live={}", switch.live()));
            assert!(component.style().is_some());
        })
    };
    let kill = {
        let log = log.clone();
        let switch = switch.clone();
        DefinitionValue::hook(move |_| log.lock().push(format!("kill live={}", switch.live())))
    };
    let style = styler
        .style(
            &definition("black", vec![colored("focus", "blue")])
                .with("$setup", setup)
                .with("$kill", kill),
        )
        .unwrap();

    let document = Document::new();
    let widget = Widget::new(&document, "div");
    widget.apply_style(&style);
    widget.clear_style();

    assert_eq!(*log.lock(), vec!["setup live=0", "kill live=0"]);
}

#[test]
fn test_initial_variant_skips_the_base_hooks() {
    common::init_tracing();
    let switch = Switch::new();
    let mut registry = PseudoClassRegistry::empty();
    registry.add_pseudo_class("focus", switch.clone()).unwrap();
    let styler = Styler::new(Arc::new(StyleSheet::new())).with_registry(registry);

    let log = Arc::new(Mutex::new(Vec::new()));
    let hook = |name: &'static str| {
        let log = log.clone();
        let switch = switch.clone();
        DefinitionValue::hook(move |_| log.lock().push(format!("{name} live={}", switch.live())))
    };
    let style = styler
        .style(
            &definition("black", vec![colored("focus", "blue")])
                .with("$setup", hook("setup"))
                .with("$kill", hook("kill")),
        )
        .unwrap();

    switch.set(true);
    let document = Document::new();
    let widget = Widget::new(&document, "div");
    widget.apply_style(&style);

    assert_eq!(widget.current_style(), style.variant("focus"));
    assert!(log.lock().is_empty());
    assert_eq!(switch.setups(), 1);
    assert_eq!(switch.live(), 1);

    switch.set(false);
    assert_eq!(widget.current_style(), Some(style.clone()));
    assert_eq!(*log.lock(), vec!["setup live=0"]);

    widget.clear_style();
    assert_eq!(*log.lock(), vec!["setup live=0", "kill live=0"]);
    assert_eq!(switch.kills(), switch.setups());
    assert_eq!(switch.foreign_kills(), 0);
}

#[test]
fn test_dropping_styled_widgets_releases_their_emulation() {
    let styler = styler();
    let style = styler
        .style(&definition(
            "black",
            vec![
                colored("hover", "red"),
                colored("required", "orange"),
                colored("last-child", "blue"),
            ],
        ))
        .unwrap();

    let document = Document::new();
    let list = Widget::new(&document, "ul");
    let items: Vec<Arc<Widget>> = (0..100).map(|_| Widget::new(&document, "li")).collect();
    for item in &items {
        list.add(item).unwrap();
        item.apply_style(&style);
    }
    document.set_hovered(Some(items[3].dom_node()));
    assert_eq!(style.attachment_count(), 100);
    assert!(document.active_observer_count() > 0);
    assert_eq!(document.node_count(), 101);

    drop(items);
    assert_eq!(style.attachment_count(), 0);
    assert_eq!(document.active_observer_count(), 0);
    assert_eq!(document.node_count(), 1);
    assert_eq!(document.hovered(), Some(list.dom_node().id()));
    assert!(list.dom_node().children().is_empty());

    let item = Widget::new(&document, "li");
    list.add(&item).unwrap();
    item.apply_style(&style);
    assert_eq!(color(&item).as_deref(), Some("blue"));
    assert_eq!(style.attachment_count(), 1);
}

#[test]
fn test_label_styles_are_applied_through_get() {
    let styler = styler();
    let style = styler
        .style(
            &definition("black", vec![colored("checked", "green")]).with(
                "$danger",
                definition("red", vec![colored("checked", "maroon")]),
            ),
        )
        .unwrap();

    let document = Document::new();
    let plain = Widget::new(&document, "input");
    let danger = Widget::with_label(&document, "input", "danger");
    plain.apply_style(&style);
    danger.apply_style(&style);

    assert_eq!(color(&plain).as_deref(), Some("black"));
    assert_eq!(color(&danger).as_deref(), Some("red"));

    plain.set_val(true);
    danger.set_val(true);
    assert_eq!(color(&plain).as_deref(), Some("green"));
    assert_eq!(color(&danger).as_deref(), Some("maroon"));

    let label_style: Style = style.label_style("danger").unwrap().clone();
    assert_eq!(danger.current_style(), label_style.variant("checked"));
}
