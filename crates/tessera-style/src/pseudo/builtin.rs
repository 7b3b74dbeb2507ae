//! Built-in pseudo-class emulators.
//!
//! | Name            | Holds while                                   | Listens to                         |
//! |-----------------|-----------------------------------------------|------------------------------------|
//! | `hover`         | the node or a descendant is hovered           | `mouseover` / `mouseout`           |
//! | `checked`       | the component value is truthy                 | component `Change`                 |
//! | `required`      | the `required` attribute is present           | attribute mutations on the node    |
//! | `last-child`    | the node is its parent's last child           | parent child list, parent changes  |
//! | `nth-child(e)`  | the node's index matches `e`                  | parent child list, parent changes  |

use std::sync::Arc;

use tessera_core::{ConnectionId, DomEvent, DomNode, MutationObserver, ObserveOptions};

use crate::component::{Component, ComponentEvent};
use crate::error::Result;
use crate::logging::targets;
use crate::pseudo::nth::NthExpr;
use crate::pseudo::registry::{PseudoClassEmulator, PseudoClassParameter, SetupState, Transitions};

/// Every built-in emulator with the name it is registered under.
pub(crate) fn emulators() -> Vec<(&'static str, Arc<dyn PseudoClassEmulator>)> {
    vec![
        ("hover", Arc::new(Hover) as Arc<dyn PseudoClassEmulator>),
        ("checked", Arc::new(Checked) as Arc<dyn PseudoClassEmulator>),
        ("required", Arc::new(Required) as Arc<dyn PseudoClassEmulator>),
        ("last-child", Arc::new(LastChild) as Arc<dyn PseudoClassEmulator>),
        ("nth-child", Arc::new(NthChild) as Arc<dyn PseudoClassEmulator>),
    ]
}

fn unexpected_state(pseudo_class: &str) {
    tracing::warn!(
        target: targets::EMULATION,
        pseudo_class,
        "kill received a setup state it did not create"
    );
}

fn listen<F>(node: &DomNode, kind: &str, listener: F) -> Option<ConnectionId>
where
    F: Fn(&DomEvent) + Send + Sync + 'static,
{
    match node.add_event_listener(kind, listener) {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::warn!(target: targets::EMULATION, kind, %err, "could not add event listener");
            None
        }
    }
}

/// `hover`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hover;

struct HoverListeners {
    over: Option<ConnectionId>,
    out: Option<ConnectionId>,
}

impl PseudoClassEmulator for Hover {
    fn check(&self, component: &dyn Component, _: &PseudoClassParameter) -> bool {
        component.dom_node().is_hovered()
    }

    fn setup(
        &self,
        component: &Arc<dyn Component>,
        transitions: Transitions,
        _: &PseudoClassParameter,
    ) -> SetupState {
        let node = component.dom_node();
        let over = listen(node, "mouseover", {
            let transitions = transitions.clone();
            move |_| transitions.start()
        });
        let out = listen(node, "mouseout", move |_| transitions.end());
        Box::new(HoverListeners { over, out })
    }

    fn kill(&self, component: &dyn Component, state: SetupState) {
        let Ok(listeners) = state.downcast::<HoverListeners>() else {
            return unexpected_state("hover");
        };
        let node = component.dom_node();
        if let Some(id) = listeners.over {
            node.remove_event_listener("mouseover", id);
        }
        if let Some(id) = listeners.out {
            node.remove_event_listener("mouseout", id);
        }
    }
}

/// `checked`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checked;

impl PseudoClassEmulator for Checked {
    fn check(&self, component: &dyn Component, _: &PseudoClassParameter) -> bool {
        component.val().is_truthy()
    }

    fn setup(
        &self,
        component: &Arc<dyn Component>,
        transitions: Transitions,
        _: &PseudoClassParameter,
    ) -> SetupState {
        let weak = Arc::downgrade(component);
        let id = component.on(
            ComponentEvent::Change,
            Box::new(move || {
                if let Some(component) = weak.upgrade() {
                    transitions.set(component.val().is_truthy());
                }
            }),
        );
        Box::new(id)
    }

    fn kill(&self, component: &dyn Component, state: SetupState) {
        let Ok(id) = state.downcast::<ConnectionId>() else {
            return unexpected_state("checked");
        };
        component.remove_listener(ComponentEvent::Change, *id);
    }
}

/// `required`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl PseudoClassEmulator for Required {
    fn check(&self, component: &dyn Component, _: &PseudoClassParameter) -> bool {
        component.attr("required").is_some()
    }

    fn setup(
        &self,
        component: &Arc<dyn Component>,
        transitions: Transitions,
        _: &PseudoClassParameter,
    ) -> SetupState {
        let weak = Arc::downgrade(component);
        let node = component.dom_node();
        let observer = MutationObserver::new(node.document(), move |_| {
            if let Some(component) = weak.upgrade() {
                transitions.set(component.attr("required").is_some());
            }
        });
        if let Err(err) = observer.observe(node, ObserveOptions::attributes()) {
            tracing::warn!(target: targets::EMULATION, %err, "could not observe attributes");
        }
        Box::new(observer)
    }

    fn kill(&self, _: &dyn Component, state: SetupState) {
        let Ok(observer) = state.downcast::<MutationObserver>() else {
            return unexpected_state("required");
        };
        observer.disconnect();
    }
}

/// Listeners held by a structural (`last-child` / `nth-child`) setup.
struct StructuralWatch {
    observer: Arc<MutationObserver>,
    new_parent: ConnectionId,
    parent_removed: ConnectionId,
}

type StructuralTest = Arc<dyn Fn(&dyn Component) -> bool + Send + Sync>;

/// Re-check `test` whenever the parent's child list changes, following the
/// component to new parents.
fn watch_structure(
    component: &Arc<dyn Component>,
    transitions: Transitions,
    test: StructuralTest,
) -> SetupState {
    let weak = Arc::downgrade(component);

    let recheck: Arc<dyn Fn() + Send + Sync> = {
        let weak = weak.clone();
        Arc::new(move || {
            if let Some(component) = weak.upgrade() {
                transitions.set(test(component.as_ref()));
            }
        })
    };

    let observer = Arc::new(MutationObserver::new(component.dom_node().document(), {
        let recheck = recheck.clone();
        move |_| recheck()
    }));

    let observe_parent = {
        let observer = observer.clone();
        move |component: &dyn Component| {
            observer.disconnect();
            if let Some(parent) = component.parent()
                && let Err(err) = observer.observe(parent.dom_node(), ObserveOptions::child_list())
            {
                tracing::warn!(target: targets::EMULATION, %err, "could not observe parent");
            }
        }
    };
    observe_parent(component.as_ref());

    let new_parent = component.on(
        ComponentEvent::NewParent,
        Box::new({
            let weak = weak.clone();
            let recheck = recheck.clone();
            move || {
                if let Some(component) = weak.upgrade() {
                    observe_parent(component.as_ref());
                    recheck();
                }
            }
        }),
    );

    let parent_removed = component.on(
        ComponentEvent::ParentRemoved,
        Box::new({
            let observer = observer.clone();
            move || {
                observer.disconnect();
                recheck();
            }
        }),
    );

    Box::new(StructuralWatch {
        observer,
        new_parent,
        parent_removed,
    })
}

fn release_structure(pseudo_class: &str, component: &dyn Component, state: SetupState) {
    let Ok(watch) = state.downcast::<StructuralWatch>() else {
        return unexpected_state(pseudo_class);
    };
    watch.observer.disconnect();
    component.remove_listener(ComponentEvent::NewParent, watch.new_parent);
    component.remove_listener(ComponentEvent::ParentRemoved, watch.parent_removed);
}

fn is_last_child(component: &dyn Component) -> bool {
    component
        .dom_node()
        .position_in_parent()
        .is_some_and(|(index, count)| index + 1 == count)
}

/// `last-child`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastChild;

impl PseudoClassEmulator for LastChild {
    fn check(&self, component: &dyn Component, _: &PseudoClassParameter) -> bool {
        is_last_child(component)
    }

    fn setup(
        &self,
        component: &Arc<dyn Component>,
        transitions: Transitions,
        _: &PseudoClassParameter,
    ) -> SetupState {
        watch_structure(component, transitions, Arc::new(is_last_child))
    }

    fn kill(&self, component: &dyn Component, state: SetupState) {
        release_structure("last-child", component, state);
    }
}

fn nth_matches(component: &dyn Component, expr: Option<NthExpr>) -> bool {
    let Some(expr) = expr else {
        return false;
    };
    component
        .dom_node()
        .position_in_parent()
        .is_some_and(|(index, _)| expr.matches(index))
}

fn nth_parameter(parameter: &PseudoClassParameter) -> Option<NthExpr> {
    match parameter {
        PseudoClassParameter::Nth(expr) => Some(*expr),
        _ => None,
    }
}

/// `nth-child(An+B)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NthChild;

impl PseudoClassEmulator for NthChild {
    fn check(&self, component: &dyn Component, parameter: &PseudoClassParameter) -> bool {
        nth_matches(component, nth_parameter(parameter))
    }

    fn setup(
        &self,
        component: &Arc<dyn Component>,
        transitions: Transitions,
        parameter: &PseudoClassParameter,
    ) -> SetupState {
        let expr = nth_parameter(parameter);
        watch_structure(
            component,
            transitions,
            Arc::new(move |component: &dyn Component| nth_matches(component, expr)),
        )
    }

    fn kill(&self, component: &dyn Component, state: SetupState) {
        release_structure("nth-child", component, state);
    }

    fn process_parameter(&self, raw: Option<&str>) -> Result<PseudoClassParameter> {
        let raw = raw.unwrap_or_default();
        Ok(PseudoClassParameter::Nth(NthExpr::parse(raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn nth_child_compiles_its_parameter() {
        let parameter = NthChild.process_parameter(Some("2n+1")).unwrap();
        assert!(matches!(parameter, PseudoClassParameter::Nth(expr) if expr == NthExpr::odd()));

        let err = NthChild.process_parameter(None).unwrap_err();
        assert!(matches!(err, Error::InvalidPseudoClassSyntax { .. }));
        let err = NthChild.process_parameter(Some("x+1")).unwrap_err();
        assert!(matches!(err, Error::InvalidPseudoClassSyntax { .. }));
    }

    #[test]
    fn non_structural_builtins_take_raw_parameters() {
        assert!(matches!(
            Hover.process_parameter(None).unwrap(),
            PseudoClassParameter::None
        ));
    }
}
