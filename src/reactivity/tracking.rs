//! `track` and `trigger`: the read-side subscription and write-side
//! notification halves of the dependency graph.
//!
//! Every reactive container (object, array, map, set) and every derived
//! primitive (ref, computed) funnels its reads through [`track`] and its
//! writes through [`trigger`]; this module is the only place that knows how
//! a `(target, key)` pair resolves to "which effects run".

use std::collections::HashSet;
use std::rc::Rc;

use crate::core::dep::{Dep, KeyMap};
use crate::core::key::{Key, TargetKind, TrackOpTypes, TriggerOpTypes};
use crate::core::value::Value;
use crate::core::context::with_context;
use crate::primitives::effect::{DebugEvent, DebugOp, EffectInner};

/// Subscribe the currently executing effect (if any) to `(key_map, key)`.
///
/// No-op when tracking is globally paused or no effect is executing — the
/// overwhelming majority of reads in a program with no active effect, so
/// this returns as cheaply as possible.
pub fn track(key_map: &KeyMap, target_kind: TargetKind, op: TrackOpTypes, key: &Key) {
    with_context(|ctx| {
        if !ctx.should_track() {
            return;
        }
        let Some(effect) = ctx.active_effect() else {
            return;
        };

        let dep = key_map.dep_for(key);
        if dep.add(effect.clone()) {
            effect.add_dep(&dep);
            if let Some(hook) = effect.on_track() {
                hook(DebugEvent {
                    effect_id: effect.id(),
                    target_kind,
                    op: DebugOp::Track(op),
                    key: Some(key.clone()),
                    new_value: None,
                    old_value: None,
                });
            }
        }
    });
}

/// Resolve `(key_map, key)` plus `op` to the set of effects that must react,
/// and run (or schedule) each of them, per §4.1's selection rules.
#[allow(clippy::too_many_arguments)]
pub fn trigger(
    key_map: &KeyMap,
    target_kind: TargetKind,
    op: TriggerOpTypes,
    key: Option<&Key>,
    new_value: Option<Value>,
    old_value: Option<Value>,
) {
    if key_map.is_empty() {
        return;
    }

    let mut deps: Vec<Rc<Dep>> = Vec::new();

    if op == TriggerOpTypes::Clear {
        deps = key_map.all_deps();
    } else if target_kind == TargetKind::Array && key == Some(&Key::Length) {
        let new_length = match &new_value {
            Some(Value::Number(n)) if *n >= 0.0 => *n as usize,
            _ => 0,
        };
        if let Some(d) = key_map.get(&Key::Length) {
            deps.push(d);
        }
        deps.extend(key_map.index_deps_at_or_above(new_length));
    } else {
        if let Some(key) = key {
            if let Some(d) = key_map.get(key) {
                deps.push(d);
            }
        }
        match op {
            TriggerOpTypes::Add => {
                if target_kind != TargetKind::Array {
                    push_iterate_deps(key_map, target_kind, &mut deps);
                } else if matches!(key, Some(Key::Index(_))) {
                    if let Some(d) = key_map.get(&Key::Length) {
                        deps.push(d);
                    }
                }
            }
            TriggerOpTypes::Delete => {
                if target_kind != TargetKind::Array {
                    push_iterate_deps(key_map, target_kind, &mut deps);
                }
            }
            TriggerOpTypes::Set => {
                if target_kind == TargetKind::Map {
                    if let Some(d) = key_map.get(&Key::Iterate) {
                        deps.push(d);
                    }
                }
            }
            TriggerOpTypes::Clear => unreachable!("handled above"),
        }
    }

    run_triggered(deps, target_kind, op, key.cloned(), new_value, old_value);
}

fn push_iterate_deps(key_map: &KeyMap, target_kind: TargetKind, deps: &mut Vec<Rc<Dep>>) {
    if let Some(d) = key_map.get(&Key::Iterate) {
        deps.push(d);
    }
    if target_kind == TargetKind::Map {
        if let Some(d) = key_map.get(&Key::MapKeyIterate) {
            deps.push(d);
        }
    }
}

/// Union the effects across every collected dep (an effect subscribed to
/// both the keyed dep and `ITERATE_KEY`, say, must still only run once),
/// preserving first-seen order, then run or schedule each survivor.
fn run_triggered(
    deps: Vec<Rc<Dep>>,
    target_kind: TargetKind,
    op: TriggerOpTypes,
    key: Option<Key>,
    new_value: Option<Value>,
    old_value: Option<Value>,
) {
    let mut seen = HashSet::new();
    let mut effects: Vec<Rc<EffectInner>> = Vec::new();
    for dep in &deps {
        for effect in dep.snapshot() {
            if seen.insert(effect.id()) {
                effects.push(effect);
            }
        }
    }

    let current = with_context(|ctx| ctx.active_effect());

    for effect in effects {
        let is_self = current.as_ref().is_some_and(|c| Rc::ptr_eq(c, &effect));
        if is_self && !effect.allow_recurse() {
            continue;
        }

        if let Some(hook) = effect.on_trigger() {
            hook(DebugEvent {
                effect_id: effect.id(),
                target_kind,
                op: DebugOp::Trigger(op),
                key: key.clone(),
                new_value: new_value.clone(),
                old_value: old_value.clone(),
            });
        }

        if let Some(scheduler) = effect.scheduler() {
            scheduler(effect.clone());
        } else {
            effect.run();
        }
    }
}
