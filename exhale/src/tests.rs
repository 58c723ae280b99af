use crate::chunk::{Chunk, ChunkX, Heap, ResourceId};
use crate::config::Config;
use crate::consume::{consume, Amount};
use crate::errors::Failure;
use crate::lookup::lookup;
use crate::state::State;
use crate::summarize::summarize;
use crate::well_formed::assume_field_bounds;
use std::sync::Arc;
use sym::ast::{Term, Terms};
use sym::ast_util::{
    full_perm, mk_add, mk_eq, mk_false, mk_frac, mk_ite, mk_le, mk_lt, mk_not, no_perm, perm_sort,
    ref_sort, snap_sort, str_var,
};
use sym::decider::{CheckResult, Decider, Timeout};
use sym::ground::GroundDecider;
use sym::messages::{error_bare, Message};

fn rvar(x: &str) -> Term {
    str_var(x, &ref_sort())
}

fn svar(x: &str) -> Term {
    str_var(x, &snap_sort())
}

fn field_chunk(name: &str, recv: &Term, perm: &Term, snap: &Term) -> Chunk {
    ChunkX::new(ResourceId::field(name), vec![recv.clone()], perm.clone(), snap.clone())
}

fn query(recv: &Term) -> Terms {
    Arc::new(vec![recv.clone()])
}

fn descriptor() -> Message {
    error_bare("access to f")
}

fn check(decider: &mut GroundDecider, t: &Term) -> CheckResult {
    decider.check(t, Timeout::Unbounded)
}

#[test]
fn scenario_a_aliased_consume_succeeds() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r1, r2) = (rvar("r"), rvar("r1"), rvar("r2"));
    decider.assume(&mk_eq(&r1, &r));
    decider.assume(&mk_eq(&r2, &r));
    let heap = Heap::from_chunks(vec![
        field_chunk("f", &r1, &mk_frac(1, 2), &svar("s1")),
        field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2")),
    ]);
    let state = State::new(heap);

    let (state, _snap) = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r),
        &Amount::Exact(full_perm()),
        &descriptor(),
    )
    .unwrap();

    // both halves were provably drained and pruned
    assert!(state.heap.by_resource(&f).is_empty());
}

#[test]
fn scenario_a_unprovable_aliasing_fails() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r1, r2) = (rvar("r"), rvar("r1"), rvar("r2"));
    let heap = Heap::from_chunks(vec![
        field_chunk("f", &r1, &mk_frac(1, 2), &svar("s1")),
        field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2")),
    ]);
    let state = State::new(heap);

    let result = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r),
        &Amount::Exact(full_perm()),
        &descriptor(),
    );
    match result {
        Err(Failure::InsufficientPermission(_)) => {}
        other => panic!("expected insufficient permission, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn scenario_b_shortcut_proven_alias() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r0, s0) = (rvar("r"), rvar("r0"), svar("s0"));
    decider.assume(&mk_eq(&r, &r0));
    let chunk = field_chunk("f", &r0, &full_perm(), &s0);
    let state = State::new(Heap::from_chunks(vec![chunk.clone()]));

    let (_state, entry) =
        summarize(state, &mut decider, &config, &f, &[chunk], &query(&r));
    assert!(!entry.snapshot.is_fresh());
    assert_eq!(entry.snapshot.term(), &s0);
    assert_eq!(&entry.perm_sum, &full_perm());
    assert!(entry.definitions.is_empty());
}

#[test]
fn scenario_b_shortcut_refuted_alias() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r0, s0) = (rvar("r"), rvar("r0"), svar("s0"));
    decider.assume(&mk_not(&mk_eq(&r, &r0)));
    let chunk = field_chunk("f", &r0, &full_perm(), &s0);
    let state = State::new(Heap::from_chunks(vec![chunk.clone()]));

    let (_state, entry) =
        summarize(state, &mut decider, &config, &f, &[chunk], &query(&r));
    assert_eq!(&entry.perm_sum, &no_perm());
}

#[test]
fn shortcut_agrees_with_general_summary() {
    // under a proven alias, the shortcut's reused snapshot and the general
    // algorithm's fresh snapshot must be provably equal, as must the sums
    let f = ResourceId::field("f");
    let (r, r0, s0) = (rvar("r"), rvar("r0"), svar("s0"));
    let chunk = field_chunk("f", &r0, &full_perm(), &s0);

    let mut shortcut_decider = GroundDecider::new();
    shortcut_decider.assume(&mk_eq(&r, &r0));
    let config = Config::default();
    let state = State::new(Heap::from_chunks(vec![chunk.clone()]));
    let (_state, shortcut) =
        summarize(state, &mut shortcut_decider, &config, &f, &[chunk.clone()], &query(&r));

    let mut general_decider = GroundDecider::new();
    general_decider.assume(&mk_eq(&r, &r0));
    let config = Config { counterexamples: true, ..Config::default() };
    let state = State::new(Heap::from_chunks(vec![chunk.clone()]));
    let (_state, general) =
        summarize(state, &mut general_decider, &config, &f, &[chunk], &query(&r));

    assert_eq!(
        check(&mut general_decider, &mk_eq(general.snapshot.term(), shortcut.snapshot.term())),
        CheckResult::Provable
    );
    assert_eq!(
        check(&mut general_decider, &mk_eq(&general.perm_sum, &shortcut.perm_sum)),
        CheckResult::Provable
    );
}

#[test]
fn summary_cache_is_idempotent() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r1, r2) = (rvar("r"), rvar("r1"), rvar("r2"));
    let chunks = vec![
        field_chunk("f", &r1, &mk_frac(1, 2), &svar("s1")),
        field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2")),
    ];
    let state = State::new(Heap::from_chunks(chunks.clone()));

    let (state, first) = summarize(state, &mut decider, &config, &f, &chunks, &query(&r));
    let assumptions = decider.assumption_count();
    let decls = decider.decls().len();

    let (_state, second) = summarize(state, &mut decider, &config, &f, &chunks, &query(&r));
    assert_eq!(first.snapshot.term(), second.snapshot.term());
    assert_eq!(&first.perm_sum, &second.perm_sum);
    // the hit adds no assumptions and declares nothing new
    assert_eq!(decider.assumption_count(), assumptions);
    assert_eq!(decider.decls().len(), decls);
}

#[test]
fn ambiguous_summary_synthesizes_fresh_snapshot() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r1, r2) = (rvar("r"), rvar("r1"), rvar("r2"));
    let chunks = vec![
        field_chunk("f", &r1, &mk_frac(1, 2), &svar("s1")),
        field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2")),
    ];
    let state = State::with_recording(Heap::from_chunks(chunks.clone()));

    let (state, entry) = summarize(state, &mut decider, &config, &f, &chunks, &query(&r));
    assert!(entry.snapshot.is_fresh());
    assert_eq!(entry.definitions.len(), 2);
    // the fresh value definition was recorded for replay
    assert_eq!(state.recorder.recorded().unwrap().value_defs.len(), 1);
}

#[test]
fn syntactic_match_reuses_snapshot() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r0, r2, s1) = (rvar("r0"), rvar("r2"), svar("s1"));
    let chunks = vec![
        field_chunk("f", &r0, &mk_frac(1, 2), &s1),
        field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2")),
    ];
    let state = State::new(Heap::from_chunks(chunks.clone()));

    let (_state, entry) = summarize(state, &mut decider, &config, &f, &chunks, &query(&r0));
    assert!(!entry.snapshot.is_fresh());
    assert_eq!(entry.snapshot.term(), &s1);
}

#[test]
fn lookup_returns_snapshot_and_keeps_heap() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let heap = Heap::new().add(field_chunk("f", &r0, &full_perm(), &s0));
    let state = State::new(heap);

    let (state, snap) =
        lookup(state, &mut decider, &config, &f, &query(&r0), &descriptor()).unwrap();
    assert_eq!(&snap, &s0);
    assert_eq!(state.heap.len(), 1);
}

#[test]
fn lookup_vacuous_on_infeasible_branch() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    decider.assume(&mk_false());
    let state = State::new(Heap::new());

    let result =
        lookup(state, &mut decider, &config, &ResourceId::field("f"), &query(&rvar("r")), &descriptor());
    assert!(result.is_ok());
}

#[test]
fn lookup_fails_without_chunks() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let state = State::new(Heap::new());

    let result =
        lookup(state, &mut decider, &config, &ResourceId::field("f"), &query(&rvar("r")), &descriptor());
    match result {
        Err(Failure::InsufficientPermission(msg)) => {
            assert!(msg.note.contains("insufficient permission for field f"));
            assert!(msg.note.contains("access to f"));
        }
        other => panic!("expected insufficient permission, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn consume_nothing_from_empty_heap() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let state = State::new(Heap::new());

    let ok = consume(
        state.clone(),
        &mut decider,
        &config,
        &f,
        &query(&rvar("r")),
        &Amount::Exact(no_perm()),
        &descriptor(),
    );
    assert!(ok.is_ok());

    let err = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&rvar("r")),
        &Amount::Exact(mk_frac(1, 2)),
        &descriptor(),
    );
    assert!(matches!(err, Err(Failure::InsufficientPermission(_))));
}

#[test]
fn partial_consume_leaves_remainder() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let state = State::new(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &s0)]));

    let (state, _snap) = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r0),
        &Amount::Exact(mk_frac(1, 2)),
        &descriptor(),
    )
    .unwrap();

    let remaining = state.heap.by_resource(&f);
    assert_eq!(remaining.len(), 1);
    // original minus requested, through the amount-taken abstraction
    assert_eq!(
        check(&mut decider, &mk_eq(&remaining[0].perm, &mk_frac(1, 2))),
        CheckResult::Provable
    );
}

#[test]
fn definite_alias_is_consumed_first() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r1, r2, s1) = (rvar("r"), rvar("r1"), rvar("r2"), svar("s1"));
    decider.assume(&mk_eq(&r2, &r));
    let c1 = field_chunk("f", &r1, &mk_frac(1, 2), &s1);
    let c2 = field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2"));
    let state = State::new(Heap::from_chunks(vec![c1, c2]));

    let (state, _snap) = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r),
        &Amount::Exact(mk_frac(1, 2)),
        &descriptor(),
    )
    .unwrap();

    // the aliased chunk alone satisfied the request: exactly one
    // amount-taken abstraction, and the other chunk passed through intact
    assert_eq!(decider.macro_count(), 1);
    let remaining = state.heap.by_resource(&f);
    assert_eq!(remaining.len(), 1);
    assert_eq!(&remaining[0].args[0], &r1);
    assert_eq!(&remaining[0].perm, &mk_frac(1, 2));
    assert_eq!(&remaining[0].snap, &s1);
}

#[test]
fn recording_branch_consumes_by_assertion() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let state =
        State::with_recording(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &s0)]));

    let (state, snap) = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r0),
        &Amount::Exact(mk_frac(1, 2)),
        &descriptor(),
    )
    .unwrap();

    // sufficiency was asserted but the heap was not split
    assert_eq!(&snap, &s0);
    let remaining = state.heap.by_resource(&f);
    assert_eq!(remaining.len(), 1);
    assert_eq!(&remaining[0].perm, &full_perm());
}

#[test]
fn assert_only_config_keeps_heap() {
    let mut decider = GroundDecider::new();
    let config = Config { assert_only: true, ..Config::default() };
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let state = State::new(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &s0)]));

    let (state, _snap) = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r0),
        &Amount::Exact(full_perm()),
        &descriptor(),
    )
    .unwrap();
    assert_eq!(state.heap.by_resource(&f).len(), 1);
}

#[test]
fn scenario_c_constrainable_binds_requested_amount() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let p = str_var("p", &perm_sort());
    let state = State::new(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &s0)]));

    let (state, _snap) = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r0),
        &Amount::Constrainable(p.clone()),
        &descriptor(),
    )
    .unwrap();

    // p is now the chosen amount, strictly between zero and one
    assert_eq!(check(&mut decider, &mk_lt(&no_perm(), &p)), CheckResult::Provable);
    assert_eq!(check(&mut decider, &mk_lt(&p, &full_perm())), CheckResult::Provable);
    // the chunk was split, not dropped
    assert_eq!(state.heap.by_resource(&f).len(), 1);
}

#[test]
fn constrainable_fails_when_unprovable() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r, r0) = (rvar("r"), rvar("r0"));
    let p = str_var("p", &perm_sort());
    let state = State::new(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &svar("s0"))]));

    // aliasing of r and r0 is unknown, so no positive amount is provable
    let result = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r),
        &Amount::Constrainable(p),
        &descriptor(),
    );
    assert!(matches!(result, Err(Failure::InsufficientPermission(_))));
}

#[test]
fn field_bounds_hold_after_pass() {
    let mut decider = GroundDecider::new();
    let (r1, r2) = (rvar("r1"), rvar("r2"));
    let heap = Heap::from_chunks(vec![
        field_chunk("f", &r1, &mk_frac(1, 2), &svar("s1")),
        field_chunk("f", &r2, &mk_frac(1, 2), &svar("s2")),
    ]);
    let state = State::new(heap);

    assume_field_bounds(&state, &mut decider);

    // for each concrete receiver, the compatible permission sum is <= 1
    for recv in vec![r1.clone(), r2.clone()] {
        let sum = mk_add(&[
            mk_ite(&mk_eq(&r1, &recv), &mk_frac(1, 2), &no_perm()),
            mk_ite(&mk_eq(&r2, &recv), &mk_frac(1, 2), &no_perm()),
        ]);
        assert_eq!(
            check(&mut decider, &mk_le(&sum, &full_perm())),
            CheckResult::Provable
        );
    }
}

#[test]
fn cancellation_aborts_split_cleanly() {
    let mut decider = GroundDecider::new();
    let config = Config::default();
    config.cancel.store(true, std::sync::atomic::Ordering::Relaxed);
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let state = State::new(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &s0)]));

    let result = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r0),
        &Amount::Exact(mk_frac(1, 2)),
        &descriptor(),
    );
    assert!(matches!(result, Err(Failure::Canceled)));
}

#[test]
fn taken_macros_are_recorded_for_replay() {
    // exact consumption with a recorder would lose bookkeeping, so the
    // dispatcher refuses it; drive the macro path through a plain branch
    // and observe the declarations instead
    let mut decider = GroundDecider::new();
    let config = Config::default();
    let f = ResourceId::field("f");
    let (r0, s0) = (rvar("r0"), svar("s0"));
    let state = State::new(Heap::from_chunks(vec![field_chunk("f", &r0, &full_perm(), &s0)]));

    let before = decider.macro_count();
    let _ = consume(
        state,
        &mut decider,
        &config,
        &f,
        &query(&r0),
        &Amount::Exact(mk_frac(1, 2)),
        &descriptor(),
    )
    .unwrap();
    assert_eq!(decider.macro_count(), before + 1);
}
