use bot_bt::{
    BehaviourTree, BtNode, Condition, Decorator, DecoratorKind, Leaf, Selector, Sequence,
    TreeBuilder, TreeError,
};
use bot_core::{Blackboard, ContractViolation, Status};

#[derive(Default)]
struct Recorder {
    ticked: Vec<&'static str>,
    blackboard: Blackboard,
}

fn leaf(name: &'static str, status: Status) -> Box<dyn BtNode<Recorder>> {
    Box::new(Leaf::new(name, move |r: &mut Recorder| {
        r.ticked.push(name);
        Ok(status)
    }))
}

#[test]
fn sequence_stops_at_first_failure() {
    let root = Sequence::new(vec![
        leaf("a", Status::Success),
        leaf("b", Status::Failure),
        leaf("c", Status::Success),
    ]);
    let tree = BehaviourTree::new("scenario-a", Box::new(root));

    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Failure));
    assert_eq!(rec.ticked, vec!["a", "b"]);
}

#[test]
fn sequence_of_successes_succeeds() {
    let tree = BehaviourTree::new(
        "all-good",
        Box::new(Sequence::new(vec![
            leaf("a", Status::Success),
            leaf("b", Status::Success),
        ])),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Success));
    assert_eq!(rec.ticked, vec!["a", "b"]);
}

#[test]
fn selector_stops_at_first_success() {
    let tree = BehaviourTree::new(
        "fallbacks",
        Box::new(Selector::new(vec![
            leaf("a", Status::Failure),
            leaf("b", Status::Success),
            leaf("c", Status::Success),
        ])),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Success));
    assert_eq!(rec.ticked, vec!["a", "b"]);
}

#[test]
fn selector_of_failures_fails() {
    let tree = BehaviourTree::new(
        "nothing-works",
        Box::new(Selector::new(vec![
            leaf("a", Status::Failure),
            leaf("b", Status::Failure),
        ])),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Failure));
    assert_eq!(rec.ticked, vec!["a", "b"]);
}

#[test]
fn running_short_circuits_composites_without_memory() {
    let tree = BehaviourTree::new(
        "running",
        Box::new(Sequence::new(vec![
            leaf("a", Status::Success),
            leaf("b", Status::Running),
            leaf("c", Status::Success),
        ])),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Running));
    assert_eq!(tree.tick(&mut rec), Ok(Status::Running));
    // No resume point is kept: the second tick starts again at `a`.
    assert_eq!(rec.ticked, vec!["a", "b", "a", "b"]);
}

#[test]
fn decorators_transform_child_status() {
    let cases = [
        (DecoratorKind::Inverter, Status::Success, Status::Failure),
        (DecoratorKind::Inverter, Status::Failure, Status::Success),
        (DecoratorKind::Succeeder, Status::Failure, Status::Success),
        (DecoratorKind::Failer, Status::Success, Status::Failure),
        (DecoratorKind::Inverter, Status::Running, Status::Running),
    ];
    for (kind, child, expected) in cases {
        let tree = BehaviourTree::new("dec", Box::new(Decorator::new(kind, leaf("x", child))));
        let mut rec = Recorder::default();
        assert_eq!(tree.tick(&mut rec), Ok(expected), "{kind:?} over {child:?}");
    }
}

#[test]
fn repeat_ticks_child_n_times() {
    let tree = BehaviourTree::new(
        "repeat",
        Box::new(Decorator::new(
            DecoratorKind::Repeat { times: 3 },
            leaf("x", Status::Success),
        )),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Success));
    assert_eq!(rec.ticked.len(), 3);
}

#[test]
fn retry_until_success_gives_up_after_attempts() {
    let tree = BehaviourTree::new(
        "retry",
        Box::new(Decorator::new(
            DecoratorKind::RetryUntilSuccess { attempts: 4 },
            leaf("x", Status::Failure),
        )),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Failure));
    assert_eq!(rec.ticked.len(), 4);
}

#[test]
fn retry_until_success_stops_once_child_succeeds() {
    let tree = BehaviourTree::new(
        "retry",
        Box::new(Decorator::new(
            DecoratorKind::RetryUntilSuccess { attempts: 5 },
            Box::new(Leaf::new("flaky", |r: &mut Recorder| {
                r.ticked.push("flaky");
                Ok(Status::from(r.ticked.len() == 2))
            })),
        )),
    );
    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Success));
    assert_eq!(rec.ticked.len(), 2);
}

#[test]
fn contract_violation_aborts_the_whole_tick() {
    let tree = TreeBuilder::new("wiring-bug")
        .selector("root")
        .leaf("reads-missing", |r: &mut Recorder| {
            let _ = r.blackboard.get::<u32>("never.written")?;
            Ok(Status::Success)
        })
        .leaf("fallback", |r: &mut Recorder| {
            r.ticked.push("fallback");
            Ok(Status::Success)
        })
        .end()
        .build()
        .expect("tree builds");

    let mut rec = Recorder::default();
    let err = tree.tick(&mut rec).unwrap_err();
    assert!(matches!(err, ContractViolation::MissingKey { .. }));
    // The selector must not treat the violation as an ordinary failure.
    assert!(rec.ticked.is_empty());
}

#[test]
fn builder_nests_composites_and_decorators() {
    let tree = TreeBuilder::new("nested")
        .sequence("root")
        .leaf("first", |r: &mut Recorder| {
            r.ticked.push("first");
            Ok(Status::Success)
        })
        .inverter()
        .selector("inner")
        .leaf("fails", |r: &mut Recorder| {
            r.ticked.push("fails");
            Ok(Status::Failure)
        })
        .end()
        .node(Box::new(Condition::new("always", |_: &Recorder| true)))
        .end()
        .build()
        .expect("tree builds");

    let mut rec = Recorder::default();
    assert_eq!(tree.tick(&mut rec), Ok(Status::Success));
    assert_eq!(rec.ticked, vec!["first", "fails"]);
    assert_eq!(tree.root_label(), "root");
}

#[test]
fn builder_reports_structural_errors() {
    let unclosed = TreeBuilder::<Recorder>::new("t").sequence("s").build();
    assert_eq!(unclosed.err(), Some(TreeError::UnclosedComposite(1)));

    let unbalanced = TreeBuilder::<Recorder>::new("t").end().build();
    assert_eq!(unbalanced.err(), Some(TreeError::UnbalancedEnd));

    let empty = TreeBuilder::<Recorder>::new("t").build();
    assert_eq!(empty.err(), Some(TreeError::NoRoot));

    let dangling = TreeBuilder::<Recorder>::new("t").inverter().build();
    assert_eq!(
        dangling.err(),
        Some(TreeError::EmptyDecorator("inverter".to_string()))
    );

    let two_roots = TreeBuilder::new("t")
        .leaf("a", |_: &mut Recorder| Ok(Status::Success))
        .leaf("b", |_: &mut Recorder| Ok(Status::Success))
        .build();
    assert_eq!(two_roots.err(), Some(TreeError::MultipleRoots));
}
