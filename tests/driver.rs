use cobyla_core::{
    Constraints, EngineContext, ExitStatus, InputError, IterationEngine, Options, cobyla,
    cobyla_with_engine, NullEngine,
};
use cobyla_core::evaluate::ObjCon;
use ndarray::{Array1, ArrayView1, array};
use std::cell::Cell;

fn sphere(x: ArrayView1<'_, f64>) -> (f64, Array1<f64>) {
    (x.iter().map(|v| v * v).sum(), Array1::zeros(0))
}

#[test]
fn sphere_returns_the_best_simplex_vertex() {
    let result = cobyla(sphere, 0, array![5.0, 5.0], &Constraints::default(), &Options::default())
        .unwrap();
    // Vertices (6,5) and (5,5+1) both evaluate to 61; the base (5,5) at 50
    // dominates them, so it is the only filter entry and the returned point.
    assert_eq!(result.x, array![5.0, 5.0]);
    assert_eq!(result.f, 50.0);
    assert_eq!(result.cstrv, 0.0);
    assert_eq!(result.nf, 3);
    assert_eq!(result.status, ExitStatus::SmallTrRadius);

    let fhist = result.fhist.unwrap();
    assert_eq!(fhist, array![50.0, 61.0, 61.0]);
    let xhist = result.xhist.unwrap();
    assert_eq!(xhist.column(0).to_owned(), array![5.0, 5.0]);
    assert_eq!(xhist.column(1).to_owned(), array![6.0, 5.0]);
    assert_eq!(xhist.column(2).to_owned(), array![5.0, 6.0]);
    assert_eq!(result.chist.unwrap(), array![0.0, 0.0, 0.0]);
}

#[test]
fn supplied_starting_values_skip_one_evaluation() {
    let calls = Cell::new(0usize);
    let calcfc = |x: ArrayView1<'_, f64>| {
        calls.set(calls.get() + 1);
        sphere(x)
    };
    let result = cobyla_with_engine(
        calcfc,
        0,
        array![5.0, 5.0],
        &Constraints::default(),
        &Options::default(),
        Some(50.0),
        Some(Array1::zeros(0)),
        None,
        &mut NullEngine,
    )
    .unwrap();
    // The starting point still counts as an evaluation, but the evaluator
    // was only called for the two other vertices.
    assert_eq!(calls.get(), 2);
    assert_eq!(result.nf, 3);
    assert_eq!(result.f, 50.0);
}

#[test]
fn inconsistent_starting_constraints_are_rejected() {
    let err = cobyla_with_engine(
        sphere,
        2,
        array![0.0],
        &Constraints::default(),
        &Options::default(),
        Some(0.0),
        Some(array![0.0]),
        None,
        &mut NullEngine,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        InputError::NlConstr0Size { got: 1, expected: 2 }
    ));
}

#[test]
fn ftarget_stops_at_the_starting_point() {
    let result = cobyla(
        sphere,
        0,
        array![5.0, 5.0],
        &Constraints::default(),
        &Options {
            ftarget: Some(100.0),
            ..Options::default()
        },
    )
    .unwrap();
    assert_eq!(result.status, ExitStatus::FtargetAchieved);
    assert_eq!(result.nf, 1);
    assert_eq!(result.f, 50.0);
}

#[test]
fn zero_filter_capacity_falls_back_to_the_base_vertex() {
    let result = cobyla(
        sphere,
        0,
        array![5.0, 5.0],
        &Constraints::default(),
        &Options {
            maxfilt: Some(0),
            ..Options::default()
        },
    )
    .unwrap();
    assert_eq!(result.x, array![5.0, 5.0]);
    assert_eq!(result.f, 50.0);
    assert_eq!(result.status, ExitStatus::SmallTrRadius);
}

#[test]
fn linear_constraints_come_first_in_the_constraint_vector() {
    let constraints = Constraints {
        xl: Some(array![0.0, 0.0]),
        aineq: Some(array![[1.0, 1.0]]),
        bineq: Some(array![2.0]),
        ..Constraints::default()
    };
    let result = cobyla(sphere, 0, array![1.0, 2.0], &constraints, &Options::default()).unwrap();
    // Every vertex violates x0 + x1 <= 2; the base violates it least and
    // has the best objective, so it wins the merit selection.
    assert_eq!(result.x, array![1.0, 2.0]);
    // Rows: -x0 <= 0, -x1 <= 0, then the inequality residual.
    assert_eq!(result.constr, array![-1.0, -2.0, 1.0]);
    assert_eq!(result.cstrv, 1.0);
}

struct ProbingEngine {
    ran: bool,
}

impl IterationEngine for ProbingEngine {
    fn run(&mut self, _calcfc: &mut ObjCon<'_>, ctx: EngineContext<'_>) -> ExitStatus {
        // The hand-off must allow seamless resumption.
        self.ran = true;
        assert_eq!(*ctx.nf, 3);
        assert_eq!(ctx.history.total(), 3);
        assert!(!ctx.filter.is_empty());
        assert!(ctx.state.evaluated.iter().all(|&e| e));
        assert!(ctx.params.rhoend <= ctx.params.rhobeg);
        assert!(ctx.lincon.is_none());
        ExitStatus::MaxTrReached
    }
}

#[test]
fn the_engine_resumes_from_the_initialized_state() {
    let mut engine = ProbingEngine { ran: false };
    let result = cobyla_with_engine(
        sphere,
        0,
        array![5.0, 5.0],
        &Constraints::default(),
        &Options::default(),
        None,
        None,
        None,
        &mut engine,
    )
    .unwrap();
    assert!(engine.ran);
    assert_eq!(result.status, ExitStatus::MaxTrReached);
}

#[test]
fn an_early_stop_skips_the_engine() {
    let mut engine = ProbingEngine { ran: false };
    let result = cobyla_with_engine(
        sphere,
        0,
        array![5.0, 5.0],
        &Constraints::default(),
        &Options {
            ftarget: Some(100.0),
            ..Options::default()
        },
        None,
        None,
        None,
        &mut engine,
    )
    .unwrap();
    assert!(!engine.ran);
    assert_eq!(result.status, ExitStatus::FtargetAchieved);
}

#[test]
fn the_callback_cancels_a_run() {
    let mut cancel =
        |_x: ArrayView1<'_, f64>, _f: f64, _nf: usize, _c: f64, _con: ArrayView1<'_, f64>| true;
    let result = cobyla_with_engine(
        sphere,
        0,
        array![5.0, 5.0],
        &Constraints::default(),
        &Options::default(),
        None,
        None,
        Some(&mut cancel),
        &mut NullEngine,
    )
    .unwrap();
    assert_eq!(result.status, ExitStatus::CallbackTerminate);
    assert_eq!(result.nf, 1);
    assert_eq!(result.f, 50.0);
}

#[test]
fn a_nan_objective_is_moderated_not_propagated() {
    let calcfc = |_x: ArrayView1<'_, f64>| (f64::NAN, Array1::zeros(0));
    let result = cobyla(
        calcfc,
        0,
        array![0.0, 0.0],
        &Constraints::default(),
        &Options::default(),
    )
    .unwrap();
    assert!(result.f.is_finite());
    assert_eq!(result.f, f64::MAX);
    assert_eq!(result.status, ExitStatus::SmallTrRadius);
}
