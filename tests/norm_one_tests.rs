//! One-norm bridge against the in-memory host model.

use cvxbridge::model::ModelResult;
use cvxbridge::prelude::*;

const TOL: f64 = 1e-10;

fn assert_close(got: &[f64], expected: &[f64]) {
    assert_eq!(got.len(), expected.len(), "got {:?}, expected {:?}", got, expected);
    for (g, e) in got.iter().zip(expected) {
        assert!((g - e).abs() < TOL, "got {:?}, expected {:?}", got, expected);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    DeleteConstraint(ConstraintIndex),
    DeleteVariables(Vec<VariableIndex>),
}

/// Host that forwards to [`Model`], records deletions and can refuse one of them.
struct RecordingModel {
    inner: Model,
    calls: Vec<Call>,
    refuse_delete: Option<ConstraintIndex>,
}

impl RecordingModel {
    fn new() -> Self {
        RecordingModel {
            inner: Model::new(),
            calls: Vec::new(),
            refuse_delete: None,
        }
    }
}

impl HostModel for RecordingModel {
    fn add_variables(&mut self, count: usize) -> ModelResult<Vec<VariableIndex>> {
        self.inner.add_variables(count)
    }

    fn add_constraint(
        &mut self,
        function: VectorAffineFunction,
        set: ConeSet,
    ) -> ModelResult<ConstraintIndex> {
        self.inner.add_constraint(function, set)
    }

    fn constraint_function(&self, c: ConstraintIndex) -> ModelResult<VectorAffineFunction> {
        self.inner.constraint_function(c)
    }

    fn set_constraint_function(
        &mut self,
        c: ConstraintIndex,
        function: VectorAffineFunction,
    ) -> ModelResult<()> {
        self.inner.set_constraint_function(c, function)
    }

    fn constraint_set(&self, c: ConstraintIndex) -> ModelResult<ConeSet> {
        self.inner.constraint_set(c)
    }

    fn constraint_primal(&self, c: ConstraintIndex) -> ModelResult<Vec<f64>> {
        self.inner.constraint_primal(c)
    }

    fn constraint_dual(&self, c: ConstraintIndex) -> ModelResult<Vec<f64>> {
        self.inner.constraint_dual(c)
    }

    fn constraint_primal_start(&self, c: ConstraintIndex) -> ModelResult<Option<Vec<f64>>> {
        self.inner.constraint_primal_start(c)
    }

    fn constraint_dual_start(&self, c: ConstraintIndex) -> ModelResult<Option<Vec<f64>>> {
        self.inner.constraint_dual_start(c)
    }

    fn set_constraint_primal_start(
        &mut self,
        c: ConstraintIndex,
        value: &[f64],
    ) -> ModelResult<()> {
        self.inner.set_constraint_primal_start(c, value)
    }

    fn set_constraint_dual_start(&mut self, c: ConstraintIndex, value: &[f64]) -> ModelResult<()> {
        self.inner.set_constraint_dual_start(c, value)
    }

    fn variable_primal_start(&self, v: VariableIndex) -> ModelResult<Option<f64>> {
        self.inner.variable_primal_start(v)
    }

    fn set_variable_primal_start(&mut self, v: VariableIndex, value: f64) -> ModelResult<()> {
        self.inner.set_variable_primal_start(v, value)
    }

    fn delete_constraint(&mut self, c: ConstraintIndex) -> ModelResult<()> {
        self.calls.push(Call::DeleteConstraint(c));
        if self.refuse_delete == Some(c) {
            return Err(ModelError::InvalidConstraint(c));
        }
        self.inner.delete_constraint(c)
    }

    fn delete_variables(&mut self, vars: &[VariableIndex]) -> ModelResult<()> {
        self.calls.push(Call::DeleteVariables(vars.to_vec()));
        self.inner.delete_variables(vars)
    }

    fn is_valid_variable(&self, v: VariableIndex) -> bool {
        self.inner.is_valid_variable(v)
    }

    fn is_valid_constraint(&self, c: ConstraintIndex) -> bool {
        self.inner.is_valid_constraint(c)
    }
}

fn setup(model: &mut dyn HostModel) -> (Vec<VariableIndex>, NormOneBridge) {
    let vars = model.add_variables(3).unwrap();
    let bridge = NormOneBridge::construct(
        model,
        VectorAffineFunction::variables(&vars),
        ConeSet::NormOne(3),
        &Settings::default(),
    )
    .unwrap();
    (vars, bridge)
}

#[test]
fn test_construct() {
    let mut model = Model::new();
    let (vars, bridge) = setup(&mut model);

    let y = bridge.auxiliary_variables().to_vec();
    assert_eq!(y.len(), 2);
    assert_eq!(bridge.added_variables(), y);
    assert_eq!(
        bridge.added_constraints(),
        vec![bridge.greater_than_constraint(), bridge.nonneg_constraint()]
    );

    // [y1 - x1, y2 - x2, y1 + x1, y2 + x2]
    let nn = model.constraint_function(bridge.nonneg_constraint()).unwrap();
    assert_eq!(nn.coefficient(0, y[0]), 1.0);
    assert_eq!(nn.coefficient(0, vars[1]), -1.0);
    assert_eq!(nn.coefficient(3, y[1]), 1.0);
    assert_eq!(nn.coefficient(3, vars[2]), 1.0);
    assert_eq!(nn.coefficient(1, vars[0]), 0.0);
}

#[test]
fn test_primal_from_solution() {
    // Scenario: (t, x1, x2) = (7, 3, -4) with y at |x|
    let mut model = Model::new();
    let (vars, bridge) = setup(&mut model);
    for (var, value) in vars.iter().zip([7.0, 3.0, -4.0]) {
        model.set_variable_primal(*var, value).unwrap();
    }
    for (var, value) in bridge.auxiliary_variables().iter().zip([3.0, 4.0]) {
        model.set_variable_primal(*var, value).unwrap();
    }

    assert_close(
        &model.constraint_primal(bridge.nonneg_constraint()).unwrap(),
        &[0.0, 8.0, 6.0, 0.0],
    );
    assert_close(
        &model.constraint_primal(bridge.greater_than_constraint()).unwrap(),
        &[0.0],
    );
    assert_close(bridge.primal(&model).unwrap().as_slice(), &[7.0, 3.0, -4.0]);
}

#[test]
fn test_primal_independent_of_auxiliary_values() {
    // Any feasible y yields the same source value
    let mut model = Model::new();
    let (vars, bridge) = setup(&mut model);
    for (var, value) in vars.iter().zip([9.0, 1.0, -2.0]) {
        model.set_variable_primal(*var, value).unwrap();
    }
    for (var, value) in bridge.auxiliary_variables().iter().zip([2.5, 5.0]) {
        model.set_variable_primal(*var, value).unwrap();
    }
    assert_close(bridge.primal(&model).unwrap().as_slice(), &[9.0, 1.0, -2.0]);
}

#[test]
fn test_dual_from_solution() {
    let mut model = Model::new();
    let (_vars, bridge) = setup(&mut model);
    model
        .set_constraint_dual(bridge.greater_than_constraint(), &[2.0])
        .unwrap();
    model
        .set_constraint_dual(bridge.nonneg_constraint(), &[0.0, 2.0, 2.0, 0.0])
        .unwrap();
    assert_close(bridge.dual(&model).unwrap().as_slice(), &[2.0, 2.0, -2.0]);
}

#[test]
fn test_primal_start() {
    let mut model = Model::new();
    let (_vars, bridge) = setup(&mut model);
    assert_eq!(bridge.primal_start(&model).unwrap(), None);

    bridge.set_primal_start(&mut model, &[7.0, 3.0, -4.0]).unwrap();

    let y = bridge.auxiliary_variables();
    assert_eq!(model.variable_primal_start(y[0]).unwrap(), Some(3.0));
    assert_eq!(model.variable_primal_start(y[1]).unwrap(), Some(4.0));
    assert_eq!(
        model
            .constraint_primal_start(bridge.nonneg_constraint())
            .unwrap(),
        Some(vec![0.0, 8.0, 6.0, 0.0])
    );
    assert_eq!(
        model
            .constraint_primal_start(bridge.greater_than_constraint())
            .unwrap(),
        Some(vec![0.0])
    );

    let start = bridge.primal_start(&model).unwrap().unwrap();
    assert_close(start.as_slice(), &[7.0, 3.0, -4.0]);
}

#[test]
fn test_dual_start() {
    let mut model = Model::new();
    let (_vars, bridge) = setup(&mut model);
    bridge.set_dual_start(&mut model, &[4.0, 1.0, -2.0]).unwrap();

    assert_eq!(
        model
            .constraint_dual_start(bridge.greater_than_constraint())
            .unwrap(),
        Some(vec![4.0])
    );
    assert_eq!(
        model
            .constraint_dual_start(bridge.nonneg_constraint())
            .unwrap(),
        Some(vec![0.0, 2.0, 1.0, 0.0])
    );

    let start = bridge.dual_start(&model).unwrap().unwrap();
    assert_close(start.as_slice(), &[4.0, 1.0, -2.0]);
}

#[test]
fn test_start_dimension_checked() {
    let mut model = Model::new();
    let (_vars, bridge) = setup(&mut model);
    let err = bridge.set_primal_start(&mut model, &[1.0]).unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedShape { .. }));
    let err = bridge.set_dual_start(&mut model, &[1.0, 0.0, 0.0, 0.0]).unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedShape { .. }));
}

#[test]
fn test_function_with_constant_read_back() {
    let mut model = Model::new();
    let vars = model.add_variables(2).unwrap();
    // [2 x0 + 1, x1 - 5]
    let f = VectorAffineFunction::constant(&[1.0, -5.0])
        .with_term(0, vars[0], 2.0)
        .with_term(1, vars[1], 1.0);
    let bridge =
        NormOneBridge::construct(&mut model, f, ConeSet::NormOne(2), &Settings::default()).unwrap();

    let back = bridge.function(&model).unwrap();
    assert_eq!(back.variable_ids(), vars);
    assert_close(back.constant.as_slice(), &[1.0, -5.0]);
    assert!((back.coefficient(0, vars[0]) - 2.0).abs() < TOL);
    assert!((back.coefficient(1, vars[1]) - 1.0).abs() < TOL);
}

#[test]
fn test_function_rejects_tampered_constraint() {
    let mut model = Model::new();
    let (vars, bridge) = setup(&mut model);
    // Dropping y_1 from the greater-than row leaves it uncancelled
    let y = bridge.auxiliary_variables();
    let tampered = VectorAffineFunction::zeros(1)
        .with_term(0, vars[0], 1.0)
        .with_term(0, y[1], -1.0);
    model
        .set_constraint_function(bridge.greater_than_constraint(), tampered)
        .unwrap();

    let err = bridge.function(&model).unwrap_err();
    assert!(matches!(err, BridgeError::InvariantViolation(_)));
}

#[test]
fn test_through_registry() {
    let registry = BridgeRegistry::default();
    let mut model = Model::new();
    let vars = model.add_variables(4).unwrap();
    let bridge = registry
        .install(&mut model, VectorAffineFunction::variables(&vars), ConeSet::NormOne(4))
        .unwrap();

    assert_eq!(bridge.source_kind(), ConeKind::NormOne);
    assert_eq!(bridge.added_variables().len(), 3);
    assert_eq!(bridge.set(&model).unwrap(), ConeSet::NormOne(4));

    bridge.delete(&mut model).unwrap();
    assert_eq!(model.variable_indices(), vars);
    assert_eq!(model.num_constraints(), 0);
}

#[test]
fn test_delete_order() {
    let mut model = RecordingModel::new();
    let (vars, bridge) = setup(&mut model);
    let ge = bridge.greater_than_constraint();
    let nn = bridge.nonneg_constraint();
    let y = bridge.auxiliary_variables().to_vec();

    bridge.delete(&mut model).unwrap();
    assert_eq!(
        model.calls,
        vec![
            Call::DeleteConstraint(nn),
            Call::DeleteConstraint(ge),
            Call::DeleteVariables(y.clone()),
        ]
    );
    assert!(y.iter().all(|v| !model.is_valid_variable(*v)));
    assert!(vars.iter().all(|v| model.is_valid_variable(*v)));
    assert_eq!(model.inner.num_constraints(), 0);
}

#[test]
fn test_delete_stops_at_first_failure() {
    let mut model = RecordingModel::new();
    let (_vars, bridge) = setup(&mut model);
    let ge = bridge.greater_than_constraint();
    let nn = bridge.nonneg_constraint();
    let y = bridge.auxiliary_variables().to_vec();
    model.refuse_delete = Some(ge);

    let err = bridge.delete(&mut model).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Host(ModelError::InvalidConstraint(c)) if c == ge
    ));
    assert_eq!(
        model.calls,
        vec![Call::DeleteConstraint(nn), Call::DeleteConstraint(ge)]
    );
    assert!(!model.is_valid_constraint(nn));
    assert!(model.is_valid_constraint(ge));
    assert!(y.iter().all(|v| model.is_valid_variable(*v)));
}
