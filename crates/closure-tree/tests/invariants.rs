//! Random operation sequences checked against an in-memory parent map.
//!
//! After every step the closure relation must equal the closure derived from
//! the model, and the store's own consistency check must come back clean.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use closure_tree::{fixture, Attributes, CategoryId, ClosureEdge, ErrorKind, TreeStore, ROOT_ID};

// ============================================================================
// Operations
// ============================================================================

/// Indices are resolved against the live categories at the time the
/// operation runs, so every sequence stays meaningful as the tree changes.
#[derive(Debug, Clone)]
enum Op {
    Insert { parent_idx: usize },
    Update { idx: usize, name: String },
    Delete { idx: usize },
    DeleteTree { idx: usize },
    Move { idx: usize, target_idx: usize },
    MoveTree { idx: usize, target_idx: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let idx = 0..64usize;
    prop_oneof![
        3 => idx.clone().prop_map(|parent_idx| Op::Insert { parent_idx }),
        1 => (idx.clone(), "[A-Za-z]{1,12}").prop_map(|(idx, name)| Op::Update { idx, name }),
        1 => idx.clone().prop_map(|idx| Op::Delete { idx }),
        1 => idx.clone().prop_map(|idx| Op::DeleteTree { idx }),
        2 => (idx.clone(), idx.clone()).prop_map(|(idx, target_idx)| Op::Move { idx, target_idx }),
        3 => (idx.clone(), idx).prop_map(|(idx, target_idx)| Op::MoveTree { idx, target_idx }),
    ]
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Default)]
struct Model {
    /// Non-root category -> direct parent.
    parent: BTreeMap<CategoryId, CategoryId>,
}

impl Model {
    fn seeded() -> Self {
        let mut model = Model::default();
        for row in fixture() {
            model.parent.insert(row.id, row.parent);
        }
        model
    }

    fn ids(&self) -> Vec<CategoryId> {
        self.parent.keys().copied().collect()
    }

    /// The root followed by every category.
    fn targets(&self) -> Vec<CategoryId> {
        std::iter::once(ROOT_ID).chain(self.parent.keys().copied()).collect()
    }

    fn children(&self, id: CategoryId) -> Vec<CategoryId> {
        self.parent
            .iter()
            .filter(|(_, &p)| p == id)
            .map(|(&c, _)| c)
            .collect()
    }

    fn is_descendant(&self, mut id: CategoryId, ancestor: CategoryId) -> bool {
        while let Some(&p) = self.parent.get(&id) {
            if p == ancestor {
                return true;
            }
            id = p;
        }
        false
    }

    fn lift_children(&mut self, id: CategoryId) {
        let parent = self.parent[&id];
        for child in self.children(id) {
            self.parent.insert(child, parent);
        }
    }

    fn delete(&mut self, id: CategoryId) {
        self.lift_children(id);
        self.parent.remove(&id);
    }

    fn delete_tree(&mut self, id: CategoryId) -> usize {
        let doomed: Vec<CategoryId> = self
            .ids()
            .into_iter()
            .filter(|&c| c == id || self.is_descendant(c, id))
            .collect();
        for c in &doomed {
            self.parent.remove(c);
        }
        doomed.len()
    }

    fn move_node(&mut self, id: CategoryId, target: CategoryId) {
        self.lift_children(id);
        self.parent.insert(id, target);
    }

    fn move_tree(&mut self, id: CategoryId, target: CategoryId) {
        if self.is_descendant(target, id) {
            let old_parent = self.parent[&id];
            self.parent.insert(target, old_parent);
        }
        self.parent.insert(id, target);
    }

    fn closure(&self) -> BTreeSet<ClosureEdge> {
        let mut edges = BTreeSet::new();
        for id in self.targets() {
            edges.insert(ClosureEdge { ancestor: id, descendant: id, distance: 0 });
            let mut current = id;
            let mut distance = 0;
            while let Some(&p) = self.parent.get(&current) {
                distance += 1;
                edges.insert(ClosureEdge { ancestor: p, descendant: id, distance });
                current = p;
            }
        }
        edges
    }
}

// ============================================================================
// Driver
// ============================================================================

fn pick(list: &[CategoryId], idx: usize) -> Option<CategoryId> {
    if list.is_empty() {
        None
    } else {
        Some(list[idx % list.len()])
    }
}

fn apply(store: &TreeStore, model: &mut Model, op: &Op) {
    let ids = model.ids();
    let targets = model.targets();

    match *op {
        Op::Insert { parent_idx } => {
            let parent = pick(&targets, parent_idx).unwrap();
            let id = store.insert(&Attributes::new("generated"), parent).unwrap();
            assert!(!model.parent.contains_key(&id));
            model.parent.insert(id, parent);
        }
        Op::Update { idx, ref name } => {
            let Some(id) = pick(&ids, idx) else { return };
            store.update(id, &Attributes::new(name.as_str())).unwrap();
            assert_eq!(store.find(id).unwrap().unwrap().name, *name);
        }
        Op::Delete { idx } => {
            let Some(id) = pick(&ids, idx) else { return };
            store.delete(id).unwrap();
            model.delete(id);
        }
        Op::DeleteTree { idx } => {
            let Some(id) = pick(&ids, idx) else { return };
            let removed = store.delete_tree(id).unwrap();
            assert_eq!(removed, model.delete_tree(id));
        }
        Op::Move { idx, target_idx } => {
            let Some(id) = pick(&ids, idx) else { return };
            let target = pick(&targets, target_idx).unwrap();
            if id == target {
                let err = store.move_node(id, target).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidArgument);
                return;
            }
            store.move_node(id, target).unwrap();
            model.move_node(id, target);
        }
        Op::MoveTree { idx, target_idx } => {
            let Some(id) = pick(&ids, idx) else { return };
            let target = pick(&targets, target_idx).unwrap();
            if id == target {
                let err = store.move_tree(id, target).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidArgument);
                return;
            }
            store.move_tree(id, target).unwrap();
            model.move_tree(id, target);
        }
    }
}

fn assert_matches_model(store: &TreeStore, model: &Model) {
    let actual: BTreeSet<ClosureEdge> = store.edges().unwrap().into_iter().collect();
    assert_eq!(actual, model.closure());

    let violations = store.verify().unwrap();
    assert!(violations.is_empty(), "violations: {:?}", violations);

    assert_eq!(store.count().unwrap(), model.parent.len() as i64);
    for row in store.list_all().unwrap() {
        assert_eq!(row.parent_id, model.parent.get(&row.id).copied());
    }
}

fn seeded_store() -> TreeStore {
    let store = TreeStore::open_memory().unwrap();
    store.create_tables().unwrap();
    store.import_rows(&fixture()).unwrap();
    store
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn closure_matches_model_after_every_step(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let store = seeded_store();
        let mut model = Model::seeded();
        for op in &ops {
            apply(&store, &mut model, op);
            assert_matches_model(&store, &model);
        }
    }

    #[test]
    fn levels_and_paths_agree(ops in proptest::collection::vec(op_strategy(), 0..20)) {
        let store = seeded_store();
        let mut model = Model::seeded();
        for op in &ops {
            apply(&store, &mut model, op);
        }
        for id in model.ids() {
            let path = store.path(id).unwrap();
            prop_assert_eq!(path.len() as i64, store.level(id).unwrap());
            prop_assert_eq!(path.last().map(|c| c.id), Some(id));
            for pair in path.windows(2) {
                prop_assert_eq!(model.parent[&pair[1].id], pair[0].id);
            }
        }
    }

    #[test]
    fn failed_operations_leave_the_tree_untouched(
        ops in proptest::collection::vec(op_strategy(), 0..15),
        missing in 1000i64..2000,
    ) {
        let store = seeded_store();
        let mut model = Model::seeded();
        for op in &ops {
            apply(&store, &mut model, op);
        }
        let before = store.edges().unwrap();

        prop_assert!(store.move_tree(missing, ROOT_ID).is_err());
        prop_assert!(store.move_node(1, missing).is_err());
        prop_assert!(store.delete(missing).is_err());
        prop_assert!(store.delete_tree(-missing).is_err());
        prop_assert!(store.insert(&Attributes::new("x"), missing).is_err());

        prop_assert_eq!(store.edges().unwrap(), before);
    }
}
