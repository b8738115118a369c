//! Property-based tests for the conversation store
//!
//! Operations are generated against indices into the live conversation list so
//! that sequences hit existing ids as often as unknown ones.

use super::*;
use crate::conversation::UNTITLED;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create(String),
    Select(usize),
    SelectUnknown,
    Deselect,
    Delete(usize),
    DeleteUnknown,
    Append(usize, String),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-zA-Z ]{0,12}".prop_map(Op::Create),
        (0usize..8).prop_map(Op::Select),
        Just(Op::SelectUnknown),
        Just(Op::Deselect),
        (0usize..8).prop_map(Op::Delete),
        Just(Op::DeleteUnknown),
        ((0usize..8), "[a-z]{0,8}").prop_map(|(i, t)| Op::Append(i, t)),
    ]
}

fn id_at(store: &ConversationStore, index: usize) -> Option<String> {
    let list = store.list();
    if list.is_empty() {
        None
    } else {
        Some(list[index % list.len()].id().to_string())
    }
}

proptest! {
    #[test]
    fn active_is_none_iff_unselected_or_deleted(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut store = ConversationStore::new();
        // Model of the selection: what the user last picked and has not lost
        let mut selected: Option<String> = None;

        for op in ops {
            match op {
                Op::Create(text) => {
                    store.create(&text);
                }
                Op::Select(i) => {
                    if let Some(id) = id_at(&store, i) {
                        store.set_active(Some(&id)).unwrap();
                        selected = Some(id);
                    }
                }
                Op::SelectUnknown => {
                    prop_assert!(store.set_active(Some("no-such-id")).is_err());
                }
                Op::Deselect => {
                    store.set_active(None).unwrap();
                    selected = None;
                }
                Op::Delete(i) => {
                    if let Some(id) = id_at(&store, i) {
                        let removed = store.remove(&id).unwrap();
                        prop_assert_eq!(removed.was_active, selected.as_deref() == Some(id.as_str()));
                        if removed.was_active {
                            selected = None;
                        }
                    }
                }
                Op::DeleteUnknown => {
                    prop_assert!(store.remove("no-such-id").is_err());
                }
                Op::Append(i, text) => {
                    if let Some(id) = id_at(&store, i) {
                        store.append_message(&id, Message::assistant(text)).unwrap();
                    }
                }
            }

            prop_assert_eq!(store.active_id(), selected.as_deref());
            if let Some(id) = store.active_id() {
                prop_assert!(store.contains(id));
            }
        }
    }

    #[test]
    fn title_always_matches_first_message(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut store = ConversationStore::new();
        for op in ops {
            match op {
                Op::Create(text) => {
                    store.create(&text);
                }
                Op::Append(i, text) => {
                    if let Some(id) = id_at(&store, i) {
                        store.append_message(&id, Message::user(text)).unwrap();
                    }
                }
                Op::Delete(i) => {
                    if let Some(id) = id_at(&store, i) {
                        store.remove(&id).unwrap();
                    }
                }
                _ => {}
            }

            for conv in store.list() {
                prop_assert!(!conv.messages().is_empty());
                let first = &conv.messages()[0].text;
                let expected = if first.is_empty() { UNTITLED } else { first.as_str() };
                prop_assert_eq!(conv.title(), expected);
            }
        }
    }

    #[test]
    fn selecting_twice_reads_identical_history(
        seeds in proptest::collection::vec("[a-z]{0,10}", 1..6),
        pick in 0usize..6,
    ) {
        let mut store = ConversationStore::new();
        for seed in &seeds {
            store.create(seed);
        }
        let id = id_at(&store, pick).unwrap();

        store.set_active(Some(&id)).unwrap();
        let first = store.active().unwrap().messages().to_vec();
        store.set_active(Some(&id)).unwrap();
        let second = store.active().unwrap().messages().to_vec();

        prop_assert_eq!(first, second);
    }
}
