use crate::model::node;
use crate::model::todo::{Todo, TodoList};
use crate::ops::order::{self, OrderError, Position};
use crate::ops::validate::{self, Ceiling, MAX_DEPTH, ValidationError};

/// Error type for todo operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("todo not found: {0}")]
    NotFound(String),
    #[error("Cannot move a todo into itself or its subtasks")]
    Cycle,
}

// ---------------------------------------------------------------------------
// Create / edit / delete
// ---------------------------------------------------------------------------

/// Add a todo at the end of `parent_id`'s children (top level for `None`).
/// Returns the new todo's ID.
///
/// Checks run in order: text, nesting, total count. On any failure the
/// list is untouched.
pub fn add_todo(list: &mut TodoList, text: &str, parent_id: Option<&str>) -> Result<String, TodoError> {
    validate::validate_text(text)?;
    if let Some(parent) = parent_id
        && list.get(parent).is_none()
    {
        return Err(TodoError::NotFound(parent.to_string()));
    }
    validate::validate_nesting(&list.todos, parent_id)?;
    validate::validate_total_count(list.len(), Ceiling::Todos)?;

    let order = order::append_order(list.children(parent_id).iter().map(|t| t.order));
    let todo = Todo::new(text.trim().to_string(), parent_id.map(String::from), order);
    let id = todo.id.clone();
    list.todos.push(todo);
    Ok(id)
}

/// Replace a todo's text. Returns false if the todo does not exist.
///
/// Length is not re-validated here; callers that take user input run
/// [`validate::validate_text`] first.
pub fn rename_todo(list: &mut TodoList, id: &str, text: &str) -> bool {
    match list.get_mut(id) {
        Some(todo) => {
            todo.text = text.trim().to_string();
            todo.touch();
            true
        }
        None => false,
    }
}

/// Flip a todo's done flag. Returns the new state, or `None` if the todo
/// does not exist.
pub fn toggle_todo(list: &mut TodoList, id: &str) -> Option<bool> {
    let todo = list.get_mut(id)?;
    todo.done = !todo.done;
    todo.touch();
    Some(todo.done)
}

/// Delete a todo together with its whole subtree, then close the gap in its
/// former sibling group. Returns how many todos were removed (0 if `id` was
/// already gone).
pub fn delete_todo(list: &mut TodoList, id: &str) -> usize {
    let Some(todo) = list.get(id) else {
        return 0;
    };
    let parent = todo.parent_id.clone();
    let mut doomed = list.descendant_ids(id);
    doomed.push(id.to_string());

    let before = list.len();
    list.todos.retain(|t| !doomed.contains(&t.id));
    let removed = before - list.len();
    tracing::debug!(id, removed, "deleted todo subtree");

    normalize_group(list, parent.as_deref());
    removed
}

/// Delete every completed todo (and anything beneath it).
/// Returns how many todos were removed in total.
pub fn clear_done(list: &mut TodoList) -> usize {
    let done: Vec<String> = list
        .todos
        .iter()
        .filter(|t| t.done)
        .map(|t| t.id.clone())
        .collect();
    done.iter().map(|id| delete_todo(list, id)).sum()
}

// ---------------------------------------------------------------------------
// Move operations
// ---------------------------------------------------------------------------

/// Reparent a todo to the end of `new_parent`'s children.
pub fn move_todo(list: &mut TodoList, id: &str, new_parent: Option<&str>) -> Result<(), TodoError> {
    let old_parent = list
        .get(id)
        .ok_or_else(|| TodoError::NotFound(id.to_string()))?
        .parent_id
        .clone();
    if let Some(parent) = new_parent
        && list.get(parent).is_none()
    {
        return Err(TodoError::NotFound(parent.to_string()));
    }
    check_reparent(list, id, new_parent)?;

    let order = order::append_order(
        list.children(new_parent)
            .iter()
            .filter(|t| t.id != id)
            .map(|t| t.order),
    );
    if let Some(todo) = list.get_mut(id) {
        todo.parent_id = new_parent.map(String::from);
        todo.order = order;
        todo.touch();
    }

    if old_parent.as_deref() != new_parent {
        normalize_group(list, old_parent.as_deref());
    }
    normalize_group(list, new_parent);
    Ok(())
}

/// Drop `dragged` next to `target`, taking `target`'s parent.
pub fn reorder_todo(
    list: &mut TodoList,
    dragged: &str,
    target: &str,
    position: Position,
) -> Result<(), TodoError> {
    let old_parent = list
        .get(dragged)
        .ok_or_else(|| TodoError::NotFound(dragged.to_string()))?
        .parent_id
        .clone();
    let new_parent = list
        .get(target)
        .ok_or_else(|| TodoError::NotFound(target.to_string()))?
        .parent_id
        .clone();

    if old_parent != new_parent {
        check_reparent(list, dragged, new_parent.as_deref())?;
    }

    let siblings: Vec<String> = list
        .children(new_parent.as_deref())
        .iter()
        .filter(|t| t.id != dragged)
        .map(|t| t.id.clone())
        .collect();
    let placed = order::insert_relative(siblings, dragged.to_string(), &target.to_string(), position)?;

    if let Some(todo) = list.get_mut(dragged) {
        todo.parent_id = new_parent.clone();
        todo.touch();
    }
    if old_parent != new_parent {
        normalize_group(list, old_parent.as_deref());
    }
    for (id, order) in placed {
        if let Some(todo) = list.get_mut(&id) {
            todo.order = order;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject moves that would create a cycle or push the subtree past
/// [`MAX_DEPTH`].
fn check_reparent(list: &TodoList, id: &str, new_parent: Option<&str>) -> Result<(), TodoError> {
    let Some(parent) = new_parent else {
        // Moving to the top level: the subtree keeps its height and roots at 1
        return Ok(());
    };
    if parent == id || node::is_descendant(&list.todos, parent, id) {
        return Err(TodoError::Cycle);
    }
    let target_depth = list.depth(parent);
    let height = node::subtree_height(&list.todos, id);
    if target_depth + height > MAX_DEPTH {
        return Err(ValidationError::NestingTooDeep.into());
    }
    Ok(())
}

/// Renumber the children of `parent` to `0..k-1`.
fn normalize_group(list: &mut TodoList, parent: Option<&str>) {
    let mut group: Vec<(String, usize)> = list
        .todos
        .iter()
        .filter(|t| t.parent_id.as_deref() == parent)
        .map(|t| (t.id.clone(), t.order))
        .collect();
    order::normalize(&mut group);
    for (id, order) in group {
        if let Some(todo) = list.get_mut(&id) {
            todo.order = order;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    /// Every sibling group holds exactly the orders 0..k-1.
    fn assert_dense(list: &TodoList) {
        let parents: HashSet<Option<String>> = list.todos.iter().map(|t| t.parent_id.clone()).collect();
        for parent in parents {
            let mut orders: Vec<usize> = list
                .todos
                .iter()
                .filter(|t| t.parent_id == parent)
                .map(|t| t.order)
                .collect();
            orders.sort();
            let expected: Vec<usize> = (0..orders.len()).collect();
            assert_eq!(orders, expected, "group {:?} is not dense", parent);
        }
    }

    fn texts(list: &TodoList, parent: Option<&str>) -> Vec<String> {
        list.children(parent).iter().map(|t| t.text.clone()).collect()
    }

    /// a, b, c at the top; a > a1 > a1x
    fn sample() -> (TodoList, Vec<String>) {
        let mut list = TodoList::default();
        let a = add_todo(&mut list, "a", None).unwrap();
        let b = add_todo(&mut list, "b", None).unwrap();
        let c = add_todo(&mut list, "c", None).unwrap();
        let a1 = add_todo(&mut list, "a1", Some(&a)).unwrap();
        let a1x = add_todo(&mut list, "a1x", Some(&a1)).unwrap();
        (list, vec![a, b, c, a1, a1x])
    }

    #[test]
    fn add_assigns_sequential_orders() {
        let (list, ids) = sample();
        assert_eq!(texts(&list, None), vec!["a", "b", "c"]);
        assert_eq!(list.get(&ids[2]).unwrap().order, 2);
        assert_eq!(list.get(&ids[3]).unwrap().order, 0);
        assert_dense(&list);
    }

    #[test]
    fn add_trims_text() {
        let mut list = TodoList::default();
        let id = add_todo(&mut list, "  padded  ", None).unwrap();
        assert_eq!(list.get(&id).unwrap().text, "padded");
    }

    #[test]
    fn add_rejects_bad_text_without_mutation() {
        let (mut list, _) = sample();
        let before = list.clone();
        assert_eq!(
            add_todo(&mut list, "", None),
            Err(TodoError::Invalid(ValidationError::TextLength))
        );
        assert_eq!(list, before);
    }

    #[test]
    fn add_rejects_fourth_level() {
        let (mut list, ids) = sample();
        let before = list.clone();
        let err = add_todo(&mut list, "too deep", Some(&ids[4])).unwrap_err();
        assert_eq!(err.to_string(), "Nesting level cannot exceed 3.");
        assert_eq!(list, before);
    }

    #[test]
    fn add_unknown_parent() {
        let mut list = TodoList::default();
        assert_eq!(
            add_todo(&mut list, "orphan", Some("ghost")),
            Err(TodoError::NotFound("ghost".into()))
        );
    }

    #[test]
    fn count_ceiling_is_exactly_one_hundred() {
        let mut list = TodoList::default();
        for i in 0..100 {
            add_todo(&mut list, &format!("todo {}", i), None).unwrap();
        }
        assert_eq!(list.len(), 100);
        let err = add_todo(&mut list, "one too many", None).unwrap_err();
        assert_eq!(err.to_string(), "Total Todo count cannot exceed 100.");
        assert_eq!(list.len(), 100);
    }

    #[test]
    fn rename_and_toggle() {
        let (mut list, ids) = sample();
        assert!(rename_todo(&mut list, &ids[0], "  renamed "));
        assert_eq!(list.get(&ids[0]).unwrap().text, "renamed");
        assert_eq!(toggle_todo(&mut list, &ids[0]), Some(true));
        assert_eq!(toggle_todo(&mut list, &ids[0]), Some(false));
    }

    #[test]
    fn missing_ids_are_silent_noops() {
        let (mut list, _) = sample();
        let before = list.clone();
        assert!(!rename_todo(&mut list, "ghost", "x"));
        assert_eq!(toggle_todo(&mut list, "ghost"), None);
        assert_eq!(delete_todo(&mut list, "ghost"), 0);
        assert_eq!(list, before);
    }

    #[test]
    fn delete_cascades_and_normalizes() {
        let (mut list, ids) = sample();
        let removed = delete_todo(&mut list, &ids[0]);
        assert_eq!(removed, 3);
        assert_eq!(list.len(), 2);
        assert_eq!(texts(&list, None), vec!["b", "c"]);
        assert_dense(&list);
    }

    #[test]
    fn delete_middle_then_append_does_not_reuse_gap() {
        let (mut list, ids) = sample();
        delete_todo(&mut list, &ids[1]);
        let d = add_todo(&mut list, "d", None).unwrap();
        assert_eq!(list.get(&d).unwrap().order, 2);
        assert_eq!(texts(&list, None), vec!["a", "c", "d"]);
        assert_dense(&list);
    }

    #[test]
    fn clear_done_removes_subtrees() {
        let (mut list, ids) = sample();
        toggle_todo(&mut list, &ids[3]); // a1 (with a1x beneath)
        toggle_todo(&mut list, &ids[2]); // c
        let removed = clear_done(&mut list);
        assert_eq!(removed, 3);
        assert_eq!(texts(&list, None), vec!["a", "b"]);
        assert!(list.children(Some(&ids[0])).is_empty());
        assert_dense(&list);
    }

    #[test]
    fn move_todo_under_sibling() {
        let (mut list, ids) = sample();
        move_todo(&mut list, &ids[2], Some(&ids[1])).unwrap();
        assert_eq!(texts(&list, None), vec!["a", "b"]);
        assert_eq!(texts(&list, Some(&ids[1])), vec!["c"]);
        assert_dense(&list);
    }

    #[test]
    fn move_todo_rejects_cycle() {
        let (mut list, ids) = sample();
        let before = list.clone();
        assert_eq!(move_todo(&mut list, &ids[0], Some(&ids[4])), Err(TodoError::Cycle));
        assert_eq!(move_todo(&mut list, &ids[0], Some(&ids[0])), Err(TodoError::Cycle));
        assert_eq!(list, before);
    }

    #[test]
    fn move_todo_rejects_depth_overflow() {
        let (mut list, ids) = sample();
        let before = list.clone();
        // a has height 3; under b it would reach depth 4
        let err = move_todo(&mut list, &ids[0], Some(&ids[1])).unwrap_err();
        assert_eq!(err, TodoError::Invalid(ValidationError::NestingTooDeep));
        assert_eq!(list, before);
    }

    #[test]
    fn move_todo_to_top_level() {
        let (mut list, ids) = sample();
        move_todo(&mut list, &ids[3], None).unwrap();
        assert_eq!(texts(&list, None), vec!["a", "b", "c", "a1"]);
        assert_eq!(list.depth(&ids[4]), 2);
        assert_dense(&list);
    }

    #[test]
    fn reorder_within_group() {
        let mut list = TodoList::default();
        let ids: Vec<String> = ["A", "B", "C", "D"]
            .iter()
            .map(|t| add_todo(&mut list, t, None).unwrap())
            .collect();
        reorder_todo(&mut list, &ids[2], &ids[0], Position::Before).unwrap();
        assert_eq!(texts(&list, None), vec!["C", "A", "B", "D"]);
        let orders: Vec<usize> = list.children(None).iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn reorder_across_parents() {
        let (mut list, ids) = sample();
        // Drop c after a1 (inside a)
        reorder_todo(&mut list, &ids[2], &ids[3], Position::After).unwrap();
        assert_eq!(texts(&list, None), vec!["a", "b"]);
        assert_eq!(texts(&list, Some(&ids[0])), vec!["a1", "c"]);
        assert_dense(&list);
    }

    #[test]
    fn reorder_rejects_drop_into_own_subtree() {
        let (mut list, ids) = sample();
        let before = list.clone();
        assert_eq!(
            reorder_todo(&mut list, &ids[0], &ids[4], Position::Before),
            Err(TodoError::Cycle)
        );
        assert_eq!(list, before);
    }

    #[test]
    fn reorder_unknown_ids() {
        let (mut list, ids) = sample();
        assert_eq!(
            reorder_todo(&mut list, "ghost", &ids[0], Position::Before),
            Err(TodoError::NotFound("ghost".into()))
        );
        assert_eq!(
            reorder_todo(&mut list, &ids[0], "ghost", Position::Before),
            Err(TodoError::NotFound("ghost".into()))
        );
    }

    #[test]
    fn reorder_onto_itself_fails_cleanly() {
        let (mut list, ids) = sample();
        let before = list.clone();
        let err = reorder_todo(&mut list, &ids[1], &ids[1], Position::After).unwrap_err();
        assert!(matches!(err, TodoError::Order(OrderError::TargetNotFound(_))));
        assert_eq!(list, before);
    }

    #[test]
    fn density_survives_mixed_sequence() {
        let (mut list, ids) = sample();
        let e = add_todo(&mut list, "e", Some(&ids[1])).unwrap();
        add_todo(&mut list, "f", Some(&ids[1])).unwrap();
        reorder_todo(&mut list, &ids[2], &e, Position::Before).unwrap();
        delete_todo(&mut list, &ids[3]);
        move_todo(&mut list, &e, None).unwrap();
        reorder_todo(&mut list, &e, &ids[0], Position::Before).unwrap();
        assert_eq!(texts(&list, None), vec!["e", "a", "b"]);
        assert_eq!(texts(&list, Some(&ids[1])), vec!["c", "f"]);
        assert_dense(&list);
    }
}
