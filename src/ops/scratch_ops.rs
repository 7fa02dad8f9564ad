use chrono::Utc;

use crate::model::scratch::{ScratchFile, ScratchList};
use crate::ops::order::{self, OrderError, Position};

/// Error type for scratch file operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScratchError {
    #[error("Scratch file name cannot be empty")]
    EmptyName,
    #[error("Scratch file name cannot contain path separators")]
    InvalidName,
    #[error("A scratch file named '{0}' already exists")]
    DuplicateName(String),
    #[error("scratch file not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Trim and check a scratch file name. `skip_id` is the file being renamed,
/// which may keep its own name.
fn check_name(list: &ScratchList, name: &str, skip_id: Option<&str>) -> Result<String, ScratchError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScratchError::EmptyName);
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(ScratchError::InvalidName);
    }
    if list
        .files
        .iter()
        .any(|f| f.name == name && Some(f.id.as_str()) != skip_id)
    {
        return Err(ScratchError::DuplicateName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Create a scratch file at the end of the list. Returns its ID.
pub fn create_scratch(
    list: &mut ScratchList,
    name: &str,
    content: &str,
    language: Option<&str>,
) -> Result<String, ScratchError> {
    let name = check_name(list, name, None)?;
    let order = order::append_order(list.files.iter().filter_map(|f| f.order));
    let now = Utc::now();
    let file = ScratchFile {
        id: crate::model::new_id(),
        name,
        content: content.to_string(),
        language: language.map(String::from),
        created_at: now,
        last_modified: now,
        order: Some(order),
    };
    let id = file.id.clone();
    list.files.push(file);
    Ok(id)
}

/// Rename a scratch file. Returns the previous name.
pub fn rename_scratch(list: &mut ScratchList, id: &str, name: &str) -> Result<String, ScratchError> {
    let name = check_name(list, name, Some(id))?;
    let file = list
        .get_mut(id)
        .ok_or_else(|| ScratchError::NotFound(id.to_string()))?;
    let old = std::mem::replace(&mut file.name, name);
    file.touch();
    Ok(old)
}

/// Replace a scratch file's content. Returns false if the file is gone or
/// the content is unchanged.
pub fn update_content(list: &mut ScratchList, id: &str, content: &str) -> bool {
    match list.get_mut(id) {
        Some(f) if f.content != content => {
            f.content = content.to_string();
            f.touch();
            true
        }
        _ => false,
    }
}

/// Remove a scratch file and close the gap. Returns the removed entry.
pub fn delete_scratch(list: &mut ScratchList, id: &str) -> Option<ScratchFile> {
    let pos = list.files.iter().position(|f| f.id == id)?;
    let removed = list.files.remove(pos);
    normalize(list);
    Some(removed)
}

/// Drop `dragged` before or after `target` in the flat list.
pub fn reorder_scratch(
    list: &mut ScratchList,
    dragged: &str,
    target: &str,
    position: Position,
) -> Result<(), ScratchError> {
    if list.get(dragged).is_none() {
        return Err(ScratchError::NotFound(dragged.to_string()));
    }
    let siblings: Vec<String> = list
        .sorted()
        .into_iter()
        .map(|f| f.id.clone())
        .filter(|id| id != dragged)
        .collect();
    let placed = order::insert_relative(siblings, dragged.to_string(), &target.to_string(), position)?;
    for (id, order) in placed {
        if let Some(f) = list.get_mut(&id) {
            f.order = Some(order);
        }
    }
    Ok(())
}

/// Give every entry an order matching its display position, `0..k-1`.
pub fn normalize(list: &mut ScratchList) {
    let ids: Vec<String> = list.sorted().into_iter().map(|f| f.id.clone()).collect();
    for (i, id) in ids.iter().enumerate() {
        if let Some(f) = list.get_mut(id) {
            f.order = Some(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &ScratchList) -> Vec<&str> {
        list.sorted().iter().map(|f| f.name.as_str()).collect()
    }

    fn orders(list: &ScratchList) -> Vec<Option<usize>> {
        list.sorted().iter().map(|f| f.order).collect()
    }

    #[test]
    fn create_validates_names() {
        let mut list = ScratchList::default();
        assert_eq!(
            create_scratch(&mut list, "   ", "", None),
            Err(ScratchError::EmptyName)
        );
        assert_eq!(
            create_scratch(&mut list, "a/b", "", None),
            Err(ScratchError::InvalidName)
        );
        assert_eq!(
            create_scratch(&mut list, "a\\b", "", None),
            Err(ScratchError::InvalidName)
        );
        create_scratch(&mut list, " notes.md ", "# hi", Some("markdown")).unwrap();
        let err = create_scratch(&mut list, "notes.md", "", None).unwrap_err();
        assert_eq!(err.to_string(), "A scratch file named 'notes.md' already exists");
        assert_eq!(list.len(), 1);
        assert_eq!(list.files[0].name, "notes.md");
        assert_eq!(list.files[0].language.as_deref(), Some("markdown"));
    }

    #[test]
    fn create_appends() {
        let mut list = ScratchList::default();
        for name in ["a", "b", "c"] {
            create_scratch(&mut list, name, "", None).unwrap();
        }
        assert_eq!(names(&list), vec!["a", "b", "c"]);
        assert_eq!(orders(&list), vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn rename_keeps_own_name_and_rejects_others() {
        let mut list = ScratchList::default();
        let a = create_scratch(&mut list, "a", "", None).unwrap();
        create_scratch(&mut list, "b", "", None).unwrap();
        assert_eq!(rename_scratch(&mut list, &a, "a"), Ok("a".to_string()));
        assert_eq!(
            rename_scratch(&mut list, &a, "b"),
            Err(ScratchError::DuplicateName("b".into()))
        );
        assert_eq!(rename_scratch(&mut list, &a, "z"), Ok("a".to_string()));
        assert_eq!(list.get(&a).unwrap().name, "z");
        assert_eq!(
            rename_scratch(&mut list, "ghost", "y"),
            Err(ScratchError::NotFound("ghost".into()))
        );
    }

    #[test]
    fn update_reports_changes_only() {
        let mut list = ScratchList::default();
        let a = create_scratch(&mut list, "a", "one", None).unwrap();
        assert!(!update_content(&mut list, &a, "one"));
        assert!(update_content(&mut list, &a, "two"));
        assert_eq!(list.get(&a).unwrap().content, "two");
        assert!(!update_content(&mut list, "ghost", "x"));
    }

    #[test]
    fn delete_normalizes() {
        let mut list = ScratchList::default();
        let ids: Vec<String> = ["a", "b", "c"]
            .iter()
            .map(|n| create_scratch(&mut list, n, "", None).unwrap())
            .collect();
        let removed = delete_scratch(&mut list, &ids[0]).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(orders(&list), vec![Some(0), Some(1)]);
        assert!(delete_scratch(&mut list, &ids[0]).is_none());
    }

    #[test]
    fn reorder_flat_list() {
        let mut list = ScratchList::default();
        let ids: Vec<String> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| create_scratch(&mut list, n, "", None).unwrap())
            .collect();
        reorder_scratch(&mut list, &ids[2], &ids[0], Position::Before).unwrap();
        assert_eq!(names(&list), vec!["c", "a", "b", "d"]);
        assert_eq!(orders(&list), vec![Some(0), Some(1), Some(2), Some(3)]);
        assert!(matches!(
            reorder_scratch(&mut list, &ids[0], "ghost", Position::After),
            Err(ScratchError::Order(_))
        ));
    }

    #[test]
    fn normalize_assigns_legacy_entries() {
        let mut list = ScratchList::default();
        let a = create_scratch(&mut list, "a", "", None).unwrap();
        let b = create_scratch(&mut list, "b", "", None).unwrap();
        list.get_mut(&a).unwrap().order = None;
        normalize(&mut list);
        assert_eq!(list.get(&b).unwrap().order, Some(0));
        assert_eq!(list.get(&a).unwrap().order, Some(1));
    }
}
