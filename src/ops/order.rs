use std::fmt;

/// Which side of the drop target the dragged item lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(format!("invalid position: {} (expected before or after)", other)),
        }
    }
}

/// Error type for sibling ordering
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("target not found among siblings: {0}")]
    TargetNotFound(String),
}

/// Order for a new last sibling: one past the current maximum, 0 for an
/// empty group. Gaps left by earlier removals are not filled.
pub fn append_order<I: IntoIterator<Item = usize>>(orders: I) -> usize {
    orders.into_iter().max().map_or(0, |max| max + 1)
}

/// Stable-sort a sibling group by order and renumber it `0..k-1`.
pub fn normalize<K>(siblings: &mut [(K, usize)]) {
    siblings.sort_by_key(|(_, order)| *order);
    for (i, (_, order)) in siblings.iter_mut().enumerate() {
        *order = i;
    }
}

/// Splice `dragged` into an order-sorted sibling array next to `target` and
/// renumber the result `0..k-1`.
///
/// `siblings` must already exclude `dragged`.
pub fn insert_relative<K: PartialEq + fmt::Display>(
    mut siblings: Vec<K>,
    dragged: K,
    target: &K,
    position: Position,
) -> Result<Vec<(K, usize)>, OrderError> {
    let idx = siblings
        .iter()
        .position(|s| s == target)
        .ok_or_else(|| OrderError::TargetNotFound(target.to_string()))?;
    let at = match position {
        Position::Before => idx,
        Position::After => idx + 1,
    };
    siblings.insert(at, dragged);
    Ok(siblings.into_iter().enumerate().map(|(i, k)| (k, i)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_after_max_or_zero() {
        assert_eq!(append_order(Vec::new()), 0);
        assert_eq!(append_order(vec![0, 1, 2]), 3);
        // A gap is not filled
        assert_eq!(append_order(vec![0, 3]), 4);
    }

    #[test]
    fn normalize_closes_gaps_and_keeps_relative_order() {
        let mut group = vec![("c", 7), ("a", 0), ("b", 3)];
        normalize(&mut group);
        assert_eq!(group, vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn normalize_is_stable_for_duplicates() {
        let mut group = vec![("x", 1), ("y", 1), ("z", 0)];
        normalize(&mut group);
        assert_eq!(group, vec![("z", 0), ("x", 1), ("y", 2)]);
    }

    #[test]
    fn insert_before_first() {
        // [A, B, C, D] with C dragged before A
        let result = insert_relative(vec!["A", "B", "D"], "C", &"A", Position::Before).unwrap();
        assert_eq!(result, vec![("C", 0), ("A", 1), ("B", 2), ("D", 3)]);
    }

    #[test]
    fn insert_after_last() {
        let result = insert_relative(vec!["B", "C", "D"], "A", &"D", Position::After).unwrap();
        assert_eq!(result, vec![("B", 0), ("C", 1), ("D", 2), ("A", 3)]);
    }

    #[test]
    fn insert_missing_target_fails() {
        let err = insert_relative(vec!["A", "B"], "C", &"Z", Position::Before).unwrap_err();
        assert_eq!(err, OrderError::TargetNotFound("Z".into()));
    }

    #[test]
    fn position_parsing() {
        assert_eq!("Before".parse::<Position>(), Ok(Position::Before));
        assert_eq!("after".parse::<Position>(), Ok(Position::After));
        assert!("inside".parse::<Position>().is_err());
    }
}
