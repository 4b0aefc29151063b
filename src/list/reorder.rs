use super::{drag::DragTransition, identity::ItemKeys};

/// Returns a copy of `items` with the element at `from` relocated to `to`.
///
/// Every other element keeps its relative order. A missing index, an index out
/// of bounds, or `from == to` returns the input unchanged.
pub fn move_item<T: Clone>(items: &[T], from: Option<usize>, to: Option<usize>) -> Vec<T> {
    let mut next = items.to_vec();
    move_in_place(&mut next, from, to);
    next
}

/// In-place form of [`move_item`]. Returns whether anything moved.
pub fn move_in_place<T>(items: &mut Vec<T>, from: Option<usize>, to: Option<usize>) -> bool {
    let (Some(from), Some(to)) = (from, to) else {
        return false;
    };
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let moved = items.remove(from);
    items.insert(to, moved);
    true
}

/// Maps a drag transition back to the indices its keys occupy right now.
pub fn resolve(keys: &ItemKeys, transition: &DragTransition) -> (Option<usize>, Option<usize>) {
    (
        keys.position(&transition.active),
        keys.position(&transition.over),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::identity::ItemKey;

    fn letters() -> Vec<&'static str> {
        vec!["a", "b", "c", "d"]
    }

    #[test]
    fn moves_forward_and_backward() {
        assert_eq!(move_item(&letters(), Some(0), Some(2)), ["b", "c", "a", "d"]);
        assert_eq!(move_item(&letters(), Some(3), Some(1)), ["a", "d", "b", "c"]);
    }

    #[test]
    fn same_index_is_identity() {
        for idx in 0..4 {
            assert_eq!(move_item(&letters(), Some(idx), Some(idx)), letters());
        }
    }

    #[test]
    fn missing_or_out_of_range_indices_are_noops() {
        assert_eq!(move_item(&letters(), None, Some(1)), letters());
        assert_eq!(move_item(&letters(), Some(1), None), letters());
        assert_eq!(move_item(&letters(), Some(9), Some(0)), letters());
        assert_eq!(move_item(&letters(), Some(0), Some(4)), letters());
        assert!(move_item::<u8>(&[], Some(0), Some(0)).is_empty());
    }

    #[test]
    fn every_move_is_a_permutation() {
        let source = letters();
        for from in 0..source.len() {
            for to in 0..source.len() {
                let mut moved = move_item(&source, Some(from), Some(to));
                assert_eq!(moved.len(), source.len());
                assert_eq!(moved[to], source[from]);
                moved.sort_unstable();
                assert_eq!(moved, source, "move {from}->{to} lost elements");
            }
        }
    }

    #[test]
    fn others_keep_relative_order() {
        let moved = move_item(&letters(), Some(1), Some(3));
        let rest: Vec<_> = moved.iter().filter(|item| **item != "b").collect();
        assert_eq!(rest, [&"a", &"c", &"d"]);
    }

    #[test]
    fn resolves_keys_at_event_time() {
        let mut keys = ItemKeys::derived(3);
        keys.relocate(0, 2);
        let transition = DragTransition {
            active: ItemKey::from("item-0"),
            over: ItemKey::from("item-1"),
        };
        assert_eq!(resolve(&keys, &transition), (Some(2), Some(0)));
        let stale = DragTransition {
            active: ItemKey::from("item-7"),
            over: ItemKey::from("item-1"),
        };
        assert_eq!(resolve(&keys, &stale), (None, Some(0)));
    }
}
