//! Derived display order over the append-only thought list.

use crate::board::Thought;
use crate::critique::Axis;

/// Indices into `thoughts`, highest score first. `sort_by` is stable, so
/// equal scores keep append order. The input is never reordered.
pub fn rank_indices(thoughts: &[Thought], axis: Axis) -> Vec<usize> {
    let mut order: Vec<usize> = (0..thoughts.len()).collect();
    order.sort_by(|&a, &b| thoughts[b].score(axis).cmp(&thoughts[a].score(axis)));
    order
}

pub fn ranked(thoughts: &[Thought], axis: Axis) -> Vec<&Thought> {
    rank_indices(thoughts, axis)
        .into_iter()
        .map(|i| &thoughts[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::ConceptPair;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn thought(tag: usize, novelty: u32, usefulness: u32) -> Thought {
        Thought {
            concepts: ConceptPair::new(format!("A{tag}"), format!("B{tag}")),
            thought: format!("t{tag}"),
            novelty,
            coherence: 0,
            usefulness,
            justification: String::new(),
        }
    }

    #[test]
    fn sorts_descending_by_novelty() {
        let list = vec![thought(0, 3, 0), thought(1, 9, 0), thought(2, 5, 0)];
        let order: Vec<u32> = ranked(&list, Axis::Novelty).iter().map(|t| t.novelty).collect();
        assert_eq!(order, vec![9, 5, 3]);
    }

    #[test]
    fn ties_keep_append_order() {
        let list = vec![thought(0, 5, 0), thought(1, 7, 0), thought(2, 5, 0), thought(3, 5, 0)];
        assert_eq!(rank_indices(&list, Axis::Novelty), vec![1, 0, 2, 3]);
    }

    #[test]
    fn other_axes_rank_independently() {
        let list = vec![thought(0, 9, 1), thought(1, 1, 9)];
        assert_eq!(rank_indices(&list, Axis::Usefulness), vec![1, 0]);
        assert_eq!(rank_indices(&list, Axis::Novelty), vec![0, 1]);
    }

    #[test]
    fn ranked_view_is_a_stable_sorted_permutation() {
        let mut rng = StdRng::seed_from_u64(0xDA7D);
        for len in 0..40 {
            let list: Vec<Thought> = (0..len)
                .map(|i| thought(i, rng.gen_range(0..4), 0))
                .collect();
            let order = rank_indices(&list, Axis::Novelty);

            let mut seen = order.clone();
            seen.sort_unstable();
            assert_eq!(seen, (0..len).collect::<Vec<_>>());

            for pair in order.windows(2) {
                let (a, b) = (&list[pair[0]], &list[pair[1]]);
                assert!(a.novelty >= b.novelty);
                if a.novelty == b.novelty {
                    assert!(pair[0] < pair[1], "tie broke append order");
                }
            }
        }
    }
}
