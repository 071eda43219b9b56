use super::block_deque::BlockDeque;

#[test]
#[should_panic(expected = "block_len must be at least 2")]
fn test_new_rejects_block_len_of_one() {
    let _ = BlockDeque::<i32>::new(1, 0);
}

#[test]
#[should_panic(expected = "block_len must be at least 2")]
fn test_new_rejects_block_len_of_zero() {
    let _ = BlockDeque::<i32>::new(0, 10);
}

#[test]
fn test_new_accepts_minimum_block_len() {
    let mut dq = BlockDeque::new(2, 0);
    dq.push_back(1);
    dq.push_back(2);
    dq.push_back(3);
    assert_eq!(3, dq.len());
    assert_eq!(Some(1), dq.pop_front());
    assert_eq!(Some(2), dq.pop_front());
    assert_eq!(Some(3), dq.pop_front());
}

#[test]
fn test_default_is_unbounded() {
    let mut dq = BlockDeque::default();
    assert_eq!(32, dq.block_len());
    assert_eq!(0, dq.max_len());
    for i in 0..1000 {
        dq.push_back(i);
    }
    assert_eq!(1000, dq.len());
}

#[test]
fn test_empty_deque_semantics() {
    let mut dq: BlockDeque<i32> = BlockDeque::new(4, 0);
    assert!(dq.is_empty());
    assert_eq!(0, dq.len());
    assert_eq!(None, dq.pop_front());
    assert_eq!(None, dq.pop_back());
    assert_eq!(None, dq.front());
    assert_eq!(None, dq.back());
    assert_eq!(None, dq.front_mut());
    assert_eq!(None, dq.back_mut());
    assert_eq!(None, dq.iter().next());
    assert_eq!(None, dq.blocks().next());
}

#[test]
fn test_push_back_pop_front_across_blocks() {
    // Five pushes into four-slot blocks must cross a block boundary.
    let mut dq = BlockDeque::new(4, 0);
    for i in 1..=5 {
        dq.push_back(i);
    }
    assert_eq!(5, dq.len());
    assert_eq!(Some(1), dq.pop_front());
    assert_eq!(Some(2), dq.pop_front());
    assert_eq!(Some(3), dq.pop_front());
    assert_eq!(Some(4), dq.pop_front());
    assert_eq!(Some(5), dq.pop_front());
    assert_eq!(None, dq.pop_front());
    assert!(dq.is_empty());
}

#[test]
fn test_push_front_pop_back_mirrors_fifo() {
    let mut dq = BlockDeque::new(4, 0);
    for i in 1..=5 {
        dq.push_front(i);
    }
    for i in 1..=5 {
        assert_eq!(Some(i), dq.pop_back());
    }
    assert_eq!(None, dq.pop_back());
}

#[test]
fn test_push_back_pop_back_is_lifo() {
    let mut dq = BlockDeque::new(3, 0);
    for i in 1..=7 {
        dq.push_back(i);
    }
    for i in (1..=7).rev() {
        assert_eq!(Some(i), dq.pop_back());
    }
}

#[test]
fn test_order_preserved_over_many_blocks() {
    let mut dq = BlockDeque::new(4, 0);
    for i in 0..100 {
        dq.push_back(i);
    }
    assert_eq!(100, dq.len());
    for i in 0..100 {
        assert_eq!(Some(i), dq.pop_front());
    }
    assert!(dq.is_empty());
}

#[test]
fn test_length_tracks_mixed_operations() {
    let mut dq = BlockDeque::new(4, 0);
    dq.push_back(1);
    dq.push_front(0);
    dq.push_back(2);
    assert_eq!(3, dq.len());

    dq.pop_front();
    assert_eq!(2, dq.len());
    dq.pop_back();
    assert_eq!(1, dq.len());
    dq.pop_back();
    assert_eq!(0, dq.len());

    // Pops on empty must not disturb the count.
    dq.pop_front();
    dq.pop_back();
    assert_eq!(0, dq.len());

    dq.push_front(9);
    assert_eq!(1, dq.len());
}

#[test]
fn test_mixed_ends_preserve_order() {
    let mut dq = BlockDeque::new(2, 0);
    dq.push_back(3);
    dq.push_front(2);
    dq.push_front(1);
    dq.push_back(4);
    dq.push_back(5);

    assert_eq!(Some(1), dq.pop_front());
    assert_eq!(Some(5), dq.pop_back());
    assert_eq!(Some(2), dq.pop_front());
    assert_eq!(Some(4), dq.pop_back());
    assert_eq!(Some(3), dq.pop_front());
    assert!(dq.is_empty());
}

#[test]
fn test_bounded_push_back_evicts_front() {
    // Matches the sliding-window contract: cap 3, pushing 1..=4 keeps [2,3,4].
    let mut dq = BlockDeque::new(4, 3);
    dq.push_back(1);
    dq.push_back(2);
    dq.push_back(3);
    dq.push_back(4);

    assert_eq!(3, dq.len());
    assert_eq!(Some(2), dq.pop_front());
    assert_eq!(Some(3), dq.pop_front());
    assert_eq!(Some(4), dq.pop_front());
    assert!(dq.is_empty());
}

#[test]
fn test_bounded_keeps_last_k_of_k_plus_one() {
    let k = 10;
    let mut dq = BlockDeque::new(4, k);
    for i in 0..=(k as i32) {
        dq.push_back(i);
    }
    assert_eq!(k, dq.len());
    for i in 1..=(k as i32) {
        assert_eq!(Some(i), dq.pop_front());
    }
}

#[test]
fn test_bounded_push_front_evicts_back() {
    let mut dq = BlockDeque::new(4, 3);
    for i in 1..=5 {
        dq.push_front(i);
    }
    assert_eq!(3, dq.len());
    assert_eq!(Some(5), dq.pop_front());
    assert_eq!(Some(4), dq.pop_front());
    assert_eq!(Some(3), dq.pop_front());
}

#[test]
fn test_bound_of_one_keeps_only_newest() {
    // The degenerate single-slot window used for scan-task signalling.
    let mut dq = BlockDeque::new(2, 1);
    dq.push_back("first");
    dq.push_back("second");
    dq.push_back("third");

    assert_eq!(1, dq.len());
    assert_eq!(Some("third"), dq.pop_front());
    assert!(dq.is_empty());
}

#[test]
fn test_eviction_sustained_over_many_pushes() {
    let mut dq = BlockDeque::new(4, 5);
    for i in 0..1000 {
        dq.push_back(i);
        assert!(dq.len() <= 5);
    }
    assert_eq!(5, dq.len());
    for expected in 995..1000 {
        assert_eq!(Some(expected), dq.pop_front());
    }
}

#[test]
fn test_front_and_back_peek() {
    let mut dq = BlockDeque::new(4, 0);
    dq.push_back(10);
    assert_eq!(Some(&10), dq.front());
    assert_eq!(Some(&10), dq.back());

    dq.push_back(20);
    dq.push_front(5);
    assert_eq!(Some(&5), dq.front());
    assert_eq!(Some(&20), dq.back());

    // Peeking must not consume.
    assert_eq!(3, dq.len());
}

#[test]
fn test_front_mut_and_back_mut_update_in_place() {
    let mut dq = BlockDeque::new(4, 0);
    dq.push_back(1);
    dq.push_back(2);
    dq.push_back(3);

    if let Some(front) = dq.front_mut() {
        *front = 100;
    }
    if let Some(back) = dq.back_mut() {
        *back = 300;
    }

    assert_eq!(Some(100), dq.pop_front());
    assert_eq!(Some(2), dq.pop_front());
    assert_eq!(Some(300), dq.pop_front());
}

#[test]
fn test_single_element_seen_from_both_ends() {
    let mut dq = BlockDeque::new(4, 0);
    dq.push_back(42);
    assert_eq!(dq.front(), dq.back());
    assert_eq!(Some(42), dq.pop_back());
    assert_eq!(None, dq.front());
}

#[test]
fn test_refill_after_drain() {
    let mut dq = BlockDeque::new(4, 0);
    for round in 0..5 {
        for i in 0..10 {
            dq.push_back(round * 10 + i);
        }
        for i in 0..10 {
            assert_eq!(Some(round * 10 + i), dq.pop_front());
        }
        assert!(dq.is_empty());
    }
}

#[test]
fn test_drain_direction_alternates() {
    // Drained blocks go through the one-slot free cache in both directions.
    let mut dq = BlockDeque::new(2, 0);
    for i in 0..10 {
        dq.push_back(i);
    }
    for i in 0..5 {
        assert_eq!(Some(i), dq.pop_front());
    }
    for i in (5..10).rev() {
        assert_eq!(Some(i), dq.pop_back());
    }
    assert!(dq.is_empty());

    // The deque must stay usable after full drains from both ends.
    dq.push_front(-1);
    dq.push_back(1);
    assert_eq!(Some(-1), dq.pop_front());
    assert_eq!(Some(1), dq.pop_front());
}

#[test]
fn test_owned_values_move_out() {
    let mut dq: BlockDeque<String> = BlockDeque::new(2, 0);
    dq.push_back("a".to_string());
    dq.push_back("b".to_string());
    dq.push_front("z".to_string());

    assert_eq!(Some("z".to_string()), dq.pop_front());
    assert_eq!(Some("b".to_string()), dq.pop_back());
    assert_eq!(Some("a".to_string()), dq.pop_back());
}

#[test]
fn test_drop_releases_remaining_elements() {
    use std::rc::Rc;

    let witness = Rc::new(());
    {
        let mut dq = BlockDeque::new(4, 0);
        for _ in 0..10 {
            dq.push_back(Rc::clone(&witness));
        }
        assert_eq!(11, Rc::strong_count(&witness));
    }
    // Dropping the deque must drop every buffered clone.
    assert_eq!(1, Rc::strong_count(&witness));
}

#[test]
fn test_eviction_drops_displaced_element() {
    use std::rc::Rc;

    let witness = Rc::new(());
    let mut dq = BlockDeque::new(2, 2);
    dq.push_back(Rc::clone(&witness));
    dq.push_back(Rc::clone(&witness));
    assert_eq!(3, Rc::strong_count(&witness));

    dq.push_back(Rc::clone(&witness));
    // The displaced front clone is gone, only the two buffered ones remain.
    assert_eq!(3, Rc::strong_count(&witness));
    assert_eq!(2, dq.len());
}

#[test]
fn test_debug_lists_elements_in_order() {
    let mut dq = BlockDeque::new(2, 0);
    dq.push_back(1);
    dq.push_back(2);
    dq.push_back(3);
    assert_eq!("[1, 2, 3]", format!("{:?}", dq));
}
