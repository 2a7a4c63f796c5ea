//! Invariants that must hold for any deck size and any player input.

use fluent_memory_core::*;
use proptest::prelude::*;

fn config(pairs: PairCount, budget: Ticks) -> GameConfig {
    let symbols: Vec<String> = (0..pairs).map(|i| format!("symbol-{i}")).collect();
    GameConfig::new(&symbols).with_time_budget(budget)
}

#[derive(Clone, Debug)]
enum Input {
    Flip(TileId),
    Tick,
    Conceal,
}

fn inputs(tiles: TileId) -> impl Strategy<Value = Vec<Input>> {
    let input = prop_oneof![
        // a couple of ids past the end exercise the unknown tile path
        6 => (0..tiles + 2).prop_map(Input::Flip),
        2 => Just(Input::Tick),
        1 => Just(Input::Conceal),
    ];
    prop::collection::vec(input, 0..200)
}

fn face_counts(deck: &Deck) -> Vec<usize> {
    let mut counts = vec![0; usize::from(deck.pair_count())];
    for tile in deck.tiles() {
        counts[tile.face().index()] += 1;
    }
    counts
}

#[test]
fn shuffle_moves_tiles() {
    let ordered: Vec<TileId> = OrderedDeckGenerator
        .generate(&config(6, 60))
        .unwrap()
        .tiles()
        .iter()
        .map(Tile::id)
        .collect();

    for seed in 0..8 {
        let shuffled: Vec<TileId> = RandomDeckGenerator::new(seed)
            .generate(&config(6, 60))
            .unwrap()
            .tiles()
            .iter()
            .map(Tile::id)
            .collect();
        assert_ne!(shuffled, ordered, "seed {seed} left the deck in order");
    }
}

proptest! {
    #[test]
    fn built_deck_has_every_face_twice(pairs in 1..64u16, seed in any::<u64>()) {
        let deck = RandomDeckGenerator::new(seed).generate(&config(pairs, 60)).unwrap();

        prop_assert_eq!(deck.len(), usize::from(pairs) * 2);
        prop_assert!(face_counts(&deck).iter().all(|&count| count == 2));
    }

    #[test]
    fn shuffle_is_a_permutation(pairs in 1..64u16, seed in any::<u64>()) {
        let ordered = OrderedDeckGenerator.generate(&config(pairs, 60)).unwrap();
        let shuffled = RandomDeckGenerator::new(seed).generate(&config(pairs, 60)).unwrap();

        let mut before: Vec<Tile> = ordered.tiles().to_vec();
        let mut after: Vec<Tile> = shuffled.tiles().to_vec();
        before.sort_by_key(Tile::id);
        after.sort_by_key(Tile::id);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn play_preserves_invariants(
        (pairs, script) in (1..8u16).prop_flat_map(|pairs| (Just(pairs), inputs(pairs * 2))),
        seed in any::<u64>(),
        budget in 1..40u32,
    ) {
        let timers = ManualScheduler::new();
        let mut ctl = SessionController::new(
            config(pairs, budget),
            timers.clone(),
            Some(AccountId::new("0xprop")),
            RandomDeckGenerator::new(seed),
        )
        .unwrap();
        let total = pairs * 2;
        let mut frozen_at = None;

        for input in script {
            match input {
                Input::Flip(id) if id < total => {
                    let before: Vec<FlipState> =
                        ctl.session().deck().tiles().iter().map(Tile::state).collect();
                    ctl.flip(id).unwrap();
                    let deck = ctl.session().deck();
                    for (tile, old) in deck.tiles().iter().zip(before) {
                        if old == FlipState::Matched {
                            prop_assert_eq!(tile.state(), FlipState::Matched);
                        }
                    }
                }
                Input::Flip(id) => {
                    prop_assert_eq!(ctl.flip(id), Err(GameError::InvalidTile(id)));
                }
                Input::Tick => {
                    if let Some(clock) = timers.interval() {
                        ctl.on_timer(clock);
                    }
                }
                Input::Conceal => {
                    if let Some(hold) = timers.timeout() {
                        prop_assert_eq!(ctl.on_timer(hold), TimerOutcome::Concealed);
                    }
                }
            }

            let session = ctl.session();
            let deck = session.deck();
            prop_assert!(session.selection().len() <= 2);
            prop_assert_eq!(deck.matched_count() % 2, 0);
            prop_assert!(deck.face_up_count() <= 2);

            // both tiles of a face are always in the same resolved state
            for id in 0..pairs {
                let a = deck[id].state() == FlipState::Matched;
                let b = deck[id + pairs].state() == FlipState::Matched;
                prop_assert_eq!(a, b);
            }

            prop_assert_eq!(usize::from(deck.face_up_count()), session.selection().len());

            let snapshot = ctl.snapshot();
            if let Some(elapsed) = frozen_at {
                prop_assert_eq!(snapshot.elapsed, elapsed);
            } else if session.phase() == Phase::Won {
                frozen_at = Some(snapshot.elapsed);
            }
            let eligible = snapshot.outcome == Outcome::Won && snapshot.elapsed <= budget;
            prop_assert_eq!(snapshot.reward == RewardState::Eligible, eligible);
        }
    }

    #[test]
    fn completions_never_cross_sessions(seed in any::<u64>(), resets in 1..5usize) {
        let timers = ManualScheduler::new();
        let mut ctl = SessionController::new(
            config(1, 60),
            timers,
            Some(AccountId::new("0xprop")),
            RandomDeckGenerator::new(seed),
        )
        .unwrap();
        ctl.flip(0).unwrap();
        ctl.flip(1).unwrap();
        let ticket = ctl.confirm().unwrap().into_ticket().unwrap();

        for round in 0..resets {
            ctl.reset(RandomDeckGenerator::new(seed.wrapping_add(round as u64))).unwrap();
        }

        let completion = ticket.complete(Ok(ReceiptId::new("0xstale")));
        prop_assert_eq!(ctl.complete(completion), CompletionOutcome::Stale);
        prop_assert_eq!(ctl.reward().state(), RewardState::Ineligible);
    }
}
