use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use crate::claim::{ActionResolution, RoleClaim};
use crate::{Action, Card, GameState, Role};

/// Decision capabilities the engine requires from every seat. The engine
/// never inspects which implementation it holds; every call blocks until
/// the agent answers and sees only the read-only snapshot plus the claim
/// or resolution under consideration.
pub trait PlayerAgent {
    fn choose_action(
        &mut self,
        valid_actions: &[Action],
        state: &GameState,
    ) -> (Action, Option<usize>, Option<Role>);

    fn wants_to_challenge(&mut self, claim: &RoleClaim, state: &GameState) -> bool;

    fn wants_to_counter(
        &mut self,
        resolution: &ActionResolution,
        possible_roles: &[Role],
        state: &GameState,
    ) -> Option<Role>;

    fn choose_card_to_lose(&mut self, hand: &[Card]) -> usize;

    fn choose_card_to_discard(&mut self, hand: &[Card]) -> usize;

    fn wants_to_redo_spy(&mut self, state: &GameState) -> bool;

    fn chooses_pay_blackmail(&mut self, state: &GameState) -> bool;

    fn wants_to_claim_undertaker_coins(&mut self, available_coins: u8, state: &GameState) -> bool;
}

// Uniformly random but always-valid decisions. No evaluation of any kind;
// exists to drive playouts in tests and benches.
pub struct RandomAgent {
    rng: Pcg64Mcg,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self { rng: Pcg64Mcg::seed_from_u64(seed) }
    }

    fn random_unrevealed(&mut self, hand: &[Card]) -> usize {
        let unrevealed: Vec<usize> = hand
            .iter()
            .enumerate()
            .filter_map(|(idx, card)| (!card.revealed).then_some(idx))
            .collect();
        unrevealed.choose(&mut self.rng).copied().unwrap_or(0)
    }
}

impl PlayerAgent for RandomAgent {
    fn choose_action(
        &mut self,
        valid_actions: &[Action],
        state: &GameState,
    ) -> (Action, Option<usize>, Option<Role>) {
        let me = state.viewer.unwrap_or(state.current_seat);
        let action = *valid_actions.choose(&mut self.rng).expect("at least one action is always valid");
        let target = if action.requires_target() {
            let others: Vec<usize> = state.living_seats().filter(|&seat| seat != me).collect();
            others.choose(&mut self.rng).copied()
        } else {
            None
        };
        (action, target, action.required_role())
    }

    fn wants_to_challenge(&mut self, _claim: &RoleClaim, _state: &GameState) -> bool {
        self.rng.gen_bool(0.1)
    }

    fn wants_to_counter(
        &mut self,
        _resolution: &ActionResolution,
        possible_roles: &[Role],
        _state: &GameState,
    ) -> Option<Role> {
        if self.rng.gen_bool(0.2) {
            possible_roles.choose(&mut self.rng).copied()
        } else {
            None
        }
    }

    fn choose_card_to_lose(&mut self, hand: &[Card]) -> usize {
        self.random_unrevealed(hand)
    }

    fn choose_card_to_discard(&mut self, hand: &[Card]) -> usize {
        self.random_unrevealed(hand)
    }

    fn wants_to_redo_spy(&mut self, _state: &GameState) -> bool {
        self.rng.gen_bool(0.25)
    }

    fn chooses_pay_blackmail(&mut self, _state: &GameState) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn wants_to_claim_undertaker_coins(&mut self, _available_coins: u8, _state: &GameState) -> bool {
        self.rng.gen_bool(0.5)
    }
}
