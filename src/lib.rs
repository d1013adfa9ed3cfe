pub mod action;
pub mod agent;
pub mod claim;
pub mod game;
pub mod record;

pub use action::Action;
pub use agent::{PlayerAgent, RandomAgent};
pub use claim::{ActionResolution, ClaimOutcome, RoleClaim};
pub use game::Game;
pub use record::TurnRecord;

use std::fmt;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::Role::{Blackmailer, Illusionist, Pope, Spy, Undertaker};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Illusionist,
    Spy,
    Undertaker,
    Pope,
    Blackmailer,
}

pub static ROLE_VARIANTS: [Role; 5] = [
    Illusionist,
    Spy,
    Undertaker,
    Pope,
    Blackmailer,
];

pub const COPIES_PER_ROLE: usize = 3;
pub const STARTING_COINS: u8 = 2;

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Illusionist => "Illusionist",
            Spy => "Spy",
            Undertaker => "Undertaker",
            Pope => "Pope",
            Blackmailer => "Blackmailer",
        };
        f.write_str(label)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub role: Role,
    pub revealed: bool,
}

impl Card {
    pub fn hidden(role: Role) -> Self {
        Self { role, revealed: false }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub(crate) coins: u8,
    pub(crate) hand: Vec<Card>,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self { coins: STARTING_COINS, hand: Vec::new() }
    }

    pub fn coins(&self) -> u8 {
        self.coins
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    // a seat is alive while at least one card is still face down
    pub fn is_alive(&self) -> bool {
        self.hand.iter().any(|card| !card.revealed)
    }

    pub(crate) fn is_unrevealed(&self, card_idx: usize) -> bool {
        self.hand.get(card_idx).is_some_and(|card| !card.revealed)
    }

    pub(crate) fn holds_unrevealed(&self, role: Role) -> bool {
        self.find_unrevealed(role).is_some()
    }

    pub(crate) fn find_unrevealed(&self, role: Role) -> Option<usize> {
        self.hand.iter().position(|card| !card.revealed && card.role == role)
    }

    pub(crate) fn unrevealed_roles(&self) -> Vec<Role> {
        self.hand.iter().filter(|card| !card.revealed).map(|card| card.role).collect()
    }

    pub(crate) fn revealed_roles(&self) -> Vec<Role> {
        self.hand.iter().filter(|card| card.revealed).map(|card| card.role).collect()
    }
}

// Face-down draw pile. Deck cards carry no revealed flag, so the pile
// stores bare roles; every return reshuffles before the next draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Role>,
}

impl Deck {
    pub fn full() -> Self {
        let cards = ROLE_VARIANTS
            .iter()
            .flat_map(|&role| std::iter::repeat(role).take(COPIES_PER_ROLE))
            .collect();
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub(crate) fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub(crate) fn draw(&mut self) -> Role {
        if self.cards.is_empty() {
            panic!("deck exhausted: hands can never absorb all 15 cards");
        }
        self.cards.remove(0)
    }

    pub(crate) fn put_back<R: Rng>(&mut self, role: Role, rng: &mut R) {
        self.cards.push(role);
        self.shuffle(rng);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("seat count {0} outside the supported 3-6 range")]
    SeatCount(usize),
    #[error("initial hands have not been dealt")]
    HandsNotDealt,
    #[error("initial hands were already dealt")]
    AlreadyDealt,
    #[error("the game is already over")]
    GameOver,
    #[error("{0} is not a valid action for the current seat")]
    InvalidAction(Action),
    #[error("{0} requires a claimed role")]
    MissingClaim(Action),
    #[error("claimed {claimed} but {action} is backed by a different role")]
    ClaimMismatch { action: Action, claimed: Role },
    #[error("{0} requires a target seat")]
    MissingTarget(Action),
    #[error("seat {0} cannot be targeted")]
    InvalidTarget(usize),
}

// What any seat is allowed to see about another seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub coins: u8,
    pub unrevealed: usize,
    pub revealed: Vec<Role>,
    pub alive: bool,
}

impl SeatView {
    fn of(player: &Player) -> Self {
        Self {
            coins: player.coins,
            unrevealed: player.hand.iter().filter(|card| !card.revealed).count(),
            revealed: player.revealed_roles(),
            alive: player.is_alive(),
        }
    }
}

// Read-only projection handed to player agents. `hand` holds the viewer's
// own unrevealed roles and stays empty in the neutral view; no snapshot
// ever carries another seat's hidden cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub turn: usize,
    pub current_seat: usize,
    pub deck_size: usize,
    pub seats: Vec<SeatView>,
    pub viewer: Option<usize>,
    pub hand: Vec<Role>,
    pub counters: Vec<(Action, Vec<Role>)>,
    pub dead_roles: Vec<Role>,
    pub last_action: Option<(Action, usize, Option<usize>)>,
}

impl GameState {
    pub(crate) fn capture(game: &Game, viewer: Option<usize>) -> Self {
        Self {
            turn: game.turn(),
            current_seat: game.current_seat(),
            deck_size: game.deck_size(),
            seats: game.players().iter().map(SeatView::of).collect(),
            viewer,
            hand: viewer.map(|seat| game.players()[seat].unrevealed_roles()).unwrap_or_default(),
            counters: action::counter_table(),
            dead_roles: game.dead_roles().to_vec(),
            last_action: game.last_action(),
        }
    }

    pub fn living_seats(&self) -> impl Iterator<Item = usize> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(seat, view)| view.alive.then_some(seat))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;
    use super::*;

    #[test]
    fn full_deck_has_three_of_each_role() {
        let deck = Deck::full();
        assert_eq!(deck.len(), ROLE_VARIANTS.len() * COPIES_PER_ROLE);
        for role in ROLE_VARIANTS {
            let count = deck.cards.iter().filter(|&&r| r == role).count();
            assert_eq!(count, COPIES_PER_ROLE);
        }
    }

    #[test]
    fn shuffle_with_same_seed_is_deterministic() {
        let mut deck_a = Deck::full();
        let mut deck_b = Deck::full();
        deck_a.shuffle(&mut Pcg64Mcg::seed_from_u64(42));
        deck_b.shuffle(&mut Pcg64Mcg::seed_from_u64(42));
        assert_eq!(deck_a, deck_b);
    }

    #[test]
    fn draw_and_put_back_leaves_size_unchanged() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let mut deck = Deck::full();
        deck.shuffle(&mut rng);
        let before = deck.len();
        let role = deck.draw();
        assert_eq!(deck.len(), before - 1);
        deck.put_back(role, &mut rng);
        assert_eq!(deck.len(), before);
    }

    #[test]
    fn player_is_alive_while_a_card_is_face_down() {
        let mut player = Player::new();
        player.hand = vec![Card::hidden(Role::Spy), Card::hidden(Role::Pope)];
        assert!(player.is_alive());

        player.hand[0].revealed = true;
        assert!(player.is_alive());

        player.hand[1].revealed = true;
        assert!(!player.is_alive());
    }

    #[test]
    fn find_unrevealed_ignores_face_up_copies() {
        let mut player = Player::new();
        player.hand = vec![Card::hidden(Role::Pope), Card::hidden(Role::Pope)];
        player.hand[0].revealed = true;
        assert_eq!(player.find_unrevealed(Role::Pope), Some(1));
        assert!(!player.holds_unrevealed(Role::Spy));
    }

    #[test]
    fn seat_view_hides_unrevealed_identities() {
        let mut player = Player::new();
        player.hand = vec![Card::hidden(Role::Undertaker), Card::hidden(Role::Spy)];
        player.hand[1].revealed = true;

        let view = SeatView::of(&player);
        assert_eq!(view.unrevealed, 1);
        assert_eq!(view.revealed, vec![Role::Spy]);
        assert!(view.alive);
    }
}
