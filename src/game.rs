use std::io;
use rand::Rng;
use tracing::{debug, info, warn};
use crate::action::Action;
use crate::agent::PlayerAgent;
use crate::claim::{ActionResolution, ClaimOutcome, RoleClaim};
use crate::record::TurnRecord;
use crate::{Card, Deck, GameError, GameState, Player, Role};

const MIN_SEATS: usize = 3;
const MAX_SEATS: usize = 6;
const CARDS_PER_HAND: usize = 2;

// The engine proper: seat cursor, card arena and the claim/counter/challenge
// pipeline every declared action runs through. Exactly one action is in
// flight at any time; agent calls block until answered.
pub struct Game {
    turn: usize,
    current_seat: usize,
    deck: Deck,
    players: Vec<Player>,
    agents: Vec<Box<dyn PlayerAgent>>,
    dead_roles: Vec<Role>,
    last_action: Option<(Action, usize, Option<usize>)>,
    history: Vec<TurnRecord>,
}

impl Game {
    pub fn new(agents: Vec<Box<dyn PlayerAgent>>) -> Result<Self, GameError> {
        let seats = agents.len();
        if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
            return Err(GameError::SeatCount(seats));
        }

        Ok(Self {
            turn: 0,
            current_seat: 0,
            deck: Deck::full(),
            players: (0..seats).map(|_| Player::new()).collect(),
            agents,
            dead_roles: Vec::new(),
            last_action: None,
            history: Vec::new(),
        })
    }

    pub fn deal_initial_hands<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.players.iter().any(|player| !player.hand.is_empty()) {
            return Err(GameError::AlreadyDealt);
        }

        self.deck.shuffle(rng);
        for player in &mut self.players {
            player.hand = (0..CARDS_PER_HAND).map(|_| Card::hidden(self.deck.draw())).collect();
        }
        Ok(())
    }

    pub fn seat_count(&self) -> usize {
        self.players.len()
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn current_seat(&self) -> usize {
        self.current_seat
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn dead_roles(&self) -> &[Role] {
        &self.dead_roles
    }

    pub fn last_action(&self) -> Option<(Action, usize, Option<usize>)> {
        self.last_action
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn write_history_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        crate::record::write_csv(&self.history, writer)
    }

    pub fn state(&self) -> GameState {
        GameState::capture(self, None)
    }

    fn state_for(&self, seat: usize) -> GameState {
        GameState::capture(self, Some(seat))
    }

    pub fn is_game_over(&self) -> bool {
        self.living_count() <= 1
    }

    pub fn winner(&self) -> Option<usize> {
        if self.living_count() != 1 {
            return None;
        }
        self.players.iter().position(Player::is_alive)
    }

    fn living_count(&self) -> usize {
        self.players.iter().filter(|player| player.is_alive()).count()
    }

    // living seats in scan order, starting just after the excluded seat
    fn other_living_seats(&self, exclude: usize) -> Vec<usize> {
        (1..self.players.len())
            .map(|n| (exclude + n) % self.players.len())
            .filter(|&seat| self.players[seat].is_alive())
            .collect()
    }

    fn next_living_seat(&self) -> usize {
        let mut seat = (self.current_seat + 1) % self.players.len();
        while !self.players[seat].is_alive() {
            seat = (seat + 1) % self.players.len();
        }
        seat
    }

    fn advance_turn(&mut self) {
        self.turn += 1;
        self.current_seat = self.next_living_seat();
    }

    pub fn valid_actions(&self) -> Vec<Action> {
        let player = &self.players[self.current_seat];

        // coup is the only option once a seat sits on 10 or more coins
        if player.coins >= 10 {
            return vec![Action::Coup];
        }

        let mut actions = vec![Action::Income, Action::ForeignAid];
        if player.coins >= Action::Coup.min_coins() {
            actions.push(Action::Coup);
        }
        if player.coins >= Action::Blackmailer.min_coins() {
            actions.push(Action::Blackmailer);
        }
        actions.extend([Action::Illusionist, Action::Spy, Action::Pope]);
        actions
    }

    /// Runs one declared action end to end: claim, counters, challenges,
    /// resolution, execution. Game-rule failures (a blocked action, a lost
    /// challenge) come back as `Ok(false)`; `Err` is reserved for invalid
    /// declarations, which still consume the turn.
    pub fn perform_action<R: Rng>(
        &mut self,
        action: Action,
        target: Option<usize>,
        claimed_role: Option<Role>,
        rng: &mut R,
    ) -> Result<bool, GameError> {
        if self.players.iter().any(|player| player.hand.is_empty()) {
            return Err(GameError::HandsNotDealt);
        }
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        if let Err(err) = self.validate_declaration(action, target, claimed_role) {
            debug!(seat = self.current_seat, %action, %err, "declaration rejected");
            self.advance_turn();
            return Err(err);
        }

        let actor = self.current_seat;
        self.last_action = Some((action, actor, target));
        debug!(turn = self.turn, seat = actor, %action, ?target, "action declared");

        let mut resolution = ActionResolution::new(action, actor, target);
        if let Some(role) = action.required_role() {
            resolution.claims.push(RoleClaim::initial(actor, role, target));
        }

        if !action.counter_roles().is_empty() {
            self.collect_counters(&mut resolution);
        }
        for idx in 0..resolution.claims.len() {
            self.seek_challenger(&mut resolution.claims[idx]);
        }
        self.resolve_claims(&mut resolution.claims, rng);
        resolution.settle_outcome();

        if resolution.outcome {
            self.execute(&resolution, rng);
        }
        debug!(seat = actor, %action, outcome = resolution.outcome, "action settled");

        self.history.push(TurnRecord::from_resolution(self.turn, &resolution));
        self.advance_turn();
        Ok(resolution.outcome)
    }

    /// Asks the current seat's agent for a declaration and performs it.
    pub fn play_turn<R: Rng>(&mut self, rng: &mut R) -> Result<bool, GameError> {
        let seat = self.current_seat;
        let valid = self.valid_actions();
        let state = self.state_for(seat);
        let (action, target, claimed_role) = self.agents[seat].choose_action(&valid, &state);
        self.perform_action(action, target, claimed_role, rng)
    }

    fn validate_declaration(
        &self,
        action: Action,
        target: Option<usize>,
        claimed_role: Option<Role>,
    ) -> Result<(), GameError> {
        if !self.valid_actions().contains(&action) {
            return Err(GameError::InvalidAction(action));
        }

        if action.requires_target() {
            let target = target.ok_or(GameError::MissingTarget(action))?;
            let targetable = target < self.players.len()
                && target != self.current_seat
                && self.players[target].is_alive();
            if !targetable {
                return Err(GameError::InvalidTarget(target));
            }
        }

        if let Some(required) = action.required_role() {
            match claimed_role {
                None => return Err(GameError::MissingClaim(action)),
                Some(claimed) if claimed != required => {
                    return Err(GameError::ClaimMismatch { action, claimed });
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    // Counter phase. A single-target coercive action can only be countered
    // by its target; anything else is open to every other living seat, asked
    // in seat order after the actor.
    fn collect_counters(&mut self, resolution: &mut ActionResolution) {
        let possible = resolution.action.counter_roles();
        let candidates: Vec<usize> = if resolution.action.requires_target() {
            resolution.target.into_iter().collect()
        } else {
            self.other_living_seats(resolution.actor)
        };

        for seat in candidates {
            let state = self.state_for(seat);
            let Some(role) = self.agents[seat].wants_to_counter(&*resolution, possible, &state)
            else {
                continue;
            };
            if !possible.contains(&role) {
                warn!(seat, %role, action = %resolution.action, "counter role not in table, ignored");
                continue;
            }
            debug!(seat, %role, action = %resolution.action, "counter claimed");
            resolution.claims.push(RoleClaim::counter(seat, role));
        }
    }

    // Challenge scan for one claim: every other living seat in seat order,
    // first yes becomes the only challenger.
    fn seek_challenger(&mut self, claim: &mut RoleClaim) {
        for seat in self.other_living_seats(claim.claimant) {
            let state = self.state_for(seat);
            if self.agents[seat].wants_to_challenge(&*claim, &state) {
                debug!(challenger = seat, claimant = claim.claimant, role = %claim.role, "claim challenged");
                claim.challenger = Some(seat);
                return;
            }
        }
    }

    // Settles claims strictly in creation order. Card losses land as they
    // come up, so a defeated initial claim still leaves later counter claims
    // to be resolved for their own consequences.
    fn resolve_claims<R: Rng>(&mut self, claims: &mut [RoleClaim], rng: &mut R) {
        for claim in claims.iter_mut() {
            let outcome = match claim.challenger {
                None => ClaimOutcome::Upheld,
                Some(challenger) => {
                    if self.players[claim.claimant].holds_unrevealed(claim.role) {
                        self.eliminate(challenger, rng);
                        self.replace_card(claim.claimant, claim.role, rng);
                        ClaimOutcome::Upheld
                    } else {
                        self.eliminate(claim.claimant, rng);
                        ClaimOutcome::Defeated
                    }
                }
            };
            claim.outcome = outcome;
            debug!(claimant = claim.claimant, role = %claim.role, ?outcome, "claim settled");
        }
    }

    // Elimination: the seat picks one of its own face-down cards to flip.
    // A reveal that empties the hand kills the seat and hands any remaining
    // coins to the inheritance settlement before control returns.
    fn eliminate<R: Rng>(&mut self, seat: usize, rng: &mut R) -> Option<Role> {
        if !self.players[seat].is_alive() {
            return None;
        }

        let card_idx = loop {
            let pick = self.agents[seat].choose_card_to_lose(&self.players[seat].hand);
            if self.players[seat].is_unrevealed(pick) {
                break pick;
            }
            warn!(seat, pick, "invalid card index from agent, asking again");
        };

        self.players[seat].hand[card_idx].revealed = true;
        let role = self.players[seat].hand[card_idx].role;
        debug!(seat, %role, "card revealed");

        if !self.players[seat].is_alive() {
            info!(seat, "seat is out of the game");
            self.dead_roles.extend(self.players[seat].revealed_roles());
            if self.players[seat].coins > 0 {
                self.settle_inheritance(seat, rng);
            }
        }

        Some(role)
    }

    // After a failed challenge the claimant's proven card goes back into the
    // deck and a fresh one is dealt into the same slot. Skipped if a cascade
    // already flipped that copy in the meantime.
    fn replace_card<R: Rng>(&mut self, seat: usize, role: Role, rng: &mut R) {
        let Some(card_idx) = self.players[seat].find_unrevealed(role) else {
            debug!(seat, %role, "proven card already gone, replacement skipped");
            return;
        };
        self.deck.put_back(role, rng);
        self.players[seat].hand[card_idx] = Card::hidden(self.deck.draw());
    }

    // Inheritance settlement: other living seats may claim the Undertaker to
    // split the dead seat's coins. Claims run through the same challenge and
    // resolution machinery as action claims, cascades included.
    fn settle_inheritance<R: Rng>(&mut self, dead_seat: usize, rng: &mut R) {
        let estate = self.players[dead_seat].coins;
        self.players[dead_seat].coins = 0;
        debug!(seat = dead_seat, estate, "estate up for claim");

        let mut claims = Vec::new();
        for seat in self.other_living_seats(dead_seat) {
            let state = self.state_for(seat);
            if self.agents[seat].wants_to_claim_undertaker_coins(estate, &state) {
                debug!(seat, "undertaker claim on the estate");
                claims.push(RoleClaim::initial(seat, Role::Undertaker, None));
            }
        }
        for claim in claims.iter_mut() {
            self.seek_challenger(claim);
        }
        self.resolve_claims(&mut claims, rng);

        let heirs: Vec<usize> = claims
            .iter()
            .filter(|claim| claim.upheld())
            .map(|claim| claim.claimant)
            .collect();
        if heirs.is_empty() {
            debug!(estate, "estate removed from play");
            return;
        }

        // integer split; the remainder leaves the game
        let share = estate / heirs.len() as u8;
        for &heir in &heirs {
            self.players[heir].coins += share;
        }
        info!(seat = dead_seat, estate, share, heirs = heirs.len(), "estate split");
    }

    // Effects of a settled, successful action. Anything here that flips a
    // card goes through eliminate(), so cascading deaths are handled before
    // the turn ends.
    fn execute<R: Rng>(&mut self, resolution: &ActionResolution, rng: &mut R) {
        let actor = resolution.actor;

        match resolution.action {
            Action::Income => {
                self.players[actor].coins += 1;
            }
            Action::ForeignAid => {
                self.players[actor].coins += 2;
            }
            Action::Coup => {
                self.players[actor].coins -= Action::Coup.min_coins();
                if let Some(target) = resolution.target {
                    self.eliminate(target, rng);
                }
            }
            Action::Illusionist => self.execute_illusionist(resolution),
            Action::Blackmailer => self.execute_blackmail(resolution, rng),
            Action::Spy => self.execute_spy(actor, rng),
            Action::Pope => self.execute_pope(resolution),
        }
    }

    // Take 4, then pay 1 to each seat whose Illusionist counter was upheld,
    // stopping silently once the balance hits zero. With at most 4 upheld
    // Illusionist claimants in total, any counter-claimant missed by the
    // first pass is paid under the same floor.
    fn execute_illusionist(&mut self, resolution: &ActionResolution) {
        let actor = resolution.actor;
        self.players[actor].coins += 4;

        let counter_seats: Vec<usize> = resolution
            .upheld_counters()
            .filter(|claim| claim.role == Role::Illusionist)
            .map(|claim| claim.claimant)
            .collect();

        let mut paid = Vec::new();
        for &seat in &counter_seats {
            if self.players[actor].coins == 0 {
                break;
            }
            self.players[actor].coins -= 1;
            self.players[seat].coins += 1;
            paid.push(seat);
        }

        let upheld_illusionists = resolution
            .claims
            .iter()
            .filter(|claim| claim.upheld() && claim.role == Role::Illusionist)
            .count();
        if upheld_illusionists <= 4 {
            for &seat in &counter_seats {
                if paid.contains(&seat) {
                    continue;
                }
                if self.players[actor].coins == 0 {
                    break;
                }
                self.players[actor].coins -= 1;
                self.players[seat].coins += 1;
            }
        }
    }

    // A target short of 3 coins is forced to flip a card and is handed 3
    // coins by the actor; a solvent target picks between paying 3 and
    // flipping a card for the same 3-coin compensation.
    fn execute_blackmail<R: Rng>(&mut self, resolution: &ActionResolution, rng: &mut R) {
        let actor = resolution.actor;
        let Some(target) = resolution.target else {
            return;
        };
        if self.players[actor].coins < Action::Blackmailer.min_coins() {
            return;
        }
        // a target that lost its last card challenging the claim is past blackmailing
        if !self.players[target].is_alive() {
            debug!(target, "blackmail target died during resolution, no effect");
            return;
        }

        if self.players[target].coins < 3 {
            self.eliminate(target, rng);
            self.players[target].coins += 3;
            self.players[actor].coins -= 3;
            return;
        }

        let state = self.state_for(target);
        if self.agents[target].chooses_pay_blackmail(&state) {
            self.players[target].coins -= 3;
            self.players[actor].coins += 3;
        } else {
            self.eliminate(target, rng);
            self.players[target].coins += 3;
            self.players[actor].coins -= 3;
        }
    }

    // Draw one, discard one (hand briefly holds three), then keep paying a
    // coin to redo the cycle while the agent opts in and the balance lasts.
    fn execute_spy<R: Rng>(&mut self, actor: usize, rng: &mut R) {
        self.spy_cycle(actor, rng);
        loop {
            if self.players[actor].coins < 1 {
                break;
            }
            let state = self.state_for(actor);
            if !self.agents[actor].wants_to_redo_spy(&state) {
                break;
            }
            self.players[actor].coins -= 1;
            self.spy_cycle(actor, rng);
        }
    }

    fn spy_cycle<R: Rng>(&mut self, seat: usize, rng: &mut R) {
        let drawn = self.deck.draw();
        self.players[seat].hand.push(Card::hidden(drawn));

        let card_idx = loop {
            let pick = self.agents[seat].choose_card_to_discard(&self.players[seat].hand);
            if self.players[seat].is_unrevealed(pick) {
                break pick;
            }
            warn!(seat, pick, "invalid discard index from agent, asking again");
        };

        let discarded = self.players[seat].hand.remove(card_idx);
        self.deck.put_back(discarded.role, rng);
        debug!(seat, "spy exchange done");
    }

    // One coin from every other living seat that has one and did not shield
    // itself with an upheld Pope counter.
    fn execute_pope(&mut self, resolution: &ActionResolution) {
        let actor = resolution.actor;
        for seat in self.other_living_seats(actor) {
            let shielded = resolution
                .upheld_counters()
                .any(|claim| claim.claimant == seat && claim.role == Role::Pope);
            if shielded || self.players[seat].coins == 0 {
                continue;
            }
            self.players[seat].coins -= 1;
            self.players[actor].coins += 1;
        }
    }
}
