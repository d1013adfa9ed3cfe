use serde::{Deserialize, Serialize};
use crate::{Action, Role};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimOutcome {
    Pending,
    Upheld,
    Defeated,
}

// One assertion that a seat holds a role, backing either the action itself
// or a counter to it. Created once, settled exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaim {
    pub claimant: usize,
    pub role: Role,
    pub is_counter: bool,
    pub target: Option<usize>,
    pub challenger: Option<usize>,
    pub outcome: ClaimOutcome,
}

impl RoleClaim {
    pub fn initial(claimant: usize, role: Role, target: Option<usize>) -> Self {
        Self {
            claimant,
            role,
            is_counter: false,
            target,
            challenger: None,
            outcome: ClaimOutcome::Pending,
        }
    }

    pub fn counter(claimant: usize, role: Role) -> Self {
        Self {
            claimant,
            role,
            is_counter: true,
            target: None,
            challenger: None,
            outcome: ClaimOutcome::Pending,
        }
    }

    pub fn upheld(&self) -> bool {
        self.outcome == ClaimOutcome::Upheld
    }
}

// Everything one action invocation accumulates on its way through the
// claim/counter/challenge pipeline. Dropped when the turn ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResolution {
    pub action: Action,
    pub actor: usize,
    pub target: Option<usize>,
    pub claims: Vec<RoleClaim>,
    pub outcome: bool,
}

impl ActionResolution {
    pub fn new(action: Action, actor: usize, target: Option<usize>) -> Self {
        Self { action, actor, target, claims: Vec::new(), outcome: false }
    }

    pub fn initial_claim(&self) -> Option<&RoleClaim> {
        self.claims.iter().find(|claim| !claim.is_counter)
    }

    pub fn upheld_counters(&self) -> impl Iterator<Item = &RoleClaim> {
        self.claims.iter().filter(|claim| claim.is_counter && claim.upheld())
    }

    // A fully blockable action dies to any upheld counter no matter how the
    // initial claim fared. Everything else stands or falls with the initial
    // claim, and an action that needed no claim just succeeds.
    pub fn settle_outcome(&mut self) {
        if self.action.fully_blockable() && self.upheld_counters().next().is_some() {
            self.outcome = false;
            return;
        }
        self.outcome = match self.initial_claim() {
            Some(claim) => claim.upheld(),
            None => true,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upheld(mut claim: RoleClaim) -> RoleClaim {
        claim.outcome = ClaimOutcome::Upheld;
        claim
    }

    fn defeated(mut claim: RoleClaim) -> RoleClaim {
        claim.outcome = ClaimOutcome::Defeated;
        claim
    }

    #[test]
    fn claimless_action_succeeds() {
        let mut resolution = ActionResolution::new(Action::ForeignAid, 0, None);
        resolution.settle_outcome();
        assert!(resolution.outcome);
    }

    #[test]
    fn upheld_counter_kills_a_fully_blockable_action() {
        let mut resolution = ActionResolution::new(Action::ForeignAid, 0, None);
        resolution.claims.push(upheld(RoleClaim::counter(2, Role::Illusionist)));
        resolution.settle_outcome();
        assert!(!resolution.outcome);
    }

    #[test]
    fn upheld_counter_outranks_an_upheld_initial_claim() {
        // superseded lineage let the initial claim win here; the later rule
        // blocks unconditionally
        let mut resolution = ActionResolution::new(Action::Blackmailer, 0, Some(1));
        resolution.claims.push(upheld(RoleClaim::initial(0, Role::Blackmailer, Some(1))));
        resolution.claims.push(upheld(RoleClaim::counter(1, Role::Undertaker)));
        resolution.settle_outcome();
        assert!(!resolution.outcome);
    }

    #[test]
    fn defeated_initial_claim_fails_even_without_counters() {
        let mut resolution = ActionResolution::new(Action::Illusionist, 0, None);
        resolution.claims.push(defeated(RoleClaim::initial(0, Role::Illusionist, None)));
        resolution.settle_outcome();
        assert!(!resolution.outcome);
    }

    #[test]
    fn partially_blockable_action_survives_upheld_counters() {
        let mut resolution = ActionResolution::new(Action::Pope, 0, None);
        resolution.claims.push(upheld(RoleClaim::initial(0, Role::Pope, None)));
        resolution.claims.push(upheld(RoleClaim::counter(1, Role::Pope)));
        resolution.settle_outcome();
        assert!(resolution.outcome);
    }

    #[test]
    fn initial_claim_is_found_among_counters() {
        let mut resolution = ActionResolution::new(Action::Illusionist, 0, None);
        resolution.claims.push(RoleClaim::initial(0, Role::Illusionist, None));
        resolution.claims.push(RoleClaim::counter(1, Role::Illusionist));
        resolution.claims.push(RoleClaim::counter(2, Role::Illusionist));
        assert_eq!(resolution.initial_claim().map(|claim| claim.claimant), Some(0));
        resolution.claims[2].outcome = ClaimOutcome::Upheld;
        assert_eq!(resolution.upheld_counters().count(), 1);
    }
}
