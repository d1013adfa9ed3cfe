use std::fmt;
use serde::{Deserialize, Serialize};
use crate::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Income,
    ForeignAid,
    Coup,
    Illusionist,
    Spy,
    Pope,
    Blackmailer,
}

pub static ACTION_VARIANTS: [Action; 7] = [
    Action::Income,
    Action::ForeignAid,
    Action::Coup,
    Action::Illusionist,
    Action::Spy,
    Action::Pope,
    Action::Blackmailer,
];

impl Action {
    // the role a seat must claim to declare this action
    pub fn required_role(self) -> Option<Role> {
        match self {
            Action::Illusionist => Some(Role::Illusionist),
            Action::Spy => Some(Role::Spy),
            Action::Pope => Some(Role::Pope),
            Action::Blackmailer => Some(Role::Blackmailer),
            Action::Income | Action::ForeignAid | Action::Coup => None,
        }
    }

    // roles that may be claimed to counter this action; empty means the
    // action cannot be countered at all
    pub fn counter_roles(self) -> &'static [Role] {
        match self {
            Action::ForeignAid => &[Role::Illusionist],
            Action::Illusionist => &[Role::Illusionist],
            Action::Pope => &[Role::Pope],
            Action::Blackmailer => &[Role::Undertaker],
            Action::Income | Action::Coup | Action::Spy => &[],
        }
    }

    pub fn requires_target(self) -> bool {
        matches!(self, Action::Coup | Action::Blackmailer)
    }

    // minimum balance before the action may even be declared
    pub fn min_coins(self) -> u8 {
        match self {
            Action::Coup => 7,
            Action::Blackmailer => 3,
            _ => 0,
        }
    }

    // an upheld counter kills these actions outright; Pope and Illusionist
    // counters only shield or tax the counter-claimant instead
    pub fn fully_blockable(self) -> bool {
        matches!(self, Action::ForeignAid | Action::Blackmailer)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Income => "Income",
            Action::ForeignAid => "Foreign Aid",
            Action::Coup => "Coup",
            Action::Illusionist => "Illusionist",
            Action::Spy => "Spy",
            Action::Pope => "Pope",
            Action::Blackmailer => "Blackmailer",
        };
        f.write_str(label)
    }
}

// counter-eligibility table in the shape the snapshot exposes
pub fn counter_table() -> Vec<(Action, Vec<Role>)> {
    ACTION_VARIANTS
        .iter()
        .filter(|action| !action.counter_roles().is_empty())
        .map(|&action| (action, action.counter_roles().to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_actions_require_their_own_role() {
        assert_eq!(Action::Illusionist.required_role(), Some(Role::Illusionist));
        assert_eq!(Action::Spy.required_role(), Some(Role::Spy));
        assert_eq!(Action::Pope.required_role(), Some(Role::Pope));
        assert_eq!(Action::Blackmailer.required_role(), Some(Role::Blackmailer));
    }

    #[test]
    fn economic_actions_require_no_role() {
        assert_eq!(Action::Income.required_role(), None);
        assert_eq!(Action::ForeignAid.required_role(), None);
        assert_eq!(Action::Coup.required_role(), None);
    }

    #[test]
    fn blackmailer_is_countered_by_undertaker_only() {
        assert_eq!(Action::Blackmailer.counter_roles(), &[Role::Undertaker]);
    }

    #[test]
    fn income_coup_and_spy_cannot_be_countered() {
        assert!(Action::Income.counter_roles().is_empty());
        assert!(Action::Coup.counter_roles().is_empty());
        assert!(Action::Spy.counter_roles().is_empty());
    }

    #[test]
    fn only_coercive_actions_take_targets() {
        let targeted: Vec<Action> = ACTION_VARIANTS
            .iter()
            .copied()
            .filter(|action| action.requires_target())
            .collect();
        assert_eq!(targeted, vec![Action::Coup, Action::Blackmailer]);
    }

    #[test]
    fn coin_gates_match_the_rules() {
        assert_eq!(Action::Coup.min_coins(), 7);
        assert_eq!(Action::Blackmailer.min_coins(), 3);
        assert_eq!(Action::Pope.min_coins(), 0);
    }

    #[test]
    fn counter_table_lists_every_counterable_action_once() {
        let table = counter_table();
        assert_eq!(table.len(), 4);
        assert!(table.iter().all(|(action, roles)| action.counter_roles() == roles.as_slice()));
    }
}
