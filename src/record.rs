use std::io;
use serde::Serialize;
use crate::claim::ActionResolution;
use crate::Action;

// One settled action per row, flat enough to dump straight into a
// spreadsheet for batch-simulation analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub turn: usize,
    pub seat: usize,
    pub action: Action,
    pub target: Option<usize>,
    pub claims: usize,
    pub challenges: usize,
    pub succeeded: bool,
}

impl TurnRecord {
    pub(crate) fn from_resolution(turn: usize, resolution: &ActionResolution) -> Self {
        Self {
            turn,
            seat: resolution.actor,
            action: resolution.action,
            target: resolution.target,
            claims: resolution.claims.len(),
            challenges: resolution.claims.iter().filter(|claim| claim.challenger.is_some()).count(),
            succeeded: resolution.outcome,
        }
    }
}

pub fn write_csv<W: io::Write>(records: &[TurnRecord], writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::claim::RoleClaim;
    use crate::Role;
    use super::*;

    fn sample() -> TurnRecord {
        let mut resolution = ActionResolution::new(Action::Blackmailer, 0, Some(2));
        resolution.claims.push(RoleClaim::initial(0, Role::Blackmailer, Some(2)));
        resolution.claims.push(RoleClaim::counter(2, Role::Undertaker));
        resolution.claims[1].challenger = Some(3);
        resolution.outcome = true;
        TurnRecord::from_resolution(4, &resolution)
    }

    #[test]
    fn record_counts_claims_and_challenges() {
        let record = sample();
        assert_eq!(record.turn, 4);
        assert_eq!(record.claims, 2);
        assert_eq!(record.challenges, 1);
        assert!(record.succeeded);
    }

    #[test]
    fn csv_export_writes_a_header_and_one_row_per_turn() {
        let records = vec![sample(), sample()];
        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("turn,seat,action"));
        assert!(lines[1].contains("Blackmailer"));
    }
}
