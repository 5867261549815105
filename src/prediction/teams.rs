use serde::Serialize;

/// Number of franchises in the league. Team ids accepted by the prediction
/// service run from 1 to `TEAM_COUNT` inclusive.
pub const TEAM_COUNT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Team {
    /// Catalog id in [1, TEAM_COUNT], as used in prediction requests
    pub id: u32,
    /// League stats-API franchise id
    pub league_id: u32,
    pub abbreviation: &'static str,
    pub name: &'static str,
}

const fn team(id: u32, league_id: u32, abbreviation: &'static str, name: &'static str) -> Team {
    Team {
        id,
        league_id,
        abbreviation,
        name,
    }
}

/// Alphabetical by franchise name; `id` is the 1-based position.
static TEAMS: [Team; TEAM_COUNT as usize] = [
    team(1, 1610612737, "ATL", "Atlanta Hawks"),
    team(2, 1610612738, "BOS", "Boston Celtics"),
    team(3, 1610612751, "BKN", "Brooklyn Nets"),
    team(4, 1610612766, "CHA", "Charlotte Hornets"),
    team(5, 1610612741, "CHI", "Chicago Bulls"),
    team(6, 1610612739, "CLE", "Cleveland Cavaliers"),
    team(7, 1610612742, "DAL", "Dallas Mavericks"),
    team(8, 1610612743, "DEN", "Denver Nuggets"),
    team(9, 1610612765, "DET", "Detroit Pistons"),
    team(10, 1610612744, "GSW", "Golden State Warriors"),
    team(11, 1610612745, "HOU", "Houston Rockets"),
    team(12, 1610612754, "IND", "Indiana Pacers"),
    team(13, 1610612746, "LAC", "LA Clippers"),
    team(14, 1610612747, "LAL", "Los Angeles Lakers"),
    team(15, 1610612763, "MEM", "Memphis Grizzlies"),
    team(16, 1610612748, "MIA", "Miami Heat"),
    team(17, 1610612749, "MIL", "Milwaukee Bucks"),
    team(18, 1610612750, "MIN", "Minnesota Timberwolves"),
    team(19, 1610612740, "NOP", "New Orleans Pelicans"),
    team(20, 1610612752, "NYK", "New York Knicks"),
    team(21, 1610612760, "OKC", "Oklahoma City Thunder"),
    team(22, 1610612753, "ORL", "Orlando Magic"),
    team(23, 1610612755, "PHI", "Philadelphia 76ers"),
    team(24, 1610612756, "PHX", "Phoenix Suns"),
    team(25, 1610612757, "POR", "Portland Trail Blazers"),
    team(26, 1610612758, "SAC", "Sacramento Kings"),
    team(27, 1610612759, "SAS", "San Antonio Spurs"),
    team(28, 1610612761, "TOR", "Toronto Raptors"),
    team(29, 1610612762, "UTA", "Utah Jazz"),
    team(30, 1610612764, "WAS", "Washington Wizards"),
];

pub fn all_teams() -> &'static [Team] {
    &TEAMS
}

pub fn team_by_id(id: u32) -> Option<&'static Team> {
    if id == 0 {
        return None;
    }
    TEAMS.get((id - 1) as usize)
}

/// Case-insensitive lookup by abbreviation ("bos", "LAL").
pub fn team_by_abbreviation(abbreviation: &str) -> Option<&'static Team> {
    TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(abbreviation.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_positions() {
        for (i, t) in all_teams().iter().enumerate() {
            assert_eq!(t.id as usize, i + 1);
        }
    }

    #[test]
    fn test_catalog_entries_unique() {
        let abbrs: HashSet<_> = all_teams().iter().map(|t| t.abbreviation).collect();
        let league_ids: HashSet<_> = all_teams().iter().map(|t| t.league_id).collect();
        assert_eq!(abbrs.len(), TEAM_COUNT as usize);
        assert_eq!(league_ids.len(), TEAM_COUNT as usize);
    }

    #[test]
    fn test_lookup_bounds() {
        assert!(team_by_id(0).is_none());
        assert_eq!(team_by_id(1).map(|t| t.abbreviation), Some("ATL"));
        assert_eq!(team_by_id(30).map(|t| t.abbreviation), Some("WAS"));
        assert!(team_by_id(31).is_none());
    }

    #[test]
    fn test_lookup_by_abbreviation() {
        assert_eq!(team_by_abbreviation("lal").map(|t| t.id), Some(14));
        assert_eq!(team_by_abbreviation(" BOS ").map(|t| t.id), Some(2));
        assert!(team_by_abbreviation("XYZ").is_none());
    }
}
