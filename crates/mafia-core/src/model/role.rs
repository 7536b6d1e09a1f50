use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Villager,
    Mafia,
    Doctor,
    Detective,
}

impl Role {
    /// Doctor and detective count as villagers for win-condition purposes.
    pub const fn faction(self) -> Faction {
        match self {
            Role::Mafia => Faction::Mafia,
            Role::Villager | Role::Doctor | Role::Detective => Faction::Villager,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Villager => "villager",
            Role::Mafia => "mafia",
            Role::Doctor => "doctor",
            Role::Detective => "detective",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Mafia,
    Villager,
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Faction::Mafia => "mafia",
            Faction::Villager => "villager",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::{Faction, Role};

    #[test]
    fn special_roles_side_with_the_village() {
        assert_eq!(Role::Doctor.faction(), Faction::Villager);
        assert_eq!(Role::Detective.faction(), Faction::Villager);
        assert_eq!(Role::Villager.faction(), Faction::Villager);
        assert_eq!(Role::Mafia.faction(), Faction::Mafia);
    }

    #[test]
    fn roles_render_lowercase() {
        assert_eq!(Role::Detective.to_string(), "detective");
        assert_eq!(Faction::Mafia.to_string(), "mafia");
    }
}
