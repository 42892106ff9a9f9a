use serde::{Deserialize, Serialize};

use crate::constants::YOU_ALIAS;
use crate::resource::{ResourceKind, ResourceList, StructureKind};

/// Player token as written in a log line, before alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRef {
    /// The viewing player's "you"/"You" alias.
    You,
    Named(String),
}

impl PlayerRef {
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case(YOU_ALIAS) {
            Self::You
        } else {
            Self::Named(token.to_string())
        }
    }

    #[must_use]
    pub const fn is_you(&self) -> bool {
        matches!(self, Self::You)
    }
}

/// Operation family, used for dispatch order, reporting and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationFamily {
    StartingResources,
    Monopoly,
    BankTrade,
    YearOfPlenty,
    Build,
    BuyDevelopmentCard,
    Discard,
    Produce,
    PlayerTrade,
    KnownSteal,
    UnknownSteal,
}

impl OperationFamily {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StartingResources => "starting resources",
            Self::Monopoly => "monopoly",
            Self::BankTrade => "bank trade",
            Self::YearOfPlenty => "year of plenty",
            Self::Build => "build",
            Self::BuyDevelopmentCard => "development card",
            Self::Discard => "discard",
            Self::Produce => "dice gain",
            Self::PlayerTrade => "player trade",
            Self::KnownSteal => "known steal",
            Self::UnknownSteal => "unknown steal",
        }
    }
}

/// Typed ledger operation extracted from one log record.
///
/// `P` is the player representation: [`PlayerRef`] straight out of the
/// classifier, `String` once aliases have been resolved against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation<P = PlayerRef> {
    StartingResources {
        player: P,
        resources: ResourceList,
    },
    Produce {
        player: P,
        resources: ResourceList,
    },
    Build {
        player: P,
        structure: StructureKind,
    },
    BuyDevelopmentCard {
        player: P,
    },
    YearOfPlenty {
        player: P,
        resources: ResourceList,
    },
    BankTrade {
        player: P,
        gave: ResourceList,
        took: ResourceList,
    },
    Monopoly {
        player: P,
        resource: ResourceKind,
        /// Count the log line announced; the ledger computes its own.
        announced: u32,
    },
    Discard {
        player: P,
        resources: ResourceList,
    },
    PlayerTrade {
        initiator: P,
        counterpart: P,
        offered: ResourceList,
        requested: ResourceList,
    },
    KnownSteal {
        thief: P,
        victim: P,
        resource: ResourceKind,
    },
    /// Steal whose resource kind is hidden. `visible` holds any resource the
    /// record happened to show anyway.
    UnknownSteal {
        thief: P,
        victim: P,
        visible: ResourceList,
    },
}

impl<P> Operation<P> {
    #[must_use]
    pub const fn family(&self) -> OperationFamily {
        match self {
            Self::StartingResources { .. } => OperationFamily::StartingResources,
            Self::Produce { .. } => OperationFamily::Produce,
            Self::Build { .. } => OperationFamily::Build,
            Self::BuyDevelopmentCard { .. } => OperationFamily::BuyDevelopmentCard,
            Self::YearOfPlenty { .. } => OperationFamily::YearOfPlenty,
            Self::BankTrade { .. } => OperationFamily::BankTrade,
            Self::Monopoly { .. } => OperationFamily::Monopoly,
            Self::Discard { .. } => OperationFamily::Discard,
            Self::PlayerTrade { .. } => OperationFamily::PlayerTrade,
            Self::KnownSteal { .. } => OperationFamily::KnownSteal,
            Self::UnknownSteal { .. } => OperationFamily::UnknownSteal,
        }
    }

    /// Players named by the operation, acting player first.
    pub fn players(&self) -> Vec<&P> {
        match self {
            Self::StartingResources { player, .. }
            | Self::Produce { player, .. }
            | Self::Build { player, .. }
            | Self::BuyDevelopmentCard { player }
            | Self::YearOfPlenty { player, .. }
            | Self::BankTrade { player, .. }
            | Self::Monopoly { player, .. }
            | Self::Discard { player, .. } => vec![player],
            Self::PlayerTrade {
                initiator,
                counterpart,
                ..
            } => vec![initiator, counterpart],
            Self::KnownSteal { thief, victim, .. } | Self::UnknownSteal { thief, victim, .. } => {
                vec![thief, victim]
            }
        }
    }

    /// Convert every player slot, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `resolve`.
    pub fn try_map_players<Q, E>(
        self,
        mut resolve: impl FnMut(P) -> Result<Q, E>,
    ) -> Result<Operation<Q>, E> {
        Ok(match self {
            Self::StartingResources { player, resources } => Operation::StartingResources {
                player: resolve(player)?,
                resources,
            },
            Self::Produce { player, resources } => Operation::Produce {
                player: resolve(player)?,
                resources,
            },
            Self::Build { player, structure } => Operation::Build {
                player: resolve(player)?,
                structure,
            },
            Self::BuyDevelopmentCard { player } => Operation::BuyDevelopmentCard {
                player: resolve(player)?,
            },
            Self::YearOfPlenty { player, resources } => Operation::YearOfPlenty {
                player: resolve(player)?,
                resources,
            },
            Self::BankTrade { player, gave, took } => Operation::BankTrade {
                player: resolve(player)?,
                gave,
                took,
            },
            Self::Monopoly {
                player,
                resource,
                announced,
            } => Operation::Monopoly {
                player: resolve(player)?,
                resource,
                announced,
            },
            Self::Discard { player, resources } => Operation::Discard {
                player: resolve(player)?,
                resources,
            },
            Self::PlayerTrade {
                initiator,
                counterpart,
                offered,
                requested,
            } => Operation::PlayerTrade {
                initiator: resolve(initiator)?,
                counterpart: resolve(counterpart)?,
                offered,
                requested,
            },
            Self::KnownSteal {
                thief,
                victim,
                resource,
            } => Operation::KnownSteal {
                thief: resolve(thief)?,
                victim: resolve(victim)?,
                resource,
            },
            Self::UnknownSteal {
                thief,
                victim,
                visible,
            } => Operation::UnknownSteal {
                thief: resolve(thief)?,
                victim: resolve(victim)?,
                visible,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn you_alias_is_case_insensitive() {
        assert_eq!(PlayerRef::parse(" You "), PlayerRef::You);
        assert_eq!(PlayerRef::parse("you"), PlayerRef::You);
        assert_eq!(
            PlayerRef::parse("Youssef"),
            PlayerRef::Named(String::from("Youssef"))
        );
    }

    #[test]
    fn mapping_players_preserves_payload() {
        let op = Operation::PlayerTrade {
            initiator: PlayerRef::You,
            counterpart: PlayerRef::Named(String::from("Bob")),
            offered: smallvec![ResourceKind::Ore],
            requested: smallvec![ResourceKind::Wood, ResourceKind::Wood],
        };
        let resolved: Operation<String> = op
            .try_map_players(|player| match player {
                PlayerRef::You => Ok::<_, ()>(String::from("Alice")),
                PlayerRef::Named(name) => Ok(name),
            })
            .unwrap();
        assert_eq!(resolved.family(), OperationFamily::PlayerTrade);
        assert_eq!(resolved.players(), vec!["Alice", "Bob"]);
        let Operation::PlayerTrade { requested, .. } = resolved else {
            panic!("family changed during mapping");
        };
        assert_eq!(requested.len(), 2);
    }

    #[test]
    fn mapping_stops_at_first_unknown_player() {
        let op = Operation::KnownSteal {
            thief: PlayerRef::Named(String::from("Ghost")),
            victim: PlayerRef::You,
            resource: ResourceKind::Brick,
        };
        let err = op
            .try_map_players(|player| match player {
                PlayerRef::Named(name) => Err(name),
                PlayerRef::You => Ok(String::from("Alice")),
            })
            .unwrap_err();
        assert_eq!(err, "Ghost");
    }
}
