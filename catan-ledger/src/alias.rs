//! Resolution of the host's "you" token to a concrete player.

use serde::{Deserialize, Serialize};

use crate::PlayerContext;

/// Which path produced the current-player identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasPath {
    Cached,
    Context,
    SolePlayer,
    Fallback,
}

impl AliasPath {
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Cached => "stored username",
            Self::Context => "game context",
            Self::SolePlayer => "only player",
            Self::Fallback => "fallback",
        }
    }
}

/// Remembers who "you" is for the rest of the session.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    current: Option<String>,
    pending: Option<String>,
    /// Name set through [`AliasResolver::set_preferred`]; survives resets.
    preferred: Option<String>,
}

/// Result of [`AliasResolver::set_preferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasUpdate {
    Applied,
    Pending,
}

impl AliasResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Use `name` immediately when it is a known player, otherwise hold it
    /// until that player shows up.
    pub fn set_preferred(&mut self, name: &str, known_players: &[String]) -> AliasUpdate {
        let name = name.trim();
        self.preferred = Some(name.to_string());
        if known_players.iter().any(|player| player == name) {
            self.current = Some(name.to_string());
            self.pending = None;
            AliasUpdate::Applied
        } else {
            self.pending = Some(name.to_string());
            AliasUpdate::Pending
        }
    }

    /// Promote the pending name once it is among `known_players`.
    pub fn activate_pending(&mut self, known_players: &[String]) -> Option<&str> {
        let pending = self.pending.as_deref()?;
        if !known_players.iter().any(|player| player == pending) {
            return None;
        }
        self.current = self.pending.take();
        self.current.as_deref()
    }

    /// Resolve "you", caching the answer. `None` only with no known players.
    pub fn resolve<C: PlayerContext + ?Sized>(
        &mut self,
        known_players: &[String],
        context: &C,
    ) -> Option<(String, AliasPath)> {
        if let Some(current) = &self.current {
            return Some((current.clone(), AliasPath::Cached));
        }
        let (name, path) = if let Some(name) = context
            .current_player(known_players)
            .filter(|name| known_players.contains(name))
        {
            (name, AliasPath::Context)
        } else if let [only] = known_players {
            (only.clone(), AliasPath::SolePlayer)
        } else {
            (known_players.first()?.clone(), AliasPath::Fallback)
        };
        self.current = Some(name.clone());
        Some((name, path))
    }

    /// Forget the session identity; a preferred name goes back to pending.
    pub fn reset(&mut self) {
        self.current = None;
        self.pending.clone_from(&self.preferred);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoContext;

    struct Fixed(&'static str);

    impl PlayerContext for Fixed {
        fn current_player(&self, _known_players: &[String]) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn players(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolution_paths_in_priority_order() {
        let known = players(&["Alice", "Bob"]);

        let mut fallback = AliasResolver::new();
        assert_eq!(
            fallback.resolve(&known, &NoContext),
            Some((String::from("Alice"), AliasPath::Fallback))
        );
        assert_eq!(
            fallback.resolve(&known, &Fixed("Bob")),
            Some((String::from("Alice"), AliasPath::Cached))
        );

        let mut context = AliasResolver::new();
        assert_eq!(
            context.resolve(&known, &Fixed("Bob")),
            Some((String::from("Bob"), AliasPath::Context))
        );

        let mut sole = AliasResolver::new();
        assert_eq!(
            sole.resolve(&players(&["Carol"]), &Fixed("Nobody")),
            Some((String::from("Carol"), AliasPath::SolePlayer))
        );

        assert_eq!(AliasResolver::new().resolve(&[], &NoContext), None);
    }

    #[test]
    fn preferred_name_waits_until_seen() {
        let mut resolver = AliasResolver::new();
        assert_eq!(resolver.set_preferred("Dana", &players(&["Alice"])), AliasUpdate::Pending);
        assert_eq!(resolver.activate_pending(&players(&["Alice"])), None);
        assert_eq!(
            resolver.activate_pending(&players(&["Alice", "Dana"])),
            Some("Dana")
        );
        assert_eq!(resolver.pending(), None);
        assert_eq!(resolver.current(), Some("Dana"));

        resolver.reset();
        assert_eq!(resolver.current(), None);
        assert_eq!(resolver.pending(), Some("Dana"));
    }

    #[test]
    fn inferred_identity_is_not_kept_across_reset() {
        let mut resolver = AliasResolver::new();
        resolver.resolve(&players(&["Alice"]), &NoContext);
        resolver.reset();
        assert_eq!(resolver.current(), None);
        assert_eq!(resolver.pending(), None);
    }

    #[test]
    fn known_name_applies_at_once() {
        let mut resolver = AliasResolver::new();
        let known = players(&["Alice", "Bob"]);
        assert_eq!(resolver.set_preferred(" Bob ", &known), AliasUpdate::Applied);
        assert_eq!(
            resolver.resolve(&known, &NoContext),
            Some((String::from("Bob"), AliasPath::Cached))
        );
    }
}
