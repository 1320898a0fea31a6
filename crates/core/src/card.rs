//! Cards (photo posts) and their expanded representation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::id::{CardId, UserId};
use crate::messages;
use crate::schema::{self, FieldChecks};
use crate::user::UserSummary;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 30;

/// Stored card.
///
/// # Invariants
/// - `owner` and `created_at` never change after creation.
/// - `likes` holds each user at most once; order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: CardId,
    pub name: String,
    pub link: String,
    pub owner: UserId,
    pub likes: Vec<UserId>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn create(id: CardId, new_card: NewCard, created_at: DateTime<Utc>) -> Result<Card, SchemaError> {
        let card = Card {
            id,
            name: new_card.name,
            link: new_card.link,
            owner: new_card.owner,
            likes: Vec::new(),
            created_at,
        };
        card.validate()?;
        Ok(card)
    }

    /// Model-level schema, enforced by every store on insert.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut checks = FieldChecks::new();
        checks
            .field("name", Some(self.name.as_str()))
            .required(messages::required("name"))
            .min_chars(NAME_MIN, messages::min_length("name", NAME_MIN))
            .max_chars(NAME_MAX, messages::max_length("name", NAME_MAX))
            .matches(
                &schema::CARD_NAME,
                "Поле \"name\" может содержать только буквы, цифры, пробелы и дефисы",
            );
        checks
            .field("link", Some(self.link.as_str()))
            .required(messages::required("link"))
            .check(schema::is_url, messages::INVALID_IMAGE_URL);
        checks.finish()
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Set-add. Returns `false` when `user` already liked the card.
    pub fn add_like(&mut self, user: UserId) -> bool {
        if self.likes.contains(&user) {
            return false;
        }
        self.likes.push(user);
        true
    }

    /// Set-remove. Returns `false` when `user` had not liked the card.
    pub fn remove_like(&mut self, user: UserId) -> bool {
        let before = self.likes.len();
        self.likes.retain(|u| *u != user);
        self.likes.len() != before
    }

    /// Every user this card references (owner first, then likers).
    pub fn referenced_users(&self) -> impl Iterator<Item = UserId> + '_ {
        std::iter::once(self.owner).chain(self.likes.iter().copied())
    }
}

/// Card creation input; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub name: String,
    pub link: String,
    pub owner: UserId,
}

/// Card with owner and likers replaced by their profile summaries.
///
/// A reference to a user that no longer resolves renders as `null` (owner) or is
/// dropped (likes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    #[serde(rename = "_id")]
    pub id: CardId,
    pub name: String,
    pub link: String,
    pub owner: Option<UserSummary>,
    pub likes: Vec<UserSummary>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl CardView {
    pub fn expand(card: Card, users: &HashMap<UserId, UserSummary>) -> CardView {
        CardView {
            id: card.id,
            owner: users.get(&card.owner).cloned(),
            likes: card
                .likes
                .iter()
                .filter_map(|u| users.get(u).cloned())
                .collect(),
            name: card.name,
            link: card.link,
            created_at: card.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(owner: UserId) -> Card {
        Card::create(
            CardId::new(),
            NewCard {
                name: "Bridge".into(),
                link: "https://example.com/a.png".into(),
                owner,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn summary(id: UserId, name: &str) -> UserSummary {
        UserSummary {
            id,
            name: name.into(),
            about: "Исследователь".into(),
            avatar: "https://example.com/me.png".into(),
        }
    }

    #[test]
    fn new_card_starts_without_likes() {
        let owner = UserId::new();
        let card = bridge(owner);
        assert!(card.likes.is_empty());
        assert!(card.is_owned_by(owner));
        assert!(!card.is_owned_by(UserId::new()));
    }

    #[test]
    fn create_rejects_bad_name_and_link() {
        let err = Card::create(
            CardId::new(),
            NewCard {
                name: "!".into(),
                link: "example.com".into(),
                owner: UserId::new(),
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("link"));
        assert_eq!(err.messages()[1], messages::INVALID_IMAGE_URL);
    }

    #[test]
    fn likes_behave_as_a_set() {
        let mut card = bridge(UserId::new());
        let fan = UserId::new();

        assert!(card.add_like(fan));
        assert!(!card.add_like(fan));
        assert_eq!(card.likes, vec![fan]);

        assert!(card.remove_like(fan));
        assert!(!card.remove_like(fan));
        assert!(card.likes.is_empty());
    }

    #[test]
    fn expand_replaces_references_with_summaries() {
        let owner = UserId::new();
        let fan = UserId::new();
        let ghost = UserId::new();
        let mut card = bridge(owner);
        card.add_like(fan);
        card.add_like(ghost);

        let users = HashMap::from([
            (owner, summary(owner, "Owner")),
            (fan, summary(fan, "Fan")),
        ]);
        let view = CardView::expand(card, &users);

        assert_eq!(view.owner.as_ref().map(|o| o.name.as_str()), Some("Owner"));
        assert_eq!(view.likes.len(), 1);
        assert_eq!(view.likes[0].id, fan);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["owner"]["_id"], owner.to_string());
        assert!(json["owner"].get("email").is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: any sequence of like/dislike operations leaves no duplicates, and
            /// membership matches the last operation applied for each user.
            #[test]
            fn likes_never_hold_duplicates(ops in prop::collection::vec((0usize..4, any::<bool>()), 0..64)) {
                let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
                let mut card = bridge(UserId::new());
                let mut expected: HashMap<UserId, bool> = HashMap::new();

                for (idx, like) in ops {
                    let user = users[idx];
                    if like {
                        card.add_like(user);
                    } else {
                        card.remove_like(user);
                    }
                    expected.insert(user, like);
                }

                let mut seen = std::collections::HashSet::new();
                for u in &card.likes {
                    prop_assert!(seen.insert(*u));
                }
                for (user, liked) in expected {
                    prop_assert_eq!(card.likes.contains(&user), liked);
                }
            }
        }
    }
}
