//! Proptest generators for property-based testing.

use proptest::prelude::*;

use swg_core::{Choice, Outcome, PlayerId, Side};
use swg_sync::PeerMessage;

/// Generate any choice.
pub fn choice() -> impl Strategy<Value = Choice> {
    prop_oneof![
        Just(Choice::Snake),
        Just(Choice::Water),
        Just(Choice::Gun),
    ]
}

/// Generate any outcome.
pub fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Win),
        Just(Outcome::Lose),
        Just(Outcome::Draw),
    ]
}

/// Generate either side.
pub fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Host), Just(Side::Guest)]
}

/// Generate a valid player id.
pub fn player_id() -> impl Strategy<Value = PlayerId> {
    (1000u16..=9999).prop_map(|raw| PlayerId::from_raw(raw).expect("in range"))
}

/// Generate a plausible nickname, empty included.
pub fn nickname() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,16}".prop_map(String::from)
}

/// Generate a sensible match length.
pub fn total_rounds() -> impl Strategy<Value = u32> {
    1u32..=10
}

/// Generate any peer message.
pub fn peer_message() -> impl Strategy<Value = PeerMessage> {
    prop_oneof![
        (nickname(), player_id(), proptest::option::of(total_rounds())).prop_map(
            |(name, id, total_rounds)| PeerMessage::Profile {
                name,
                id,
                total_rounds,
            }
        ),
        Just(PeerMessage::ScreenReady),
        Just(PeerMessage::StartRound),
        choice().prop_map(|choice| PeerMessage::Choice { choice }),
        Just(PeerMessage::Ready),
        Just(PeerMessage::PlayAgainReady),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use swg_core::resolve;

    proptest! {
        #[test]
        fn test_resolver_perspectives_complementary(a in choice(), b in choice()) {
            prop_assert_eq!(resolve(a, b), resolve(b, a).flip());
        }

        #[test]
        fn test_resolver_draw_iff_equal(a in choice(), b in choice()) {
            prop_assert_eq!(resolve(a, b) == Outcome::Draw, a == b);
        }

        #[test]
        fn test_any_message_survives_the_wire(message in peer_message()) {
            let frame = message.encode().unwrap();
            prop_assert_eq!(PeerMessage::decode(&frame).unwrap(), message);
        }
    }
}
