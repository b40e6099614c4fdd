use huddle_core::RoomCode;
use huddle_server::Outcome;
use serde_json::json;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_switch_into_full_room() {
    init_tracing();

    let relay = create_test_relay(Some(2));
    let home = RoomCode::parse("home").unwrap();
    let packed = RoomCode::parse("packed").unwrap();

    let mut a = TestPeer::new(&relay);
    let mut b = TestPeer::new(&relay);
    let mut c = TestPeer::new(&relay);
    let mut d = TestPeer::new(&relay);

    a.join(&relay, "home").await;
    b.join(&relay, "home").await;
    c.join(&relay, "packed").await;
    d.join(&relay, "packed").await;
    for peer in [&mut a, &mut b, &mut c, &mut d] {
        peer.drain();
    }

    // A tries to move into a full room and is turned away
    let outcome = a.join(&relay, "packed").await;
    assert_eq!(
        outcome,
        Outcome::RoomFull {
            room: packed.clone(),
            capacity: 2
        }
    );
    assert_eq!(
        a.expect("room-full"),
        json!({ "type": "room-full", "roomId": "packed", "capacity": 2 })
    );

    // Its current call is untouched
    assert_eq!(a.session.room(), Some(&home));
    assert_eq!(relay.registry().members(&home), vec![a.id(), b.id()]);
    assert_eq!(relay.registry().member_count(&packed), 2);
    b.assert_silent();
    c.assert_silent();
    d.assert_silent();

    // And still relays to its room-mate
    let outcome = a
        .send(
            &relay,
            json!({ "type": "reaction", "targetId": b.id_str(), "emoji": "🙃" }),
        )
        .await;
    assert!(matches!(outcome, Outcome::Forwarded { .. }));
    assert_eq!(b.expect("reaction")["senderId"], a.id_str());

    // Once a seat frees up, the switch goes through and home hears the departure
    d.leave(&relay, "packed").await;
    c.drain();
    assert!(matches!(
        a.join(&relay, "packed").await,
        Outcome::Joined { .. }
    ));
    assert_eq!(a.expect("joined")["participants"], json!([c.id_str()]));
    assert_eq!(b.expect("peer-left")["clientId"], a.id_str());
    assert_eq!(c.expect("peer-joined")["clientId"], a.id_str());
    assert_eq!(relay.registry().members(&home), vec![b.id()]);
}
