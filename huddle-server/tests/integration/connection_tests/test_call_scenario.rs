use huddle_core::RoomCode;
use huddle_server::Outcome;
use serde_json::json;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_call_scenario() {
    init_tracing();

    let relay = create_test_relay(None);
    let room = RoomCode::parse("ABC123").unwrap();

    let mut a = TestPeer::new(&relay);
    let mut b = TestPeer::new(&relay);

    // A creates the room
    a.join(&relay, "ABC123").await;
    let joined = a.expect("joined");
    assert_eq!(joined["roomId"], "ABC123");
    assert_eq!(joined["clientId"], a.id_str());
    assert_eq!(joined["participants"], json!([]));

    // B joins and learns about A; A hears about B
    b.join(&relay, "ABC123").await;
    let joined = b.expect("joined");
    assert_eq!(joined["clientId"], b.id_str());
    assert_eq!(joined["participants"], json!([a.id_str()]));
    assert_eq!(a.expect("peer-joined")["clientId"], b.id_str());
    b.assert_silent();

    // B offers to A
    let outcome = b
        .send(
            &relay,
            json!({ "type": "offer", "targetId": a.id_str(), "sdp": "v=0 offer" }),
        )
        .await;
    assert!(matches!(outcome, Outcome::Forwarded { .. }));
    let offer = a.expect("offer");
    assert_eq!(offer["senderId"], b.id_str());
    assert_eq!(offer["sdp"], "v=0 offer");

    // A's transport drops
    a.disconnect(&relay);
    assert_eq!(b.expect("peer-left")["clientId"], a.id_str());
    assert_eq!(relay.registry().members(&room), vec![b.id()]);

    // B leaves, the room disappears
    assert_eq!(
        b.leave(&relay, "ABC123").await,
        Outcome::Left { room: room.clone() }
    );
    assert!(!relay.registry().contains(&room));
    assert_eq!(relay.registry().room_count(), 0);

    // A second leave and a late close are no-ops
    assert!(matches!(b.leave(&relay, "ABC123").await, Outcome::Dropped(_)));
    b.disconnect(&relay);
    a.assert_silent();
    b.assert_silent();
}
