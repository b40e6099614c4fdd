use huddle_core::RoomCode;
use huddle_server::Outcome;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::TestPeer;

const CEILING: usize = 4;
const CONTENDERS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_respect_ceiling() {
    init_tracing();

    let relay = create_test_relay(Some(CEILING));

    let tasks: Vec<_> = (0..CONTENDERS)
        .map(|_| {
            let relay = relay.clone();
            tokio::spawn(async move {
                let mut peer = TestPeer::new(&relay);
                let outcome = peer.join(&relay, "crowded").await;
                (peer, outcome)
            })
        })
        .collect();

    let mut admitted = Vec::new();
    let mut refused = 0;
    for task in tasks {
        let (mut peer, outcome) = task.await.expect("join task panicked");
        match outcome {
            Outcome::Joined { participants, .. } => {
                assert!(participants.len() < CEILING);
                admitted.push(peer);
            }
            Outcome::RoomFull { capacity, .. } => {
                assert_eq!(capacity, CEILING);
                let reply = peer.expect("room-full");
                assert_eq!(reply["roomId"], "crowded");
                assert_eq!(reply["capacity"], CEILING);
                refused += 1;
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(admitted.len(), CEILING);
    assert_eq!(refused, CONTENDERS - CEILING);

    let room = RoomCode::parse("crowded").unwrap();
    assert_eq!(relay.registry().member_count(&room), CEILING);

    // Every admitted peer heard exactly about the others
    for peer in &mut admitted {
        let events = peer.drain();
        let joined = events.iter().filter(|e| e["type"] == "joined").count();
        let peer_joined = events.iter().filter(|e| e["type"] == "peer-joined").count();
        let participants = events
            .iter()
            .find(|e| e["type"] == "joined")
            .and_then(|e| e["participants"].as_array())
            .map_or(0, Vec::len);
        assert_eq!(joined, 1);
        assert_eq!(participants + peer_joined, CEILING - 1);
    }

    // A seat frees up once someone leaves
    let mut late = TestPeer::new(&relay);
    admitted[0].leave(&relay, "crowded").await;
    assert!(matches!(
        late.join(&relay, "crowded").await,
        Outcome::Joined { .. }
    ));
}
