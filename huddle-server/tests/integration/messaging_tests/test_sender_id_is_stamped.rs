use serde_json::json;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_sender_id_is_stamped() {
    init_tracing();

    let relay = create_test_relay(None);
    let mut a = TestPeer::new(&relay);
    let mut b = TestPeer::new(&relay);
    let mut c = TestPeer::new(&relay);
    for peer in [&mut a, &mut b, &mut c] {
        peer.join(&relay, "stamp").await;
    }
    a.drain();
    b.drain();
    c.drain();

    // B pretends to be C
    b.send(
        &relay,
        json!({
            "type": "ice-candidate",
            "targetId": a.id_str(),
            "senderId": c.id_str(),
            "candidate": { "candidate": "" }
        }),
    )
    .await;

    let received = a.expect("ice-candidate");
    assert_eq!(received["senderId"], b.id_str());
    assert_eq!(received["targetId"], a.id_str());

    // Targeted only: C sees nothing
    c.assert_silent();
    b.assert_silent();
}
