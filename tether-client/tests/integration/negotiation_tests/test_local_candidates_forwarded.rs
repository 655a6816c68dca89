use tether_client::TransportEvent;
use tether_core::{IceCandidateRecord, OutboundSignal};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{MockEngine, SIGNAL_TIMEOUT_MS, wait_for_signal};

#[tokio::test]
async fn test_local_candidates_forwarded() {
    init_tracing();

    let mut session = create_test_session(true, MockEngine::new());

    let host = IceCandidateRecord::parse("candidate:1 1 udp 2122260223 192.168.1.4 50000 typ host")
        .expect("valid candidate")
        .with_sdp_mid(Some("0".to_owned()))
        .with_sdp_m_line_index(Some(0));
    let srflx = IceCandidateRecord::parse(
        "candidate:2 1 udp 1686052607 203.0.113.9 50001 typ srflx raddr 192.168.1.4 rport 50000",
    )
    .expect("valid candidate");

    for candidate in [Some(host.clone()), None, Some(srflx.clone())] {
        session
            .transport
            .send(TransportEvent::LocalCandidate(candidate))
            .await
            .expect("Failed to send local candidate");
    }

    let mut forwarded = Vec::new();
    for _ in 0..2 {
        let candidate = wait_for_signal(&mut session.signal_rx, SIGNAL_TIMEOUT_MS, |signal| {
            match signal {
                OutboundSignal::Candidate { candidate, .. } => Some(candidate),
                _ => None,
            }
        })
        .await
        .expect("Candidate not forwarded");
        forwarded.push(candidate);
    }

    // The end-of-gathering marker is never sent on.
    assert_eq!(forwarded, vec![host, srflx]);
    assert!(session.signal_rx.try_recv().is_err());

    session.finish().await;
}
