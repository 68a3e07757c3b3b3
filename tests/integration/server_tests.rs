//! BridgeServer lifecycle scenarios against mock adapters.

use crate::mock_hw::*;

use sliderbridge::app::events::BridgeEvent;
use sliderbridge::app::guardian::MemoryGuardian;
use sliderbridge::app::sampler::Sampler;
use sliderbridge::app::server::{BridgeServer, ServerState};
use sliderbridge::error::{ConnectionError, ServeError};

type TestServer = BridgeServer<MockListener, ScriptedReader, FakeHeap, TraceDelay, RecordingSink>;

const TICK_MS: u32 = 10;
const LOW_WATER: u32 = 102_000;

fn server(listener: MockListener, reader: ScriptedReader, heap: FakeHeap, trace: &Trace) -> TestServer {
    BridgeServer::new(
        listener,
        Sampler::new(reader, 3),
        MemoryGuardian::new(LOW_WATER),
        heap,
        TraceDelay::new(trace),
        RecordingSink::default(),
        TICK_MS,
    )
}

fn roomy_heap() -> FakeHeap {
    FakeHeap::new(150_000)
}

// ── Change detection over the wire ────────────────────────────

#[test]
fn first_sample_is_pushed_before_the_first_tick() {
    let trace = new_trace();
    let listener = MockListener::new().with_client(MockConnection::new(1, &trace, 3), peer(50_000));
    let mut srv = server(listener, ScriptedReader::constant(&[512, 0, 1023]), roomy_heap(), &trace);

    let err = srv.run_once();

    assert_eq!(
        err,
        ServeError::Connection(ConnectionError::Liveness(std::io::ErrorKind::ConnectionReset))
    );
    assert_eq!(
        *trace.borrow(),
        vec![
            Op::Probe(1),
            Op::Send(1, "512|0|1023\r\n".into()),
            Op::DelayMs(TICK_MS),
            Op::Probe(1),
            Op::DelayMs(TICK_MS),
            Op::Probe(1),
            Op::DelayMs(TICK_MS),
            Op::Probe(1),
            Op::Close(1),
        ]
    );
    assert_eq!(srv.stats().frames_sent, 1);
    assert_eq!(srv.stats().connections, 1);
}

#[test]
fn unchanged_values_send_nothing() {
    let trace = new_trace();
    let listener = MockListener::new().with_client(MockConnection::new(1, &trace, 5), peer(50_000));
    let mut srv = server(listener, ScriptedReader::constant(&[0, 0, 0]), roomy_heap(), &trace);

    srv.run_once();

    assert!(frames_for(&trace, 1).is_empty());
    assert_eq!(delay_count(&trace), 5);
    assert_eq!(srv.stats().frames_sent, 0);
}

#[test]
fn only_changed_steps_are_pushed_in_order() {
    let trace = new_trace();
    let listener = MockListener::new().with_client(MockConnection::new(1, &trace, 5), peer(50_000));
    let reader = ScriptedReader::new(&[
        &[1, 2, 3],
        &[1, 2, 3],
        &[1, 5, 3],
        &[1, 5, 3],
        &[0, 5, 3],
    ]);
    let mut srv = server(listener, reader, roomy_heap(), &trace);

    srv.run_once();

    assert_eq!(frames_for(&trace, 1), vec!["1|2|3\r\n", "1|5|3\r\n", "0|5|3\r\n"]);
    let stored: Vec<u16> = srv.sampler().channels().iter().map(|c| c.last_value).collect();
    assert_eq!(stored, vec![0, 5, 3]);
}

// ── Recovery ──────────────────────────────────────────────────

#[test]
fn send_failure_returns_to_listening_and_next_client_is_served() {
    let trace = new_trace();
    let listener = MockListener::new()
        .with_client(MockConnection::new(1, &trace, 10).failing_send_after(0), peer(50_001))
        .with_client(MockConnection::new(2, &trace, 2), peer(50_002));
    let reader = ScriptedReader::new(&[&[7, 7, 7], &[8, 8, 8]]);
    let mut srv = server(listener, reader, roomy_heap(), &trace);

    let first = srv.run_once();
    assert_eq!(
        first,
        ServeError::Connection(ConnectionError::Send(std::io::ErrorKind::BrokenPipe))
    );
    assert_eq!(srv.state(), ServerState::Listening);
    assert!(trace.borrow().contains(&Op::Close(1)));

    srv.run_once();
    assert_eq!(frames_for(&trace, 2), vec!["8|8|8\r\n"]);
    assert_eq!(srv.stats().connections, 2);
    assert!(trace.borrow().contains(&Op::Close(2)));
}

#[test]
fn stored_values_carry_over_to_the_next_client() {
    let trace = new_trace();
    let listener = MockListener::new()
        .with_client(MockConnection::new(1, &trace, 1), peer(50_001))
        .with_client(MockConnection::new(2, &trace, 2), peer(50_002));
    let mut srv = server(listener, ScriptedReader::constant(&[4, 4, 4]), roomy_heap(), &trace);

    srv.run_once();
    srv.run_once();

    assert_eq!(frames_for(&trace, 1), vec!["4|4|4\r\n"]);
    assert!(frames_for(&trace, 2).is_empty());
}

#[test]
fn accept_error_is_logged_and_loop_continues() {
    let trace = new_trace();
    let listener = MockListener::new()
        .with_error(ConnectionError::Accept(std::io::ErrorKind::ConnectionAborted))
        .with_client(MockConnection::new(1, &trace, 1), peer(50_000));
    let mut srv = server(listener, ScriptedReader::constant(&[9, 9, 9]), roomy_heap(), &trace);

    let err = srv.run_once();
    assert_eq!(
        err,
        ServeError::Connection(ConnectionError::Accept(std::io::ErrorKind::ConnectionAborted))
    );
    assert_eq!(srv.state(), ServerState::Listening);
    assert!(trace.borrow().is_empty());
    assert_eq!(
        srv.sink().events.last(),
        Some(&BridgeEvent::ServeEnded { error: err, closed: false })
    );

    srv.run_once();
    assert_eq!(frames_for(&trace, 1), vec!["9|9|9\r\n"]);
}

#[test]
fn panic_inside_a_cycle_becomes_a_fault() {
    let trace = new_trace();
    let listener = MockListener::new()
        .with_client(MockConnection::new(1, &trace, 10), peer(50_001))
        .with_client(MockConnection::new(2, &trace, 1), peer(50_002));
    let reader = ScriptedReader::constant(&[1, 1, 1]).panicking_at(1);
    let mut srv = server(listener, reader, roomy_heap(), &trace);

    let err = srv.run_once();
    match &err {
        ServeError::Fault(msg) => assert!(msg.contains("adc read fault"), "got {msg}"),
        other => panic!("expected fault, got {other:?}"),
    }
    assert_eq!(srv.state(), ServerState::Listening);
    assert_eq!(srv.stats().faults, 1);
    assert!(trace.borrow().contains(&Op::Close(1)));
    assert_eq!(frames_for(&trace, 1), vec!["1|1|1\r\n"]);

    let err = srv.run_once();
    assert!(err.is_connection());
    assert_eq!(srv.stats().connections, 2);
}

// ── Memory guardian ───────────────────────────────────────────

#[test]
fn low_heap_is_reclaimed_before_accept() {
    let trace = new_trace();
    let listener = MockListener::new().with_client(MockConnection::new(1, &trace, 0), peer(50_000));
    let mut srv = server(listener, ScriptedReader::constant(&[0, 0, 0]), FakeHeap::new(90_000), &trace);

    srv.run_once();

    assert_eq!(srv.memory().reclaims, 1);
    let events = &srv.sink().events;
    assert_eq!(
        events[0],
        BridgeEvent::Reclaimed {
            free_before: 90_000,
            free_after: 180_000,
        }
    );
    assert_eq!(events[1], BridgeEvent::ClientConnected(peer(50_000)));
}

#[test]
fn reclaim_is_skipped_at_or_above_the_mark() {
    for free in [LOW_WATER, 150_000] {
        let trace = new_trace();
        let listener = MockListener::new().with_client(MockConnection::new(1, &trace, 0), peer(50_000));
        let mut srv = server(listener, ScriptedReader::constant(&[0, 0, 0]), FakeHeap::new(free), &trace);

        srv.run_once();

        assert_eq!(srv.memory().reclaims, 0, "free={free}");
        assert!(
            !srv
                .sink()
                .events
                .iter()
                .any(|e| matches!(e, BridgeEvent::Reclaimed { .. }))
        );
    }
}

#[test]
fn guardian_runs_even_when_accept_fails() {
    let trace = new_trace();
    let listener = MockListener::new().with_error(ConnectionError::Accept(std::io::ErrorKind::Other));
    let mut srv = server(listener, ScriptedReader::constant(&[0, 0, 0]), FakeHeap::new(50_000), &trace);

    srv.run_once();

    assert_eq!(srv.memory().reclaims, 1);
}
