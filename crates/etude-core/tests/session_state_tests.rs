use etude_core::{SessionPhase, SessionState, StopReason};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn starts_running_with_no_chunks() {
    let state = SessionState::new();
    assert_eq!(state.phase(), SessionPhase::Running);
    assert_eq!(state.chunks_played(), 0);
    assert_eq!(state.stop_reason(), None);
}

#[test]
fn toggle_alternates_between_running_and_paused() {
    let state = SessionState::new();
    assert_eq!(state.toggle_pause(), SessionPhase::Paused);
    assert_eq!(state.toggle_pause(), SessionPhase::Running);
}

#[test]
fn elapsed_does_not_advance_while_paused() {
    let state = SessionState::new();
    thread::sleep(Duration::from_millis(5));
    state.toggle_pause();

    let before = state.elapsed();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(state.elapsed(), before);

    state.toggle_pause();
    thread::sleep(Duration::from_millis(10));
    assert!(state.elapsed() > before);
    assert!(state.elapsed() < before + Duration::from_millis(30));
}

#[test]
fn stop_is_terminal_and_first_reason_wins() {
    let state = SessionState::new();
    state.request_stop(StopReason::BudgetReached);
    state.request_stop(StopReason::Quit);

    assert!(state.is_stopped());
    assert_eq!(state.stop_reason(), Some(StopReason::BudgetReached));
    assert_eq!(state.toggle_pause(), SessionPhase::Stopped);
}

#[test]
fn elapsed_freezes_once_stopped() {
    let state = SessionState::new();
    state.request_stop(StopReason::Quit);
    let frozen = state.elapsed();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(state.elapsed(), frozen);
}

#[test]
fn stop_wakes_a_paused_waiter() {
    let state = Arc::new(SessionState::new());
    state.toggle_pause();

    let waiter = {
        let state = state.clone();
        thread::spawn(move || state.wait_while_paused())
    };
    thread::sleep(Duration::from_millis(20));
    state.request_stop(StopReason::Quit);

    assert_eq!(waiter.join().unwrap(), SessionPhase::Stopped);
}

#[test]
fn wait_for_change_times_out_while_running() {
    let state = SessionState::new();
    assert_eq!(
        state.wait_for_change(Duration::from_millis(5)),
        SessionPhase::Running
    );
}

#[test]
fn record_chunk_counts_up() {
    let state = SessionState::new();
    assert_eq!(state.record_chunk(), 1);
    assert_eq!(state.record_chunk(), 2);
    assert_eq!(state.chunks_played(), 2);
}
