use std::time::Duration;

use evacsim_core::{Command, Event, RunState};
use evacsim_system_driver::Driver;
use evacsim_world::{query, Config};

const FRAME: Duration = Duration::from_millis(50);

#[test]
fn pause_freezes_world_but_statistics_keep_sampling() {
    let mut driver = Driver::new(Config::new(12, 12, 11));
    let mut events = Vec::new();
    driver.submit(Command::SpawnAgents { count: 6 });
    for _ in 0..5 {
        driver.frame(FRAME, &mut events);
    }

    driver.submit(Command::SetRunState {
        state: RunState::Paused,
    });
    driver.frame(FRAME, &mut events);
    let tick = query::tick_index(driver.world());
    let positions: Vec<_> = query::agent_view(driver.world())
        .iter()
        .map(|agent| agent.position)
        .collect();

    events.clear();
    for _ in 0..40 {
        driver.frame(FRAME, &mut events);
    }

    assert_eq!(query::tick_index(driver.world()), tick);
    let after: Vec<_> = query::agent_view(driver.world())
        .iter()
        .map(|agent| agent.position)
        .collect();
    assert_eq!(positions, after);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TimeAdvanced { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::StatsPublished { .. }))
            .count(),
        2
    );
}

#[test]
fn evacuation_completes_through_driver() {
    let mut driver = Driver::new(Config::new(10, 10, 5));
    let mut events = Vec::new();
    driver.submit_line("spawn 8", &mut events);
    driver.submit_line("evacuate", &mut events);

    for _ in 0..2_000 {
        driver.frame(FRAME, &mut events);
    }

    let stats = query::stats(driver.world());
    assert_eq!(stats.evacuated, 8);
    assert_eq!(stats.active, 0);
    let snapshot = driver
        .analytics()
        .last_snapshot()
        .expect("many seconds elapsed");
    assert_eq!(snapshot.stats.evacuated, 8);
    assert_eq!(snapshot.history.last(), Some(&8));
}

#[test]
fn identical_inputs_replay_identically() {
    fn run() -> Vec<Event> {
        let mut driver = Driver::new(Config::new(16, 12, 77));
        let mut events = Vec::new();
        for frame in 0..400u32 {
            match frame {
                0 => driver.submit_line("spawn 20", &mut events),
                30 => driver.submit_line("fire", &mut events),
                60 => driver.submit_line("flood", &mut events),
                90 => driver.submit_line("evac", &mut events),
                _ => {}
            }
            driver.frame(FRAME, &mut events);
        }
        events
    }

    assert_eq!(run(), run());
}
