//! Integration tests for window materialization
//!
//! These tests verify:
//! - Looping instances anchored at multiples of the reel length
//! - One-shot reels filtered to the window
//! - Advertisements following each looped instance

mod common;

use common::{template, template_with_ads, three_program_reel};
use reelsync::models::Advertisement;
use reelsync::schedule::{ScheduleError, ScheduleWindowGenerator, TimeWindow};

fn intervals(programs: &[reelsync::Program]) -> Vec<(&str, i64, i64)> {
    programs
        .iter()
        .map(|p| (p.title.as_str(), p.start_time_ms, p.end_time_ms))
        .collect()
}

// ============================================================================
// Repeating Reels
// ============================================================================

#[test]
fn test_window_spanning_loop_boundary() {
    let generator = ScheduleWindowGenerator::new();
    let window = TimeWindow::new(2700, 4200).unwrap();

    let programs = generator
        .generate(9, &three_program_reel(), true, window)
        .unwrap();

    assert_eq!(
        intervals(&programs),
        vec![("P3", 2500, 3000), ("P1", 3000, 4000), ("P2", 4000, 5500)]
    );
    assert!(programs.iter().all(|p| p.channel_id == 9 && p.id.is_none()));
}

#[test]
fn test_many_loops_cover_window_contiguously() {
    let generator = ScheduleWindowGenerator::new();
    let window = TimeWindow::new(10_000, 40_000).unwrap();

    let programs = generator
        .generate(1, &three_program_reel(), true, window)
        .unwrap();

    assert_eq!(programs.first().unwrap().start_time_ms, 9000);
    for pair in programs.windows(2) {
        assert_eq!(pair[0].end_time_ms, pair[1].start_time_ms);
    }
    assert!(programs.last().unwrap().start_time_ms < 40_000);
    assert!(programs.last().unwrap().end_time_ms >= 40_000);
}

#[test]
fn test_reel_offset_is_dropped_when_looping() {
    let generator = ScheduleWindowGenerator::new();
    let reel = vec![template("A", 500, 1500), template("B", 1500, 2000)];
    let window = TimeWindow::new(0, 3000).unwrap();

    let programs = generator.generate(1, &reel, true, window).unwrap();

    assert_eq!(
        intervals(&programs),
        vec![("A", 0, 1000), ("B", 1000, 1500), ("A", 1500, 2500), ("B", 2500, 3000)]
    );
}

#[test]
fn test_zero_length_reel_is_rejected() {
    let generator = ScheduleWindowGenerator::new();
    let reel = vec![template("Empty", 100, 100)];
    let window = TimeWindow::new(0, 1000).unwrap();

    let result = generator.generate(1, &reel, true, window);
    assert!(matches!(
        result,
        Err(ScheduleError::ZeroOrNegativeDuration { .. })
    ));
}

#[test]
fn test_inverted_window_is_rejected() {
    assert!(matches!(
        TimeWindow::new(5000, 4000),
        Err(ScheduleError::InvalidRange { .. })
    ));
}

#[test]
fn test_repeated_generation_is_identical() {
    let generator = ScheduleWindowGenerator::new();
    let window = TimeWindow::new(123_456, 987_654).unwrap();
    let reel = three_program_reel();

    let first = generator.generate(3, &reel, true, window).unwrap();
    let second = generator.generate(3, &reel, true, window).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// One-shot Reels
// ============================================================================

#[test]
fn test_one_shot_keeps_boundary_touching_templates() {
    let generator = ScheduleWindowGenerator::new();
    let window = TimeWindow::new(1000, 2500).unwrap();

    let programs = generator
        .generate(2, &three_program_reel(), false, window)
        .unwrap();

    // P1 ends exactly at the window start, P3 starts exactly at its end
    assert_eq!(
        intervals(&programs),
        vec![("P1", 0, 1000), ("P2", 1000, 2500), ("P3", 2500, 3000)]
    );
}

#[test]
fn test_one_shot_outside_window_is_empty() {
    let generator = ScheduleWindowGenerator::new();
    let window = TimeWindow::new(10_000, 20_000).unwrap();

    let programs = generator
        .generate(2, &three_program_reel(), false, window)
        .unwrap();
    assert!(programs.is_empty());
}

// ============================================================================
// Advertisements
// ============================================================================

#[test]
fn test_ads_shift_with_each_instance() {
    let generator = ScheduleWindowGenerator::new();
    let reel = vec![
        template_with_ads(
            "Show",
            0,
            1000,
            vec![Advertisement::new(200, 300, "http://ads/1")],
        ),
        template("Filler", 1000, 2000),
    ];
    let window = TimeWindow::new(0, 4500).unwrap();

    let programs = generator.generate(1, &reel, true, window).unwrap();
    let shows: Vec<_> = programs.iter().filter(|p| p.title == "Show").collect();
    assert_eq!(shows.len(), 3);

    for show in shows {
        let ads = show.advertisements().unwrap();
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].start_ms - show.start_time_ms, 200);
        assert_eq!(ads[0].stop_ms - show.start_time_ms, 300);
        assert_eq!(ads[0].request_url, "http://ads/1");
    }
}

#[test]
fn test_malformed_provider_data_fails_repeating_generation() {
    let generator = ScheduleWindowGenerator::new();
    let mut broken = template("Broken", 0, 1000);
    broken.provider_data = Some("{not json".to_string());
    let window = TimeWindow::new(0, 500).unwrap();

    let result = generator.generate(1, &[broken.clone()], true, window);
    assert!(matches!(result, Err(ScheduleError::ProviderData { .. })));

    // one-shot reels pass the blob through untouched
    let programs = generator.generate(1, &[broken], false, window).unwrap();
    assert_eq!(programs[0].provider_data.as_deref(), Some("{not json"));
}

// ============================================================================
// Point Lookup
// ============================================================================

#[test]
fn test_program_at_far_in_the_future() {
    let generator = ScheduleWindowGenerator::new();
    let reel = three_program_reel();

    // 1_000_000 = 333 loops of 3000 + 1000
    let program = generator
        .program_at(1, &reel, true, 1_000_000)
        .unwrap()
        .unwrap();
    assert_eq!(program.title, "P2");
    assert_eq!(program.start_time_ms, 1_000_000);
    assert_eq!(program.end_time_ms, 1_001_500);
}

#[test]
fn test_program_at_gap_in_one_shot_reel() {
    let generator = ScheduleWindowGenerator::new();
    let reel = vec![template("A", 0, 1000), template("B", 2000, 3000)];

    assert!(generator.program_at(1, &reel, false, 1500).unwrap().is_none());
    assert_eq!(
        generator
            .program_at(1, &reel, false, 2000)
            .unwrap()
            .unwrap()
            .title,
        "B"
    );
}
