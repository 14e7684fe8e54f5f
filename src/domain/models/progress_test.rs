use super::percent_complete;
use super::PipelineStage;
use super::ProgressTracker;

#[test]
fn it_rounds_percentages() {
    assert_eq!(percent_complete(0, 3), 0);
    assert_eq!(percent_complete(1, 3), 33);
    assert_eq!(percent_complete(2, 3), 67);
    assert_eq!(percent_complete(3, 3), 100);
}

#[test]
fn it_counts_an_empty_deck_as_one_unit() {
    assert_eq!(percent_complete(0, 0), 0);
    assert_eq!(percent_complete(1, 0), 100);
}

#[test]
fn it_never_goes_backwards() {
    let mut tracker = ProgressTracker::default();
    assert_eq!(tracker.advance(5), 5);
    assert_eq!(tracker.advance(3), 5);
    assert_eq!(tracker.advance(50), 50);
    assert_eq!(tracker.current(), 50);
}

#[test]
fn it_reserves_one_hundred_for_completion() {
    let mut tracker = ProgressTracker::default();
    assert_eq!(tracker.advance(100), 99);
    assert_eq!(tracker.finish(), Some(100));
    assert_eq!(tracker.finish(), None);
    assert_eq!(tracker.advance(20), 100);
}

#[test]
fn it_describes_stages() {
    assert_eq!(
        PipelineStage::Summarizing { done: 2, total: 5 }.to_string(),
        "Summarizing slide 2/5"
    );
    assert!(PipelineStage::Extracting.is_running());
    assert!(!PipelineStage::Complete.is_running());
}
