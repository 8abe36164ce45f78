use std::sync::Arc;

use preflop_quiz::chart::Chart;
use preflop_quiz::trainer::{Trainer, TrainerConfig};

#[test]
fn autoplay_completes_requested_rounds() {
    let chart = Chart::from_json_str(include_str!("../data/sample_chart.json")).expect("chart");
    let config = TrainerConfig {
        rounds: 3,
        seed: Some(1234),
        no_color: true,
        ..TrainerConfig::default()
    };

    let mut trainer = Trainer::with_chart(Arc::new(chart), config).expect("trainer starts");
    let score = trainer.autoplay_perfect().expect("autoplay succeeds");

    assert!(score.total >= 3);
    assert_eq!(score.correct, score.total);
    assert_eq!(trainer.session_state().round, 3);
}
