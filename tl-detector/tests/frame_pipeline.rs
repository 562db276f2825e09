use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tl_detector::config::DetectorConfig;
use tl_detector::detect::frame_processor::FrameProcessor;
use tl_detector::detect::light_source::{GroundTruthSource, LightSource, VisionSource};
use tl_detector::detect::property::point::Point;
use tl_detector::detect::{LightColor, TrafficLight};
use tl_inference::{Classification, RgbFrame, TrafficLightClass, TrafficLightClassifier};

const CONFIG: &str = r#"
is_site: false
stop_line_positions:
    - [20.0, 2.0]
    - [42.0, -2.0]
    - [80.0, 1.0]
"#;

fn straight_route() -> Vec<Point<f64>> {
    (0..100).map(|i| Point::new(i as f64, 0.0)).collect()
}

fn lights(states: [LightColor; 3]) -> Vec<TrafficLight> {
    states
        .into_iter()
        .map(|state| TrafficLight { state })
        .collect()
}

fn ground_truth_processor() -> Result<FrameProcessor> {
    let config = DetectorConfig::from_yaml(CONFIG)?;
    let processor = FrameProcessor::from_config(&config, LightSource::GroundTruth(GroundTruthSource));
    {
        let context = processor.context();
        let mut context = context.write();
        context.set_route(straight_route());
        context.update_pose(Point::new(30.0, 0.4));
    }
    Ok(processor)
}

async fn feed(processor: &mut FrameProcessor, states: &[LightColor]) -> Result<Vec<i32>> {
    let context = processor.context();
    let mut published = Vec::new();
    for &state in states {
        context
            .write()
            .update_lights(lights([LightColor::Red, state, LightColor::Red]), 3)?;
        published.push(processor.process(None).await);
    }
    Ok(published)
}

#[tokio::test]
async fn transient_noise_is_held() -> Result<()> {
    use tl_detector::detect::LightColor::{Green, Red};
    let mut processor = ground_truth_processor()?;

    let published = feed(&mut processor, &[Red, Red, Green, Red, Red, Red]).await?;
    assert_eq!(published, vec![-1, -1, -1, -1, -1, 42]);
    Ok(())
}

#[tokio::test]
async fn confirmed_red_clears_after_green() -> Result<()> {
    use tl_detector::detect::LightColor::{Green, Red};
    let mut processor = ground_truth_processor()?;

    let published = feed(&mut processor, &[Red, Red, Red, Green, Green, Green]).await?;
    assert_eq!(published, vec![-1, -1, 42, 42, 42, -1]);
    Ok(())
}

#[tokio::test]
async fn passing_the_stop_line_moves_to_the_next_light() -> Result<()> {
    let mut processor = ground_truth_processor()?;
    let context = processor.context();
    context
        .write()
        .update_lights(lights([LightColor::Red, LightColor::Red, LightColor::Red]), 3)?;

    for _ in 0..3 {
        processor.process(None).await;
    }
    assert_eq!(processor.process(None).await, 42);

    context.write().update_pose(Point::new(50.0, 0.0));
    assert_eq!(processor.process(None).await, 80);
    Ok(())
}

#[tokio::test]
async fn vehicle_past_every_line_publishes_no_light() -> Result<()> {
    let mut processor = ground_truth_processor()?;
    let context = processor.context();
    context
        .write()
        .update_lights(lights([LightColor::Red, LightColor::Red, LightColor::Red]), 3)?;
    for _ in 0..3 {
        processor.process(None).await;
    }
    assert_eq!(processor.process(None).await, 42);

    context.write().update_pose(Point::new(95.0, 0.0));
    let published = [
        processor.process(None).await,
        processor.process(None).await,
        processor.process(None).await,
    ];
    assert_eq!(published, [42, 42, -1]);
    Ok(())
}

#[tokio::test]
async fn later_routes_do_not_replace_the_first() -> Result<()> {
    let mut processor = ground_truth_processor()?;
    let context = processor.context();
    context
        .write()
        .update_lights(lights([LightColor::Red, LightColor::Red, LightColor::Red]), 3)?;

    // a reversed route would put the vehicle past every stop line
    let reversed = straight_route().into_iter().rev().collect();
    assert!(!context.write().set_route(reversed));

    for _ in 0..2 {
        processor.process(None).await;
    }
    assert_eq!(processor.process(None).await, 42);
    Ok(())
}

struct AlwaysRed;

impl TrafficLightClassifier for AlwaysRed {
    fn classify(&self, _frame: &RgbFrame) -> Result<Option<Classification>> {
        Ok(Some(Classification {
            class: TrafficLightClass::Stop,
            score: 0.97,
        }))
    }
}

#[tokio::test]
async fn vision_source_needs_frames() -> Result<()> {
    let config = DetectorConfig::from_yaml(CONFIG)?;
    let source = LightSource::Vision(VisionSource::new(Arc::new(AlwaysRed), Duration::from_secs(1)));
    let mut processor = FrameProcessor::from_config(&config, source);
    {
        let context = processor.context();
        let mut context = context.write();
        context.set_route(straight_route());
        context.update_pose(Point::new(10.0, 0.0));
    }

    // without a camera frame the classifier is never consulted
    for _ in 0..3 {
        assert_eq!(processor.process(None).await, -1);
    }

    let frame = RgbFrame::new(8, 6, vec![0u8; 8 * 6 * 3])?;
    let published = [
        processor.process(Some(&frame)).await,
        processor.process(Some(&frame)).await,
        processor.process(Some(&frame)).await,
    ];
    assert_eq!(published, [-1, -1, 20]);
    Ok(())
}
