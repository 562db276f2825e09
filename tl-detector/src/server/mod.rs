//! HTTP surface delivering the pose, route, light and camera feeds.
//!
//! Every camera frame triggers one detection cycle; a frame that arrives while
//! the previous cycle is still running is dropped.

pub mod messages;

use crate::config::ServerConfig;
use crate::detect::context::SharedContext;
use crate::detect::frame_processor::FrameProcessor;
use crate::detect::property::point::Point;
use crate::detect::{TrafficLight, NO_RED_LIGHT};
use actix_web::web;
use actix_web::{App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use bytes::Bytes;
use log::{debug, info, warn};
use messages::{
    FrameQuery, PoseMessage, RouteAccepted, TrafficLightsMessage, TrafficWaypoint,
    WaypointsMessage,
};
use tl_inference::RgbFrame;
use tokio::sync::{watch, Mutex};

/// Shared state behind the HTTP handlers.
pub struct DetectorState {
    context: SharedContext,
    stop_line_count: usize,
    processor: Mutex<FrameProcessor>,
    published: watch::Sender<i32>,
}

impl DetectorState {
    pub fn new(processor: FrameProcessor) -> Self {
        let (published, _) = watch::channel(NO_RED_LIGHT);
        Self {
            context: processor.context(),
            stop_line_count: processor.locator().len(),
            processor: Mutex::new(processor),
            published,
        }
    }

    /// Receiver of every published traffic waypoint.
    pub fn subscribe(&self) -> watch::Receiver<i32> {
        self.published.subscribe()
    }

    pub fn last_published(&self) -> i32 {
        *self.published.borrow()
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/current_pose", web::post().to(pose_handler))
        .route("/base_waypoints", web::post().to(waypoints_handler))
        .route("/vehicle/traffic_lights", web::post().to(traffic_lights_handler))
        .route("/image_color", web::post().to(image_handler))
        .route("/traffic_waypoint", web::get().to(traffic_waypoint_handler));
}

pub async fn run(config: &ServerConfig, processor: FrameProcessor) -> Result<()> {
    let state = web::Data::new(DetectorState::new(processor));
    let max_frame_bytes = config.max_frame_bytes;

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_frame_bytes))
            .app_data(web::JsonConfig::default().limit(max_frame_bytes))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}

async fn pose_handler(state: web::Data<DetectorState>, pose: web::Json<PoseMessage>) -> HttpResponse {
    let pose = Point::new(pose.x, pose.y);
    if !pose.is_finite() {
        return HttpResponse::BadRequest().body("pose must be finite");
    }

    state.context.write().update_pose(pose);
    HttpResponse::NoContent().finish()
}

async fn waypoints_handler(
    state: web::Data<DetectorState>,
    message: web::Json<WaypointsMessage>,
) -> HttpResponse {
    let waypoints = message.into_inner().waypoints;
    if !waypoints.iter().all(Point::is_finite) {
        return HttpResponse::BadRequest().body("waypoints must be finite");
    }

    let count = waypoints.len();
    let accepted = state.context.write().set_route(waypoints);
    HttpResponse::Ok().json(RouteAccepted {
        accepted,
        waypoints: count,
    })
}

async fn traffic_lights_handler(
    state: web::Data<DetectorState>,
    message: web::Json<TrafficLightsMessage>,
) -> HttpResponse {
    let lights = message
        .into_inner()
        .lights
        .into_iter()
        .map(TrafficLight::from)
        .collect::<Vec<_>>();

    match state.context.write().update_lights(lights, state.stop_line_count) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => {
            warn!("Rejected light list: {:#}", err);
            HttpResponse::UnprocessableEntity().body(err.to_string())
        }
    }
}

async fn image_handler(
    state: web::Data<DetectorState>,
    query: web::Query<FrameQuery>,
    body: Bytes,
) -> HttpResponse {
    let frame = match RgbFrame::new(query.width, query.height, body) {
        Ok(frame) => frame,
        Err(err) => return HttpResponse::BadRequest().body(err.to_string()),
    };

    let Ok(mut processor) = state.processor.try_lock() else {
        debug!("Detection cycle still running, dropping frame");
        return HttpResponse::Ok().json(TrafficWaypoint {
            traffic_waypoint: state.last_published(),
            dropped: true,
        });
    };

    let published = processor.process(Some(&frame)).await;
    state.published.send_replace(published);

    HttpResponse::Ok().json(TrafficWaypoint {
        traffic_waypoint: published,
        dropped: false,
    })
}

async fn traffic_waypoint_handler(state: web::Data<DetectorState>) -> HttpResponse {
    HttpResponse::Ok().json(TrafficWaypoint {
        traffic_waypoint: state.last_published(),
        dropped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::light_source::{GroundTruthSource, LightSource};
    use crate::detect::stability::StabilityFilter;
    use crate::detect::stop_line::StopLineLocator;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    fn state() -> web::Data<DetectorState> {
        let processor = FrameProcessor::new(
            StopLineLocator::new(vec![Point::new(30.0, 0.0), Point::new(60.0, 0.0)]),
            LightSource::GroundTruth(GroundTruthSource),
            StabilityFilter::default(),
        );
        web::Data::new(DetectorState::new(processor))
    }

    fn route() -> serde_json::Value {
        let waypoints = (0..100)
            .map(|i| json!({ "x": i as f64, "y": 0.0 }))
            .collect::<Vec<_>>();
        json!({ "waypoints": waypoints })
    }

    fn frame_request() -> test::TestRequest {
        test::TestRequest::post()
            .uri("/image_color?width=2&height=2")
            .set_payload(vec![0u8; 12])
    }

    #[actix_web::test]
    async fn feeds_drive_published_waypoint() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let request = test::TestRequest::post()
            .uri("/base_waypoints")
            .set_json(route())
            .to_request();
        let accepted: RouteAccepted = test::call_and_read_body_json(&app, request).await;
        assert!(accepted.accepted);

        let request = test::TestRequest::post()
            .uri("/current_pose")
            .set_json(json!({ "x": 12.0, "y": 1.0 }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::NO_CONTENT);

        let request = test::TestRequest::post()
            .uri("/vehicle/traffic_lights")
            .set_json(json!({ "lights": [{ "state": "RED" }, { "state": "GREEN" }] }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::NO_CONTENT);

        let mut published = Vec::new();
        for _ in 0..3 {
            let response: TrafficWaypoint =
                test::call_and_read_body_json(&app, frame_request().to_request()).await;
            assert!(!response.dropped);
            published.push(response.traffic_waypoint);
        }
        assert_eq!(published, vec![-1, -1, 30]);

        let request = test::TestRequest::get().uri("/traffic_waypoint").to_request();
        let latest: TrafficWaypoint = test::call_and_read_body_json(&app, request).await;
        assert_eq!(latest.traffic_waypoint, 30);
        assert_eq!(*state.subscribe().borrow(), 30);
    }

    #[actix_web::test]
    async fn numeric_light_states_confirm_red_light() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let request = test::TestRequest::post()
            .uri("/base_waypoints")
            .set_json(route())
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);

        let request = test::TestRequest::post()
            .uri("/current_pose")
            .set_json(json!({ "x": 12.0, "y": 1.0 }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::NO_CONTENT);

        let request = test::TestRequest::post()
            .uri("/vehicle/traffic_lights")
            .set_json(json!({
                "lights": [
                    { "state": 0, "pose": { "x": 31.0, "y": 4.0 } },
                    { "state": 2, "pose": { "x": 61.0, "y": 4.0 } }
                ]
            }))
            .to_request();
        assert_eq!(test::call_service(&app, request).await.status(), StatusCode::NO_CONTENT);

        let mut published = Vec::new();
        for _ in 0..3 {
            let response: TrafficWaypoint =
                test::call_and_read_body_json(&app, frame_request().to_request()).await;
            published.push(response.traffic_waypoint);
        }
        assert_eq!(published, vec![-1, -1, 30]);
    }

    #[actix_web::test]
    async fn second_route_is_ignored() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        for expected in [true, false] {
            let request = test::TestRequest::post()
                .uri("/base_waypoints")
                .set_json(route())
                .to_request();
            let accepted: RouteAccepted = test::call_and_read_body_json(&app, request).await;
            assert_eq!(accepted.accepted, expected);
        }
    }

    #[actix_web::test]
    async fn rejects_light_count_mismatch() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let request = test::TestRequest::post()
            .uri("/vehicle/traffic_lights")
            .set_json(json!({ "lights": [{ "state": "RED" }] }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn rejects_malformed_frame() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let request = test::TestRequest::post()
            .uri("/image_color?width=4&height=4")
            .set_payload(vec![0u8; 10])
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn frame_during_running_cycle_is_dropped() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let _running = state.processor.lock().await;
        let response: TrafficWaypoint =
            test::call_and_read_body_json(&app, frame_request().to_request()).await;
        assert!(response.dropped);
        assert_eq!(response.traffic_waypoint, -1);
    }
}
