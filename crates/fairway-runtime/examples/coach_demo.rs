//! Run with: cargo run -p fairway-runtime --example coach_demo -- <email> <password> <video>
//!
//! Signs in against the configured backend, uploads the given video and
//! prints the swing analysis.

use fairway_core::config::AppConfig;
use fairway_core::session::AuthMode;
use fairway_core::upload::UploadState;
use fairway_runtime::Controller;
use url::Url;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("fairway=debug")
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password), Some(video)) = (args.next(), args.next(), args.next())
    else {
        eprintln!("usage: coach_demo <email> <password> <video>");
        std::process::exit(2);
    };

    let config = AppConfig::load().unwrap_or_default();
    println!("Backend: {}", config.server.base_url);

    let controller = Controller::from_config(&config).expect("transport setup");

    controller
        .submit_credentials(AuthMode::Login, &email, &password, None)
        .await;
    let snapshot = controller.snapshot().await;
    let Some(identity) = snapshot.identity else {
        eprintln!(
            "Sign-in failed: {}",
            snapshot.auth_error.unwrap_or_else(|| "unknown error".into())
        );
        std::process::exit(1);
    };
    println!("Signed in as {} (user {})", identity.email, identity.user_id);

    let path = std::fs::canonicalize(&video).expect("video path");
    let handle = Url::from_file_path(&path).expect("absolute file path");
    controller.select_media(Some(handle)).await;
    controller.start_upload(None).await;

    match controller.snapshot().await.upload {
        UploadState::Analyzed(report) => {
            println!("Analysis for \"{}\" (video {}):", report.title, report.video_id);
            println!("  head stability: {:.2}", report.head_stability);
            println!("  x-factor:       {:.2}", report.x_factor);
            println!("  hand speed:     {:.2}", report.hand_speed);
            println!("  suggestion:     {}", report.suggestion);
        }
        UploadState::Errored { message, .. } => {
            eprintln!("Upload failed: {message}");
            std::process::exit(1);
        }
        other => eprintln!("Unexpected final state: {other:?}"),
    }

    for video in controller.list_videos().await.unwrap_or_default() {
        println!("library: [{}] {}", video.video_id, video.title);
    }
}
