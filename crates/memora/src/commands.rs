use std::sync::Arc;
use std::time::Duration;

use clap::ArgMatches;
use tracing::{error, info, warn};

use memora_core::browser::{BrowserInfo, BrowserKind};
use memora_core::capture::{CaptureResult, CaptureTimings, UrlCapture};
use memora_core::config::MemoraConfig;
use memora_core::detect::BrowserDetector;
use memora_core::events;
use memora_core::process::SysinfoProbe;
use memora_core::{ProcessProbe, WindowAutomationPort, platform_port};

use crate::serve;

/// How long a finished command waits for blocking work, such as a pending
/// stdin read, before the runtime is torn down.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Detector and capture sharing one automation port and process probe.
pub struct Services {
    pub detector: Arc<BrowserDetector>,
    pub capture: Arc<UrlCapture>,
}

impl Services {
    pub fn from_config(config: &MemoraConfig) -> Self {
        let port: Arc<dyn WindowAutomationPort> = platform_port(&config.automation);
        let probe: Arc<dyn ProcessProbe> = Arc::new(SysinfoProbe::new());
        info!(event = "cli.services_created", port = port.name());

        Self {
            detector: Arc::new(BrowserDetector::from_config(
                port.clone(),
                probe.clone(),
                &config.detection,
            )),
            capture: Arc::new(UrlCapture::new(
                port,
                probe,
                CaptureTimings::from(&config.capture),
            )),
        }
    }
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let config = load_config()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = match matches.subcommand() {
        Some(("detect", sub_matches)) => {
            runtime.block_on(handle_detect_command(sub_matches, &config))
        }
        Some(("capture", sub_matches)) => {
            runtime.block_on(handle_capture_command(sub_matches, config))
        }
        Some(("serve", _)) => runtime.block_on(serve::run(&config)),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    events::log_app_shutdown();
    result
}

fn load_config() -> Result<MemoraConfig, Box<dyn std::error::Error>> {
    match MemoraConfig::load_hierarchy() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            error!(event = "cli.config_load_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

async fn handle_detect_command(
    matches: &ArgMatches,
    config: &MemoraConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.detect_started", json_output = json_output);

    let services = Services::from_config(config);
    let info = services.detector.detect().await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_browser_info(&info);
    }

    info!(
        event = "cli.detect_completed",
        browser = %info.browser,
        success = info.success
    );

    if info.success {
        Ok(())
    } else {
        Err(format!(
            "Browser detection failed: {}",
            info.error.as_deref().unwrap_or("unknown error")
        )
        .into())
    }
}

fn print_browser_info(info: &BrowserInfo) {
    match info.browser {
        kind if kind.is_browser() => {
            println!("Active browser: {}", kind);
            if !info.window_title.is_empty() {
                println!("Window: {}", info.window_title);
            }
        }
        BrowserKind::Detected => {
            println!("A browser is running, but its windows could not be inspected.");
        }
        BrowserKind::None => println!("No browser detected."),
        _ => {}
    }
}

async fn handle_capture_command(
    matches: &ArgMatches,
    mut config: MemoraConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    if let Some(timeout_ms) = matches.get_one::<u64>("timeout") {
        config.capture.timeout_ms = Some(*timeout_ms);
    }

    info!(
        event = "cli.capture_started",
        json_output = json_output,
        timeout_ms = config.capture.timeout().as_millis() as u64
    );

    let services = Services::from_config(&config);
    let result = services.capture.capture().await;
    events::log_capture_finished(&result);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    finish_capture(&result, json_output)
}

fn finish_capture(
    result: &CaptureResult,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match (&result.url, result.success) {
        (Some(url), true) => {
            if !json_output {
                println!("{}", url);
            }
            info!(event = "cli.capture_completed");
            Ok(())
        }
        _ => {
            let message = result.error.as_deref().unwrap_or("URL capture failed");
            if !json_output {
                eprintln!("{}", message);
            }
            warn!(
                event = "cli.capture_failed",
                error_code = ?result.error_code
            );
            Err(message.into())
        }
    }
}
