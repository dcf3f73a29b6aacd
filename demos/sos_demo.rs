//! Walks through the settings page and the emergency button from a terminal.
//!
//! cargo run --example sos_demo -- [config.toml]

use std::sync::Arc;

use sos_prefs::config::AppConfig;
use sos_prefs::controller::SettingsController;
use sos_prefs::dispatch::{CancelToken, Dispatcher};
use sos_prefs::notify::TracingNotifier;
use sos_prefs::settings::SettingsRepository;
use sos_prefs::storage::create_storage;
use sos_prefs::template::Location;

const QUALIFIER: &str = "com.example.BikerSos";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load(AppConfig::default_path(QUALIFIER)?)?,
    };
    let settings_dir = config.settings_dir(QUALIFIER)?;
    let settings_dir = settings_dir.to_str().ok_or("settings path is not valid UTF-8")?;
    let notifier = Arc::new(TracingNotifier);

    let repository = SettingsRepository::new(create_storage(settings_dir));
    let mut page = SettingsController::activate(repository, notifier.clone())?;
    if page.contacts().is_empty() {
        page.set_draft_name("Alice");
        page.set_draft_phone("+15551234567");
        page.add_contact()?;
        page.save()?;
    }

    let dispatcher = Dispatcher::simulated(&config, notifier);
    let report = dispatcher
        .trigger(page.record(), Some(Location::new(51.5007, -0.1246)), &CancelToken::new())
        .await?;
    println!("{}", report.message);
    for contact in page.contacts() {
        println!("  -> {} ({})", contact.name, contact.phone);
    }
    Ok(())
}
