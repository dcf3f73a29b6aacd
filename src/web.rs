//! JavaScript bindings for the settings page and the dashboard.
//!
//! To build for the browser:
//! cargo build --target wasm32-unknown-unknown --features wasm

use std::rc::Rc;
use std::sync::Arc;

use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::AppConfig;
use crate::contacts::ContactId;
use crate::controller::SettingsController;
use crate::dispatch::{CancelToken, DispatchReport, Dispatcher};
use crate::notify::{Notice, NoticeLog};
use crate::settings::SettingsRepository;
use crate::storage::create_storage;
use crate::template::Location;

#[derive(Serialize)]
struct NoticeJson<'a> {
    title: &'a str,
    description: &'a str,
    destructive: bool,
    duration_ms: Option<u64>,
}

impl<'a> From<&'a Notice> for NoticeJson<'a> {
    fn from(notice: &'a Notice) -> Self {
        Self {
            title: &notice.title,
            description: &notice.description,
            destructive: notice.is_destructive(),
            duration_ms: notice.duration_ms(),
        }
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    message: &'a str,
    recipients: usize,
    delivered: Vec<&'static str>,
    failed: Vec<&'static str>,
}

impl<'a> From<&'a DispatchReport> for ReportJson<'a> {
    fn from(report: &'a DispatchReport) -> Self {
        Self {
            message: &report.message,
            recipients: report.recipients,
            delivered: report.delivered().map(|c| c.label()).collect(),
            failed: report.failed().map(|o| o.channel.label()).collect(),
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn drain_notices(log: &NoticeLog) -> Result<String, JsValue> {
    let notices = log.take();
    let json: Vec<NoticeJson<'_>> = notices.iter().map(NoticeJson::from).collect();
    serde_json::to_string(&json).map_err(js_error)
}

#[wasm_bindgen]
pub struct SettingsPage {
    controller: SettingsController,
    notices: Arc<NoticeLog>,
}

#[wasm_bindgen]
impl SettingsPage {
    /// Loads settings stored under `namespace` (`"bikerSOS"` for data written
    /// by the legacy web app).
    #[wasm_bindgen(constructor)]
    pub fn new(namespace: &str) -> Result<SettingsPage, JsValue> {
        let notices = Arc::new(NoticeLog::new());
        let repository = SettingsRepository::new(create_storage(namespace));
        let controller = SettingsController::activate(repository, notices.clone())
            .map_err(|e| js_error(format!("Failed to load settings: {}", e)))?;
        Ok(SettingsPage {
            controller,
            notices,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.controller.record().message.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_message(&mut self, value: String) {
        self.controller.set_message(value);
    }

    #[wasm_bindgen(getter = sendSms)]
    pub fn send_sms(&self) -> bool {
        self.controller.record().send_sms
    }

    #[wasm_bindgen(setter = sendSms)]
    pub fn set_send_sms(&mut self, value: bool) {
        self.controller.set_send_sms(value);
    }

    #[wasm_bindgen(getter = sendWhatsApp)]
    pub fn send_whatsapp(&self) -> bool {
        self.controller.record().send_whatsapp
    }

    #[wasm_bindgen(setter = sendWhatsApp)]
    pub fn set_send_whatsapp(&mut self, value: bool) {
        self.controller.set_send_whatsapp(value);
    }

    /// Returns the new contact's id.
    #[wasm_bindgen(js_name = addContact)]
    pub fn add_contact(&mut self, name: String, phone: String) -> Result<String, JsValue> {
        self.controller.set_draft_name(name);
        self.controller.set_draft_phone(phone);
        self.controller
            .add_contact()
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = removeContact)]
    pub fn remove_contact(&mut self, id: &str) -> bool {
        self.controller.remove_contact(&ContactId::from(id))
    }

    pub fn save(&mut self) -> Result<(), JsValue> {
        self.controller.save().map_err(js_error)
    }

    /// Contacts as a JSON array of `{id, name, phone}`.
    #[wasm_bindgen(js_name = contactsJson)]
    pub fn contacts_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.contacts()).map_err(js_error)
    }

    /// Drains pending notices as a JSON array for the toast layer.
    #[wasm_bindgen(js_name = takeNoticesJson)]
    pub fn take_notices_json(&self) -> Result<String, JsValue> {
        drain_notices(&self.notices)
    }
}

/// The emergency button. Reads the saved settings on every press.
#[wasm_bindgen]
pub struct Dashboard {
    repository: SettingsRepository,
    dispatcher: Rc<Dispatcher>,
    notices: Arc<NoticeLog>,
    cancel: CancelToken,
}

#[wasm_bindgen]
impl Dashboard {
    #[wasm_bindgen(constructor)]
    pub fn new(namespace: &str) -> Dashboard {
        let notices = Arc::new(NoticeLog::new());
        let dispatcher = Dispatcher::simulated(&AppConfig::default(), notices.clone());
        Dashboard {
            repository: SettingsRepository::new(create_storage(namespace)),
            dispatcher: Rc::new(dispatcher),
            notices,
            cancel: CancelToken::new(),
        }
    }

    /// `"ready"`, `"sending"` or `"sent"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.dispatcher.state().as_str().to_string()
    }

    /// Sends the alert. Resolves to a JSON report, or rejects with the reason
    /// the alert was not sent. Pass both coordinates or neither.
    pub fn trigger(&mut self, latitude: Option<f64>, longitude: Option<f64>) -> Promise {
        let record = match self.repository.load() {
            Ok(loaded) => loaded.record,
            Err(e) => return Promise::reject(&js_error(e)),
        };
        let location = latitude
            .zip(longitude)
            .map(|(lat, lon)| Location::new(lat, lon));
        let cancel = CancelToken::new();
        self.cancel = cancel.clone();
        let dispatcher = Rc::clone(&self.dispatcher);

        future_to_promise(async move {
            let report = dispatcher
                .trigger(&record, location, &cancel)
                .await
                .map_err(js_error)?;
            let json = serde_json::to_string(&ReportJson::from(&report)).map_err(js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Cancels the send started by the latest `trigger`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[wasm_bindgen(js_name = takeNoticesJson)]
    pub fn take_notices_json(&self) -> Result<String, JsValue> {
        drain_notices(&self.notices)
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}
