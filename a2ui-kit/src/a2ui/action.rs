//! A2UI Action Dispatch
//!
//! Resolved actions either leave the surface as a [`UserAction`] for the
//! agent, or trigger one of the local effects (`openUrl`, `showToast`).
//! The host application supplies an [`ActionHandler`] that performs them.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};
use url::Url;

use super::message::UserAction;
use super::value::FunctionCall;

/// An action with every bound value resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Forwarded to the agent
    Event {
        name: String,
        context: Map<String, Value>,
    },

    /// Local effect; `args` are concrete values
    FunctionCall(FunctionCall),
}

impl Action {
    pub fn event(name: impl Into<String>) -> Self {
        Action::Event {
            name: name.into(),
            context: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Action::Event { name, .. } => name,
            Action::FunctionCall(call) => &call.call,
        }
    }
}

/// Host-side effects of user actions.
///
/// Closures taking a [`UserAction`] implement this trait and ignore the
/// local effects.
pub trait ActionHandler: Send + Sync {
    /// Send an event to the agent
    fn on_user_action(&self, action: &UserAction);

    /// Open an allow-listed URL
    fn open_url(&self, url: &str) {
        log::info!("[A2UI] No URL opener installed, ignoring {}", url);
    }

    /// Show a transient message
    fn show_toast(&self, surface_id: &str, message: &str) {
        log::info!("[A2UI] Toast on '{}': {}", surface_id, message);
    }
}

impl<F> ActionHandler for F
where
    F: Fn(&UserAction) + Send + Sync,
{
    fn on_user_action(&self, action: &UserAction) {
        self(action)
    }
}

/// Why an action produced no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    SurfaceNotFound,
    NoHandler,
    UrlNotAllowed(String),
    MissingArgument(&'static str),
    UnknownFunction(String),
}

/// What dispatching an action did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Forwarded(UserAction),
    OpenedUrl(String),
    ShowedToast(String),
    Dropped(DropReason),
}

/// Routes resolved actions to the installed handler.
pub struct ActionDispatcher {
    allowed_schemes: Vec<String>,
    handler: RwLock<Option<Arc<dyn ActionHandler>>>,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("allowed_schemes", &self.allowed_schemes)
            .field("has_handler", &self.handler().is_some())
            .finish()
    }
}

impl ActionDispatcher {
    pub fn new(allowed_schemes: Vec<String>) -> Self {
        ActionDispatcher {
            allowed_schemes,
            handler: RwLock::new(None),
        }
    }

    pub fn set_handler(&self, handler: Arc<dyn ActionHandler>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    pub fn clear_handler(&self) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn handler(&self) -> Option<Arc<dyn ActionHandler>> {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check a URL against the scheme allow-list.
    ///
    /// `http` and `https` URLs must be written with `://` and carry a host.
    pub fn is_url_allowed(&self, url: &str) -> bool {
        let url = url.trim();
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let scheme = parsed.scheme();
        if !self.allowed_schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
            return false;
        }
        match scheme {
            "http" | "https" => {
                let prefix = format!("{}://", scheme);
                url.get(..prefix.len())
                    .is_some_and(|p| p.eq_ignore_ascii_case(&prefix))
                    && parsed.host_str().is_some_and(|host| !host.is_empty())
            }
            _ => true,
        }
    }

    /// Dispatch an action raised on `surface_id`.
    ///
    /// `data_model` is attached to forwarded events as is.
    pub fn dispatch(&self, surface_id: &str, action: &Action, data_model: Option<Value>) -> DispatchOutcome {
        match action {
            Action::Event { name, context } => {
                let Some(handler) = self.handler() else {
                    log::warn!("[A2UI] No action handler, dropping '{}' from '{}'", name, surface_id);
                    return DispatchOutcome::Dropped(DropReason::NoHandler);
                };
                let user_action = UserAction {
                    surface_id: surface_id.to_string(),
                    action_name: name.clone(),
                    context: context.clone(),
                    data_model,
                };
                log::debug!("[A2UI] Forwarding action '{}' from '{}'", name, surface_id);
                handler.on_user_action(&user_action);
                DispatchOutcome::Forwarded(user_action)
            }
            Action::FunctionCall(call) => self.dispatch_local(surface_id, call),
        }
    }

    fn dispatch_local(&self, surface_id: &str, call: &FunctionCall) -> DispatchOutcome {
        match call.call.as_str() {
            "openUrl" => {
                let Some(url) = call.args.get("url").and_then(Value::as_str) else {
                    log::warn!("[A2UI] openUrl without a url on '{}'", surface_id);
                    return DispatchOutcome::Dropped(DropReason::MissingArgument("url"));
                };
                if !self.is_url_allowed(url) {
                    log::warn!("[A2UI] Dropping openUrl with disallowed URL {:?}", url);
                    return DispatchOutcome::Dropped(DropReason::UrlNotAllowed(url.to_string()));
                }
                let Some(handler) = self.handler() else {
                    log::warn!("[A2UI] No action handler, dropping openUrl {}", url);
                    return DispatchOutcome::Dropped(DropReason::NoHandler);
                };
                handler.open_url(url);
                DispatchOutcome::OpenedUrl(url.to_string())
            }
            "showToast" => {
                let Some(message) = call.args.get("message").and_then(Value::as_str) else {
                    log::warn!("[A2UI] showToast without a message on '{}'", surface_id);
                    return DispatchOutcome::Dropped(DropReason::MissingArgument("message"));
                };
                let Some(handler) = self.handler() else {
                    log::warn!("[A2UI] No action handler, dropping toast on '{}'", surface_id);
                    return DispatchOutcome::Dropped(DropReason::NoHandler);
                };
                handler.show_toast(surface_id, message);
                DispatchOutcome::ShowedToast(message.to_string())
            }
            other => {
                log::warn!("[A2UI] Action function '{}' has no local effect", other);
                DispatchOutcome::Dropped(DropReason::UnknownFunction(other.to_string()))
            }
        }
    }
}
