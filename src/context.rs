//! Per-session context handed to views: the bearer credential and the operator callbacks.

use std::fmt;
use std::sync::Arc;

/// Bearer credential for the current operator session.
///
/// An absent or blank token means "signed out"; no remote request is issued then.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<Arc<str>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Arc::from);
        Self { token }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Screens the operator can be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    OrderList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Error,
}

/// Something the operator must be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEvent {
    /// Blocking notification.
    Alert { level: AlertLevel, message: String },
    Navigate(Route),
    /// Order data changed; dashboards showing aggregates should refresh.
    StatisticsChanged,
}

/// Front end callbacks: confirmation prompts and event delivery.
pub trait Operator: Send + Sync {
    /// Asks the operator a yes/no question. `true` means go ahead.
    fn confirm(&self, prompt: &str) -> bool;

    fn emit(&self, event: AdminEvent);
}

/// Proof that the operator explicitly agreed to an irreversible action.
///
/// Only [`AdminContext::confirm`] can produce one.
#[derive(Debug)]
pub struct Confirmed {
    _private: (),
}

/// Explicit context injected into views at construction.
#[derive(Clone)]
pub struct AdminContext {
    session: Session,
    operator: Arc<dyn Operator>,
}

impl AdminContext {
    pub fn new(session: Session, operator: Arc<dyn Operator>) -> Self {
        Self { session, operator }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn confirm(&self, prompt: &str) -> Option<Confirmed> {
        self.operator
            .confirm(prompt)
            .then_some(Confirmed { _private: () })
    }

    pub fn alert_info(&self, message: impl Into<String>) {
        self.operator.emit(AdminEvent::Alert {
            level: AlertLevel::Info,
            message: message.into(),
        });
    }

    pub fn alert_error(&self, message: impl Into<String>) {
        self.operator.emit(AdminEvent::Alert {
            level: AlertLevel::Error,
            message: message.into(),
        });
    }

    pub fn navigate(&self, route: Route) {
        self.operator.emit(AdminEvent::Navigate(route));
    }

    pub fn statistics_changed(&self) {
        self.operator.emit(AdminEvent::StatisticsChanged);
    }
}
