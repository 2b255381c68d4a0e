//! Application-wide view state: which dialog is open, where the user is, and
//! pending toast notices. Updated only through [`AppStore::dispatch`].

use tokio::sync::watch;
use tracing::{debug, info};

use crate::api::Navigator;

/// At most one auth dialog is shown at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    SignIn,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub modal: Modal,
    pub route: Route,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenSignIn,
    OpenSignUp,
    CloseModal,
    Navigate(Route),
    Notify(Notice),
    ClearNotices,
}

pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::OpenSignIn => next.modal = Modal::SignIn,
        Action::OpenSignUp => next.modal = Modal::SignUp,
        Action::CloseModal => next.modal = Modal::None,
        Action::Navigate(route) => next.route = route,
        Action::Notify(notice) => next.notices.push(notice),
        Action::ClearNotices => next.notices.clear(),
    }
    next
}

/// Dispatch/subscribe container around [`AppState`]
#[derive(Debug)]
pub struct AppStore {
    state: watch::Sender<AppState>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self { state }
    }

    pub fn dispatch(&self, action: Action) {
        debug!(?action, "Dispatching app action");
        self.state.send_modify(|state| *state = reduce(state, action));
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn open_sign_in(&self) {
        self.dispatch(Action::OpenSignIn);
    }

    pub fn open_sign_up(&self) {
        self.dispatch(Action::OpenSignUp);
    }

    pub fn close_modal(&self) {
        self.dispatch(Action::CloseModal);
    }

    pub fn notify(&self, notice: Notice) {
        self.dispatch(Action::Notify(notice));
    }

    /// Removes and returns every pending notice
    pub fn take_notices(&self) -> Vec<Notice> {
        let notices = self.snapshot().notices;
        self.dispatch(Action::ClearNotices);
        notices
    }
}

impl Navigator for AppStore {
    fn redirect_to_sign_in(&self) {
        info!("Session could not be renewed, redirecting to sign-in");
        self.dispatch(Action::Navigate(Route::SignIn));
        self.dispatch(Action::OpenSignIn);
        self.notify(Notice::error("Your session has expired. Please sign in again."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn modal_transitions_are_mutually_exclusive() {
        let initial = AppState::default();
        assert_eq!(initial.modal, Modal::None);

        let signin = reduce(&initial, Action::OpenSignIn);
        assert_eq!(signin.modal, Modal::SignIn);

        let signup = reduce(&signin, Action::OpenSignUp);
        assert_eq!(signup.modal, Modal::SignUp);

        let closed = reduce(&signup, Action::CloseModal);
        assert_eq!(closed.modal, Modal::None);

        let reopened = reduce(&closed, Action::OpenSignIn);
        assert_eq!(reopened.modal, Modal::SignIn);
    }

    #[test]
    fn reduce_leaves_input_state_untouched() {
        let initial = AppState::default();
        let _ = reduce(&initial, Action::Navigate(Route::Dashboard));
        assert_eq!(initial.route, Route::Home);
    }

    #[test]
    fn redirect_opens_sign_in_and_posts_error_notice() {
        let store = AppStore::new();
        store.redirect_to_sign_in();

        let state = store.snapshot();
        assert_eq!(state.route, Route::SignIn);
        assert_eq!(state.modal, Modal::SignIn);
        assert_eq!(state.notices.len(), 1);
        assert_eq!(state.notices[0].level, NoticeLevel::Error);
    }

    #[test]
    fn take_notices_drains() {
        let store = AppStore::new();
        store.notify(Notice::success("Listing approved"));
        store.notify(Notice::info("2 panels loaded"));

        let drained = store.take_notices();
        assert_eq!(drained.len(), 2);
        assert!(store.snapshot().notices.is_empty());
    }

    #[tokio::test]
    async fn subscribers_observe_dispatches() {
        let store = AppStore::new();
        let mut rx = store.subscribe();

        store.open_sign_up();
        rx.changed().await.expect("changed");
        assert_eq!(rx.borrow().modal, Modal::SignUp);
    }
}
